//! Transient user notifications
//!
//! [`Toasts`] is an explicitly constructed service shared (by cloning) between
//! the components that report outcomes. Each toast removes itself after the
//! configured lifetime; [`Toasts::shutdown`] cancels every pending expiry.

use log::{debug, warn};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToastKind {
    #[default]
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: Uuid,
    pub message: String,
    pub kind: ToastKind,
}

/// Change notifications for subscribers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToastEvent {
    Added(Toast),
    Expired(Uuid),
}

#[derive(Debug)]
struct Inner {
    toasts: RwLock<Vec<Toast>>,
    timers: Mutex<HashMap<Uuid, JoinHandle<()>>>,
    events: broadcast::Sender<ToastEvent>,
    ttl: Duration,
}

#[derive(Debug, Clone)]
pub struct Toasts {
    inner: Arc<Inner>,
}

impl Toasts {
    pub fn new(ttl: Duration) -> Self {
        let (events, _) = broadcast::channel(32);
        Self {
            inner: Arc::new(Inner {
                toasts: RwLock::new(Vec::new()),
                timers: Mutex::new(HashMap::new()),
                events,
                ttl,
            }),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.inner.ttl
    }

    /// Show `message` and schedule its removal. Must be called from within a
    /// Tokio runtime.
    pub async fn add(&self, message: impl Into<String>, kind: ToastKind) -> Uuid {
        let toast = Toast {
            id: Uuid::new_v4(),
            message: message.into(),
            kind,
        };
        let id = toast.id;
        debug!("Toast {} ({:?}): {}", id, kind, toast.message);

        self.inner.toasts.write().await.push(toast.clone());
        // No subscribers is fine.
        let _ = self.inner.events.send(ToastEvent::Added(toast));

        let weak = Arc::downgrade(&self.inner);
        let ttl = self.inner.ttl;
        // Held until the handle is registered so `expire` cannot run its
        // removal first and leave a finished handle behind.
        let mut timers = self.lock_timers();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            expire(weak, id).await;
        });
        timers.insert(id, timer);
        id
    }

    pub async fn success(&self, message: impl Into<String>) -> Uuid {
        self.add(message, ToastKind::Success).await
    }

    pub async fn error(&self, message: impl Into<String>) -> Uuid {
        self.add(message, ToastKind::Error).await
    }

    /// Current toasts in insertion order
    pub async fn list(&self) -> Vec<Toast> {
        self.inner.toasts.read().await.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ToastEvent> {
        self.inner.events.subscribe()
    }

    /// Cancel pending expiries and drop every toast.
    pub async fn shutdown(&self) {
        let timers: Vec<JoinHandle<()>> = self.lock_timers().drain().map(|(_, t)| t).collect();
        for timer in timers {
            timer.abort();
        }
        self.inner.toasts.write().await.clear();
        debug!("Toast service shut down");
    }

    #[cfg(test)]
    fn pending_timers(&self) -> usize {
        self.lock_timers().len()
    }

    fn lock_timers(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, JoinHandle<()>>> {
        self.inner.timers.lock().unwrap_or_else(|e| e.into_inner())
    }
}

async fn expire(inner: Weak<Inner>, id: Uuid) {
    let Some(inner) = inner.upgrade() else {
        return;
    };
    inner.toasts.write().await.retain(|t| t.id != id);
    match inner.timers.lock() {
        Ok(mut timers) => {
            timers.remove(&id);
        }
        Err(e) => warn!("Toast timer registry poisoned: {}", e),
    }
    let _ = inner.events.send(ToastEvent::Expired(id));
    debug!("Toast {} expired", id);
}
