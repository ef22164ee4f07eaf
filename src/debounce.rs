//! Debounced input: only the last value of a burst is delivered

use std::time::Duration;
use tokio::sync::watch;

/// Create a debounced channel seeded with `initial`.
pub fn debounce<T: Clone>(initial: T, delay: Duration) -> (DebounceInput<T>, Debounced<T>) {
    let (tx, rx) = watch::channel(initial);
    (DebounceInput { tx }, Debounced { rx, delay })
}

/// Producer side, fed on every keystroke
#[derive(Debug)]
pub struct DebounceInput<T> {
    tx: watch::Sender<T>,
}

impl<T> DebounceInput<T> {
    pub fn set(&self, value: T) {
        self.tx.send_replace(value);
    }
}

/// Consumer side
#[derive(Debug)]
pub struct Debounced<T> {
    rx: watch::Receiver<T>,
    delay: Duration,
}

impl<T: Clone> Debounced<T> {
    /// Wait for the next value that stays unchanged for the full delay.
    ///
    /// Returns `None` once the input side is dropped with nothing pending.
    pub async fn settled(&mut self) -> Option<T> {
        self.rx.changed().await.ok()?;
        loop {
            match tokio::time::timeout(self.delay, self.rx.changed()).await {
                Ok(Ok(())) => continue,
                // Quiet period elapsed, or the input side went away mid-burst.
                Ok(Err(_)) | Err(_) => break,
            }
        }
        Some(self.rx.borrow_and_update().clone())
    }

    /// The latest value, settled or not
    pub fn latest(&self) -> T {
        self.rx.borrow().clone()
    }
}
