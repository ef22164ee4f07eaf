//! Injected failures for the update-pet call
//!
//! The dashboard deliberately fails a share of pet updates so the optimistic
//! update rollback is exercised in normal use. The decision is delegated to a
//! [`FailurePolicy`] so test environments can swap in deterministic behaviour.

use rand::Rng;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Mutex;

pub const DEFAULT_FAILURE_RATE: f64 = 0.3;

/// Decides whether the next update call fails before reaching the network.
pub trait FailurePolicy: Send + Sync + fmt::Debug {
    fn should_fail(&self) -> bool;

    /// Probability used in the failure message.
    fn rate(&self) -> f64 {
        DEFAULT_FAILURE_RATE
    }
}

/// Fails with a fixed probability.
#[derive(Debug, Clone, Copy)]
pub struct RandomFailure {
    rate: f64,
}

impl RandomFailure {
    /// `rate` is clamped to `[0, 1]`; NaN disables failures.
    pub fn new(rate: f64) -> Self {
        let rate = if rate.is_nan() { 0.0 } else { rate.clamp(0.0, 1.0) };
        Self { rate }
    }
}

impl Default for RandomFailure {
    fn default() -> Self {
        Self::new(DEFAULT_FAILURE_RATE)
    }
}

impl FailurePolicy for RandomFailure {
    fn should_fail(&self) -> bool {
        rand::thread_rng().gen_bool(self.rate)
    }

    fn rate(&self) -> f64 {
        self.rate
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NeverFail;

impl FailurePolicy for NeverFail {
    fn should_fail(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysFail;

impl FailurePolicy for AlwaysFail {
    fn should_fail(&self) -> bool {
        true
    }
}

/// Replays a fixed sequence of outcomes, then stops failing.
#[derive(Debug, Default)]
pub struct ScriptedFailures {
    outcomes: Mutex<VecDeque<bool>>,
}

impl ScriptedFailures {
    pub fn new(outcomes: impl IntoIterator<Item = bool>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into_iter().collect()),
        }
    }
}

impl FailurePolicy for ScriptedFailures {
    fn should_fail(&self) -> bool {
        self.outcomes
            .lock()
            .map(|mut outcomes| outcomes.pop_front().unwrap_or(false))
            .unwrap_or(false)
    }
}
