use std::collections::HashSet;

use martlock_core::ResourceKey;
use martlock_locking::WaitPolicy;

/// One unit of dispatch: the resource keys it touches, an optional wait
/// policy override, and the body to run once those keys are held.
pub struct Task {
    pub resource_keys: HashSet<ResourceKey>,
    pub wait: Option<WaitPolicy>,
    pub body: Box<dyn FnOnce() -> Result<(), String> + Send>,
}

impl Task {
    pub fn new(
        resource_keys: HashSet<ResourceKey>,
        body: impl FnOnce() -> Result<(), String> + Send + 'static,
    ) -> Self {
        Self {
            resource_keys,
            wait: None,
            body: Box::new(body),
        }
    }

    /// Overrides the scheduler's default wait policy for this task alone.
    pub fn with_wait(mut self, wait: WaitPolicy) -> Self {
        self.wait = Some(wait);
        self
    }
}

/// The result of [`crate::SchedulingService::submit`] once the lock
/// acquisition attempt has resolved one way or another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    /// The task body ran to completion without error.
    Completed,
    /// The task body returned an error.
    Failed(String),
    /// The task body panicked; the panic was caught and its message (if
    /// any) recovered.
    Panicked(String),
    /// The required resource keys could not be acquired within the wait
    /// policy in effect.
    LockContended,
}
