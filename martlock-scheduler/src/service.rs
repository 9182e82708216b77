use std::panic::{self, AssertUnwindSafe};

use martlock_core::{MartlockConfig, ServiceLifecycle, ServiceSetupError, ServiceState};
use martlock_locking::LockingService;
use tracing::{debug, warn};

use crate::config::SchedulerConfig;
use crate::error::SchedulerError;
use crate::task::{Task, TaskOutcome};

/// Dispatches [`Task`]s through an owned [`LockingService`], acquiring the
/// task's resource keys before running its body and always releasing them
/// afterward — success, returned error, or caught panic.
///
/// Shares the lifecycle discipline of spec.md 4.3 via
/// [`martlock_core::ServiceLifecycle`], but keeps that state separate from
/// the locking service's own: `init`/`destroy` here only gate whether
/// `submit` accepts new work, and `destroy` here does not drain in-flight
/// locks itself — it delegates to the owned `LockingService::destroy`,
/// which does.
pub struct SchedulingService {
    lifecycle: ServiceLifecycle,
    config: SchedulerConfig,
    locking: Box<dyn LockingService>,
}

impl SchedulingService {
    pub fn new(locking: Box<dyn LockingService>, config: SchedulerConfig) -> Self {
        Self {
            lifecycle: ServiceLifecycle::new(),
            config,
            locking,
        }
    }

    pub fn state(&self) -> ServiceState {
        self.lifecycle.state()
    }

    /// Initializes both this service and the locking service it owns.
    pub fn init(&self) -> Result<(), ServiceSetupError> {
        self.lifecycle
            .begin_init()
            .map_err(|err| ServiceSetupError::new(err.to_string()))?;
        if let Err(err) = self.locking.init(Some(MartlockConfig::default())) {
            self.lifecycle.fail_init();
            return Err(err);
        }
        self.lifecycle.finish_init(ServiceState::Ready);
        Ok(())
    }

    /// Acquires `task`'s resource keys, runs its body, and releases them
    /// unconditionally before returning. A contended acquisition is not an
    /// error: it is reported as [`TaskOutcome::LockContended`].
    pub fn submit(&self, task: Task) -> Result<TaskOutcome, SchedulerError> {
        if !self.lifecycle.is_available() {
            return Err(SchedulerError::NotReady(self.lifecycle.state()));
        }

        let wait = task.wait.unwrap_or(self.config.default_wait.into_wait_policy());
        let token = match self.locking.acquire(task.resource_keys, wait)? {
            Some(token) => token,
            None => {
                debug!("task dropped: resource keys contended");
                return Ok(TaskOutcome::LockContended);
            }
        };

        let outcome = match panic::catch_unwind(AssertUnwindSafe(task.body)) {
            Ok(Ok(())) => TaskOutcome::Completed,
            Ok(Err(message)) => TaskOutcome::Failed(message),
            Err(payload) => TaskOutcome::Panicked(panic_message(payload)),
        };

        if let Err(err) = self.locking.release(&token) {
            warn!(error = %err, "failed to release lock token after task completion");
        }

        Ok(outcome)
    }

    /// Delegates to the owned `LockingService::destroy`, which drains
    /// in-flight holders, then marks this service destroyed.
    pub fn shutdown(&self) {
        if self.lifecycle.begin_destroy() == martlock_core::DestroyResponsibility::Caller {
            self.locking.destroy();
            self.lifecycle.finish_destroy();
        } else {
            self.lifecycle.wait_for_destroyed();
        }
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "task panicked with a non-string payload".to_string()
    }
}
