use martlock_core::ServiceState;
use martlock_locking::LockError;
use thiserror::Error;

/// Failure modes of [`crate::SchedulingService::submit`] that are not
/// themselves a [`crate::TaskOutcome`] — these are raised synchronously and
/// never reach a task body.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("scheduler is not in an available state (found {0:?})")]
    NotReady(ServiceState),
    #[error(transparent)]
    Lock(#[from] LockError),
}
