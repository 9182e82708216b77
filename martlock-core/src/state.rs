//! Shared lifecycle state machine for services in the replicator.
//!
//! Every service that follows this discipline — the locking service, the
//! scheduler, the change-event consumer — exposes a [`ServiceState`] and
//! transitions it only under its own mutex, broadcasting a condition
//! signal on every change so threads parked on `acquire`/`destroy`/drain
//! wake up and re-check. [`ServiceLifecycle`] packages that discipline for
//! services whose bookkeeping does not need to share the same mutex as the
//! state machine; `martlock-locking`'s `ProcessScopeLockingService` keeps
//! state inline with its occupancy bookkeeping instead, because its wait
//! loop must wake on both a key becoming free *and* the service leaving an
//! available state under one lock (see DESIGN.md).

use serde::{Deserialize, Serialize};
use std::sync::{Condvar, Mutex};
use thiserror::Error;

/// One-way lifecycle states shared by every long-lived service in this
/// workspace. Not every service uses every state — the locking service
/// uses `Initialized`, a scheduler-like service might land on `Ready`
/// instead — but all services share the same forward-only ordering and
/// the same `is_available` predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceState {
    Uninitialized,
    Initializing,
    Initialized,
    Ready,
    Active,
    Consuming,
    Destroying,
    Destroyed,
}

impl ServiceState {
    /// Holds exactly in `Initialized`/`Ready` (post-init, pre-use) and
    /// `Active`/`Consuming` (in active use). A service in any other state
    /// cannot accept new work.
    pub fn is_available(self) -> bool {
        matches!(
            self,
            ServiceState::Initialized
                | ServiceState::Ready
                | ServiceState::Active
                | ServiceState::Consuming
        )
    }
}

/// Raised when an operation is attempted from a state that forbids it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("illegal state: expected {expected:?}, found {actual:?}")]
pub struct IllegalStateError {
    pub expected: ServiceState,
    pub actual: ServiceState,
}

/// Which party is responsible for finishing a destroy sequence, returned
/// by [`ServiceLifecycle::begin_destroy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestroyResponsibility {
    /// This call performed the transition to `Destroying`; the caller must
    /// drain outstanding work and then call
    /// [`ServiceLifecycle::finish_destroy`].
    Caller,
    /// Another thread is already destroying the service; the caller should
    /// just wait via [`ServiceLifecycle::wait_for_destroyed`].
    InProgress,
    /// The service was already `Destroyed`, or was `Uninitialized` and has
    /// now been moved straight to `Destroyed` by this call.
    AlreadyDestroyed,
}

/// A `Mutex<ServiceState>` + `Condvar` pair implementing the transition
/// rules of spec 4.3: `init` only from `Uninitialized`; `destroy`
/// idempotent and draining; `is_available` per [`ServiceState::is_available`].
pub struct ServiceLifecycle {
    state: Mutex<ServiceState>,
    condvar: Condvar,
}

impl Default for ServiceLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceLifecycle {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ServiceState::Uninitialized),
            condvar: Condvar::new(),
        }
    }

    pub fn state(&self) -> ServiceState {
        *self.state.lock().expect("service lifecycle mutex poisoned")
    }

    pub fn is_available(&self) -> bool {
        self.state().is_available()
    }

    /// Transitions `Uninitialized -> Initializing`. Callers finish with
    /// [`Self::finish_init`] on success or [`Self::fail_init`] on failure.
    pub fn begin_init(&self) -> Result<(), IllegalStateError> {
        let mut guard = self.state.lock().expect("service lifecycle mutex poisoned");
        if *guard != ServiceState::Uninitialized {
            return Err(IllegalStateError {
                expected: ServiceState::Uninitialized,
                actual: *guard,
            });
        }
        *guard = ServiceState::Initializing;
        self.condvar.notify_all();
        Ok(())
    }

    pub fn finish_init(&self, ready_state: ServiceState) {
        let mut guard = self.state.lock().expect("service lifecycle mutex poisoned");
        *guard = ready_state;
        self.condvar.notify_all();
    }

    /// Rolls back to `Uninitialized` so a failed `init` can be retried.
    pub fn fail_init(&self) {
        let mut guard = self.state.lock().expect("service lifecycle mutex poisoned");
        *guard = ServiceState::Uninitialized;
        self.condvar.notify_all();
    }

    /// Idempotent destroy entry point (spec 4.3).
    pub fn begin_destroy(&self) -> DestroyResponsibility {
        let mut guard = self.state.lock().expect("service lifecycle mutex poisoned");
        match *guard {
            ServiceState::Uninitialized => {
                *guard = ServiceState::Destroyed;
                self.condvar.notify_all();
                DestroyResponsibility::AlreadyDestroyed
            }
            ServiceState::Destroyed => DestroyResponsibility::AlreadyDestroyed,
            ServiceState::Destroying => DestroyResponsibility::InProgress,
            _ => {
                *guard = ServiceState::Destroying;
                self.condvar.notify_all();
                DestroyResponsibility::Caller
            }
        }
    }

    pub fn finish_destroy(&self) {
        let mut guard = self.state.lock().expect("service lifecycle mutex poisoned");
        *guard = ServiceState::Destroyed;
        self.condvar.notify_all();
    }

    pub fn wait_for_destroyed(&self) {
        let guard = self.state.lock().expect("service lifecycle mutex poisoned");
        let _guard = self
            .condvar
            .wait_while(guard, |s| *s != ServiceState::Destroyed)
            .expect("service lifecycle mutex poisoned");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_available_holds_in_active_states_only() {
        assert!(!ServiceState::Uninitialized.is_available());
        assert!(!ServiceState::Initializing.is_available());
        assert!(ServiceState::Initialized.is_available());
        assert!(ServiceState::Ready.is_available());
        assert!(ServiceState::Active.is_available());
        assert!(ServiceState::Consuming.is_available());
        assert!(!ServiceState::Destroying.is_available());
        assert!(!ServiceState::Destroyed.is_available());
    }

    #[test]
    fn init_succeeds_once_from_uninitialized() {
        let lifecycle = ServiceLifecycle::new();
        lifecycle.begin_init().unwrap();
        lifecycle.finish_init(ServiceState::Initialized);
        assert_eq!(lifecycle.state(), ServiceState::Initialized);
    }

    #[test]
    fn repeat_init_is_rejected() {
        let lifecycle = ServiceLifecycle::new();
        lifecycle.begin_init().unwrap();
        lifecycle.finish_init(ServiceState::Initialized);
        let err = lifecycle.begin_init().unwrap_err();
        assert_eq!(err.expected, ServiceState::Uninitialized);
        assert_eq!(err.actual, ServiceState::Initialized);
    }

    #[test]
    fn destroy_from_uninitialized_is_immediate() {
        let lifecycle = ServiceLifecycle::new();
        let responsibility = lifecycle.begin_destroy();
        assert_eq!(responsibility, DestroyResponsibility::AlreadyDestroyed);
        assert_eq!(lifecycle.state(), ServiceState::Destroyed);
    }

    #[test]
    fn destroy_from_initialized_drains_then_finishes() {
        let lifecycle = ServiceLifecycle::new();
        lifecycle.begin_init().unwrap();
        lifecycle.finish_init(ServiceState::Initialized);

        let responsibility = lifecycle.begin_destroy();
        assert_eq!(responsibility, DestroyResponsibility::Caller);
        assert_eq!(lifecycle.state(), ServiceState::Destroying);

        lifecycle.finish_destroy();
        assert_eq!(lifecycle.state(), ServiceState::Destroyed);
    }

    #[test]
    fn repeat_destroy_reports_in_progress_or_done() {
        let lifecycle = ServiceLifecycle::new();
        lifecycle.begin_init().unwrap();
        lifecycle.finish_init(ServiceState::Initialized);
        assert_eq!(lifecycle.begin_destroy(), DestroyResponsibility::Caller);
        assert_eq!(lifecycle.begin_destroy(), DestroyResponsibility::InProgress);
        lifecycle.finish_destroy();
        assert_eq!(
            lifecycle.begin_destroy(),
            DestroyResponsibility::AlreadyDestroyed
        );
    }
}
