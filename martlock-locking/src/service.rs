use std::collections::HashSet;
use std::time::Duration;

use martlock_core::{LockScope, LockToken, MartlockConfig, ServiceSetupError, ServiceState};

use crate::LockError;
use martlock_core::ResourceKey;

/// How long `acquire` is willing to wait for a contended key set, the Rust
/// shape of spec.md 4.4's signed `waitMillis` integer: `0` is non-blocking,
/// a negative value waits indefinitely, a positive value is a bounded wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitPolicy {
    NonBlocking,
    Bounded(Duration),
    Indefinite,
}

impl WaitPolicy {
    /// Reconstructs the three-way `waitMillis` semantics from a signed
    /// millisecond count, for callers translating from a wire value.
    pub fn from_millis(wait_millis: i64) -> Self {
        if wait_millis == 0 {
            WaitPolicy::NonBlocking
        } else if wait_millis < 0 {
            WaitPolicy::Indefinite
        } else {
            WaitPolicy::Bounded(Duration::from_millis(wait_millis as u64))
        }
    }
}

/// A resource-scoped lock manager (spec.md 4.4). Implementations grant
/// locks over sets of [`ResourceKey`]s, returning an opaque [`LockToken`]
/// receipt that must be presented back to release them.
pub trait LockingService: Send + Sync {
    /// Moves the service from `Uninitialized` into an available state.
    /// Calling `init` again before `destroy` is an error.
    fn init(&self, config: Option<MartlockConfig>) -> Result<(), ServiceSetupError>;

    /// Attempts to acquire every key in `keys` atomically: either all of
    /// them are granted under one token, or none are. Returns `Ok(None)`
    /// when the wait policy gives up before the full set became free.
    fn acquire(
        &self,
        keys: HashSet<ResourceKey>,
        wait: WaitPolicy,
    ) -> Result<Option<LockToken>, LockError>;

    /// Releases every key held under `token`, returning how many keys were
    /// released.
    fn release(&self, token: &LockToken) -> Result<usize, LockError>;

    /// The scope this implementation grants locks within.
    fn scope(&self) -> LockScope;

    /// The service's current lifecycle state.
    fn state(&self) -> ServiceState;

    /// Idempotently tears the service down, draining outstanding locks
    /// first. Safe to call more than once and from more than one thread.
    fn destroy(&self);
}
