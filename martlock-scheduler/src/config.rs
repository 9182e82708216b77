use std::time::Duration;

use martlock_locking::WaitPolicy;

/// Configuration for a [`crate::SchedulingService`]. Follows the donor's
/// `from_env()`-constructor convention: every field has an explicit
/// default, and `from_env` only overrides the ones a variable is actually
/// set for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Default wait policy used by [`crate::SchedulingService::submit`] when
    /// a [`crate::Task`] does not specify its own.
    pub default_wait: WaitPolicyConfig,
}

/// A `Copy`/`Eq`-friendly mirror of [`WaitPolicy`] for configuration; see
/// [`WaitPolicyConfig::into_wait_policy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitPolicyConfig {
    NonBlocking,
    BoundedMillis(u64),
    Indefinite,
}

impl WaitPolicyConfig {
    pub fn into_wait_policy(self) -> WaitPolicy {
        match self {
            WaitPolicyConfig::NonBlocking => WaitPolicy::NonBlocking,
            WaitPolicyConfig::BoundedMillis(ms) => WaitPolicy::Bounded(Duration::from_millis(ms)),
            WaitPolicyConfig::Indefinite => WaitPolicy::Indefinite,
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            default_wait: WaitPolicyConfig::BoundedMillis(5_000),
        }
    }
}

impl SchedulerConfig {
    /// Reads `MARTLOCK_LOCK_WAIT_MS` (see `martlock-replicator`'s binary
    /// documentation): `0` means non-blocking, a negative value means
    /// indefinite, anything else is a bounded wait in milliseconds.
    pub fn from_env() -> Self {
        let default_wait = std::env::var("MARTLOCK_LOCK_WAIT_MS")
            .ok()
            .and_then(|raw| raw.parse::<i64>().ok())
            .map(|ms| match ms {
                0 => WaitPolicyConfig::NonBlocking,
                ms if ms < 0 => WaitPolicyConfig::Indefinite,
                ms => WaitPolicyConfig::BoundedMillis(ms as u64),
            })
            .unwrap_or_default();
        Self { default_wait }
    }
}

impl Default for WaitPolicyConfig {
    fn default() -> Self {
        WaitPolicyConfig::BoundedMillis(5_000)
    }
}
