//! Operation-level errors for the locking service.

use martlock_core::ServiceState;
use thiserror::Error;

/// Failure modes of [`crate::LockingService::acquire`]/`release` that are
/// not themselves reason to block or wait.
///
/// spec.md's abstract contract also names a `NullPointer` category (null
/// key set, null element, null token) — Rust's type system makes all three
/// unreachable here: `HashSet<ResourceKey>` cannot contain an absent key,
/// and `&LockToken` is always a valid reference, never null. There is
/// nothing for this enum to represent in their place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LockError {
    #[error("key set must not be empty")]
    EmptyKeySet,
    #[error("service is not in an available state (found {0:?})")]
    IllegalState(ServiceState),
    #[error("token {0} is not held by this service")]
    UnrecognizedToken(u64),
}
