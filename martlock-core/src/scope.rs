//! Reach of a lock token's validity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed enumeration of the reach a [`crate::LockToken`] can claim.
///
/// Declared in the order `Process, Localhost, Cluster`. Only `Process` has
/// an implementation in this workspace; `Localhost` and `Cluster` are
/// reserved names for cross-host and cross-cluster coordination policies
/// that are out of scope for the in-process core (see spec Non-goals).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum LockScope {
    Process,
    Localhost,
    Cluster,
}

impl fmt::Display for LockScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LockScope::Process => "PROCESS",
            LockScope::Localhost => "LOCALHOST",
            LockScope::Cluster => "CLUSTER",
        };
        write!(f, "{name}")
    }
}
