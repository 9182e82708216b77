//! Configuration accepted by locking-service implementations.

use serde::{Deserialize, Serialize};

/// Structured configuration passed to `LockingService::init`. The
/// process-scoped implementation recognizes no options yet — passing
/// `None` to `init` is equivalent to `Some(MartlockConfig::default())`.
/// Future host/cluster scopes are expected to extend this with addressing
/// fields (see spec.md 6).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MartlockConfig {}
