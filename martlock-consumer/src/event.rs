use martlock_core::ResourceKey;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An entity-resolution change event: the resource it affects, plus an
/// opaque JSON payload the projection layer will turn into a row. Modeled
/// on the donor's `Event<P>` header/payload split, collapsed to the one
/// field the locking path actually needs — the affected [`ResourceKey`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub event_id: u64,
    pub resource_key: ResourceKey,
    pub payload: Value,
}

impl ChangeEvent {
    pub fn new(event_id: u64, resource_key: ResourceKey, payload: Value) -> Self {
        Self {
            event_id,
            resource_key,
            payload,
        }
    }
}
