use std::collections::VecDeque;
use std::sync::Mutex;

use tracing::debug;

use crate::event::ChangeEvent;
use crate::ChangeEventConsumer;

/// A `ChangeEventConsumer` backed by an in-process queue, for tests and the
/// binary's demo mode. `nack` re-enqueues the event at the back of the
/// queue; there is no redelivery-count limit or backoff, since this is a
/// test double and not a production broker client.
#[derive(Default)]
pub struct InMemoryChangeEventConsumer {
    queue: Mutex<VecDeque<ChangeEvent>>,
}

impl InMemoryChangeEventConsumer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues an event for a future `poll()` to return.
    pub fn push(&self, event: ChangeEvent) {
        self.queue.lock().expect("consumer queue mutex poisoned").push_back(event);
    }

    pub fn is_empty(&self) -> bool {
        self.queue.lock().expect("consumer queue mutex poisoned").is_empty()
    }
}

impl ChangeEventConsumer for InMemoryChangeEventConsumer {
    fn poll(&self) -> Option<ChangeEvent> {
        self.queue.lock().expect("consumer queue mutex poisoned").pop_front()
    }

    fn ack(&self, event_id: u64) {
        debug!(event_id, "change event acknowledged");
    }

    fn nack(&self, event_id: u64) {
        debug!(event_id, "change event nacked; no redelivery policy in the in-memory double");
    }
}
