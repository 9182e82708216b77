use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar};

/// Cooperative stand-in for Java's per-thread interrupt flag (spec.md 4.5
/// step 4). Rust threads have no portable "interrupt this thread" call, so
/// a waiter that wants to be interruptible must be handed one of these
/// before it calls `ProcessScopeLockingService::acquire_interruptible`;
/// any other thread can then call [`Interrupt::set`] to make that wait
/// return `Ok(None)` instead of a lock.
///
/// The flag does not self-clear: once set, it stays set, mirroring the way
/// Java leaves a thread's interrupted status set until something explicitly
/// clears it.
#[derive(Clone)]
pub struct Interrupt {
    flag: Arc<AtomicBool>,
    condvar: Arc<Condvar>,
}

impl Interrupt {
    pub(crate) fn new(condvar: Arc<Condvar>) -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            condvar,
        }
    }

    /// A token that can never be interrupted, used when a caller does not
    /// need interruption support.
    pub(crate) fn inert() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            condvar: Arc::new(Condvar::new()),
        }
    }

    /// Marks this waiter interrupted and wakes it if it is currently parked.
    pub fn set(&self) {
        self.flag.store(true, Ordering::SeqCst);
        self.condvar.notify_all();
    }

    pub fn is_set(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_clear_and_stays_set_once_raised() {
        let interrupt = Interrupt::new(Arc::new(Condvar::new()));
        assert!(!interrupt.is_set());
        interrupt.set();
        assert!(interrupt.is_set());
        assert!(interrupt.is_set());
    }

    #[test]
    fn clone_shares_the_same_flag() {
        let interrupt = Interrupt::new(Arc::new(Condvar::new()));
        let handle = interrupt.clone();
        handle.set();
        assert!(interrupt.is_set());
    }
}
