//! The in-process `LockingService` implementation (spec.md 4.5).
//!
//! Deadlock avoidance does not come from tracking a wait-for graph between
//! threads. It comes from a single rule: every caller sorts its key set
//! into the same global order (`ResourceKey`'s `Ord`) before taking
//! anything, so two callers requesting overlapping key sets always try to
//! take their shared keys in the same relative order. A cycle would
//! require two callers to disagree about that order, which the sort makes
//! impossible.
//!
//! State (`ServiceState`) and occupancy bookkeeping live behind the *same*
//! mutex, and waiters block on one condition variable, because a parked
//! `acquire` needs to wake on either event: a key becoming free, or the
//! service leaving an available state. Splitting them across two locks
//! would mean waking on one and then re-checking the other under a
//! separately-acquired lock, which reopens the race this design avoids.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};

use martlock_core::{LockScope, LockToken, MartlockConfig, ResourceKey, ServiceSetupError, ServiceState};

use crate::interrupt::Interrupt;
use crate::service::{LockingService, WaitPolicy};
use crate::LockError;

/// Who holds a given key right now, recorded so `dump_locks` and internal
/// consistency checks can report more than just "taken".
#[derive(Debug, Clone, Copy)]
struct Occupant {
    token_id: u64,
    thread_id: ThreadId,
}

struct Inner {
    state: ServiceState,
    occupancy: HashMap<ResourceKey, Occupant>,
    by_token: HashMap<u64, Vec<ResourceKey>>,
}

/// Grants locks scoped to the current OS process. The only implementation
/// this workspace ships; host- and cluster-scoped variants are future work
/// (spec.md 6 lists them as analogous collaborators, not as something this
/// crate must provide today).
pub struct ProcessScopeLockingService {
    inner: Mutex<Inner>,
    condvar: Arc<Condvar>,
}

impl Default for ProcessScopeLockingService {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessScopeLockingService {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                state: ServiceState::Uninitialized,
                occupancy: HashMap::new(),
                by_token: HashMap::new(),
            }),
            condvar: Arc::new(Condvar::new()),
        }
    }

    /// Creates an [`Interrupt`] handle tied to this service's condition
    /// variable, so `set()` on it promptly wakes a waiter parked in
    /// [`Self::acquire_interruptible`].
    pub fn new_interrupt(&self) -> Interrupt {
        Interrupt::new(Arc::clone(&self.condvar))
    }

    /// Writes a snapshot of current occupancy, keyed lock by lock, to
    /// stderr. Intended for operator debugging, not machine consumption.
    pub fn dump_locks(&self) {
        let guard = self.inner.lock().expect("locking service mutex poisoned");
        eprintln!("*** lock occupancy snapshot ***");
        if guard.occupancy.is_empty() {
            eprintln!("(no locks held)");
        }
        let mut entries: Vec<_> = guard.occupancy.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        for (key, occupant) in entries {
            eprintln!(
                "  {key} held by token {} (thread {:?})",
                occupant.token_id, occupant.thread_id
            );
        }
        eprintln!("*** end lock occupancy snapshot ***");
    }

    /// Same contract as [`LockingService::acquire`], but a parked wait can
    /// also be cut short by calling [`Interrupt::set`] on `interrupt`.
    pub fn acquire_interruptible(
        &self,
        keys: HashSet<ResourceKey>,
        wait: WaitPolicy,
        interrupt: &Interrupt,
    ) -> Result<Option<LockToken>, LockError> {
        if keys.is_empty() {
            return Err(LockError::EmptyKeySet);
        }
        let mut sorted: Vec<ResourceKey> = keys.into_iter().collect();
        sorted.sort();
        sorted.dedup();

        let deadline = match wait {
            WaitPolicy::Bounded(d) => Some(Instant::now() + d),
            _ => None,
        };
        let thread_id = thread::current().id();

        let mut guard = self.inner.lock().expect("locking service mutex poisoned");
        if !guard.state.is_available() {
            return Err(LockError::IllegalState(guard.state));
        }

        loop {
            if interrupt.is_set() || !guard.state.is_available() {
                return Ok(None);
            }

            let blocked = sorted.iter().any(|key| guard.occupancy.contains_key(key));
            if !blocked {
                let token = LockToken::new(LockScope::Process);
                for key in &sorted {
                    guard.occupancy.insert(
                        key.clone(),
                        Occupant {
                            token_id: token.token_id(),
                            thread_id,
                        },
                    );
                }
                guard.by_token.insert(token.token_id(), sorted.clone());
                tracing::debug!(token = %token, keys = sorted.len(), "lock acquired");
                return Ok(Some(token));
            }

            match wait {
                WaitPolicy::NonBlocking => return Ok(None),
                WaitPolicy::Indefinite => {
                    guard = self.condvar.wait(guard).expect("locking service mutex poisoned");
                }
                WaitPolicy::Bounded(_) => {
                    let deadline = deadline.expect("bounded wait always has a deadline");
                    let now = Instant::now();
                    if now >= deadline {
                        return Ok(None);
                    }
                    let remaining = deadline.saturating_duration_since(now).max(Duration::from_millis(1));
                    let (new_guard, _) = self
                        .condvar
                        .wait_timeout(guard, remaining)
                        .expect("locking service mutex poisoned");
                    guard = new_guard;
                }
            }
        }
    }
}

impl LockingService for ProcessScopeLockingService {
    fn init(&self, config: Option<MartlockConfig>) -> Result<(), ServiceSetupError> {
        let _ = config.unwrap_or_default();
        let mut guard = self.inner.lock().expect("locking service mutex poisoned");
        if guard.state != ServiceState::Uninitialized {
            return Err(ServiceSetupError::new(format!(
                "init called from state {:?}, expected Uninitialized",
                guard.state
            )));
        }
        guard.state = ServiceState::Initialized;
        self.condvar.notify_all();
        Ok(())
    }

    fn acquire(
        &self,
        keys: HashSet<ResourceKey>,
        wait: WaitPolicy,
    ) -> Result<Option<LockToken>, LockError> {
        self.acquire_interruptible(keys, wait, &Interrupt::inert())
    }

    fn release(&self, token: &LockToken) -> Result<usize, LockError> {
        let mut guard = self.inner.lock().expect("locking service mutex poisoned");
        if guard.state == ServiceState::Destroyed {
            return Err(LockError::IllegalState(guard.state));
        }
        let keys = guard
            .by_token
            .remove(&token.token_id())
            .ok_or(LockError::UnrecognizedToken(token.token_id()))?;
        for key in &keys {
            match guard.occupancy.remove(key) {
                Some(occupant) if occupant.token_id == token.token_id() => {}
                Some(occupant) => panic!(
                    "lock invariant violated: {key} was recorded under token {} but occupied by token {}",
                    token.token_id(),
                    occupant.token_id
                ),
                None => panic!(
                    "lock invariant violated: {key} was recorded under token {} but had no occupant",
                    token.token_id()
                ),
            }
        }
        tracing::debug!(token = %token, keys = keys.len(), "lock released");
        self.condvar.notify_all();
        Ok(keys.len())
    }

    fn scope(&self) -> LockScope {
        LockScope::Process
    }

    fn state(&self) -> ServiceState {
        self.inner.lock().expect("locking service mutex poisoned").state
    }

    fn destroy(&self) {
        let mut guard = self.inner.lock().expect("locking service mutex poisoned");
        match guard.state {
            ServiceState::Destroyed => return,
            ServiceState::Uninitialized => {
                guard.state = ServiceState::Destroyed;
                self.condvar.notify_all();
                return;
            }
            ServiceState::Destroying => {
                let _guard = self
                    .condvar
                    .wait_while(guard, |inner| inner.state != ServiceState::Destroyed)
                    .expect("locking service mutex poisoned");
                return;
            }
            _ => {
                guard.state = ServiceState::Destroying;
                self.condvar.notify_all();
            }
        }

        guard = self
            .condvar
            .wait_while(guard, |inner| !inner.by_token.is_empty())
            .expect("locking service mutex poisoned");
        guard.state = ServiceState::Destroyed;
        tracing::debug!("locking service destroyed");
        self.condvar.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    fn key(resource_type: &str, component: &str) -> ResourceKey {
        ResourceKey::new(resource_type, vec![component.to_string()]).unwrap()
    }

    fn keys(pairs: &[(&str, &str)]) -> HashSet<ResourceKey> {
        pairs.iter().map(|(t, c)| key(t, c)).collect()
    }

    fn ready_service() -> ProcessScopeLockingService {
        let service = ProcessScopeLockingService::new();
        service.init(None).unwrap();
        service
    }

    #[test]
    fn acquire_before_init_is_illegal_state() {
        let service = ProcessScopeLockingService::new();
        let err = service.acquire(keys(&[("record", "1")]), WaitPolicy::NonBlocking).unwrap_err();
        assert_eq!(err, LockError::IllegalState(ServiceState::Uninitialized));
    }

    #[test]
    fn empty_key_set_is_rejected() {
        let service = ready_service();
        let err = service.acquire(HashSet::new(), WaitPolicy::NonBlocking).unwrap_err();
        assert_eq!(err, LockError::EmptyKeySet);
    }

    #[test]
    fn single_acquire_then_release_round_trips() {
        let service = ready_service();
        let token = service
            .acquire(keys(&[("record", "1")]), WaitPolicy::NonBlocking)
            .unwrap()
            .expect("uncontended acquire must succeed");
        assert_eq!(token.scope(), LockScope::Process);
        let released = service.release(&token).unwrap();
        assert_eq!(released, 1);
    }

    #[test]
    fn duplicate_keys_collapse_to_one_occupancy_entry() {
        let service = ready_service();
        let mut only = HashSet::new();
        only.insert(key("record", "1"));
        let token = service.acquire(only, WaitPolicy::NonBlocking).unwrap().unwrap();
        assert_eq!(service.release(&token).unwrap(), 1);
    }

    #[test]
    fn non_blocking_acquire_on_contended_key_returns_none() {
        let service = ready_service();
        let token = service
            .acquire(keys(&[("record", "1")]), WaitPolicy::NonBlocking)
            .unwrap()
            .unwrap();
        let second = service
            .acquire(keys(&[("record", "1")]), WaitPolicy::NonBlocking)
            .unwrap();
        assert!(second.is_none());
        service.release(&token).unwrap();
    }

    #[test]
    fn bounded_wait_times_out_when_key_stays_held() {
        let service = ready_service();
        let token = service
            .acquire(keys(&[("record", "1")]), WaitPolicy::NonBlocking)
            .unwrap()
            .unwrap();
        let start = Instant::now();
        let second = service
            .acquire(keys(&[("record", "1")]), WaitPolicy::Bounded(Duration::from_millis(50)))
            .unwrap();
        assert!(second.is_none());
        assert!(start.elapsed() >= Duration::from_millis(50));
        service.release(&token).unwrap();
    }

    #[test]
    fn bounded_wait_succeeds_once_the_holder_releases() {
        let service = Arc::new(ready_service());
        let token = service
            .acquire(keys(&[("record", "1")]), WaitPolicy::NonBlocking)
            .unwrap()
            .unwrap();

        let waiter = {
            let service = Arc::clone(&service);
            thread::spawn(move || {
                service
                    .acquire(keys(&[("record", "1")]), WaitPolicy::Bounded(Duration::from_secs(2)))
                    .unwrap()
            })
        };

        thread::sleep(Duration::from_millis(50));
        service.release(&token).unwrap();
        let acquired = waiter.join().unwrap();
        assert!(acquired.is_some());
    }

    #[test]
    fn overlapping_key_sets_never_deadlock() {
        // Two threads request overlapping pairs in opposite literal order;
        // the global sort inside acquire should still make them agree.
        let service = Arc::new(ready_service());
        let a = {
            let service = Arc::clone(&service);
            thread::spawn(move || {
                for _ in 0..200 {
                    let token = service
                        .acquire(keys(&[("record", "1"), ("record", "2")]), WaitPolicy::Indefinite)
                        .unwrap()
                        .unwrap();
                    service.release(&token).unwrap();
                }
            })
        };
        let b = {
            let service = Arc::clone(&service);
            thread::spawn(move || {
                for _ in 0..200 {
                    let token = service
                        .acquire(keys(&[("record", "2"), ("record", "1")]), WaitPolicy::Indefinite)
                        .unwrap()
                        .unwrap();
                    service.release(&token).unwrap();
                }
            })
        };
        a.join().unwrap();
        b.join().unwrap();
    }

    #[test]
    fn interrupting_an_indefinite_wait_returns_none() {
        let service = Arc::new(ready_service());
        let token = service
            .acquire(keys(&[("record", "1")]), WaitPolicy::NonBlocking)
            .unwrap()
            .unwrap();
        let interrupt = service.new_interrupt();
        let interrupted = Arc::new(AtomicBool::new(false));

        let waiter = {
            let service = Arc::clone(&service);
            let interrupt = interrupt.clone();
            let interrupted = Arc::clone(&interrupted);
            thread::spawn(move || {
                let result = service
                    .acquire_interruptible(keys(&[("record", "1")]), WaitPolicy::Indefinite, &interrupt)
                    .unwrap();
                interrupted.store(true, Ordering::SeqCst);
                result
            })
        };

        thread::sleep(Duration::from_millis(50));
        interrupt.set();
        let result = waiter.join().unwrap();
        assert!(result.is_none());
        assert!(interrupted.load(Ordering::SeqCst));
        service.release(&token).unwrap();
    }

    #[test]
    fn releasing_a_foreign_token_is_rejected() {
        let service = ready_service();
        let token = service
            .acquire(keys(&[("record", "1")]), WaitPolicy::NonBlocking)
            .unwrap()
            .unwrap();
        service.release(&token).unwrap();
        let err = service.release(&token).unwrap_err();
        assert_eq!(err, LockError::UnrecognizedToken(token.token_id()));
    }

    #[test]
    fn destroy_is_idempotent() {
        let service = ready_service();
        service.destroy();
        service.destroy();
        assert_eq!(service.state(), ServiceState::Destroyed);
    }

    #[test]
    fn destroy_drains_outstanding_locks_before_completing() {
        let service = Arc::new(ready_service());
        let token = service
            .acquire(keys(&[("record", "1")]), WaitPolicy::NonBlocking)
            .unwrap()
            .unwrap();

        let destroyer = {
            let service = Arc::clone(&service);
            thread::spawn(move || service.destroy())
        };

        thread::sleep(Duration::from_millis(50));
        assert_eq!(service.state(), ServiceState::Destroying);
        service.release(&token).unwrap();
        destroyer.join().unwrap();
        assert_eq!(service.state(), ServiceState::Destroyed);
    }

    #[test]
    fn acquire_during_destroy_returns_none_not_an_error() {
        let service = Arc::new(ready_service());
        let token = service
            .acquire(keys(&[("record", "1")]), WaitPolicy::NonBlocking)
            .unwrap()
            .unwrap();

        let destroyer = {
            let service = Arc::clone(&service);
            thread::spawn(move || service.destroy())
        };
        thread::sleep(Duration::from_millis(20));

        let waiter = {
            let service = Arc::clone(&service);
            thread::spawn(move || {
                service
                    .acquire(keys(&[("record", "2")]), WaitPolicy::Indefinite)
                    .unwrap()
            })
        };

        let result = waiter.join().unwrap();
        assert!(result.is_none());
        service.release(&token).unwrap();
        destroyer.join().unwrap();
    }

    #[test]
    fn acquire_after_destroy_is_illegal_state() {
        let service = ready_service();
        service.destroy();
        let err = service.acquire(keys(&[("record", "1")]), WaitPolicy::NonBlocking).unwrap_err();
        assert_eq!(err, LockError::IllegalState(ServiceState::Destroyed));
    }

    #[test]
    fn dump_locks_does_not_panic_when_empty_or_populated() {
        let service = ready_service();
        service.dump_locks();
        let token = service
            .acquire(keys(&[("record", "1")]), WaitPolicy::NonBlocking)
            .unwrap()
            .unwrap();
        service.dump_locks();
        service.release(&token).unwrap();
    }
}
