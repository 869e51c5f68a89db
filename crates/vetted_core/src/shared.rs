//! Thread-shared entity handle.
//!
//! # Responsibility
//! - Let several threads use one entity through a mutex.
//! - Keep the lock and the entity inside closures so no reference escapes.
//!
//! # Invariants
//! - The guard never leaves `with` / `with_mut`.
//! - A poisoned lock is recovered; entity invariants still hold because
//!   mutations are all-or-nothing.

use log::warn;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Cloneable handle to one entity shared across threads.
#[derive(Debug, Default)]
pub struct Shared<T> {
    inner: Arc<Mutex<T>>,
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Shared<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(value)),
        }
    }

    /// Runs `f` with read access under the lock; callers are serialized.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let guard = self.lock();
        f(&guard)
    }

    /// Runs `f` with exclusive access; other callers wait for it to finish.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut guard = self.lock();
        f(&mut guard)
    }

    /// Number of live handles to the same entity.
    pub fn handle_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    fn lock(&self) -> MutexGuard<'_, T> {
        // Why: a panic inside a closure cannot leave a half-applied write,
        // so the value behind a poisoned lock is still valid.
        self.inner.lock().unwrap_or_else(|poisoned: PoisonError<_>| {
            warn!("event=shared_lock module=shared status=recovered reason=poisoned");
            poisoned.into_inner()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::Shared;
    use crate::model::account::{Account, AccountOptions};
    use std::thread;

    #[test]
    fn concurrent_withdrawals_never_overdraw() {
        let shared = Shared::new(Account::open(1_000, &AccountOptions::default()).unwrap());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let account = shared.clone();
                thread::spawn(move || {
                    let mut applied = 0;
                    for _ in 0..50 {
                        if account.with_mut(|a| a.withdraw(10)).is_ok() {
                            applied += 1;
                        }
                    }
                    applied
                })
            })
            .collect();

        let applied: i64 = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(applied, 100);
        assert_eq!(shared.with(Account::balance), 0);
    }

    #[test]
    fn read_access_holds_the_same_lock_as_writes() {
        let shared = Shared::new(3_i64);
        let held = shared.with(|value| {
            assert_eq!(*value, 3);
            shared.inner.try_lock().is_err()
        });
        assert!(held);
        assert!(shared.inner.try_lock().is_ok());
    }

    #[test]
    fn clones_share_one_value() {
        let first = Shared::new(1_i64);
        let second = first.clone();
        second.with_mut(|value| *value += 1);
        assert_eq!(first.with(|value| *value), 2);
        assert_eq!(first.handle_count(), 2);
    }

    #[test]
    fn poisoned_lock_is_recovered() {
        let shared = Shared::new(5_i64);
        let poisoner = shared.clone();
        let _ = thread::spawn(move || {
            poisoner.with_mut(|_| panic!("poison the lock"));
        })
        .join();

        assert_eq!(shared.with(|value| *value), 5);
    }
}
