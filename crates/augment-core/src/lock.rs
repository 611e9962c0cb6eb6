//! Per-actor lock registry
//!
//! One async mutex per actor id, created on first use and kept for the life
//! of the process. The actor id space is bounded and reused, so the table
//! does not grow per operation.

use crate::types::ActorId;
use dashmap::DashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Shared handle to one actor's lock
#[derive(Debug, Clone)]
pub struct LockToken {
    actor: ActorId,
    inner: Arc<Mutex<()>>,
}

impl LockToken {
    /// Actor this token serializes
    #[inline]
    #[must_use]
    pub fn actor(&self) -> ActorId {
        self.actor
    }

    /// Whether two tokens guard the same actor lock
    #[inline]
    #[must_use]
    pub fn same_lock(&self, other: &LockToken) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Wait for exclusive ownership
    pub async fn lock(&self) -> ActorGuard {
        ActorGuard {
            actor: self.actor,
            _guard: Arc::clone(&self.inner).lock_owned().await,
        }
    }
}

/// Exclusive ownership of one actor's lock, released on drop
#[derive(Debug)]
pub struct ActorGuard {
    actor: ActorId,
    _guard: OwnedMutexGuard<()>,
}

impl ActorGuard {
    /// Actor held by this guard
    #[inline]
    #[must_use]
    pub fn actor(&self) -> ActorId {
        self.actor
    }
}

/// Registry of per-actor locks
#[derive(Debug, Default)]
pub struct LockRegistry {
    locks: DashMap<ActorId, Arc<Mutex<()>>>,
}

impl LockRegistry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }

    /// Token for an actor, creating it on first use
    #[must_use]
    pub fn acquire(&self, actor: ActorId) -> LockToken {
        let inner = self
            .locks
            .entry(actor)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .value()
            .clone();
        LockToken { actor, inner }
    }

    /// Wait for exclusive ownership of an actor's lock
    pub async fn lock(&self, actor: ActorId) -> ActorGuard {
        self.acquire(actor).lock().await
    }

    /// Run `f` while holding the actor's lock
    pub async fn with_lock<F, Fut, T>(&self, actor: ActorId, f: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let _guard = self.lock(actor).await;
        f().await
    }

    /// Number of actors seen so far
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// Whether no actor has been seen yet
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn acquire_is_idempotent_per_actor() {
        let registry = LockRegistry::new();

        let a1 = registry.acquire(ActorId(1));
        let a2 = registry.acquire(ActorId(1));
        let b = registry.acquire(ActorId(2));

        assert!(a1.same_lock(&a2));
        assert!(!a1.same_lock(&b));
        assert_eq!(registry.len(), 2);
    }

    #[tokio::test]
    async fn same_actor_is_serialized() {
        let registry = Arc::new(LockRegistry::new());
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let registry = Arc::clone(&registry);
            let active = Arc::clone(&active);
            let peak = Arc::clone(&peak);
            handles.push(tokio::spawn(async move {
                registry
                    .with_lock(ActorId(7), || async {
                        let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(now, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(2)).await;
                        active.fetch_sub(1, Ordering::SeqCst);
                    })
                    .await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn different_actors_do_not_block() {
        let registry = LockRegistry::new();

        let _held = registry.lock(ActorId(1)).await;
        let other = tokio::time::timeout(Duration::from_millis(100), registry.lock(ActorId(2))).await;

        assert!(other.is_ok());
    }

    #[tokio::test]
    async fn guard_release_unblocks_waiter() {
        let registry = LockRegistry::new();

        let held = registry.lock(ActorId(3)).await;
        let blocked =
            tokio::time::timeout(Duration::from_millis(20), registry.lock(ActorId(3))).await;
        assert!(blocked.is_err());

        drop(held);
        let guard = registry.lock(ActorId(3)).await;
        assert_eq!(guard.actor(), ActorId(3));
    }
}
