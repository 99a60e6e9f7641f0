//! Per-base-name mutual exclusion
//!
//! Two requests whose media resolve to the same base name would otherwise
//! delete and rewrite each other's artifacts. Runs take an [`ArtifactGuard`]
//! for their base name before cleaning and hold it until they finish.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::OwnedMutexGuard;

type Registry = Arc<Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>>;

/// Registry of in-flight base names
#[derive(Clone, Default)]
pub struct ArtifactLocks {
    registry: Registry,
}

impl ArtifactLocks {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until no other run holds `base_name`, then hold it
    pub async fn acquire(&self, base_name: &str) -> ArtifactGuard {
        let lock = {
            let mut registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
            registry.entry(base_name.to_string()).or_default().clone()
        };

        let guard = lock.lock_owned().await;
        ArtifactGuard {
            base_name: base_name.to_string(),
            registry: self.registry.clone(),
            guard: Some(guard),
        }
    }

    /// Number of base names currently held or awaited
    pub fn in_flight(&self) -> usize {
        self.registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Exclusive hold on one base name; released on drop
pub struct ArtifactGuard {
    base_name: String,
    registry: Registry,
    guard: Option<OwnedMutexGuard<()>>,
}

impl ArtifactGuard {
    /// Base name this guard holds
    pub fn base_name(&self) -> &str {
        &self.base_name
    }
}

impl Drop for ArtifactGuard {
    fn drop(&mut self) {
        // release first so the strong count below only sees the registry and waiters
        drop(self.guard.take());

        let mut registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
        if registry
            .get(&self.base_name)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            registry.remove(&self.base_name);
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_release_forgets_name() {
        let locks = ArtifactLocks::new();

        let guard = locks.acquire("My_Song").await;
        assert_eq!(guard.base_name(), "My_Song");
        assert_eq!(locks.in_flight(), 1);

        drop(guard);
        assert_eq!(locks.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_same_name_waits_for_release() {
        let locks = ArtifactLocks::new();
        let first = locks.acquire("clip").await;

        let blocked = tokio::time::timeout(Duration::from_millis(50), locks.acquire("clip")).await;
        assert!(blocked.is_err(), "second acquire must wait");

        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move { locks.acquire("clip").await.base_name().to_string() })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        drop(first);

        let name = tokio::time::timeout(Duration::from_secs(5), waiter)
            .await
            .expect("waiter should be released")
            .unwrap();
        assert_eq!(name, "clip");
        assert_eq!(locks.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_different_names_do_not_block() {
        let locks = ArtifactLocks::new();
        let _a = locks.acquire("a").await;

        let b = tokio::time::timeout(Duration::from_millis(500), locks.acquire("b")).await;
        assert!(b.is_ok());
        assert_eq!(locks.in_flight(), 2);
    }

    #[tokio::test]
    async fn test_entry_kept_while_waiter_pending() {
        let locks = ArtifactLocks::new();
        let first = locks.acquire("x").await;

        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire("x").await;
                tokio::time::sleep(Duration::from_millis(20)).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        drop(first);
        // the waiter now owns the lock, so the name is still registered
        waiter.await.unwrap();
        assert_eq!(locks.in_flight(), 0);
    }
}
