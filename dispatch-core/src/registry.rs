//! Worker registry: ordered collection of descriptors behind a readers-writer
//! lock. Selection and probing take the read side; registration takes the
//! write side.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::descriptor::WorkerDescriptor;
use crate::types::WorkerId;

/// Result of `register`: the id, and whether this call actually created a
/// new descriptor or found an existing one for the same address.
pub struct RegisterOutcome {
    pub id: WorkerId,
    pub already_registered: bool,
}

pub struct WorkerRegistry {
    descriptors: RwLock<Vec<Arc<WorkerDescriptor>>>,
    by_address: RwLock<HashMap<String, WorkerId>>,
    /// Round-robin cursor. A plain atomic, not the descriptor lock — a
    /// double-pick under concurrent selection is a benign race, not a bug.
    last_selected: AtomicUsize,
    default_capacity: usize,
}

impl WorkerRegistry {
    pub fn new(default_capacity: usize) -> Self {
        Self {
            descriptors: RwLock::new(Vec::new()),
            by_address: RwLock::new(HashMap::new()),
            last_selected: AtomicUsize::new(0),
            default_capacity,
        }
    }

    /// Insert a new descriptor for `address` if none exists yet; otherwise
    /// return the existing id.
    pub async fn register(&self, address: &str) -> RegisterOutcome {
        // Fast path: read lock only, the common case after warm-up.
        if let Some(id) = self.by_address.read().await.get(address).copied() {
            return RegisterOutcome {
                id,
                already_registered: true,
            };
        }

        let mut descriptors = self.descriptors.write().await;
        let mut by_address = self.by_address.write().await;

        // Re-check under the write lock in case of a race between the read
        // check above and acquiring the write lock.
        if let Some(id) = by_address.get(address).copied() {
            return RegisterOutcome {
                id,
                already_registered: true,
            };
        }

        let id = WorkerId(descriptors.len() as u64 + 1);
        descriptors.push(Arc::new(WorkerDescriptor::new(
            id,
            address.to_string(),
            self.default_capacity,
        )));
        by_address.insert(address.to_string(), id);

        RegisterOutcome {
            id,
            already_registered: false,
        }
    }

    /// Snapshot of descriptor references, safe to iterate outside the lock.
    pub async fn snapshot(&self) -> Vec<Arc<WorkerDescriptor>> {
        self.descriptors.read().await.clone()
    }

    pub async fn get(&self, id: WorkerId) -> Option<Arc<WorkerDescriptor>> {
        self.descriptors
            .read()
            .await
            .iter()
            .find(|d| d.id == id)
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.descriptors.read().await.len()
    }

    pub(crate) fn cursor(&self) -> &AtomicUsize {
        &self.last_selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn idempotent_registration_returns_the_same_id() {
        let reg = WorkerRegistry::new(100);
        let first = reg.register("w1:8080").await;
        assert!(!first.already_registered);
        let second = reg.register("w1:8080").await;
        assert!(second.already_registered);
        assert_eq!(first.id, second.id);
        assert_eq!(reg.len().await, 1);
    }

    #[tokio::test]
    async fn distinct_addresses_get_distinct_ids() {
        let reg = WorkerRegistry::new(100);
        let a = reg.register("w1:8080").await;
        let b = reg.register("w2:8080").await;
        assert_ne!(a.id, b.id);
        assert_eq!(reg.len().await, 2);
    }
}
