use super::RecordBackend;
use crate::error::ShelfResult;
use crate::store::IndexedCollectionStore;
use async_trait::async_trait;
use shelf_types::Record;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

/// In-memory backend: an [`IndexedCollectionStore`] behind a `RwLock`.
///
/// Reads share the lock; `insert` and `remove` take it exclusively so that
/// concurrent requests never observe a half-applied position shift. The lock
/// is never held across an `.await`.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    store: RwLock<IndexedCollectionStore>,
}

impl MemoryBackend {
    /// Backend over an empty store
    pub fn new() -> Self {
        Self { store: RwLock::new(IndexedCollectionStore::new()) }
    }

    // Records are immutable once stored, so a poisoned lock still guards a
    // consistent store.
    fn read(&self) -> RwLockReadGuard<'_, IndexedCollectionStore> {
        self.store.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, IndexedCollectionStore> {
        self.store.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl RecordBackend for MemoryBackend {
    fn label(&self) -> &'static str {
        "memory"
    }

    async fn insert(&self, record: Record) -> ShelfResult<i64> {
        let position = self.write().append(record);
        debug!(position, "Appended record");
        // Vec lengths never exceed isize::MAX.
        Ok(position as i64)
    }

    async fn list(&self) -> ShelfResult<Vec<Record>> {
        Ok(self.read().list())
    }

    async fn get(&self, address: i64) -> ShelfResult<Record> {
        self.read().get(address).cloned()
    }

    async fn remove(&self, address: i64) -> ShelfResult<Record> {
        let removed = self.write().remove(address)?;
        debug!(position = address, "Removed record");
        Ok(removed)
    }

    async fn len(&self) -> ShelfResult<usize> {
        Ok(self.read().len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ShelfError;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_memory_backend_shift_on_delete() {
        let backend = MemoryBackend::new();
        for name in ["Jon", "Linda", "Ana"] {
            backend.insert(Record::new().with_field("name", name)).await.unwrap();
        }

        let removed = backend.remove(0).await.unwrap();
        assert_eq!(removed, Record::new().with_field("name", "Jon"));
        assert_eq!(backend.get(0).await.unwrap(), Record::new().with_field("name", "Linda"));
        assert_eq!(backend.len().await.unwrap(), 2);
        assert_eq!(backend.get(2).await, Err(ShelfError::out_of_bounds(2, 2)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_inserts_are_not_lost() {
        let backend = Arc::new(MemoryBackend::new());
        let mut handles = Vec::new();
        for task in 0..8 {
            let backend = Arc::clone(&backend);
            handles.push(tokio::spawn(async move {
                for i in 0..50 {
                    backend
                        .insert(Record::new().with_field("task", task).with_field("i", i))
                        .await
                        .unwrap();
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(backend.len().await.unwrap(), 400);
    }
}
