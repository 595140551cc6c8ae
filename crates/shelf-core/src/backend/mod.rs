//! Storage backends behind a resource controller
//!
//! Two interchangeable implementations of [`RecordBackend`]:
//!
//! - [`MemoryBackend`]: a lock-guarded [`IndexedCollectionStore`]. Addresses are
//!   positions; deleting shifts later records down (no gaps).
//! - [`SqliteBackend`]: a SQLite table with an auto-increment identity column.
//!   Addresses are ids; deleting leaves a gap.
//!
//! [`IndexedCollectionStore`]: crate::store::IndexedCollectionStore

use crate::error::ShelfResult;
use crate::schema::TableSchema;
use async_trait::async_trait;
use shelf_types::Record;
use std::fmt;
use std::sync::Arc;
use tracing::info;

pub mod memory;
pub mod sqlite;

pub use memory::MemoryBackend;
pub use sqlite::SqliteBackend;

/// Async storage seam consumed by [`ResourceController`](crate::ResourceController).
#[async_trait]
pub trait RecordBackend: Send + Sync + fmt::Debug {
    /// Short label for logs and health output
    fn label(&self) -> &'static str;

    /// Store a record and return its address.
    async fn insert(&self, record: Record) -> ShelfResult<i64>;

    /// Every record in address order.
    async fn list(&self) -> ShelfResult<Vec<Record>>;

    async fn get(&self, address: i64) -> ShelfResult<Record>;

    async fn remove(&self, address: i64) -> ShelfResult<Record>;

    async fn len(&self) -> ShelfResult<usize>;
}

/// Backend selection for one resource.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum BackendConfig {
    /// Process memory only; contents are lost on restart.
    #[default]
    Memory,
    /// A SQLite table, created on open if missing.
    Sqlite { database_url: String, schema: TableSchema, max_connections: u32 },
}

impl BackendConfig {
    pub fn memory() -> Self {
        Self::Memory
    }

    /// SQLite backend with the default pool size of 5
    pub fn sqlite(database_url: impl Into<String>, schema: TableSchema) -> Self {
        Self::Sqlite { database_url: database_url.into(), schema, max_connections: 5 }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Sqlite { .. } => "sqlite",
        }
    }

    /// Build the configured backend, creating tables as needed.
    pub async fn open(self) -> ShelfResult<Arc<dyn RecordBackend>> {
        info!(backend = self.label(), "Opening record backend");
        match self {
            Self::Memory => Ok(Arc::new(MemoryBackend::new())),
            Self::Sqlite { database_url, schema, max_connections } => {
                let backend = SqliteBackend::connect(&database_url, schema, max_connections).await?;
                Ok(Arc::new(backend))
            }
        }
    }
}
