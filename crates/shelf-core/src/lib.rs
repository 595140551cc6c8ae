#![deny(warnings)]
#![allow(missing_docs)]
//! Core functionality for the Shelf collection service.
//!
//! This crate provides the index-addressed record store, the storage backends
//! that hold a resource's records (in memory or in a SQLite table), and the
//! resource controller that turns create / list / get / delete requests into
//! transport-independent responses.

/// Storage backends behind a resource
pub mod backend;
/// Resource request handling
pub mod controller;
/// Core error types
pub mod error;
/// SQLite table schemas
pub mod schema;
/// Position-addressed in-memory record store
pub mod store;

pub use backend::{BackendConfig, MemoryBackend, RecordBackend, SqliteBackend};
pub use controller::{
    Items, OK_MESSAGE, OUT_OF_BOUND_MESSAGE, ResourceController, ResourceResponse, ResponseBody,
    ResponseStatus, parse_position,
};
pub use error::{ShelfError, ShelfResult};
pub use schema::{ColumnKind, ColumnSpec, TableSchema};
pub use shelf_types::{FieldValue, Record};
pub use store::IndexedCollectionStore;
