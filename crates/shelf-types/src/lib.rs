//! Shelf Types
//!
//! This crate defines the value types stored by the Shelf collection service
//! (`shelf-core` and `shelf-api`). A [`Record`] is a flat mapping from field
//! name to a scalar [`FieldValue`]; the stores treat its fields opaquely.

#![deny(warnings)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
#![deny(missing_docs)]

mod types;
pub use types::{FieldValue, Record};
