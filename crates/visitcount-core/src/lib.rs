//! visitcount core: the visit counter domain, independent of any transport.
//!
//! This crate defines the document-store contract, the counter increment
//! operation, and the error surface shared with the HTTP server. It carries no
//! runtime or HTTP dependencies so the increment logic can be exercised against
//! any store implementation.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Every fallible path surfaces as `CounterError`/`StoreOperationFailure`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod counter;
pub mod document;
pub mod error;

pub use counter::{
    count_fields, read_count, read_count_field, IncrementMode, StoreOp, StoreOperationFailure,
    VisitCounter, COUNT_FIELD,
};
pub use document::{DocumentKey, DocumentStore, Fields};
/// Shared result type.
pub use error::{CounterError, Result};
