//! Pocketbook is a small personal finance tracker: a persisted,
//! newest-first list of income and expense transactions, plus derived
//! totals.
//!
//! The library is split along the seams of the system:
//! - [TransactionStore] owns the live transaction sequence and keeps it
//!   in sync with a persistence gateway on every mutation.
//! - [compute_totals] derives income, expense, and balance figures from
//!   the store's current sequence.
//! - The [storage] module provides the gateway abstraction and its
//!   file-backed and in-memory implementations.

#![warn(missing_docs)]

mod store;
mod totals;
mod transaction;

pub mod storage;

pub use store::{EXPORT_FILE_NAME, TransactionStore};
pub use totals::{Totals, compute_totals};
pub use transaction::{Transaction, TransactionKind};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The storage medium failed while reading or writing the persisted
    /// transaction blob.
    ///
    /// This is the one failure that must never be swallowed: a
    /// transaction the user believes was recorded would otherwise be
    /// silently lost. Callers should warn the user or retry.
    #[error("could not access persisted transactions: {0}")]
    Persistence(String),

    /// The transaction list could not be serialized as JSON.
    #[error("could not serialize transactions as JSON: {0}")]
    JsonSerialization(String),
}
