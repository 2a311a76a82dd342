//! Contains the persistence gateway trait and its implementations.
//!
//! A gateway is a key-value blob store with last-write-wins semantics:
//! the whole transaction list is serialized into a single blob kept
//! under [STORAGE_KEY]. There are no transactional guarantees beyond a
//! save overwriting the previous blob atomically from the caller's
//! perspective.

mod json_file;
mod memory;

pub use json_file::JsonFileGateway;
pub use memory::MemoryGateway;

use crate::Error;

/// The key under which the transaction list is persisted.
///
/// The version suffix marks the stored schema: a breaking schema change
/// requires a new key, abandoning data stored under the old one.
pub const STORAGE_KEY: &str = "expenseTrackerTransactions_v1";

/// A key-value blob store holding the serialized transaction list.
pub trait StorageGateway {
    /// Returns the previously saved blob, or `None` if nothing has ever
    /// been saved.
    ///
    /// # Errors
    /// Returns [Error::Persistence] if the storage medium cannot be read.
    fn load(&self) -> Result<Option<String>, Error>;

    /// Overwrites the stored blob.
    ///
    /// # Errors
    /// Returns [Error::Persistence] if the storage medium rejects the
    /// write.
    fn save(&mut self, blob: &str) -> Result<(), Error>;
}
