//! Implements an in-memory persistence gateway for tests and ephemeral
//! sessions.

use std::cell::RefCell;
use std::rc::Rc;

use crate::Error;
use crate::storage::StorageGateway;

/// Stores the transaction blob in memory.
///
/// Clones share the same underlying blob, so handing a clone to a second
/// [TransactionStore](crate::TransactionStore) behaves like a second
/// page load against the same browser storage. The model is strictly
/// single-threaded, hence `Rc` rather than `Arc`.
#[derive(Debug, Clone, Default)]
pub struct MemoryGateway {
    blob: Rc<RefCell<Option<String>>>,
}

impl MemoryGateway {
    /// Create an empty gateway, equivalent to storage that has never
    /// been written to.
    pub fn new() -> Self {
        Self::default()
    }

    /// The currently stored blob, if any. Intended for asserting on
    /// persisted state in tests.
    pub fn blob(&self) -> Option<String> {
        self.blob.borrow().clone()
    }
}

impl StorageGateway for MemoryGateway {
    fn load(&self) -> Result<Option<String>, Error> {
        Ok(self.blob.borrow().clone())
    }

    fn save(&mut self, blob: &str) -> Result<(), Error> {
        *self.blob.borrow_mut() = Some(blob.to_owned());
        Ok(())
    }
}
