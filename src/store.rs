//! Defines the transaction store, the sole owner of the live transaction
//! sequence and of the persistence round trip.

use rust_decimal::Decimal;
use serde_json::Value;

use crate::storage::StorageGateway;
use crate::{Error, Transaction, TransactionKind};

/// The conventional file name for an exported transaction list.
pub const EXPORT_FILE_NAME: &str = "transactions.json";

/// Owns the in-memory transaction sequence and keeps the persistence
/// gateway in sync with it.
///
/// The sequence is ordered newest-first: each added transaction becomes
/// the new head. After any operation that returns `Ok`, the persisted
/// state matches the in-memory state exactly; when a persist fails, the
/// in-memory mutation is rolled back before the error is returned, so
/// the two never silently disagree.
///
/// Every mutation takes `&mut self`, which rules out interleaved
/// mutating calls at compile time.
#[derive(Debug)]
pub struct TransactionStore<G: StorageGateway> {
    transactions: Vec<Transaction>,
    gateway: G,
}

impl<G: StorageGateway> TransactionStore<G> {
    /// Populate a store from the gateway's persisted blob.
    ///
    /// An absent blob initializes the store to an empty sequence and
    /// persists it immediately, establishing the stored key. A blob that
    /// cannot be parsed as a list resets the store to empty without
    /// surfacing an error; corruption is only logged, so stale data
    /// never blocks the user. Otherwise each record is normalized per
    /// [Transaction::from_stored] and adopted in its stored order.
    ///
    /// # Errors
    /// Returns [Error::Persistence] if the storage medium itself cannot
    /// be read or the initial empty sequence cannot be written.
    pub fn load(gateway: G) -> Result<Self, Error> {
        let mut store = Self {
            transactions: Vec::new(),
            gateway,
        };

        match store.gateway.load()? {
            None => store.persist()?,
            Some(blob) => match serde_json::from_str::<Value>(&blob) {
                Ok(Value::Array(records)) => {
                    store.transactions = records.iter().map(Transaction::from_stored).collect();
                }
                Ok(_) => {
                    tracing::warn!("stored transactions were not a list, starting with an empty one");
                }
                Err(error) => {
                    tracing::warn!("could not parse stored transactions, starting with an empty list: {error}");
                }
            },
        }

        Ok(store)
    }

    /// Record a new transaction and persist the full sequence.
    ///
    /// The new record is prepended and returned. Inputs are normalized,
    /// never rejected: the name is trimmed and degenerate values (an
    /// empty name, a non-positive amount) are accepted as given.
    /// Validating fresh user input is the caller's responsibility.
    ///
    /// # Errors
    /// Returns [Error::Persistence] if the write fails, in which case
    /// the sequence is left as it was before the call.
    pub fn add(
        &mut self,
        name: &str,
        amount: Decimal,
        kind: TransactionKind,
    ) -> Result<&Transaction, Error> {
        let transaction = Transaction::new(name, amount, kind);
        tracing::debug!("adding {} transaction {}", transaction.kind(), transaction.id());

        self.transactions.insert(0, transaction);
        if let Err(error) = self.persist() {
            self.transactions.remove(0);
            return Err(error);
        }

        Ok(&self.transactions[0])
    }

    /// Delete the transaction with exactly the given id and persist.
    ///
    /// Returns whether a transaction was removed; an unknown id is a
    /// no-op, not an error. The relative order of the remaining
    /// transactions is unchanged.
    ///
    /// # Errors
    /// Returns [Error::Persistence] if the write fails, in which case
    /// the sequence is left as it was before the call.
    pub fn remove(&mut self, id: &str) -> Result<bool, Error> {
        let Some(index) = self
            .transactions
            .iter()
            .position(|transaction| transaction.id() == id)
        else {
            return Ok(false);
        };

        let removed = self.transactions.remove(index);
        if let Err(error) = self.persist() {
            self.transactions.insert(index, removed);
            return Err(error);
        }

        Ok(true)
    }

    /// Delete all transactions and persist the empty sequence.
    ///
    /// Unconditional; asking the user for confirmation is the front
    /// end's job.
    ///
    /// # Errors
    /// Returns [Error::Persistence] if the write fails, in which case
    /// the sequence is left as it was before the call.
    pub fn clear(&mut self) -> Result<(), Error> {
        let previous = std::mem::take(&mut self.transactions);
        if let Err(error) = self.persist() {
            self.transactions = previous;
            return Err(error);
        }

        Ok(())
    }

    /// The current transaction sequence, newest-first.
    pub fn list(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Serialize the full current sequence as pretty-printed JSON with
    /// two-space indentation, suitable for writing to
    /// [EXPORT_FILE_NAME].
    ///
    /// # Errors
    /// Returns [Error::JsonSerialization] if encoding fails.
    pub fn export_json(&self) -> Result<String, Error> {
        serde_json::to_string_pretty(&self.transactions)
            .map_err(|error| Error::JsonSerialization(error.to_string()))
    }

    fn persist(&mut self) -> Result<(), Error> {
        let blob = serde_json::to_string(&self.transactions)
            .map_err(|error| Error::JsonSerialization(error.to_string()))?;

        self.gateway.save(&blob)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;
    use std::str::FromStr;

    use rust_decimal::Decimal;
    use serde_json::{Value, json};

    use super::TransactionStore;
    use crate::storage::{MemoryGateway, StorageGateway};
    use crate::{Error, TransactionKind};

    fn dec(text: &str) -> Decimal {
        Decimal::from_str(text).unwrap()
    }

    /// A gateway whose saves can be made to fail mid-test, for
    /// exercising the rollback path.
    #[derive(Clone)]
    struct FailingGateway {
        inner: MemoryGateway,
        fail_saves: Rc<Cell<bool>>,
    }

    impl FailingGateway {
        fn new() -> Self {
            Self {
                inner: MemoryGateway::new(),
                fail_saves: Rc::new(Cell::new(false)),
            }
        }
    }

    impl StorageGateway for FailingGateway {
        fn load(&self) -> Result<Option<String>, Error> {
            self.inner.load()
        }

        fn save(&mut self, blob: &str) -> Result<(), Error> {
            if self.fail_saves.get() {
                return Err(Error::Persistence("disk full".to_owned()));
            }

            self.inner.save(blob)
        }
    }

    #[test]
    fn load_with_empty_storage_persists_an_empty_list() {
        let gateway = MemoryGateway::new();

        let store = TransactionStore::load(gateway.clone()).unwrap();

        assert!(store.list().is_empty());
        assert_eq!(gateway.blob(), Some("[]".to_owned()));
    }

    #[test]
    fn load_recovers_from_an_unparsable_blob() {
        let mut gateway = MemoryGateway::new();
        gateway.save("{not json at all").unwrap();

        let store = TransactionStore::load(gateway).unwrap();

        assert!(store.list().is_empty());
    }

    #[test]
    fn load_recovers_from_a_non_list_blob() {
        let mut gateway = MemoryGateway::new();
        gateway.save("{\"id\": \"lonely\"}").unwrap();

        let store = TransactionStore::load(gateway).unwrap();

        assert!(store.list().is_empty());
    }

    #[test]
    fn load_preserves_the_stored_order() {
        let mut gateway = MemoryGateway::new();
        let blob = json!([
            {"id": "newest", "name": "b", "amount": 2, "type": "expense", "timestamp": "2024-06-02T00:00:00Z"},
            {"id": "oldest", "name": "a", "amount": 1, "type": "income", "timestamp": "2024-06-01T00:00:00Z"},
        ]);
        gateway.save(&blob.to_string()).unwrap();

        let store = TransactionStore::load(gateway).unwrap();

        assert_eq!(store.list().len(), 2);
        assert_eq!(store.list()[0].id(), "newest");
        assert_eq!(store.list()[1].id(), "oldest");
    }

    #[test]
    fn load_twice_without_mutation_returns_equal_sequences() {
        let gateway = MemoryGateway::new();
        let mut store = TransactionStore::load(gateway.clone()).unwrap();
        store.add("rent", dec("1200"), TransactionKind::Expense).unwrap();
        store.add("salary", dec("3000"), TransactionKind::Income).unwrap();

        let first = TransactionStore::load(gateway.clone()).unwrap();
        let second = TransactionStore::load(gateway).unwrap();

        assert_eq!(first.list(), second.list());
    }

    #[test]
    fn add_prepends_and_grows_the_sequence_by_one() {
        let mut store = TransactionStore::load(MemoryGateway::new()).unwrap();

        store.add("salary", dec("3000"), TransactionKind::Income).unwrap();
        store.add("groceries", dec("75.20"), TransactionKind::Expense).unwrap();

        assert_eq!(store.list().len(), 2);
        assert_eq!(store.list()[0].name(), "groceries");
        assert_eq!(store.list()[1].name(), "salary");
    }

    #[test]
    fn add_survives_a_reload() {
        let gateway = MemoryGateway::new();
        let mut store = TransactionStore::load(gateway.clone()).unwrap();
        store.add("salary", dec("3000"), TransactionKind::Income).unwrap();
        store.add("groceries", dec("75.20"), TransactionKind::Expense).unwrap();

        let reloaded = TransactionStore::load(gateway).unwrap();

        assert_eq!(reloaded.list(), store.list());
    }

    #[test]
    fn remove_deletes_only_the_matching_transaction() {
        let mut store = TransactionStore::load(MemoryGateway::new()).unwrap();
        store.add("a", dec("1"), TransactionKind::Income).unwrap();
        store.add("b", dec("2"), TransactionKind::Income).unwrap();
        store.add("c", dec("3"), TransactionKind::Income).unwrap();
        let middle_id = store.list()[1].id().to_owned();

        let removed = store.remove(&middle_id).unwrap();

        assert!(removed);
        assert_eq!(store.list().len(), 2);
        assert_eq!(store.list()[0].name(), "c");
        assert_eq!(store.list()[1].name(), "a");
    }

    #[test]
    fn remove_with_an_unknown_id_is_a_no_op() {
        let mut store = TransactionStore::load(MemoryGateway::new()).unwrap();
        store.add("a", dec("1"), TransactionKind::Income).unwrap();
        let before = store.list().to_vec();

        let removed = store.remove("no-such-id").unwrap();

        assert!(!removed);
        assert_eq!(store.list(), before);
    }

    #[test]
    fn remove_the_same_id_twice_only_removes_once() {
        let mut store = TransactionStore::load(MemoryGateway::new()).unwrap();
        store.add("a", dec("1"), TransactionKind::Income).unwrap();
        let id = store.list()[0].id().to_owned();

        assert!(store.remove(&id).unwrap());
        assert!(!store.remove(&id).unwrap());
        assert!(store.list().is_empty());
    }

    #[test]
    fn clear_empties_the_sequence_and_persists() {
        let gateway = MemoryGateway::new();
        let mut store = TransactionStore::load(gateway.clone()).unwrap();
        store.add("a", dec("1"), TransactionKind::Income).unwrap();
        store.add("b", dec("2"), TransactionKind::Expense).unwrap();

        store.clear().unwrap();

        assert!(store.list().is_empty());
        assert_eq!(gateway.blob(), Some("[]".to_owned()));
    }

    #[test]
    fn failed_save_rolls_back_an_add() {
        let gateway = FailingGateway::new();
        let mut store = TransactionStore::load(gateway.clone()).unwrap();
        store.add("a", dec("1"), TransactionKind::Income).unwrap();
        let before = store.list().to_vec();

        gateway.fail_saves.set(true);
        let result = store.add("b", dec("2"), TransactionKind::Expense);

        assert_eq!(result.err(), Some(Error::Persistence("disk full".to_owned())));
        assert_eq!(store.list(), before);
    }

    #[test]
    fn failed_save_rolls_back_a_remove() {
        let gateway = FailingGateway::new();
        let mut store = TransactionStore::load(gateway.clone()).unwrap();
        store.add("a", dec("1"), TransactionKind::Income).unwrap();
        let before = store.list().to_vec();
        let id = before[0].id().to_owned();

        gateway.fail_saves.set(true);
        let result = store.remove(&id);

        assert_eq!(result.err(), Some(Error::Persistence("disk full".to_owned())));
        assert_eq!(store.list(), before);
    }

    #[test]
    fn failed_save_rolls_back_a_clear() {
        let gateway = FailingGateway::new();
        let mut store = TransactionStore::load(gateway.clone()).unwrap();
        store.add("a", dec("1"), TransactionKind::Income).unwrap();
        let before = store.list().to_vec();

        gateway.fail_saves.set(true);
        let result = store.clear();

        assert_eq!(result.err(), Some(Error::Persistence("disk full".to_owned())));
        assert_eq!(store.list(), before);
    }

    #[test]
    fn export_json_is_pretty_printed_and_reflects_the_sequence() {
        let mut store = TransactionStore::load(MemoryGateway::new()).unwrap();
        store.add("salary", dec("3000"), TransactionKind::Income).unwrap();

        let exported = store.export_json().unwrap();

        // Two-space indentation, one record per the current list.
        assert!(exported.starts_with("[\n  {"));
        let parsed: Value = serde_json::from_str(&exported).unwrap();
        assert_eq!(parsed, serde_json::to_value(store.list()).unwrap());
    }

    #[test]
    fn export_json_of_an_empty_store_is_an_empty_list() {
        let store = TransactionStore::load(MemoryGateway::new()).unwrap();

        assert_eq!(store.export_json().unwrap(), "[]");
    }
}
