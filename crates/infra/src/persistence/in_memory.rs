use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use anyhow::Context;
use serde_json::Value as JsonValue;

use orderflow_orders::{Order, OrderId, PersistenceError, PersistenceGateway};

/// In-memory order store.
///
/// Rows are kept as JSON documents keyed by order id, so `get_order` goes through
/// the same decode path a document database would. Intended for tests/dev: it
/// tracks calls and can be told to fail `connect` or `save`.
#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    rows: RwLock<HashMap<OrderId, JsonValue>>,
    connected: AtomicBool,
    fail_connect: AtomicBool,
    fail_save: AtomicBool,
    connect_calls: AtomicUsize,
    save_calls: AtomicUsize,
}

impl InMemoryOrderStore {
    /// A store that starts disconnected.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that is already connected.
    pub fn connected() -> Self {
        let store = Self::default();
        store.connected.store(true, Ordering::SeqCst);
        store
    }

    /// Drop the connection; the next workflow run has to reconnect.
    pub fn disconnect(&self) {
        self.connected.store(false, Ordering::SeqCst);
    }

    pub fn set_fail_connect(&self, fail: bool) {
        self.fail_connect.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_save(&self, fail: bool) {
        self.fail_save.store(fail, Ordering::SeqCst);
    }

    pub fn connect_calls(&self) -> usize {
        self.connect_calls.load(Ordering::SeqCst)
    }

    pub fn save_calls(&self) -> usize {
        self.save_calls.load(Ordering::SeqCst)
    }

    /// Number of stored orders.
    pub fn len(&self) -> Result<usize, PersistenceError> {
        self.rows
            .read()
            .map(|rows| rows.len())
            .map_err(|_| PersistenceError::Corrupt("lock poisoned".to_string()))
    }

    pub fn is_empty(&self) -> Result<bool, PersistenceError> {
        Ok(self.len()? == 0)
    }

    fn ensure_connected(&self) -> Result<(), PersistenceError> {
        if !self.is_connected() {
            return Err(PersistenceError::Connection("store is not connected".to_string()));
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn insert_raw(&self, id: OrderId, row: JsonValue) {
        self.rows.write().unwrap().insert(id, row);
    }
}

impl PersistenceGateway for InMemoryOrderStore {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn connect(&self) -> Result<(), PersistenceError> {
        self.connect_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_connect.load(Ordering::SeqCst) {
            return Err(PersistenceError::Connection("connection refused".to_string()));
        }
        self.connected.store(true, Ordering::SeqCst);
        tracing::debug!("in-memory order store connected");
        Ok(())
    }

    fn save(&self, order: &Order) -> Result<(), PersistenceError> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        self.ensure_connected()?;

        if self.fail_save.load(Ordering::SeqCst) {
            return Err(PersistenceError::Save(format!("write rejected for order {}", order.id())));
        }

        let row = serde_json::to_value(order)
            .with_context(|| format!("serializing order {}", order.id()))?;

        let mut rows = self
            .rows
            .write()
            .map_err(|_| PersistenceError::Save("lock poisoned".to_string()))?;

        // Last write wins; repeated submissions are not deduplicated.
        rows.insert(order.id(), row);
        Ok(())
    }

    fn get_order(&self, id: OrderId) -> Result<Order, PersistenceError> {
        self.ensure_connected()?;

        let row = {
            let rows = self
                .rows
                .read()
                .map_err(|_| PersistenceError::Corrupt("lock poisoned".to_string()))?;
            rows.get(&id).cloned().ok_or(PersistenceError::NotFound(id))?
        };

        serde_json::from_value(row).map_err(|e| PersistenceError::Corrupt(format!("order {id}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_order(id: i32) -> Order {
        Order::new(OrderId::new(id), "a@b.c", 150)
    }

    #[test]
    fn save_then_get_returns_the_same_order() {
        let store = InMemoryOrderStore::connected();
        let order = test_order(1);

        store.save(&order).unwrap();

        assert_eq!(store.get_order(OrderId::new(1)).unwrap(), order);
        assert_eq!(store.len().unwrap(), 1);
        assert_eq!(store.save_calls(), 1);
    }

    #[test]
    fn save_while_disconnected_fails_with_connection_error() {
        let store = InMemoryOrderStore::new();

        let err = store.save(&test_order(1)).unwrap_err();

        assert!(matches!(err, PersistenceError::Connection(_)));
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn connect_marks_store_connected() {
        let store = InMemoryOrderStore::new();
        assert!(!store.is_connected());

        store.connect().unwrap();

        assert!(store.is_connected());
        assert_eq!(store.connect_calls(), 1);
    }

    #[test]
    fn injected_connect_failure_leaves_store_disconnected() {
        let store = InMemoryOrderStore::new();
        store.set_fail_connect(true);

        let err = store.connect().unwrap_err();

        assert!(matches!(err, PersistenceError::Connection(msg) if msg.contains("refused")));
        assert!(!store.is_connected());
    }

    #[test]
    fn injected_save_failure_stores_nothing() {
        let store = InMemoryOrderStore::connected();
        store.set_fail_save(true);

        let err = store.save(&test_order(9)).unwrap_err();

        assert!(matches!(err, PersistenceError::Save(_)));
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn get_unknown_order_is_not_found() {
        let store = InMemoryOrderStore::connected();

        match store.get_order(OrderId::new(404)).unwrap_err() {
            PersistenceError::NotFound(id) => assert_eq!(id, OrderId::new(404)),
            other => panic!("Expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn undecodable_row_is_reported_as_corrupt() {
        let store = InMemoryOrderStore::connected();
        store.insert_raw(OrderId::new(3), serde_json::json!({ "id": "three" }));

        let err = store.get_order(OrderId::new(3)).unwrap_err();

        assert!(matches!(err, PersistenceError::Corrupt(msg) if msg.starts_with("order 3")));
    }

    #[test]
    fn poisoned_rows_are_reported_instead_of_looking_empty() {
        let store = InMemoryOrderStore::connected();
        store.save(&test_order(1)).unwrap();

        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _rows = store.rows.write().unwrap();
            panic!("writer died holding the lock");
        }));

        assert!(matches!(store.len(), Err(PersistenceError::Corrupt(msg)) if msg.contains("poisoned")));
        assert!(store.is_empty().is_err());
        assert!(matches!(store.save(&test_order(2)), Err(PersistenceError::Save(_))));
    }

    #[test]
    fn resaving_an_order_overwrites_the_row() {
        let store = InMemoryOrderStore::connected();
        store.save(&test_order(1)).unwrap();
        let updated = Order::new(OrderId::new(1), "new@mail.com", 300);
        store.save(&updated).unwrap();

        assert_eq!(store.len().unwrap(), 1);
        assert_eq!(
            store.get_order(OrderId::new(1)).unwrap().customer_email(),
            "new@mail.com"
        );
    }
}
