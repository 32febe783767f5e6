//! [`OrderStore`]: thread-safe, append-only registry of orders.

use std::fmt;
use std::sync::Arc;

use common::protocol::{FinalizeRequest, Order};
use tokio::sync::Mutex;

/// Position-based order identifier.
///
/// Equals the length of the order list at the moment the order was appended.
/// Its string form is what clients see embedded in finalize URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OrderId(usize);

impl OrderId {
    /// Parse the path form of an identifier.
    pub fn parse(s: &str) -> Option<Self> {
        s.parse().ok().map(OrderId)
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A stored order together with the CSR submitted at finalize time.
#[derive(Debug, Clone)]
struct OrderEntry {
    order: Order,
    csr: Option<FinalizeRequest>,
}

/// Thread-safe, append-only registry of orders.
///
/// Identifiers are assigned under the lock and always equal the pre-insertion
/// length of the list: strictly increasing, never reused. The lock is held
/// only for the append or lookup itself, so concurrent requests never wait on
/// each other beyond that.
#[derive(Clone, Debug)]
pub struct OrderStore {
    inner: Arc<Mutex<Vec<OrderEntry>>>,
}

impl OrderStore {
    /// Create a new, empty [`OrderStore`].
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Append an order, returning its assigned identifier.
    pub async fn append(&self, order: Order) -> OrderId {
        let mut entries = self.inner.lock().await;
        let id = OrderId(entries.len());
        entries.push(OrderEntry { order, csr: None });
        id
    }

    /// Look up a stored order by identifier.
    pub async fn get(&self, id: OrderId) -> Option<Order> {
        let entries = self.inner.lock().await;
        entries.get(id.0).map(|e| e.order.clone())
    }

    /// Record the CSR submitted for `id`, returning the stored order.
    ///
    /// Returns `None` if no order with that identifier exists. A repeated
    /// finalize replaces the previous CSR.
    pub async fn attach_csr(&self, id: OrderId, csr: FinalizeRequest) -> Option<Order> {
        let mut entries = self.inner.lock().await;
        let entry = entries.get_mut(id.0)?;
        entry.csr = Some(csr);
        Some(entry.order.clone())
    }

    /// Look up the CSR previously attached to `id`.
    pub async fn csr(&self, id: OrderId) -> Option<FinalizeRequest> {
        let entries = self.inner.lock().await;
        entries.get(id.0).and_then(|e| e.csr.clone())
    }

    /// Number of orders created so far.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    /// Returns `true` if no orders have been created.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for OrderStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::protocol::Identifier;

    fn dns_order(value: &str) -> Order {
        Order {
            identifiers: vec![Identifier {
                kind: "dns".into(),
                value: value.into(),
            }],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn first_id_is_zero() {
        let store = OrderStore::new();
        assert!(store.is_empty().await);
        let id = store.append(dns_order("example.com")).await;
        assert_eq!(id.to_string(), "0");
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn ids_are_sequential() {
        let store = OrderStore::new();
        for i in 0..5 {
            let id = store.append(dns_order("example.com")).await;
            assert_eq!(id.to_string(), i.to_string());
        }
    }

    #[tokio::test]
    async fn get_returns_stored_order() {
        let store = OrderStore::new();
        let id = store.append(dns_order("a.example.com")).await;
        let order = store.get(id).await.unwrap();
        assert_eq!(order.identifiers[0].value, "a.example.com");
        assert!(store.get(OrderId(17)).await.is_none());
    }

    #[tokio::test]
    async fn attach_csr_records_and_replaces() {
        let store = OrderStore::new();
        let id = store.append(dns_order("example.com")).await;
        assert!(store.csr(id).await.is_none());

        let order = store
            .attach_csr(id, FinalizeRequest { csr: "first".into() })
            .await
            .unwrap();
        assert_eq!(order.identifiers[0].value, "example.com");
        assert_eq!(store.csr(id).await.unwrap().csr, "first");

        store
            .attach_csr(id, FinalizeRequest { csr: "second".into() })
            .await
            .unwrap();
        assert_eq!(store.csr(id).await.unwrap().csr, "second");
    }

    #[tokio::test]
    async fn attach_csr_unknown_order_is_none() {
        let store = OrderStore::new();
        let result = store
            .attach_csr(OrderId(3), FinalizeRequest { csr: "x".into() })
            .await;
        assert!(result.is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_appends_assign_distinct_dense_ids() {
        const N: usize = 32;
        let store = OrderStore::new();

        let mut handles = Vec::with_capacity(N);
        for _ in 0..N {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.append(dns_order("example.com")).await
            }));
        }

        let mut ids = Vec::with_capacity(N);
        for handle in handles {
            ids.push(handle.await.unwrap().0);
        }
        ids.sort_unstable();

        assert_eq!(ids, (0..N).collect::<Vec<_>>());
        assert_eq!(store.len().await, N);
    }

    #[test]
    fn order_id_parses_path_form() {
        assert_eq!(OrderId::parse("7"), Some(OrderId(7)));
        assert!(OrderId::parse("seven").is_none());
        assert!(OrderId::parse("-1").is_none());
    }
}
