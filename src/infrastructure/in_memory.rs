use crate::domain::order::{OrderId, OrderRecord};
use crate::domain::ports::OrderStore;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
#[cfg(test)]
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

/// A thread-safe in-memory order store.
///
/// Uses `Arc<RwLock<BTreeMap<OrderId, OrderRecord>>>`; clones share the same orders,
/// so a test can keep a handle while the router owns a boxed copy.
#[derive(Default, Clone)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<BTreeMap<OrderId, OrderRecord>>>,
}

impl InMemoryOrderStore {
    /// Creates a new, empty in-memory order store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn save_order(&self, record: OrderRecord) -> Result<()> {
        let mut orders = self.orders.write().await;
        match orders.get_mut(&record.order_id) {
            Some(existing) => {
                existing.billing_region = record.billing_region;
                existing.shipping_region = record.shipping_region;
                existing.meta.extend(record.meta);
            }
            None => {
                orders.insert(record.order_id, record);
            }
        }
        Ok(())
    }

    async fn order_exists(&self, order_id: OrderId) -> Result<bool> {
        let orders = self.orders.read().await;
        Ok(orders.contains_key(&order_id))
    }

    async fn get_region(&self, order_id: OrderId) -> Result<Option<String>> {
        let orders = self.orders.read().await;
        Ok(orders
            .get(&order_id)
            .and_then(|order| order.billing_region.clone()))
    }

    async fn get_alternate_region(&self, order_id: OrderId) -> Result<Option<String>> {
        let orders = self.orders.read().await;
        Ok(orders
            .get(&order_id)
            .and_then(|order| order.shipping_region.clone()))
    }

    async fn put_order_meta(&self, order_id: OrderId, key: &str, value: &str) -> Result<()> {
        let mut orders = self.orders.write().await;
        orders
            .entry(order_id)
            .or_insert_with(|| OrderRecord::new(order_id, None, None))
            .meta
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn put_order_meta_batch(
        &self,
        order_id: OrderId,
        entries: &[(&str, &str)],
    ) -> Result<()> {
        let mut orders = self.orders.write().await;
        let meta = &mut orders
            .entry(order_id)
            .or_insert_with(|| OrderRecord::new(order_id, None, None))
            .meta;
        for (key, value) in entries {
            meta.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }

    async fn get_order_meta(&self, order_id: OrderId, key: &str) -> Result<Option<String>> {
        let orders = self.orders.read().await;
        Ok(orders
            .get(&order_id)
            .and_then(|order| order.meta.get(key).cloned()))
    }

    async fn find_order_by_meta(&self, key: &str, value: &str) -> Result<Option<OrderId>> {
        let orders = self.orders.read().await;
        Ok(orders
            .values()
            .find(|order| order.meta.get(key).map(String::as_str) == Some(value))
            .map(|order| order.order_id))
    }
}

/// Order store that rejects writes of one meta key once armed.
///
/// Batches containing the key are rejected whole, like a failed transaction.
#[cfg(test)]
#[derive(Clone)]
pub(crate) struct FlakyOrderStore {
    inner: InMemoryOrderStore,
    key: &'static str,
    armed: Arc<AtomicBool>,
}

#[cfg(test)]
impl FlakyOrderStore {
    pub(crate) fn failing_on(key: &'static str) -> Self {
        Self {
            inner: InMemoryOrderStore::new(),
            key,
            armed: Arc::default(),
        }
    }

    pub(crate) fn arm(&self) {
        self.armed.store(true, Ordering::SeqCst);
    }

    fn check(&self, key: &str) -> Result<()> {
        if key == self.key && self.armed.load(Ordering::SeqCst) {
            return Err(crate::error::RouterError::Internal("disk full".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
#[async_trait]
impl OrderStore for FlakyOrderStore {
    async fn save_order(&self, record: OrderRecord) -> Result<()> {
        self.inner.save_order(record).await
    }

    async fn order_exists(&self, order_id: OrderId) -> Result<bool> {
        self.inner.order_exists(order_id).await
    }

    async fn get_region(&self, order_id: OrderId) -> Result<Option<String>> {
        self.inner.get_region(order_id).await
    }

    async fn get_alternate_region(&self, order_id: OrderId) -> Result<Option<String>> {
        self.inner.get_alternate_region(order_id).await
    }

    async fn put_order_meta(&self, order_id: OrderId, key: &str, value: &str) -> Result<()> {
        self.check(key)?;
        self.inner.put_order_meta(order_id, key, value).await
    }

    async fn put_order_meta_batch(
        &self,
        order_id: OrderId,
        entries: &[(&str, &str)],
    ) -> Result<()> {
        for (key, _) in entries {
            self.check(key)?;
        }
        self.inner.put_order_meta_batch(order_id, entries).await
    }

    async fn get_order_meta(&self, order_id: OrderId, key: &str) -> Result<Option<String>> {
        self.inner.get_order_meta(order_id, key).await
    }

    async fn find_order_by_meta(&self, key: &str, value: &str) -> Result<Option<OrderId>> {
        self.inner.find_order_by_meta(key, value).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_order_regions() {
        let store = InMemoryOrderStore::new();
        store
            .save_order(OrderRecord::new(
                OrderId(1),
                Some("PL-MA".into()),
                Some("PL-DS".into()),
            ))
            .await
            .unwrap();

        assert!(store.order_exists(OrderId(1)).await.unwrap());
        assert!(!store.order_exists(OrderId(2)).await.unwrap());
        assert_eq!(
            store.get_region(OrderId(1)).await.unwrap().as_deref(),
            Some("PL-MA")
        );
        assert_eq!(
            store.get_alternate_region(OrderId(1)).await.unwrap().as_deref(),
            Some("PL-DS")
        );
        assert!(store.get_region(OrderId(2)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_in_memory_meta_and_lookup() {
        let store = InMemoryOrderStore::new();
        store
            .save_order(OrderRecord::new(OrderId(1), None, None))
            .await
            .unwrap();
        store
            .save_order(OrderRecord::new(OrderId(2), None, None))
            .await
            .unwrap();

        store
            .put_order_meta(OrderId(2), "_p24_session", "sess-2")
            .await
            .unwrap();

        assert_eq!(
            store
                .get_order_meta(OrderId(2), "_p24_session")
                .await
                .unwrap()
                .as_deref(),
            Some("sess-2")
        );
        assert_eq!(
            store
                .find_order_by_meta("_p24_session", "sess-2")
                .await
                .unwrap(),
            Some(OrderId(2))
        );
        assert!(
            store
                .find_order_by_meta("_p24_session", "sess-9")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_meta_batch_overwrites_every_key() {
        let store = InMemoryOrderStore::new();
        store
            .put_order_meta_batch(OrderId(1), &[("a", "1"), ("b", "1")])
            .await
            .unwrap();
        store
            .put_order_meta_batch(OrderId(1), &[("a", "2"), ("b", "2")])
            .await
            .unwrap();

        for key in ["a", "b"] {
            assert_eq!(
                store.get_order_meta(OrderId(1), key).await.unwrap().as_deref(),
                Some("2")
            );
        }
    }

    #[tokio::test]
    async fn test_reinsert_keeps_meta() {
        let store = InMemoryOrderStore::new();
        store
            .save_order(OrderRecord::new(OrderId(1), None, None))
            .await
            .unwrap();
        store.put_order_meta(OrderId(1), "k", "v").await.unwrap();

        store
            .save_order(OrderRecord::new(OrderId(1), Some("MA".into()), None))
            .await
            .unwrap();

        assert_eq!(
            store.get_order_meta(OrderId(1), "k").await.unwrap().as_deref(),
            Some("v")
        );
        assert_eq!(
            store.get_region(OrderId(1)).await.unwrap().as_deref(),
            Some("MA")
        );
    }
}
