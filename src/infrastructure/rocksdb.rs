use crate::domain::order::{OrderId, OrderRecord};
use crate::domain::ports::OrderStore;
use crate::error::{Result, RouterError};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, Options};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Column Family for storing orders together with their meta.
pub const CF_ORDERS: &str = "orders";

/// A persistent order store implementation using RocksDB.
///
/// Each order is one JSON document keyed by its big-endian ID. Meta updates are
/// read-modify-write, so writers are serialized through `write_lock`.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    write_lock: Arc<Mutex<()>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the "orders" column family exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_orders = ColumnFamilyDescriptor::new(CF_ORDERS, Options::default());
        let db = DB::open_cf_descriptors(&opts, path, vec![cf_orders])?;

        Ok(Self {
            db: Arc::new(db),
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self) -> Result<&rocksdb::ColumnFamily> {
        self.db.cf_handle(CF_ORDERS).ok_or_else(|| {
            RouterError::Internal(Box::new(std::io::Error::other(
                "Orders column family not found",
            )))
        })
    }

    fn load(&self, order_id: OrderId) -> Result<Option<OrderRecord>> {
        let cf = self.cf()?;
        match self.db.get_cf(cf, order_id.0.to_be_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn save(&self, record: &OrderRecord) -> Result<()> {
        let cf = self.cf()?;
        let value = serde_json::to_vec(record)?;
        self.db.put_cf(cf, record.order_id.0.to_be_bytes(), value)?;
        Ok(())
    }
}

#[async_trait]
impl OrderStore for RocksDBStore {
    async fn save_order(&self, record: OrderRecord) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let merged = match self.load(record.order_id)? {
            Some(mut existing) => {
                existing.billing_region = record.billing_region;
                existing.shipping_region = record.shipping_region;
                existing.meta.extend(record.meta);
                existing
            }
            None => record,
        };
        self.save(&merged)
    }

    async fn order_exists(&self, order_id: OrderId) -> Result<bool> {
        let cf = self.cf()?;
        // Just check if the key exists without deserializing the value
        Ok(self.db.get_pinned_cf(cf, order_id.0.to_be_bytes())?.is_some())
    }

    async fn get_region(&self, order_id: OrderId) -> Result<Option<String>> {
        Ok(self.load(order_id)?.and_then(|order| order.billing_region))
    }

    async fn get_alternate_region(&self, order_id: OrderId) -> Result<Option<String>> {
        Ok(self.load(order_id)?.and_then(|order| order.shipping_region))
    }

    async fn put_order_meta(&self, order_id: OrderId, key: &str, value: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut record = self
            .load(order_id)?
            .unwrap_or_else(|| OrderRecord::new(order_id, None, None));
        record.meta.insert(key.to_string(), value.to_string());
        self.save(&record)
    }

    async fn put_order_meta_batch(
        &self,
        order_id: OrderId,
        entries: &[(&str, &str)],
    ) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut record = self
            .load(order_id)?
            .unwrap_or_else(|| OrderRecord::new(order_id, None, None));
        for (key, value) in entries {
            record.meta.insert(key.to_string(), value.to_string());
        }
        self.save(&record)
    }

    async fn get_order_meta(&self, order_id: OrderId, key: &str) -> Result<Option<String>> {
        Ok(self
            .load(order_id)?
            .and_then(|mut order| order.meta.remove(key)))
    }

    async fn find_order_by_meta(&self, key: &str, value: &str) -> Result<Option<OrderId>> {
        let cf = self.cf()?;
        for item in self.db.iterator_cf(cf, rocksdb::IteratorMode::Start) {
            let (_key, bytes) = item?;
            let order: OrderRecord = serde_json::from_slice(&bytes)?;
            if order.meta.get(key).map(String::as_str) == Some(value) {
                return Ok(Some(order.order_id));
            }
        }
        Ok(None)
    }
}
