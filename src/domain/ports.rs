use super::credentials::{CredentialSet, mask};
use super::order::{OrderId, OrderRecord};
use crate::error::{Result, RouterError};
use async_trait::async_trait;
use std::fmt;

/// Order persistence owned by the host commerce platform.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Creates the order, or updates its regions while keeping existing meta.
    async fn save_order(&self, record: OrderRecord) -> Result<()>;
    async fn order_exists(&self, order_id: OrderId) -> Result<bool>;
    /// Billing region as entered by the customer.
    async fn get_region(&self, order_id: OrderId) -> Result<Option<String>>;
    /// Shipping region, consulted when the billing region is blank.
    async fn get_alternate_region(&self, order_id: OrderId) -> Result<Option<String>>;
    async fn put_order_meta(&self, order_id: OrderId, key: &str, value: &str) -> Result<()>;
    /// Writes every `(key, value)` pair or none of them.
    async fn put_order_meta_batch(
        &self,
        order_id: OrderId,
        entries: &[(&str, &str)],
    ) -> Result<()>;
    async fn get_order_meta(&self, order_id: OrderId, key: &str) -> Result<Option<String>>;
    /// First order whose meta `key` equals `value`.
    async fn find_order_by_meta(&self, key: &str, value: &str) -> Result<Option<OrderId>>;
}

pub type OrderStoreBox = Box<dyn OrderStore>;

/// Values handed to the payment provider SDK before a transaction is built.
///
/// The provider identifies the point of sale by the merchant ID, so both must be numeric.
#[derive(Clone, PartialEq, Eq)]
pub struct BackendConfiguration {
    pub merchant_id: u64,
    pub pos_id: u64,
    pub crc_key: String,
    pub api_key: String,
    pub sandbox: bool,
}

impl TryFrom<&CredentialSet> for BackendConfiguration {
    type Error = RouterError;

    fn try_from(credentials: &CredentialSet) -> Result<Self> {
        let merchant_id = credentials.merchant_id().parse::<u64>().map_err(|_| {
            RouterError::SdkInitialization(format!(
                "merchant id '{}' is not numeric",
                credentials.merchant_id()
            ))
        })?;
        Ok(Self {
            merchant_id,
            pos_id: merchant_id,
            crc_key: credentials.crc_key().to_string(),
            api_key: credentials.api_key().to_string(),
            sandbox: false,
        })
    }
}

impl fmt::Debug for BackendConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendConfiguration")
            .field("merchant_id", &self.merchant_id)
            .field("pos_id", &self.pos_id)
            .field("crc_key", &mask(&self.crc_key))
            .field("api_key", &mask(&self.api_key))
            .field("sandbox", &self.sandbox)
            .finish()
    }
}

/// A transaction registered with the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub redirect_url: String,
    pub session_id: Option<String>,
}

/// The provider SDK: builds and submits transactions, validates status callbacks.
///
/// Every call receives the credentials explicitly. Implementations that sign
/// outbound HTTP requests through a shared hook read the same set from the
/// active [`CredentialSlot`](crate::application::slot::CredentialSlot).
#[async_trait]
pub trait PaymentBackend: Send + Sync {
    async fn configure(&self, configuration: &BackendConfiguration) -> Result<()>;
    async fn submit_transaction(
        &self,
        order_id: OrderId,
        credentials: &CredentialSet,
    ) -> Result<Submission>;
    async fn confirm_callback(
        &self,
        order_id: OrderId,
        credentials: &CredentialSet,
        payload: &[u8],
    ) -> Result<()>;
}

pub type PaymentBackendBox = Box<dyn PaymentBackend>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_configuration_reuses_merchant_as_pos() {
        let set = CredentialSet::new("111", "AAA", "k1").unwrap();
        let config = BackendConfiguration::try_from(&set).unwrap();
        assert_eq!(config.merchant_id, 111);
        assert_eq!(config.pos_id, 111);
        assert!(!config.sandbox);
    }

    #[test]
    fn test_non_numeric_merchant_is_sdk_error() {
        let set = CredentialSet::new("shop-a", "AAA", "k1").unwrap();
        let err = BackendConfiguration::try_from(&set).unwrap_err();
        assert!(matches!(err, RouterError::SdkInitialization(_)));
    }
}
