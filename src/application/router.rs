use crate::domain::credentials::{CredentialSet, CredentialTable, mask};
use crate::domain::order::{
    CredentialSource, META_API_KEY, META_CRC_KEY, META_MERCHANT_ID, OrderContext, OrderId,
    ResolvedCredentials,
};
use crate::domain::ports::OrderStoreBox;
use crate::domain::resolver::resolve;
use crate::error::{Result, RouterError};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Resolves per-order credentials and remembers them on the order.
///
/// Resolution happens once, when payment is initiated. Everything that runs
/// later for the same order (status callbacks) goes through [`CredentialRouter::reload`].
pub struct CredentialRouter {
    table: Arc<CredentialTable>,
    order_store: OrderStoreBox,
}

impl CredentialRouter {
    pub fn new(table: Arc<CredentialTable>, order_store: OrderStoreBox) -> Self {
        Self { table, order_store }
    }

    pub fn table(&self) -> &CredentialTable {
        &self.table
    }

    pub fn order_store(&self) -> &OrderStoreBox {
        &self.order_store
    }

    /// Loads the order's regions from the store.
    pub async fn order_context(&self, order_id: OrderId) -> Result<OrderContext> {
        if !self.order_store.order_exists(order_id).await? {
            warn!(%order_id, "order not found");
            return Err(RouterError::NotFound(format!("order {}", order_id)));
        }
        let region = self.order_store.get_region(order_id).await?;
        let alternate_region = self.order_store.get_alternate_region(order_id).await?;
        Ok(OrderContext::new(order_id, region, alternate_region))
    }

    /// Resolves credentials for the order and persists them as order meta.
    pub async fn resolve_order(&self, order_id: OrderId) -> Result<ResolvedCredentials> {
        let order = self.order_context(order_id).await?;
        let resolved = match resolve(&order, &self.table) {
            Ok(resolved) => resolved,
            Err(err) => {
                error!(%order_id, region = ?order.declared_region(), "{}", err);
                return Err(err);
            }
        };

        self.persist(&resolved).await?;
        info!(
            %order_id,
            source = %resolved.source,
            merchant_id = resolved.credentials.merchant_id(),
            api_key = %mask(resolved.credentials.api_key()),
            "credentials resolved"
        );
        Ok(resolved)
    }

    async fn persist(&self, resolved: &ResolvedCredentials) -> Result<()> {
        let order_id = resolved.order_id;
        let credentials = &resolved.credentials;
        let entries = [
            (META_MERCHANT_ID, credentials.merchant_id()),
            (META_CRC_KEY, credentials.crc_key()),
            (META_API_KEY, credentials.api_key()),
        ];
        self.order_store
            .put_order_meta_batch(order_id, &entries)
            .await?;
        debug!(%order_id, "credential meta saved");
        Ok(())
    }

    /// Reads back the credentials persisted for `order_id`.
    ///
    /// Never substitutes the default account: a callback that cannot be matched
    /// to its original credentials must not be processed.
    pub async fn reload(&self, order_id: OrderId) -> Result<ResolvedCredentials> {
        let merchant_id = self.meta(order_id, META_MERCHANT_ID).await?;
        let crc_key = self.meta(order_id, META_CRC_KEY).await?;
        let api_key = self.meta(order_id, META_API_KEY).await?;

        let credentials = match (merchant_id, crc_key, api_key) {
            (Some(mid), Some(crc), Some(api)) => CredentialSet::new(mid, crc, api).ok(),
            _ => None,
        };

        match credentials {
            Some(credentials) => {
                debug!(%order_id, merchant_id = credentials.merchant_id(), "credentials reloaded");
                Ok(ResolvedCredentials {
                    order_id,
                    credentials,
                    source: CredentialSource::Persisted,
                })
            }
            None => {
                warn!(%order_id, "no complete credentials persisted for order");
                Err(RouterError::NotFound(format!(
                    "credentials for order {}",
                    order_id
                )))
            }
        }
    }

    async fn meta(&self, order_id: OrderId, key: &str) -> Result<Option<String>> {
        Ok(self
            .order_store
            .get_order_meta(order_id, key)
            .await?
            .filter(|value| !value.trim().is_empty()))
    }
}
