use super::credentials::CredentialSet;
use super::region::RegionCode;
use crate::error::RouterError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Order meta key holding the merchant ID chosen at payment initiation.
pub const META_MERCHANT_ID: &str = "_p24_mid";
/// Order meta key holding the CRC key chosen at payment initiation.
pub const META_CRC_KEY: &str = "_p24_crc";
/// Order meta key holding the API key chosen at payment initiation.
pub const META_API_KEY: &str = "_p24_api";
/// Order meta key holding the provider session ID of the registered transaction.
pub const META_SESSION_ID: &str = "_p24_session";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub u64);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for OrderId {
    type Err = RouterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(OrderId)
            .map_err(|_| RouterError::Validation(format!("invalid order id '{}'", s)))
    }
}

/// An order as the store sees it: its declared regions plus free-form meta.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub order_id: OrderId,
    pub billing_region: Option<String>,
    pub shipping_region: Option<String>,
    #[serde(default)]
    pub meta: HashMap<String, String>,
}

impl OrderRecord {
    pub fn new(
        order_id: OrderId,
        billing_region: Option<String>,
        shipping_region: Option<String>,
    ) -> Self {
        Self {
            order_id,
            billing_region,
            shipping_region,
            meta: HashMap::new(),
        }
    }
}

/// What the router knows about an order at checkout: its billing and shipping regions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderContext {
    pub order_id: OrderId,
    pub region: Option<String>,
    pub alternate_region: Option<String>,
}

impl OrderContext {
    pub fn new(
        order_id: OrderId,
        region: Option<String>,
        alternate_region: Option<String>,
    ) -> Self {
        Self {
            order_id,
            region,
            alternate_region,
        }
    }

    /// The billing region, or the shipping region when billing is blank.
    pub fn declared_region(&self) -> Option<&str> {
        [self.region.as_deref(), self.alternate_region.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|value| !value.is_empty())
    }
}

/// Where a resolved credential set came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Region(RegionCode),
    Default,
    /// Reloaded from order meta; the region is not re-derived.
    Persisted,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::Region(region) => write!(f, "{}", region),
            CredentialSource::Default => f.write_str("default"),
            CredentialSource::Persisted => f.write_str("persisted"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCredentials {
    pub order_id: OrderId,
    pub credentials: CredentialSet,
    pub source: CredentialSource,
}
