use super::credentials::{CredentialTable, RegionEntry};
use super::order::{CredentialSource, OrderContext, ResolvedCredentials};
use super::region::RegionCode;
use crate::error::{Result, RouterError};

/// Selects the credential set for one order.
///
/// Unknown or missing regions fall back to the table's default account. A known
/// region with an incomplete entry is an error rather than a silent fallback.
pub fn resolve(order: &OrderContext, table: &CredentialTable) -> Result<ResolvedCredentials> {
    let region = order.declared_region().and_then(RegionCode::normalize);

    let (credentials, source) = match region {
        Some(region) => match table.entry(region) {
            Some(RegionEntry::Complete(set)) => (set.clone(), CredentialSource::Region(region)),
            Some(RegionEntry::Incomplete { .. }) => {
                return Err(RouterError::Configuration { region });
            }
            None => (table.default_set().clone(), CredentialSource::Default),
        },
        None => (table.default_set().clone(), CredentialSource::Default),
    };

    Ok(ResolvedCredentials {
        order_id: order.order_id,
        credentials,
        source,
    })
}
