use crate::domain::order::{OrderId, OrderRecord};
use crate::error::{RouterError, Result};
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize)]
struct OrderRow {
    order_id: u64,
    #[serde(default)]
    billing_state: Option<String>,
    #[serde(default)]
    shipping_state: Option<String>,
}

impl From<OrderRow> for OrderRecord {
    fn from(row: OrderRow) -> Self {
        let non_blank = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
        OrderRecord::new(
            OrderId(row.order_id),
            non_blank(row.billing_state),
            non_blank(row.shipping_state),
        )
    }
}

/// Reads checkout orders (`order_id, billing_state, shipping_state`) from a CSV source.
///
/// Whitespace is trimmed and trailing columns may be omitted.
pub struct OrderReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> OrderReader<R> {
    /// Creates a new `OrderReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes orders.
    pub fn orders(self) -> impl Iterator<Item = Result<OrderRecord>> {
        self.reader
            .into_deserialize::<OrderRow>()
            .map(|result| result.map(OrderRecord::from).map_err(RouterError::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_valid_stream() {
        let data = "order_id, billing_state, shipping_state\n1, PL-MA, \n2, , pl-ds\n3";
        let reader = OrderReader::new(data.as_bytes());
        let results: Vec<Result<OrderRecord>> = reader.orders().collect();

        assert_eq!(results.len(), 3);
        let first = results[0].as_ref().unwrap();
        assert_eq!(first.order_id, OrderId(1));
        assert_eq!(first.billing_region.as_deref(), Some("PL-MA"));
        assert_eq!(first.shipping_region, None);

        let second = results[1].as_ref().unwrap();
        assert_eq!(second.billing_region, None);
        assert_eq!(second.shipping_region.as_deref(), Some("pl-ds"));

        let third = results[2].as_ref().unwrap();
        assert_eq!(third.order_id, OrderId(3));
        assert_eq!(third.billing_region, None);
    }

    #[test]
    fn test_reader_malformed_line() {
        let data = "order_id, billing_state, shipping_state\nabc, PL-MA, ";
        let reader = OrderReader::new(data.as_bytes());
        let results: Vec<Result<OrderRecord>> = reader.orders().collect();

        assert!(results[0].is_err());
    }
}
