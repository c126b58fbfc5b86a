use crate::application::checkout::PaymentRedirect;
use crate::domain::order::OrderId;
use crate::error::{Result, RouterError};
use serde::Serialize;
use std::io::Write;

/// One line of checkout output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutOutcome {
    pub order_id: OrderId,
    pub region: String,
    pub merchant_id: String,
    pub status: &'static str,
    /// Redirect URL on success, the customer-facing notice on failure.
    pub detail: String,
}

impl CheckoutOutcome {
    pub fn redirected(redirect: &PaymentRedirect) -> Self {
        Self {
            order_id: redirect.order_id,
            region: redirect.source.to_string(),
            merchant_id: redirect.merchant_id.clone(),
            status: "redirect",
            detail: redirect.redirect_url.clone(),
        }
    }

    pub fn failed(order_id: OrderId, region: Option<&str>, err: &RouterError) -> Self {
        Self {
            order_id,
            region: region.unwrap_or_default().to_string(),
            merchant_id: String::new(),
            status: "failed",
            detail: err.customer_notice().to_string(),
        }
    }
}

/// Writes checkout outcomes as CSV with a header row.
pub struct OutcomeWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> OutcomeWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write(&mut self, outcome: &CheckoutOutcome) -> Result<()> {
        self.writer.serialize(outcome)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::CredentialSource;
    use crate::domain::region::RegionCode;

    #[test]
    fn test_writes_header_and_rows() {
        let mut buffer = Vec::new();
        {
            let mut writer = OutcomeWriter::new(&mut buffer);
            let redirect = PaymentRedirect {
                order_id: OrderId(1),
                redirect_url: "https://secure.przelewy24.pl/trnRequest/1-1".into(),
                merchant_id: "111".into(),
                source: CredentialSource::Region(RegionCode::MA),
            };
            writer.write(&CheckoutOutcome::redirected(&redirect)).unwrap();
            let err = RouterError::Configuration {
                region: RegionCode::DS,
            };
            writer
                .write(&CheckoutOutcome::failed(OrderId(2), Some("DS"), &err))
                .unwrap();
            writer.flush().unwrap();
        }

        let output = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "order_id,region,merchant_id,status,detail");
        assert_eq!(
            lines[1],
            "1,MA,111,redirect,https://secure.przelewy24.pl/trnRequest/1-1"
        );
        assert_eq!(
            lines[2],
            "2,DS,,failed,Payment configuration is unavailable for your region."
        );
    }
}
