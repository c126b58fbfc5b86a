use crate::domain::region::RegionCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RouterError>;

#[derive(Error, Debug)]
pub enum RouterError {
    #[error("Incomplete credentials configured for region {region}")]
    Configuration { region: RegionCode },
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Payment backend initialization failed: {0}")]
    SdkInitialization(String),
    #[error("Transaction submission failed: {0}")]
    TransactionSubmission(String),
    #[error("Invalid credential configuration: {0}")]
    InvalidConfig(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Internal error: {0}")]
    Internal(#[from] Box<dyn std::error::Error + Send + Sync>),
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for RouterError {
    fn from(err: rocksdb::Error) -> Self {
        RouterError::Internal(Box::new(err))
    }
}

impl RouterError {
    /// Message safe to show to the paying customer.
    ///
    /// Details stay in the logs; the customer only learns which stage failed.
    pub fn customer_notice(&self) -> &'static str {
        match self {
            RouterError::Configuration { .. } => {
                "Payment configuration is unavailable for your region."
            }
            RouterError::SdkInitialization(_) => "Payment initialization failed.",
            RouterError::TransactionSubmission(_) => "Payment processing failed.",
            _ => "Payment could not be processed.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_customer_notice_per_kind() {
        let err = RouterError::Configuration {
            region: RegionCode::DS,
        };
        assert_eq!(
            err.customer_notice(),
            "Payment configuration is unavailable for your region."
        );
        assert_eq!(
            RouterError::SdkInitialization("boom".into()).customer_notice(),
            "Payment initialization failed."
        );
        assert_eq!(
            RouterError::NotFound("order 1".into()).customer_notice(),
            "Payment could not be processed."
        );
    }

    #[test]
    fn test_configuration_error_names_region() {
        let err = RouterError::Configuration {
            region: RegionCode::MA,
        };
        assert!(err.to_string().contains("MA"));
    }
}
