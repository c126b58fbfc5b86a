//! Credential table configuration.
//!
//! The merchant maintains one default account and optional per-region accounts in a
//! JSON file. Everything is validated here, before any order is routed:
//! region keys must name a known region, the default account must be complete,
//! and incomplete region entries are either reported or, in strict mode, rejected.

use crate::domain::credentials::{CredentialEntry, CredentialTable, EntryState};
use crate::domain::region::RegionCode;
use crate::error::{Result, RouterError};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::warn;

#[derive(Debug, Clone, Deserialize)]
pub struct RouterConfig {
    pub default: CredentialEntry,
    #[serde(default)]
    pub regions: BTreeMap<String, CredentialEntry>,
    /// Reject incomplete region entries at load time instead of at checkout.
    #[serde(default)]
    pub strict: bool,
    /// Host of the provider API that outbound authentication applies to.
    #[serde(default = "default_api_host")]
    pub api_host: String,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

fn default_api_host() -> String {
    "przelewy24.pl".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl RouterConfig {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Builds the validated credential table.
    pub fn credential_table(&self) -> Result<CredentialTable> {
        let default = match self.default.classify() {
            EntryState::Complete(set) => set,
            EntryState::Blank => {
                return Err(RouterError::InvalidConfig(
                    "default credentials are not configured".to_string(),
                ));
            }
            EntryState::Incomplete(missing) => {
                return Err(RouterError::InvalidConfig(format!(
                    "default credentials are missing: {}",
                    missing.join(", ")
                )));
            }
        };

        let mut table = CredentialTable::new(default);
        let mut seen: BTreeMap<RegionCode, &str> = BTreeMap::new();
        for (key, entry) in &self.regions {
            let region = RegionCode::normalize(key).ok_or_else(|| {
                RouterError::InvalidConfig(format!("unknown region '{}'", key))
            })?;
            if let Some(previous) = seen.insert(region, key) {
                return Err(RouterError::InvalidConfig(format!(
                    "region {} configured twice ('{}' and '{}')",
                    region, previous, key
                )));
            }
            table.insert_entry(region, entry);
        }

        let incomplete = table.incomplete_regions();
        if self.strict && !incomplete.is_empty() {
            let listed: Vec<String> = incomplete
                .iter()
                .map(|(region, missing)| format!("{} ({})", region, missing.join(", ")))
                .collect();
            return Err(RouterError::InvalidConfig(format!(
                "incomplete region credentials: {}",
                listed.join("; ")
            )));
        }
        for (region, missing) in &incomplete {
            warn!(
                %region,
                name = region.name(),
                missing = %missing.join(", "),
                "incomplete region credentials; orders from this region will be rejected"
            );
        }

        Ok(table)
    }
}
