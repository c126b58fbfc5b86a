use super::region::RegionCode;
use crate::error::{Result, RouterError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Merchant ID, CRC key and API key identifying one payment-provider sub-account.
///
/// All three fields are trimmed and non-empty; a `CredentialSet` can only be
/// obtained through [`CredentialSet::new`], so a partial set never exists.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialSet {
    merchant_id: String,
    crc_key: String,
    api_key: String,
}

impl CredentialSet {
    pub fn new(
        merchant_id: impl AsRef<str>,
        crc_key: impl AsRef<str>,
        api_key: impl AsRef<str>,
    ) -> Result<Self> {
        let entry = CredentialEntry {
            merchant_id: merchant_id.as_ref().to_string(),
            crc_key: crc_key.as_ref().to_string(),
            api_key: api_key.as_ref().to_string(),
        };
        match entry.classify() {
            EntryState::Complete(set) => Ok(set),
            EntryState::Blank => Err(RouterError::Validation(
                "credential set is empty".to_string(),
            )),
            EntryState::Incomplete(missing) => Err(RouterError::Validation(format!(
                "credential set is missing: {}",
                missing.join(", ")
            ))),
        }
    }

    pub fn merchant_id(&self) -> &str {
        &self.merchant_id
    }

    pub fn crc_key(&self) -> &str {
        &self.crc_key
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

/// Shows the first four characters of a secret, enough to tell accounts apart in logs.
///
/// Secrets of four characters or fewer are never shown.
pub fn mask(secret: &str) -> String {
    if secret.chars().count() <= 4 {
        return "****".to_string();
    }
    let prefix: String = secret.chars().take(4).collect();
    format!("{}…", prefix)
}

impl fmt::Debug for CredentialSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialSet")
            .field("merchant_id", &self.merchant_id)
            .field("crc_key", &mask(&self.crc_key))
            .field("api_key", &mask(&self.api_key))
            .finish()
    }
}

/// Credentials as typed in by the merchant, possibly incomplete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialEntry {
    #[serde(default)]
    pub merchant_id: String,
    #[serde(default)]
    pub crc_key: String,
    #[serde(default)]
    pub api_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryState {
    Blank,
    Complete(CredentialSet),
    Incomplete(Vec<&'static str>),
}

impl CredentialEntry {
    pub fn classify(&self) -> EntryState {
        let fields = [
            ("merchant_id", self.merchant_id.trim()),
            ("crc_key", self.crc_key.trim()),
            ("api_key", self.api_key.trim()),
        ];
        let missing: Vec<&'static str> = fields
            .iter()
            .filter(|(_, value)| value.is_empty())
            .map(|(name, _)| *name)
            .collect();

        match missing.len() {
            0 => EntryState::Complete(CredentialSet {
                merchant_id: fields[0].1.to_string(),
                crc_key: fields[1].1.to_string(),
                api_key: fields[2].1.to_string(),
            }),
            3 => EntryState::Blank,
            _ => EntryState::Incomplete(missing),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionEntry {
    Complete(CredentialSet),
    Incomplete { missing: Vec<&'static str> },
}

/// Per-region credentials plus the default account used when a region has no entry.
#[derive(Debug, Clone)]
pub struct CredentialTable {
    default: CredentialSet,
    regions: BTreeMap<RegionCode, RegionEntry>,
}

impl CredentialTable {
    pub fn new(default: CredentialSet) -> Self {
        Self {
            default,
            regions: BTreeMap::new(),
        }
    }

    /// Builder-style insertion of a complete region entry.
    pub fn with_region(mut self, region: RegionCode, credentials: CredentialSet) -> Self {
        self.regions
            .insert(region, RegionEntry::Complete(credentials));
        self
    }

    /// Records an admin entry for `region`. Blank entries leave the region unconfigured.
    pub fn insert_entry(&mut self, region: RegionCode, entry: &CredentialEntry) {
        match entry.classify() {
            EntryState::Blank => {
                self.regions.remove(&region);
            }
            EntryState::Complete(set) => {
                self.regions.insert(region, RegionEntry::Complete(set));
            }
            EntryState::Incomplete(missing) => {
                self.regions
                    .insert(region, RegionEntry::Incomplete { missing });
            }
        }
    }

    pub fn default_set(&self) -> &CredentialSet {
        &self.default
    }

    pub fn entry(&self, region: RegionCode) -> Option<&RegionEntry> {
        self.regions.get(&region)
    }

    /// Regions whose entry is present but unusable.
    pub fn incomplete_regions(&self) -> Vec<(RegionCode, &[&'static str])> {
        self.regions
            .iter()
            .filter_map(|(region, entry)| match entry {
                RegionEntry::Incomplete { missing } => Some((*region, missing.as_slice())),
                RegionEntry::Complete(_) => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_set_trims_fields() {
        let set = CredentialSet::new(" 111 ", "AAA\n", "\tk1").unwrap();
        assert_eq!(set.merchant_id(), "111");
        assert_eq!(set.crc_key(), "AAA");
        assert_eq!(set.api_key(), "k1");
    }

    #[test]
    fn test_partial_credential_set_rejected() {
        let err = CredentialSet::new("222", "  ", "k2").unwrap_err();
        assert!(matches!(err, RouterError::Validation(ref msg) if msg.contains("crc_key")));
        assert!(CredentialSet::new("", "", "").is_err());
    }

    #[test]
    fn test_classify_entry() {
        let blank = CredentialEntry::default();
        assert_eq!(blank.classify(), EntryState::Blank);

        let partial = CredentialEntry {
            merchant_id: "222".into(),
            crc_key: "".into(),
            api_key: "k2".into(),
        };
        assert_eq!(partial.classify(), EntryState::Incomplete(vec!["crc_key"]));
    }

    #[test]
    fn test_debug_masks_secrets() {
        let set = CredentialSet::new("111", "ABCDEFGH", "secret-api-key").unwrap();
        let debug = format!("{:?}", set);
        assert!(debug.contains("111"));
        assert!(debug.contains("ABCD…"));
        assert!(!debug.contains("EFGH"));
        assert!(!debug.contains("secret-api-key"));
    }

    #[test]
    fn test_short_secrets_are_fully_hidden() {
        assert_eq!(mask("k1"), "****");
        assert_eq!(mask("ABCD"), "****");
        assert_eq!(mask("ABCDE"), "ABCD…");

        let debug = format!("{:?}", CredentialSet::new("111", "AAA", "k1").unwrap());
        assert!(!debug.contains("AAA"));
        assert!(!debug.contains("k1"));
    }

    #[test]
    fn test_blank_entry_clears_region() {
        let default = CredentialSet::new("000", "ZZZ", "k0").unwrap();
        let mut table = CredentialTable::new(default)
            .with_region(RegionCode::MA, CredentialSet::new("111", "AAA", "k1").unwrap());

        table.insert_entry(RegionCode::MA, &CredentialEntry::default());
        assert!(table.entry(RegionCode::MA).is_none());
    }

    #[test]
    fn test_incomplete_regions_listed() {
        let default = CredentialSet::new("000", "ZZZ", "k0").unwrap();
        let mut table = CredentialTable::new(default);
        table.insert_entry(
            RegionCode::DS,
            &CredentialEntry {
                merchant_id: "222".into(),
                crc_key: "".into(),
                api_key: "k2".into(),
            },
        );

        let incomplete = table.incomplete_regions();
        assert_eq!(incomplete.len(), 1);
        assert_eq!(incomplete[0].0, RegionCode::DS);
        assert_eq!(incomplete[0].1, &["crc_key"]);
    }
}
