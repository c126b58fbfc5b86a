#![allow(dead_code)]

use credential_router::domain::credentials::{CredentialEntry, CredentialSet, CredentialTable};
use credential_router::domain::region::RegionCode;
use std::io::Write;
use tempfile::NamedTempFile;

pub const CONFIG_FIXTURE: &str = "tests/fixtures/credentials.json";

/// Default `000`, MA `111`, SL `333`, DS incomplete.
pub fn sample_table() -> CredentialTable {
    let mut table = CredentialTable::new(CredentialSet::new("000", "ZZZ", "k0").unwrap())
        .with_region(RegionCode::MA, CredentialSet::new("111", "AAA", "k1").unwrap())
        .with_region(RegionCode::SL, CredentialSet::new("333", "SSS", "k3").unwrap());
    table.insert_entry(
        RegionCode::DS,
        &CredentialEntry {
            merchant_id: "222".into(),
            crc_key: "".into(),
            api_key: "k2".into(),
        },
    );
    table
}

pub fn orders_csv(rows: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "order_id,billing_state,shipping_state").unwrap();
    for row in rows {
        writeln!(file, "{}", row).unwrap();
    }
    file
}
