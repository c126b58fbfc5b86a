use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Country prefix that may precede a region code (`PL-MA`).
const COUNTRY_PREFIX: &str = "PL-";

/// One of the sixteen voivodeships used as the credential-selection key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RegionCode {
    DS,
    KP,
    LU,
    LB,
    LD,
    MA,
    MZ,
    OP,
    PK,
    PD,
    PM,
    SL,
    SK,
    WN,
    WP,
    ZP,
}

impl RegionCode {
    pub const ALL: [RegionCode; 16] = [
        RegionCode::DS,
        RegionCode::KP,
        RegionCode::LU,
        RegionCode::LB,
        RegionCode::LD,
        RegionCode::MA,
        RegionCode::MZ,
        RegionCode::OP,
        RegionCode::PK,
        RegionCode::PD,
        RegionCode::PM,
        RegionCode::SL,
        RegionCode::SK,
        RegionCode::WN,
        RegionCode::WP,
        RegionCode::ZP,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            RegionCode::DS => "DS",
            RegionCode::KP => "KP",
            RegionCode::LU => "LU",
            RegionCode::LB => "LB",
            RegionCode::LD => "LD",
            RegionCode::MA => "MA",
            RegionCode::MZ => "MZ",
            RegionCode::OP => "OP",
            RegionCode::PK => "PK",
            RegionCode::PD => "PD",
            RegionCode::PM => "PM",
            RegionCode::SL => "SL",
            RegionCode::SK => "SK",
            RegionCode::WN => "WN",
            RegionCode::WP => "WP",
            RegionCode::ZP => "ZP",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RegionCode::DS => "Dolnośląskie",
            RegionCode::KP => "Kujawsko-Pomorskie",
            RegionCode::LU => "Lubelskie",
            RegionCode::LB => "Lubuskie",
            RegionCode::LD => "Łódzkie",
            RegionCode::MA => "Małopolskie",
            RegionCode::MZ => "Mazowieckie",
            RegionCode::OP => "Opolskie",
            RegionCode::PK => "Podkarpackie",
            RegionCode::PD => "Podlaskie",
            RegionCode::PM => "Pomorskie",
            RegionCode::SL => "Śląskie",
            RegionCode::SK => "Świętokrzyskie",
            RegionCode::WN => "Warmińsko-Mazurskie",
            RegionCode::WP => "Wielkopolskie",
            RegionCode::ZP => "Zachodniopomorskie",
        }
    }

    /// Normalizes a free-form region value and maps it onto a known code.
    ///
    /// Returns `None` for blank input or codes outside the closed set.
    pub fn normalize(raw: &str) -> Option<Self> {
        normalize_token(raw).parse().ok()
    }
}

/// Trims, upper-cases and strips the optional country prefix.
pub fn normalize_token(raw: &str) -> String {
    let upper = raw.trim().to_uppercase();
    match upper.strip_prefix(COUNTRY_PREFIX) {
        Some(rest) => rest.trim().to_string(),
        None => upper,
    }
}

impl FromStr for RegionCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RegionCode::ALL
            .into_iter()
            .find(|region| region.code() == s)
            .ok_or_else(|| format!("unknown region code '{}'", s))
    }
}

impl fmt::Display for RegionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
