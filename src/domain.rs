use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// Exchange identifier of a fund or ETF, as found in the search listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstrumentId(String);

impl InstrumentId {
    /// Builds an id from the raw listing value, dropping exactly one leading `'0'`.
    ///
    /// Uses the same trim and non-empty rule as [`FromStr`], so every id a
    /// listing yields can be read back from a saved id list.
    pub fn from_listing_value(raw: &str) -> Option<Self> {
        strip_leading_zero(raw.trim()).parse().ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstrumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parses an id that is already normalized, e.g. one read back from an id list.
impl FromStr for InstrumentId {
    type Err = CatalogError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(CatalogError::InvalidInstrumentId(value.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }
}

pub fn strip_leading_zero(raw: &str) -> &str {
    raw.strip_prefix('0').unwrap_or(raw)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstrumentKind {
    Fund,
    Etf,
}

impl fmt::Display for InstrumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstrumentKind::Fund => write!(f, "fund"),
            InstrumentKind::Etf => write!(f, "etf"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentRecord {
    pub kind: InstrumentKind,
    pub name: String,
    pub short_name: String,
    pub id: String,
    pub imitating_target: Option<String>,
    pub classification: Option<String>,
    pub secondary_classification: Option<String>,
    pub sub_classification: Option<String>,
    pub management_fee: f64,
    pub trustee_fee: f64,
    #[serde(default)]
    pub variable_fee: f64,
}

impl InstrumentRecord {
    /// Ranking key. Never persisted.
    pub fn total_fee(&self) -> f64 {
        self.management_fee + self.trustee_fee + self.variable_fee
    }
}
