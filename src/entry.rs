//! Range records produced by the parsers and the merger.
//!
//! Optional fields serialize as `null` rather than being omitted, so every
//! record of one output mode has the same keys.

use serde::Serialize;

use crate::network::Network;

/// One row of a country blocks file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountryRangeEntry {
    pub network: Network,
    pub country_iso_code: Option<String>,
}

/// One row of an AS blocks file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AsnRangeEntry {
    pub network: Network,
    pub as_number: Option<u32>,
    pub as_organization: Option<String>,
}

/// A country row enriched with the AS data of the same network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RangeEntry {
    pub network: Network,
    pub country_iso_code: Option<String>,
    pub as_number: Option<u32>,
    pub as_organization: Option<String>,
}
