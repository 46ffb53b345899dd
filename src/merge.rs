//! Left join of country ranges with AS ranges.

use std::collections::HashMap;

use crate::entry::{AsnRangeEntry, CountryRangeEntry, RangeEntry};

#[derive(Debug, Clone)]
struct AsnInfo {
    as_number: Option<u32>,
    as_organization: Option<String>,
}

/// Attach AS data to every country range with the same network.
///
/// The output has exactly one entry per country entry, in the same order.
/// Networks that only appear in the AS data are dropped. Networks are
/// matched by their CIDR text; a network listed twice in the AS data keeps
/// its last occurrence.
pub fn merge(country_entries: Vec<CountryRangeEntry>, asn_entries: &[AsnRangeEntry]) -> Vec<RangeEntry> {
    let mut index: HashMap<String, AsnInfo> = HashMap::with_capacity(asn_entries.len());
    for entry in asn_entries {
        let previous = index.insert(
            entry.network.key(),
            AsnInfo {
                as_number: entry.as_number,
                as_organization: entry.as_organization.clone(),
            },
        );
        if previous.is_some() {
            log::warn!("AS network {} listed more than once", entry.network);
        }
    }

    let mut matched = 0usize;
    let merged: Vec<RangeEntry> = country_entries
        .into_iter()
        .map(|entry| {
            let info = index.get(&entry.network.key());
            if info.is_some() {
                matched += 1;
            }
            RangeEntry {
                network: entry.network,
                country_iso_code: entry.country_iso_code,
                as_number: info.and_then(|i| i.as_number),
                as_organization: info.and_then(|i| i.as_organization.clone()),
            }
        })
        .collect();

    log::info!(
        "Matched AS data for {} of {} country ranges",
        matched,
        merged.len()
    );
    merged
}
