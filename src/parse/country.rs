use std::collections::HashMap;

use serde::Deserialize;

use super::{for_each_row, parse_network};
use crate::database::{COUNTRY_BLOCKS_IPV4, COUNTRY_BLOCKS_IPV6, COUNTRY_LOCATIONS};
use crate::entry::CountryRangeEntry;
use crate::error::Result;

#[derive(Debug, Deserialize)]
struct LocationRow {
    geoname_id: String,
    country_iso_code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CountryBlockRow {
    network: String,
    geoname_id: Option<String>,
}

/// Build country range entries from the locations file and both blocks files.
///
/// IPv4 entries come first, then IPv6, each in file order. A block whose
/// `geoname_id` has no country in the locations file gets no country code.
pub fn parse_country(
    locations: &[u8],
    blocks_ipv4: &[u8],
    blocks_ipv6: &[u8],
) -> Result<Vec<CountryRangeEntry>> {
    let countries = geoname_countries(locations)?;
    log::debug!("Locations map {} geoname ids to a country", countries.len());

    let mut entries = Vec::new();
    for (file, data) in [
        (COUNTRY_BLOCKS_IPV4, blocks_ipv4),
        (COUNTRY_BLOCKS_IPV6, blocks_ipv6),
    ] {
        for_each_row(file, data, |row: CountryBlockRow, line| {
            let network = parse_network(file, line, &row.network)?;
            let country_iso_code = row
                .geoname_id
                .as_deref()
                .and_then(|id| countries.get(id))
                .cloned();
            entries.push(CountryRangeEntry {
                network,
                country_iso_code,
            });
            Ok(())
        })?;
    }

    Ok(entries)
}

/// Geoname id to ISO country code. Later rows win; continent-level
/// locations without a country code are left out.
fn geoname_countries(locations: &[u8]) -> Result<HashMap<String, String>> {
    let mut countries = HashMap::new();
    for_each_row(COUNTRY_LOCATIONS, locations, |row: LocationRow, _| {
        match row.country_iso_code {
            Some(code) => {
                countries.insert(row.geoname_id, code);
            }
            None => {
                countries.remove(&row.geoname_id);
            }
        }
        Ok(())
    })?;
    Ok(countries)
}
