use serde::Deserialize;

use super::{for_each_row, parse_network};
use crate::database::{ASN_BLOCKS_IPV4, ASN_BLOCKS_IPV6};
use crate::entry::AsnRangeEntry;
use crate::error::Result;

#[derive(Debug, Deserialize)]
struct AsnBlockRow {
    network: String,
    autonomous_system_number: Option<u32>,
    autonomous_system_organization: Option<String>,
}

/// Build AS range entries from both blocks files, IPv4 first.
///
/// Unassigned ranges with empty AS columns are kept with null AS fields.
pub fn parse_asn(blocks_ipv4: &[u8], blocks_ipv6: &[u8]) -> Result<Vec<AsnRangeEntry>> {
    let mut entries = Vec::new();

    for (file, data) in [(ASN_BLOCKS_IPV4, blocks_ipv4), (ASN_BLOCKS_IPV6, blocks_ipv6)] {
        for_each_row(file, data, |row: AsnBlockRow, line| {
            entries.push(AsnRangeEntry {
                network: parse_network(file, line, &row.network)?,
                as_number: row.autonomous_system_number,
                as_organization: row.autonomous_system_organization,
            });
            Ok(())
        })?;
    }

    Ok(entries)
}
