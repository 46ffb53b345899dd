//! CSV parsing of GeoLite2 block and location files.
//!
//! Rows are projected into typed structs as they are read; a row that does
//! not fit its struct, or whose network is not valid CIDR, aborts the parse.

mod asn;
mod country;

pub use asn::parse_asn;
pub use country::parse_country;

use csv::{ReaderBuilder, StringRecord};
use serde::de::DeserializeOwned;

use crate::archive::ArchiveReader;
use crate::database::Database;
use crate::entry::{AsnRangeEntry, CountryRangeEntry};
use crate::error::{ConvertError, Result};
use crate::io::ReadAt;
use crate::network::{Network, NetworkParseError};

/// Read the country locations and blocks members of a country archive.
pub async fn convert_country_database<R: ReadAt>(
    archive: &ArchiveReader<R>,
) -> Result<Vec<CountryRangeEntry>> {
    let members = read_members(archive, Database::Country).await?;

    let entries = parse_country(&members[0], &members[1], &members[2])?;
    log::info!(
        "Parsed {} country ranges from {}",
        entries.len(),
        archive.directory()
    );
    Ok(entries)
}

/// Read the AS blocks members of an ASN archive.
pub async fn convert_asn_database<R: ReadAt>(
    archive: &ArchiveReader<R>,
) -> Result<Vec<AsnRangeEntry>> {
    let members = read_members(archive, Database::Asn).await?;

    let entries = parse_asn(&members[0], &members[1])?;
    log::info!(
        "Parsed {} AS ranges from {}",
        entries.len(),
        archive.directory()
    );
    Ok(entries)
}

/// Contents of every member of `database`, in [`Database::members`] order.
async fn read_members<R: ReadAt>(
    archive: &ArchiveReader<R>,
    database: Database,
) -> Result<Vec<Vec<u8>>> {
    let mut contents = Vec::with_capacity(database.members().len());
    for name in database.members() {
        contents.push(archive.read_member(name).await?);
    }
    Ok(contents)
}

/// Deserialize every data row of a headed CSV file, in file order.
///
/// The callback receives the row and its 1-based line number.
pub(crate) fn for_each_row<T, F>(file: &str, data: &[u8], mut f: F) -> Result<()>
where
    T: DeserializeOwned,
    F: FnMut(T, u64) -> Result<()>,
{
    let csv_err = |source: csv::Error| ConvertError::Csv {
        file: file.to_string(),
        source,
    };

    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(data);
    let headers = reader.headers().map_err(csv_err)?.clone();
    let mut record = StringRecord::new();

    while reader.read_record(&mut record).map_err(csv_err)? {
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let row = record.deserialize(Some(&headers)).map_err(csv_err)?;
        f(row, line)?;
    }

    Ok(())
}

pub(crate) fn parse_network(file: &str, line: u64, value: &str) -> Result<Network> {
    value.parse().map_err(|e: NetworkParseError| ConvertError::Row {
        file: file.to_string(),
        line,
        reason: e.to_string(),
    })
}
