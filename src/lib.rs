//! # geolite-convert
//!
//! Download GeoLite2 CSV databases and convert them to JSON range records.
//!
//! The GeoLite2 Country and ASN databases are published as zip archives of
//! CSV files. This library reads those archives, parses the block files into
//! typed range entries, resolves country codes through the locations file,
//! and optionally joins country ranges with AS ranges by network.
//!
//! ## Features
//!
//! - Conditional download: a `HEAD` request skips the archive body when the
//!   published file name matches the last one fetched
//! - Archive reading from memory or from a local file, STORED and DEFLATE
//!   members, ZIP64 central directories
//! - Country, ASN and merged country + ASN output as a JSON array
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use geolite_convert::{ArchiveReader, Database, Downloader, MemoryReader, Retrieval};
//! use geolite_convert::parse::convert_country_database;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let downloader = Downloader::new("licence-key")?;
//!     let Retrieval::Fetched(data) = downloader.retrieve(Database::Country, None).await? else {
//!         return Ok(());
//!     };
//!
//!     let archive = ArchiveReader::open(Arc::new(MemoryReader::new(data.content))).await?;
//!     let entries = convert_country_database(&archive).await?;
//!     geolite_convert::output::write_json(std::io::stdout().lock(), &entries, false)?;
//!
//!     Ok(())
//! }
//! ```

pub mod archive;
pub mod cli;
pub mod config;
pub mod database;
pub mod download;
pub mod entry;
pub mod error;
pub mod io;
pub mod merge;
pub mod network;
pub mod output;
pub mod parse;

pub use archive::ArchiveReader;
pub use cli::Cli;
pub use database::Database;
pub use download::{Downloader, Retrieval, RetrievalData};
pub use entry::{AsnRangeEntry, CountryRangeEntry, RangeEntry};
pub use error::{ConvertError, ErrorCategory, Result};
pub use io::{LocalFileReader, MemoryReader, ReadAt, SourceReader};
pub use merge::merge;
pub use network::Network;
