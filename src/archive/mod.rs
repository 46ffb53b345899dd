//! ZIP archive reading.
//!
//! - [`structures`]: records of the ZIP format (EOCD, ZIP64 records, entries)
//! - [`parser`]: central directory parsing from any [`ReadAt`](crate::io::ReadAt) source
//! - [`ArchiveReader`]: member lookup below the archive's top-level directory,
//!   with STORED and DEFLATE extraction checked against size and CRC-32
//!
//! Encrypted and multi-disk archives are not supported.

mod parser;
mod reader;
mod structures;

pub use parser::ZipParser;
pub use reader::ArchiveReader;
pub use structures::*;
