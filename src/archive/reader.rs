use flate2::Crc;
use flate2::read::DeflateDecoder;
use std::io::Read;
use std::sync::Arc;

use crate::error::{ConvertError, Result};
use crate::io::ReadAt;

use super::parser::ZipParser;
use super::structures::{ArchiveEntry, CompressionMethod};

/// Upper bound on the output buffer reserved up front from a member's
/// declared size; anything larger grows as it is inflated.
const MAX_PREALLOCATION: usize = 64 * 1024 * 1024;

/// Access to the members of a GeoLite2 CSV archive.
///
/// Every member lives under one top-level directory whose name carries the
/// release date (e.g. `GeoLite2-ASN-CSV_20240102/`). Members are addressed by
/// their file name relative to that directory.
pub struct ArchiveReader<R: ReadAt> {
    parser: ZipParser<R>,
    entries: Vec<ArchiveEntry>,
    directory: String,
}

impl<R: ReadAt> ArchiveReader<R> {
    /// Read the central directory and locate the top-level directory.
    pub async fn open(reader: Arc<R>) -> Result<Self> {
        let parser = ZipParser::new(reader);
        let entries = parser.list_entries().await?;
        let directory = common_top_directory(entries.iter().map(|e| e.file_name.as_str()))?;
        log::debug!("Archive directory is {directory:?}");

        Ok(Self {
            parser,
            entries,
            directory,
        })
    }

    /// Name of the single top-level directory.
    pub fn directory(&self) -> &str {
        &self.directory
    }

    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    /// Read and decompress `<directory>/<file_name>`.
    pub async fn read_member(&self, file_name: &str) -> Result<Vec<u8>> {
        let name = format!("{}/{}", self.directory, file_name);
        let entry = self
            .entries
            .iter()
            .find(|e| !e.is_directory && e.file_name == name)
            .ok_or_else(|| ConvertError::MissingMember { name: name.clone() })?;

        let data = self.extract_to_memory(entry).await?;
        log::debug!("Read {} ({} bytes)", entry.file_name, data.len());
        Ok(data)
    }

    async fn extract_to_memory(&self, entry: &ArchiveEntry) -> Result<Vec<u8>> {
        let data_offset = self.parser.get_data_offset(entry).await?;
        if data_offset.saturating_add(entry.compressed_size) > self.parser.reader().size() {
            return Err(ConvertError::corrupt(format!(
                "data of {} extends past the end of the archive",
                entry.file_name
            )));
        }

        let mut raw = vec![0u8; entry.compressed_size as usize];
        self.parser
            .reader()
            .read_exact_at(data_offset, &mut raw)
            .await?;

        let data = match entry.compression_method {
            CompressionMethod::Stored => raw,
            CompressionMethod::Deflate => {
                let expected = usize::try_from(entry.uncompressed_size).map_err(|_| {
                    ConvertError::corrupt(format!(
                        "{} claims {} uncompressed bytes",
                        entry.file_name, entry.uncompressed_size
                    ))
                })?;
                let mut out = Vec::new();
                out.try_reserve(expected.min(MAX_PREALLOCATION)).map_err(|_| {
                    ConvertError::corrupt(format!(
                        "cannot allocate {} bytes for {}",
                        expected, entry.file_name
                    ))
                })?;
                // One byte past the declared size is enough to fail the length check
                DeflateDecoder::new(raw.as_slice())
                    .take(entry.uncompressed_size.saturating_add(1))
                    .read_to_end(&mut out)
                    .map_err(|e| {
                        ConvertError::corrupt(format!("failed to inflate {}: {e}", entry.file_name))
                    })?;
                out
            }
            CompressionMethod::Unknown(_) => {
                return Err(ConvertError::UnsupportedCompression {
                    name: entry.file_name.clone(),
                    method: entry.compression_method.as_u16(),
                });
            }
        };

        if data.len() as u64 != entry.uncompressed_size {
            return Err(ConvertError::corrupt(format!(
                "{} decompressed to {} bytes, expected {}",
                entry.file_name,
                data.len(),
                entry.uncompressed_size
            )));
        }

        let mut crc = Crc::new();
        crc.update(&data);
        if crc.sum() != entry.crc32 {
            return Err(ConvertError::CrcMismatch {
                name: entry.file_name.clone(),
                expected: entry.crc32,
                actual: crc.sum(),
            });
        }

        Ok(data)
    }
}

/// The single directory every member name starts with.
pub(crate) fn common_top_directory<'a>(names: impl IntoIterator<Item = &'a str>) -> Result<String> {
    let mut directory: Option<&str> = None;

    for name in names {
        let top = match name.split_once('/') {
            Some((top, _)) if !top.is_empty() => top,
            _ => {
                return Err(ConvertError::NoCommonDirectory {
                    first: directory.unwrap_or_default().to_string(),
                    other: name.to_string(),
                });
            }
        };

        match directory {
            None => directory = Some(top),
            Some(dir) if dir == top => {}
            Some(dir) => {
                return Err(ConvertError::NoCommonDirectory {
                    first: dir.to_string(),
                    other: name.to_string(),
                });
            }
        }
    }

    directory
        .map(str::to_string)
        .ok_or(ConvertError::EmptyArchive)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_shared_directory() {
        let dir = common_top_directory([
            "GeoLite2-ASN-CSV_20240102/",
            "GeoLite2-ASN-CSV_20240102/GeoLite2-ASN-Blocks-IPv4.csv",
            "GeoLite2-ASN-CSV_20240102/LICENSE.txt",
        ])
        .unwrap();
        assert_eq!(dir, "GeoLite2-ASN-CSV_20240102");
    }

    #[test]
    fn order_of_members_does_not_matter() {
        let dir = common_top_directory(["d/b.csv", "d/", "d/a.csv"]).unwrap();
        assert_eq!(dir, "d");
    }

    #[test]
    fn empty_archive_is_rejected() {
        let err = common_top_directory(std::iter::empty()).unwrap_err();
        assert!(matches!(err, ConvertError::EmptyArchive));
    }

    #[test]
    fn two_directories_are_rejected() {
        let err = common_top_directory(["a/x.csv", "b/y.csv"]).unwrap_err();
        match err {
            ConvertError::NoCommonDirectory { first, other } => {
                assert_eq!(first, "a");
                assert_eq!(other, "b/y.csv");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn top_level_file_is_rejected() {
        let err = common_top_directory(["a/x.csv", "README.txt"]).unwrap_err();
        assert!(matches!(err, ConvertError::NoCommonDirectory { .. }));
    }
}
