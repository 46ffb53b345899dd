//! JSON rendering of range entries.

use std::io::Write;

use serde::Serialize;

use crate::error::Result;

/// Write `entries` as one JSON array followed by a newline.
pub fn write_json<W, T>(mut writer: W, entries: &[T], pretty: bool) -> Result<()>
where
    W: Write,
    T: Serialize,
{
    if pretty {
        serde_json::to_writer_pretty(&mut writer, entries)?;
    } else {
        serde_json::to_writer(&mut writer, entries)?;
    }
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
