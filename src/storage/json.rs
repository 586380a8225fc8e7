use crate::error::{AppError, Result};
use std::fs;
use std::path::Path;

const MAX_DUMP_FILE_BYTES: u64 = 16 * 1_048_576; // 16 MiB

/// Read a dump file written by [`write_dump`] (or by hand).
pub fn read_dump(path: &Path) -> Result<Vec<(String, String)>> {
    let meta = fs::metadata(path)?;
    if meta.len() > MAX_DUMP_FILE_BYTES {
        return Err(AppError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!(
                "Refusing to read {}: dump file too large ({} bytes, max {})",
                path.display(),
                meta.len(),
                MAX_DUMP_FILE_BYTES
            ),
        )));
    }
    parse_dump(&fs::read_to_string(path)?)
}

pub(crate) fn parse_dump(content: &str) -> Result<Vec<(String, String)>> {
    Ok(serde_json::from_str(content)?)
}

/// Write `pairs` as a pretty-printed JSON array.
pub fn write_dump(path: &Path, pairs: &[(String, String)]) -> Result<()> {
    let mut json = serde_json::to_string_pretty(pairs)?;
    json.push('\n');
    fs::write(path, json)?;
    Ok(())
}
