//! Captured-file writer: if a capture directory is configured, every
//! completed transfer's raw ASTM bytes are written to it.
//!
//! Ported from `original_source/cli.py`'s `write_message`/
//! `get_instrument_sender_name`.

use std::path::{Path, PathBuf};

use chrono::Local;

use crate::codec::{decode_message, RawField};

/// Extracts the sender name from the Header record's sender component
/// (field index 4), used to prefix the capture filename when present.
pub fn instrument_sender_name(header_message: &[u8]) -> Option<String> {
    let (_, records, _) = decode_message(header_message).ok()?;
    let record = records.first()?;
    match record.get(4)? {
        RawField::Text(s) => Some(s.clone()),
        RawField::Component(items) => items.first()?.clone(),
        _ => None,
    }
}

/// Writes `bytes` under `dir` as `<sender>-<timestamp>.txt` (or just
/// `<timestamp>.txt` if no sender name could be derived).
pub fn write_capture(dir: &Path, bytes: &[u8], header_message: Option<&[u8]>) -> std::io::Result<PathBuf> {
    let timestamp = Local::now().format("%Y-%m-%d_%H:%M:%S").to_string();
    let sender = header_message.and_then(instrument_sender_name);
    let filename = match sender {
        Some(name) if !name.is_empty() => format!("{name}-{timestamp}.txt"),
        _ => format!("{timestamp}.txt"),
    };
    let path = dir.join(filename);
    std::fs::write(&path, bytes)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn writes_a_capture_file_without_sender_name() {
        let dir = tempdir().unwrap();
        let path = write_capture(dir.path(), b"hello", None).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"hello");
    }

    #[test]
    fn missing_or_malformed_header_yields_no_sender_name() {
        assert_eq!(instrument_sender_name(b"not a message"), None);
    }
}
