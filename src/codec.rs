//! Wire-to-record codec and link-frame primitives.
//!
//! Ported field-for-field from `codec.py`'s `decode`/`decode_message`/
//! `decode_frame`/`decode_record`/`decode_component`/`decode_repeated_component`
//! and the matching encode-direction functions.

use crate::constants::*;
use crate::error::{AstmError, Result};

/// A single decoded field. Mirrors the shapes `decode_record` can produce:
/// a scalar, a component list, a repeated-component list, or `null`.
#[derive(Debug, Clone, PartialEq)]
pub enum RawField {
    Null,
    Text(String),
    Component(Vec<Option<String>>),
    Repeated(Vec<Vec<Option<String>>>),
}

impl RawField {
    pub fn text(s: impl Into<String>) -> Self {
        let s = s.into();
        if s.is_empty() {
            RawField::Null
        } else {
            RawField::Text(s)
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            RawField::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

pub type RawRecord = Vec<RawField>;

/// Decodes bytes to text using the crate's declared encoding (Latin-1: a
/// byte-for-byte mapping onto the first 256 Unicode code points, so it never
/// fails regardless of non-ASCII content).
pub fn decode_text(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Encodes text back to bytes using the same Latin-1 mapping. Code points
/// above 0xFF are not representable in a single byte and are truncated.
pub fn encode_text(s: &str) -> Vec<u8> {
    s.chars().map(|c| c as u32 as u8).collect()
}

/// Strips a full wire frame's `STX seq` prefix and its checksum+CRLF tail,
/// leaving the record content plus its terminator (`CR ETX` or `ETB`).
/// Used both to build the LIS2-A consumer blob and by the instrument
/// wrapper's `to_lis2a`.
pub fn strip_frame(frame: &[u8]) -> &[u8] {
    if frame.len() < 6 || frame[0] != STX {
        return &[];
    }
    let end = frame.len().saturating_sub(4).max(2);
    &frame[2..end]
}

/// Sum of payload byte values, low 8 bits, as two uppercase ASCII hex digits.
pub fn checksum(payload: &[u8]) -> String {
    let sum: u32 = payload.iter().map(|&b| b as u32).sum();
    format!("{:02X}", sum & 0xFF)
}

/// A received frame is a non-terminal chunk iff its length is >= 5 and the
/// byte at `len - 5` is ETB.
pub fn is_chunked_message(frame: &[u8]) -> bool {
    frame.len() >= 5 && frame[frame.len() - 5] == ETB
}

/// Joins an ordered list of wire frames (chunks followed by a terminal frame)
/// into a single reassembled message frame, re-seq'd to `1` with a fresh
/// checksum. Mirrors `utils.join`: strip each frame's `STX seq` prefix and
/// its trailing 5 bytes (marker + cs_hi + cs_lo + CR + LF), concatenate.
pub fn join_chunks(frames: &[Vec<u8>]) -> Result<Vec<u8>> {
    if frames.is_empty() {
        return Err(AstmError::Framing("no chunks to join".into()));
    }
    let mut body = Vec::new();
    for frame in frames {
        if frame.len() < 7 {
            return Err(AstmError::Framing("chunk frame too short to join".into()));
        }
        body.extend_from_slice(&frame[2..frame.len() - 5]);
    }
    let mut payload = Vec::with_capacity(body.len() + 2);
    payload.push(b'1');
    payload.extend_from_slice(&body);
    payload.push(ETX);
    let cs = checksum(&payload);
    let mut out = Vec::with_capacity(payload.len() + 5);
    out.push(STX);
    out.extend_from_slice(&payload);
    out.extend_from_slice(cs.as_bytes());
    out.push(CR);
    out.push(LF);
    Ok(out)
}

fn split_on(bytes: &[u8], sep: u8) -> Vec<&[u8]> {
    bytes.split(|&b| b == sep).collect()
}

/// `decode_component(bytes)`: split on `^`, empties become `null`.
pub fn decode_component(bytes: &[u8]) -> Vec<Option<String>> {
    split_on(bytes, COMPONENT_SEP)
        .into_iter()
        .map(|piece| {
            if piece.is_empty() {
                None
            } else {
                Some(decode_text(piece))
            }
        })
        .collect()
}

/// `decode_repeated_component(bytes)`: split on `\`, decode each via
/// `decode_component`.
pub fn decode_repeated_component(bytes: &[u8]) -> Vec<Vec<Option<String>>> {
    split_on(bytes, REPEAT_SEP)
        .into_iter()
        .map(decode_component)
        .collect()
}

/// `decode_record(bytes)`: split on `|`; per field, dispatch on presence of
/// `\` (repeated component), `^` (component), else plain text; empty -> null.
pub fn decode_record(bytes: &[u8]) -> RawRecord {
    split_on(bytes, FIELD_SEP)
        .into_iter()
        .map(|field| {
            if field.contains(&REPEAT_SEP) {
                RawField::Repeated(decode_repeated_component(field))
            } else if field.contains(&COMPONENT_SEP) {
                RawField::Component(decode_component(field))
            } else if field.is_empty() {
                RawField::Null
            } else {
                RawField::Text(decode_text(field))
            }
        })
        .collect()
}

/// `decode_frame(bytes)`: strip trailing `CR ETX` or `ETB`, read the leading
/// seq digit, split the remainder on `CR` into records.
pub fn decode_frame(bytes: &[u8]) -> Result<(u8, Vec<RawRecord>)> {
    if bytes.is_empty() {
        return Err(AstmError::Framing("empty frame body".into()));
    }
    let trimmed = if bytes.ends_with(&[CR, ETX]) {
        &bytes[..bytes.len() - 2]
    } else if bytes.ends_with(&[ETB]) {
        &bytes[..bytes.len() - 1]
    } else {
        return Err(AstmError::Framing(
            "frame missing trailing CR ETX or ETB".into(),
        ));
    };
    if trimmed.is_empty() || !trimmed[0].is_ascii_digit() {
        return Err(AstmError::Framing("frame missing leading seq digit".into()));
    }
    let seq = trimmed[0] - b'0';
    let records = split_on(&trimmed[1..], RECORD_SEP)
        .into_iter()
        .map(decode_record)
        .collect();
    Ok((seq, records))
}

/// `decode_message(bytes)`: full wire frame `STX ... CR LF` with a checksum.
/// Verifies the checksum (case-insensitive) before delegating to
/// `decode_frame`. Returns `(seq, records, checksum)`.
pub fn decode_message(bytes: &[u8]) -> Result<(u8, Vec<RawRecord>, String)> {
    if bytes.first() != Some(&STX) {
        return Err(AstmError::Framing("message missing leading STX".into()));
    }
    if bytes.len() < 2 || &bytes[bytes.len() - 2..] != [CR, LF] {
        return Err(AstmError::Framing("message missing trailing CR LF".into()));
    }
    let body = &bytes[1..bytes.len() - 2];
    if body.len() < 2 {
        return Err(AstmError::Framing("message missing checksum".into()));
    }
    let (payload, cs_bytes) = body.split_at(body.len() - 2);
    let cs_actual = decode_text(cs_bytes).to_uppercase();
    let cs_expected = checksum(payload);
    if cs_actual != cs_expected {
        return Err(AstmError::Checksum {
            expected: cs_expected,
            actual: cs_actual,
        });
    }
    let (seq, records) = decode_frame(payload)?;
    Ok((seq, records, cs_actual))
}

/// `decode(bytes)`: dispatch entry point. `STX` -> full framed message;
/// ASCII digit -> a bare frame (seq + records, no checksum present);
/// otherwise a single bare record.
pub fn decode(bytes: &[u8]) -> Result<Vec<RawRecord>> {
    match bytes.first() {
        Some(&STX) => {
            let (_, records, _) = decode_message(bytes)?;
            Ok(records)
        }
        Some(b) if b.is_ascii_digit() => {
            let (_, records) = decode_frame(bytes)?;
            Ok(records)
        }
        _ => Ok(vec![decode_record(bytes)]),
    }
}

/// `encode_component`: join elements with `^`, right-stripping trailing
/// empty components.
pub fn encode_component(items: &[Option<String>]) -> Vec<u8> {
    let mut parts: Vec<&str> = items.iter().map(|o| o.as_deref().unwrap_or("")).collect();
    while parts.last() == Some(&"") {
        parts.pop();
    }
    let joined = parts.join("^");
    encode_text(&joined)
}

/// `encode_repeated_component`: join each component's encoding with `\`.
pub fn encode_repeated_component(comps: &[Vec<Option<String>>]) -> Vec<u8> {
    let parts: Vec<String> = comps
        .iter()
        .map(|c| decode_text(&encode_component(c)))
        .collect();
    encode_text(&parts.join("\\"))
}

/// `encode_record`: converts each field back to bytes, joined with `|`.
pub fn encode_record(fields: &[RawField]) -> Vec<u8> {
    let parts: Vec<Vec<u8>> = fields
        .iter()
        .map(|f| match f {
            RawField::Null => Vec::new(),
            RawField::Text(s) => encode_text(s),
            RawField::Component(items) => encode_component(items),
            RawField::Repeated(comps) => encode_repeated_component(comps),
        })
        .collect();
    parts.join(&FIELD_SEP)
}

fn encode_frame_body(seq: u8, records: &[RawRecord]) -> Vec<u8> {
    let lines: Vec<Vec<u8>> = records.iter().map(|r| encode_record(r)).collect();
    let mut body = Vec::new();
    body.push(b'0' + (seq % 8));
    body.extend_from_slice(&lines.join(&RECORD_SEP));
    body
}

/// Wraps a body (seq digit + joined records, no terminator) into one wire
/// frame, marking it terminal (`CR ETX`) or an intermediate chunk (`ETB`).
fn frame_bytes(body: &[u8], is_last: bool) -> Vec<u8> {
    let mut payload = body.to_vec();
    if is_last {
        payload.push(CR);
        payload.push(ETX);
    } else {
        payload.push(ETB);
    }
    let cs = checksum(&payload);
    let mut out = Vec::with_capacity(payload.len() + 5);
    out.push(STX);
    out.extend_from_slice(&payload);
    out.extend_from_slice(cs.as_bytes());
    out.push(CR);
    out.push(LF);
    out
}

/// `encode_message(seq, records)`: a single, non-chunked wire frame.
pub fn encode_message(seq: u8, records: &[RawRecord]) -> Vec<u8> {
    let body = encode_frame_body(seq, records);
    frame_bytes(&body, true)
}

/// `encode(records, seq, max_size)`: the top-level encode entry point. When
/// `max_size` is `None`, produces one frame. Otherwise splits the encoded
/// body into chunk frames of at most `max_size` bytes each, numbering `seq`
/// `mod 8` across chunks and marking only the last as terminal.
pub fn encode(records: &[RawRecord], seq: u8, max_size: Option<usize>) -> Result<Vec<Vec<u8>>> {
    let full_body = encode_frame_body(seq, records);
    // full_body already carries its own leading seq digit; split operates on
    // the content following it.
    let (seq_digit, content) = (full_body[0], &full_body[1..]);
    match max_size {
        None => Ok(vec![frame_bytes(&full_body, true)]),
        Some(max) => {
            if max < 7 {
                return Err(AstmError::Framing(
                    "split size must be at least 7 bytes".into(),
                ));
            }
            let max_body = max - 7;
            if content.is_empty() {
                return Ok(vec![frame_bytes(&full_body, true)]);
            }
            if max_body == 0 {
                return Err(AstmError::Framing(
                    "split size too small to make progress".into(),
                ));
            }
            let mut chunks = Vec::new();
            let mut cur_seq = seq_digit - b'0';
            let pieces: Vec<&[u8]> = content.chunks(max_body).collect();
            for (i, piece) in pieces.iter().enumerate() {
                let is_last = i == pieces.len() - 1;
                let mut body = Vec::with_capacity(piece.len() + 1);
                body.push(b'0' + (cur_seq % 8));
                body.extend_from_slice(piece);
                chunks.push(frame_bytes(&body, is_last));
                cur_seq = (cur_seq + 1) % 8;
            }
            Ok(chunks)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_record_missing_trailing_fields_are_null() {
        let rec = decode_record(b"A|||B");
        assert_eq!(
            rec,
            vec![
                RawField::Text("A".into()),
                RawField::Null,
                RawField::Null,
                RawField::Text("B".into()),
            ]
        );
    }

    #[test]
    fn decode_record_nested_repeated_component() {
        let rec = decode_record(b"A|B^C\\D^E|F");
        assert_eq!(
            rec,
            vec![
                RawField::Text("A".into()),
                RawField::Repeated(vec![
                    vec![Some("B".into()), Some("C".into())],
                    vec![Some("D".into()), Some("E".into())],
                ]),
                RawField::Text("F".into()),
            ]
        );
    }

    #[test]
    fn encode_repeated_component_matches_example() {
        let comps = vec![
            vec![Some("foo".to_string()), Some("1".to_string())],
            vec![Some("bar".to_string()), Some("2".to_string())],
            vec![Some("baz".to_string()), Some("3".to_string())],
        ];
        assert_eq!(encode_repeated_component(&comps), b"foo^1\\bar^2\\baz^3");
    }

    #[test]
    fn is_chunked_message_detects_etb_tail() {
        let chunk = frame_bytes(b"1foo", false);
        let terminal = frame_bytes(b"1foo", true);
        assert!(is_chunked_message(&chunk));
        assert!(!is_chunked_message(&terminal));
    }

    #[test]
    fn single_empty_record_frame() {
        let msg = encode_message(1, &[vec![RawField::Null]]);
        let (_, records, _) = decode_message(&msg).unwrap();
        assert_eq!(records, vec![vec![RawField::Null]]);
    }

    #[test]
    fn round_trip_encode_decode_message() {
        let records = vec![vec![
            RawField::Text("H".into()),
            RawField::Component(vec![Some("A".into()), Some("B".into())]),
        ]];
        let msg = encode_message(1, &records);
        let (seq, decoded, _) = decode_message(&msg).unwrap();
        assert_eq!(seq, 1);
        assert_eq!(decoded, records);
    }

    #[test]
    fn bad_checksum_is_rejected() {
        let mut msg = encode_message(1, &[vec![RawField::Text("A".into())]]);
        let len = msg.len();
        msg[len - 4] = b'0';
        msg[len - 3] = b'0';
        assert!(matches!(
            decode_message(&msg),
            Err(AstmError::Checksum { .. })
        ));
    }

    #[test]
    fn join_reassembles_chunks() {
        // Each chunk's own leading seq digit is discarded by `join`; only
        // the body content after it survives into the reassembled message.
        let c1 = frame_bytes(b"1AAA", false);
        let c2 = frame_bytes(b"2BBB", false);
        let c3 = frame_bytes(b"3CCC", true);
        let joined = join_chunks(&[c1, c2, c3]).unwrap();
        let (seq, records, _) = decode_message(&joined).unwrap();
        assert_eq!(seq, 1);
        assert_eq!(records, vec![vec![RawField::Text("AAABBBCCC".into())]]);
    }

    #[test]
    fn split_rejects_size_below_minimum() {
        let records = vec![vec![RawField::Text("A".into())]];
        assert!(encode(&records, 1, Some(6)).is_err());
    }
}
