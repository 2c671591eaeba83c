//! Instrument wrapper.
//!
//! Ported from `wrapper.py`'s `Wrapper`: given the raw messages from one
//! transfer, selects an instrument schema by matching the header line, then
//! exposes `to_lis2a`/`to_astm`/`to_dict`.

use serde_json::{Map, Value};

use crate::codec::{self, decode_text, strip_frame};
use crate::constants::{CR, ETX, STX};
use crate::error::Result;
use crate::fields::decode_record_fields;
use crate::instruments::InstrumentRegistry;
use crate::records::schema_for;

pub struct Wrapper<'a> {
    messages: Vec<Vec<u8>>,
    registry: &'a InstrumentRegistry,
}

impl<'a> Wrapper<'a> {
    pub fn new(messages: Vec<Vec<u8>>, registry: &'a InstrumentRegistry) -> Self {
        Wrapper { messages, registry }
    }

    fn header_text(&self) -> String {
        self.messages
            .first()
            .map(|m| decode_text(m))
            .unwrap_or_default()
    }

    fn instrument_name(&self) -> Option<&'static str> {
        self.registry.find(&self.header_text()).map(|e| e.name)
    }

    /// Strips each message's `STX seq` prefix and checksum+CRLF tail,
    /// concatenating the remaining bodies (terminator byte(s) included).
    pub fn to_lis2a(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for message in &self.messages {
            out.extend_from_slice(strip_frame(message));
        }
        out
    }

    /// Raw frames as received, joined by newlines for human inspection.
    pub fn to_astm(&self) -> Vec<u8> {
        self.messages.join(&b'\n')
    }

    pub fn to_dict(&self) -> Result<Value> {
        let mapping = self.registry.mapping_for(&self.header_text());
        let mut by_type: Map<String, Value> = Map::new();
        for message in &self.messages {
            let records = codec::decode(message)?;
            for record in records {
                let record_type = match record.first().and_then(|f| f.as_text()) {
                    Some(t) => t.to_string(),
                    None => continue,
                };
                let schema = match schema_for(&record_type, mapping) {
                    Some(s) => s,
                    None => continue,
                };
                let decoded = match decode_record_fields(&record, schema) {
                    Ok(v) => v,
                    Err(_) => continue,
                };
                by_type
                    .entry(record_type)
                    .or_insert_with(|| Value::Array(Vec::new()))
                    .as_array_mut()
                    .expect("entries are always arrays")
                    .push(decoded);
            }
        }

        let mut metadata = Map::new();
        metadata.insert(
            "astm".to_string(),
            Value::String(decode_text(&self.to_astm())),
        );
        metadata.insert(
            "lis2a".to_string(),
            Value::String(decode_text(&self.to_lis2a())),
        );
        if let Some(entry) = self.registry.find(&self.header_text()) {
            for (k, v) in entry.metadata() {
                metadata.insert(k, v);
            }
        }

        let mut out = Map::new();
        out.insert("metadata".to_string(), Value::Object(metadata));
        for (k, v) in by_type {
            out.insert(k, v);
        }
        Ok(Value::Object(out))
    }

    pub fn instrument(&self) -> Option<&'static str> {
        self.instrument_name()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{checksum, RawField};

    fn build_frame(seq: u8, body: &str) -> Vec<u8> {
        let mut payload = vec![b'0' + seq];
        payload.extend_from_slice(body.as_bytes());
        payload.push(CR);
        payload.push(ETX);
        let cs = checksum(&payload);
        let mut out = vec![STX];
        out.extend_from_slice(&payload);
        out.extend_from_slice(cs.as_bytes());
        out.push(CR);
        out.push(b'\n');
        out
    }

    #[test]
    fn to_lis2a_strips_seq_and_checksum() {
        let frame = build_frame(2, "A|B|C|D");
        let registry = InstrumentRegistry::with_builtins();
        let wrapper = Wrapper::new(vec![frame], &registry);
        let stripped = wrapper.to_lis2a();
        assert_eq!(stripped, [b"A|B|C|D", &[CR, ETX][..]].concat());
    }

    #[test]
    fn to_dict_groups_records_by_type() {
        let body = codec::encode_record(&[
            RawField::text("H"),
            RawField::text("\\^&"),
        ]);
        let frame = build_frame(1, &decode_text(&body));
        let registry = InstrumentRegistry::with_builtins();
        let wrapper = Wrapper::new(vec![frame], &registry);
        let dict = wrapper.to_dict().unwrap();
        assert!(dict.get("H").is_some());
        assert!(dict["metadata"]["lis2a"].is_string());
    }
}
