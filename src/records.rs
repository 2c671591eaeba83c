//! The default generic ASTM record schemas (Header, Patient, Order, Result,
//! Comment, Request-info, Manufacturer, Terminator) -- the registry's
//! fallback mapping when no instrument-specific `HEADER_RX` matches, and the
//! base layout vendor schemas in `instruments/` build on.
//!
//! Ported from `original_source/records.py`'s `HeaderRecord` (the only base
//! record fully captured there) generalized to the remaining ASTM E1394
//! record types using the field layouts visible in
//! `original_source/instruments/abbott_architect.py`.

use crate::constants::*;
use crate::fields::{FieldKind, Schema, SchemaField};

const NAME_COMPONENTS: &[SchemaField] = &[
    SchemaField::new("last_name", FieldKind::Text),
    SchemaField::new("first_name", FieldKind::Text),
    SchemaField::new("middle_name", FieldKind::Text),
];

const SPECIMEN_COMPONENTS: &[SchemaField] = &[
    SchemaField::new("specimen", FieldKind::Text),
    SchemaField::new("carrier", FieldKind::Text),
    SchemaField::new("position", FieldKind::Text),
];

const TEST_COMPONENTS: &[SchemaField] = &[
    SchemaField::new("num", FieldKind::Text),
    SchemaField::new("name", FieldKind::Text),
    SchemaField::new("dilution", FieldKind::Text),
    SchemaField::new("status", FieldKind::Text),
];

const ABNORMAL_FLAG_COMPONENTS: &[SchemaField] =
    &[SchemaField::new("flag", FieldKind::Text)];

const OPERATOR_COMPONENTS: &[SchemaField] = &[
    SchemaField::new("order_operator", FieldKind::Text),
    SchemaField::new("release_operator", FieldKind::Text),
];

pub const HEADER_SCHEMA: Schema = &[
    SchemaField::new("type", FieldKind::Constant(HEADER_RECORD)),
    SchemaField::new("delimiter", FieldKind::Text),
    SchemaField::new("message_control_id", FieldKind::Text),
    SchemaField::new("access_password", FieldKind::Text),
    SchemaField::new("sender_name", FieldKind::Text),
    SchemaField::new("sender_address", FieldKind::Text),
    SchemaField::new("reserved", FieldKind::NotUsed),
    SchemaField::new("sender_phone", FieldKind::Text),
    SchemaField::new("sender_characteristics", FieldKind::Text),
    SchemaField::new("receiver_id", FieldKind::Text),
    SchemaField::new("comments", FieldKind::Text),
    SchemaField::new("processing_id", FieldKind::Set(&["P", "Q", "T"])),
    SchemaField::new("version", FieldKind::Text),
    SchemaField::new("timestamp", FieldKind::DateTime),
];

pub const PATIENT_SCHEMA: Schema = &[
    SchemaField::new("type", FieldKind::Constant(PATIENT_RECORD)),
    SchemaField::new("sequence", FieldKind::Integer),
    SchemaField::new("practice_id", FieldKind::Text),
    SchemaField::new("laboratory_id", FieldKind::Text),
    SchemaField::new("id", FieldKind::Text),
    SchemaField::new("name", FieldKind::Component(NAME_COMPONENTS)),
    SchemaField::new("birthdate", FieldKind::Date),
    SchemaField::new("sex", FieldKind::Set(&["M", "F", "U"])),
    SchemaField::new("physician_id", FieldKind::Text),
    SchemaField::new("location", FieldKind::Text),
];

pub const ORDER_SCHEMA: Schema = &[
    SchemaField::new("type", FieldKind::Constant(ORDER_RECORD)),
    SchemaField::new("sequence", FieldKind::Integer),
    SchemaField::new("sample_id", FieldKind::Text),
    SchemaField::new("instrument", FieldKind::Component(SPECIMEN_COMPONENTS)),
    SchemaField::new("test", FieldKind::Component(TEST_COMPONENTS)),
    SchemaField::new("priority", FieldKind::Set(&["R", "S"])),
    SchemaField::new("sampled_at", FieldKind::DateTime),
    SchemaField::new("action_code", FieldKind::Text),
    SchemaField::new(
        "report_type",
        FieldKind::Set(&["O", "P", "F", "X", "Q", "C"]),
    ),
];

pub const RESULT_SCHEMA: Schema = &[
    SchemaField::new("type", FieldKind::Constant(RESULT_RECORD)),
    SchemaField::new("sequence", FieldKind::Integer),
    SchemaField::new("test", FieldKind::Component(TEST_COMPONENTS)),
    SchemaField::new("value", FieldKind::Text),
    SchemaField::new("units", FieldKind::Text),
    SchemaField::new("references", FieldKind::Text),
    SchemaField::new(
        "abnormal_flag",
        FieldKind::RepeatedComponent(ABNORMAL_FLAG_COMPONENTS),
    ),
    SchemaField::new("status", FieldKind::Set(&["F", "P", "C", "X"])),
    SchemaField::new("operator", FieldKind::Component(OPERATOR_COMPONENTS)),
    SchemaField::new("completed_at", FieldKind::DateTime),
    SchemaField::new("instrument", FieldKind::Text),
];

pub const COMMENT_SCHEMA: Schema = &[
    SchemaField::new("type", FieldKind::Constant(COMMENT_RECORD)),
    SchemaField::new("sequence", FieldKind::Integer),
    SchemaField::new("source", FieldKind::Constant("I")),
    SchemaField::new("data", FieldKind::Text),
    SchemaField::new("ctype", FieldKind::Set(&["G", "P"])),
];

pub const REQUEST_INFO_SCHEMA: Schema = &[
    SchemaField::new("type", FieldKind::Constant(REQUEST_INFO_RECORD)),
    SchemaField::new("sequence", FieldKind::Integer),
];

pub const MANUFACTURER_SCHEMA: Schema = &[
    SchemaField::new("type", FieldKind::Constant(MANUFACTURER_RECORD)),
    SchemaField::new("sequence", FieldKind::Integer),
];

pub const TERMINATOR_SCHEMA: Schema = &[
    SchemaField::new("type", FieldKind::Constant(TERMINATOR_RECORD)),
    SchemaField::new("sequence", FieldKind::Integer),
    SchemaField::new(
        "termination_code",
        FieldKind::Set(&["N", "T", "Q", "I", "P", "E", "F", "D"]),
    ),
];

/// `(record_type, schema)` pairs making up the default generic ASTM mapping.
pub const DEFAULT_MAPPING: &[(&str, Schema)] = &[
    (HEADER_RECORD, HEADER_SCHEMA),
    (PATIENT_RECORD, PATIENT_SCHEMA),
    (ORDER_RECORD, ORDER_SCHEMA),
    (RESULT_RECORD, RESULT_SCHEMA),
    (COMMENT_RECORD, COMMENT_SCHEMA),
    (REQUEST_INFO_RECORD, REQUEST_INFO_SCHEMA),
    (MANUFACTURER_RECORD, MANUFACTURER_SCHEMA),
    (TERMINATOR_RECORD, TERMINATOR_SCHEMA),
];

pub fn schema_for(record_type: &str, mapping: &[(&str, Schema)]) -> Option<Schema> {
    mapping
        .iter()
        .find(|(t, _)| *t == record_type)
        .map(|(_, s)| *s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_mapping_covers_every_base_record_type() {
        for ty in [
            HEADER_RECORD,
            PATIENT_RECORD,
            ORDER_RECORD,
            RESULT_RECORD,
            COMMENT_RECORD,
            REQUEST_INFO_RECORD,
            MANUFACTURER_RECORD,
            TERMINATOR_RECORD,
        ] {
            assert!(schema_for(ty, DEFAULT_MAPPING).is_some());
        }
    }
}
