//! Abbott ARCHITECT family immunoassay/chemistry analyzers.
//!
//! Ported from `original_source/instruments/abbott_architect.py`: the most
//! fully captured per-vendor schema in the retrieved source, so it carries
//! over nearly field-for-field.

use crate::constants::*;
use crate::fields::{FieldKind, Schema, SchemaField};
use crate::instruments::InstrumentEntry;

const VERSION: &str = "1.0.0";
const HEADER_RX: &str = ".*ARCHITECT\\^";

const ASSAY_STATUSES: &[&str] = &["P", "C"];
const REPORT_TYPES: &[&str] = &["F", "X"];
const RESULT_TYPES: &[&str] = &["F", "P", "I"];
const RESULT_STATUSES: &[&str] = &["F", "R"];
const COMMENT_TYPES: &[&str] = &["G", "I"];

const SENDER: &[SchemaField] = &[
    SchemaField::new("name", FieldKind::Text),
    SchemaField::new("version", FieldKind::Text),
    SchemaField::new("serial", FieldKind::Text),
    SchemaField::new("interface", FieldKind::Text),
];

const NAME: &[SchemaField] = &[
    SchemaField::new("last_name", FieldKind::Text),
    SchemaField::new("first_name", FieldKind::Text),
    SchemaField::new("middle_name", FieldKind::Text),
];

const SPECIMEN: &[SchemaField] = &[
    SchemaField::new("specimen", FieldKind::Text),
    SchemaField::new("carrier", FieldKind::Text),
    SchemaField::new("position", FieldKind::Text),
];

const ORDER_TEST: &[SchemaField] = &[
    SchemaField::new("_reserved1", FieldKind::NotUsed),
    SchemaField::new("_reserved2", FieldKind::NotUsed),
    SchemaField::new("_reserved3", FieldKind::NotUsed),
    SchemaField::new("num", FieldKind::Integer),
    SchemaField::new("name", FieldKind::Text),
    SchemaField::new("dilution", FieldKind::Text),
    SchemaField::new("status", FieldKind::Set(ASSAY_STATUSES)),
];

const RESULT_TEST: &[SchemaField] = &[
    SchemaField::new("_reserved1", FieldKind::NotUsed),
    SchemaField::new("_reserved2", FieldKind::NotUsed),
    SchemaField::new("_reserved3", FieldKind::NotUsed),
    SchemaField::new("num", FieldKind::Integer),
    SchemaField::new("name", FieldKind::Text),
    SchemaField::new("dilution", FieldKind::Text),
    SchemaField::new("status", FieldKind::Set(ASSAY_STATUSES)),
    SchemaField::new("reagent_lot", FieldKind::Text),
    SchemaField::new("reagent_serial", FieldKind::Text),
    SchemaField::new("control_lot", FieldKind::Text),
    SchemaField::new("result_type", FieldKind::Set(RESULT_TYPES)),
];

const ABNORMAL_FLAG: &[SchemaField] = &[SchemaField::new("flag", FieldKind::Text)];

const OPERATOR: &[SchemaField] = &[
    SchemaField::new("order_operator", FieldKind::Text),
    SchemaField::new("release_operator", FieldKind::Text),
];

const HEADER_SCHEMA: Schema = &[
    SchemaField::new("type", FieldKind::Constant(HEADER_RECORD)),
    SchemaField::new("delimiter", FieldKind::Text),
    SchemaField::new("message_control_id", FieldKind::Text),
    SchemaField::new("access_password", FieldKind::Text),
    SchemaField::new("sender", FieldKind::Component(SENDER)),
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

const PATIENT_SCHEMA: Schema = &[
    SchemaField::new("type", FieldKind::Constant(PATIENT_RECORD)),
    SchemaField::new("sequence", FieldKind::Integer),
    SchemaField::new("practice_id", FieldKind::Text),
    SchemaField::new("laboratory_id", FieldKind::Text),
    SchemaField::new("id", FieldKind::Text),
    SchemaField::new("name", FieldKind::Component(NAME)),
    SchemaField::new("birthdate", FieldKind::Date),
    SchemaField::new("sex", FieldKind::Set(&["M", "F", "U"])),
    SchemaField::new("physician_id", FieldKind::Text),
    SchemaField::new("location", FieldKind::Text),
];

const ORDER_SCHEMA: Schema = &[
    SchemaField::new("type", FieldKind::Constant(ORDER_RECORD)),
    SchemaField::new("sequence", FieldKind::Integer),
    SchemaField::new("sample_id", FieldKind::Text),
    SchemaField::new("instrument", FieldKind::Component(SPECIMEN)),
    SchemaField::new("test", FieldKind::Component(ORDER_TEST)),
    SchemaField::new("priority", FieldKind::Set(&["R", "S"])),
    SchemaField::new("sampled_at", FieldKind::DateTime),
    SchemaField::new("action_code", FieldKind::Text),
    SchemaField::new("report_type", FieldKind::Set(REPORT_TYPES)),
];

const RESULT_SCHEMA: Schema = &[
    SchemaField::new("type", FieldKind::Constant(RESULT_RECORD)),
    SchemaField::new("sequence", FieldKind::Integer),
    SchemaField::new("test", FieldKind::Component(RESULT_TEST)),
    SchemaField::new("value", FieldKind::Text),
    SchemaField::new("units", FieldKind::Text),
    SchemaField::new("references", FieldKind::Text),
    SchemaField::new("abnormal_flag", FieldKind::RepeatedComponent(ABNORMAL_FLAG)),
    SchemaField::new("status", FieldKind::Set(RESULT_STATUSES)),
    SchemaField::new("operator", FieldKind::Component(OPERATOR)),
    SchemaField::new("completed_at", FieldKind::DateTime),
    SchemaField::new("instrument", FieldKind::Text),
];

const COMMENT_SCHEMA: Schema = &[
    SchemaField::new("type", FieldKind::Constant(COMMENT_RECORD)),
    SchemaField::new("sequence", FieldKind::Integer),
    SchemaField::new("source", FieldKind::Constant("I")),
    SchemaField::new("data", FieldKind::Text),
    SchemaField::new("ctype", FieldKind::Set(COMMENT_TYPES)),
];

const REQUEST_INFO_SCHEMA: Schema = &[
    SchemaField::new("type", FieldKind::Constant(REQUEST_INFO_RECORD)),
    SchemaField::new("sequence", FieldKind::Integer),
];

const MANUFACTURER_SCHEMA: Schema = &[
    SchemaField::new("type", FieldKind::Constant(MANUFACTURER_RECORD)),
    SchemaField::new("sequence", FieldKind::Integer),
];

const TERMINATOR_SCHEMA: Schema = &[
    SchemaField::new("type", FieldKind::Constant(TERMINATOR_RECORD)),
    SchemaField::new("sequence", FieldKind::Integer),
    SchemaField::new("termination_code", FieldKind::Set(&["N", "T", "Q", "I", "P", "E", "F", "D"])),
];

const MAPPING: &[(&str, Schema)] = &[
    (HEADER_RECORD, HEADER_SCHEMA),
    (PATIENT_RECORD, PATIENT_SCHEMA),
    (ORDER_RECORD, ORDER_SCHEMA),
    (RESULT_RECORD, RESULT_SCHEMA),
    (COMMENT_RECORD, COMMENT_SCHEMA),
    (REQUEST_INFO_RECORD, REQUEST_INFO_SCHEMA),
    (MANUFACTURER_RECORD, MANUFACTURER_SCHEMA),
    (TERMINATOR_RECORD, TERMINATOR_SCHEMA),
];

pub fn entry() -> InstrumentEntry {
    InstrumentEntry {
        name: "abbott_architect",
        header_rx: HEADER_RX,
        version: VERSION,
        mapping: MAPPING,
    }
}
