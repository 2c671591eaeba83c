//! Roche Cobas c311 chemistry analyzer.
//!
//! Ported from `original_source/instruments/roche_cobas_c311.py`. Several
//! fields documented as scalar in the ASTM standard are transmitted as
//! components by this instrument (`sample_id`, `test`); kept that way
//! rather than "corrected" to match the documentation, per the source's
//! own notes.

use crate::constants::*;
use crate::fields::{FieldKind, Schema, SchemaField};
use crate::instruments::InstrumentEntry;

const VERSION: &str = "1.0.0";
const HEADER_RX: &str = ".*c311\\^";

const MSG_MEANINGS: &[&str] = &["TSREQ", "TSDWN", "RSUPL", "PCUPL", "ICUPL", "ABUPL", "RSREQ"];
const MSG_MODES: &[&str] = &["REAL", "BATCH", "REPLY"];
const PRIORITIES: &[&str] = &["R", "S"];
const SAMPLE_TYPES: &[&str] = &["S1", "S2", "S3", "S4", "S5", "S0", "QC"];
const CONTAINER_TYPES: &[&str] = &["SC", "MC"];
const ACTION_CODES: &[&str] = &["N", "Q", "A", "C"];
const ABNORMAL_FLAGS: &[&str] = &["L", "H", "LL", "HH", "N", "A"];
const STATUS: &[&str] = &["F", "C"];

const SENDER: &[SchemaField] = &[
    SchemaField::new("name", FieldKind::Text),
    SchemaField::new("version", FieldKind::Text),
];

const COMMENTS: &[SchemaField] = &[
    SchemaField::new("meaning_of_message", FieldKind::Set(MSG_MEANINGS)),
    SchemaField::new("mode_of_message", FieldKind::Set(MSG_MODES)),
];

const SPECIAL_1: &[SchemaField] = &[
    SchemaField::new("age", FieldKind::Text),
    SchemaField::new("unit", FieldKind::Text),
];

const NAME: &[SchemaField] = &[
    SchemaField::new("last_name", FieldKind::Text),
    SchemaField::new("first_name", FieldKind::Text),
    SchemaField::new("middle_name", FieldKind::Text),
];

const ORDER_SAMPLE_ID: &[SchemaField] = &[
    SchemaField::new("sample_total_counter", FieldKind::Text),
    SchemaField::new("sample_id", FieldKind::Text),
    SchemaField::new("sample_count", FieldKind::Text),
    SchemaField::new("_reserved", FieldKind::Text),
    SchemaField::new("sample_daily_counter", FieldKind::Text),
];

const ORDER_INSTRUMENT: &[SchemaField] = &[
    SchemaField::new("sequence_number", FieldKind::Text),
    SchemaField::new("rack_id", FieldKind::Text),
    SchemaField::new("position_number", FieldKind::Text),
    SchemaField::new("sample_type", FieldKind::Set(SAMPLE_TYPES)),
    SchemaField::new("container_type", FieldKind::Set(CONTAINER_TYPES)),
];

const ORDER_TEST: &[SchemaField] = &[
    SchemaField::new("_reserved1", FieldKind::Text),
    SchemaField::new("_reserved2", FieldKind::Text),
    SchemaField::new("_reserved3", FieldKind::Text),
    SchemaField::new("application_code", FieldKind::Text),
    SchemaField::new("dilution", FieldKind::Text),
];

const RESULT_TEST: &[SchemaField] = &[
    SchemaField::new("_reserved1", FieldKind::Text),
    SchemaField::new("_reserved2", FieldKind::Text),
    SchemaField::new("_reserved3", FieldKind::Text),
    SchemaField::new("application_code", FieldKind::Text),
    SchemaField::new("dilution", FieldKind::Text),
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
    SchemaField::new("comments", FieldKind::Component(COMMENTS)),
    SchemaField::new("processing_id", FieldKind::Constant("P")),
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
    SchemaField::new("birthdate", FieldKind::DateTime),
    SchemaField::new("sex", FieldKind::Text),
    SchemaField::new("physician_id", FieldKind::Text),
    SchemaField::new("location", FieldKind::Text),
    SchemaField::new("special_1", FieldKind::Component(SPECIAL_1)),
];

const ORDER_SCHEMA: Schema = &[
    SchemaField::new("type", FieldKind::Constant(ORDER_RECORD)),
    SchemaField::new("sequence", FieldKind::Integer),
    SchemaField::new("sample_id", FieldKind::Component(ORDER_SAMPLE_ID)),
    SchemaField::new("instrument", FieldKind::Component(ORDER_INSTRUMENT)),
    SchemaField::new("test", FieldKind::RepeatedComponent(ORDER_TEST)),
    SchemaField::new("priority", FieldKind::Set(PRIORITIES)),
    SchemaField::new("sampled_at", FieldKind::DateTime),
    SchemaField::new("reported_at", FieldKind::DateTime),
    SchemaField::new("action_code", FieldKind::Set(ACTION_CODES)),
    SchemaField::new("biomaterial", FieldKind::Text),
    SchemaField::new("report_type", FieldKind::Text),
];

const RESULT_SCHEMA: Schema = &[
    SchemaField::new("type", FieldKind::Constant(RESULT_RECORD)),
    SchemaField::new("sequence", FieldKind::Integer),
    SchemaField::new("test", FieldKind::Component(RESULT_TEST)),
    SchemaField::new("value", FieldKind::Text),
    SchemaField::new("units", FieldKind::Text),
    SchemaField::new("references", FieldKind::Text),
    SchemaField::new("abnormal_flag", FieldKind::Set(ABNORMAL_FLAGS)),
    SchemaField::new("status", FieldKind::Set(STATUS)),
    SchemaField::new("operator", FieldKind::Text),
    SchemaField::new("started_at", FieldKind::DateTime),
    SchemaField::new("instrument", FieldKind::Text),
];

const MAPPING: &[(&str, Schema)] = &[
    (HEADER_RECORD, HEADER_SCHEMA),
    (PATIENT_RECORD, PATIENT_SCHEMA),
    (ORDER_RECORD, ORDER_SCHEMA),
    (RESULT_RECORD, RESULT_SCHEMA),
    (COMMENT_RECORD, crate::records::COMMENT_SCHEMA),
    (REQUEST_INFO_RECORD, crate::records::REQUEST_INFO_SCHEMA),
    (MANUFACTURER_RECORD, crate::records::MANUFACTURER_SCHEMA),
    (TERMINATOR_RECORD, crate::records::TERMINATOR_SCHEMA),
];

pub fn entry() -> InstrumentEntry {
    InstrumentEntry {
        name: "roche_cobas_c311",
        header_rx: HEADER_RX,
        version: VERSION,
        mapping: MAPPING,
    }
}
