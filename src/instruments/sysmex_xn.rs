//! Sysmex XN-series haematology analyzers (XN-110/150/330/350/430/450/530/550).
//!
//! Ported from `original_source/instruments/sysmex_xn.py`; the numeric
//! alternation in `HEADER_RX` is kept exactly as declared so any model in
//! the series matches the same registry entry.

use crate::constants::*;
use crate::fields::{FieldKind, Schema, SchemaField};
use crate::instruments::InstrumentEntry;

const VERSION: &str = "1.0.0";
const HEADER_RX: &str = ".*XN-(550|530|450|430|350|330|150|110)\\^";

const PATIENT_SEXES: &[&str] = &["M", "F", "U"];
const SAMPLE_ID_ATTRIBUTES: &[&str] = &["M", "A", "B", "C"];
const ACTION_CODES: &[&str] = &["N", "A", "Q"];
const REPORT_TYPES: &[&str] = &["F", "I", "X", "Y", "Q"];
const RESULT_DILUTION_RATIOS: &[&str] = &["1", "5"];
const RESULT_ABNORMAL_FLAGS: &[&str] = &["L", "H", ">", "N", "A", "W", "LL", "HH"];
const RESULT_STATUSES: &[&str] = &["F", "I", "P", "N"];
const STATUS_CODES: &[&str] = &["F", "N", "C"];

const SENDER: &[SchemaField] = &[
    SchemaField::new("name", FieldKind::Text),
    SchemaField::new("version", FieldKind::Text),
    SchemaField::new("analyser_serial_no", FieldKind::Text),
    SchemaField::new("_reserved1", FieldKind::NotUsed),
    SchemaField::new("_reserved2", FieldKind::NotUsed),
    SchemaField::new("_reserved3", FieldKind::NotUsed),
    SchemaField::new("ps_code", FieldKind::Text),
];

const NAME: &[SchemaField] = &[
    SchemaField::new("_reserved", FieldKind::NotUsed),
    SchemaField::new("first_name", FieldKind::Text),
    SchemaField::new("last_name", FieldKind::Text),
];

const PHYSICIAN: &[SchemaField] = &[
    SchemaField::new("_reserved", FieldKind::NotUsed),
    SchemaField::new("physician_name", FieldKind::Text),
];

const LOCATION: &[SchemaField] = &[
    SchemaField::new("_reserved1", FieldKind::NotUsed),
    SchemaField::new("_reserved2", FieldKind::NotUsed),
    SchemaField::new("_reserved3", FieldKind::NotUsed),
    SchemaField::new("ward", FieldKind::Text),
];

const ORDER_INSTRUMENT: &[SchemaField] = &[
    SchemaField::new("sampler_adaptor_number", FieldKind::Text),
    SchemaField::new("sampler_adaptor_position", FieldKind::Text),
    SchemaField::new("sample_id", FieldKind::Text),
    SchemaField::new("sample_id_attr", FieldKind::Set(SAMPLE_ID_ATTRIBUTES)),
];

const ORDER_TEST: &[SchemaField] = &[
    SchemaField::new("_reserved1", FieldKind::NotUsed),
    SchemaField::new("_reserved2", FieldKind::NotUsed),
    SchemaField::new("_reserved3", FieldKind::NotUsed),
    SchemaField::new("_reserved4", FieldKind::NotUsed),
    SchemaField::new("parameter", FieldKind::Text),
];

const RESULT_TEST: &[SchemaField] = &[
    SchemaField::new("_reserved1", FieldKind::NotUsed),
    SchemaField::new("_reserved2", FieldKind::NotUsed),
    SchemaField::new("_reserved3", FieldKind::NotUsed),
    SchemaField::new("_reserved4", FieldKind::NotUsed),
    SchemaField::new("parameter", FieldKind::Text),
    SchemaField::new("dilution_ratio", FieldKind::Set(RESULT_DILUTION_RATIOS)),
    SchemaField::new("result_type", FieldKind::Text),
    SchemaField::new("extended_order_result", FieldKind::Text),
];

const REQUEST_STARTING_RANGE: &[SchemaField] = &[
    SchemaField::new("sampler_adaptor_number", FieldKind::Text),
    SchemaField::new("sampler_adaptor_position", FieldKind::Text),
    SchemaField::new("sample_id", FieldKind::Text),
    SchemaField::new("sample_id_attr", FieldKind::Set(SAMPLE_ID_ATTRIBUTES)),
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
    SchemaField::new("processing_id", FieldKind::NotUsed),
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
    SchemaField::new("sex", FieldKind::Set(PATIENT_SEXES)),
    SchemaField::new("physician_id", FieldKind::Component(PHYSICIAN)),
    SchemaField::new("location", FieldKind::Component(LOCATION)),
];

const ORDER_SCHEMA: Schema = &[
    SchemaField::new("type", FieldKind::Constant(ORDER_RECORD)),
    SchemaField::new("sequence", FieldKind::Integer),
    SchemaField::new("sample_id", FieldKind::Text),
    SchemaField::new("instrument", FieldKind::Component(ORDER_INSTRUMENT)),
    SchemaField::new("test", FieldKind::RepeatedComponent(ORDER_TEST)),
    SchemaField::new("priority", FieldKind::Set(&["R", "S"])),
    SchemaField::new("sampled_at", FieldKind::DateTime),
    SchemaField::new("action_code", FieldKind::Set(ACTION_CODES)),
    SchemaField::new("report_type", FieldKind::Set(REPORT_TYPES)),
];

const RESULT_SCHEMA: Schema = &[
    SchemaField::new("type", FieldKind::Constant(RESULT_RECORD)),
    SchemaField::new("sequence", FieldKind::Integer),
    SchemaField::new("test", FieldKind::Component(RESULT_TEST)),
    SchemaField::new("value", FieldKind::Text),
    SchemaField::new("units", FieldKind::Text),
    SchemaField::new("references", FieldKind::Text),
    SchemaField::new("abnormal_flag", FieldKind::Set(RESULT_ABNORMAL_FLAGS)),
    SchemaField::new("status", FieldKind::Set(RESULT_STATUSES)),
    SchemaField::new("operator", FieldKind::Text),
    SchemaField::new("completed_at", FieldKind::DateTime),
    SchemaField::new("instrument", FieldKind::Text),
];

const REQUEST_INFO_SCHEMA: Schema = &[
    SchemaField::new("type", FieldKind::Constant(REQUEST_INFO_RECORD)),
    SchemaField::new("sequence", FieldKind::Integer),
    SchemaField::new("starting_range", FieldKind::Component(REQUEST_STARTING_RANGE)),
    SchemaField::new("beginning_results", FieldKind::DateTime),
    SchemaField::new("status_code", FieldKind::Set(STATUS_CODES)),
];

const MAPPING: &[(&str, Schema)] = &[
    (HEADER_RECORD, HEADER_SCHEMA),
    (PATIENT_RECORD, PATIENT_SCHEMA),
    (ORDER_RECORD, ORDER_SCHEMA),
    (RESULT_RECORD, RESULT_SCHEMA),
    (COMMENT_RECORD, crate::records::COMMENT_SCHEMA),
    (REQUEST_INFO_RECORD, REQUEST_INFO_SCHEMA),
    (MANUFACTURER_RECORD, crate::records::MANUFACTURER_SCHEMA),
    (TERMINATOR_RECORD, crate::records::TERMINATOR_SCHEMA),
];

pub fn entry() -> InstrumentEntry {
    InstrumentEntry {
        name: "sysmex_xn",
        header_rx: HEADER_RX,
        version: VERSION,
        mapping: MAPPING,
    }
}
