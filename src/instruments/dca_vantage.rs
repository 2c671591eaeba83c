//! Siemens DCA Vantage point-of-care analyzer.
//!
//! Ported from `original_source/instruments/dca_vantage.py`. The header
//! pattern matches both `DCA VANTAGE` and `DCA Vantage` sender names, kept
//! exactly as declared in the source (case sensitivity of the registered
//! pattern is preserved even though it looks redundant).

use crate::constants::*;
use crate::fields::{FieldKind, Schema, SchemaField};
use crate::instruments::InstrumentEntry;

const VERSION: &str = "1.0.0";
const HEADER_RX: &str = ".*(DCA VANTAGE|DCA Vantage)\\^";

const ACTION_CODES: &[&str] = &["Q"];
const REPORT_TYPES: &[&str] = &["F", "C"];
const RESULT_ABNORMAL_FLAGS: &[&str] = &["<", ">", "H", "L"];
const RESULT_STATUSES: &[&str] = &["F", "C"];

const INSTRUMENT: &[SchemaField] = &[
    SchemaField::new("sample_seq_num", FieldKind::Text),
    SchemaField::new("reagent_lot_num", FieldKind::Text),
];

const ORDER_SCHEMA: Schema = &[
    SchemaField::new("type", FieldKind::Constant(ORDER_RECORD)),
    SchemaField::new("sequence", FieldKind::Integer),
    SchemaField::new("sample_id", FieldKind::Text),
    SchemaField::new("instrument", FieldKind::Component(INSTRUMENT)),
    SchemaField::new("test", FieldKind::Text),
    SchemaField::new("priority", FieldKind::Text),
    SchemaField::new("sampled_at", FieldKind::DateTime),
    SchemaField::new("action_code", FieldKind::Set(ACTION_CODES)),
    SchemaField::new("report_type", FieldKind::Set(REPORT_TYPES)),
];

const RESULT_SCHEMA: Schema = &[
    SchemaField::new("type", FieldKind::Constant(RESULT_RECORD)),
    SchemaField::new("sequence", FieldKind::Integer),
    SchemaField::new("test", FieldKind::Text),
    SchemaField::new("value", FieldKind::Text),
    SchemaField::new("units", FieldKind::Text),
    SchemaField::new("references", FieldKind::Text),
    SchemaField::new("abnormal_flag", FieldKind::Set(RESULT_ABNORMAL_FLAGS)),
    SchemaField::new("status", FieldKind::Set(RESULT_STATUSES)),
    SchemaField::new("operator", FieldKind::Text),
    SchemaField::new("started_at", FieldKind::DateTime),
];

const MAPPING: &[(&str, Schema)] = &[
    (HEADER_RECORD, crate::records::HEADER_SCHEMA),
    (PATIENT_RECORD, crate::records::PATIENT_SCHEMA),
    (ORDER_RECORD, ORDER_SCHEMA),
    (RESULT_RECORD, RESULT_SCHEMA),
    (COMMENT_RECORD, crate::records::COMMENT_SCHEMA),
    (TERMINATOR_RECORD, crate::records::TERMINATOR_SCHEMA),
];

pub fn entry() -> InstrumentEntry {
    InstrumentEntry {
        name: "dca_vantage",
        header_rx: HEADER_RX,
        version: VERSION,
        mapping: MAPPING,
    }
}
