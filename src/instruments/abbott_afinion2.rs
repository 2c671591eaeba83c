//! Abbott Afinion 2 point-of-care analyzer.
//!
//! Ported from `original_source/instruments/abbott_afinion2.py`: a small
//! point-of-care device with its own sender/test component layouts and a
//! fixed `action_code`/`status`/`ctype`.

use crate::constants::*;
use crate::fields::{FieldKind, Schema, SchemaField};
use crate::instruments::InstrumentEntry;

const VERSION: &str = "1.0.0";
const HEADER_RX: &str = ".*Afinion 2 Analyzer\\^";

const PROCESSING_IDS: &[&str] = &["P", "Q"];
const SPECIMEN_SOURCES: &[&str] = &["O", "C", "V"];
const ABNORMAL_FLAGS: &[&str] = &["<", ">", "L", "H", "LL", "HH", "!"];

const SENDER: &[SchemaField] = &[
    SchemaField::new("name", FieldKind::Text),
    SchemaField::new("_reserved", FieldKind::NotUsed),
    SchemaField::new("serial", FieldKind::Text),
];

const ORDER_TEST: &[SchemaField] = &[
    SchemaField::new("_reserved1", FieldKind::NotUsed),
    SchemaField::new("_reserved2", FieldKind::NotUsed),
    SchemaField::new("_reserved3", FieldKind::NotUsed),
    SchemaField::new("name", FieldKind::Text),
];

const BIOMATERIAL: &[SchemaField] = &[
    SchemaField::new("_reserved", FieldKind::NotUsed),
    SchemaField::new("source", FieldKind::Set(SPECIMEN_SOURCES)),
];

const RESULT_TEST: &[SchemaField] = &[
    SchemaField::new("_reserved1", FieldKind::NotUsed),
    SchemaField::new("_reserved2", FieldKind::NotUsed),
    SchemaField::new("_reserved3", FieldKind::NotUsed),
    SchemaField::new("name", FieldKind::Text),
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
    SchemaField::new("processing_id", FieldKind::Set(PROCESSING_IDS)),
    SchemaField::new("version", FieldKind::Text),
    SchemaField::new("timestamp", FieldKind::DateTime),
];

const ORDER_SCHEMA: Schema = &[
    SchemaField::new("type", FieldKind::Constant(ORDER_RECORD)),
    SchemaField::new("sequence", FieldKind::Integer),
    SchemaField::new("sample_id", FieldKind::Text),
    SchemaField::new("instrument", FieldKind::Integer),
    SchemaField::new("test", FieldKind::Component(ORDER_TEST)),
    SchemaField::new("priority", FieldKind::Set(&["R", "S"])),
    SchemaField::new("sampled_at", FieldKind::DateTime),
    SchemaField::new("action_code", FieldKind::Constant("N")),
    SchemaField::new("report_type", FieldKind::Set(&["O", "P", "F", "X", "Q", "C"])),
    SchemaField::new("biomaterial", FieldKind::Component(BIOMATERIAL)),
];

const RESULT_SCHEMA: Schema = &[
    SchemaField::new("type", FieldKind::Constant(RESULT_RECORD)),
    SchemaField::new("sequence", FieldKind::Integer),
    SchemaField::new("test", FieldKind::Component(RESULT_TEST)),
    SchemaField::new("value", FieldKind::Text),
    SchemaField::new("units", FieldKind::Text),
    SchemaField::new("references", FieldKind::Text),
    SchemaField::new("abnormal_flag", FieldKind::Set(ABNORMAL_FLAGS)),
    SchemaField::new("status", FieldKind::Constant("F")),
    SchemaField::new("operator", FieldKind::Text),
    SchemaField::new("completed_at", FieldKind::DateTime),
    SchemaField::new("instrument", FieldKind::Text),
];

const MAPPING: &[(&str, Schema)] = &[
    (HEADER_RECORD, HEADER_SCHEMA),
    (PATIENT_RECORD, crate::records::PATIENT_SCHEMA),
    (ORDER_RECORD, ORDER_SCHEMA),
    (RESULT_RECORD, RESULT_SCHEMA),
    (COMMENT_RECORD, crate::records::COMMENT_SCHEMA),
    (REQUEST_INFO_RECORD, crate::records::REQUEST_INFO_SCHEMA),
    (MANUFACTURER_RECORD, crate::records::MANUFACTURER_SCHEMA),
    (TERMINATOR_RECORD, crate::records::TERMINATOR_SCHEMA),
];

pub fn entry() -> InstrumentEntry {
    InstrumentEntry {
        name: "abbott_afinion2",
        header_rx: HEADER_RX,
        version: VERSION,
        mapping: MAPPING,
    }
}
