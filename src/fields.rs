//! Typed field model, ported from `fields.py`'s
//! `Field`/`ConstantField`/`TextField`/`IntegerField`/`DecimalField`/
//! `DateField`/`TimeField`/`DateTimeField`/`ComponentField`/
//! `RepeatedComponentField`/`SetField`/`ReadonlyField`/`NotUsedField`.
//!
//! Rather than one struct per field kind with descriptor-style `__get__`/
//! `__set__` magic, a schema is a data-driven `&'static [SchemaField]`
//! interpreted by a single generic `decode_field`/`encode_field` pair
//! below.

use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde_json::{Map, Value};

use crate::codec::RawField;
use crate::error::{AstmError, Result};

#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    Constant(&'static str),
    Text,
    Integer,
    Decimal,
    Date,
    Time,
    DateTime,
    Set(&'static [&'static str]),
    Component(Schema),
    RepeatedComponent(Schema),
    ReadOnly,
    NotUsed,
}

#[derive(Debug, Clone, Copy)]
pub struct SchemaField {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub length: Option<usize>,
}

impl SchemaField {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        SchemaField {
            name,
            kind,
            required: false,
            length: None,
        }
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub const fn max_length(mut self, len: usize) -> Self {
        self.length = Some(len);
        self
    }
}

/// An ordered list of named, typed fields for one record type (or one
/// nested component).
pub type Schema = &'static [SchemaField];

fn text_of(raw: &RawField) -> Option<&str> {
    match raw {
        RawField::Text(s) => Some(s.as_str()),
        _ => None,
    }
}

fn component_of(field: &SchemaField, raw: &RawField) -> Result<Vec<Option<String>>> {
    match raw {
        RawField::Component(items) => Ok(items.clone()),
        RawField::Null => Ok(Vec::new()),
        other => Err(AstmError::Schema(format!(
            "field {}: expected a component, got {:?}",
            field.name, other
        ))),
    }
}

fn repeated_of(field: &SchemaField, raw: &RawField) -> Result<Vec<Vec<Option<String>>>> {
    match raw {
        RawField::Repeated(items) => Ok(items.clone()),
        RawField::Component(items) => Ok(vec![items.clone()]),
        RawField::Null => Ok(Vec::new()),
        other => Err(AstmError::Schema(format!(
            "field {}: expected a repeated component, got {:?}",
            field.name, other
        ))),
    }
}

fn decode_component_schema(schema: Schema, items: &[Option<String>]) -> Result<Value> {
    let mut obj = serde_json::Map::new();
    for (i, sub) in schema.iter().enumerate() {
        let sub_raw = match items.get(i) {
            Some(Some(s)) => RawField::text(s.clone()),
            _ => RawField::Null,
        };
        obj.insert(sub.name.to_string(), decode_field(&sub_raw, sub)?);
    }
    Ok(Value::Object(obj))
}

/// Normalizes a raw decoded field to its declared logical type.
pub fn decode_field(raw: &RawField, field: &SchemaField) -> Result<Value> {
    if matches!(raw, RawField::Null) && field.required && !matches!(field.kind, FieldKind::NotUsed)
    {
        return Err(AstmError::Schema(format!(
            "required field {} is missing",
            field.name
        )));
    }
    match field.kind {
        FieldKind::Constant(v) => Ok(Value::String(v.to_string())),
        FieldKind::NotUsed => Ok(Value::Null),
        FieldKind::ReadOnly => match text_of(raw) {
            Some(s) => Ok(Value::String(s.to_string())),
            None => Ok(Value::Null),
        },
        FieldKind::Text => match raw {
            RawField::Null => Ok(Value::Null),
            RawField::Text(s) => Ok(Value::String(s.clone())),
            other => Err(AstmError::Schema(format!(
                "field {}: expected text, got {:?}",
                field.name, other
            ))),
        },
        FieldKind::Integer => match raw {
            RawField::Null => Ok(Value::Null),
            RawField::Text(s) => s
                .parse::<i64>()
                .map(Value::from)
                .map_err(|_| AstmError::Schema(format!("field {}: not an integer", field.name))),
            other => Err(AstmError::Schema(format!(
                "field {}: expected integer text, got {:?}",
                field.name, other
            ))),
        },
        FieldKind::Decimal => match raw {
            RawField::Null => Ok(Value::Null),
            RawField::Text(s) => Decimal::from_str(s)
                .map(|d| Value::String(d.to_string()))
                .map_err(|_| AstmError::Schema(format!("field {}: not a decimal", field.name))),
            other => Err(AstmError::Schema(format!(
                "field {}: expected decimal text, got {:?}",
                field.name, other
            ))),
        },
        FieldKind::Date => match raw {
            RawField::Null => Ok(Value::Null),
            RawField::Text(s) => NaiveDate::parse_from_str(s, "%Y%m%d")
                .map(|d| Value::String(d.and_hms_opt(0, 0, 0).unwrap().format("%Y-%m-%dT%H:%M:%S").to_string()))
                .map_err(|_| AstmError::Schema(format!("field {}: not a date (%Y%m%d)", field.name))),
            other => Err(AstmError::Schema(format!(
                "field {}: expected date text, got {:?}",
                field.name, other
            ))),
        },
        FieldKind::Time => match raw {
            RawField::Null => Ok(Value::Null),
            RawField::Text(s) => NaiveTime::parse_from_str(s, "%H%M%S")
                .map(|t| Value::String(t.format("%H:%M:%S").to_string()))
                .map_err(|_| AstmError::Schema(format!("field {}: not a time (%H%M%S)", field.name))),
            other => Err(AstmError::Schema(format!(
                "field {}: expected time text, got {:?}",
                field.name, other
            ))),
        },
        FieldKind::DateTime => match raw {
            RawField::Null => Ok(Value::Null),
            RawField::Text(s) => NaiveDateTime::parse_from_str(s, "%Y%m%d%H%M%S")
                .map(|dt| Value::String(dt.format("%Y-%m-%dT%H:%M:%S").to_string()))
                .map_err(|_| {
                    AstmError::Schema(format!(
                        "field {}: not a datetime (%Y%m%d%H%M%S)",
                        field.name
                    ))
                }),
            other => Err(AstmError::Schema(format!(
                "field {}: expected datetime text, got {:?}",
                field.name, other
            ))),
        },
        FieldKind::Set(values) => match raw {
            RawField::Null => Ok(Value::Null),
            RawField::Text(s) => {
                if values.contains(&s.as_str()) {
                    Ok(Value::String(s.clone()))
                } else {
                    Err(AstmError::Schema(format!(
                        "field {}: value {:?} not in allowed set {:?}",
                        field.name, s, values
                    )))
                }
            }
            other => Err(AstmError::Schema(format!(
                "field {}: expected set-valued text, got {:?}",
                field.name, other
            ))),
        },
        FieldKind::Component(schema) => {
            let items = component_of(field, raw)?;
            decode_component_schema(schema, &items)
        }
        FieldKind::RepeatedComponent(schema) => {
            let reps = repeated_of(field, raw)?;
            let values: Result<Vec<Value>> = reps
                .iter()
                .map(|items| decode_component_schema(schema, items))
                .collect();
            Ok(Value::Array(values?))
        }
    }
}

/// Decodes a full record (a raw field list) against a schema into a JSON
/// object keyed by declared field name, skipping fields beyond the schema's
/// length and filling missing trailing fields with `null`.
pub fn decode_record_fields(raw: &[RawField], schema: Schema) -> Result<Value> {
    let mut obj = serde_json::Map::new();
    for (i, field) in schema.iter().enumerate() {
        let raw_field = raw.get(i).cloned().unwrap_or(RawField::Null);
        obj.insert(field.name.to_string(), decode_field(&raw_field, field)?);
    }
    Ok(Value::Object(obj))
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y%m%d")
        .ok()
        .or_else(|| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
}

fn parse_time(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H%M%S")
        .ok()
        .or_else(|| NaiveTime::parse_from_str(s, "%H:%M:%S").ok())
}

fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y%m%d%H%M%S")
        .ok()
        .or_else(|| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").ok())
        .or_else(|| parse_date(s).map(|d| d.and_hms_opt(0, 0, 0).unwrap()))
}

/// Extracts the flat string representation of an already-encoded scalar
/// field, for use as one slot of a component's `Vec<Option<String>>`.
fn flatten_scalar(field: &SchemaField, raw: &RawField) -> Result<Option<String>> {
    match raw {
        RawField::Null => Ok(None),
        RawField::Text(s) => Ok(Some(s.clone())),
        other => Err(AstmError::Schema(format!(
            "field {}: nested component field did not flatten to text, got {:?}",
            field.name, other
        ))),
    }
}

fn encode_component_schema(schema: Schema, obj: &Map<String, Value>) -> Result<Vec<Option<String>>> {
    schema
        .iter()
        .map(|sub| {
            let sub_value = obj.get(sub.name).cloned().unwrap_or(Value::Null);
            let raw = encode_field(&sub_value, sub)?;
            flatten_scalar(sub, &raw)
        })
        .collect()
}

/// Builds a raw field from a schema-typed JSON value, for programmatic
/// record construction (e.g. the header/terminator records the server
/// emits) and as the write-side counterpart of `decode_field`. `not-used`
/// and `read-only` fields silently drop whatever is supplied.
pub fn encode_field(value: &Value, field: &SchemaField) -> Result<RawField> {
    if matches!(value, Value::Null)
        && field.required
        && !matches!(field.kind, FieldKind::NotUsed | FieldKind::ReadOnly)
    {
        return Err(AstmError::Schema(format!(
            "field {}: required but no value supplied",
            field.name
        )));
    }

    let checked_length = |s: &str| -> Result<()> {
        if let Some(max) = field.length {
            if s.len() > max {
                return Err(AstmError::Schema(format!(
                    "field {}: value exceeds max length {}",
                    field.name, max
                )));
            }
        }
        Ok(())
    };

    match field.kind {
        FieldKind::NotUsed | FieldKind::ReadOnly => Ok(RawField::Null),
        FieldKind::Constant(v) => match value {
            Value::Null => Ok(RawField::text(v)),
            Value::String(s) if s == v => Ok(RawField::text(v)),
            other => Err(AstmError::Schema(format!(
                "field {}: constant field rejects value {:?}, expected {:?}",
                field.name, other, v
            ))),
        },
        FieldKind::Text => match value {
            Value::Null => Ok(RawField::Null),
            Value::String(s) => {
                checked_length(s)?;
                Ok(RawField::text(s.clone()))
            }
            other => Err(AstmError::Schema(format!(
                "field {}: expected a string, got {:?}",
                field.name, other
            ))),
        },
        FieldKind::Integer => match value {
            Value::Null => Ok(RawField::Null),
            Value::Number(n) if n.is_i64() || n.is_u64() => {
                let s = n.to_string();
                checked_length(&s)?;
                Ok(RawField::text(s))
            }
            Value::String(s) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => {
                checked_length(s)?;
                Ok(RawField::text(s.clone()))
            }
            other => Err(AstmError::Schema(format!(
                "field {}: expected an int or digit string, got {:?}",
                field.name, other
            ))),
        },
        FieldKind::Decimal => {
            let decimal = match value {
                Value::Null => return Ok(RawField::Null),
                Value::Number(n) => Decimal::from_str(&n.to_string()),
                Value::String(s) => Decimal::from_str(s),
                other => {
                    return Err(AstmError::Schema(format!(
                        "field {}: expected int, float, or decimal, got {:?}",
                        field.name, other
                    )))
                }
            }
            .map_err(|_| AstmError::Schema(format!("field {}: not a decimal", field.name)))?;
            let s = decimal.to_string();
            checked_length(&s)?;
            Ok(RawField::text(s))
        }
        FieldKind::Date => match value {
            Value::Null => Ok(RawField::Null),
            Value::String(s) => {
                let date = parse_date(s).ok_or_else(|| {
                    AstmError::Schema(format!("field {}: not a recognized date", field.name))
                })?;
                Ok(RawField::text(date.format("%Y%m%d").to_string()))
            }
            other => Err(AstmError::Schema(format!(
                "field {}: expected a date string, got {:?}",
                field.name, other
            ))),
        },
        FieldKind::Time => match value {
            Value::Null => Ok(RawField::Null),
            Value::String(s) => {
                let time = parse_time(s).ok_or_else(|| {
                    AstmError::Schema(format!("field {}: not a recognized time", field.name))
                })?;
                Ok(RawField::text(time.format("%H%M%S").to_string()))
            }
            other => Err(AstmError::Schema(format!(
                "field {}: expected a time string, got {:?}",
                field.name, other
            ))),
        },
        FieldKind::DateTime => match value {
            Value::Null => Ok(RawField::Null),
            Value::String(s) => {
                let dt = parse_datetime(s).ok_or_else(|| {
                    AstmError::Schema(format!("field {}: not a recognized datetime", field.name))
                })?;
                Ok(RawField::text(dt.format("%Y%m%d%H%M%S").to_string()))
            }
            other => Err(AstmError::Schema(format!(
                "field {}: expected a datetime string, got {:?}",
                field.name, other
            ))),
        },
        FieldKind::Set(values) => match value {
            Value::Null => Ok(RawField::Null),
            Value::String(s) if values.contains(&s.as_str()) => Ok(RawField::text(s.clone())),
            other => Err(AstmError::Schema(format!(
                "field {}: value {:?} not in allowed set {:?}",
                field.name, other, values
            ))),
        },
        FieldKind::Component(schema) => match value {
            Value::Null => Ok(RawField::Null),
            Value::Object(obj) => Ok(RawField::Component(encode_component_schema(schema, obj)?)),
            other => Err(AstmError::Schema(format!(
                "field {}: expected a component object, got {:?}",
                field.name, other
            ))),
        },
        FieldKind::RepeatedComponent(schema) => match value {
            Value::Null => Ok(RawField::Null),
            Value::Array(items) => {
                let comps: Result<Vec<Vec<Option<String>>>> = items
                    .iter()
                    .map(|item| match item {
                        Value::Object(obj) => encode_component_schema(schema, obj),
                        other => Err(AstmError::Schema(format!(
                            "field {}: repeated component element must be an object, got {:?}",
                            field.name, other
                        ))),
                    })
                    .collect();
                Ok(RawField::Repeated(comps?))
            }
            other => Err(AstmError::Schema(format!(
                "field {}: expected an array of component objects, got {:?}",
                field.name, other
            ))),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SENDER: &[SchemaField] = &[
        SchemaField::new("name", FieldKind::Text),
        SchemaField::new("version", FieldKind::Text),
    ];

    #[test]
    fn decodes_text_field() {
        let field = SchemaField::new("id", FieldKind::Text);
        let v = decode_field(&RawField::Text("abc".into()), &field).unwrap();
        assert_eq!(v, Value::String("abc".into()));
    }

    #[test]
    fn required_missing_is_schema_error() {
        let field = SchemaField::new("id", FieldKind::Text).required();
        assert!(decode_field(&RawField::Null, &field).is_err());
    }

    #[test]
    fn set_field_rejects_unknown_value() {
        let field = SchemaField::new("sex", FieldKind::Set(&["M", "F", "U"]));
        assert!(decode_field(&RawField::Text("X".into()), &field).is_err());
        let ok = decode_field(&RawField::Text("M".into()), &field).unwrap();
        assert_eq!(ok, Value::String("M".into()));
    }

    #[test]
    fn component_field_decodes_nested_object() {
        let field = SchemaField::new("sender", FieldKind::Component(SENDER));
        let raw = RawField::Component(vec![Some("ARCHITECT".into()), Some("1.00".into())]);
        let v = decode_field(&raw, &field).unwrap();
        assert_eq!(v["name"], Value::String("ARCHITECT".into()));
        assert_eq!(v["version"], Value::String("1.00".into()));
    }

    #[test]
    fn not_used_field_always_null_and_silently_dropped() {
        let field = SchemaField::new("reserved", FieldKind::NotUsed);
        let decoded = decode_field(&RawField::Text("whatever".into()), &field).unwrap();
        assert_eq!(decoded, Value::Null);
        let encoded = encode_field(&json!("whatever"), &field).unwrap();
        assert_eq!(encoded, RawField::Null);
    }

    #[test]
    fn encode_field_enforces_length() {
        let field = SchemaField::new("id", FieldKind::Text).max_length(3);
        assert!(encode_field(&json!("abcd"), &field).is_err());
        assert!(encode_field(&json!("abc"), &field).is_ok());
    }

    #[test]
    fn encode_integer_rejects_non_digit_string() {
        let field = SchemaField::new("num", FieldKind::Integer);
        assert!(encode_field(&json!("12a"), &field).is_err());
        assert!(encode_field(&json!("-5"), &field).is_err());
        assert_eq!(
            encode_field(&json!(42), &field).unwrap(),
            RawField::text("42")
        );
        assert_eq!(
            encode_field(&json!("42"), &field).unwrap(),
            RawField::text("42")
        );
    }

    #[test]
    fn encode_decimal_accepts_int_float_and_decimal_string() {
        let field = SchemaField::new("value", FieldKind::Decimal);
        assert_eq!(
            encode_field(&json!(3), &field).unwrap(),
            RawField::text("3")
        );
        assert_eq!(
            encode_field(&json!("1.20"), &field).unwrap(),
            RawField::text("1.20")
        );
        assert!(encode_field(&json!("not-a-number"), &field).is_err());
    }

    #[test]
    fn encode_date_accepts_wire_format_and_iso_string() {
        let field = SchemaField::new("birthdate", FieldKind::Date);
        assert_eq!(
            encode_field(&json!("19320122"), &field).unwrap(),
            RawField::text("19320122")
        );
        assert_eq!(
            encode_field(&json!("1932-01-22T00:00:00"), &field).unwrap(),
            RawField::text("19320122")
        );
        assert!(encode_field(&json!("not-a-date"), &field).is_err());
    }

    #[test]
    fn encode_set_field_rejects_values_outside_allowed_set() {
        let field = SchemaField::new("sex", FieldKind::Set(&["M", "F", "U"]));
        assert!(encode_field(&json!("X"), &field).is_err());
        assert_eq!(
            encode_field(&json!("M"), &field).unwrap(),
            RawField::text("M")
        );
    }

    #[test]
    fn encode_component_field_round_trips_decoded_object() {
        let field = SchemaField::new("sender", FieldKind::Component(SENDER));
        let raw = RawField::Component(vec![Some("ARCHITECT".into()), Some("1.00".into())]);
        let decoded = decode_field(&raw, &field).unwrap();
        let encoded = encode_field(&decoded, &field).unwrap();
        assert_eq!(encoded, raw);
    }
}
