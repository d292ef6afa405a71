//! Conversions between Sea-ORM values, JSON and raw request strings.
//!
//! All three directions are driven by the column type reported by
//! `ColumnTrait::def()`, which is the only model metadata the serializer relies on.

use sea_orm::sea_query::ColumnType;
use sea_orm::{ColumnTrait, Value};
use serde_json::Value as Json;
use uuid::Uuid;

/// Convert a column value to JSON.
///
/// Booleans and numbers keep their JSON type, SQL NULL becomes `null`, JSON columns
/// pass through and everything else is rendered as a string.
#[must_use]
pub fn convert(value: Value) -> Json {
    match value {
        Value::Bool(Some(b)) => Json::Bool(b),
        Value::TinyInt(Some(n)) => Json::from(n),
        Value::SmallInt(Some(n)) => Json::from(n),
        Value::Int(Some(n)) => Json::from(n),
        Value::BigInt(Some(n)) => Json::from(n),
        Value::TinyUnsigned(Some(n)) => Json::from(n),
        Value::SmallUnsigned(Some(n)) => Json::from(n),
        Value::Unsigned(Some(n)) => Json::from(n),
        Value::BigUnsigned(Some(n)) => Json::from(n),
        Value::Float(Some(n)) => float(f64::from(n)),
        Value::Double(Some(n)) => float(n),
        Value::String(Some(s)) => Json::String(s.to_string()),
        Value::Char(Some(c)) => Json::String(c.to_string()),
        Value::Bytes(Some(bytes)) => Json::String(String::from_utf8_lossy(&bytes).into_owned()),
        Value::Json(Some(json)) => Json::clone(&json),
        Value::Uuid(Some(uuid)) => Json::String(uuid.to_string()),
        Value::Decimal(Some(decimal)) => Json::String(decimal.to_string()),
        Value::ChronoDate(Some(date)) => Json::String(date.to_string()),
        Value::ChronoTime(Some(time)) => Json::String(time.to_string()),
        Value::ChronoDateTime(Some(datetime)) => Json::String(datetime.to_string()),
        Value::ChronoDateTimeUtc(Some(datetime)) => Json::String(datetime.to_rfc3339()),
        Value::ChronoDateTimeLocal(Some(datetime)) => Json::String(datetime.to_rfc3339()),
        Value::ChronoDateTimeWithTimeZone(Some(datetime)) => {
            Json::String(datetime.to_rfc3339())
        }
        Value::Bool(None)
        | Value::TinyInt(None)
        | Value::SmallInt(None)
        | Value::Int(None)
        | Value::BigInt(None)
        | Value::TinyUnsigned(None)
        | Value::SmallUnsigned(None)
        | Value::Unsigned(None)
        | Value::BigUnsigned(None)
        | Value::Float(None)
        | Value::Double(None)
        | Value::String(None)
        | Value::Char(None)
        | Value::Bytes(None)
        | Value::Json(None)
        | Value::Uuid(None)
        | Value::Decimal(None)
        | Value::ChronoDate(None)
        | Value::ChronoTime(None)
        | Value::ChronoDateTime(None)
        | Value::ChronoDateTimeUtc(None)
        | Value::ChronoDateTimeLocal(None)
        | Value::ChronoDateTimeWithTimeZone(None) => Json::Null,
        #[allow(unreachable_patterns)]
        other => {
            tracing::debug!(value = ?other, "no JSON conversion for column value");
            Json::Null
        }
    }
}

fn float(n: f64) -> Json {
    serde_json::Number::from_f64(n).map_or(Json::Null, Json::Number)
}

/// Broad family of a column type, used when coercing request input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Integer,
    Float,
    Boolean,
    Uuid,
    Json,
    Text,
}

impl ValueKind {
    #[must_use]
    pub fn of(column_type: &ColumnType) -> Self {
        match column_type {
            ColumnType::TinyInteger
            | ColumnType::SmallInteger
            | ColumnType::Integer
            | ColumnType::BigInteger
            | ColumnType::TinyUnsigned
            | ColumnType::SmallUnsigned
            | ColumnType::Unsigned
            | ColumnType::BigUnsigned => Self::Integer,
            ColumnType::Float | ColumnType::Double => Self::Float,
            ColumnType::Boolean => Self::Boolean,
            ColumnType::Uuid => Self::Uuid,
            ColumnType::Json | ColumnType::JsonBinary => Self::Json,
            _ => Self::Text,
        }
    }

    /// Kind of a model column.
    pub fn of_column<C: ColumnTrait>(column: &C) -> Self {
        Self::of(column.def().get_column_type())
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Some(true),
        "false" | "0" | "off" | "no" => Some(false),
        _ => None,
    }
}

/// Parse a raw query-string value into a typed value for comparisons.
///
/// # Errors
///
/// Returns a message when the string does not fit the column type.
pub fn typed_value(kind: ValueKind, raw: &str) -> Result<Value, String> {
    let raw = raw.trim();
    match kind {
        ValueKind::Integer => raw
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| format!("'{raw}' is not an integer")),
        ValueKind::Float => raw
            .parse::<f64>()
            .map(Value::from)
            .map_err(|_| format!("'{raw}' is not a number")),
        ValueKind::Boolean => parse_bool(raw)
            .map(Value::from)
            .ok_or_else(|| format!("'{raw}' is not a boolean")),
        ValueKind::Uuid => Uuid::parse_str(raw)
            .map(Value::from)
            .map_err(|_| format!("'{raw}' is not a uuid")),
        ValueKind::Json | ValueKind::Text => Ok(Value::from(raw.to_string())),
    }
}

/// Coerce a submitted JSON value so it deserializes into the column's Rust type.
///
/// Form submissions carry every field as a string; numbers and booleans are parsed
/// here. An empty string on a nullable column means `null`.
///
/// # Errors
///
/// Returns a message when the value does not fit the column type.
pub fn coerce_json(kind: ValueKind, nullable: bool, value: Json) -> Result<Json, String> {
    let Json::String(raw) = value else {
        return Ok(value);
    };
    if raw.is_empty() && nullable && kind != ValueKind::Text {
        return Ok(Json::Null);
    }
    match kind {
        ValueKind::Integer => raw
            .trim()
            .parse::<i64>()
            .map(Json::from)
            .map_err(|_| format!("'{raw}' is not an integer")),
        ValueKind::Float => raw
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Json::Number)
            .ok_or_else(|| format!("'{raw}' is not a number")),
        ValueKind::Boolean => parse_bool(&raw)
            .map(Json::Bool)
            .ok_or_else(|| format!("'{raw}' is not a boolean")),
        ValueKind::Json => Ok(serde_json::from_str(&raw).unwrap_or(Json::String(raw))),
        ValueKind::Uuid | ValueKind::Text => Ok(Json::String(raw)),
    }
}
