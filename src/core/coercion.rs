// src/core/coercion.rs

//! Conversion of raw tokens into typed [`Value`]s.
//!
//! Every function here is pure. Parsers decide which tokens belong to a
//! parameter; this module only decides what those tokens mean.

use crate::core::error::CoercionError;
use crate::models::{TypeSpec, Value, ValueKind};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use std::str::FromStr;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Coerces one token into the element type of `spec`.
///
/// An empty token yields `Null` for nullable types. For a non-nullable
/// `string` it is the empty string; for any other non-nullable kind it is an
/// error.
pub fn coerce(spec: &TypeSpec, raw: &str) -> Result<Value, CoercionError> {
    if raw.is_empty() {
        if spec.nullable {
            return Ok(Value::Null);
        }
        if spec.kind == ValueKind::String {
            return Ok(Value::String(String::new()));
        }
        return Err(CoercionError::Empty {
            expected: spec.kind.type_name().to_string(),
        });
    }
    coerce_kind(&spec.kind, raw)
}

/// The value for an option that was named but given no value at all.
pub fn coerce_absent(spec: &TypeSpec) -> Result<Value, CoercionError> {
    if spec.nullable {
        Ok(Value::Null)
    } else {
        Err(CoercionError::MissingValue {
            expected: spec.to_string(),
        })
    }
}

/// Coerces every token independently and collects them into an array value.
/// An empty run is an empty array, not an error.
pub fn coerce_all<'t, I>(spec: &TypeSpec, raws: I) -> Result<Value, CoercionError>
where
    I: IntoIterator<Item = &'t str>,
{
    raws.into_iter()
        .map(|raw| coerce(spec, raw))
        .collect::<Result<Vec<_>, _>>()
        .map(Value::Array)
}

/// Parses a boolean literal (`true`/`false`, any casing).
pub fn parse_bool(raw: &str) -> Option<bool> {
    if raw.eq_ignore_ascii_case("true") {
        Some(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn coerce_kind(kind: &ValueKind, raw: &str) -> Result<Value, CoercionError> {
    let invalid = || CoercionError::Invalid {
        token: raw.to_string(),
        expected: kind.type_name().to_string(),
    };

    match kind {
        ValueKind::String => Ok(Value::String(raw.to_string())),
        ValueKind::Bool => parse_bool(raw).map(Value::Bool).ok_or_else(invalid),
        ValueKind::Int32 => raw.parse::<i32>().map(Value::Int32).map_err(|_| invalid()),
        ValueKind::Int64 => raw.parse::<i64>().map(Value::Int64).map_err(|_| invalid()),
        ValueKind::Double => raw.parse::<f64>().map(Value::Double).map_err(|_| invalid()),
        ValueKind::Decimal => Decimal::from_str(raw)
            .or_else(|_| Decimal::from_scientific(raw))
            .map(Value::Decimal)
            .map_err(|_| invalid()),
        ValueKind::DateTime => parse_datetime(raw).map(Value::DateTime).ok_or_else(invalid),
        ValueKind::Enum(variants) => {
            if variants.iter().any(|v| v == raw) {
                Ok(Value::Enum(raw.to_string()))
            } else {
                Err(CoercionError::UnknownVariant {
                    token: raw.to_string(),
                    variants: variants.join(", "),
                })
            }
        }
    }
}

fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

// MARK: --- UNIT TESTS ---
