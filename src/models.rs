// src/models.rs

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

// --- VALUE TYPES ---

/// Element type of a parameter, before nullability and array-ness are applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    String,
    Bool,
    Int32,
    Int64,
    Double,
    Decimal,
    DateTime,
    /// An enumeration, matched by case-sensitive member name.
    Enum(Vec<String>),
}

impl ValueKind {
    /// Short, stable name used in help output and error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            ValueKind::String => "string",
            ValueKind::Bool => "bool",
            ValueKind::Int32 => "int32",
            ValueKind::Int64 => "int64",
            ValueKind::Double => "double",
            ValueKind::Decimal => "decimal",
            ValueKind::DateTime => "datetime",
            ValueKind::Enum(_) => "enum",
        }
    }
}

/// The declared type of a parameter: an element kind, optionally nullable,
/// optionally wrapped in an array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeSpec {
    pub kind: ValueKind,
    pub nullable: bool,
    pub array: bool,
}

impl TypeSpec {
    pub fn new(kind: ValueKind) -> Self {
        Self {
            kind,
            nullable: false,
            array: false,
        }
    }

    /// True for `bool` and `bool?`. These take presence-only `true`, an
    /// optional boolean literal and a negated option form.
    pub fn is_boolean(&self) -> bool {
        self.kind == ValueKind::Bool && !self.array
    }

    /// True only for a plain `bool`. An unmentioned switch reads `false`
    /// where an unmentioned `bool?` reads `null`.
    pub fn is_switch(&self) -> bool {
        self.is_boolean() && !self.nullable
    }
}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ValueKind::Enum(variants) => write!(f, "{{{}}}", variants.join("|"))?,
            kind => f.write_str(kind.type_name())?,
        }
        if self.nullable {
            f.write_str("?")?;
        }
        if self.array {
            f.write_str("[]")?;
        }
        Ok(())
    }
}

/// A parsed parameter value.
///
/// `Missing` is the sentinel for an optional parameter that was never
/// mentioned. It is distinct from `Null` (explicitly empty) and from the
/// parameter's declared default.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Missing,
    Null,
    String(String),
    Bool(bool),
    Int32(i32),
    Int64(i64),
    Double(f64),
    Decimal(Decimal),
    DateTime(NaiveDateTime),
    Enum(String),
    Array(Vec<Value>),
}

impl Value {
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Missing => f.write_str("<missing>"),
            Value::Null => f.write_str("null"),
            Value::String(s) | Value::Enum(s) => f.write_str(s),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int32(n) => write!(f, "{}", n),
            Value::Int64(n) => write!(f, "{}", n),
            Value::Double(n) => write!(f, "{}", n),
            Value::Decimal(d) => write!(f, "{}", d),
            Value::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S")),
            Value::Array(items) => {
                let parts: Vec<String> = items.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int32(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int64(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Double(value)
    }
}

impl From<Decimal> for Value {
    fn from(value: Decimal) -> Self {
        Value::Decimal(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Value::DateTime(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Value::Array(values.into_iter().map(Into::into).collect())
    }
}

/// Conversion from a parsed [`Value`] into a Rust type an action wants to read.
pub trait FromValue: Sized {
    /// Returns `None` when the value has a different shape than `Self`.
    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) | Value::Enum(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl FromValue for i32 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int32(n) => Some(*n),
            _ => None,
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int64(n) => Some(*n),
            Value::Int32(n) => Some(i64::from(*n)),
            _ => None,
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Double(n) => Some(*n),
            Value::Int32(n) => Some(f64::from(*n)),
            _ => None,
        }
    }
}

impl FromValue for Decimal {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Decimal(d) => Some(*d),
            Value::Int32(n) => Some(Decimal::from(*n)),
            Value::Int64(n) => Some(Decimal::from(*n)),
            _ => None,
        }
    }
}

impl FromValue for NaiveDateTime {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null | Value::Missing => Some(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Array(items) => items.iter().map(T::from_value).collect(),
            _ => None,
        }
    }
}

// --- INVOCATION RESULT ---

/// What an action body returned, before it is mapped to an exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The action returns nothing; exit code 0.
    Unit,
    /// The action returns an exit code directly.
    Code(i32),
    /// The action returns success/failure; `false` maps to the failure code.
    Flag(bool),
}

impl Outcome {
    pub fn exit_code(self, failure_code: i32) -> i32 {
        match self {
            Outcome::Unit => 0,
            Outcome::Code(code) => code,
            Outcome::Flag(true) => 0,
            Outcome::Flag(false) => failure_code,
        }
    }
}

impl From<()> for Outcome {
    fn from(_: ()) -> Self {
        Outcome::Unit
    }
}

impl From<i32> for Outcome {
    fn from(code: i32) -> Self {
        Outcome::Code(code)
    }
}

impl From<bool> for Outcome {
    fn from(ok: bool) -> Self {
        Outcome::Flag(ok)
    }
}

// --- VALIDATION ---

/// The structural defects found on one command. Produced by the validator,
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    command: String,
    messages: Vec<String>,
}

impl ValidationResult {
    pub fn new(command: impl Into<String>, messages: Vec<String>) -> Self {
        Self {
            command: command.into(),
            messages,
        }
    }

    /// Conventional name of the offending command.
    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, message) in self.messages.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}: {}", self.command, message)?;
        }
        Ok(())
    }
}

// MARK: --- UNIT TESTS ---
