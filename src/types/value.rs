//! The dynamically-typed field value.
//!
//! A [`Value`] is a tagged union of the nine kinds a record field can hold.
//! Three of them are "non-data" kinds with precise meanings:
//!
//! - [`Value::Absent`]: the field was never set (e.g. a lookup on a record
//!   that lacks the key). Absent fields never appear in output.
//! - [`Value::Void`]: explicitly empty (present, with an empty string).
//! - [`Value::Error`]: the result of an invalid operation. Errors propagate
//!   through further operations rather than aborting the stream.
//!
//! Values built from raw input text go through type inference exactly once
//! ([`Value::from_inferred_text`] / [`Value::from_inferred_text_for_data_files`]),
//! and the original spelling is kept so an unmodified field round-trips
//! byte-for-byte: `0042` stays `0042` even though it is an INT.

use std::fmt;

use crate::types::Record;

/// The kind tag of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Never set.
    Absent,
    /// Explicitly empty.
    Void,
    /// Result of an invalid operation.
    Error,
    /// UTF-8 string.
    String,
    /// 64-bit signed integer.
    Int,
    /// IEEE-754 double.
    Float,
    /// Boolean.
    Bool,
    /// Ordered sequence of values.
    Array,
    /// Nested record.
    Map,
}

/// A dynamically-typed field value.
///
/// Inferred INT/FLOAT values keep the original input spelling (`text`) for
/// faithful output; programmatically constructed numbers carry no spelling
/// and render canonically. Equality ignores the preserved spelling.
#[derive(Debug, Clone)]
pub enum Value {
    /// The field was never set.
    Absent,
    /// Explicitly empty (present with an empty string).
    Void,
    /// Result of an invalid operation; carries a diagnostic message.
    Error(String),
    /// UTF-8 string.
    Str(String),
    /// 64-bit signed integer.
    Int {
        /// Parsed integer value.
        value: i64,
        /// Original input spelling, when inferred from text.
        text: Option<Box<str>>,
    },
    /// IEEE-754 double.
    Float {
        /// Parsed float value.
        value: f64,
        /// Original input spelling, when inferred from text.
        text: Option<Box<str>>,
    },
    /// Boolean.
    Bool(bool),
    /// Ordered sequence of values.
    Array(Vec<Value>),
    /// Nested record (insertion-ordered).
    Map(Record),
}

impl Value {
    // ------------------------------------------------------------------
    // Constructors

    /// A STRING value.
    pub fn from_string(s: impl Into<String>) -> Self {
        Value::Str(s.into())
    }

    /// An INT value with canonical rendering.
    pub fn from_int(value: i64) -> Self {
        Value::Int { value, text: None }
    }

    /// A FLOAT value with canonical rendering.
    pub fn from_float(value: f64) -> Self {
        Value::Float { value, text: None }
    }

    /// A BOOL value.
    pub fn from_bool(value: bool) -> Self {
        Value::Bool(value)
    }

    /// An ARRAY value taking ownership of `items`.
    pub fn from_array(items: Vec<Value>) -> Self {
        Value::Array(items)
    }

    /// A MAP value taking ownership of `record`.
    pub fn from_map(record: Record) -> Self {
        Value::Map(record)
    }

    /// A MAP value holding a deep copy of `record`.
    pub fn from_map_copy(record: &Record) -> Self {
        Value::Map(record.clone())
    }

    /// The ERROR value produced when a string operation is applied to a
    /// non-string operand.
    pub fn not_string_error(function: &str, offender: &Value) -> Self {
        Value::Error(format!("{function}: not a string: {offender}"))
    }

    /// Infer a value from text not originating in a data file.
    ///
    /// Recognizes integer literals (decimal and `0x`-hex), float literals,
    /// `true`/`false`, and `NaN`/`Inf`/`+Inf`/`-Inf`. The empty string is
    /// VOID; anything else is STRING.
    pub fn from_inferred_text(text: &str) -> Self {
        infer(text, true)
    }

    /// Infer a value from a field read out of a data file.
    ///
    /// Same as [`Value::from_inferred_text`] except `true`/`false` and
    /// `NaN`/`Inf` stay STRING: data files are untyped, and a column of
    /// string data containing the word "true" must not change type.
    pub fn from_inferred_text_for_data_files(text: &str) -> Self {
        infer(text, false)
    }

    // ------------------------------------------------------------------
    // Predicates

    /// The kind tag.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Absent => ValueKind::Absent,
            Value::Void => ValueKind::Void,
            Value::Error(_) => ValueKind::Error,
            Value::Str(_) => ValueKind::String,
            Value::Int { .. } => ValueKind::Int,
            Value::Float { .. } => ValueKind::Float,
            Value::Bool(_) => ValueKind::Bool,
            Value::Array(_) => ValueKind::Array,
            Value::Map(_) => ValueKind::Map,
        }
    }

    /// True for the ABSENT kind.
    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    /// True for the VOID kind.
    pub fn is_void(&self) -> bool {
        matches!(self, Value::Void)
    }

    /// True for the ERROR kind.
    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    /// True for VOID, or for a STRING of zero length.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Void => true,
            Value::Str(s) => s.is_empty(),
            _ => false,
        }
    }

    /// True for anything that is neither ABSENT nor ERROR.
    pub fn is_legit(&self) -> bool {
        !matches!(self, Value::Absent | Value::Error(_))
    }

    /// True for the STRING and VOID kinds.
    pub fn is_string_or_void(&self) -> bool {
        matches!(self, Value::Str(_) | Value::Void)
    }

    // ------------------------------------------------------------------
    // Payload accessors
    //
    // These panic on kind mismatch. Callers guard with the predicates;
    // an unguarded access is a programming error and should fail loudly.

    /// The STRING payload.
    ///
    /// # Panics
    ///
    /// Panics if the kind is not STRING.
    pub fn string_value(&self) -> &str {
        match self {
            Value::Str(s) => s,
            other => panic!("string_value called on {:?} value", other.kind()),
        }
    }

    /// The INT payload.
    ///
    /// # Panics
    ///
    /// Panics if the kind is not INT.
    pub fn int_value(&self) -> i64 {
        match self {
            Value::Int { value, .. } => *value,
            other => panic!("int_value called on {:?} value", other.kind()),
        }
    }

    /// The FLOAT payload.
    ///
    /// # Panics
    ///
    /// Panics if the kind is not FLOAT.
    pub fn float_value(&self) -> f64 {
        match self {
            Value::Float { value, .. } => *value,
            other => panic!("float_value called on {:?} value", other.kind()),
        }
    }

    /// The BOOL payload.
    ///
    /// # Panics
    ///
    /// Panics if the kind is not BOOL.
    pub fn bool_value(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            other => panic!("bool_value called on {:?} value", other.kind()),
        }
    }

    /// The ARRAY payload.
    ///
    /// # Panics
    ///
    /// Panics if the kind is not ARRAY.
    pub fn array_value(&self) -> &[Value] {
        match self {
            Value::Array(items) => items,
            other => panic!("array_value called on {:?} value", other.kind()),
        }
    }

    /// The MAP payload.
    ///
    /// # Panics
    ///
    /// Panics if the kind is not MAP.
    pub fn map_value(&self) -> &Record {
        match self {
            Value::Map(record) => record,
            other => panic!("map_value called on {:?} value", other.kind()),
        }
    }

    /// Convert to a JSON value for writers and nested rendering.
    ///
    /// ABSENT maps to `null` (it should not appear in records at all), VOID
    /// to the empty string, ERROR to its `(error)` rendering. Non-finite
    /// floats, which JSON cannot carry as numbers, render as strings.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Absent => serde_json::Value::Null,
            Value::Void => serde_json::Value::String(String::new()),
            Value::Error(_) => serde_json::Value::String("(error)".to_string()),
            Value::Str(s) => serde_json::Value::String(s.clone()),
            Value::Int { value, .. } => serde_json::Value::Number((*value).into()),
            Value::Float { value, .. } => match serde_json::Number::from_f64(*value) {
                Some(n) => serde_json::Value::Number(n),
                None => serde_json::Value::String(self.to_string()),
            },
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Map(record) => {
                let mut map = serde_json::Map::with_capacity(record.len());
                for (key, value) in record.iter() {
                    map.insert(key.to_string(), value.to_json());
                }
                serde_json::Value::Object(map)
            }
        }
    }
}

/// Canonical rendering, used by writers and grouping keys.
///
/// ABSENT and VOID render empty, ERROR renders `(error)`, inferred numbers
/// render with their original spelling, and ARRAY/MAP render as JSON.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Absent | Value::Void => Ok(()),
            Value::Error(_) => write!(f, "(error)"),
            Value::Str(s) => write!(f, "{s}"),
            Value::Int { value, text } => match text {
                Some(t) => write!(f, "{t}"),
                None => write!(f, "{value}"),
            },
            Value::Float { value, text } => match text {
                Some(t) => write!(f, "{t}"),
                None => write!(f, "{value}"),
            },
            Value::Bool(b) => write!(f, "{b}"),
            Value::Array(_) | Value::Map(_) => {
                let rendered = serde_json::to_string(&self.to_json()).map_err(|_| fmt::Error)?;
                write!(f, "{rendered}")
            }
        }
    }
}

/// Equality over kind and payload; the preserved input spelling is ignored,
/// so an inferred `0042` equals a programmatic `42`.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Absent, Value::Absent) => true,
            (Value::Void, Value::Void) => true,
            (Value::Error(a), Value::Error(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Int { value: a, .. }, Value::Int { value: b, .. }) => a == b,
            (Value::Float { value: a, .. }, Value::Float { value: b, .. }) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            _ => false,
        }
    }
}

fn infer(text: &str, infer_bool_and_nonfinite: bool) -> Value {
    if text.is_empty() {
        return Value::Void;
    }

    if infer_bool_and_nonfinite {
        match text {
            "true" => return Value::Bool(true),
            "false" => return Value::Bool(false),
            "NaN" => return float_with_spelling(f64::NAN, text),
            "Inf" | "+Inf" => return float_with_spelling(f64::INFINITY, text),
            "-Inf" => return float_with_spelling(f64::NEG_INFINITY, text),
            _ => {}
        }
    }

    if let Some(value) = parse_int_literal(text) {
        return Value::Int {
            value,
            text: Some(text.into()),
        };
    }
    if let Some(value) = parse_float_literal(text) {
        return float_with_spelling(value, text);
    }

    Value::Str(text.to_string())
}

fn float_with_spelling(value: f64, text: &str) -> Value {
    Value::Float {
        value,
        text: Some(text.into()),
    }
}

fn parse_int_literal(text: &str) -> Option<i64> {
    let (negative, body) = match text.as_bytes() {
        [b'-', ..] => (true, &text[1..]),
        [b'+', ..] => (false, &text[1..]),
        _ => (false, text),
    };

    if let Some(hex) = body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
        let magnitude = i64::from_str_radix(hex, 16).ok()?;
        return Some(if negative { -magnitude } else { magnitude });
    }

    if body.is_empty() || !body.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse::<i64>().ok()
}

fn parse_float_literal(text: &str) -> Option<f64> {
    // Restrict to numeric-literal syntax before handing off to the float
    // parser, which would otherwise accept spellings like "inf"/"nan".
    let numeric_syntax = text
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'+' | b'-' | b'e' | b'E'));
    if !numeric_syntax || !text.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse::<f64>().ok()
}
