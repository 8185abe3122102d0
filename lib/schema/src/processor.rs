//! Value coercions applied after field mapping
//!
//! Source datasets disagree on types: years arrive as strings, genres as a
//! single string, scores on a 0-100 scale. A processor turns the mapped value
//! into the shape the normalized record expects. Processors never fail; a
//! value that cannot be coerced becomes null, which validation then reports
//! for required fields.

use reelx_core::filter::MAX_RATING;
use serde::{Deserialize, Deserializer};
use serde_json::{Number, Value};
use std::fmt;
use std::sync::Arc;

/// Custom coercion: receives the mapped value and the whole raw record
pub type ProcessFn = Arc<dyn Fn(&Value, &Value) -> Value + Send + Sync>;

#[derive(Clone)]
pub enum Processor {
    /// Falsy to 0, numbers kept, strings parsed by their leading number
    Float,
    /// Like [`Processor::Float`] but truncated to an integer
    Integer,
    /// Arrays kept, falsy to empty, any other value wrapped in an array
    List,
    /// Like [`Processor::List`] but strings are split on commas and trimmed
    CommaList,
    /// Number on a `[0, max]` scale moved onto the `[0, 10]` rating scale
    Rescale { max: f64 },
    Custom(ProcessFn),
}

impl Processor {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&Value, &Value) -> Value + Send + Sync + 'static,
    {
        Processor::Custom(Arc::new(f))
    }

    /// Coerce `value`; `raw` is the record it was mapped from
    pub fn apply(&self, value: &Value, raw: &Value) -> Value {
        match self {
            Processor::Float => to_float(value).map(float_value).unwrap_or(Value::Null),
            Processor::Integer => to_integer(value).map(Value::from).unwrap_or(Value::Null),
            Processor::List => to_list(value, false),
            Processor::CommaList => to_list(value, true),
            Processor::Rescale { max } => {
                if *max <= 0.0 {
                    return Value::Null;
                }
                to_float(value)
                    .map(|v| float_value(v * f64::from(MAX_RATING) / max))
                    .unwrap_or(Value::Null)
            }
            Processor::Custom(f) => f(value, raw),
        }
    }
}

impl fmt::Debug for Processor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Processor::Float => f.write_str("Float"),
            Processor::Integer => f.write_str("Integer"),
            Processor::List => f.write_str("List"),
            Processor::CommaList => f.write_str("CommaList"),
            Processor::Rescale { max } => f.debug_struct("Rescale").field("max", max).finish(),
            Processor::Custom(_) => f.write_str("Custom(<fn>)"),
        }
    }
}

/// Configuration files name the built-in processors: `"float"`,
/// `"integer"`, `"list"`, `"comma_list"` or `{"rescale": {"max": 100}}`
#[derive(Deserialize)]
#[serde(rename_all = "snake_case")]
enum ProcessorRepr {
    Float,
    Integer,
    List,
    CommaList,
    Rescale { max: f64 },
}

impl<'de> Deserialize<'de> for Processor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match ProcessorRepr::deserialize(deserializer)? {
            ProcessorRepr::Float => Processor::Float,
            ProcessorRepr::Integer => Processor::Integer,
            ProcessorRepr::List => Processor::List,
            ProcessorRepr::CommaList => Processor::CommaList,
            ProcessorRepr::Rescale { max } => Processor::Rescale { max },
        })
    }
}

/// null, false, 0, NaN and the empty string
pub fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().map(|f| f == 0.0 || f.is_nan()).unwrap_or(false),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

fn float_value(f: f64) -> Value {
    Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null)
}

fn to_float(value: &Value) -> Option<f64> {
    if is_falsy(value) {
        return Some(0.0);
    }
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => leading_number(s, true),
        _ => None,
    }
}

fn to_integer(value: &Value) -> Option<i64> {
    if is_falsy(value) {
        return Some(0);
    }
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => leading_number(s, false).map(|f| f as i64),
        _ => None,
    }
}

fn to_list(value: &Value, split_commas: bool) -> Value {
    match value {
        Value::Array(_) => value.clone(),
        v if is_falsy(v) => Value::Array(Vec::new()),
        Value::String(s) if split_commas => Value::Array(
            s.split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(|part| Value::String(part.to_string()))
                .collect(),
        ),
        other => Value::Array(vec![other.clone()]),
    }
}

/// Parse the number at the start of `s`, ignoring anything after it
///
/// `"7.5/10"` gives 7.5; `"1999 (re-release)"` gives 1999. With
/// `allow_fraction` false the parse stops at the decimal point.
fn leading_number(s: &str, allow_fraction: bool) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut has_digits = end > int_start;

    if allow_fraction && end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if frac_end > frac_start {
            has_digits = true;
            end = frac_end;
        } else if has_digits {
            end = frac_start;
        }
    }

    if !has_digits {
        return None;
    }
    s[..end].trim_end_matches('.').parse::<f64>().ok()
}
