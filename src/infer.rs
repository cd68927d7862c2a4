//! Automatic type inference for raw cell values.
//!
//! When `--infer-types` is set and a field has no typing config entry, each
//! raw cell goes through an ordered cascade of parse attempts; the first
//! success wins and the final fallback (the string itself) always succeeds.
//! Numeric parses run before the date parse so purely numeric strings are
//! never mistaken for dates, and the literal parse runs first so bracketed
//! or quoted structured values are recovered before any scalar reading.

use serde_json::{Number, Value};

use crate::{literal, types};

pub fn infer_value(raw: &str) -> Value {
    if let Ok(value) = literal::parse_literal(raw) {
        return value;
    }
    if let Ok(parsed) = raw.parse::<i64>() {
        return Value::Number(Number::from(parsed));
    }
    if let Ok(parsed) = raw.parse::<f64>() {
        if let Some(number) = Number::from_f64(parsed) {
            return Value::Number(number);
        }
    }
    if let Ok(formatted) = types::parse_flexible_date(raw) {
        return Value::String(formatted);
    }
    Value::String(raw.to_string())
}
