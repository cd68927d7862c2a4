//! Type cast registry for configured field conversions.
//!
//! The typing config names one of a fixed set of cast types per field;
//! [`CastType`] resolves those names and applies the corresponding conversion
//! from a raw cell string to a JSON value. Date handling follows the flexible
//! multi-format approach used for typed CSV columns, normalizing everything
//! to an ISO-8601 UTC timestamp string.

use std::{fmt, str::FromStr};

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::{Number, Value};

use crate::literal;

pub const ISO_UTC_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastType {
    Float,
    Bool,
    Int,
    List,
    Date,
    Str,
}

impl FromStr for CastType {
    type Err = anyhow::Error;

    fn from_str(name: &str) -> Result<Self> {
        match name {
            "float" => Ok(CastType::Float),
            "bool" => Ok(CastType::Bool),
            "int" => Ok(CastType::Int),
            "list" => Ok(CastType::List),
            "date" => Ok(CastType::Date),
            "str" => Ok(CastType::Str),
            other => Err(anyhow!("Unknown cast type '{other}'")),
        }
    }
}

impl fmt::Display for CastType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CastType::Float => "float",
            CastType::Bool => "bool",
            CastType::Int => "int",
            CastType::List => "list",
            CastType::Date => "date",
            CastType::Str => "str",
        };
        write!(f, "{name}")
    }
}

impl CastType {
    /// Converts one raw cell to a JSON value. `bool` and `str` never fail;
    /// the others report a cast failure the caller downgrades to a warning.
    pub fn apply(&self, raw: &str) -> Result<Value> {
        match self {
            CastType::Float => {
                let parsed: f64 = raw
                    .parse()
                    .with_context(|| format!("Failed to parse '{raw}' as float"))?;
                Number::from_f64(parsed)
                    .map(Value::Number)
                    .ok_or_else(|| anyhow!("Non-finite float '{raw}'"))
            }
            CastType::Int => {
                let parsed: i64 = raw
                    .parse()
                    .with_context(|| format!("Failed to parse '{raw}' as integer"))?;
                Ok(Value::Number(Number::from(parsed)))
            }
            // Truthiness of the raw cell, not a true/false keyword parse.
            CastType::Bool => Ok(Value::Bool(!raw.is_empty())),
            CastType::List => literal::parse_literal(raw),
            CastType::Date => parse_flexible_date(raw).map(Value::String),
            CastType::Str => Ok(Value::String(raw.to_string())),
        }
    }
}

/// Parses a free-form date or datetime string and renders it as an ISO-8601
/// UTC timestamp (`YYYY-MM-DDTHH:MM:SSZ`). Date-only inputs land on midnight.
pub fn parse_flexible_date(value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("Failed to parse empty string as date"));
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.naive_utc().format(ISO_UTC_FORMAT).to_string());
    }
    const DATETIME_FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%d/%m/%Y %H:%M:%S",
        "%m/%d/%Y %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];
    for fmt in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Ok(parsed.format(ISO_UTC_FORMAT).to_string());
        }
    }
    const DATE_FORMATS: &[&str] = &[
        "%Y-%m-%d",
        "%d/%m/%Y",
        "%m/%d/%Y",
        "%Y/%m/%d",
        "%d-%m-%Y",
        "%B %d, %Y",
        "%d %B %Y",
    ];
    for fmt in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(trimmed, fmt) {
            let midnight = parsed
                .and_hms_opt(0, 0, 0)
                .ok_or_else(|| anyhow!("Invalid midnight for '{trimmed}'"))?;
            return Ok(midnight.format(ISO_UTC_FORMAT).to_string());
        }
    }
    Err(anyhow!("Failed to parse '{value}' as date"))
}
