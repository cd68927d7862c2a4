//! Field typing configuration: loading, validation, and the active mapping.
//!
//! The config file is a JSON object keyed by fully-qualified flat field name
//! (segments joined with the same delimiter as the nesting structure), each
//! entry carrying an optional `type` and an optional `default`:
//!
//! ```json
//! {
//!   "price_amount": { "type": "float" },
//!   "price_currency": { "type": "str", "default": "EUR" },
//!   "tags": { "type": "list", "default": [] }
//! }
//! ```
//!
//! Entries whose `type` does not resolve are dropped with a warning unless a
//! `default` is present, in which case they are kept default-only: the bad
//! caster never installs, the default still covers empty cells, and non-empty
//! cells pass through raw.

use std::{collections::BTreeMap, fs::File, io::BufReader, path::Path};

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

use crate::{diag::DiagnosticSink, types::CastType};

#[derive(Debug, Deserialize)]
struct RawFieldSpec {
    #[serde(rename = "type")]
    type_name: Option<String>,
    default: Option<Value>,
}

/// One field's resolved typing rule. `cast` and `default` are independently
/// optional; a spec with a `default` and no `cast` is the default-only state.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub cast: Option<CastType>,
    pub default: Option<Value>,
}

pub type FieldConfig = BTreeMap<String, FieldSpec>;

pub fn load(path: &Path, sink: &dyn DiagnosticSink) -> Result<FieldConfig> {
    let file = File::open(path).with_context(|| format!("Opening config file {path:?}"))?;
    let raw: BTreeMap<String, RawFieldSpec> = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Parsing config file {path:?}"))?;
    Ok(resolve(raw, sink))
}

fn resolve(raw: BTreeMap<String, RawFieldSpec>, sink: &dyn DiagnosticSink) -> FieldConfig {
    let mut active = FieldConfig::new();
    for (field, spec) in raw {
        let cast = match spec.type_name.as_deref() {
            Some(name) => match name.parse::<CastType>() {
                Ok(cast) => Some(cast),
                Err(_) if spec.default.is_none() => {
                    sink.warn(format!(
                        "Config for '{field}' omitted: type '{name}' is not valid and no default value is indicated"
                    ));
                    continue;
                }
                Err(_) => {
                    sink.warn(format!(
                        "Config for '{field}': type '{name}' is not valid, keeping the default value only"
                    ));
                    None
                }
            },
            None => None,
        };
        active.insert(
            field,
            FieldSpec {
                cast,
                default: spec.default,
            },
        );
    }
    active
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diag::MemorySink;
    use serde_json::json;

    fn resolve_json(doc: Value) -> (FieldConfig, MemorySink) {
        let raw: BTreeMap<String, RawFieldSpec> = serde_json::from_value(doc).unwrap();
        let sink = MemorySink::new();
        let config = resolve(raw, &sink);
        (config, sink)
    }

    #[test]
    fn resolves_valid_types_and_defaults() {
        let (config, sink) = resolve_json(json!({
            "a_b": {"type": "int", "default": 0},
            "a_c": {"type": "date"},
            "d": {"default": "n/a"}
        }));
        assert!(sink.is_empty());
        assert_eq!(config["a_b"].cast, Some(CastType::Int));
        assert_eq!(config["a_b"].default, Some(json!(0)));
        assert_eq!(config["a_c"].cast, Some(CastType::Date));
        assert!(config["a_c"].default.is_none());
        assert!(config["d"].cast.is_none());
        assert_eq!(config["d"].default, Some(json!("n/a")));
    }

    #[test]
    fn drops_invalid_type_without_default_and_warns() {
        let (config, sink) = resolve_json(json!({
            "x": {"type": "integer"},
            "y": {"type": "int"}
        }));
        assert!(!config.contains_key("x"));
        assert!(config.contains_key("y"));
        let messages = sink.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("'x'"));
        assert!(messages[0].contains("'integer'"));
    }

    #[test]
    fn invalid_type_with_default_becomes_default_only() {
        let (config, sink) = resolve_json(json!({
            "x": {"type": "number", "default": 1.5}
        }));
        let spec = &config["x"];
        assert!(spec.cast.is_none());
        assert_eq!(spec.default, Some(json!(1.5)));
        assert_eq!(sink.messages().len(), 1);
    }
}
