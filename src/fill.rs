//! Per-record document filling.
//!
//! Each row gets a fresh instance of the structure template; every header
//! field resolves to a JSON value through a fixed precedence — typing config
//! first, then inference when enabled, then the raw string — and is written
//! into the instance at its field path. A failing cast or a malformed spot in
//! the document degrades that one field with a warning, never the record.

use serde_json::Value;

use crate::{
    config::FieldConfig,
    diag::DiagnosticSink,
    infer,
    structure::split_path,
};

pub struct FillContext<'a> {
    pub header: &'a [String],
    pub delimiter: &'a str,
    pub keep_empty: bool,
    pub infer_types: bool,
    pub config: &'a FieldConfig,
}

/// Fills one template instance from a row of raw cells aligned with the
/// header. Always produces a document; problems are reported via `sink`.
pub fn fill_document(
    context: &FillContext<'_>,
    raw: &[String],
    mut document: Value,
    sink: &dyn DiagnosticSink,
) -> Value {
    for (idx, name) in context.header.iter().enumerate() {
        let cell = raw.get(idx).map(|s| s.as_str()).unwrap_or("");
        let resolved = resolve_field(context, name, cell, sink);
        let path = split_path(name, context.delimiter);
        assign_leaf(&mut document, name, &path, resolved, context.keep_empty, sink);
    }
    document
}

/// Value resolution order: a config entry (even default-only) fully overrides
/// inference; inference overrides the raw string; the raw string always works.
fn resolve_field(
    context: &FillContext<'_>,
    name: &str,
    cell: &str,
    sink: &dyn DiagnosticSink,
) -> Value {
    if let Some(spec) = context.config.get(name) {
        if cell.is_empty() {
            if let Some(default) = &spec.default {
                return default.clone();
            }
        }
        return match spec.cast {
            Some(cast) => match cast.apply(cell) {
                Ok(value) => value,
                Err(err) => {
                    sink.warn(format!(
                        "Cannot cast value '{cell}' of field '{name}' to type '{cast}': {err}"
                    ));
                    Value::String(cell.to_string())
                }
            },
            None => Value::String(cell.to_string()),
        };
    }
    if context.infer_types {
        return infer::infer_value(cell);
    }
    Value::String(cell.to_string())
}

/// Empty strings normalize to null at the leaf; null is then deleted or kept
/// explicit depending on `keep_empty`. The walk trusts the template-derived
/// shape but downgrades any mismatch to a warning.
fn assign_leaf(
    document: &mut Value,
    name: &str,
    path: &[&str],
    value: Value,
    keep_empty: bool,
    sink: &dyn DiagnosticSink,
) {
    let mut current = &mut *document;
    for segment in &path[..path.len() - 1] {
        let Some(map) = current.as_object_mut() else {
            sink.warn(format!(
                "Cannot associate value to field '{name}': '{segment}' is not an object"
            ));
            return;
        };
        match map.get_mut(*segment) {
            Some(child) => current = child,
            None => {
                sink.warn(format!(
                    "Cannot associate value to field '{name}': missing level '{segment}'"
                ));
                return;
            }
        }
    }
    let leaf = path[path.len() - 1];
    let Some(map) = current.as_object_mut() else {
        sink.warn(format!(
            "Cannot associate value to field '{name}': parent of '{leaf}' is not an object"
        ));
        return;
    };
    let value = match value {
        Value::String(s) if s.is_empty() => Value::Null,
        other => other,
    };
    if value.is_null() && !keep_empty {
        map.remove(leaf);
    } else {
        map.insert(leaf.to_string(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::FieldSpec,
        diag::MemorySink,
        structure::Template,
        types::CastType,
    };
    use serde_json::json;

    fn header(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn cells(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn fill(
        names: &[&str],
        values: &[&str],
        keep_empty: bool,
        infer_types: bool,
        config: FieldConfig,
        sink: &MemorySink,
    ) -> Value {
        let names = header(names);
        let template = Template::build(&names, "_").unwrap();
        let context = FillContext {
            header: &names,
            delimiter: "_",
            keep_empty,
            infer_types,
            config: &config,
        };
        fill_document(&context, &cells(values), template.instantiate(), sink)
    }

    #[test]
    fn fills_nested_document_from_raw_strings() {
        let sink = MemorySink::new();
        let document = fill(
            &["a_b", "a_c", "d"],
            &["1", "two", "x"],
            false,
            false,
            FieldConfig::new(),
            &sink,
        );
        assert_eq!(document, json!({"a": {"b": "1", "c": "two"}, "d": "x"}));
        assert!(sink.is_empty());
    }

    #[test]
    fn empty_values_are_dropped_or_kept_as_null() {
        let sink = MemorySink::new();
        let dropped = fill(
            &["a_b", "a_c", "d"],
            &["1", "", "x"],
            false,
            true,
            FieldConfig::new(),
            &sink,
        );
        assert_eq!(dropped, json!({"a": {"b": 1}, "d": "x"}));

        let kept = fill(
            &["a_b", "a_c", "d"],
            &["1", "", "x"],
            true,
            true,
            FieldConfig::new(),
            &sink,
        );
        assert_eq!(kept, json!({"a": {"b": 1, "c": null}, "d": "x"}));
    }

    #[test]
    fn configured_default_applies_to_empty_cells_before_casting() {
        let mut config = FieldConfig::new();
        config.insert(
            "a_b".to_string(),
            FieldSpec {
                cast: Some(CastType::Int),
                default: Some(json!(0)),
            },
        );
        let sink = MemorySink::new();
        let document = fill(&["a_b"], &[""], false, false, config, &sink);
        assert_eq!(document, json!({"a": {"b": 0}}));
        assert!(sink.is_empty());
    }

    #[test]
    fn cast_failure_keeps_raw_string_and_warns() {
        let mut config = FieldConfig::new();
        config.insert(
            "a_b".to_string(),
            FieldSpec {
                cast: Some(CastType::Int),
                default: None,
            },
        );
        let sink = MemorySink::new();
        let document = fill(&["a_b"], &["not-a-number"], false, false, config, &sink);
        assert_eq!(document, json!({"a": {"b": "not-a-number"}}));
        let messages = sink.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("'a_b'"));
        assert!(messages[0].contains("not-a-number"));
    }

    #[test]
    fn config_overrides_inference_even_when_default_only() {
        let mut config = FieldConfig::new();
        config.insert(
            "n".to_string(),
            FieldSpec {
                cast: None,
                default: Some(json!("fallback")),
            },
        );
        let sink = MemorySink::new();
        // Inference would turn "3" into a number; the config entry pins it raw.
        let document = fill(&["n"], &["3"], false, true, config, &sink);
        assert_eq!(document, json!({"n": "3"}));
    }

    #[test]
    fn inference_applies_to_unconfigured_fields_only() {
        let mut config = FieldConfig::new();
        config.insert(
            "typed".to_string(),
            FieldSpec {
                cast: Some(CastType::Str),
                default: None,
            },
        );
        let sink = MemorySink::new();
        let document = fill(
            &["typed", "free"],
            &["7", "7"],
            false,
            true,
            config,
            &sink,
        );
        assert_eq!(document, json!({"typed": "7", "free": 7}));
    }

    #[test]
    fn structural_mismatch_warns_without_dropping_the_record() {
        let names = header(&["a_b", "d"]);
        let config = FieldConfig::new();
        let context = FillContext {
            header: &names,
            delimiter: "_",
            keep_empty: false,
            infer_types: false,
            config: &config,
        };
        let sink = MemorySink::new();
        // Hand the filler a document missing the 'a' level entirely.
        let document = fill_document(&context, &cells(&["1", "x"]), json!({"d": null}), &sink);
        assert_eq!(document, json!({"d": "x"}));
        let messages = sink.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("'a_b'"));
    }
}
