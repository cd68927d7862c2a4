use csv_nest::structure::Template;
use proptest::prelude::*;
use serde_json::Value;

fn is_strict_prefix(shorter: &[String], longer: &[String]) -> bool {
    shorter.len() < longer.len() && longer[..shorter.len()] == *shorter
}

/// Keeps a generated path only while the set stays duplicate- and prefix-free,
/// since prefix collisions are rejected by design.
fn prefix_free(paths: Vec<Vec<String>>) -> Vec<Vec<String>> {
    let mut kept: Vec<Vec<String>> = Vec::new();
    for path in paths {
        let conflict = kept.iter().any(|existing| {
            existing == &path
                || is_strict_prefix(existing, &path)
                || is_strict_prefix(&path, existing)
        });
        if !conflict {
            kept.push(path);
        }
    }
    kept
}

fn leaf_reachable(document: &Value, segments: &[String]) -> bool {
    let mut current = document;
    for segment in &segments[..segments.len() - 1] {
        match current.get(segment) {
            Some(child) if child.is_object() => current = child,
            _ => return false,
        }
    }
    matches!(current.get(&segments[segments.len() - 1]), Some(Value::Null))
}

fn path_strategy() -> impl Strategy<Value = Vec<Vec<String>>> {
    proptest::collection::vec(
        proptest::collection::vec("[a-z]{1,6}", 1..4),
        1..8,
    )
}

proptest! {
    #[test]
    fn every_header_field_reaches_a_leaf(paths in path_strategy()) {
        let paths = prefix_free(paths);
        prop_assume!(!paths.is_empty());
        let header: Vec<String> = paths.iter().map(|p| p.join("_")).collect();

        let template = Template::build(&header, "_").expect("prefix-free header builds");
        let document = template.instantiate();
        for path in &paths {
            prop_assert!(leaf_reachable(&document, path), "unreachable field {path:?}");
        }
        prop_assert_eq!(template.leaf_count(), paths.len());
    }

    #[test]
    fn building_twice_yields_identical_templates(paths in path_strategy()) {
        let paths = prefix_free(paths);
        prop_assume!(!paths.is_empty());
        let header: Vec<String> = paths.iter().map(|p| p.join("_")).collect();

        let first = Template::build(&header, "_").expect("build");
        let second = Template::build(&header, "_").expect("build again");
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.instantiate(), second.instantiate());
    }

    #[test]
    fn adding_a_strict_prefix_field_is_rejected(paths in path_strategy()) {
        let paths = prefix_free(paths);
        let Some(deep) = paths.iter().find(|p| p.len() >= 2) else {
            return Ok(());
        };
        let mut header: Vec<String> = paths.iter().map(|p| p.join("_")).collect();
        header.push(deep[..1].join("_"));
        prop_assert!(Template::build(&header, "_").is_err());
    }
}
