//! Document structure template inferred from the flat header.
//!
//! Splitting every header name on the nesting delimiter yields field paths;
//! the [`Template`] is the one tree all output documents share the shape of,
//! built once per run and instantiated fresh for every record. Nodes are
//! tagged branch-or-leaf so a header where one field path is a strict prefix
//! of another (`a` next to `a_b`) is caught here instead of one field
//! silently overwriting the other during filling.

use std::collections::{BTreeMap, btree_map::Entry};

use anyhow::{Result, bail};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Branch(BTreeMap<String, Node>),
    Leaf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    root: BTreeMap<String, Node>,
}

pub fn split_path<'a>(name: &'a str, delimiter: &str) -> Vec<&'a str> {
    name.split(delimiter).collect()
}

impl Template {
    /// Builds the template from the full header. Field names are inserted in
    /// sorted order, grouping shared prefixes; the tree itself is ordered, so
    /// sorting only affects which of two colliding fields gets reported as
    /// pre-existing.
    pub fn build(header: &[String], delimiter: &str) -> Result<Self> {
        if delimiter.is_empty() {
            bail!("Nesting delimiter cannot be empty");
        }
        let mut names: Vec<&String> = header.iter().collect();
        names.sort();
        let mut root = BTreeMap::new();
        for name in names {
            insert_path(&mut root, name, delimiter)?;
        }
        Ok(Self { root })
    }

    /// Produces an independent document instance: branches become objects,
    /// leaves become null placeholders awaiting assignment.
    pub fn instantiate(&self) -> Value {
        fn instantiate_map(nodes: &BTreeMap<String, Node>) -> Value {
            let mut map = Map::new();
            for (key, node) in nodes {
                let value = match node {
                    Node::Branch(children) => instantiate_map(children),
                    Node::Leaf => Value::Null,
                };
                map.insert(key.clone(), value);
            }
            Value::Object(map)
        }
        instantiate_map(&self.root)
    }

    pub fn leaf_count(&self) -> usize {
        fn count(nodes: &BTreeMap<String, Node>) -> usize {
            nodes
                .values()
                .map(|node| match node {
                    Node::Branch(children) => count(children),
                    Node::Leaf => 1,
                })
                .sum()
        }
        count(&self.root)
    }
}

fn insert_path(root: &mut BTreeMap<String, Node>, name: &str, delimiter: &str) -> Result<()> {
    let segments = split_path(name, delimiter);
    let mut current = root;
    for (idx, segment) in segments.iter().enumerate() {
        let last = idx + 1 == segments.len();
        if last {
            match current.entry((*segment).to_string()) {
                Entry::Vacant(slot) => {
                    slot.insert(Node::Leaf);
                }
                // Duplicate header names collapse to one leaf.
                Entry::Occupied(slot) if matches!(slot.get(), Node::Leaf) => {}
                Entry::Occupied(_) => {
                    bail!(
                        "Field '{name}' collides with a longer field sharing the same prefix; \
                         one field path may not be a prefix of another"
                    );
                }
            }
        } else {
            let node = current
                .entry((*segment).to_string())
                .or_insert_with(|| Node::Branch(BTreeMap::new()));
            match node {
                Node::Branch(children) => current = children,
                Node::Leaf => {
                    let prefix = segments[..=idx].join(delimiter);
                    bail!(
                        "Field '{name}' collides with field '{prefix}'; \
                         one field path may not be a prefix of another"
                    );
                }
            }
        }
    }
    Ok(())
}
