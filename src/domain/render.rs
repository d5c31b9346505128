//! Rendering of mixed trees: JSON with an optional shape tag, or a termtree view.

use serde_json::{Map, Value};
use termtree::Tree;
use tracing::instrument;

use crate::domain::node::{Fields, Node};

/// How mixed nodes show up in rendered JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Key receiving the shape name on every mixed node; `None` renders plain data.
    pub tag_key: Option<String>,
}

impl RenderOptions {
    pub fn tagged(tag_key: impl Into<String>) -> Self {
        Self {
            tag_key: Some(tag_key.into()),
        }
    }
}

/// Render a tree to JSON.
///
/// The tag is inserted first so it leads the object; a source field with the same
/// name is kept and wins.
pub fn to_json(node: &Node, options: &RenderOptions) -> Value {
    match (node, options.tag_key.as_deref()) {
        (Node::Mixed(shape), Some(tag)) => {
            let mut map = Map::new();
            map.insert(tag.to_string(), Value::String(shape.shape_name().to_string()));
            extend(&mut map, shape.fields(), options);
            Value::Object(map)
        }
        (Node::Mixed(shape), None) => {
            let mut map = Map::new();
            extend(&mut map, shape.fields(), options);
            Value::Object(map)
        }
        (Node::Object(fields), _) => {
            let mut map = Map::new();
            extend(&mut map, fields, options);
            Value::Object(map)
        }
        (Node::Array(items), _) => {
            Value::Array(items.iter().map(|item| to_json(item, options)).collect())
        }
        (scalar, _) => scalar.to_json(),
    }
}

fn extend(map: &mut Map<String, Value>, fields: &Fields, options: &RenderOptions) {
    for (k, v) in fields {
        map.insert(k.clone(), to_json(v, options));
    }
}

/// Build a termtree view: containers become branches, scalars become `key: value` leaves,
/// mixed nodes are labeled with their shape name.
#[instrument(level = "trace", skip(node))]
pub fn to_tree(label: &str, node: &Node) -> Tree<String> {
    match node {
        Node::Mixed(shape) => {
            Tree::new(format!("{} <{}>", label, shape.shape_name())).with_leaves(field_leaves(shape.fields()))
        }
        Node::Object(fields) => Tree::new(label.to_string()).with_leaves(field_leaves(fields)),
        Node::Array(items) => Tree::new(format!("{} [{}]", label, items.len())).with_leaves(
            items
                .iter()
                .enumerate()
                .map(|(i, item)| to_tree(&format!("[{}]", i), item)),
        ),
        scalar => Tree::new(format!("{}: {}", label, scalar.to_json())),
    }
}

fn field_leaves(fields: &Fields) -> Vec<Tree<String>> {
    fields.iter().map(|(k, v)| to_tree(k, v)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::resolver::apply_shape;
    use crate::domain::shape::RecordFactory;
    use crate::domain::PathExpr;
    use serde_json::json;

    fn mixed_sample() -> Node {
        let mut node = Node::from(json!({"lead": {"name": "Sam"}, "size": 3}));
        apply_shape(&RecordFactory::new("Person"), &PathExpr::parse("lead"), &mut node);
        node
    }

    #[test]
    fn test_tag_only_on_mixed_nodes() {
        let rendered = to_json(&mixed_sample(), &RenderOptions::tagged("$shape"));
        assert_eq!(
            rendered,
            json!({"lead": {"$shape": "Person", "name": "Sam"}, "size": 3})
        );
    }

    #[test]
    fn test_untagged_render_is_plain_data() {
        let node = mixed_sample();
        assert_eq!(to_json(&node, &RenderOptions::default()), node.to_json());
    }

    #[test]
    fn test_source_field_wins_over_tag() {
        let mut node = Node::from(json!({"kind": "data"}));
        apply_shape(&RecordFactory::new("Kind"), &PathExpr::root(), &mut node);
        let rendered = to_json(&node, &RenderOptions::tagged("kind"));
        assert_eq!(rendered, json!({"kind": "data"}));
    }

    #[test]
    fn test_tree_labels_shapes() {
        let rendered = to_tree("$", &mixed_sample()).to_string();
        assert!(rendered.contains("lead <Person>"));
        assert!(rendered.contains("name: \"Sam\""));
        assert!(rendered.contains("size: 3"));
    }
}
