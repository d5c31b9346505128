//! Data tree nodes.
//!
//! The input document is untyped: every position is a mapping, a sequence or a
//! scalar. [`Node`] models that as a tagged variant, plus [`Node::Mixed`] for
//! positions that have been replaced by a shape instance.

use std::fmt;

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_json::{Number, Value};

use crate::domain::path::Step;
use crate::domain::shape::Shape;

/// Insertion-ordered field bag of a mapping or a shape instance.
pub type Fields = IndexMap<String, Node>;

/// A node of the data tree.
pub enum Node {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<Node>),
    /// Plain mapping, as parsed from JSON.
    Object(Fields),
    /// Shape instance that replaced a plain mapping.
    Mixed(Box<dyn Shape>),
}

impl Node {
    /// Kind name used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Null => "null",
            Node::Bool(_) => "boolean",
            Node::Number(_) => "number",
            Node::String(_) => "string",
            Node::Array(_) => "array",
            Node::Object(_) => "object",
            Node::Mixed(_) => "shape",
        }
    }

    /// Mapping, sequence or shape instance: something a path can descend into.
    pub fn is_object_like(&self) -> bool {
        matches!(self, Node::Array(_) | Node::Object(_) | Node::Mixed(_))
    }

    pub fn is_mixed(&self) -> bool {
        matches!(self, Node::Mixed(_))
    }

    /// Own fields of a plain mapping or of a shape instance.
    pub fn fields(&self) -> Option<&Fields> {
        match self {
            Node::Object(fields) => Some(fields),
            Node::Mixed(shape) => Some(shape.fields()),
            _ => None,
        }
    }

    pub fn fields_mut(&mut self) -> Option<&mut Fields> {
        match self {
            Node::Object(fields) => Some(fields),
            Node::Mixed(shape) => Some(shape.fields_mut()),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Node>> {
        match self {
            Node::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_shape(&self) -> Option<&dyn Shape> {
        match self {
            Node::Mixed(shape) => Some(shape.as_ref()),
            _ => None,
        }
    }

    pub fn as_shape_mut(&mut self) -> Option<&mut dyn Shape> {
        match self {
            Node::Mixed(shape) => Some(shape.as_mut()),
            _ => None,
        }
    }

    /// Downcast a mixed node to the concrete shape type.
    pub fn downcast_ref<T: Shape>(&self) -> Option<&T> {
        self.as_shape().and_then(|s| s.as_any().downcast_ref::<T>())
    }

    pub fn downcast_mut<T: Shape>(&mut self) -> Option<&mut T> {
        self.as_shape_mut()
            .and_then(|s| s.as_any_mut().downcast_mut::<T>())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Node::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Node::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    /// Child addressed by a literal key.
    ///
    /// On a sequence, a decimal key addresses the element at that index.
    pub fn get(&self, key: &str) -> Option<&Node> {
        match self {
            Node::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => self.fields().and_then(|f| f.get(key)),
        }
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Node> {
        match self {
            Node::Array(items) => match key.parse::<usize>() {
                Ok(i) => items.get_mut(i),
                Err(_) => None,
            },
            _ => self.fields_mut().and_then(|f| f.get_mut(key)),
        }
    }

    /// The concrete step used to reach the child addressed by `key`.
    pub(crate) fn step_for(&self, key: &str) -> Step {
        match (self, key.parse::<usize>()) {
            (Node::Array(_), Ok(i)) => Step::Index(i),
            _ => Step::Key(key.to_string()),
        }
    }

    /// Render back to plain JSON. Shape instances become their field maps.
    pub fn to_json(&self) -> Value {
        match self {
            Node::Null => Value::Null,
            Node::Bool(b) => Value::Bool(*b),
            Node::Number(n) => Value::Number(n.clone()),
            Node::String(s) => Value::String(s.clone()),
            Node::Array(items) => Value::Array(items.iter().map(Node::to_json).collect()),
            Node::Object(fields) => fields_to_json(fields),
            Node::Mixed(shape) => fields_to_json(shape.fields()),
        }
    }
}

fn fields_to_json(fields: &Fields) -> Value {
    Value::Object(
        fields
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect(),
    )
}

impl Default for Node {
    fn default() -> Self {
        Node::Null
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Null => write!(f, "Null"),
            Node::Bool(b) => write!(f, "Bool({:?})", b),
            Node::Number(n) => write!(f, "Number({})", n),
            Node::String(s) => write!(f, "String({:?})", s),
            Node::Array(items) => f.debug_tuple("Array").field(items).finish(),
            Node::Object(fields) => f.debug_tuple("Object").field(fields).finish(),
            Node::Mixed(shape) => f
                .debug_tuple("Mixed")
                .field(&shape.shape_name())
                .field(shape.fields())
                .finish(),
        }
    }
}

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Node::Null,
            Value::Bool(b) => Node::Bool(b),
            Value::Number(n) => Node::Number(n),
            Value::String(s) => Node::String(s),
            Value::Array(items) => Node::Array(items.into_iter().map(Node::from).collect()),
            Value::Object(map) => {
                Node::Object(map.into_iter().map(|(k, v)| (k, Node::from(v))).collect())
            }
        }
    }
}

impl From<Fields> for Node {
    fn from(fields: Fields) -> Self {
        Node::Object(fields)
    }
}

impl From<Box<dyn Shape>> for Node {
    fn from(shape: Box<dyn Shape>) -> Self {
        Node::Mixed(shape)
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Node::String(s.to_string())
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Node::String(s)
    }
}

impl From<i32> for Node {
    fn from(n: i32) -> Self {
        Node::Number(n.into())
    }
}

impl From<i64> for Node {
    fn from(n: i64) -> Self {
        Node::Number(n.into())
    }
}

impl From<bool> for Node {
    fn from(b: bool) -> Self {
        Node::Bool(b)
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Null => serializer.serialize_unit(),
            Node::Bool(b) => serializer.serialize_bool(*b),
            Node::Number(n) => n.serialize(serializer),
            Node::String(s) => serializer.serialize_str(s),
            Node::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Node::Object(fields) => serialize_fields(fields, serializer),
            Node::Mixed(shape) => serialize_fields(shape.fields(), serializer),
        }
    }
}

fn serialize_fields<S: Serializer>(fields: &Fields, serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(fields.len()))?;
    for (k, v) in fields {
        map.serialize_entry(k, v)?;
    }
    map.end()
}
