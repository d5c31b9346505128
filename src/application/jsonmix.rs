//! Fluent entry point: load data once, apply shapes path by path, take the result.

use serde_json::Value;
use tracing::{debug, instrument};

use crate::application::ApplicationResult;
use crate::domain::{apply_shape, factory, MixReport, Node, PathExpr, Shape, ShapeFactory};

/// Builder sequencing shape applications over one data tree.
///
/// Each [`with_object`](JsonMix::with_object) sees the tree as left by the
/// previous one.
///
/// ```
/// use jsonmix::application::JsonMix;
/// use jsonmix::domain::RecordFactory;
///
/// let tree = JsonMix::from_json_str(r#"{"employees": [{"name": "A"}, {"name": "B"}]}"#)
///     .unwrap()
///     .with_object(&RecordFactory::new("Employee"), "employees.*")
///     .build();
///
/// let employees = tree.get("employees").and_then(|n| n.as_array()).unwrap();
/// assert!(employees.iter().all(|e| e.is_mixed()));
/// ```
#[derive(Debug)]
pub struct JsonMix {
    data: Node,
    report: MixReport,
}

impl JsonMix {
    /// Wrap an already structured tree. A `null` document becomes an empty object.
    pub fn new(data: Node) -> Self {
        let data = match data {
            Node::Null => Node::Object(Default::default()),
            other => other,
        };
        Self {
            data,
            report: MixReport::default(),
        }
    }

    /// Parse JSON text. Parse failures are fatal: `ApplicationError::MalformedInput`.
    #[instrument(level = "debug", skip(json), fields(len = json.len()))]
    pub fn from_json_str(json: &str) -> ApplicationResult<Self> {
        let value: Value = serde_json::from_str(json)?;
        Ok(Self::from(value))
    }

    /// Apply `factory` at every node addressed by `path` (empty path = root).
    pub fn with_object(mut self, factory: &dyn ShapeFactory, path: &str) -> Self {
        self.apply(factory, &PathExpr::parse(path));
        self
    }

    /// [`with_object`](JsonMix::with_object) for a `Shape + Default` type.
    pub fn with_shape<T: Shape + Default>(self, path: &str) -> Self {
        self.with_object(&factory::<T>(), path)
    }

    /// Non-consuming variant used when applications are driven from a loop.
    pub fn apply(&mut self, factory: &dyn ShapeFactory, path: &PathExpr) -> &MixReport {
        let report = apply_shape(factory, path, &mut self.data);
        debug!(path = %path, mixed = report.mixed_count(), "with_object");
        self.report.merge(report);
        &self.report
    }

    /// Current tree, fully or partially mixed. Does not mutate.
    pub fn tree(&self) -> &Node {
        &self.data
    }

    /// Accumulated report of every application so far.
    pub fn report(&self) -> &MixReport {
        &self.report
    }

    pub fn build(self) -> Node {
        self.data
    }

    pub fn into_parts(self) -> (Node, MixReport) {
        (self.data, self.report)
    }
}

impl From<Node> for JsonMix {
    fn from(node: Node) -> Self {
        Self::new(node)
    }
}

impl From<Value> for JsonMix {
    fn from(value: Value) -> Self {
        Self::new(Node::from(value))
    }
}
