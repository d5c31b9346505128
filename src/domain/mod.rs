//! Domain layer: data tree, shapes, path expressions and the resolver
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod error;
pub mod node;
pub mod path;
pub mod render;
pub mod resolver;
pub mod shape;

pub use error::{DomainError, DomainResult};
pub use node::{Fields, Node};
pub use path::{Location, PathExpr, Segment, Step};
pub use render::RenderOptions;
pub use resolver::{apply_shape, locate, mix, mix_node, MixReport, SkippedNode, Unresolved};
pub use shape::{factory, Construct, Record, RecordFactory, Shape, ShapeFactory};
