//! jsonmix: turn plain JSON data into typed shapes at dotted path locations.
//!
//! ```
//! use jsonmix::{JsonMix, Record};
//!
//! let doc = JsonMix::from_json_str(r#"{"people": [{"name": "ann"}, {"name": "bob"}]}"#)
//!     .unwrap()
//!     .with_shape::<Record>("people.*")
//!     .build();
//! assert!(doc.get("people").and_then(|p| p.get("1")).unwrap().is_mixed());
//! ```

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;

pub use application::{ApplicationError, ApplicationResult, JsonMix};
pub use domain::{
    apply_shape, factory, locate, mix, mix_node, Fields, MixReport, Node, PathExpr, Record,
    RecordFactory, Shape, ShapeFactory,
};
