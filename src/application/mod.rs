//! Application layer: fluent builder, shape catalog and bindings
//!
//! This layer orchestrates domain logic; it does no terminal I/O.

pub mod catalog;
pub mod error;
pub mod jsonmix;

pub use catalog::{Binding, BindingOutcome, MixPlan, ShapeCatalog};
pub use error::{ApplicationError, ApplicationResult};
pub use jsonmix::JsonMix;
