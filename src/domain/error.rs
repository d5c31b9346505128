//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::path::Location;

/// Domain errors represent violations of the tree rewriting rules.
/// These are independent of I/O and configuration concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("cannot mix {found} at {location}: not a field-bearing object")]
    MalformedMixTarget {
        location: Location,
        found: &'static str,
    },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
