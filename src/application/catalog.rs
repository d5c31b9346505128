//! Named shapes from configuration and `Name=path` bindings.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, JsonMix};
use crate::config::Settings;
use crate::domain::{PathExpr, RecordFactory};

/// Record factories by shape name.
#[derive(Debug, Clone, Default)]
pub struct ShapeCatalog {
    shapes: BTreeMap<String, RecordFactory>,
}

impl ShapeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// One factory per `[shapes.<Name>]` table.
    pub fn from_settings(settings: &Settings) -> Self {
        let shapes = settings
            .shapes
            .iter()
            .map(|(name, cfg)| {
                (
                    name.clone(),
                    RecordFactory::new(name.clone()).with_defaults(cfg.defaults.clone()),
                )
            })
            .collect();
        Self { shapes }
    }

    pub fn insert(&mut self, factory: RecordFactory) {
        self.shapes.insert(factory.name().to_string(), factory);
    }

    pub fn get(&self, name: &str) -> Option<&RecordFactory> {
        self.shapes.get(name)
    }

    /// Configured factory, or an ad-hoc record factory named after `name`.
    pub fn resolve(&self, name: &str) -> RecordFactory {
        self.shapes
            .get(name)
            .cloned()
            .unwrap_or_else(|| RecordFactory::new(name))
    }

    /// Configured factory only.
    pub fn resolve_strict(&self, name: &str) -> ApplicationResult<&RecordFactory> {
        self.shapes
            .get(name)
            .ok_or_else(|| ApplicationError::UnknownShape(name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &RecordFactory> {
        self.shapes.values()
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

/// A `Name=path` pair: apply shape `Name` at `path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub shape: String,
    pub path: PathExpr,
}

impl Binding {
    /// Parse `Name=path`. The path may be empty (`Name=` addresses the root).
    pub fn parse(s: &str) -> ApplicationResult<Self> {
        let invalid = |reason: &str| ApplicationError::InvalidBinding {
            binding: s.to_string(),
            reason: reason.to_string(),
        };
        let (shape, path) = s.split_once('=').ok_or_else(|| invalid("expected Name=path"))?;
        let shape = shape.trim();
        if shape.is_empty() {
            return Err(invalid("shape name is empty"));
        }
        Ok(Self {
            shape: shape.to_string(),
            path: PathExpr::parse(path.trim()),
        })
    }
}

impl FromStr for Binding {
    type Err = ApplicationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.shape, self.path)
    }
}

/// Ordered list of bindings, applied left to right.
#[derive(Debug, Clone, Default)]
pub struct MixPlan {
    bindings: Vec<Binding>,
    strict_shapes: bool,
}

/// Per-binding outcome of a plan run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingOutcome {
    pub binding: Binding,
    pub mixed: usize,
}

impl MixPlan {
    pub fn new(bindings: Vec<Binding>) -> Self {
        Self {
            bindings,
            strict_shapes: false,
        }
    }

    /// Parse every `Name=path` string, failing on the first invalid one.
    pub fn parse<S: AsRef<str>>(specs: &[S]) -> ApplicationResult<Self> {
        let bindings = specs
            .iter()
            .map(|s| Binding::parse(s.as_ref()))
            .collect::<ApplicationResult<Vec<_>>>()?;
        Ok(Self::new(bindings))
    }

    /// Require every binding to name a configured shape.
    pub fn with_strict_shapes(mut self, strict: bool) -> Self {
        self.strict_shapes = strict;
        self
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Apply all bindings onto `mix`, in order.
    #[instrument(level = "debug", skip_all, fields(bindings = self.bindings.len()))]
    pub fn run(&self, catalog: &ShapeCatalog, mix: &mut JsonMix) -> ApplicationResult<Vec<BindingOutcome>> {
        let mut outcomes = Vec::with_capacity(self.bindings.len());
        for binding in &self.bindings {
            let factory = if self.strict_shapes {
                catalog.resolve_strict(&binding.shape)?.clone()
            } else {
                catalog.resolve(&binding.shape)
            };
            let before = mix.report().mixed_count();
            let after = mix.apply(&factory, &binding.path).mixed_count();
            debug!(binding = %binding, mixed = after - before, "binding applied");
            outcomes.push(BindingOutcome {
                binding: binding.clone(),
                mixed: after - before,
            });
        }
        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binding_splits_on_first_equals() {
        let b = Binding::parse("Employee=employees.*").unwrap();
        assert_eq!(b.shape, "Employee");
        assert_eq!(b.path, PathExpr::parse("employees.*"));
        assert_eq!(b.to_string(), "Employee=employees.*");
    }

    #[test]
    fn test_binding_with_empty_path_targets_root() {
        let b = Binding::parse("Company=").unwrap();
        assert!(b.path.is_root());
    }

    #[test]
    fn test_binding_rejects_missing_separator_and_empty_name() {
        assert!(matches!(
            Binding::parse("Employee"),
            Err(ApplicationError::InvalidBinding { .. })
        ));
        assert!(matches!(
            Binding::parse(" =a.b"),
            Err(ApplicationError::InvalidBinding { .. })
        ));
    }

    #[test]
    fn test_inserted_factory_is_resolved_strictly() {
        let mut catalog = ShapeCatalog::new();
        let defaults = serde_json::json!({"active": true});
        catalog.insert(
            RecordFactory::new("Employee").with_defaults(defaults.as_object().cloned().unwrap()),
        );

        assert_eq!(catalog.len(), 1);
        let factory = catalog.resolve_strict("Employee").unwrap();
        assert_eq!(factory.defaults().get("active"), Some(&serde_json::json!(true)));
        assert_eq!(catalog.get("Employee"), Some(factory));
    }

    #[test]
    fn test_resolve_falls_back_to_bare_record() {
        let catalog = ShapeCatalog::new();
        assert_eq!(catalog.resolve("Ghost").name(), "Ghost");
        assert!(matches!(
            catalog.resolve_strict("Ghost"),
            Err(ApplicationError::UnknownShape(name)) if name == "Ghost"
        ));
    }
}
