//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/jsonmix/jsonmix.toml`
//! 3. Local config: `--config <file>`, or `./.jsonmix.toml` if present
//! 4. Environment variables: `JSONMIX_*` prefix (scalar settings only)

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::application::ApplicationError;

/// Name of the local config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = ".jsonmix.toml";

/// Default key carrying the shape name in rendered JSON.
pub const DEFAULT_TAG_KEY: &str = "$shape";

/// A named record shape defined in config.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ShapeConfig {
    /// Fields every instance starts with; copied data overwrites them.
    pub defaults: Map<String, Value>,
}

/// Raw settings for intermediate parsing (everything Option to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub tag_key: Option<String>,
    pub tag: Option<bool>,
    pub pretty: Option<bool>,
    pub strict: Option<bool>,
    pub shapes: Option<BTreeMap<String, ShapeConfig>>,
}

/// Unified configuration for jsonmix.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Key receiving the shape name on mixed nodes (default: "$shape")
    pub tag_key: String,
    /// Inject the shape tag when rendering JSON
    pub tag: bool,
    /// Pretty-print JSON output
    pub pretty: bool,
    /// Fail when an addressed node cannot be mixed or a binding matches nothing
    pub strict: bool,
    /// Named record shapes
    pub shapes: BTreeMap<String, ShapeConfig>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tag_key: DEFAULT_TAG_KEY.to_string(),
            tag: true,
            pretty: true,
            strict: false,
            shapes: BTreeMap::new(),
        }
    }
}

/// Get the XDG config directory for jsonmix.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "jsonmix").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("jsonmix.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(LOCAL_CONFIG_FILE)
}

/// Expand `~`, `$VAR` and `${VAR}` in a user-supplied path.
pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    shellexpand::full(raw.as_ref())
        .map(|s| PathBuf::from(s.into_owned()))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Merge overlay config onto self (base).
    ///
    /// - Scalar options: overlay wins if Some, otherwise keep base
    /// - Shapes: merged by name, an overlay shape replaces the base shape of the same name
    pub fn merge_with(&self, overlay: &RawSettings) -> Self {
        let mut shapes = self.shapes.clone();
        if let Some(extra) = &overlay.shapes {
            for (name, shape) in extra {
                shapes.insert(name.clone(), shape.clone());
            }
        }
        Self {
            tag_key: overlay
                .tag_key
                .clone()
                .unwrap_or_else(|| self.tag_key.clone()),
            tag: overlay.tag.unwrap_or(self.tag),
            pretty: overlay.pretty.unwrap_or(self.pretty),
            strict: overlay.strict.unwrap_or(self.strict),
            shapes,
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `config_file` - Explicit local config file (must exist). When `None`,
    ///   `./.jsonmix.toml` is used if present.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 3. Local config
        let local_path = match config_file {
            Some(path) => {
                let path = expand_path(path);
                if !path.exists() {
                    return Err(ApplicationError::Config {
                        message: format!("config file not found: {}", path.display()),
                    });
                }
                Some(path)
            }
            None => std::env::current_dir()
                .ok()
                .map(|cwd| local_config_path(&cwd))
                .filter(|p| p.exists()),
        };
        if let Some(path) = local_path {
            let raw = load_raw_settings(&path)?;
            current = current.merge_with(&raw);
        }

        // 4. Environment variables (explicit override)
        current = Self::apply_env_overrides(current)?;

        Ok(current)
    }

    /// Apply JSONMIX_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("JSONMIX")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("tag_key") {
            settings.tag_key = val;
        }
        if let Ok(val) = config.get_bool("tag") {
            settings.tag = val;
        }
        if let Ok(val) = config.get_bool("pretty") {
            settings.pretty = val;
        }
        if let Ok(val) = config.get_bool("strict") {
            settings.strict = val;
        }

        Ok(settings)
    }

    /// Shape tag to inject when rendering, if tagging is enabled.
    pub fn effective_tag_key(&self) -> Option<&str> {
        if self.tag && !self.tag_key.is_empty() {
            Some(&self.tag_key)
        } else {
            None
        }
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# jsonmix configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/jsonmix/jsonmix.toml
#   Local:  ./.jsonmix.toml or --config <file>
#   Env:    JSONMIX_* environment variables (tag_key, tag, pretty, strict)
#
# Shapes are merged by name: a local [shapes.X] table replaces a global one.

# Key receiving the shape name on mixed nodes
# tag_key = "$shape"

# Inject the shape tag into JSON output
# tag = true

# Pretty-print JSON output
# pretty = true

# Fail when an addressed node is not an object or a binding matches nothing
# strict = false

# Named shapes, used as `jsonmix apply data.json -s Employee=employees.*`
# [shapes.Employee.defaults]
# active = true
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
