//! Service container for dependency injection
//!
//! Wires settings, filesystem and shape catalog together for the commands.

use std::sync::Arc;

use crate::application::ShapeCatalog;
use crate::config::Settings;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};

/// Container holding everything a command needs.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Shapes defined in settings
    pub catalog: ShapeCatalog,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(settings, Arc::new(RealFileSystem))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(settings: Settings, fs: Arc<dyn FileSystem>) -> Self {
        let catalog = ShapeCatalog::from_settings(&settings);
        let settings = Arc::new(settings);

        Self {
            settings,
            fs,
            catalog,
        }
    }
}
