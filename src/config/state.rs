// Application state module
// Read-only state shared by every connection

use std::path::PathBuf;

use super::types::{Config, LoggingConfig};

/// Directory the request path is appended to: the process working directory
pub const DOCUMENT_ROOT: &str = ".";

/// Application state
///
/// Built once at startup and never mutated, so it is shared without locks.
#[derive(Debug)]
pub struct AppState {
    pub root: PathBuf,
    pub logging: LoggingConfig,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self::with_root(config, PathBuf::from(DOCUMENT_ROOT))
    }

    /// Create `AppState` serving files below `root`
    pub fn with_root(config: &Config, root: PathBuf) -> Self {
        Self {
            root,
            logging: config.logging.clone(),
        }
    }
}
