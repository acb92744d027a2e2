//! Resolver constants, overridable for fixtures and non-default layouts.

use std::path::PathBuf;

/// Default per-directory rule file name.
pub const DEFAULT_CONFIG_FILE_NAME: &str = ".action-notify-on-change.yaml";

/// Default stop-boundary marker (the repository metadata directory).
pub const DEFAULT_STOP_MARKER: &str = ".git";

/// Where and how ancestor traversal looks for rule files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverSettings {
    /// Rule file name joined onto every level's directory.
    pub config_file_name: String,
    /// Entry whose presence in a directory stops the ascent after that level.
    pub stop_marker: String,
    /// Local checkout the changed paths are relative to. Only used to probe
    /// for the stop marker.
    pub workspace_root: PathBuf,
}

impl ResolverSettings {
    pub fn new(workspace_root: impl Into<PathBuf>) -> Self {
        Self {
            workspace_root: workspace_root.into(),
            ..Self::default()
        }
    }

    pub fn with_config_file_name(mut self, name: impl Into<String>) -> Self {
        self.config_file_name = name.into();
        self
    }

    pub fn with_stop_marker(mut self, marker: impl Into<String>) -> Self {
        self.stop_marker = marker.into();
        self
    }
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            config_file_name: DEFAULT_CONFIG_FILE_NAME.to_string(),
            stop_marker: DEFAULT_STOP_MARKER.to_string(),
            workspace_root: PathBuf::from("."),
        }
    }
}
