//! Centralized path helpers for config, cache, and data directories.

use std::path::PathBuf;

use crate::core::app;

/// Project directories (config, cache, data) from the standard platform locations.
pub fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("io", "pocketfeed", app::NAME)
}

/// Override data dir for tests via env var. Set `TEST_DATA_DIR` before update-state operations.
#[cfg(test)]
fn test_data_dir_override() -> Option<PathBuf> {
    std::env::var("TEST_DATA_DIR").ok().map(PathBuf::from)
}

/// Config directory (~/.config/pocketfeed/).
pub fn config_dir() -> Option<PathBuf> {
    project_dirs().map(|d| d.config_dir().to_path_buf())
}

/// Cache directory (~/.cache/pocketfeed/).
pub fn cache_dir() -> Option<PathBuf> {
    project_dirs().map(|d| d.cache_dir().to_path_buf())
}

/// Data directory for update state (~/.local/share/pocketfeed/).
/// In tests, set `TEST_DATA_DIR` env var to override.
pub fn data_dir() -> Option<PathBuf> {
    #[cfg(test)]
    if let Some(p) = test_data_dir_override() {
        return Some(p);
    }
    project_dirs().map(|d| d.data_dir().to_path_buf())
}
