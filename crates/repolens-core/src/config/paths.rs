//! Config path resolution helpers.

use std::path::{Path, PathBuf};

/// File name of the query definition.
pub const CONFIG_FILE_NAME: &str = "repolens.toml";

/// Location of the configuration inside a given config directory.
pub fn config_path_in(config_dir: &Path) -> PathBuf {
    config_dir.join("repolens").join(CONFIG_FILE_NAME)
}

/// Default configuration location, e.g. `~/.config/repolens/repolens.toml`.
pub fn default_config_path() -> anyhow::Result<PathBuf> {
    let base = dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    Ok(config_path_in(&base))
}

/// Resolve an explicit path or fall back to the default one.
pub fn resolve_config_path(explicit: Option<&Path>) -> anyhow::Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => default_config_path(),
    }
}
