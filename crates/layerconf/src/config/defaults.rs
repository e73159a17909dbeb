//! Default values used when resolving and loading configuration.

use std::path::PathBuf;

/// Boolean key selecting the development logging preset.
pub const DEBUG_KEY: &str = "debug";

/// Extension of config files and conf.d fragments.
pub const CONFIG_EXTENSION: &str = "toml";

/// Returns the conventional file name for a project (`<project>.toml`).
///
/// Used as the save target when no search path holds a config file.
pub fn default_filename(project: &str) -> PathBuf {
    PathBuf::from(format!("{project}.{CONFIG_EXTENSION}"))
}

/// Returns the directories searched for `<project>.toml`, in order.
///
/// `$HOME/.config` is skipped when the home directory cannot be determined.
pub fn default_search_paths(project: &str) -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("./artifacts"), PathBuf::from("./test")];

    match dirs::home_dir() {
        Some(home) => paths.push(home.join(".config")),
        None => tracing::debug!(
            event = "layerconf.defaults.home_dir_not_found",
            "Could not determine home directory - skipping $HOME/.config"
        ),
    }

    paths.extend([
        PathBuf::from("/etc"),
        PathBuf::from(format!("/etc/{project}")),
        PathBuf::from(format!("/usr/local/{project}/etc")),
        PathBuf::from("/run/secrets"),
        PathBuf::from("."),
    ]);
    paths
}
