//! Global config file source: $XDG_CONFIG_HOME/tagtree/config.toml or ~/.config/tagtree/config.toml

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::File;
use std::path::PathBuf;
use tracing::debug;

/// Path to global config file.
pub fn global_config_path() -> Option<PathBuf> {
    let config_home = match std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        Some(dir) => PathBuf::from(dir),
        None => directories::BaseDirs::new()?.home_dir().join(".config"),
    };
    Some(config_home.join("tagtree").join("config.toml"))
}

/// Add global config file source to builder if it exists.
pub fn add_to_builder(
    mut builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    if let Some(xdg_config_path) = global_config_path() {
        if xdg_config_path.exists() {
            let canonical_xdg_path = dunce::canonicalize(&xdg_config_path)
                .unwrap_or_else(|_| xdg_config_path.clone());
            builder = builder.add_source(File::from(canonical_xdg_path.as_path()).required(false));
        } else {
            debug!(
                config_path = %xdg_config_path.display(),
                "No user configuration file"
            );
        }
    }
    Ok(builder)
}
