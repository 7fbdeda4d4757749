//! Entry points for loading configuration.

use super::merge::merge_policy;
use super::sources::{global_file, workspace_file};
use super::TagtreeConfig;
use config::{ConfigError, File};
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a workspace.
    ///
    /// Sources, lowest precedence first: built-in defaults, the user file,
    /// `<workspace>/config/config.toml`, `<workspace>/config/<TAGTREE_ENV>.toml`,
    /// `TAGTREE__*` environment variables.
    pub fn load(workspace_root: &Path) -> Result<TagtreeConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        let config: TagtreeConfig = builder
            .add_source(merge_policy::environment())
            .build()?
            .try_deserialize()?;
        debug!(workspace = %workspace_root.display(), roots = config.library.roots.len(), "Configuration loaded");
        Ok(config)
    }

    /// Load a single file on top of the defaults. The file must exist.
    pub fn load_from_file(path: &Path) -> Result<TagtreeConfig, ConfigError> {
        merge_policy::builder_with_defaults()?
            .add_source(File::from(path).required(true))
            .build()?
            .try_deserialize()
    }

    pub fn xdg_config_path() -> Option<PathBuf> {
        global_file::global_config_path()
    }

    #[allow(clippy::should_implement_trait)]
    pub fn default() -> TagtreeConfig {
        TagtreeConfig::default()
    }
}
