//! Merge rules: defaults, override order, conflict handling.

use config::Config;
use config::ConfigBuilder;
use config::ConfigError;
use config::Environment;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("library.roots", Vec::<String>::new())?
        .set_default("library.scan.ignore_patterns", vec![".git", ".thumbnails"])?
        .set_default("library.scan.skip_hidden", true)?
        .set_default("logging.enabled", true)?
        .set_default("logging.level", "warn")?
        .set_default("logging.format", "text")?
        .set_default("logging.output", "stderr")
}

/// Highest-precedence source: `TAGTREE__SECTION__KEY` environment variables.
/// `TAGTREE__LIBRARY__ROOTS` takes a comma-separated list.
pub fn environment() -> Environment {
    Environment::with_prefix("TAGTREE")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("library.roots")
        .with_list_parse_key("library.scan.ignore_patterns")
}
