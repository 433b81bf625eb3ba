use std::path::{Path, PathBuf};

use proptrans::{DEFAULT_NO_LOCALIZE_PREFIX, PairOptions, ReadOptions};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Looked up in the working directory when `--config` is not given.
pub const CONFIG_FILE_NAME: &str = "proptrans.toml";

/// Settings read from `proptrans.toml`. Every field is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Keys starting with this prefix are read-only in the destination.
    pub no_localize_prefix: String,
    /// Fail on malformed `\uXXXX` escapes.
    pub strict_escapes: bool,
    /// Column width for `view` without `--full`.
    pub truncate: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            no_localize_prefix: DEFAULT_NO_LOCALIZE_PREFIX.to_string(),
            strict_escapes: false,
            truncate: 40,
        }
    }
}

impl Config {
    /// Load configuration from `path`.
    pub fn load(path: &Path) -> Result<Config, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file {}: {}", path.display(), e))?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            proptrans::Error::Config(format!("{}: {}", path.display(), e)).to_string()
        })?;
        debug!(path = %path.display(), ?config, "loaded configuration");
        Ok(config)
    }

    /// The explicit file if given, else `./proptrans.toml` if present, else defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Config, String> {
        match explicit {
            Some(path) => Config::load(path),
            None => {
                let default_path = PathBuf::from(CONFIG_FILE_NAME);
                if default_path.is_file() {
                    Config::load(&default_path)
                } else {
                    Ok(Config::default())
                }
            }
        }
    }

    pub fn pair_options(&self) -> PairOptions {
        PairOptions::new()
            .with_no_localize_prefix(self.no_localize_prefix.clone())
            .with_read_options(ReadOptions::new().with_strict_escapes(self.strict_escapes))
    }
}
