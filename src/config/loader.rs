use crate::config::schema::{ValidationError, VitestifyConfig};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File looked up at the repository root when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = "vitestify.toml";

/// A config that could not be read, parsed, or validated.
///
/// `path` is `None` for configs loaded from a string.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config from {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config TOML{}: {source}", origin(.path))]
    Toml {
        path: Option<PathBuf>,
        source: toml_edit::de::Error,
    },

    #[error("invalid config{}:\n{source}", origin(.path))]
    Validation {
        path: Option<PathBuf>,
        source: ValidationError,
    },
}

fn origin(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|path| format!(" ({})", path.display()))
        .unwrap_or_default()
}

fn parse(input: &str, path: Option<&Path>) -> Result<VitestifyConfig, ConfigError> {
    let owned = || path.map(Path::to_path_buf);

    let config: VitestifyConfig = toml_edit::de::from_str(input)
        .map_err(|source| ConfigError::Toml { path: owned(), source })?;
    config
        .validate()
        .map_err(|source| ConfigError::Validation { path: owned(), source })?;
    Ok(config)
}

pub fn load_from_str(input: &str) -> Result<VitestifyConfig, ConfigError> {
    parse(input, None)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<VitestifyConfig, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&contents, Some(path))
}

/// Load `explicit` if given, else `<root>/vitestify.toml` if present, else
/// the defaults.
pub fn load_for_root(root: &Path, explicit: Option<&Path>) -> Result<VitestifyConfig, ConfigError> {
    if let Some(path) = explicit {
        return load_from_path(path);
    }

    let candidate = root.join(CONFIG_FILE_NAME);
    if candidate.is_file() {
        load_from_path(candidate)
    } else {
        Ok(VitestifyConfig::default())
    }
}
