// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Environment variable that overrides `[server].api_token`.
pub const API_TOKEN_ENV: &str = "BATCHROUTE_API_TOKEN";

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path, apply environment overrides and
/// validate it.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let mut raw_config = load_from_path(&path)?;
    apply_env_overrides(&mut raw_config, std::env::var(API_TOKEN_ENV).ok());
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Resolve the configuration the CLI should use.
///
/// - An explicitly given path must exist.
/// - The default path is optional; when it is missing, built-in defaults
///   (plus environment overrides) are used.
pub fn load_or_default(explicit: Option<&Path>) -> Result<ConfigFile> {
    if let Some(path) = explicit {
        return load_and_validate(path);
    }

    let path = default_config_path();
    if path.is_file() {
        return load_and_validate(&path);
    }

    debug!(path = %path.display(), "no config file found; using defaults");
    let mut raw = RawConfigFile::default();
    apply_env_overrides(&mut raw, std::env::var(API_TOKEN_ENV).ok());
    ConfigFile::try_from(raw)
}

/// Non-empty token from the environment wins over the file.
pub fn apply_env_overrides(raw: &mut RawConfigFile, env_token: Option<String>) {
    if let Some(token) = env_token.filter(|t| !t.trim().is_empty()) {
        raw.server.api_token = Some(token);
    }
}

/// `Batchroute.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Batchroute.toml")
}
