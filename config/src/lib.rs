//! Configuration loading and parsing for bladelint.
//!
//! Configuration is TOML, looked up in order:
//! 1. `<workspace root>/.bladelint.toml`
//! 2. `~/.bladelint/config.toml`
//!
//! The first file that exists wins; a missing configuration is not an
//! error (defaults apply), a present-but-broken one is.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use bladelint_analysis::AnalysisConfig;

/// Workspace-local configuration file name.
const WORKSPACE_CONFIG_FILE: &str = ".bladelint.toml";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
pub struct BladeConfig {
    /// Analysis engine configuration (checkers, debounce, timeout).
    pub analysis: Option<AnalysisConfig>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> &PathBuf {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

/// The home-directory configuration path, if a home directory is known.
#[must_use]
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".bladelint").join("config.toml"))
}

fn candidates(workspace_root: &Path) -> Vec<PathBuf> {
    let mut paths = vec![workspace_root.join(WORKSPACE_CONFIG_FILE)];
    if let Some(home_config) = config_path() {
        paths.push(home_config);
    }
    paths
}

/// Load configuration for a workspace.
///
/// Returns `Ok(None)` when no configuration file exists anywhere.
pub fn load(workspace_root: &Path) -> Result<Option<BladeConfig>, ConfigError> {
    for path in candidates(workspace_root) {
        if !path.is_file() {
            continue;
        }
        tracing::debug!("loading configuration from {}", path.display());
        let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let config =
            toml::from_str(&raw).map_err(|source| ConfigError::Parse { path, source })?;
        return Ok(Some(config));
    }
    Ok(None)
}
