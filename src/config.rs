use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::render::PageContext;
use crate::resolver::RootDirectory;

/// Settings read from the optional TOML config file.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Page title shown in the header and the browser tab
    #[serde(default = "default_title")]
    pub title: String,

    /// URL prefix the browse routes are mounted under
    #[serde(default = "default_browse_prefix")]
    pub browse_prefix: String,
}

fn default_title() -> String {
    "File Browser".to_string()
}

fn default_browse_prefix() -> String {
    "/browse".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title: default_title(),
            browse_prefix: default_browse_prefix(),
        }
    }
}

impl Config {
    /// Load config from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let mut config: Config = toml::from_str(content)?;
        config.browse_prefix = normalize_prefix(&config.browse_prefix)?;
        Ok(config)
    }

    pub fn page_context(&self) -> PageContext {
        PageContext {
            title: self.title.clone(),
            browse_prefix: self.browse_prefix.clone(),
        }
    }
}

/// Routes mounted next to the browse prefix, which the prefix must not shadow.
const RESERVED_ROUTES: &[&str] = &["/health"];

/// `/browse/` -> `/browse`. The prefix must be a non-root absolute URL path
/// made of literal segments, distinct from the other top-level routes.
fn normalize_prefix(prefix: &str) -> Result<String, ConfigError> {
    let trimmed = prefix.trim().trim_end_matches('/');
    if !trimmed.starts_with('/')
        || trimmed.len() < 2
        || trimmed.contains("//")
        || trimmed.contains(['{', '}', '*'])
        || RESERVED_ROUTES.contains(&trimmed)
    {
        return Err(ConfigError::InvalidPrefix(prefix.to_string()));
    }
    Ok(trimmed.to_string())
}

/// Validate the directory to serve and turn it into a [`RootDirectory`].
pub fn open_root(path: &Path) -> Result<RootDirectory, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::RootMissing(path.display().to_string()));
    }
    if !path.is_dir() {
        return Err(ConfigError::RootNotDirectory(path.display().to_string()));
    }
    let canonical = path.canonicalize()?;
    Ok(RootDirectory::new(canonical)?)
}
