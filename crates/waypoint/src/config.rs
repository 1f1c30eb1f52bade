// File: src/config.rs
// Purpose: Configuration parsing from waypoint.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub router: RouterConfig,

    #[serde(default)]
    pub page: PageConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

/// Where the application lives on the web.
///
/// `protocol` keeps its trailing colon (`"https:"`), matching what a browser
/// reports for `location.protocol`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RouterConfig {
    #[serde(default = "default_protocol")]
    pub protocol: String,

    #[serde(default = "default_router_host")]
    pub host: String,

    /// Application root path prefix (e.g. "/app")
    #[serde(default)]
    pub root: String,

    /// Language prefix placed after the root (e.g. "/en")
    #[serde(default)]
    pub language_part_path: String,
}

/// How mixed-in extensions may touch page state
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    /// Reject the whole write and report an error
    #[default]
    Strict,
    /// Drop the offending keys, warn, and apply the rest
    Lenient,
}

/// Page lifecycle configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageConfig {
    /// Number of state snapshots kept in the page state history
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    #[serde(default)]
    pub validation: ValidationMode,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,
}

// Default values
fn default_protocol() -> String {
    "http:".to_string()
}

fn default_router_host() -> String {
    "localhost:3000".to_string()
}

fn default_history_limit() -> usize {
    10
}

fn default_port() -> u16 {
    3000
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

// Default implementations
impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            protocol: default_protocol(),
            host: default_router_host(),
            root: String::new(),
            language_part_path: String::new(),
        }
    }
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
            validation: ValidationMode::Strict,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

impl RouterConfig {
    /// Build a config for `protocol` and `host` with no path prefixes
    pub fn new(protocol: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            protocol: protocol.into(),
            host: host.into(),
            ..Self::default()
        }
    }

    pub fn with_root(mut self, root: impl Into<String>) -> Self {
        self.root = root.into();
        self
    }

    pub fn with_language_part_path(mut self, language_part_path: impl Into<String>) -> Self {
        self.language_part_path = language_part_path.into();
        self
    }
}

impl Config {
    /// Load configuration from waypoint.toml
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        Ok(config)
    }

    /// Load configuration from default path (./waypoint.toml)
    pub fn load_default() -> Result<Self> {
        Self::load("waypoint.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.router.protocol, "http:");
        assert_eq!(config.router.root, "");
        assert_eq!(config.page.history_limit, 10);
        assert_eq!(config.page.validation, ValidationMode::Strict);
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_empty_config() {
        let config = toml::from_str::<Config>("").unwrap_or_default();
        assert_eq!(config.page.history_limit, 10);
        assert_eq!(config.router.host, "localhost:3000");
    }

    #[test]
    fn test_custom_sections() {
        let toml = r#"
            [router]
            protocol = "https:"
            host = "example.com"
            root = "/app"
            language_part_path = "/en"

            [page]
            history_limit = 3
            validation = "lenient"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.router.protocol, "https:");
        assert_eq!(config.router.root, "/app");
        assert_eq!(config.router.language_part_path, "/en");
        assert_eq!(config.page.history_limit, 3);
        assert_eq!(config.page.validation, ValidationMode::Lenient);
        assert_eq!(config.server.host, "127.0.0.1");
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = Config::load("does/not/exist/waypoint.toml").unwrap();
        assert_eq!(config.page.history_limit, 10);
    }
}
