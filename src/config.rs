//! Server configuration
//!
//! Layered with figment: built-in defaults, then an optional TOML file, then
//! `WASHD_`-prefixed environment variables (`__` separates nested keys, e.g.
//! `WASHD_GEMINI__MODEL`).

use std::net::SocketAddr;
use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::laundry::StoreOptions;

/// Default Gemini REST endpoint
pub const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default image-editing model
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash-image";

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub laundry: LaundryConfig,
    pub gemini: GeminiConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            laundry: LaundryConfig::default(),
            gemini: GeminiConfig::default(),
        }
    }
}

/// Occupancy store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LaundryConfig {
    /// Reject status updates that skip or reverse the wash cycle
    pub enforce_transitions: bool,
}

impl Default for LaundryConfig {
    fn default() -> Self {
        Self {
            enforce_transitions: true,
        }
    }
}

impl From<&LaundryConfig> for StoreOptions {
    fn from(config: &LaundryConfig) -> Self {
        StoreOptions {
            enforce_transitions: config.enforce_transitions,
        }
    }
}

/// Gemini client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_GEMINI_URL.to_string(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            timeout_secs: 60,
        }
    }
}

impl Config {
    /// Build the figment for an optional config file
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed("WASHD_").split("__"))
    }

    /// Load configuration from defaults, `path` (if it exists) and the environment.
    ///
    /// `GEMINI_API_KEY` fills in the API key when no other layer set one.
    pub fn load(path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut config: Config = Self::figment(path).extract()?;
        if config.gemini.api_key.is_none() {
            config.gemini.api_key = std::env::var("GEMINI_API_KEY").ok();
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert!(config.laundry.enforce_transitions);
        assert_eq!(config.gemini.model, DEFAULT_GEMINI_MODEL);
        assert_eq!(config.gemini.timeout_secs, 60);
        assert!(config.gemini.api_key.is_none());
    }

    #[test]
    fn test_toml_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
bind_addr = "0.0.0.0:9090"

[laundry]
enforce_transitions = false

[gemini]
model = "gemini-test"
"#
        )
        .unwrap();

        let config: Config = Config::figment(Some(file.path())).extract().unwrap();
        assert_eq!(config.bind_addr.port(), 9090);
        assert!(!config.laundry.enforce_transitions);
        assert_eq!(config.gemini.model, "gemini-test");
        // Untouched keys keep their defaults
        assert_eq!(config.gemini.base_url, DEFAULT_GEMINI_URL);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config: Config = Config::figment(Some(Path::new("/nonexistent/washd.toml")))
            .extract()
            .unwrap();
        assert_eq!(config.bind_addr, Config::default().bind_addr);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "bind_addr = \"not an address\"").unwrap();
        assert!(Config::figment(Some(file.path())).extract::<Config>().is_err());
    }

    #[test]
    fn test_store_options_from_config() {
        let options = StoreOptions::from(&LaundryConfig {
            enforce_transitions: false,
        });
        assert!(!options.enforce_transitions);
    }
}
