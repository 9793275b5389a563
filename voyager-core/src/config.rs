//! Configuration for the VoyagerMate core

use serde::{Deserialize, Serialize};

use crate::error::{Result, VoyagerError};

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VoyagerConfig {
    /// Completion provider configuration
    pub provider: ProviderConfig,
}

/// Settings for the OpenAI-compatible completion provider.
///
/// `base_url` may point at api.openai.com or an Azure OpenAI deployment that
/// exposes the `/chat/completions` shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API base URL
    pub base_url: String,

    /// API key (prefer setting via VOYAGER_PROVIDER_API_KEY)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model or deployment name
    pub model: String,

    /// Sampling temperature applied when a request does not set its own
    pub temperature: f32,

    /// Token ceiling applied when a request does not set its own
    pub max_tokens: usize,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model: "gpt-4o".to_string(),
            temperature: 0.7,
            max_tokens: 1000,
        }
    }
}

impl VoyagerConfig {
    /// Load configuration from `voyager.toml` and `VOYAGER_*` environment
    /// variables, env taking precedence.
    ///
    /// Env vars nest with a double underscore, e.g.
    /// `VOYAGER_PROVIDER__MODEL` sets `provider.model`.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if the file is invalid or the merged config
    /// fails validation.
    pub fn load() -> Result<Self> {
        use figment::{
            Figment,
            providers::{Env, Format, Toml},
        };

        let mut figment = Figment::from(figment::providers::Serialized::defaults(
            VoyagerConfig::default(),
        ))
        .merge(Toml::file("voyager.toml"))
        .merge(Env::prefixed("VOYAGER_").split("__"));

        if let Ok(path) = std::env::var("VOYAGER_CONFIG_PATH") {
            figment = figment.merge(Toml::file(path));
        }

        let config: VoyagerConfig = figment
            .extract()
            .map_err(|e| VoyagerError::Configuration(format!("failed to load configuration: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        use figment::{
            Figment,
            providers::{Format, Toml},
        };

        let config: VoyagerConfig = Figment::from(figment::providers::Serialized::defaults(
            VoyagerConfig::default(),
        ))
        .merge(Toml::file(path))
        .extract()
        .map_err(|e| {
            VoyagerError::Configuration(format!("failed to load configuration file: {}", e))
        })?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.provider.base_url.trim().is_empty() {
            return Err(VoyagerError::Configuration(
                "provider.base_url must not be empty".to_string(),
            ));
        }
        if self.provider.model.trim().is_empty() {
            return Err(VoyagerError::Configuration(
                "provider.model must not be empty".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.provider.temperature) {
            return Err(VoyagerError::Configuration(format!(
                "provider.temperature must be within 0.0..=2.0, got {}",
                self.provider.temperature
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(VoyagerConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_temperature() {
        let mut config = VoyagerConfig::default();
        config.provider.temperature = 3.5;
        assert!(matches!(
            config.validate(),
            Err(VoyagerError::Configuration(_))
        ));
    }

    #[test]
    fn rejects_empty_model() {
        let mut config = VoyagerConfig::default();
        config.provider.model = "  ".to_string();
        assert!(config.validate().is_err());
    }
}
