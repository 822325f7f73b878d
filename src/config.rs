//! Configuration for the Foundry edit endpoint.
//!
//! All settings live in an explicit [`FoundryConfig`] value constructed once
//! at startup, either from the environment via [`FoundryConfig::from_env`]
//! or programmatically with the `with_*` builders, and passed by reference
//! into the core. Nothing reads the environment at call time.

use std::env;
use std::path::PathBuf;

/// Connection settings for a Foundry resource hosting the two image-edit
/// deployments.
///
/// Every field is optional here; [`EditClientBuilder`](crate::edit::EditClientBuilder)
/// validates what a request actually needs when the client is built.
#[derive(Debug, Clone, Default)]
pub struct FoundryConfig {
    /// Base URL of the Foundry resource, including its trailing slash
    /// (e.g. `https://my-resource.openai.azure.com/`).
    pub endpoint: Option<String>,
    /// API key sent in the `Api-Key` header.
    pub api_key: Option<String>,
    /// API version query parameter (e.g. `2025-04-01-preview`).
    pub api_version: Option<String>,
    /// Deployment name for the GPT image model.
    pub gpt_deployment: Option<String>,
    /// Deployment name for the Flux model.
    pub flux_deployment: Option<String>,
    /// Default input image used when no path is supplied.
    pub default_image: Option<PathBuf>,
    /// Default prompt used when no prompt is supplied.
    pub default_prompt: Option<String>,
}

impl FoundryConfig {
    /// Creates an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the configuration from the environment.
    ///
    /// Recognized variables: `FOUNDRY_ENDPOINT`, `FOUNDRY_API_KEY`,
    /// `FOUNDRY_API_VERSION`, `GPT_DEPLOYMENT_NAME`, `FLUX_DEPLOYMENT_NAME`,
    /// and optionally `DEFAULT_INPUT_IMAGE` and `DEFAULT_PROMPT`. Unset
    /// variables stay `None`.
    pub fn from_env() -> Self {
        FoundryConfig {
            endpoint: env::var("FOUNDRY_ENDPOINT").ok(),
            api_key: env::var("FOUNDRY_API_KEY").ok(),
            api_version: env::var("FOUNDRY_API_VERSION").ok(),
            gpt_deployment: env::var("GPT_DEPLOYMENT_NAME").ok(),
            flux_deployment: env::var("FLUX_DEPLOYMENT_NAME").ok(),
            default_image: env::var("DEFAULT_INPUT_IMAGE").ok().map(PathBuf::from),
            default_prompt: env::var("DEFAULT_PROMPT").ok(),
        }
    }

    /// Sets the endpoint base URL.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Sets the API key.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Sets the API version.
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = Some(api_version.into());
        self
    }

    /// Sets both deployment names.
    pub fn with_deployments(
        mut self,
        gpt_deployment: impl Into<String>,
        flux_deployment: impl Into<String>,
    ) -> Self {
        self.gpt_deployment = Some(gpt_deployment.into());
        self.flux_deployment = Some(flux_deployment.into());
        self
    }

    /// Sets the default input image path.
    pub fn with_default_image(mut self, path: impl Into<PathBuf>) -> Self {
        self.default_image = Some(path.into());
        self
    }

    /// Sets the default prompt.
    pub fn with_default_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.default_prompt = Some(prompt.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_chain() {
        let config = FoundryConfig::new()
            .with_endpoint("https://example.azure.com/")
            .with_api_key("key-123")
            .with_api_version("2025-04-01-preview")
            .with_deployments("gpt-image-1", "flux-1-kontext-pro");

        assert_eq!(config.endpoint.as_deref(), Some("https://example.azure.com/"));
        assert_eq!(config.api_key.as_deref(), Some("key-123"));
        assert_eq!(config.api_version.as_deref(), Some("2025-04-01-preview"));
        assert_eq!(config.gpt_deployment.as_deref(), Some("gpt-image-1"));
        assert_eq!(config.flux_deployment.as_deref(), Some("flux-1-kontext-pro"));
        assert!(config.default_image.is_none());
        assert!(config.default_prompt.is_none());
    }

    #[test]
    fn test_default_is_empty() {
        let config = FoundryConfig::default();
        assert!(config.endpoint.is_none());
        assert!(config.api_key.is_none());
        assert!(config.api_version.is_none());
    }
}
