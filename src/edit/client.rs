//! Client for the Foundry image-edit endpoint.

use crate::config::FoundryConfig;
use crate::edit::types::{EditModel, EditOutcome, EditRequest};
use crate::error::{EditError, Result};
use std::time::Instant;

/// Builder for [`EditClient`].
///
/// Settings not provided explicitly fall back to the same environment
/// variables [`FoundryConfig::from_env`] reads; `build()` fails if anything
/// a request needs is still missing, except the deployment names, which are
/// validated when a model is actually selected.
#[derive(Debug, Clone, Default)]
pub struct EditClientBuilder {
    endpoint: Option<String>,
    api_key: Option<String>,
    api_version: Option<String>,
    gpt_deployment: Option<String>,
    flux_deployment: Option<String>,
}

impl EditClientBuilder {
    /// Creates a new builder with no settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the builder from a configuration value.
    pub fn from_config(config: &FoundryConfig) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            api_version: config.api_version.clone(),
            gpt_deployment: config.gpt_deployment.clone(),
            flux_deployment: config.flux_deployment.clone(),
        }
    }

    /// Sets the endpoint base URL.
    ///
    /// Used exactly as given: the edit path is appended without inserting a
    /// separator, so the endpoint carries its trailing slash
    /// (e.g. `https://my-resource.openai.azure.com/`).
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Sets the API key. Falls back to `FOUNDRY_API_KEY`.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the API version. Falls back to `FOUNDRY_API_VERSION`.
    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = Some(version.into());
        self
    }

    /// Sets the deployment name for the GPT model.
    pub fn gpt_deployment(mut self, deployment: impl Into<String>) -> Self {
        self.gpt_deployment = Some(deployment.into());
        self
    }

    /// Sets the deployment name for the Flux model.
    pub fn flux_deployment(mut self, deployment: impl Into<String>) -> Self {
        self.flux_deployment = Some(deployment.into());
        self
    }

    /// Builds the client, resolving missing settings from the environment.
    pub fn build(self) -> Result<EditClient> {
        let endpoint = self
            .endpoint
            .or_else(|| std::env::var("FOUNDRY_ENDPOINT").ok())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                EditError::InvalidConfig("FOUNDRY_ENDPOINT not set and no endpoint provided".into())
            })?;

        let api_key = self
            .api_key
            .or_else(|| std::env::var("FOUNDRY_API_KEY").ok())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                EditError::Auth("FOUNDRY_API_KEY not set and no API key provided".into())
            })?;

        let api_version = self
            .api_version
            .or_else(|| std::env::var("FOUNDRY_API_VERSION").ok())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                EditError::InvalidConfig(
                    "FOUNDRY_API_VERSION not set and no API version provided".into(),
                )
            })?;

        let gpt_deployment = self
            .gpt_deployment
            .or_else(|| std::env::var("GPT_DEPLOYMENT_NAME").ok())
            .filter(|s| !s.is_empty());
        let flux_deployment = self
            .flux_deployment
            .or_else(|| std::env::var("FLUX_DEPLOYMENT_NAME").ok())
            .filter(|s| !s.is_empty());

        Ok(EditClient {
            client: reqwest::Client::new(),
            endpoint,
            api_key,
            api_version,
            gpt_deployment,
            flux_deployment,
        })
    }
}

/// Client for a Foundry resource's image-edit endpoint.
///
/// One instance serves both model variants; the variant chosen per call
/// selects the deployment the request is routed to.
pub struct EditClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    api_version: String,
    gpt_deployment: Option<String>,
    flux_deployment: Option<String>,
}

impl EditClient {
    /// Creates a new [`EditClientBuilder`].
    pub fn builder() -> EditClientBuilder {
        EditClientBuilder::new()
    }

    /// Returns the deployment name serving the given model.
    pub fn deployment_for(&self, model: EditModel) -> Result<&str> {
        let (deployment, var) = match model {
            EditModel::Gpt => (&self.gpt_deployment, "GPT_DEPLOYMENT_NAME"),
            EditModel::Flux => (&self.flux_deployment, "FLUX_DEPLOYMENT_NAME"),
        };
        deployment.as_deref().ok_or_else(|| {
            EditError::InvalidConfig(format!("{var} not set and no deployment provided"))
        })
    }

    fn edit_url(&self, deployment: &str) -> String {
        format!(
            "{}openai/deployments/{}/images/edits?api-version={}",
            self.endpoint, deployment, self.api_version
        )
    }

    /// Submits one edit request and returns the raw response plus timing.
    ///
    /// Exactly one POST is issued; nothing is retried. The response body is
    /// deserialized into generic JSON only; interpreting its shape is the
    /// materializer's job. Transport failures surface as
    /// [`EditError::Network`], non-success statuses as [`EditError::Api`].
    pub async fn submit(&self, model: EditModel, request: &EditRequest) -> Result<EditOutcome> {
        let deployment = self.deployment_for(model)?.to_string();
        let url = self.edit_url(&deployment);

        let mime = request
            .image_format()
            .map(|format| format.mime_type())
            .unwrap_or("image/png");
        let image_part = reqwest::multipart::Part::bytes(request.image.clone())
            .file_name(request.image_filename.clone())
            .mime_str(mime)
            .map_err(|e| EditError::InvalidRequest(e.to_string()))?;

        let mut form = reqwest::multipart::Form::new().part("image", image_part);
        for (key, value) in form_text_fields(model, request) {
            form = form.text(key, value);
        }

        tracing::info!(
            model = %model,
            deployment = %deployment,
            image = %request.image_filename,
            "submitting edit request"
        );

        let start = Instant::now();
        let response = self
            .client
            .post(&url)
            .header("Api-Key", &self.api_key)
            .header("x-ms-model-mesh-model-name", &deployment)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let elapsed = start.elapsed();

        tracing::info!(
            status = status.as_u16(),
            elapsed_ms = elapsed.as_millis() as u64,
            "edit request completed"
        );

        if !status.is_success() {
            return Err(EditError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let raw: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| EditError::MalformedResponse {
                message: format!("response body is not JSON: {e}"),
                raw: body.clone(),
            })?;

        Ok(EditOutcome {
            raw,
            elapsed,
            model,
            deployment,
        })
    }
}

/// Assembles every multipart text field for the given model and request.
///
/// Shared fields first (`prompt`, `n`, `size`), then the model-specific
/// quality fields. Kept separate from `submit` so the exact field set is
/// testable without a live endpoint.
fn form_text_fields(model: EditModel, request: &EditRequest) -> Vec<(&'static str, String)> {
    let mut fields = vec![
        ("prompt", request.prompt.clone()),
        ("n", request.n.to_string()),
        ("size", request.size.clone()),
    ];
    for (key, value) in model.form_fields() {
        fields.push((key, value.to_string()));
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> EditClient {
        EditClientBuilder::new()
            .endpoint("https://example.azure.com/")
            .api_key("key-123")
            .api_version("2025-04-01-preview")
            .gpt_deployment("gpt-image-1")
            .flux_deployment("flux-1-kontext-pro")
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_without_key_fails() {
        std::env::remove_var("FOUNDRY_API_KEY");
        let result = EditClientBuilder::new()
            .endpoint("https://example.azure.com/")
            .api_version("v1")
            .build();
        assert!(matches!(result, Err(EditError::Auth(_))));
    }

    #[test]
    fn test_builder_from_config() {
        let config = crate::config::FoundryConfig::new()
            .with_endpoint("https://example.azure.com/")
            .with_api_key("key-123")
            .with_api_version("v1")
            .with_deployments("gpt-image-1", "flux-1-kontext-pro");
        let client = EditClientBuilder::from_config(&config).build().unwrap();
        assert_eq!(client.deployment_for(EditModel::Gpt).unwrap(), "gpt-image-1");
        assert_eq!(
            client.deployment_for(EditModel::Flux).unwrap(),
            "flux-1-kontext-pro"
        );
    }

    #[test]
    fn test_missing_deployment_fails_at_selection() {
        std::env::remove_var("FLUX_DEPLOYMENT_NAME");
        let client = EditClientBuilder::new()
            .endpoint("https://example.azure.com/")
            .api_key("key-123")
            .api_version("v1")
            .gpt_deployment("gpt-image-1")
            .build()
            .unwrap();
        assert!(client.deployment_for(EditModel::Gpt).is_ok());
        assert!(matches!(
            client.deployment_for(EditModel::Flux),
            Err(EditError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_edit_url() {
        let client = test_client();
        assert_eq!(
            client.edit_url("gpt-image-1"),
            "https://example.azure.com/openai/deployments/gpt-image-1/images/edits?api-version=2025-04-01-preview"
        );
    }

    #[test]
    fn test_form_text_fields_gpt() {
        let request = EditRequest::new("a red ball", vec![1, 2, 3], "ball.png");
        let fields = form_text_fields(EditModel::Gpt, &request);
        assert_eq!(
            fields,
            vec![
                ("prompt", "a red ball".to_string()),
                ("n", "1".to_string()),
                ("size", "1024x1024".to_string()),
                ("input_fidelity", "high".to_string()),
                ("quality", "high".to_string()),
            ]
        );
    }

    #[test]
    fn test_form_text_fields_flux() {
        let request = EditRequest::new("a red ball", vec![1, 2, 3], "ball.png");
        let fields = form_text_fields(EditModel::Flux, &request);
        assert_eq!(
            fields,
            vec![
                ("prompt", "a red ball".to_string()),
                ("n", "1".to_string()),
                ("size", "1024x1024".to_string()),
                ("quality", "hd".to_string()),
            ]
        );
    }
}
