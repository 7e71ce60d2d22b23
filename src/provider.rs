//! The host-facing provider contract and its Samson implementation.
//!
//! [`ProviderService`] is what an orchestration host drives: the declared
//! schema plus the four resource lifecycle operations. The host owns
//! planning, diffing, state persistence, and the plugin transport; this
//! crate only answers lifecycle calls.
//!
//! [`SamsonProvider`] implements the trait for Samson. `configure` builds
//! the API client once from the supplied token (environment fallback:
//! `SAMSON_TOKEN`); the client is immutable afterwards and shared by every
//! operation. Operations dispatch on the resource type name.

use std::sync::{Arc, RwLock};

use serde::Deserialize;
use serde_json::Value;
use tracing::{info, instrument};

use crate::client::Samson;
use crate::command;
use crate::error::ProviderError;
use crate::project;
use crate::schema::{Attribute, Diagnostic, ProviderSchema, Schema};

/// Environment variable consulted when the `token` attribute is unset.
pub const TOKEN_ENV: &str = "SAMSON_TOKEN";

/// Environment variable consulted when the `url` attribute is unset.
pub const URL_ENV: &str = "SAMSON_URL";

/// Provider names and capabilities, derived from the schema.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProviderMetadata {
    /// Declared resource type names, sorted.
    pub resources: Vec<String>,
}

/// Trait the host drives.
///
/// Change detection is the host's job: `update` receives both the prior
/// and the planned state and must touch only what differs between them.
#[async_trait::async_trait]
pub trait ProviderService: Send + Sync + 'static {
    /// Return the provider's schema including all resources.
    fn schema(&self) -> ProviderSchema;

    /// Return provider metadata. By default, derived from the schema.
    fn metadata(&self) -> ProviderMetadata {
        let schema = self.schema();
        let mut resources: Vec<String> = schema.resources.keys().cloned().collect();
        resources.sort();
        ProviderMetadata { resources }
    }

    /// Configure the provider with credentials and settings.
    /// Returns diagnostics (errors and warnings).
    async fn configure(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError>;

    /// Stop the provider gracefully.
    async fn stop(&self) -> Result<(), ProviderError> {
        Ok(())
    }

    /// Create a new resource and return its state, identifier included.
    async fn create(
        &self,
        resource_type: &str,
        planned_state: Value,
    ) -> Result<Value, ProviderError>;

    /// Read the current state of a resource.
    async fn read(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<Value, ProviderError>;

    /// Update an existing resource and return its refreshed state.
    async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError>;

    /// Delete a resource.
    async fn delete(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<(), ProviderError>;
}

#[derive(Debug, Default, Deserialize)]
struct ProviderConfig {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

/// The Samson provider.
#[derive(Debug, Default)]
pub struct SamsonProvider {
    client: RwLock<Option<Arc<Samson>>>,
}

impl SamsonProvider {
    /// Create an unconfigured provider.
    pub fn new() -> Self {
        Self::default()
    }

    fn set_client(&self, samson: Samson) -> Result<(), ProviderError> {
        let mut guard = self
            .client
            .write()
            .map_err(|_| ProviderError::Configuration("client lock poisoned".to_string()))?;
        *guard = Some(Arc::new(samson));
        Ok(())
    }

    fn client(&self) -> Result<Arc<Samson>, ProviderError> {
        let guard = self
            .client
            .read()
            .map_err(|_| ProviderError::Configuration("client lock poisoned".to_string()))?;
        guard.clone().ok_or(ProviderError::NotConfigured)
    }
}

#[async_trait::async_trait]
impl ProviderService for SamsonProvider {
    fn schema(&self) -> ProviderSchema {
        ProviderSchema::new()
            .with_provider_config(
                Schema::v0()
                    .with_attribute(
                        "token",
                        Attribute::required_string()
                            .sensitive()
                            .with_description("The auth token for the Samson API."),
                    )
                    .with_attribute(
                        "url",
                        Attribute::optional_string()
                            .with_description("Base URL of the Samson server."),
                    ),
            )
            .with_resource(project::TYPE_NAME, project::schema())
            .with_resource(command::TYPE_NAME, command::schema())
    }

    #[instrument(skip(self, config))]
    async fn configure(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        let config: ProviderConfig = if config.is_null() {
            ProviderConfig::default()
        } else {
            serde_json::from_value(config).map_err(|err| {
                ProviderError::Configuration(format!("invalid provider configuration: {err}"))
            })?
        };

        let token = config
            .token
            .filter(|token| !token.is_empty())
            .or_else(|| std::env::var(TOKEN_ENV).ok());
        let Some(token) = token else {
            return Ok(vec![Diagnostic::error("token must be configured")
                .with_detail(format!(
                    "set the token attribute or the {TOKEN_ENV} environment variable"
                ))
                .with_attribute("token")]);
        };

        let url = config
            .url
            .filter(|url| !url.is_empty())
            .or_else(|| std::env::var(URL_ENV).ok());
        let samson = match &url {
            Some(url) => Samson::with_base_url(token, url),
            None => Samson::new(token),
        };
        let samson = match samson {
            Ok(samson) => samson,
            Err(err) => {
                return Ok(vec![Diagnostic::error("invalid samson client configuration")
                    .with_detail(err.to_string())
                    .with_attribute("url")]);
            }
        };

        info!(url = %samson.base_url(), "configured samson client");
        self.set_client(samson)?;
        Ok(vec![])
    }

    #[instrument(skip(self, planned_state))]
    async fn create(
        &self,
        resource_type: &str,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        let samson = self.client()?;
        match resource_type {
            project::TYPE_NAME => project::create(&samson, planned_state).await,
            command::TYPE_NAME => command::create(&samson, planned_state).await,
            other => Err(ProviderError::UnknownResource(other.to_string())),
        }
    }

    #[instrument(skip(self, current_state))]
    async fn read(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<Value, ProviderError> {
        let samson = self.client()?;
        match resource_type {
            project::TYPE_NAME => project::read(&samson, current_state).await,
            command::TYPE_NAME => command::read(&samson, current_state).await,
            other => Err(ProviderError::UnknownResource(other.to_string())),
        }
    }

    #[instrument(skip(self, prior_state, planned_state))]
    async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        let samson = self.client()?;
        match resource_type {
            project::TYPE_NAME => project::update(&samson, prior_state, planned_state).await,
            command::TYPE_NAME => command::update(&samson, prior_state, planned_state).await,
            other => Err(ProviderError::UnknownResource(other.to_string())),
        }
    }

    #[instrument(skip(self, current_state))]
    async fn delete(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<(), ProviderError> {
        let samson = self.client()?;
        match resource_type {
            project::TYPE_NAME => project::delete(&samson, current_state).await,
            command::TYPE_NAME => command::delete(&samson, current_state).await,
            other => Err(ProviderError::UnknownResource(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::DiagnosticSeverity;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_schema_declares_both_resources() {
        let provider = SamsonProvider::new();
        let schema = provider.schema();

        assert!(schema.resources.contains_key("samson_project"));
        assert!(schema.resources.contains_key("samson_command"));

        let token = &schema.provider.block.attributes["token"];
        assert!(token.required);
        assert!(token.sensitive);
        let url = &schema.provider.block.attributes["url"];
        assert!(url.optional);
    }

    #[test]
    fn test_metadata_lists_resources_sorted() {
        let provider = SamsonProvider::new();
        let metadata = provider.metadata();
        assert_eq!(metadata.resources, vec!["samson_command", "samson_project"]);
    }

    #[tokio::test]
    async fn test_operations_require_configure() {
        let provider = SamsonProvider::new();
        let err = provider
            .read("samson_project", json!({"id": "42"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::NotConfigured));
    }

    #[tokio::test]
    async fn test_unknown_resource_type_is_rejected() {
        let provider = SamsonProvider::new();
        provider
            .configure(json!({"token": "t", "url": "http://localhost:1"}))
            .await
            .unwrap();

        let err = provider
            .create("samson_stage", json!({}))
            .await
            .unwrap_err();
        match err {
            ProviderError::UnknownResource(name) => assert_eq!(name, "samson_stage"),
            other => panic!("expected unknown resource, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_configure_reports_invalid_url() {
        let provider = SamsonProvider::new();
        let diagnostics = provider
            .configure(json!({"token": "t", "url": "::not a url::"}))
            .await
            .unwrap();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].severity, DiagnosticSeverity::Error);
        assert_eq!(diagnostics[0].attribute.as_deref(), Some("url"));
    }

    // Single test so the environment mutation cannot race a parallel
    // missing-token assertion.
    #[tokio::test]
    async fn test_configure_token_with_env_fallback() {
        let provider = SamsonProvider::new();
        let diagnostics = provider.configure(Value::Null).await.unwrap();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].attribute.as_deref(), Some("token"));

        std::env::set_var(TOKEN_ENV, "env-token");
        std::env::set_var(URL_ENV, "http://samson.internal:9080");
        let diagnostics = provider.configure(Value::Null).await.unwrap();
        std::env::remove_var(TOKEN_ENV);
        std::env::remove_var(URL_ENV);

        assert!(diagnostics.is_empty());
        assert_eq!(
            provider.client().unwrap().base_url().as_str(),
            "http://samson.internal:9080/"
        );
    }

    #[tokio::test]
    async fn test_lifecycle_through_the_trait() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/commands.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "command": {"id": 9, "command": "echo hi"}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/commands/9.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "command": {"id": 9, "command": "echo hi"}
            })))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/commands/9.json"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let provider = SamsonProvider::new();
        let diagnostics = provider
            .configure(json!({"token": "t", "url": server.uri()}))
            .await
            .unwrap();
        assert!(diagnostics.is_empty());

        let state = provider
            .create("samson_command", json!({"command": "echo hi"}))
            .await
            .unwrap();
        assert_eq!(state["id"], "9");

        let state = provider.read("samson_command", state).await.unwrap();
        assert_eq!(state["command"], "echo hi");

        provider.delete("samson_command", state).await.unwrap();
        provider.stop().await.unwrap();
    }
}
