//! Thin async client for the Samson REST API.
//!
//! One [`Samson`] handle carries the HTTP client, base URL, and auth token;
//! per-entity views ([`Samson::projects`], [`Samson::commands`]) expose the
//! three calls the provider needs: `get`, `upsert`, `delete`. Upsert is
//! keyed by identifier presence: an entity without an id is `POST`ed, an
//! entity with one is `PUT` to its path.
//!
//! Every optional entity field is an `Option` and unset fields are omitted
//! from request bodies, so a partial entity updates only what it names.
//! The API wraps bodies in an entity envelope (`{"project": {...}}`),
//! which stays internal to this module.
//!
//! No retries and no caching happen here; a failed call is returned as-is.

use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

/// Base URL used when the provider configuration does not supply one.
///
/// Samson's development server listens on 9080.
pub const DEFAULT_BASE_URL: &str = "http://localhost:9080";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors returned by the Samson client.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request never produced a usable response, or the body did not
    /// decode as the expected entity.
    #[error("http transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// Samson answered with a non-success status.
    #[error("samson api returned {status}: {message}")]
    Api {
        /// The HTTP status code.
        status: StatusCode,
        /// The response body, as reported by the API.
        message: String,
    },

    /// The configured base URL did not parse.
    #[error("invalid base url: {0}")]
    BaseUrl(#[from] url::ParseError),
}

impl Error {
    /// Whether this error is the API reporting that the entity is gone.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Api { status, .. } if *status == StatusCode::NOT_FOUND)
    }
}

/// A Samson project.
///
/// `id` is assigned by the server and must be left unset on create. The
/// nested environment-variable records use the API's nested-attributes
/// field name on the wire and preserve their order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Server-assigned identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Project name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Git repository the project deploys from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository_url: Option<String>,
    /// Ordered environment-variable records.
    #[serde(
        rename = "environment_variables_attributes",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub environment_variables: Vec<EnvironmentVariable>,
}

/// An environment variable attached to a project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentVariable {
    /// Variable name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Variable value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Scope descriptor: scope type and scope id joined in one token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope_type_and_id: Option<String>,
}

/// A Samson command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    /// Server-assigned identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// The shell command text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// Owning project, if the command is project-scoped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
}

#[derive(Serialize)]
struct ProjectPayload<'a> {
    project: &'a Project,
}

#[derive(Deserialize)]
struct ProjectEnvelope {
    project: Project,
}

#[derive(Serialize)]
struct CommandPayload<'a> {
    command: &'a Command,
}

#[derive(Deserialize)]
struct CommandEnvelope {
    command: Command,
}

/// Authenticated handle to a Samson server.
///
/// Constructed once at provider configuration time and shared read-only by
/// all subsequent operations.
#[derive(Clone)]
pub struct Samson {
    http: reqwest::Client,
    base_url: Url,
    token: String,
}

// The token is sensitive and stays out of Debug output.
impl std::fmt::Debug for Samson {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Samson")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl Samson {
    /// Create a client against [`DEFAULT_BASE_URL`].
    pub fn new(token: impl Into<String>) -> Result<Self, Error> {
        Self::with_base_url(token, DEFAULT_BASE_URL)
    }

    /// Create a client against a specific Samson server.
    pub fn with_base_url(token: impl Into<String>, base_url: &str) -> Result<Self, Error> {
        // Url::join treats a base without a trailing slash as a file path.
        let mut base = base_url.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)?;

        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base_url,
            token: token.into(),
        })
    }

    /// The base URL this client talks to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Project API calls.
    pub fn projects(&self) -> ProjectsService<'_> {
        ProjectsService { samson: self }
    }

    /// Command API calls.
    pub fn commands(&self) -> CommandsService<'_> {
        CommandsService { samson: self }
    }

    async fn request<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<reqwest::Response, Error> {
        let url = self.base_url.join(path)?;
        debug!(%method, %url, "samson api request");

        let mut request = self.http.request(method, url).bearer_auth(&self.token);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_default();
        Err(Error::Api { status, message })
    }
}

/// Project calls on a [`Samson`] handle.
#[derive(Debug, Clone, Copy)]
pub struct ProjectsService<'a> {
    samson: &'a Samson,
}

impl ProjectsService<'_> {
    /// Fetch a project by id.
    pub async fn get(&self, id: i64) -> Result<Project, Error> {
        let response = self
            .samson
            .request::<()>(Method::GET, &format!("projects/{id}.json"), None)
            .await?;
        let envelope: ProjectEnvelope = response.json().await?;
        Ok(envelope.project)
    }

    /// Create or update a project, keyed by identifier presence.
    ///
    /// Returns the entity as the server now sees it.
    pub async fn upsert(&self, project: &Project) -> Result<Project, Error> {
        let payload = ProjectPayload { project };
        let response = match project.id {
            None => {
                self.samson
                    .request(Method::POST, "projects.json", Some(&payload))
                    .await?
            }
            Some(id) => {
                self.samson
                    .request(Method::PUT, &format!("projects/{id}.json"), Some(&payload))
                    .await?
            }
        };
        let envelope: ProjectEnvelope = response.json().await?;
        Ok(envelope.project)
    }

    /// Delete a project by id.
    pub async fn delete(&self, id: i64) -> Result<(), Error> {
        self.samson
            .request::<()>(Method::DELETE, &format!("projects/{id}.json"), None)
            .await?;
        Ok(())
    }
}

/// Command calls on a [`Samson`] handle.
#[derive(Debug, Clone, Copy)]
pub struct CommandsService<'a> {
    samson: &'a Samson,
}

impl CommandsService<'_> {
    /// Fetch a command by id.
    pub async fn get(&self, id: i64) -> Result<Command, Error> {
        let response = self
            .samson
            .request::<()>(Method::GET, &format!("commands/{id}.json"), None)
            .await?;
        let envelope: CommandEnvelope = response.json().await?;
        Ok(envelope.command)
    }

    /// Create or update a command, keyed by identifier presence.
    pub async fn upsert(&self, command: &Command) -> Result<Command, Error> {
        let payload = CommandPayload { command };
        let response = match command.id {
            None => {
                self.samson
                    .request(Method::POST, "commands.json", Some(&payload))
                    .await?
            }
            Some(id) => {
                self.samson
                    .request(Method::PUT, &format!("commands/{id}.json"), Some(&payload))
                    .await?
            }
        };
        let envelope: CommandEnvelope = response.json().await?;
        Ok(envelope.command)
    }

    /// Delete a command by id.
    pub async fn delete(&self, id: i64) -> Result<(), Error> {
        self.samson
            .request::<()>(Method::DELETE, &format!("commands/{id}.json"), None)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> Samson {
        Samson::with_base_url("test-token", &server.uri()).expect("client")
    }

    #[test]
    fn test_unset_fields_are_omitted_from_payloads() {
        let project = Project {
            name: Some("svc-a".to_string()),
            repository_url: Some("http://svc-a.example".to_string()),
            ..Default::default()
        };
        let body = serde_json::to_value(&project).unwrap();
        assert_eq!(
            body,
            json!({"name": "svc-a", "repository_url": "http://svc-a.example"})
        );

        let command = Command {
            id: Some(3),
            command: Some("echo hi".to_string()),
            ..Default::default()
        };
        let body = serde_json::to_value(&command).unwrap();
        assert_eq!(body, json!({"id": 3, "command": "echo hi"}));
    }

    #[test]
    fn test_environment_variables_use_nested_attributes_name() {
        let project = Project {
            name: Some("svc-a".to_string()),
            environment_variables: vec![EnvironmentVariable {
                name: Some("ENV".to_string()),
                value: Some("prod".to_string()),
                scope_type_and_id: None,
            }],
            ..Default::default()
        };
        let body = serde_json::to_value(&project).unwrap();
        assert_eq!(
            body["environment_variables_attributes"],
            json!([{"name": "ENV", "value": "prod"}])
        );
    }

    #[tokio::test]
    async fn test_get_project_sends_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/projects/42.json"))
            .and(header("authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "project": {"id": 42, "name": "svc-a", "repository_url": "http://svc-a.example"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let samson = client_for(&server);
        let project = samson.projects().get(42).await.unwrap();
        assert_eq!(project.id, Some(42));
        assert_eq!(project.name.as_deref(), Some("svc-a"));
        assert!(project.description.is_none());
        assert!(project.environment_variables.is_empty());
    }

    #[tokio::test]
    async fn test_upsert_without_id_posts() {
        let server = MockServer::start().await;
        let entity = Project {
            name: Some("svc-a".to_string()),
            repository_url: Some("http://svc-a.example".to_string()),
            ..Default::default()
        };
        Mock::given(method("POST"))
            .and(path("/projects.json"))
            .and(body_json(json!({
                "project": {"name": "svc-a", "repository_url": "http://svc-a.example"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "project": {"id": 42, "name": "svc-a", "repository_url": "http://svc-a.example"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let samson = client_for(&server);
        let created = samson.projects().upsert(&entity).await.unwrap();
        assert_eq!(created.id, Some(42));
    }

    #[tokio::test]
    async fn test_upsert_with_id_puts_to_entity_path() {
        let server = MockServer::start().await;
        let entity = Command {
            id: Some(9),
            command: Some("bundle exec rake".to_string()),
            ..Default::default()
        };
        Mock::given(method("PUT"))
            .and(path("/commands/9.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "command": {"id": 9, "command": "bundle exec rake"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let samson = client_for(&server);
        let updated = samson.commands().upsert(&entity).await.unwrap();
        assert_eq!(updated.id, Some(9));
    }

    #[tokio::test]
    async fn test_delete_issues_delete_by_id() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/commands/9.json"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let samson = client_for(&server);
        samson.commands().delete(9).await.unwrap();
    }

    #[tokio::test]
    async fn test_not_found_is_classified() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/projects/404.json"))
            .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
            .mount(&server)
            .await;

        let samson = client_for(&server);
        let err = samson.projects().get(404).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(format!("{}", err).contains("404"));
    }

    #[tokio::test]
    async fn test_api_error_carries_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/projects.json"))
            .respond_with(
                ResponseTemplate::new(422).set_body_string("repository url can't be blank"),
            )
            .mount(&server)
            .await;

        let samson = client_for(&server);
        let err = samson
            .projects()
            .upsert(&Project::default())
            .await
            .unwrap_err();
        assert!(!err.is_not_found());
        match err {
            Error::Api { status, message } => {
                assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
                assert!(message.contains("repository url"));
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }
}
