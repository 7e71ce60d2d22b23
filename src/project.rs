//! The `samson_project` resource.
//!
//! A project is Samson's unit of deployment: a name, the repository it
//! deploys from, and an ordered set of environment-variable records. The
//! handlers here are thin sequences of "expand state into an entity, call
//! the API, flatten the response back into state"; everything else
//! (diffing, persistence, transport) belongs to the host.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::client::{EnvironmentVariable, Project, Samson};
use crate::error::ProviderError;
use crate::schema::{Attribute, Block, NestedBlock, Schema};
use crate::state;

/// Resource type name declared to the host.
pub const TYPE_NAME: &str = "samson_project";

/// Declare the `samson_project` schema.
pub(crate) fn schema() -> Schema {
    Schema::v0()
        .with_attribute("id", Attribute::computed_string())
        .with_attribute("name", Attribute::required_string())
        .with_attribute("description", Attribute::optional_string())
        .with_attribute("repository_url", Attribute::required_string())
        .with_block(
            "environment_variable",
            NestedBlock::list(
                Block::new()
                    .with_attribute("name", Attribute::required_string())
                    .with_attribute("value", Attribute::required_string())
                    .with_attribute("scope_type_and_id", Attribute::optional_string()),
            ),
        )
}

/// Flat host-facing state for a project.
///
/// Every field is presence-aware: an absent field stays absent through the
/// expand/flatten round trip instead of degrading to an empty value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectState {
    /// Host-stored external key; unset until the remote assigns one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
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
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub environment_variable: Vec<EnvironmentVariableState>,
}

/// One configured environment-variable record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentVariableState {
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

// Expanders

/// Build the entity a create sends: every field the state carries, no id.
fn expand_project(state: &ProjectState) -> Project {
    Project {
        id: None,
        name: state.name.clone(),
        description: state.description.clone(),
        repository_url: state.repository_url.clone(),
        environment_variables: state
            .environment_variable
            .iter()
            .map(expand_environment_variable)
            .collect(),
    }
}

fn expand_environment_variable(state: &EnvironmentVariableState) -> EnvironmentVariable {
    EnvironmentVariable {
        name: state.name.clone(),
        value: state.value.clone(),
        scope_type_and_id: state.scope_type_and_id.clone(),
    }
}

// Flatteners

/// Write the entity's present fields into the state, leaving absent ones
/// untouched. An empty remote list leaves the configured list alone.
fn flatten_project(project: &Project, state: &mut ProjectState) {
    if let Some(name) = &project.name {
        state.name = Some(name.clone());
    }
    if let Some(description) = &project.description {
        state.description = Some(description.clone());
    }
    if let Some(repository_url) = &project.repository_url {
        state.repository_url = Some(repository_url.clone());
    }
    if !project.environment_variables.is_empty() {
        state.environment_variable = project
            .environment_variables
            .iter()
            .map(flatten_environment_variable)
            .collect();
    }
}

fn flatten_environment_variable(ev: &EnvironmentVariable) -> EnvironmentVariableState {
    EnvironmentVariableState {
        name: ev.name.clone(),
        value: ev.value.clone(),
        scope_type_and_id: ev.scope_type_and_id.clone(),
    }
}

// Handlers

pub(crate) async fn create(samson: &Samson, planned_state: Value) -> Result<Value, ProviderError> {
    let state: ProjectState = state::decode(TYPE_NAME, planned_state)?;
    let entity = expand_project(&state);
    debug!(name = ?entity.name, "creating samson project");

    let created = samson
        .projects()
        .upsert(&entity)
        .await
        .map_err(|source| ProviderError::Create {
            resource: TYPE_NAME,
            source,
        })?;
    let id = created.id.ok_or(ProviderError::MissingId {
        resource: TYPE_NAME,
    })?;
    info!(id, "created samson project");

    refresh(samson, id, state).await
}

pub(crate) async fn read(samson: &Samson, current_state: Value) -> Result<Value, ProviderError> {
    let state: ProjectState = state::decode(TYPE_NAME, current_state)?;
    let id = state::parse_id(state.id.as_deref())?;
    refresh(samson, id, state).await
}

pub(crate) async fn update(
    samson: &Samson,
    prior_state: Value,
    planned_state: Value,
) -> Result<Value, ProviderError> {
    let prior: ProjectState = state::decode(TYPE_NAME, prior_state)?;
    let planned: ProjectState = state::decode(TYPE_NAME, planned_state)?;
    let id = state::parse_id(planned.id.as_deref().or(prior.id.as_deref()))?;

    // Partial entity: the id plus only the fields that changed, so the
    // remote keeps its current values for everything else.
    let mut entity = Project {
        id: Some(id),
        ..Default::default()
    };
    if prior.name != planned.name {
        entity.name = planned.name.clone();
    }
    if prior.description != planned.description {
        entity.description = planned.description.clone();
    }
    if prior.repository_url != planned.repository_url {
        entity.repository_url = planned.repository_url.clone();
    }
    if prior.environment_variable != planned.environment_variable {
        entity.environment_variables = planned
            .environment_variable
            .iter()
            .map(expand_environment_variable)
            .collect();
    }
    debug!(id, "updating samson project");

    samson
        .projects()
        .upsert(&entity)
        .await
        .map_err(|source| ProviderError::Update {
            resource: TYPE_NAME,
            id,
            source,
        })?;
    info!(id, "updated samson project");

    refresh(samson, id, planned).await
}

pub(crate) async fn delete(samson: &Samson, current_state: Value) -> Result<(), ProviderError> {
    let state: ProjectState = state::decode(TYPE_NAME, current_state)?;
    let id = state::parse_id(state.id.as_deref())?;
    info!(id, "deleting samson project");

    match samson.projects().delete(id).await {
        Ok(()) => Ok(()),
        // Already gone: the outcome the caller asked for holds.
        Err(err) if err.is_not_found() => {
            warn!(id, "samson project already absent on delete");
            Ok(())
        }
        Err(source) => Err(ProviderError::Delete {
            resource: TYPE_NAME,
            id,
            source,
        }),
    }
}

/// Fetch the entity and fold it back into the state the host persists.
async fn refresh(
    samson: &Samson,
    id: i64,
    mut state: ProjectState,
) -> Result<Value, ProviderError> {
    let project = samson
        .projects()
        .get(id)
        .await
        .map_err(|source| ProviderError::Read {
            resource: TYPE_NAME,
            id,
            source,
        })?;
    debug!(id, "read samson project");

    flatten_project(&project, &mut state);
    state.id = Some(id.to_string());
    state::encode(TYPE_NAME, &state)
}
