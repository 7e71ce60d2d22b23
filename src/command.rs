//! The `samson_command` resource.
//!
//! A command is a reusable shell snippet Samson runs during deploys,
//! optionally scoped to one project. Same handler shape as
//! [`crate::project`], without nested records.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::client::{Command, Samson};
use crate::error::ProviderError;
use crate::schema::{Attribute, Schema};
use crate::state;

/// Resource type name declared to the host.
pub const TYPE_NAME: &str = "samson_command";

/// Declare the `samson_command` schema.
pub(crate) fn schema() -> Schema {
    Schema::v0()
        .with_attribute("id", Attribute::computed_string())
        .with_attribute("command", Attribute::required_string())
        .with_attribute("project_id", Attribute::optional_string())
}

/// Flat host-facing state for a command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandState {
    /// Host-stored external key; unset until the remote assigns one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// The shell command text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// Owning project, if the command is project-scoped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
}

fn expand_command(state: &CommandState) -> Command {
    Command {
        id: None,
        command: state.command.clone(),
        project_id: state.project_id.clone(),
    }
}

fn flatten_command(command: &Command, state: &mut CommandState) {
    if let Some(text) = &command.command {
        state.command = Some(text.clone());
    }
    if let Some(project_id) = &command.project_id {
        state.project_id = Some(project_id.clone());
    }
}

pub(crate) async fn create(samson: &Samson, planned_state: Value) -> Result<Value, ProviderError> {
    let state: CommandState = state::decode(TYPE_NAME, planned_state)?;
    let entity = expand_command(&state);
    debug!(command = ?entity.command, "creating samson command");

    let created = samson
        .commands()
        .upsert(&entity)
        .await
        .map_err(|source| ProviderError::Create {
            resource: TYPE_NAME,
            source,
        })?;
    let id = created.id.ok_or(ProviderError::MissingId {
        resource: TYPE_NAME,
    })?;
    info!(id, "created samson command");

    refresh(samson, id, state).await
}

pub(crate) async fn read(samson: &Samson, current_state: Value) -> Result<Value, ProviderError> {
    let state: CommandState = state::decode(TYPE_NAME, current_state)?;
    let id = state::parse_id(state.id.as_deref())?;
    refresh(samson, id, state).await
}

pub(crate) async fn update(
    samson: &Samson,
    prior_state: Value,
    planned_state: Value,
) -> Result<Value, ProviderError> {
    let prior: CommandState = state::decode(TYPE_NAME, prior_state)?;
    let planned: CommandState = state::decode(TYPE_NAME, planned_state)?;
    let id = state::parse_id(planned.id.as_deref().or(prior.id.as_deref()))?;

    // Partial entity: the id plus only the fields that changed.
    let mut entity = Command {
        id: Some(id),
        ..Default::default()
    };
    if prior.command != planned.command {
        entity.command = planned.command.clone();
    }
    if prior.project_id != planned.project_id {
        entity.project_id = planned.project_id.clone();
    }
    debug!(id, "updating samson command");

    samson
        .commands()
        .upsert(&entity)
        .await
        .map_err(|source| ProviderError::Update {
            resource: TYPE_NAME,
            id,
            source,
        })?;
    info!(id, "updated samson command");

    refresh(samson, id, planned).await
}

pub(crate) async fn delete(samson: &Samson, current_state: Value) -> Result<(), ProviderError> {
    let state: CommandState = state::decode(TYPE_NAME, current_state)?;
    let id = state::parse_id(state.id.as_deref())?;
    info!(id, "deleting samson command");

    match samson.commands().delete(id).await {
        Ok(()) => Ok(()),
        Err(err) if err.is_not_found() => {
            warn!(id, "samson command already absent on delete");
            Ok(())
        }
        Err(source) => Err(ProviderError::Delete {
            resource: TYPE_NAME,
            id,
            source,
        }),
    }
}

async fn refresh(
    samson: &Samson,
    id: i64,
    mut state: CommandState,
) -> Result<Value, ProviderError> {
    let command = samson
        .commands()
        .get(id)
        .await
        .map_err(|source| ProviderError::Read {
            resource: TYPE_NAME,
            id,
            source,
        })?;
    debug!(id, "read samson command");

    flatten_command(&command, &mut state);
    state.id = Some(id.to_string());
    state::encode(TYPE_NAME, &state)
}
