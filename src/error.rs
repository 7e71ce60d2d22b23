//! Error types for the Samson provider.

use thiserror::Error;

use crate::client;

/// Errors surfaced to the host by provider operations.
///
/// Remote failures are wrapped with the operation name and the resource
/// context so that an apply failure reads as "what failed, on which
/// resource, and why". Nothing is retried at this layer; every failure is
/// returned promptly and the host decides what to do with it.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The host-stored identifier is not the numeric form Samson assigns.
    #[error("resource id {id:?} is not a numeric samson id")]
    InvalidId {
        /// The identifier as stored by the host.
        id: String,
        /// The parse failure.
        #[source]
        source: std::num::ParseIntError,
    },

    /// A resource operation was invoked before `configure`.
    #[error("provider is not configured; configure must run before resource operations")]
    NotConfigured,

    /// Provider configuration was rejected.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The host asked for a resource type this provider does not declare.
    #[error("unknown resource type: {0}")]
    UnknownResource(String),

    /// State supplied by the host did not convert into the typed form.
    ///
    /// This is the fail-fast boundary check: the untyped state is decoded
    /// once per operation and a mismatch is fatal to that operation.
    #[error("invalid state for {resource}: {source}")]
    State {
        /// The resource type name.
        resource: &'static str,
        /// The decode failure.
        #[source]
        source: serde_json::Error,
    },

    /// The remote create call failed.
    #[error("error creating {resource}: {source}")]
    Create {
        /// The resource type name.
        resource: &'static str,
        /// The underlying client error.
        #[source]
        source: client::Error,
    },

    /// The remote fetch failed (including not-found).
    #[error("error reading {resource} {id}: {source}")]
    Read {
        /// The resource type name.
        resource: &'static str,
        /// The numeric identifier that was fetched.
        id: i64,
        /// The underlying client error.
        #[source]
        source: client::Error,
    },

    /// The remote update call failed.
    #[error("error updating {resource} {id}: {source}")]
    Update {
        /// The resource type name.
        resource: &'static str,
        /// The numeric identifier that was updated.
        id: i64,
        /// The underlying client error.
        #[source]
        source: client::Error,
    },

    /// The remote delete call failed.
    #[error("error deleting {resource} {id}: {source}")]
    Delete {
        /// The resource type name.
        resource: &'static str,
        /// The numeric identifier that was deleted.
        id: i64,
        /// The underlying client error.
        #[source]
        source: client::Error,
    },

    /// The remote accepted a create but returned no identifier.
    #[error("{resource} response did not include an id")]
    MissingId {
        /// The resource type name.
        resource: &'static str,
    },
}
