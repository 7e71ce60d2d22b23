//! Conversion between host state and typed resource state.
//!
//! The host hands resource state over as untyped `serde_json::Value` data.
//! Each handler converts it exactly once into the resource's typed state
//! struct, and back once on the way out; a mismatch fails the operation
//! with a typed error instead of propagating loosely-shaped data further.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::ProviderError;

/// Decode host state into the typed form for `resource`.
pub(crate) fn decode<T: DeserializeOwned>(
    resource: &'static str,
    state: Value,
) -> Result<T, ProviderError> {
    serde_json::from_value(state).map_err(|source| ProviderError::State { resource, source })
}

/// Encode typed state back into the host representation.
pub(crate) fn encode<T: Serialize>(
    resource: &'static str,
    state: &T,
) -> Result<Value, ProviderError> {
    serde_json::to_value(state).map_err(|source| ProviderError::State { resource, source })
}

/// Parse the host-stored opaque identifier into Samson's numeric form.
///
/// An absent id means the host never bound one, which only happens when an
/// operation that requires an existing resource is driven against state
/// that was never created; it is reported the same way as an unparseable
/// id would be.
pub(crate) fn parse_id(id: Option<&str>) -> Result<i64, ProviderError> {
    let id = id.unwrap_or_default();
    id.parse::<i64>().map_err(|source| ProviderError::InvalidId {
        id: id.to_string(),
        source,
    })
}
