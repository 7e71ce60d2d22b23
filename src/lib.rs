//! Samson provider
//!
//! This crate exposes two resources of the [Samson] deployment-automation
//! service, projects and commands, to an infrastructure-as-code host,
//! mapping the host's create/read/update/delete lifecycle onto Samson's
//! REST API.
//!
//! [Samson]: https://github.com/zendesk/samson
//!
//! # Overview
//!
//! The crate provides:
//!
//! - **Schema types**: builders for declaring the provider and resource
//!   schemas the host consumes
//! - **`ProviderService` trait**: the lifecycle contract a host drives
//! - **`SamsonProvider`**: the implementation, one resource module per
//!   resource type (`samson_project`, `samson_command`)
//! - **Samson client**: a thin authenticated REST client with per-entity
//!   `get`/`upsert`/`delete` calls
//! - **Error types**: operation failures wrapped with resource context
//! - **Logging**: integration with `tracing` for structured logging
//! - **Testing**: an in-process harness for driving a provider like a host
//!
//! The host owns everything else: planning and diffing, state persistence,
//! and the plugin transport. Each lifecycle call here is one round trip to
//! Samson (create and update chain a write with a read-back, since the
//! remote is the source of truth after any write), with no caching and no
//! retries.
//!
//! # Quick Start
//!
//! ```ignore
//! use samson_provider::{ProviderService, SamsonProvider};
//! use serde_json::json;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = SamsonProvider::new();
//! provider.configure(json!({"token": "…"})).await?;
//!
//! let state = provider
//!     .create("samson_project", json!({
//!         "name": "svc-a",
//!         "repository_url": "http://svc-a.example",
//!     }))
//!     .await?;
//! assert!(state["id"].is_string());
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! The provider takes a required, sensitive `token` attribute (falling
//! back to the `SAMSON_TOKEN` environment variable) and an optional `url`
//! attribute for the server base URL (falling back to `SAMSON_URL`, then
//! to the client default).

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod command;
pub mod error;
pub mod logging;
pub mod project;
pub mod provider;
pub mod schema;
pub mod testing;

mod state;

// Re-export main types at crate root
pub use client::Samson;
pub use error::ProviderError;
pub use logging::{init_logging, try_init_logging};
pub use provider::{ProviderMetadata, ProviderService, SamsonProvider, TOKEN_ENV, URL_ENV};
pub use schema::ProviderSchema;

// Re-export async_trait for convenience
pub use async_trait::async_trait;

// Re-export commonly used external types
pub use serde_json;
pub use tracing;
