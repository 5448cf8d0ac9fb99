//! # atompub-service
//!
//! Atom Publishing Protocol dispatch core with pluggable collection adapters.
//! Routes workspace, collection, entry, category, and media requests to the
//! adapters registered for them, wrapping each request in an optional
//! transactional lifecycle and classifying failures into protocol responses.
//!
//! ## Features
//!
//! - **Typed routing**: fixed route templates resolve every request to a
//!   typed target (service, categories, collection, entry, media)
//! - **Pluggable storage**: collection adapters implement only the
//!   operations their storage supports; everything else answers 405
//! - **Transactional dispatch**: optional start/end/compensate hooks with
//!   guaranteed release, including on processor panics
//! - **Error classification**: explicit 4xx statuses stay quiet, everything
//!   else is logged with detail and answered with the original status
//! - **Hot-swappable registries**: processor table and workspace registry
//!   swap whole snapshots, so reads never lock
//! - **Server glue**: axum + tower-http stack with graceful shutdown
//!
//! ## Example
//!
//! ```rust,no_run
//! use atompub_service::prelude::*;
//! use std::sync::Arc;
//!
//! struct MemoryCollection;
//!
//! impl CollectionAdapter for MemoryCollection {}
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     // Load configuration
//!     let config = Config::load()?;
//!
//!     // Initialize tracing
//!     init_tracing(&config)?;
//!
//!     // Register workspaces and collections
//!     let provider = Arc::new(WorkspaceProvider::new(config.host.clone()));
//!     provider
//!         .workspace_manager()
//!         .register_workspace("main", "Main Workspace");
//!     provider.workspace_manager().register_collection(
//!         "main",
//!         "posts",
//!         "Posts",
//!         Arc::new(MemoryCollection),
//!     )?;
//!
//!     // Run server
//!     Server::new(config).serve(provider).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod adapter;
pub mod config;
pub mod error;
pub mod filter;
pub mod observability;
pub mod processor;
pub mod processors;
pub mod provider;
pub mod request;
pub mod resolver;
pub mod response;
pub mod server;
pub mod target;
pub mod uri;
pub mod workspace;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::adapter::{CollectionAdapter, Transactional};
    pub use crate::config::{Config, HostConfig, MiddlewareConfig, ServiceConfig};
    pub use crate::error::{Error, ErrorDisposition, ErrorResponse, Result};
    pub use crate::filter::Filter;
    pub use crate::observability::init_tracing;
    pub use crate::processor::{ProcessorTable, RequestProcessor};
    pub use crate::processors::{
        CategoriesRequestProcessor, CollectionRequestProcessor, EntryRequestProcessor,
        MediaRequestProcessor, ServiceRequestProcessor,
    };
    pub use crate::provider::WorkspaceProvider;
    pub use crate::request::RequestContext;
    pub use crate::resolver::TargetResolver;
    pub use crate::response::{Document, ResponseContext};
    pub use crate::server::Server;
    pub use crate::target::{Target, TargetField, TargetType};
    pub use crate::uri::{TemplateParameters, UriTemplate};
    pub use crate::workspace::{CollectionInfo, WorkspaceInfo, WorkspaceManager};

    pub use axum::{
        http::{HeaderMap, HeaderValue, StatusCode},
        response::{IntoResponse, Response},
        Router,
    };

    pub use serde::{Deserialize, Serialize};

    // Re-export tracing macros and types
    pub use tracing::{debug, error, info, instrument, trace, warn, Level, Span};

    // Re-export tokio for async runtime
    pub use tokio;

    // Re-export async-trait for async trait definitions
    pub use async_trait::async_trait;

    // Re-export error handling utilities
    pub use anyhow::{self, Context as AnyhowContext};
    pub use thiserror::Error;

    // Re-export HTTP types
    pub use http::{Method, Uri};
}
