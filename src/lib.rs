//! Typed client for the Phish.net v5 API
//!
//! Requests are built and validated from a closed resource catalog, sent
//! over HTTP, and decoded from the API's uniform response envelope into
//! typed models. Results can be kept in a local per-resource cache.
//!
//! ```no_run
//! use phishnet::{models::Show, ClientConfig, PhishNetClient, QueryParams};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> phishnet::Result<()> {
//! let client = PhishNetClient::new(ClientConfig::new("my-api-key"))?;
//! let latest: Vec<Show> = client
//!     .list(QueryParams::new().order_by("showdate").descending().limit(5), &CancellationToken::new())
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod app;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod resource;

/// Version injected at compile time via PHISHNET_VERSION (set by CI/CD),
/// or the crate version for local builds.
pub const VERSION: &str = match option_env!("PHISHNET_VERSION") {
    Some(v) => v,
    None => env!("CARGO_PKG_VERSION"),
};

pub use api::{format_api_error, PhishNetClient};
pub use cache::{CacheKey, CacheStats, ResourceCache};
pub use config::{ClientConfig, Settings};
pub use error::{Error, Result};
pub use models::ApiResource;
pub use resource::{
    QueryParams, QueryStyle, QueryValue, QueryableColumn, ResourceKind, ResourceRequest,
    SortDirection,
};
