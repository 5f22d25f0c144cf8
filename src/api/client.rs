//! Phish.net API client
//!
//! Three primitives ([`PhishNetClient::fetch_all`],
//! [`PhishNetClient::fetch_by_id`], [`PhishNetClient::fetch_by_column`])
//! carry every request. The typed helpers on top pick the resource from
//! the model type through [`ApiResource`].

use std::future::Future;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use super::envelope;
use super::http::PhishNetHttp;
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::models::ApiResource;
use crate::resource::{QueryParams, QueryValue, QueryableColumn, ResourceKind, ResourceRequest};

/// Client for the read-only v5 API
#[derive(Clone)]
pub struct PhishNetClient {
    http: PhishNetHttp,
    config: ClientConfig,
}

impl PhishNetClient {
    /// Create a client, rejecting a blank API key or a bad base URL
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let http = PhishNetHttp::new(config.timeout, config.logs_enabled)?;

        tracing::debug!(
            "Client ready for {} (format {})",
            config.base_url,
            config.format
        );

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Run a prepared request and decode its items
    ///
    /// A 404 yields an empty list; any other non-2xx status is a
    /// transport error carrying the status reason.
    pub async fn execute<T: DeserializeOwned>(
        &self,
        request: &ResourceRequest,
        cancel: &CancellationToken,
    ) -> Result<Vec<T>> {
        let url = request.url(&self.config)?;

        let response = with_cancel(cancel, self.http.get(&url)).await?;

        if response.status == StatusCode::NOT_FOUND {
            tracing::debug!("{} returned 404, treating as empty", request.path());
            return Ok(Vec::new());
        }

        if !response.status.is_success() {
            let reason = response
                .status
                .canonical_reason()
                .map(str::to_string)
                .unwrap_or_else(|| response.status.to_string());
            return Err(Error::Transport {
                status: Some(response.status.as_u16()),
                reason,
                source: None,
            });
        }

        let items = envelope::decode::<T>(&response.body)?;
        tracing::debug!("{} decoded {} item(s)", request.path(), items.len());
        Ok(items)
    }

    /// Every item of a listable resource
    pub async fn fetch_all<T: DeserializeOwned>(
        &self,
        kind: ResourceKind,
        params: QueryParams,
        cancel: &CancellationToken,
    ) -> Result<Vec<T>> {
        let request = ResourceRequest::all(kind, params)?;
        self.execute(&request, cancel).await
    }

    /// One item by id, or `None` when the API has nothing for it
    pub async fn fetch_by_id<T: DeserializeOwned>(
        &self,
        kind: ResourceKind,
        id: i64,
        params: QueryParams,
        cancel: &CancellationToken,
    ) -> Result<Option<T>> {
        let request = ResourceRequest::by_id(kind, id, params)?;
        let items = self.execute(&request, cancel).await?;
        Ok(items.into_iter().next())
    }

    /// Items matching `column = value`
    pub async fn fetch_by_column<T: DeserializeOwned>(
        &self,
        kind: ResourceKind,
        column: QueryableColumn,
        value: impl Into<QueryValue>,
        params: QueryParams,
        cancel: &CancellationToken,
    ) -> Result<Vec<T>> {
        let request = ResourceRequest::by_column(kind, column, value, params)?;
        self.execute(&request, cancel).await
    }

    pub async fn list<T: ApiResource>(
        &self,
        params: QueryParams,
        cancel: &CancellationToken,
    ) -> Result<Vec<T>> {
        self.fetch_all(T::KIND, params, cancel).await
    }

    pub async fn get<T: ApiResource>(
        &self,
        id: i64,
        params: QueryParams,
        cancel: &CancellationToken,
    ) -> Result<Option<T>> {
        self.fetch_by_id(T::KIND, id, params, cancel).await
    }

    pub async fn query<T: ApiResource>(
        &self,
        column: QueryableColumn,
        value: impl Into<QueryValue>,
        params: QueryParams,
        cancel: &CancellationToken,
    ) -> Result<Vec<T>> {
        self.fetch_by_column(T::KIND, column, value, params, cancel)
            .await
    }

    /// First match of a column lookup (users resolve to one account)
    pub async fn find<T: ApiResource>(
        &self,
        column: QueryableColumn,
        value: impl Into<QueryValue>,
        params: QueryParams,
        cancel: &CancellationToken,
    ) -> Result<Option<T>> {
        let items = self.query::<T>(column, value, params, cancel).await?;
        Ok(items.into_iter().next())
    }
}

/// Resolve `fut`, or fail with [`Error::Cancelled`] once `cancel` fires
async fn with_cancel<F, T>(cancel: &CancellationToken, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            tracing::debug!("Request cancelled");
            Err(Error::Cancelled)
        }
        result = fut => result,
    }
}
