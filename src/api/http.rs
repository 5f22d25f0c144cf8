//! HTTP utilities for Phish.net API calls

use reqwest::{Client, StatusCode};
use std::time::Duration;
use url::Url;

use crate::error::{Error, Result};

/// Maximum length of response body to log
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Truncate a response body and strip control characters for logging
pub(crate) fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let mut end = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..end], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| c.is_control(), "")
}

/// Render a URL for logs with the `apikey` value masked
pub(crate) fn redact_url(url: &Url) -> String {
    let mut redacted = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "apikey" { "***".to_string() } else { v.into_owned() };
            (k.into_owned(), v)
        })
        .collect();

    if pairs.is_empty() {
        return redacted.to_string();
    }

    redacted.query_pairs_mut().clear().extend_pairs(pairs);
    redacted.to_string()
}

/// Raw response: status plus body bytes
#[derive(Debug)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

/// HTTP client wrapper for the API
#[derive(Clone)]
pub struct PhishNetHttp {
    client: Client,
    verbose: bool,
}

impl PhishNetHttp {
    /// Create a new HTTP client
    pub fn new(timeout: Duration, verbose: bool) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("phishnet/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| Error::transport("Failed to create HTTP client", e))?;

        Ok(Self { client, verbose })
    }

    /// Issue a GET and return whatever the server answered
    pub async fn get(&self, url: &Url) -> Result<HttpResponse> {
        let shown = redact_url(url);
        if self.verbose {
            tracing::info!("GET {}", shown);
        } else {
            tracing::debug!("GET {}", shown);
        }

        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            let reason = if e.is_timeout() {
                "Request timed out"
            } else if e.is_connect() {
                "Failed to connect"
            } else {
                "Failed to send request"
            };
            Error::transport(reason, e)
        })?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| Error::transport("Failed to read response body", e))?
            .to_vec();

        if self.verbose {
            tracing::info!("{} -> {} ({} bytes)", shown, status, body.len());
        } else {
            tracing::debug!("{} -> {} ({} bytes)", shown, status, body.len());
        }

        if !status.is_success() && status != StatusCode::NOT_FOUND {
            tracing::error!(
                "API error: {} - {}",
                status,
                sanitize_for_log(&String::from_utf8_lossy(&body))
            );
        }

        Ok(HttpResponse { status, body })
    }
}

/// Format a client error for display
///
/// Well-known HTTP statuses get a hint; everything else keeps the error's
/// own message, control characters stripped.
pub fn format_api_error(error: &Error) -> String {
    match error.status() {
        Some(401) | Some(403) => {
            return "Access denied. Check your Phish.net API key.".to_string();
        }
        Some(429) => return "Rate limit exceeded. Please try again later.".to_string(),
        Some(500..=599) => {
            return format!(
                "Phish.net is temporarily unavailable ({}). Please try again.",
                error
            );
        }
        _ => {}
    }

    error
        .to_string()
        .chars()
        .filter(|c| !c.is_control())
        .collect()
}
