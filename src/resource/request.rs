//! Request Builder
//!
//! Turns a typed resource query into the API's URL grammar:
//! `{base_url}/{path}.{format}?{query}`. Requests are validated when they
//! are constructed, so an unsupported combination never reaches the wire.

use std::fmt;

use chrono::NaiveDate;
use url::Url;

use super::catalog::{QueryStyle, QueryableColumn, ResourceKind, SortDirection, ValueKind};
use crate::config::ClientConfig;
use crate::error::{Error, Result};

/// Date format used by the API for `showdate`
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Typed value for a column lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    Integer(i64),
    Text(String),
    Date(NaiveDate),
}

impl QueryValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Integer(_) => ValueKind::Integer,
            Self::Text(_) => ValueKind::Text,
            Self::Date(_) => ValueKind::Date,
        }
    }

    /// Parse command-line text into the type `column` expects
    pub fn parse(column: QueryableColumn, raw: &str) -> Result<Self> {
        let raw = raw.trim();
        let mismatch = || Error::TypeMismatch {
            column,
            expected: column.value_kind(),
            found: ValueKind::Text,
            value: raw.to_string(),
        };

        match column.value_kind() {
            ValueKind::Integer => raw.parse::<i64>().map(Self::Integer).map_err(|_| mismatch()),
            ValueKind::Date => NaiveDate::parse_from_str(raw, DATE_FORMAT)
                .map(Self::Date)
                .map_err(|_| mismatch()),
            ValueKind::Text => {
                if raw.is_empty() {
                    Err(Error::configuration(format!(
                        "Missing value for column '{}'",
                        column
                    )))
                } else {
                    Ok(Self::Text(raw.to_string()))
                }
            }
        }
    }
}

impl fmt::Display for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{}", v),
            Self::Text(v) => f.write_str(v),
            Self::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
        }
    }
}

impl From<i64> for QueryValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<&str> for QueryValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<NaiveDate> for QueryValue {
    fn from(v: NaiveDate) -> Self {
        Self::Date(v)
    }
}

/// Optional list parameters shared by every request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pub order_by: Option<String>,
    pub direction: SortDirection,
    pub limit: Option<u32>,
    /// Always replaced by the client's key when the URL is built
    pub api_key: Option<String>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn order_by(mut self, column: impl Into<String>) -> Self {
        self.order_by = Some(column.into());
        self
    }

    pub fn descending(mut self) -> Self {
        self.direction = SortDirection::Desc;
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// True when nothing but defaults is set (the API key is ignored)
    pub fn is_default(&self) -> bool {
        self.list_pairs().is_empty()
    }

    /// Explicitly-set list parameters, in a fixed order, without the key
    pub fn list_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(order_by) = self.order_by.as_deref().filter(|s| !s.trim().is_empty()) {
            pairs.push(("order_by", order_by.to_string()));
        }
        if self.direction == SortDirection::Desc {
            pairs.push(("direction", "desc".to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        pairs
    }

    /// Full query string pairs, key first
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(key) = self.api_key.as_deref().filter(|s| !s.trim().is_empty()) {
            pairs.push(("apikey", key.to_string()));
        }
        pairs.extend(self.list_pairs());
        pairs
    }
}

/// What a request asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestShape {
    All,
    ById(i64),
    ByColumn {
        column: QueryableColumn,
        value: QueryValue,
    },
}

/// A validated request against one resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRequest {
    kind: ResourceKind,
    shape: RequestShape,
    params: QueryParams,
}

impl ResourceRequest {
    /// Every item of a listable resource
    pub fn all(kind: ResourceKind, params: QueryParams) -> Result<Self> {
        ensure_style(kind, QueryStyle::AllResources)?;
        Ok(Self {
            kind,
            shape: RequestShape::All,
            params,
        })
    }

    /// One item of a listable resource, by numeric id
    pub fn by_id(kind: ResourceKind, id: i64, params: QueryParams) -> Result<Self> {
        ensure_style(kind, QueryStyle::ResourceById)?;
        Ok(Self {
            kind,
            shape: RequestShape::ById(id),
            params,
        })
    }

    /// Items of a queryable resource matching `column = value`
    pub fn by_column(
        kind: ResourceKind,
        column: QueryableColumn,
        value: impl Into<QueryValue>,
        params: QueryParams,
    ) -> Result<Self> {
        ensure_style(kind, QueryStyle::QueryByColumn)?;
        if !kind.supports_column(column) {
            return Err(Error::configuration(format!(
                "Resource '{}' cannot be queried by '{}'",
                kind, column
            )));
        }

        let value = value.into();
        if value.kind() != column.value_kind() {
            return Err(Error::TypeMismatch {
                column,
                expected: column.value_kind(),
                found: value.kind(),
                value: value.to_string(),
            });
        }
        if matches!(&value, QueryValue::Text(text) if text.trim().is_empty()) {
            return Err(Error::configuration(format!(
                "Missing value for column '{}'",
                column
            )));
        }

        Ok(Self {
            kind,
            shape: RequestShape::ByColumn { column, value },
            params,
        })
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn shape(&self) -> &RequestShape {
        &self.shape
    }

    pub fn params(&self) -> &QueryParams {
        &self.params
    }

    pub fn style(&self) -> QueryStyle {
        match self.shape {
            RequestShape::All => QueryStyle::AllResources,
            RequestShape::ById(_) => QueryStyle::ResourceById,
            RequestShape::ByColumn { .. } => QueryStyle::QueryByColumn,
        }
    }

    /// Resource path without base URL or format suffix
    ///
    /// The value segment of a column query is percent-encoded so it always
    /// stays a single path segment.
    pub fn path(&self) -> String {
        match &self.shape {
            RequestShape::All => self.kind.as_str().to_string(),
            RequestShape::ById(id) => format!("{}/{}", self.kind, id),
            RequestShape::ByColumn { column, value } => format!(
                "{}/{}/{}",
                self.kind,
                column,
                urlencoding::encode(&value.to_string())
            ),
        }
    }

    /// Query string pairs with the configured key injected
    pub fn query_pairs(&self, api_key: &str) -> Vec<(&'static str, String)> {
        let mut params = self.params.clone();
        params.api_key = Some(api_key.to_string());
        params.to_pairs()
    }

    /// Absolute request URL for `config`
    pub fn url(&self, config: &ClientConfig) -> Result<Url> {
        let raw = format!(
            "{}/{}.{}",
            config.base_url.trim_end_matches('/'),
            self.path(),
            config.format
        );
        let mut url = Url::parse(&raw)
            .map_err(|e| Error::configuration(format!("Invalid request URL '{}': {}", raw, e)))?;

        url.query_pairs_mut()
            .extend_pairs(self.query_pairs(&config.api_key));

        Ok(url)
    }
}

fn ensure_style(kind: ResourceKind, style: QueryStyle) -> Result<()> {
    if kind.supports_style(style) {
        Ok(())
    } else {
        Err(Error::configuration(format!(
            "Resource '{}' does not support {} requests",
            kind, style
        )))
    }
}
