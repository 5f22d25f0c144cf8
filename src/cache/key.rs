//! Cache key derivation
//!
//! Keys are `all`, `<id>` and `<column>:<value>`, with the value
//! percent-encoded so it can never contain the suffix separator. Requests with
//! non-default list parameters get a canonical
//! `?order_by=..&direction=desc&limit=..` suffix so that differently
//! shaped queries never share an entry.

use std::fmt;

use crate::resource::{QueryParams, QueryValue, QueryableColumn, RequestShape, ResourceRequest};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn all() -> Self {
        Self("all".to_string())
    }

    pub fn by_id(id: i64) -> Self {
        Self(id.to_string())
    }

    pub fn by_column(column: QueryableColumn, value: &QueryValue) -> Self {
        Self(format!("{}:{}", column, urlencoding::encode(&value.to_string())))
    }

    /// Append the params suffix when any list parameter is set
    pub fn with_params(self, params: &QueryParams) -> Self {
        let pairs = params.list_pairs();
        if pairs.is_empty() {
            return self;
        }

        let suffix = pairs
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");
        Self(format!("{}?{}", self.0, suffix))
    }

    /// Key under which the result of `request` is stored
    pub fn for_request(request: &ResourceRequest) -> Self {
        let base = match request.shape() {
            RequestShape::All => Self::all(),
            RequestShape::ById(id) => Self::by_id(*id),
            RequestShape::ByColumn { column, value } => Self::by_column(*column, value),
        };
        base.with_params(request.params())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for CacheKey {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl From<&str> for CacheKey {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}
