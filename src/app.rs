//! Application
//!
//! Lookup orchestration for the command-line tool: consult the cache,
//! fetch on a miss, store what came back and shape it for output.

use anyhow::Result;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::api::PhishNetClient;
use crate::cache::{CacheKey, CacheStats, ResourceCache};
use crate::models::{
    ApiResource, Artist, Attendance, JamChartEntry, Review, SetlistItem, Show, Song, SongData, User,
    Venue,
};
use crate::resource::{
    get_registry, QueryParams, QueryStyle, QueryValue, QueryableColumn, RequestShape,
    ResourceKind, ResourceRequest,
};

/// Bad command-line input that is not a client error
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct UsageError(pub String);

/// Positional lookup arguments following the resource name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    All,
    ById(i64),
    ByColumn {
        column: QueryableColumn,
        value: String,
    },
}

impl Lookup {
    /// `[]` is all, `[id]` is by id, `[column, value]` is by column
    pub fn from_args(args: &[String]) -> Result<Self> {
        match args {
            [] => Ok(Self::All),
            [id] => id
                .trim()
                .parse::<i64>()
                .map(Self::ById)
                .map_err(|_| anyhow::Error::from(UsageError(format!("Invalid id '{}'", id)))),
            [column, value] => Ok(Self::ByColumn {
                column: column.parse()?,
                value: value.clone(),
            }),
            _ => Err(UsageError(format!(
                "Too many arguments: expected [id | <column> <value>], got {}",
                args.len()
            ))
            .into()),
        }
    }

    /// Validated request for `kind`
    pub fn to_request(&self, kind: ResourceKind, params: QueryParams) -> crate::Result<ResourceRequest> {
        match self {
            Self::All => ResourceRequest::all(kind, params),
            Self::ById(id) => ResourceRequest::by_id(kind, *id, params),
            Self::ByColumn { column, value } => {
                let value = QueryValue::parse(*column, value)?;
                ResourceRequest::by_column(kind, *column, value, params)
            }
        }
    }
}

/// Result of one lookup, already unwrapped for single-item shapes
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutput {
    Many(Vec<Value>),
    One(Option<Value>),
}

impl QueryOutput {
    /// Pretty JSON, or a notice when a single lookup found nothing
    pub fn render(&self) -> Result<String> {
        let text = match self {
            Self::Many(items) => serde_json::to_string_pretty(items)?,
            Self::One(Some(item)) => serde_json::to_string_pretty(item)?,
            Self::One(None) => "No results found.".to_string(),
        };
        Ok(text)
    }
}

/// Where a lookup was answered from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Cache,
    Network,
}

pub struct App {
    client: PhishNetClient,
    cache: Option<ResourceCache>,
    refresh: bool,
    cancel: CancellationToken,
    last_source: Option<Source>,
}

impl App {
    /// `cache` of `None` disables caching entirely
    pub fn new(client: PhishNetClient, cache: Option<ResourceCache>) -> Self {
        Self {
            client,
            cache,
            refresh: false,
            cancel: CancellationToken::new(),
            last_source: None,
        }
    }

    /// Skip cache reads; results are still stored
    pub fn with_refresh(mut self, refresh: bool) -> Self {
        self.refresh = refresh;
        self
    }

    /// Token that aborts the in-flight request when cancelled
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn cache(&self) -> Option<&ResourceCache> {
        self.cache.as_ref()
    }

    pub fn last_source(&self) -> Option<Source> {
        self.last_source
    }

    /// Resolve one lookup through the cache and the API
    pub async fn query(
        &mut self,
        kind: ResourceKind,
        lookup: &Lookup,
        params: QueryParams,
    ) -> Result<QueryOutput> {
        let request = lookup.to_request(kind, params)?;

        let items = match kind {
            ResourceKind::Artists => self.query_typed::<Artist>(&request).await?,
            ResourceKind::Attendance => self.query_typed::<Attendance>(&request).await?,
            ResourceKind::JamCharts => self.query_typed::<JamChartEntry>(&request).await?,
            ResourceKind::Reviews => self.query_typed::<Review>(&request).await?,
            ResourceKind::Setlists => self.query_typed::<SetlistItem>(&request).await?,
            ResourceKind::Shows => self.query_typed::<Show>(&request).await?,
            ResourceKind::SongData => self.query_typed::<SongData>(&request).await?,
            ResourceKind::Songs => self.query_typed::<Song>(&request).await?,
            ResourceKind::Users => self.query_typed::<User>(&request).await?,
            ResourceKind::Venues => self.query_typed::<Venue>(&request).await?,
        };

        Ok(shape_output(&request, items))
    }

    async fn query_typed<T: ApiResource>(&mut self, request: &ResourceRequest) -> Result<Vec<Value>> {
        let kind = T::KIND;
        let key = CacheKey::for_request(request);

        if !self.refresh {
            if let Some(items) = self.cache.as_ref().and_then(|c| c.get::<T>(kind, &key)) {
                tracing::info!("Serving {}/{} from cache", kind, key);
                self.last_source = Some(Source::Cache);
                return to_values(&items);
            }
        }

        let items: Vec<T> = self.client.execute(request, &self.cancel).await?;
        self.last_source = Some(Source::Network);
        tracing::info!("Fetched {} item(s) for {}/{}", items.len(), kind, key);

        if let Some(cache) = self.cache.as_mut() {
            cache.put(kind, &key, &items)?;
            cache.save()?;
        }

        to_values(&items)
    }

    /// Flush pending cache changes
    pub fn save(&mut self) -> crate::Result<()> {
        match self.cache.as_mut() {
            Some(cache) => cache.save(),
            None => Ok(()),
        }
    }
}

fn to_values<T: ApiResource>(items: &[T]) -> Result<Vec<Value>> {
    let values = items
        .iter()
        .map(serde_json::to_value)
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(values)
}

/// Id lookups and single-result column lookups collapse to one item
fn shape_output(request: &ResourceRequest, items: Vec<Value>) -> QueryOutput {
    let single = match request.shape() {
        RequestShape::All => false,
        RequestShape::ById(_) => true,
        RequestShape::ByColumn { .. } => request.kind().def().single_by_column,
    };

    if single {
        QueryOutput::One(items.into_iter().next())
    } else {
        QueryOutput::Many(items)
    }
}

/// Help text listing every resource and the lookups it accepts
pub fn resources_help() -> String {
    let mut out = String::from("Available resources:\n");
    for def in get_registry() {
        let usage = if def.styles.contains(&QueryStyle::QueryByColumn) {
            let columns: Vec<&str> = def.columns.iter().map(|c| c.as_str()).collect();
            format!("<{}> <value>", columns.join("|"))
        } else {
            "[id]".to_string()
        };
        out.push_str(&format!(
            "  {:<12} {:<38} {}\n",
            def.kind.as_str(),
            usage,
            def.display_name
        ));
    }
    out.push_str("\nDates use the yyyy-mm-dd format.\n");
    out
}

/// Table of cache statistics, one row per resource with entries
pub fn render_stats(stats: &[CacheStats]) -> String {
    let used: Vec<&CacheStats> = stats.iter().filter(|s| s.entries > 0).collect();
    if used.is_empty() {
        return "Cache is empty.".to_string();
    }

    let mut out = format!(
        "{:<12} {:>8} {:>8} {:>8}  {}\n",
        "RESOURCE", "ENTRIES", "ITEMS", "EXPIRED", "OLDEST"
    );
    for s in used {
        let oldest = s
            .oldest
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!(
            "{:<12} {:>8} {:>8} {:>8}  {}\n",
            s.kind.as_str(),
            s.entries,
            s.items,
            s.expired,
            oldest
        ));
    }
    out
}
