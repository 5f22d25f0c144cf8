//! On-disk resource cache
//!
//! One JSON file per resource kind, `{cache_dir}/{resource}.json`, mapping
//! cache keys to `{ "items": [...], "fetched_at": "<RFC3339>" }`. Entries
//! live until invalidated unless a TTL is set, in which case an entry at
//! least that old is a miss.
//!
//! The cache assumes it is the only process using its directory.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::key::CacheKey;
use crate::error::{Error, Result};
use crate::resource::ResourceKind;

/// One stored result set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub items: Vec<Value>,
    pub fetched_at: DateTime<Utc>,
}

impl CacheEntry {
    fn is_expired(&self, ttl: Option<Duration>, now: DateTime<Utc>) -> bool {
        ttl.is_some_and(|ttl| now - self.fetched_at >= ttl)
    }
}

type KindEntries = BTreeMap<String, CacheEntry>;

/// Per-resource summary for `cache stats`
#[derive(Debug, Clone, PartialEq)]
pub struct CacheStats {
    pub kind: ResourceKind,
    pub entries: usize,
    pub items: usize,
    pub expired: usize,
    pub oldest: Option<DateTime<Utc>>,
}

/// File-backed cache of fetched result sets
#[derive(Debug)]
pub struct ResourceCache {
    dir: PathBuf,
    ttl: Option<Duration>,
    kinds: HashMap<ResourceKind, KindEntries>,
    dirty: HashSet<ResourceKind>,
}

impl ResourceCache {
    /// Load every resource file found in `dir`
    ///
    /// Missing files start empty. Unreadable or corrupt ones are logged
    /// and start empty too.
    pub fn open(dir: impl Into<PathBuf>, ttl: Option<Duration>) -> Self {
        let dir = dir.into();
        let mut kinds = HashMap::new();

        for kind in ResourceKind::ALL {
            let path = file_path(&dir, kind);
            if let Some(entries) = load_kind(kind, &path) {
                kinds.insert(kind, entries);
            }
        }

        tracing::debug!(
            "Opened cache at {} ({} resource file(s), ttl {:?})",
            dir.display(),
            kinds.len(),
            ttl
        );

        Self {
            dir,
            ttl,
            kinds,
            dirty: HashSet::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    /// File holding the entries for `kind`
    pub fn path_for(&self, kind: ResourceKind) -> PathBuf {
        file_path(&self.dir, kind)
    }

    /// Stored items for `key`, or `None` on a miss or an expired entry
    pub fn get<T: DeserializeOwned>(&self, kind: ResourceKind, key: &CacheKey) -> Option<Vec<T>> {
        let entry = self.kinds.get(&kind)?.get(key.as_str())?;

        if entry.is_expired(self.ttl, Utc::now()) {
            tracing::debug!("Cache entry {}/{} expired", kind, key);
            return None;
        }

        let items = entry
            .items
            .iter()
            .cloned()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<T>, _>>();

        match items {
            Ok(items) => {
                tracing::debug!("Cache hit {}/{} ({} item(s))", kind, key, items.len());
                Some(items)
            }
            Err(e) => {
                tracing::warn!("Ignoring unreadable cache entry {}/{}: {}", kind, key, e);
                None
            }
        }
    }

    /// Store `items` under `key`, replacing any previous entry
    pub fn put<T: Serialize>(&mut self, kind: ResourceKind, key: &CacheKey, items: &[T]) -> Result<()> {
        let items = items
            .iter()
            .map(serde_json::to_value)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::Cache {
                resource: kind,
                path: self.path_for(kind),
                source: e.into(),
            })?;

        tracing::debug!("Cache put {}/{} ({} item(s))", kind, key, items.len());

        self.kinds.entry(kind).or_default().insert(
            key.to_string(),
            CacheEntry {
                items,
                fetched_at: Utc::now(),
            },
        );
        self.dirty.insert(kind);
        Ok(())
    }

    /// Drop one entry; returns whether it existed
    pub fn invalidate(&mut self, kind: ResourceKind, key: &CacheKey) -> bool {
        let removed = self
            .kinds
            .get_mut(&kind)
            .is_some_and(|entries| entries.remove(key.as_str()).is_some());
        if removed {
            self.dirty.insert(kind);
        }
        removed
    }

    /// Drop every entry of one resource; returns how many were removed
    pub fn clear(&mut self, kind: ResourceKind) -> usize {
        let removed = self.kinds.remove(&kind).map_or(0, |entries| entries.len());
        self.dirty.insert(kind);
        removed
    }

    pub fn clear_all(&mut self) -> usize {
        ResourceKind::ALL.into_iter().map(|kind| self.clear(kind)).sum()
    }

    /// Drop expired entries; a no-op without a TTL
    pub fn purge_expired(&mut self) -> usize {
        let now = Utc::now();
        let ttl = self.ttl;
        let mut purged = 0;

        for (kind, entries) in self.kinds.iter_mut() {
            let before = entries.len();
            entries.retain(|_, entry| !entry.is_expired(ttl, now));
            let removed = before - entries.len();
            if removed > 0 {
                self.dirty.insert(*kind);
                purged += removed;
            }
        }

        purged
    }

    /// Summary of every resource, in catalog order
    pub fn stats(&self) -> Vec<CacheStats> {
        let now = Utc::now();
        ResourceKind::ALL
            .into_iter()
            .map(|kind| {
                let entries = self.kinds.get(&kind);
                CacheStats {
                    kind,
                    entries: entries.map_or(0, |e| e.len()),
                    items: entries.map_or(0, |e| e.values().map(|v| v.items.len()).sum()),
                    expired: entries.map_or(0, |e| {
                        e.values().filter(|v| v.is_expired(self.ttl, now)).count()
                    }),
                    oldest: entries.and_then(|e| e.values().map(|v| v.fetched_at).min()),
                }
            })
            .collect()
    }

    /// Whether there are changes not yet written to disk
    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Write every changed resource file
    ///
    /// Each file is written to a temporary sibling and renamed into place.
    /// A resource left with no entries has its file removed.
    pub fn save(&mut self) -> Result<()> {
        if self.dirty.is_empty() {
            return Ok(());
        }

        let mut dirty: Vec<ResourceKind> = self.dirty.iter().copied().collect();
        dirty.sort();

        for kind in dirty {
            let path = self.path_for(kind);
            match self.kinds.get(&kind).filter(|entries| !entries.is_empty()) {
                Some(entries) => write_kind(&self.dir, kind, &path, entries)?,
                None => remove_kind(kind, &path)?,
            }
            self.dirty.remove(&kind);
        }

        Ok(())
    }
}

fn file_path(dir: &Path, kind: ResourceKind) -> PathBuf {
    dir.join(format!("{}.json", kind))
}

fn load_kind(kind: ResourceKind, path: &Path) -> Option<KindEntries> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return None,
        Err(e) => {
            tracing::warn!("Could not read cache file {}: {}", path.display(), e);
            return None;
        }
    };

    match serde_json::from_str::<KindEntries>(&content) {
        Ok(entries) => Some(entries),
        Err(e) => {
            tracing::warn!(
                "Discarding corrupt cache file for {} ({}): {}",
                kind,
                path.display(),
                e
            );
            None
        }
    }
}

fn write_kind(dir: &Path, kind: ResourceKind, path: &Path, entries: &KindEntries) -> Result<()> {
    let cache_err = |source: std::io::Error| Error::Cache {
        resource: kind,
        path: path.to_path_buf(),
        source,
    };

    std::fs::create_dir_all(dir).map_err(cache_err)?;

    let json = serde_json::to_string_pretty(entries).map_err(|e| cache_err(e.into()))?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json).map_err(cache_err)?;
    std::fs::rename(&tmp, path).map_err(cache_err)?;

    tracing::debug!("Saved {} cache entries to {}", entries.len(), path.display());
    Ok(())
}

fn remove_kind(kind: ResourceKind, path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            tracing::debug!("Removed empty cache file {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(source) => Err(Error::Cache {
            resource: kind,
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Item {
        id: i64,
        name: String,
    }

    fn items() -> Vec<Item> {
        vec![
            Item {
                id: 1,
                name: "Tweezer".to_string(),
            },
            Item {
                id: 2,
                name: "Harry Hood".to_string(),
            },
        ]
    }

    #[test]
    fn test_miss_on_empty_cache() {
        let dir = TempDir::new().unwrap();
        let cache = ResourceCache::open(dir.path(), None);
        assert!(cache.get::<Item>(ResourceKind::Songs, &CacheKey::all()).is_none());
    }

    #[test]
    fn test_put_then_get() {
        let dir = TempDir::new().unwrap();
        let mut cache = ResourceCache::open(dir.path(), None);
        cache.put(ResourceKind::Songs, &CacheKey::all(), &items()).unwrap();
        assert_eq!(
            cache.get::<Item>(ResourceKind::Songs, &CacheKey::all()),
            Some(items())
        );
        assert!(cache.get::<Item>(ResourceKind::Shows, &CacheKey::all()).is_none());
    }

    #[test]
    fn test_put_is_idempotent_and_overwrites() {
        let dir = TempDir::new().unwrap();
        let mut cache = ResourceCache::open(dir.path(), None);
        let key = CacheKey::by_id(1);
        cache.put(ResourceKind::Songs, &key, &items()).unwrap();
        cache.put(ResourceKind::Songs, &key, &items()).unwrap();
        assert_eq!(cache.stats()[7].entries, 1);

        let latest = vec![items().remove(1)];
        cache.put(ResourceKind::Songs, &key, &latest).unwrap();
        assert_eq!(cache.get::<Item>(ResourceKind::Songs, &key), Some(latest));
    }

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: serde::Serializer>(&self, _: S) -> std::result::Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("cannot be stored"))
        }
    }

    #[test]
    fn test_unserializable_items_are_cache_errors() {
        let dir = TempDir::new().unwrap();
        let mut cache = ResourceCache::open(dir.path(), None);
        let err = cache
            .put(ResourceKind::Songs, &CacheKey::all(), &[Unserializable])
            .unwrap_err();

        match err {
            Error::Cache { resource, path, .. } => {
                assert_eq!(resource, ResourceKind::Songs);
                assert_eq!(path, dir.path().join("songs.json"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(!cache.is_dirty());
    }

    #[test]
    fn test_empty_result_is_a_hit() {
        let dir = TempDir::new().unwrap();
        let mut cache = ResourceCache::open(dir.path(), None);
        let key = CacheKey::by_id(404);
        cache.put::<Item>(ResourceKind::Venues, &key, &[]).unwrap();
        assert_eq!(cache.get::<Item>(ResourceKind::Venues, &key), Some(vec![]));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let mut cache = ResourceCache::open(dir.path(), None);
        cache.put(ResourceKind::Songs, &CacheKey::all(), &items()).unwrap();
        cache.put(ResourceKind::Venues, &CacheKey::by_id(2), &items()[..1]).unwrap();
        assert!(cache.is_dirty());
        cache.save().unwrap();
        assert!(!cache.is_dirty());
        assert!(dir.path().join("songs.json").exists());
        assert!(dir.path().join("venues.json").exists());
        assert!(!dir.path().join("shows.json").exists());

        let reloaded = ResourceCache::open(dir.path(), None);
        assert_eq!(
            reloaded.get::<Item>(ResourceKind::Songs, &CacheKey::all()),
            Some(items())
        );
        assert_eq!(
            reloaded.get::<Item>(ResourceKind::Venues, &CacheKey::by_id(2)),
            Some(items()[..1].to_vec())
        );
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("shows.json"), "{ definitely not json").unwrap();

        let mut cache = ResourceCache::open(dir.path(), None);
        assert!(cache.get::<Item>(ResourceKind::Shows, &CacheKey::all()).is_none());

        cache.put(ResourceKind::Shows, &CacheKey::all(), &items()).unwrap();
        cache.save().unwrap();
        let reloaded = ResourceCache::open(dir.path(), None);
        assert!(reloaded.get::<Item>(ResourceKind::Shows, &CacheKey::all()).is_some());
    }

    #[test]
    fn test_ttl_expiry() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("shows.json"),
            r#"{"all": {"items": [{"id": 1, "name": "old"}], "fetched_at": "2000-01-01T00:00:00Z"}}"#,
        )
        .unwrap();

        let forever = ResourceCache::open(dir.path(), None);
        assert!(forever.get::<Item>(ResourceKind::Shows, &CacheKey::all()).is_some());

        let mut hourly = ResourceCache::open(dir.path(), Some(Duration::hours(1)));
        assert!(hourly.get::<Item>(ResourceKind::Shows, &CacheKey::all()).is_none());
        assert_eq!(hourly.stats()[5].expired, 1);
        assert_eq!(hourly.purge_expired(), 1);
        assert_eq!(hourly.stats()[5].entries, 0);

        hourly.save().unwrap();
        assert!(!dir.path().join("shows.json").exists());
    }

    #[test]
    fn test_fresh_entry_survives_ttl() {
        let dir = TempDir::new().unwrap();
        let mut cache = ResourceCache::open(dir.path(), Some(Duration::hours(1)));
        cache.put(ResourceKind::Artists, &CacheKey::all(), &items()).unwrap();
        assert!(cache.get::<Item>(ResourceKind::Artists, &CacheKey::all()).is_some());
        assert_eq!(cache.purge_expired(), 0);
    }

    #[test]
    fn test_invalidate_and_clear() {
        let dir = TempDir::new().unwrap();
        let mut cache = ResourceCache::open(dir.path(), None);
        cache.put(ResourceKind::Songs, &CacheKey::all(), &items()).unwrap();
        cache.put(ResourceKind::Songs, &CacheKey::by_id(1), &items()[..1]).unwrap();
        cache.put(ResourceKind::Shows, &CacheKey::all(), &items()).unwrap();

        assert!(cache.invalidate(ResourceKind::Songs, &CacheKey::by_id(1)));
        assert!(!cache.invalidate(ResourceKind::Songs, &CacheKey::by_id(1)));
        assert_eq!(cache.clear(ResourceKind::Songs), 1);
        assert_eq!(cache.clear_all(), 1);
        assert!(cache.stats().iter().all(|s| s.entries == 0));
    }

    #[test]
    fn test_stats_counts_items() {
        let dir = TempDir::new().unwrap();
        let mut cache = ResourceCache::open(dir.path(), None);
        cache.put(ResourceKind::Users, &CacheKey::from("username:harpua"), &items()[..1]).unwrap();
        cache.put(ResourceKind::Users, &CacheKey::from("uid:2"), &items()).unwrap();

        let users = cache
            .stats()
            .into_iter()
            .find(|s| s.kind == ResourceKind::Users)
            .unwrap();
        assert_eq!(users.entries, 2);
        assert_eq!(users.items, 3);
        assert_eq!(users.expired, 0);
        assert!(users.oldest.is_some());
    }
}
