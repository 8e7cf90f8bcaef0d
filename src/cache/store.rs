use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Normalized request fingerprints used as cache keys
///
/// Distinct filter/sort/pagination combinations render to distinct keys, so
/// they occupy distinct cache slots.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Items of one section with a canonical query string
    SectionItems { section: String, query: String },
    /// Catalog-wide title search
    TitleSearch(String),
    /// Full metadata for one item
    ItemMetadata(String),
    /// Members of a collection
    CollectionChildren(String),
    /// In-progress items across the catalog
    OnDeck,
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::SectionItems { section, query } => {
                write!(f, "section:{}?{}", section, query)
            }
            CacheKey::TitleSearch(query) => write!(f, "search:{}", query.to_lowercase()),
            CacheKey::ItemMetadata(key) => write!(f, "item:{}", key),
            CacheKey::CollectionChildren(key) => write!(f, "collection:{}", key),
            CacheKey::OnDeck => write!(f, "ondeck"),
        }
    }
}

struct StoreEntry {
    value: serde_json::Value,
    /// Set once at insertion, never extended by reads
    expires_at: Instant,
    /// Updated on every hit; used only for eviction ordering
    last_accessed: Instant,
}

impl StoreEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at <= now
    }
}

/// Bounded in-process cache with per-entry TTL and LRU eviction
///
/// All operations take `&self` and serialize through an internal mutex; the
/// critical sections never span an await point, so the store is safe to share
/// across concurrent request handlers behind an `Arc`.
pub struct CacheStore {
    max_entries: usize,
    entries: Mutex<HashMap<String, StoreEntry>>,
}

impl CacheStore {
    pub fn new(max_entries: usize) -> Self {
        Self {
            max_entries,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Retrieves a value by key
    ///
    /// Returns the entry only if present and unexpired; expired entries are
    /// removed lazily on access. A hit refreshes the access time. A payload
    /// that no longer deserializes is treated as a miss and dropped.
    pub fn get<T: serde::de::DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        let key = key.to_string();
        let now = Instant::now();
        let mut entries = self.entries.lock().expect("cache store lock poisoned");

        let entry = entries.get_mut(&key)?;
        if entry.is_expired(now) {
            entries.remove(&key);
            tracing::debug!(key = %key, "Cache entry expired");
            return None;
        }

        entry.last_accessed = now;
        match serde_json::from_value(entry.value.clone()) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Cache deserialization failed, dropping entry");
                entries.remove(&key);
                None
            }
        }
    }

    /// Inserts or overwrites an entry with `expires = now + ttl`
    ///
    /// Triggers eviction if the store exceeds its maximum size afterwards.
    pub fn set<T: serde::Serialize>(&self, key: &CacheKey, value: &T, ttl: Duration) {
        let json = match serde_json::to_value(value) {
            Ok(v) => v,
            Err(e) => {
                tracing::error!(key = %key, error = %e, "Cache serialization failed");
                return;
            }
        };

        let now = Instant::now();
        let mut entries = self.entries.lock().expect("cache store lock poisoned");
        entries.insert(
            key.to_string(),
            StoreEntry {
                value: json,
                expires_at: now + ttl,
                last_accessed: now,
            },
        );

        if entries.len() > self.max_entries {
            Self::evict(&mut entries, self.max_entries, now);
        }
    }

    /// Removes all entries unconditionally
    pub fn clear(&self) {
        self.entries
            .lock()
            .expect("cache store lock poisoned")
            .clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("cache store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Two-phase eviction back down to `max_entries`
    ///
    /// Expired entries go first so that a live, recently-used entry is never
    /// evicted merely because a dead one still occupies a slot; only then are
    /// survivors dropped in least-recently-accessed order.
    fn evict(entries: &mut HashMap<String, StoreEntry>, max_entries: usize, now: Instant) {
        entries.retain(|_, entry| !entry.is_expired(now));

        if entries.len() > max_entries {
            let mut by_access: Vec<(String, Instant)> = entries
                .iter()
                .map(|(key, entry)| (key.clone(), entry.last_accessed))
                .collect();
            by_access.sort_by_key(|(_, accessed)| *accessed);

            let excess = entries.len() - max_entries;
            for (key, _) in by_access.into_iter().take(excess) {
                entries.remove(&key);
            }
        }

        tracing::debug!(remaining = entries.len(), "Cache eviction pass completed");
    }
}
