//! Catalog fetch layer
//!
//! Translates semantic requests (search by title/person/genre, unwatched
//! items, watch history, collection members, item metadata) into catalog
//! server calls, consulting the cache store first and populating it with the
//! TTL tier appropriate to each request kind.
//!
//! Multi-library requests fan out concurrently; a failure in one library's
//! call is folded into an empty result for that library and never fails the
//! aggregate.

pub mod transport;

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::{
    cache::{CacheKey, CacheStore, LibraryIndexCache, WarmupCoordinator},
    cached,
    config::{CachePolicy, Config, Credentials},
    error::{AppError, AppResult},
    models::{ApiContainer, Library, LibraryKind, MediaItem},
};
use transport::{CatalogTransport, HttpTransport};

/// Sort orders the fetch layer knows how to request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sort {
    TitleAsc,
    AddedDesc,
    LastViewedDesc,
    YearDesc,
}

impl Sort {
    fn query_value(self) -> &'static str {
        match self {
            Sort::TitleAsc => "titleSort:asc",
            Sort::AddedDesc => "addedAt:desc",
            Sort::LastViewedDesc => "lastViewedAt:desc",
            Sort::YearDesc => "year:desc",
        }
    }

    /// Sorts surfacing watch activity go to the volatile cache tier
    fn is_volatile(self) -> bool {
        matches!(self, Sort::AddedDesc | Sort::LastViewedDesc)
    }
}

/// Semantic filters for a section listing
///
/// Renders to a canonical query-pair order, so equivalent filters always hit
/// the same cache slot.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ItemFilters {
    pub genre: Option<String>,
    pub director: Option<String>,
    pub actor: Option<String>,
    pub unwatched: bool,
    pub sort: Option<Sort>,
    pub page_size: Option<usize>,
}

impl ItemFilters {
    pub fn with_genre(mut self, genre: &str) -> Self {
        self.genre = Some(genre.to_string());
        self
    }

    pub fn with_director(mut self, director: &str) -> Self {
        self.director = Some(director.to_string());
        self
    }

    pub fn with_actor(mut self, actor: &str) -> Self {
        self.actor = Some(actor.to_string());
        self
    }

    pub fn unwatched_only(mut self) -> Self {
        self.unwatched = true;
        self
    }

    pub fn sorted_by(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn with_page_size(mut self, size: usize) -> Self {
        self.page_size = Some(size);
        self
    }

    fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(genre) = &self.genre {
            pairs.push(("genre".to_string(), genre.clone()));
        }
        if let Some(director) = &self.director {
            pairs.push(("director".to_string(), director.clone()));
        }
        if let Some(actor) = &self.actor {
            pairs.push(("actor".to_string(), actor.clone()));
        }
        if self.unwatched {
            pairs.push(("unwatched".to_string(), "1".to_string()));
        }
        if let Some(sort) = self.sort {
            pairs.push(("sort".to_string(), sort.query_value().to_string()));
        }
        if let Some(size) = self.page_size {
            pairs.push(("size".to_string(), size.to_string()));
        }
        pairs
    }

    /// Canonical request fingerprint used as the cache key suffix
    fn fingerprint(&self) -> String {
        self.query_pairs()
            .into_iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&")
    }

    fn cache_ttl(&self, policy: &CachePolicy) -> Duration {
        if self.sort.map(Sort::is_volatile).unwrap_or(false) {
            policy.volatile
        } else {
            policy.listing
        }
    }
}

/// Outcome of one section's call inside a fan-out
///
/// Failures stay visible in the aggregation step instead of disappearing into
/// a generic catch.
enum SectionOutcome {
    Fetched {
        section: String,
        items: Vec<MediaItem>,
    },
    Failed {
        section: String,
        reason: String,
    },
}

/// Client for the upstream catalog server
///
/// Owns the cache store, library index cache and warmup coordinator it was
/// constructed with; cloning shares all of them, which is how fan-out tasks
/// are spawned.
#[derive(Clone)]
pub struct CatalogClient {
    transport: Arc<dyn CatalogTransport>,
    store: Arc<CacheStore>,
    library_index: Arc<LibraryIndexCache>,
    warmup: Arc<WarmupCoordinator>,
    credentials: Arc<RwLock<Credentials>>,
    policy: CachePolicy,
}

impl CatalogClient {
    /// Creates a client with fresh caches; fails fast on missing credentials
    pub fn new(
        transport: Arc<dyn CatalogTransport>,
        credentials: Credentials,
        policy: CachePolicy,
    ) -> AppResult<Self> {
        credentials.validate()?;

        let store = Arc::new(CacheStore::new(policy.max_entries));
        let library_index = Arc::new(LibraryIndexCache::new(policy.structural));
        let warmup = Arc::new(WarmupCoordinator::new(
            Arc::clone(&store),
            Arc::clone(&library_index),
        ));

        Ok(Self {
            transport,
            store,
            library_index,
            warmup,
            credentials: Arc::new(RwLock::new(credentials)),
            policy,
        })
    }

    /// Creates a client over the production HTTP transport
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let transport = Arc::new(HttpTransport::new()?);
        Self::new(transport, config.credentials(), config.cache_policy())
    }

    pub fn is_warmed_up(&self) -> bool {
        self.warmup.is_warmed_up()
    }

    /// Clears all caches and resets the warmup state
    pub fn invalidate_caches(&self) {
        self.warmup.invalidate();
    }

    /// Swaps credentials and invalidates all caches
    ///
    /// Stale data fetched under the old credentials must never leak into a
    /// session using the new ones.
    pub fn update_credentials(&self, credentials: Credentials) -> AppResult<()> {
        credentials.validate()?;
        {
            let mut current = self
                .credentials
                .write()
                .expect("credentials lock poisoned");
            if *current == credentials {
                return Ok(());
            }
            *current = credentials;
        }
        tracing::info!("Catalog credentials changed, invalidating caches");
        self.invalidate_caches();
        Ok(())
    }

    fn current_credentials(&self) -> Credentials {
        self.credentials
            .read()
            .expect("credentials lock poisoned")
            .clone()
    }

    async fn request(
        &self,
        path: &str,
        params: Vec<(String, String)>,
    ) -> AppResult<ApiContainer> {
        let credentials = self.current_credentials();
        self.transport.get(&credentials, path, &params).await
    }

    /// Library list, served from the dedicated index cache
    pub async fn libraries(&self) -> AppResult<Vec<Library>> {
        if let Some(cached) = self.library_index.get() {
            return Ok(cached);
        }

        let container = self.request("library/sections", Vec::new()).await?;
        let libraries: Vec<Library> = container.directory.into_iter().map(Library::from).collect();

        tracing::info!(count = libraries.len(), "Library list fetched");
        self.library_index.set(libraries.clone());
        Ok(libraries)
    }

    async fn video_libraries(&self) -> AppResult<Vec<Library>> {
        Ok(self
            .libraries()
            .await?
            .into_iter()
            .filter(|library| matches!(library.kind, LibraryKind::Movie | LibraryKind::Show))
            .collect())
    }

    async fn movie_libraries(&self) -> AppResult<Vec<Library>> {
        Ok(self
            .libraries()
            .await?
            .into_iter()
            .filter(|library| library.kind == LibraryKind::Movie)
            .collect())
    }

    /// Filtered listing of one section, cached per request fingerprint
    pub async fn library_items(
        &self,
        section: &str,
        filters: &ItemFilters,
    ) -> AppResult<Vec<MediaItem>> {
        let key = CacheKey::SectionItems {
            section: section.to_string(),
            query: filters.fingerprint(),
        };
        let ttl = filters.cache_ttl(&self.policy);

        cached!(self.store, key, ttl, async {
            let path = format!("library/sections/{}/all", section);
            let container = self.request(&path, filters.query_pairs()).await?;
            Ok::<_, AppError>(container.into_items())
        })
    }

    /// Catalog-wide title search
    pub async fn search_by_title(&self, query: &str) -> AppResult<Vec<MediaItem>> {
        if query.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Search query cannot be empty".to_string(),
            ));
        }

        let key = CacheKey::TitleSearch(query.to_string());
        cached!(self.store, key, self.policy.fallback, async {
            let container = self
                .request("search", vec![("query".to_string(), query.to_string())])
                .await?;
            let items = container.into_items();
            tracing::info!(query = %query, results = items.len(), "Title search completed");
            Ok::<_, AppError>(items)
        })
    }

    /// All items sharing a genre, across every movie and show library
    pub async fn search_by_genre(&self, genre: &str) -> AppResult<Vec<MediaItem>> {
        let sections = self.video_libraries().await?;
        let outcomes = self
            .fan_out(sections, ItemFilters::default().with_genre(genre))
            .await;
        Ok(Self::merge_outcomes(outcomes))
    }

    /// All items by a director, across every movie and show library
    pub async fn search_by_director(&self, director: &str) -> AppResult<Vec<MediaItem>> {
        let sections = self.video_libraries().await?;
        let outcomes = self
            .fan_out(sections, ItemFilters::default().with_director(director))
            .await;
        Ok(Self::merge_outcomes(outcomes))
    }

    /// All items featuring an actor, across every movie and show library
    pub async fn search_by_actor(&self, actor: &str) -> AppResult<Vec<MediaItem>> {
        let sections = self.video_libraries().await?;
        let outcomes = self
            .fan_out(sections, ItemFilters::default().with_actor(actor))
            .await;
        Ok(Self::merge_outcomes(outcomes))
    }

    /// Unwatched movies across every movie library
    pub async fn unwatched_movies(&self) -> AppResult<Vec<MediaItem>> {
        let sections = self.movie_libraries().await?;
        let outcomes = self
            .fan_out(sections, ItemFilters::default().unwatched_only())
            .await;
        Ok(Self::merge_outcomes(outcomes))
    }

    /// Most recently added items across every movie and show library
    pub async fn recently_added(&self) -> AppResult<Vec<MediaItem>> {
        let sections = self.video_libraries().await?;
        let outcomes = self
            .fan_out(sections, ItemFilters::default().sorted_by(Sort::AddedDesc))
            .await;
        let mut items = Self::merge_outcomes(outcomes);
        items.sort_by(|a, b| b.added_at.cmp(&a.added_at));
        Ok(items)
    }

    /// In-progress items across the catalog
    pub async fn on_deck(&self) -> AppResult<Vec<MediaItem>> {
        cached!(self.store, CacheKey::OnDeck, self.policy.volatile, async {
            let container = self.request("library/onDeck", Vec::new()).await?;
            Ok::<_, AppError>(container.into_items())
        })
    }

    /// Viewed items, most recently watched first
    pub async fn watch_history(&self) -> AppResult<Vec<MediaItem>> {
        let sections = self.video_libraries().await?;
        let outcomes = self
            .fan_out(
                sections,
                ItemFilters::default().sorted_by(Sort::LastViewedDesc),
            )
            .await;

        let mut items = Self::merge_outcomes(outcomes);
        items.retain(|item| item.last_viewed_at.is_some());
        items.sort_by(|a, b| b.last_viewed_at.cmp(&a.last_viewed_at));
        Ok(items)
    }

    /// Members of one collection
    pub async fn collection_members(&self, rating_key: &str) -> AppResult<Vec<MediaItem>> {
        let key = CacheKey::CollectionChildren(rating_key.to_string());
        cached!(self.store, key, self.policy.listing, async {
            let path = format!("library/collections/{}/children", rating_key);
            let container = self.request(&path, Vec::new()).await?;
            Ok::<_, AppError>(container.into_items())
        })
    }

    /// Full metadata for one item
    pub async fn item_metadata(&self, rating_key: &str) -> AppResult<MediaItem> {
        let key = CacheKey::ItemMetadata(rating_key.to_string());
        cached!(self.store, key, self.policy.fallback, async {
            let path = format!("library/metadata/{}", rating_key);
            let container = self.request(&path, Vec::new()).await?;
            container
                .into_items()
                .into_iter()
                .next()
                .ok_or_else(|| AppError::NotFound(format!("No item with key {}", rating_key)))
        })
    }

    /// Single-flight full-catalog pre-fetch
    ///
    /// Returns `false` without fetching when another warmup is in flight or
    /// the catalog is already warmed. On success, attaches the computed item
    /// counts to the cached library list. Any error releases the slot so a
    /// later caller can retry.
    pub async fn warm_up(&self) -> AppResult<bool> {
        if !self.warmup.try_start() {
            return Ok(false);
        }

        match self.prefetch_catalog().await {
            Ok(total) => {
                self.warmup.complete();
                tracing::info!(items = total, "Catalog pre-fetch populated the cache");
                Ok(true)
            }
            Err(e) => {
                self.warmup.fail();
                Err(e)
            }
        }
    }

    async fn prefetch_catalog(&self) -> AppResult<u64> {
        let mut libraries = self.libraries().await?;
        let video: Vec<Library> = libraries
            .iter()
            .filter(|library| matches!(library.kind, LibraryKind::Movie | LibraryKind::Show))
            .cloned()
            .collect();

        let outcomes = self.fan_out(video, ItemFilters::default()).await;

        let mut counts: HashMap<String, u64> = HashMap::new();
        for outcome in &outcomes {
            if let SectionOutcome::Fetched { section, items } = outcome {
                counts.insert(section.clone(), items.len() as u64);
            }
        }

        for library in &mut libraries {
            if let Some(count) = counts.get(&library.key) {
                library.item_count = Some(*count);
            }
        }
        self.library_index.set(libraries);

        Ok(counts.values().sum())
    }

    /// Issues one listing call per section concurrently
    ///
    /// Spawned tasks run to completion even if the caller goes away, so their
    /// results still populate the cache for subsequent callers.
    async fn fan_out(&self, sections: Vec<Library>, filters: ItemFilters) -> Vec<SectionOutcome> {
        let mut tasks = Vec::new();

        for section in sections {
            let client = self.clone();
            let filters = filters.clone();
            let task = tokio::spawn(async move {
                match client.library_items(&section.key, &filters).await {
                    Ok(items) => SectionOutcome::Fetched {
                        section: section.key,
                        items,
                    },
                    Err(e) => SectionOutcome::Failed {
                        section: section.key,
                        reason: e.to_string(),
                    },
                }
            });
            tasks.push(task);
        }

        let mut outcomes = Vec::new();
        for task in tasks {
            match task.await {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => tracing::error!(error = %e, "Section fetch task join error"),
            }
        }
        outcomes
    }

    /// Folds fan-out outcomes, logging each failure as an empty contribution
    fn merge_outcomes(outcomes: Vec<SectionOutcome>) -> Vec<MediaItem> {
        let mut merged = Vec::new();
        let mut failures = 0usize;

        for outcome in outcomes {
            match outcome {
                SectionOutcome::Fetched { items, .. } => merged.extend(items),
                SectionOutcome::Failed { section, reason } => {
                    failures += 1;
                    tracing::warn!(
                        section = %section,
                        error = %reason,
                        "Section fetch failed, contributing empty result"
                    );
                }
            }
        }

        if failures > 0 {
            tracing::warn!(
                failures,
                fetched = merged.len(),
                "Partial section fan-out failure"
            );
        }
        merged
    }
}
