//! Recommendation services
//!
//! Turns normalized catalog records into ranked, franchise-deduplicated,
//! director-diversified recommendation lists. An empty list is a valid
//! outcome everywhere here ("couldn't find similar titles"), never a fault.

pub mod diversify;
pub mod franchise;
pub mod scoring;
pub mod shuffle;

use crate::{
    catalog::CatalogClient,
    error::{AppError, AppResult},
    models::MediaItem,
};
use scoring::SignalCandidates;

/// Default cap on results per primary director
pub const DEFAULT_MAX_PER_DIRECTOR: usize = 1;

/// Ranked list of titles similar to a seed resolved by title search
///
/// Gathers one candidate query per scoring signal (primary genre, secondary
/// genre, director, lead actor) across every applicable library, then scores,
/// excludes the seed's franchise and ranks with a randomized tie-break.
pub async fn similar_titles(
    client: &CatalogClient,
    seed_title: &str,
    count: usize,
) -> AppResult<Vec<MediaItem>> {
    let seed = resolve_seed(client, seed_title).await?;

    let mut candidates = SignalCandidates::default();
    if let Some(genre) = seed.primary_genre() {
        candidates.primary_genre = client.search_by_genre(genre).await?;
    }
    if let Some(genre) = seed.secondary_genre() {
        candidates.secondary_genre = client.search_by_genre(genre).await?;
    }
    if let Some(director) = seed.primary_director() {
        candidates.director = client.search_by_director(director).await?;
    }
    if let Some(actor) = seed.lead_actor() {
        candidates.lead_actor = client.search_by_actor(actor).await?;
    }

    let ranked = scoring::rank_similar(&seed, candidates, count);
    tracing::info!(
        seed = %seed.title,
        results = ranked.len(),
        "Similar titles computed"
    );
    Ok(ranked)
}

/// Randomized, director-diversified selection of unwatched movies
pub async fn unwatched_picks(
    client: &CatalogClient,
    count: usize,
    max_per_director: usize,
) -> AppResult<Vec<MediaItem>> {
    let unwatched = client.unwatched_movies().await?;
    let mut picks = diversify::cap_per_director(shuffle::shuffled(&unwatched), max_per_director);
    picks.truncate(count);
    Ok(picks)
}

/// Randomized, director-diversified selection within one genre
pub async fn genre_picks(
    client: &CatalogClient,
    genre: &str,
    count: usize,
    max_per_director: usize,
) -> AppResult<Vec<MediaItem>> {
    let matches = client.search_by_genre(genre).await?;
    let mut picks = diversify::cap_per_director(shuffle::shuffled(&matches), max_per_director);
    picks.truncate(count);
    Ok(picks)
}

/// Resolves a seed title to one catalog item
///
/// Prefers an exact match after normalization, then falls back to the first
/// search result.
async fn resolve_seed(client: &CatalogClient, title: &str) -> AppResult<MediaItem> {
    let matches = client.search_by_title(title).await?;
    let normalized = franchise::normalize_title(title);

    let exact = matches
        .iter()
        .find(|item| franchise::normalize_title(&item.title) == normalized)
        .cloned();

    exact
        .or_else(|| matches.into_iter().next())
        .ok_or_else(|| AppError::NotFound(format!("No catalog match for '{}'", title)))
}
