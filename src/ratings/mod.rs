use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{error::AppResult, models::MediaItem};

/// One rating from an external lookup source
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Rating {
    /// Source name for display ("letterboxd", "imdb", ...)
    pub source: String,
    pub score: f32,
    /// The scale the score is out of (5.0, 10.0, ...)
    pub scale: f32,
}

/// External rating-lookup capability
///
/// Injected by the caller; the core functions identically (minus ratings)
/// when no provider is configured or a lookup returns nothing.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RatingsProvider: Send + Sync {
    /// Looks up a rating by title and optional release year
    async fn lookup(&self, title: &str, year: Option<i32>) -> AppResult<Option<Rating>>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}

/// A media item with its optional decoration
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RatedItem {
    pub item: MediaItem,
    pub rating: Option<Rating>,
}

/// Decorates recommendation output with ratings, best effort
///
/// Lookups run in parallel; a per-item failure is logged and yields no
/// rating, never failing the batch. Input order is preserved.
pub async fn decorate_with_ratings(
    provider: Option<Arc<dyn RatingsProvider>>,
    items: Vec<MediaItem>,
) -> Vec<RatedItem> {
    let Some(provider) = provider else {
        return items
            .into_iter()
            .map(|item| RatedItem { item, rating: None })
            .collect();
    };

    let mut tasks = Vec::new();
    for item in items {
        let provider = Arc::clone(&provider);
        tasks.push(tokio::spawn(async move {
            let rating = match provider.lookup(&item.title, item.year).await {
                Ok(rating) => rating,
                Err(e) => {
                    tracing::warn!(
                        title = %item.title,
                        provider = provider.name(),
                        error = %e,
                        "Rating lookup failed"
                    );
                    None
                }
            };
            RatedItem { item, rating }
        }));
    }

    let mut rated = Vec::new();
    for task in tasks {
        match task.await {
            Ok(decorated) => rated.push(decorated),
            Err(e) => tracing::error!(error = %e, "Rating lookup task join error"),
        }
    }
    rated
}
