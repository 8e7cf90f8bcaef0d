//! Media-library assistant core: catalog cache and recommendation engine.
//!
//! This crate is the data layer behind a personal media-library assistant.
//! It fetches records from an upstream catalog server, caches them in a
//! bounded TTL/LRU store behind a single-flight warmup coordinator, and turns
//! them into ranked, franchise-deduplicated, director-diversified
//! recommendation lists.
//!
//! It has no HTTP surface of its own; request handlers construct a
//! [`CatalogClient`](catalog::CatalogClient) and call into
//! [`recommend`] and [`ratings`].

pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod ratings;
pub mod recommend;

pub use cache::{CacheKey, CacheStore, LibraryIndexCache, WarmupCoordinator, WarmupState};
pub use catalog::{CatalogClient, ItemFilters, Sort};
pub use config::{CachePolicy, Config, Credentials};
pub use error::{AppError, AppResult};
pub use models::{Library, LibraryKind, MediaItem, MediaKind};
pub use ratings::{RatedItem, Rating, RatingsProvider};
