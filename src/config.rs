use std::time::Duration;

use serde::Deserialize;

use crate::error::{AppError, AppResult};

/// Core configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Catalog server base URL (e.g. "http://localhost:32400")
    pub catalog_base_url: String,

    /// Catalog server authentication token
    pub catalog_token: String,

    /// Maximum number of entries in the general cache store
    #[serde(default = "default_cache_max_entries")]
    pub cache_max_entries: usize,

    /// TTL for structural data (library list), seconds
    #[serde(default = "default_structural_ttl_secs")]
    pub structural_ttl_secs: u64,

    /// TTL for bulk content listings, seconds
    #[serde(default = "default_listing_ttl_secs")]
    pub listing_ttl_secs: u64,

    /// TTL for volatile views (recently added, on deck), seconds
    #[serde(default = "default_volatile_ttl_secs")]
    pub volatile_ttl_secs: u64,

    /// TTL for everything else, seconds
    #[serde(default = "default_default_ttl_secs")]
    pub default_ttl_secs: u64,
}

fn default_cache_max_entries() -> usize {
    100
}

fn default_structural_ttl_secs() -> u64 {
    1800 // 30 minutes
}

fn default_listing_ttl_secs() -> u64 {
    600 // 10 minutes
}

fn default_volatile_ttl_secs() -> u64 {
    120 // 2 minutes
}

fn default_default_ttl_secs() -> u64 {
    300 // 5 minutes
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            base_url: self.catalog_base_url.clone(),
            token: self.catalog_token.clone(),
        }
    }

    pub fn cache_policy(&self) -> CachePolicy {
        CachePolicy {
            max_entries: self.cache_max_entries,
            structural: Duration::from_secs(self.structural_ttl_secs),
            listing: Duration::from_secs(self.listing_ttl_secs),
            volatile: Duration::from_secs(self.volatile_ttl_secs),
            fallback: Duration::from_secs(self.default_ttl_secs),
        }
    }
}

/// Catalog server credentials
///
/// Set at process start from [`Config`] and overridable per session with
/// explicit values. Changing credentials must invalidate all caches (see
/// `CatalogClient::update_credentials`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub base_url: String,
    pub token: String,
}

impl Credentials {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    /// Fails fast on missing credentials; no retry
    pub fn validate(&self) -> AppResult<()> {
        if self.base_url.trim().is_empty() {
            return Err(AppError::Configuration(
                "Catalog base URL is not set".to_string(),
            ));
        }
        if self.token.trim().is_empty() {
            return Err(AppError::Configuration(
                "Catalog token is not set".to_string(),
            ));
        }
        Ok(())
    }
}

/// Cache sizing and TTL tiers
///
/// Tiers are tunable defaults, not hard invariants: structural data changes
/// rarely, bulk listings occasionally, volatile views constantly.
#[derive(Debug, Clone)]
pub struct CachePolicy {
    pub max_entries: usize,
    pub structural: Duration,
    pub listing: Duration,
    pub volatile: Duration,
    pub fallback: Duration,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            max_entries: default_cache_max_entries(),
            structural: Duration::from_secs(default_structural_ttl_secs()),
            listing: Duration::from_secs(default_listing_ttl_secs()),
            volatile: Duration::from_secs(default_volatile_ttl_secs()),
            fallback: Duration::from_secs(default_default_ttl_secs()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_ok() {
        let creds = Credentials::new("http://localhost:32400", "token123");
        assert!(creds.validate().is_ok());
    }

    #[test]
    fn test_validate_missing_base_url() {
        let creds = Credentials::new("", "token123");
        let err = creds.validate().unwrap_err();
        assert!(err.to_string().contains("base URL"));
    }

    #[test]
    fn test_validate_missing_token() {
        let creds = Credentials::new("http://localhost:32400", "  ");
        let err = creds.validate().unwrap_err();
        assert!(err.to_string().contains("token"));
    }

    #[test]
    fn test_default_policy_tiers() {
        let policy = CachePolicy::default();
        assert_eq!(policy.max_entries, 100);
        assert_eq!(policy.structural, Duration::from_secs(1800));
        assert_eq!(policy.listing, Duration::from_secs(600));
        assert_eq!(policy.volatile, Duration::from_secs(120));
        assert_eq!(policy.fallback, Duration::from_secs(300));
    }
}
