use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of lead actors carried on a normalized item
const MAX_ACTORS: usize = 5;

/// Kind of a catalog entry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Show,
    Episode,
}

/// Canonical representation of one catalog entry
///
/// Immutable snapshot returned by value; `rating_key` is stable across fetches
/// and is the dedup key everywhere.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MediaItem {
    pub rating_key: String,
    pub title: String,
    pub kind: MediaKind,
    pub year: Option<i32>,
    pub summary: Option<String>,
    pub genres: Vec<String>,
    pub directors: Vec<String>,
    /// Up to 5 lead actor names, in billing order
    pub actors: Vec<String>,
    /// Epoch seconds
    pub added_at: Option<i64>,
    pub last_viewed_at: Option<i64>,
    pub view_count: Option<u32>,
    /// Episode-only: parent show title
    pub show_title: Option<String>,
    pub season: Option<u32>,
    pub episode: Option<u32>,
    pub episode_total: Option<u32>,
}

impl MediaItem {
    pub fn primary_genre(&self) -> Option<&str> {
        self.genres.first().map(String::as_str)
    }

    pub fn secondary_genre(&self) -> Option<&str> {
        self.genres.get(1).map(String::as_str)
    }

    pub fn primary_director(&self) -> Option<&str> {
        self.directors.first().map(String::as_str)
    }

    pub fn lead_actor(&self) -> Option<&str> {
        self.actors.first().map(String::as_str)
    }

    /// When the item was added to the catalog
    pub fn added(&self) -> Option<DateTime<Utc>> {
        self.added_at.and_then(|ts| DateTime::from_timestamp(ts, 0))
    }

    /// When the item was last watched
    pub fn last_viewed(&self) -> Option<DateTime<Utc>> {
        self.last_viewed_at
            .and_then(|ts| DateTime::from_timestamp(ts, 0))
    }
}

/// Kind of a content section
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LibraryKind {
    Movie,
    Show,
    #[serde(other)]
    Other,
}

/// One content section of the catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Library {
    /// Server-assigned section key
    pub key: String,
    pub title: String,
    pub kind: LibraryKind,
    /// Attached after a warmup pass; the only permitted mutation
    pub item_count: Option<u64>,
}

// ============================================================================
// Catalog server wire types
// ============================================================================

/// Top-level response envelope from the catalog server
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope {
    #[serde(rename = "MediaContainer")]
    pub container: ApiContainer,
}

/// Container holding either a `Directory` array (library list) or a
/// `Metadata` array (items/collections) and a size count
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiContainer {
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub total_size: Option<u64>,
    #[serde(default, rename = "Directory")]
    pub directory: Vec<ApiDirectory>,
    #[serde(default, rename = "Metadata")]
    pub metadata: Vec<ApiMetadata>,
}

impl ApiContainer {
    /// Reported item count, preferring the paginated total
    pub fn item_count(&self) -> Option<u64> {
        self.total_size.or(self.size)
    }

    /// Normalizes the metadata array, dropping records that cannot be
    /// represented as media items (e.g. collection summaries without a type)
    pub fn into_items(self) -> Vec<MediaItem> {
        self.metadata
            .into_iter()
            .filter_map(ApiMetadata::normalize)
            .collect()
    }
}

/// One library section as reported by the server
#[derive(Debug, Clone, Deserialize)]
pub struct ApiDirectory {
    pub key: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl From<ApiDirectory> for Library {
    fn from(dir: ApiDirectory) -> Self {
        let kind = match dir.kind.as_str() {
            "movie" => LibraryKind::Movie,
            "show" => LibraryKind::Show,
            _ => LibraryKind::Other,
        };

        Library {
            key: dir.key,
            title: dir.title,
            kind,
            item_count: None,
        }
    }
}

/// A tag object (`{"tag": "Horror"}`) used for genres, directors and roles
#[derive(Debug, Clone, Deserialize)]
pub struct ApiTag {
    pub tag: String,
}

/// One raw metadata record as returned by the server
///
/// Heterogeneous: movies, shows, episodes and collection summaries all share
/// this shape, with most fields optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMetadata {
    #[serde(default)]
    pub rating_key: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    /// Absent on collection summaries; such records are filtered out
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default, rename = "Genre")]
    pub genre: Vec<ApiTag>,
    #[serde(default, rename = "Director")]
    pub director: Vec<ApiTag>,
    #[serde(default, rename = "Role")]
    pub role: Vec<ApiTag>,
    #[serde(default)]
    pub added_at: Option<i64>,
    #[serde(default)]
    pub last_viewed_at: Option<i64>,
    #[serde(default)]
    pub view_count: Option<u32>,
    #[serde(default)]
    pub grandparent_title: Option<String>,
    #[serde(default)]
    pub parent_index: Option<u32>,
    #[serde(default)]
    pub index: Option<u32>,
    #[serde(default)]
    pub leaf_count: Option<u32>,
}

impl ApiMetadata {
    /// Maps a raw record into the canonical representation
    ///
    /// Returns `None` for records lacking a type discriminator, identifier or
    /// title (collection summaries, malformed rows).
    pub fn normalize(self) -> Option<MediaItem> {
        let kind = match self.kind.as_deref()? {
            "movie" => MediaKind::Movie,
            "show" => MediaKind::Show,
            "episode" => MediaKind::Episode,
            _ => return None,
        };
        let rating_key = self.rating_key?;
        let title = self.title?;

        let actors: Vec<String> = self
            .role
            .into_iter()
            .take(MAX_ACTORS)
            .map(|r| r.tag)
            .collect();

        Some(MediaItem {
            rating_key,
            title,
            kind,
            year: self.year,
            summary: self.summary,
            genres: self.genre.into_iter().map(|g| g.tag).collect(),
            directors: self.director.into_iter().map(|d| d.tag).collect(),
            actors,
            added_at: self.added_at,
            last_viewed_at: self.last_viewed_at,
            view_count: self.view_count,
            show_title: self.grandparent_title,
            season: self.parent_index,
            episode: self.index,
            episode_total: self.leaf_count,
        })
    }
}
