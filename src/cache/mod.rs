pub mod library_index;
pub mod store;
pub mod warmup;

mod macros;

pub use library_index::LibraryIndexCache;
pub use store::{CacheKey, CacheStore};
pub use warmup::{WarmupCoordinator, WarmupState};
