use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::models::Library;

struct Slot {
    libraries: Vec<Library>,
    expires_at: Instant,
}

/// Single-slot cache for the catalog's library list
///
/// Kept separate from the general store: the list is consulted on nearly every
/// operation (most queries must first resolve section keys), changes far less
/// often than content, and deserves its own eviction-free slot with a longer
/// TTL.
pub struct LibraryIndexCache {
    ttl: Duration,
    slot: Mutex<Option<Slot>>,
}

impl LibraryIndexCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: Mutex::new(None),
        }
    }

    /// Returns the cached list if present and unexpired
    pub fn get(&self) -> Option<Vec<Library>> {
        let mut slot = self.slot.lock().expect("library index lock poisoned");
        match slot.as_ref() {
            Some(cached) if cached.expires_at > Instant::now() => Some(cached.libraries.clone()),
            Some(_) => {
                *slot = None;
                None
            }
            None => None,
        }
    }

    pub fn set(&self, libraries: Vec<Library>) {
        let mut slot = self.slot.lock().expect("library index lock poisoned");
        *slot = Some(Slot {
            libraries,
            expires_at: Instant::now() + self.ttl,
        });
    }

    pub fn clear(&self) {
        *self.slot.lock().expect("library index lock poisoned") = None;
    }

    pub fn is_empty(&self) -> bool {
        self.slot
            .lock()
            .expect("library index lock poisoned")
            .is_none()
    }
}
