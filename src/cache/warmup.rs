use std::sync::{Arc, Mutex};

use crate::cache::{CacheStore, LibraryIndexCache};

/// Lifecycle of the full-catalog pre-fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarmupState {
    Idle,
    InProgress,
    Warmed,
}

/// Single-flight guard around the expensive full-catalog pre-fetch
///
/// The pre-fetch is a multi-request fan-out; without this guard, concurrent
/// cold sessions would each trigger a redundant pass, multiplying load on the
/// catalog server. Constructed explicitly and shared by handle rather than
/// living in process-global state, so per-session isolation is testable.
pub struct WarmupCoordinator {
    state: Mutex<WarmupState>,
    store: Arc<CacheStore>,
    library_index: Arc<LibraryIndexCache>,
}

impl WarmupCoordinator {
    pub fn new(store: Arc<CacheStore>, library_index: Arc<LibraryIndexCache>) -> Self {
        Self {
            state: Mutex::new(WarmupState::Idle),
            store,
            library_index,
        }
    }

    /// Claims the warmup slot
    ///
    /// Returns `true` and transitions `Idle -> InProgress` only from `Idle`.
    /// Callers must only perform the pre-fetch when this returns `true`, and
    /// must route any failure through [`fail`](Self::fail) so a later caller
    /// can retry.
    pub fn try_start(&self) -> bool {
        let mut state = self.state.lock().expect("warmup lock poisoned");
        if *state == WarmupState::Idle {
            *state = WarmupState::InProgress;
            tracing::info!("Catalog warmup started");
            true
        } else {
            tracing::debug!(state = ?*state, "Catalog warmup already claimed");
            false
        }
    }

    /// Marks the pre-fetch finished; idempotent outside `InProgress`
    pub fn complete(&self) {
        let mut state = self.state.lock().expect("warmup lock poisoned");
        if *state == WarmupState::InProgress {
            *state = WarmupState::Warmed;
            tracing::info!("Catalog warmup completed");
        }
    }

    /// Releases the slot after a failed pre-fetch so the next caller retries
    pub fn fail(&self) {
        let mut state = self.state.lock().expect("warmup lock poisoned");
        if *state == WarmupState::InProgress {
            *state = WarmupState::Idle;
            tracing::warn!("Catalog warmup failed, slot released for retry");
        }
    }

    pub fn is_warmed_up(&self) -> bool {
        *self.state.lock().expect("warmup lock poisoned") == WarmupState::Warmed
    }

    pub fn state(&self) -> WarmupState {
        *self.state.lock().expect("warmup lock poisoned")
    }

    /// Forces the state back to `Idle` and clears both caches
    ///
    /// The caches are cleared while the state lock is held, so a concurrent
    /// reader never observes a stale `Warmed` paired with empty caches. Used
    /// on credential change and explicit invalidation.
    pub fn invalidate(&self) {
        let mut state = self.state.lock().expect("warmup lock poisoned");
        self.store.clear();
        self.library_index.clear();
        *state = WarmupState::Idle;
        tracing::info!("Caches invalidated, warmup state reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::store::CacheKey;
    use std::time::Duration;

    fn coordinator() -> WarmupCoordinator {
        WarmupCoordinator::new(
            Arc::new(CacheStore::new(100)),
            Arc::new(LibraryIndexCache::new(Duration::from_secs(60))),
        )
    }

    #[test]
    fn test_try_start_claims_once() {
        let coord = coordinator();
        assert!(coord.try_start());
        assert!(!coord.try_start());
        assert_eq!(coord.state(), WarmupState::InProgress);
    }

    #[test]
    fn test_complete_marks_warmed() {
        let coord = coordinator();
        assert!(coord.try_start());
        coord.complete();
        assert!(coord.is_warmed_up());
        // Warmed rejects further starts
        assert!(!coord.try_start());
    }

    #[test]
    fn test_complete_outside_in_progress_is_noop() {
        let coord = coordinator();
        coord.complete();
        assert_eq!(coord.state(), WarmupState::Idle);
    }

    #[test]
    fn test_fail_allows_retry() {
        let coord = coordinator();
        assert!(coord.try_start());
        coord.fail();
        assert_eq!(coord.state(), WarmupState::Idle);
        assert!(coord.try_start());
    }

    #[test]
    fn test_concurrent_try_start_single_flight() {
        let coord = Arc::new(coordinator());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let coord = Arc::clone(&coord);
                std::thread::spawn(move || coord.try_start())
            })
            .collect();

        let claimed = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .filter(|&claimed| claimed)
            .count();

        assert_eq!(claimed, 1);
        assert_eq!(coord.state(), WarmupState::InProgress);
    }

    #[test]
    fn test_invalidate_clears_and_resets() {
        let store = Arc::new(CacheStore::new(100));
        let library_index = Arc::new(LibraryIndexCache::new(Duration::from_secs(60)));
        let coord = WarmupCoordinator::new(Arc::clone(&store), Arc::clone(&library_index));

        assert!(coord.try_start());
        coord.complete();
        store.set(
            &CacheKey::TitleSearch("x".to_string()),
            &1u32,
            Duration::from_secs(60),
        );
        library_index.set(vec![]);

        coord.invalidate();

        assert!(!coord.is_warmed_up());
        assert_eq!(coord.state(), WarmupState::Idle);
        assert!(store.is_empty());
        assert!(library_index.is_empty());
        // Retry is possible after invalidation
        assert!(coord.try_start());
    }
}
