use std::collections::HashMap;

use crate::models::MediaItem;
use crate::recommend::{franchise, shuffle};

/// Points per candidate sharing the seed's first-listed genre
pub const PRIMARY_GENRE_POINTS: u32 = 3;
/// Points per candidate sharing the seed's second-listed genre
pub const SECONDARY_GENRE_POINTS: u32 = 1;
/// Points for the same primary director
pub const DIRECTOR_POINTS: u32 = 2;
/// Points for sharing the seed's first-listed actor
pub const LEAD_ACTOR_POINTS: u32 = 1;

/// Candidate sets gathered by one catalog query per scoring signal
#[derive(Debug, Default, Clone)]
pub struct SignalCandidates {
    pub primary_genre: Vec<MediaItem>,
    pub secondary_genre: Vec<MediaItem>,
    pub director: Vec<MediaItem>,
    pub lead_actor: Vec<MediaItem>,
}

/// Scores, ranks and truncates similarity candidates for one seed
///
/// Signals are additive: a candidate appearing under multiple signals
/// accumulates all applicable points. The seed itself and anything
/// franchise-matched to it are excluded. Ties break randomly across calls:
/// the candidate list is shuffled first, then stably sorted by score
/// descending, so equal scores keep their shuffled order while well-separated
/// scores never reorder.
pub fn rank_similar(seed: &MediaItem, candidates: SignalCandidates, count: usize) -> Vec<MediaItem> {
    let mut scores: HashMap<String, (MediaItem, u32)> = HashMap::new();

    accumulate(&mut scores, seed, candidates.primary_genre, PRIMARY_GENRE_POINTS);
    accumulate(&mut scores, seed, candidates.secondary_genre, SECONDARY_GENRE_POINTS);
    accumulate(&mut scores, seed, candidates.director, DIRECTOR_POINTS);
    accumulate(&mut scores, seed, candidates.lead_actor, LEAD_ACTOR_POINTS);

    let scored: Vec<(MediaItem, u32)> = scores.into_values().collect();
    let mut ranked = shuffle::shuffled(&scored);
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    ranked
        .into_iter()
        .take(count)
        .map(|(item, _)| item)
        .collect()
}

fn accumulate(
    scores: &mut HashMap<String, (MediaItem, u32)>,
    seed: &MediaItem,
    items: Vec<MediaItem>,
    points: u32,
) {
    for item in items {
        if item.rating_key == seed.rating_key {
            continue;
        }
        if franchise::is_same_franchise(&item.title, &seed.title) {
            continue;
        }

        scores
            .entry(item.rating_key.clone())
            .and_modify(|(_, score)| *score += points)
            .or_insert((item, points));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MediaKind;

    fn movie(key: &str, title: &str) -> MediaItem {
        MediaItem {
            rating_key: key.to_string(),
            title: title.to_string(),
            kind: MediaKind::Movie,
            year: None,
            summary: None,
            genres: vec!["Horror".to_string()],
            directors: vec![],
            actors: vec![],
            added_at: None,
            last_viewed_at: None,
            view_count: None,
            show_title: None,
            season: None,
            episode: None,
            episode_total: None,
        }
    }

    fn seed() -> MediaItem {
        movie("1", "Halloween")
    }

    #[test]
    fn test_stacked_signals_outrank_single_signal() {
        // A shares only the primary genre (3); B shares genre + director (5)
        let a = movie("2", "Hereditary");
        let b = movie("3", "The Thing");

        for _ in 0..25 {
            let candidates = SignalCandidates {
                primary_genre: vec![a.clone(), b.clone()],
                director: vec![b.clone()],
                ..Default::default()
            };

            let ranked = rank_similar(&seed(), candidates, 10);
            assert_eq!(ranked[0].rating_key, "3");
            assert_eq!(ranked[1].rating_key, "2");
        }
    }

    #[test]
    fn test_seed_never_appears() {
        let candidates = SignalCandidates {
            primary_genre: vec![seed(), movie("2", "Hereditary")],
            director: vec![seed()],
            ..Default::default()
        };

        let ranked = rank_similar(&seed(), candidates, 10);
        assert!(ranked.iter().all(|item| item.rating_key != "1"));
        assert_eq!(ranked.len(), 1);
    }

    #[test]
    fn test_franchise_titles_excluded() {
        let sequel = movie("2", "Halloween II");
        let unrelated = movie("3", "The Fog");

        let candidates = SignalCandidates {
            primary_genre: vec![sequel, unrelated],
            ..Default::default()
        };

        let ranked = rank_similar(&seed(), candidates, 10);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].rating_key, "3");
    }

    #[test]
    fn test_truncates_to_requested_count() {
        let candidates = SignalCandidates {
            primary_genre: (2..12).map(|i| movie(&i.to_string(), &format!("Movie {}", i))).collect(),
            ..Default::default()
        };

        let ranked = rank_similar(&seed(), candidates, 3);
        assert_eq!(ranked.len(), 3);
    }

    #[test]
    fn test_no_candidates_is_empty_not_error() {
        let ranked = rank_similar(&seed(), SignalCandidates::default(), 5);
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_duplicate_within_one_signal_scores_once_per_appearance() {
        // The same item fetched under two signals stacks points but appears once
        let both = movie("2", "The Thing");
        let candidates = SignalCandidates {
            primary_genre: vec![both.clone()],
            lead_actor: vec![both],
            ..Default::default()
        };

        let ranked = rank_similar(&seed(), candidates, 10);
        assert_eq!(ranked.len(), 1);
    }
}
