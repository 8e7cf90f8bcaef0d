use std::collections::HashMap;

use crate::models::MediaItem;

/// Caps how many items per primary director survive in a result list
///
/// Order-preserving single pass: an item is kept only while its primary
/// director's running count is below the cap. Items with no listed director
/// are always kept. Applied after shuffling or scoring so recommendation
/// lists are not dominated by one director's filmography.
pub fn cap_per_director(items: Vec<MediaItem>, max_per_director: usize) -> Vec<MediaItem> {
    let mut counts: HashMap<String, usize> = HashMap::new();

    items
        .into_iter()
        .filter(|item| match item.primary_director() {
            None => true,
            Some(director) => {
                let seen = counts.entry(director.to_string()).or_insert(0);
                if *seen < max_per_director {
                    *seen += 1;
                    true
                } else {
                    false
                }
            }
        })
        .collect()
}
