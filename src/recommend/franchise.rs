//! Fuzzy franchise detection
//!
//! Decides whether two titles belong to the same franchise so that a
//! "similar movies" list never recommends the seed's own sequels. This is a
//! heuristic, not a franchise database: false negatives are acceptable, and
//! containment (not mere token overlap) is required to limit false positives.

/// Curated trailing subtitle words that mark a sequel or prequel
///
/// Inherently incomplete and English-specific; a replaceable heuristic table,
/// not a contract.
const SEQUEL_SUBTITLES: &[&str] = &[
    "reloaded",
    "revolutions",
    "resurrection",
    "resurrections",
    "returns",
    "rises",
    "rising",
    "begins",
    "forever",
    "legacy",
    "origins",
    "revenge",
    "awakening",
    "evolution",
    "generations",
    "salvation",
    "retribution",
];

const ROMAN_NUMERALS: &[&str] = &[
    "i", "ii", "iii", "iv", "v", "vi", "vii", "viii", "ix", "x", "xi", "xii", "xiii",
];

/// Tokens that prefix a numbered installment ("part ii", "chapter 3")
const INSTALLMENT_PREFIXES: &[&str] = &["part", "chapter", "vol", "volume", "episode"];

/// Lowercases, strips everything outside `[a-z0-9\s]` and collapses whitespace
pub fn normalize_title(title: &str) -> String {
    title
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_sequel_token(token: &str) -> bool {
    (!token.is_empty() && token.chars().all(|c| c.is_ascii_digit()))
        || ROMAN_NUMERALS.contains(&token)
        || SEQUEL_SUBTITLES.contains(&token)
}

/// Strips trailing sequel tokens from a normalized title
///
/// Never strips a title down to nothing: at least one token survives.
fn base_name(normalized: &str) -> String {
    let mut tokens: Vec<&str> = normalized.split(' ').collect();

    while tokens.len() > 1 {
        let last = tokens[tokens.len() - 1];
        if !is_sequel_token(last) {
            break;
        }
        tokens.pop();

        if tokens.len() > 1 && INSTALLMENT_PREFIXES.contains(&tokens[tokens.len() - 1]) {
            tokens.pop();
        }
    }

    tokens.join(" ")
}

/// Judges whether two titles belong to the same franchise
///
/// Normalized exact match or substring containment either direction counts;
/// otherwise both titles are stripped to base names, which must both exceed
/// 3 characters and be equal or containing.
pub fn is_same_franchise(a: &str, b: &str) -> bool {
    let norm_a = normalize_title(a);
    let norm_b = normalize_title(b);
    if norm_a.is_empty() || norm_b.is_empty() {
        return false;
    }

    if norm_a == norm_b {
        return true;
    }
    if norm_a.contains(&norm_b) || norm_b.contains(&norm_a) {
        return true;
    }

    let base_a = base_name(&norm_a);
    let base_b = base_name(&norm_b);
    base_a.len() > 3
        && base_b.len() > 3
        && (base_a == base_b || base_a.contains(&base_b) || base_b.contains(&base_a))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_title() {
        assert_eq!(normalize_title("The Matrix: Reloaded!"), "the matrix reloaded");
        assert_eq!(normalize_title("  Se7en  "), "se7en");
        assert_eq!(normalize_title("WALL·E"), "walle");
    }

    #[test]
    fn test_identical_titles() {
        assert!(is_same_franchise("Alien", "Alien"));
        assert!(is_same_franchise("Alien", "ALIEN!"));
    }

    #[test]
    fn test_substring_containment() {
        assert!(is_same_franchise("The Matrix", "The Matrix Reloaded"));
        assert!(is_same_franchise("The Matrix Reloaded", "The Matrix"));
        assert!(is_same_franchise("The Dark Knight", "The Dark Knight Rises"));
    }

    #[test]
    fn test_unrelated_titles() {
        assert!(!is_same_franchise("Heat", "Se7en"));
        assert!(!is_same_franchise("Halloween", "Hereditary"));
        assert!(!is_same_franchise("The Thing", "The Fog"));
    }

    #[test]
    fn test_numbered_sequels_share_base_name() {
        assert!(is_same_franchise("Rocky II", "Rocky III"));
        assert!(is_same_franchise("Scream 2", "Scream 3"));
    }

    #[test]
    fn test_installment_prefix_stripped() {
        assert!(is_same_franchise("The Godfather Part II", "The Godfather Part III"));
    }

    #[test]
    fn test_subtitle_words_share_base_name() {
        assert!(is_same_franchise("Batman Begins", "Batman Returns"));
        assert!(is_same_franchise("Tron Legacy", "Tron"));
    }

    #[test]
    fn test_short_base_names_never_match() {
        // "It" strips to a 2-character base; too short to trust
        assert!(!is_same_franchise("It 2", "Up 2"));
    }

    #[test]
    fn test_empty_titles_never_match() {
        assert!(!is_same_franchise("", ""));
        assert!(!is_same_franchise("Alien", "!!!"));
    }
}
