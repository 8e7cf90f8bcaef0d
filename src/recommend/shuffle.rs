use rand::seq::SliceRandom;

/// Returns an unbiased random permutation of a copy of the input
///
/// The caller's sequence is never mutated. Used before diversification so the
/// order in which equally-eligible items compete for a director's cap slot is
/// randomized across calls, not merely the final top-N selection.
pub fn shuffled<T: Clone>(items: &[T]) -> Vec<T> {
    let mut copy = items.to_vec();
    copy.shuffle(&mut rand::rng());
    copy
}
