/// Squared Euclidean distance. Callers guarantee equal lengths.
pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b).map(|(x, y)| { let d = x - y; d * d }).sum()
}

/// Maps a squared L2 distance to a similarity in `(0, 1]`.
///
/// `1 / (1 + d)` is monotonic and bounded: identical vectors score `1.0`
/// and the score only approaches `0` as the distance grows. It is not
/// linear and not a probability. For L2-normalized embeddings `d` lies in
/// `[0, 4]`, so scores never drop below `0.2`, and halving a distance does
/// not double the score.
pub fn similarity_from_distance(distance: f32) -> f32 {
    1.0 / (1.0 + distance.max(0.0))
}
