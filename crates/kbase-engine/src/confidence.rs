use kbase_core::types::RetrievalResult;

/// Positional weights for ranks 1, 2 and 3.
pub const CONFIDENCE_WEIGHTS: [f32; 3] = [0.5, 0.3, 0.2];

/// Weighted sum of the top three similarity scores, clamped to `[0, 1]`.
///
/// Shorter result lists only use the leading weights; nothing is
/// renormalized, so a lone perfect hit scores `0.5`.
pub fn score_confidence(results: &[RetrievalResult]) -> f32 {
    let weighted: f32 = results
        .iter()
        .zip(CONFIDENCE_WEIGHTS)
        .map(|(r, w)| r.similarity_score * w)
        .sum();
    // max/min rather than clamp so a NaN score collapses to 0
    weighted.max(0.0).min(1.0)
}
