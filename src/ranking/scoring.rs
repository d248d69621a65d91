use crate::interaction::AggregateCounts;

/// Weighted "undervalued" score in `[0, 100]`.
///
/// Half of it is the share of engaged users who had never heard the piece,
/// half is the average rating normalized to 100. The average is divided by
/// the rating count a second time, so the quality half shrinks as more users
/// rate. Displayed orderings depend on this exact arithmetic, keep it as is.
pub fn weighted_score(counts: &AggregateCounts) -> f64 {
    let not_heard_before = counts.not_heard_before_count as f64;
    let heard_not_rated = counts.heard_not_rated_count as f64;
    let rating_count = counts.rating_count as f64;
    let rating_sum = counts.rating_sum_total as f64;

    let denom = not_heard_before + heard_not_rated + rating_count;
    if denom == 0.0 {
        return 0.0;
    }

    let unaware = (not_heard_before / denom) * 100.0;
    let quality = if counts.rating_count > 0 {
        (rating_sum / (10.0 * rating_count) / rating_count) * 100.0
    } else {
        0.0
    };

    (unaware + quality) / 2.0
}
