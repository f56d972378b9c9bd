use std::num::NonZeroU64;

/// Converts a completion percentage into a starting byte count, aligned down to a piece boundary.
///
/// Percentages above 100 are not rejected here and may land past `total_size`.
pub fn estimate(total_size: u64, piece_size: NonZeroU64, percent: i64) -> u64 {
    if percent <= 0 {
        return 0;
    }

    let piece = u128::from(piece_size.get());
    // floor(percent * total / 100 / piece) == floor(percent * total / (100 * piece)) for integers
    let pieces = (percent as u128 * u128::from(total_size)) / (100 * piece);
    u64::try_from(pieces * piece).unwrap_or(u64::MAX)
}
