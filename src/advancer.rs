//! The random walk with drift that moves a lane forward every tick.
//!
//! The deterministic part is what a perfectly steady transfer at `rate_kbs` would reach after
//! `elapsed` seconds. On top of that we add a few pieces of noise in either direction, real
//! clients finish pieces in bursts and a straight ramp gives the game away.

use crate::domain_knowledge::{BYTES_PER_KB, JITTER_PIECES};
use rand::{Rng, SeedableRng, rngs::SmallRng};
use std::num::NonZeroU64;
use tracing::trace;

/// Source of the per-advance perturbation, in pieces.
///
/// Implementations must stay within `[-JITTER_PIECES, JITTER_PIECES]`.
pub trait Jitter {
    fn next_offset(&mut self) -> i64;
}

/// Uniform jitter backed by a small fast rng
#[derive(Debug, Clone)]
pub struct RngJitter {
    rng: SmallRng,
}

impl RngJitter {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        let seed: u64 = rand::rng().random();
        Self::from_seed(seed)
    }
}

impl Jitter for RngJitter {
    fn next_offset(&mut self) -> i64 {
        self.rng.random_range(-JITTER_PIECES..=JITTER_PIECES)
    }
}

impl<J: Jitter + ?Sized> Jitter for &mut J {
    fn next_offset(&mut self) -> i64 {
        (**self).next_offset()
    }
}

#[derive(Debug, Clone)]
pub struct ProgressAdvancer<J> {
    jitter: J,
}

impl<J: Jitter> ProgressAdvancer<J> {
    pub fn new(jitter: J) -> Self {
        Self { jitter }
    }

    /// Computes where a lane currently at `current` bytes should be next.
    ///
    /// The result is always piece aligned unless it had to be clamped to `ceiling`. A result that
    /// would be negative is floored at 0.
    pub fn advance(
        &mut self,
        current: u64,
        rate_kbs: i64,
        piece_size: NonZeroU64,
        elapsed_secs: u64,
        ceiling: Option<u64>,
    ) -> u64 {
        let piece = i128::from(piece_size.get());
        let raw_target =
            i128::from(current) + i128::from(rate_kbs) * i128::from(BYTES_PER_KB) * i128::from(elapsed_secs);

        // integer division truncates toward zero, same as casting a float quotient
        let offset = self.jitter.next_offset();
        let pieces = raw_target / piece + i128::from(offset);
        let next = pieces * piece;

        trace!(current, raw_target = %raw_target, offset, next = %next, "advanced lane");

        let next = u64::try_from(next.max(0)).unwrap_or(u64::MAX);
        match ceiling {
            Some(ceiling) if next > ceiling => ceiling,
            _ => next,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Replays a fixed list of offsets, repeating the last one once exhausted
    #[derive(Debug, Clone)]
    pub(crate) struct ScriptedJitter {
        offsets: VecDeque<i64>,
        last: i64,
    }

    impl ScriptedJitter {
        pub(crate) fn new(offsets: impl IntoIterator<Item = i64>) -> Self {
            Self {
                offsets: offsets.into_iter().collect(),
                last: 0,
            }
        }

        pub(crate) fn constant(offset: i64) -> Self {
            Self {
                offsets: VecDeque::new(),
                last: offset,
            }
        }
    }

    impl Jitter for ScriptedJitter {
        fn next_offset(&mut self) -> i64 {
            if let Some(offset) = self.offsets.pop_front() {
                self.last = offset;
            }
            self.last
        }
    }

    const PIECE: NonZeroU64 = NonZeroU64::new(16384).unwrap();
    const TOTAL: u64 = 163_840;

    #[test]
    fn rng_jitter_stays_in_bounds() {
        let mut jitter = RngJitter::from_seed(0xC0FFEE);
        let mut seen_min = false;
        let mut seen_max = false;
        for _ in 0..10_000 {
            let offset = jitter.next_offset();
            assert!((-JITTER_PIECES..=JITTER_PIECES).contains(&offset));
            seen_min |= offset == -JITTER_PIECES;
            seen_max |= offset == JITTER_PIECES;
        }
        assert!(seen_min && seen_max);
    }

    #[test]
    fn same_seed_same_feed() {
        let mut a = ProgressAdvancer::new(RngJitter::from_seed(42));
        let mut b = ProgressAdvancer::new(RngJitter::from_seed(42));
        for i in 0..100 {
            assert_eq!(
                a.advance(i * 1000, 50, PIECE, 30, None),
                b.advance(i * 1000, 50, PIECE, 30, None)
            );
        }
    }

    #[test]
    fn output_is_piece_aligned() {
        let mut advancer = ProgressAdvancer::new(RngJitter::from_seed(7));
        for current in [0u64, 1, 16_383, 16_385, 1_000_000, 987_654_321] {
            for rate in [0i64, 1, 100, 5_000] {
                for elapsed in [0u64, 1, 17, 18_000] {
                    let next = advancer.advance(current, rate, PIECE, elapsed, None);
                    assert_eq!(next % PIECE.get(), 0);
                }
            }
        }
    }

    #[test]
    fn exact_output_for_known_jitter() {
        // 16384 + 100 * 1024 * 10 = 1040384 -> 63.5 pieces -> 63 + 3 = 66 pieces
        let mut advancer = ProgressAdvancer::new(ScriptedJitter::constant(3));
        assert_eq!(advancer.advance(16_384, 100, PIECE, 10, None), 66 * 16_384);

        let mut advancer = ProgressAdvancer::new(ScriptedJitter::constant(-10));
        assert_eq!(advancer.advance(16_384, 100, PIECE, 10, None), 53 * 16_384);
    }

    #[test]
    fn ceiling_is_never_exceeded() {
        let mut advancer = ProgressAdvancer::new(RngJitter::from_seed(1));
        for current in (0..=TOTAL).step_by(4096) {
            let next = advancer.advance(current, 10, PIECE, 5, Some(TOTAL));
            assert!(next <= TOTAL);
        }
    }

    #[test]
    fn long_announce_window_slams_into_ceiling() {
        for offset in -JITTER_PIECES..=JITTER_PIECES {
            let mut advancer = ProgressAdvancer::new(ScriptedJitter::constant(offset));
            assert_eq!(advancer.advance(16_384, 100, PIECE, 18_000, Some(TOTAL)), TOTAL);
        }
    }

    #[test]
    fn zero_rate_only_moves_by_jitter() {
        let current = 50 * 16_384 + 123;
        for offset in -JITTER_PIECES..=JITTER_PIECES {
            let mut advancer = ProgressAdvancer::new(ScriptedJitter::constant(offset));
            let next = advancer.advance(current, 0, PIECE, 18_000, None);
            let expected = (50 + offset) as u64 * 16_384;
            assert_eq!(next, expected);
            assert!(next.abs_diff(current) <= 10 * 16_384 + 123);
        }
    }

    #[test]
    fn can_stutter_backwards() {
        let mut advancer = ProgressAdvancer::new(ScriptedJitter::constant(-4));
        let next = advancer.advance(20 * 16_384, 0, PIECE, 0, None);
        assert_eq!(next, 16 * 16_384);
    }

    #[test]
    fn negative_results_floor_at_zero() {
        for offset in -JITTER_PIECES..=JITTER_PIECES {
            let mut advancer = ProgressAdvancer::new(ScriptedJitter::constant(offset));
            let next = advancer.advance(0, 0, PIECE, 0, None);
            assert_eq!(next, offset.max(0) as u64 * 16_384);
        }
    }

    #[test]
    fn negative_rate_pulls_the_lane_down() {
        // 100 pieces - 10 KB/s * 1024 * 16 s = 100 - 10 pieces
        let mut advancer = ProgressAdvancer::new(ScriptedJitter::constant(-2));
        assert_eq!(advancer.advance(100 * 16_384, -10, PIECE, 16, None), 88 * 16_384);
    }

    #[test]
    fn scripted_jitter_replays_in_order() {
        let mut jitter = ScriptedJitter::new([1, -1, 5]);
        assert_eq!(
            (0..5).map(|_| jitter.next_offset()).collect::<Vec<_>>(),
            vec![1, -1, 5, 5, 5]
        );
    }
}
