use crate::cutoffs::stats::RoundStat;
use crate::prediction::ChanceLevel;

const ADVANTAGE_WITHIN_CUTOFF: f64 = 0.58;
const ADVANTAGE_BEYOND_CUTOFF: f64 = 0.30;
const CLOSENESS_WEIGHT: f64 = 0.42;
const TREND_BOOST_CAP: f64 = 0.12;
const TREND_DAMPING_CAP: f64 = 0.10;
const FALLBACK_STEP_PENALTY: f64 = 0.08;
const FALLBACK_PENALTY_FLOOR: f64 = 0.70;

const HIGH_CHANCE: f64 = 0.70;
const MEDIUM_CHANCE: f64 = 0.40;

/// Probability in `[0, 1]` of clearing `stat`'s cutoff with `rank`, evaluated
/// `fallback_index` steps down the applicant's fallback chain.
///
/// Returns 0 when the round has no usable history.
pub fn score_probability(rank: u32, stat: &RoundStat, fallback_index: usize) -> f64 {
    if !stat.has_history() {
        return 0.0;
    }

    let rank = f64::from(rank);
    let closeness = (1.0 - (rank - stat.avg).abs() / stat.avg).max(0.0);
    let advantage = if rank <= stat.avg {
        ADVANTAGE_WITHIN_CUTOFF
    } else {
        ADVANTAGE_BEYOND_CUTOFF
    };

    let raw = (advantage + CLOSENESS_WEIGHT * closeness)
        * stat.round.weight()
        * trend_boost(stat.trend)
        * fallback_penalty(fallback_index);
    raw.clamp(0.0, 1.0)
}

/// Rising cutoffs (easier admission) boost odds, tightening ones dampen them.
pub fn trend_boost(trend: f64) -> f64 {
    if trend > 0.0 {
        1.0 + trend.min(TREND_BOOST_CAP)
    } else {
        1.0 - trend.abs().min(TREND_DAMPING_CAP)
    }
}

pub fn fallback_penalty(fallback_index: usize) -> f64 {
    (1.0 - FALLBACK_STEP_PENALTY * fallback_index as f64).max(FALLBACK_PENALTY_FLOOR)
}

pub fn chance_level(probability: f64) -> ChanceLevel {
    if probability >= HIGH_CHANCE {
        ChanceLevel::High
    } else if probability >= MEDIUM_CHANCE {
        ChanceLevel::Medium
    } else {
        ChanceLevel::Low
    }
}

#[cfg(test)]
mod tests {
    use super::{chance_level, fallback_penalty, score_probability, trend_boost};
    use crate::categories::Round;
    use crate::cutoffs::stats::RoundStat;
    use crate::prediction::ChanceLevel;

    fn stat(round: Round, avg: f64, trend: f64) -> RoundStat {
        RoundStat {
            round,
            avg,
            latest: avg,
            trend,
            coverage: 2,
        }
    }

    #[test]
    fn zero_average_cannot_be_scored() {
        let empty = stat(Round::R2, 0.0, 0.3);
        assert_eq!(score_probability(1, &empty, 0), 0.0);
        assert_eq!(score_probability(90_000, &empty, 3), 0.0);

        let unusable = stat(Round::R1, f64::NAN, 0.0);
        assert!(!unusable.has_history());
        assert_eq!(score_probability(500, &unusable, 0), 0.0);
    }

    #[test]
    fn rank_at_average_in_round_one() {
        let s = stat(Round::R1, 4900.0, 200.0 / 4800.0);
        let p = score_probability(4900, &s, 0);
        let expected = 1.0 * 0.86 * (1.0 + 200.0 / 4800.0);
        assert!((p - expected).abs() < 1e-9);
        assert!((p - 0.896).abs() < 1e-3);
        assert_eq!(chance_level(p), ChanceLevel::High);
    }

    #[test]
    fn rank_beyond_average_loses_advantage() {
        let s = stat(Round::R2, 10_000.0, 0.0);
        let inside = score_probability(9_000, &s, 0);
        let outside = score_probability(11_000, &s, 0);
        assert!((inside - (0.58 + 0.42 * 0.9) * 0.94).abs() < 1e-9);
        assert!((outside - (0.30 + 0.42 * 0.9) * 0.94).abs() < 1e-9);
        assert!(inside > outside);
    }

    #[test]
    fn probability_is_clamped_to_one() {
        let s = stat(Round::R3, 5000.0, 0.5);
        assert_eq!(score_probability(5000, &s, 0), 1.0);
    }

    #[test]
    fn trend_boost_is_capped_both_ways() {
        assert!((trend_boost(0.05) - 1.05).abs() < 1e-12);
        assert!((trend_boost(0.9) - 1.12).abs() < 1e-12);
        assert!((trend_boost(-0.04) - 0.96).abs() < 1e-12);
        assert!((trend_boost(-1.0) - 0.90).abs() < 1e-12);
        assert_eq!(trend_boost(0.0), 1.0);
    }

    #[test]
    fn fallback_penalty_steps_down_to_floor() {
        assert_eq!(fallback_penalty(0), 1.0);
        assert!((fallback_penalty(1) - 0.92).abs() < 1e-12);
        assert!((fallback_penalty(3) - 0.76).abs() < 1e-12);
        assert!((fallback_penalty(4) - 0.70).abs() < 1e-12);
        assert!((fallback_penalty(12) - 0.70).abs() < 1e-12);
    }

    #[test]
    fn chance_level_boundaries_are_inclusive() {
        assert_eq!(chance_level(0.70), ChanceLevel::High);
        assert_eq!(chance_level(0.699_999), ChanceLevel::Medium);
        assert_eq!(chance_level(0.40), ChanceLevel::Medium);
        assert_eq!(chance_level(0.399_999), ChanceLevel::Low);
        assert_eq!(chance_level(0.0), ChanceLevel::Low);
    }
}
