use tracing::debug;

use crate::categories::{resolve_fallback_chain, FallbackOverrides};
use crate::cutoffs::stats::{compute_round_stats, RoundStat};
use crate::cutoffs::CutoffTable;
use crate::prediction::scorer::chance_level;
use crate::prediction::{Competition, DecisionSummary};

const SAFETY_MARGIN: f64 = 0.98;
const CONFIDENCE_BASE: i32 = 50;
const CONFIDENCE_PER_YEAR: i32 = 10;
const CONFIDENCE_RISING_BONUS: i32 = 8;
const CONFIDENCE_MIN: i32 = 40;
const CONFIDENCE_MAX: i32 = 98;
const PROBABILITY_SCALE: f64 = 0.65;
const RISING_ADJUSTMENT: f64 = 0.08;
const FALLING_ADJUSTMENT: f64 = -0.04;

/// Picks the (fallback category, round) pair with the most headroom, i.e. the
/// largest round-weighted cutoff, and states a safe rank threshold for it.
///
/// This deliberately uses its own probability proxy rather than
/// `score_probability`: the two answer different questions and are kept apart.
pub fn build_decision(
    category: &str,
    table: &CutoffTable,
    overrides: Option<&FallbackOverrides>,
) -> Option<DecisionSummary> {
    let chain = resolve_fallback_chain(category, overrides);
    let mut best: Option<(&str, RoundStat)> = None;
    let mut best_weighted = 0.0;

    for candidate in &chain {
        for stat in compute_round_stats(table.get(candidate)) {
            let weighted = stat.baseline() * stat.round.weight();
            if weighted > best_weighted {
                debug!("decision candidate {candidate} {} weighted={weighted:.1}", stat.round);
                best_weighted = weighted;
                best = Some((candidate.as_str(), stat));
            }
        }
    }

    let (fallback_category, stat) = best?;
    let rising = stat.trend > 0.0;

    let recommended_rank = (stat.baseline() * SAFETY_MARGIN).round() as u64;

    let confidence = (CONFIDENCE_BASE
        + i32::from(stat.coverage) * CONFIDENCE_PER_YEAR
        + if rising { CONFIDENCE_RISING_BONUS } else { 0 })
    .clamp(CONFIDENCE_MIN, CONFIDENCE_MAX);

    let adjustment = if rising {
        RISING_ADJUSTMENT
    } else {
        FALLING_ADJUSTMENT
    };
    let probability = (PROBABILITY_SCALE * stat.round.weight() + adjustment).clamp(0.0, 1.0);

    Some(DecisionSummary {
        recommended_rank,
        round: stat.round,
        fallback_category: fallback_category.to_string(),
        competition: Competition::from(chance_level(probability)),
        confidence: confidence as u8,
        probability,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::build_decision;
    use crate::categories::Round;
    use crate::cutoffs::CutoffTable;
    use crate::prediction::Competition;

    fn table(value: serde_json::Value) -> CutoffTable {
        serde_json::from_value(value).expect("failed to parse cutoff table")
    }

    #[test]
    fn empty_table_has_no_decision() {
        assert!(build_decision("GM", &CutoffTable::new(), None).is_none());
    }

    #[test]
    fn chooses_largest_weighted_cutoff() {
        let cutoffs = table(json!({
            "GM": {
                "2025": { "r1": 10000, "r2": 10500, "r3": 9000 },
                "2024": { "r1": 9500, "r2": 10000, "r3": 8800 }
            }
        }));
        // r1 8600, r2 9870, r3 9450
        let decision = build_decision("GM", &cutoffs, None).expect("decision");
        assert_eq!(decision.round, Round::R2);
        assert_eq!(decision.fallback_category, "GM");
        assert_eq!(decision.recommended_rank, 10290);
        // coverage 2, rising trend
        assert_eq!(decision.confidence, 78);
        assert!((decision.probability - (0.65 * 0.94 + 0.08)).abs() < 1e-9);
        assert_eq!(decision.competition, Competition::Medium);
    }

    #[test]
    fn headroom_can_come_from_fallback_category() {
        let cutoffs = table(json!({
            "3BG": { "2025": { "r1": 30000 } },
            "GM": { "2025": { "r3": 42000 } }
        }));
        let decision = build_decision("3BG", &cutoffs, None).expect("decision");
        assert_eq!(decision.fallback_category, "GM");
        assert_eq!(decision.round, Round::R3);
        assert_eq!(decision.recommended_rank, 41160);
        // coverage 1, no trend
        assert_eq!(decision.confidence, 60);
        assert!((decision.probability - (0.65 * 1.05 - 0.04)).abs() < 1e-9);
        assert_eq!(decision.competition, Competition::Medium);
    }

    #[test]
    fn rising_late_round_reads_as_low_competition() {
        let cutoffs = table(json!({
            "SCG": {
                "2025": { "r3": 60000 },
                "2024": { "r3": 55000 },
                "2023": { "r3": 52000 },
                "2022": { "r3": 50000 }
            }
        }));
        let decision = build_decision("SCG", &cutoffs, None).expect("decision");
        // 50 + 40 + 8 = 98, at the cap
        assert_eq!(decision.confidence, 98);
        assert_eq!(decision.competition, Competition::Low);
    }

    #[test]
    fn falling_round_one_reads_as_medium_competition() {
        let cutoffs = table(json!({
            "GM": { "2025": { "r1": 4000 }, "2024": { "r1": 5000 } }
        }));
        let decision = build_decision("GM", &cutoffs, None).expect("decision");
        assert!((decision.probability - (0.65 * 0.86 - 0.04)).abs() < 1e-9);
        assert_eq!(decision.competition, Competition::Medium);
        assert_eq!(decision.confidence, 70);
    }

    #[test]
    fn uses_average_when_latest_is_missing() {
        let cutoffs = table(json!({
            "GM": { "2023": { "r2": 7000 }, "2022": { "r2": 8000 } }
        }));
        let decision = build_decision("GM", &cutoffs, None).expect("decision");
        assert_eq!(decision.round, Round::R2);
        assert_eq!(decision.recommended_rank, 7350);
    }

    #[test]
    fn chain_without_usable_rows_has_no_decision() {
        let cutoffs = table(json!({
            "1G": { "2025": { "r1": 0 } },
            "STG": { "2025": { "r1": 900 } }
        }));
        assert!(build_decision("1G", &cutoffs, None).is_none());
    }
}
