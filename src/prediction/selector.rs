use tracing::debug;

use crate::categories::{resolve_fallback_chain, FallbackOverrides};
use crate::cutoffs::stats::{compute_round_stats, RoundStat};
use crate::cutoffs::CutoffTable;
use crate::prediction::scorer::{chance_level, score_probability};
use crate::prediction::{ChanceLevel, SeatPrediction};

/// Searches every (fallback category, round) pair for the highest admission
/// probability at `rank`.
///
/// Ties keep the first pair seen in chain-then-round order. Returns `None`
/// when the table is empty or no pair in the chain has usable history.
pub fn pick_best_outcome(
    rank: u32,
    category: &str,
    table: &CutoffTable,
    overrides: Option<&FallbackOverrides>,
) -> Option<SeatPrediction> {
    if table.is_empty() {
        return None;
    }

    let chain = resolve_fallback_chain(category, overrides);
    let mut best: Option<(usize, &str, RoundStat)> = None;
    let mut best_probability = 0.0;

    for (chain_index, candidate) in chain.iter().enumerate() {
        for stat in compute_round_stats(table.get(candidate)) {
            let probability = score_probability(rank, &stat, chain_index);
            debug!(
                "candidate {candidate} {} avg={:.0} p={probability:.4}",
                stat.round, stat.avg
            );
            if probability > best_probability {
                best_probability = probability;
                best = Some((chain_index, candidate.as_str(), stat));
            }
        }
    }

    let (fallback_index, effective_category, stat) = best?;
    let level = chance_level(best_probability);
    let used_cutoff = stat.baseline();

    Some(SeatPrediction {
        probability: best_probability,
        level,
        round: stat.round,
        effective_category: effective_category.to_string(),
        fallback_index,
        used_cutoff,
        explanation: explain(rank, category, effective_category, &stat, level),
    })
}

fn explain(
    rank: u32,
    category: &str,
    effective_category: &str,
    stat: &RoundStat,
    level: ChanceLevel,
) -> String {
    let mut text = format!(
        "{level} chance in {} under {effective_category}: historical average cutoff {} across {} year(s) against your rank {rank}.",
        stat.round,
        stat.avg.round() as i64,
        stat.coverage
    );
    if effective_category != category {
        text.push_str(&format!(
            " No stronger outcome under {category}; evaluated via fallback to {effective_category}."
        ));
    }
    text
}
