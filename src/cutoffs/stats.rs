use serde::{Deserialize, Serialize};

use crate::categories::Round;
use crate::cutoffs::normalize::validate_rank_value;
use crate::cutoffs::{CutoffTable, YearCutoffs, LATEST_YEAR, PREVIOUS_YEAR, TRACKED_YEARS};

/// Summary of one round's cutoff history for a category.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RoundStat {
    pub round: Round,
    pub avg: f64,
    pub latest: f64,
    pub trend: f64,
    pub coverage: u8,
}

impl RoundStat {
    /// `latest` when known, the multi-year average otherwise.
    pub fn baseline(&self) -> f64 {
        if self.latest > 0.0 {
            self.latest
        } else {
            self.avg
        }
    }

    pub fn has_history(&self) -> bool {
        self.avg > 0.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryStats {
    pub category: String,
    pub chain_index: usize,
    pub stats: Vec<RoundStat>,
}

/// Reduces a category's year table to one `RoundStat` per round (r1, r2, r3).
///
/// Returns an empty vector when there is no year data at all.
pub fn compute_round_stats(year_data: Option<&YearCutoffs>) -> Vec<RoundStat> {
    let Some(year_data) = year_data.filter(|years| !years.is_empty()) else {
        return Vec::new();
    };

    Round::ALL
        .iter()
        .map(|round| round_stat(year_data, *round))
        .collect()
}

fn round_stat(year_data: &YearCutoffs, round: Round) -> RoundStat {
    let value_for = |year: &str| -> f64 {
        year_data
            .get(year)
            .and_then(|cutoffs| cutoffs.get(round))
            .and_then(validate_rank_value)
            .unwrap_or(0.0)
    };

    let values: Vec<f64> = TRACKED_YEARS
        .iter()
        .map(|year| value_for(*year))
        .filter(|v| *v > 0.0)
        .collect();
    let coverage = values.len();
    let avg = if coverage == 0 {
        0.0
    } else {
        values.iter().sum::<f64>() / coverage as f64
    };

    let current = value_for(LATEST_YEAR);
    let previous = value_for(PREVIOUS_YEAR);
    let latest = if current > 0.0 { current } else { previous };

    // Always 2025 against 2024, even when `latest` came from 2024. A missing
    // 2025 value therefore reads as a -100% move.
    let trend = if previous > 0.0 {
        (current - previous) / previous.max(1.0)
    } else {
        0.0
    };

    RoundStat {
        round,
        avg,
        latest,
        trend,
        coverage: coverage as u8,
    }
}

/// Round statistics for every category of `chain` that has rows in `table`.
pub fn collect_chain_stats(chain: &[String], table: &CutoffTable) -> Vec<CategoryStats> {
    chain
        .iter()
        .enumerate()
        .filter_map(|(chain_index, category)| {
            let stats = compute_round_stats(table.get(category));
            if stats.is_empty() {
                return None;
            }
            Some(CategoryStats {
                category: category.clone(),
                chain_index,
                stats,
            })
        })
        .collect()
}
