use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::categories::{resolve_fallback_chain, FallbackOverrides};
use crate::cutoffs::CutoffTable;
use crate::prediction::decision::build_decision;
use crate::prediction::selector::pick_best_outcome;
use crate::prediction::{DecisionSummary, SeatPrediction};

/// Everything the presentation layer renders for one applicant and branch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionReport {
    pub rank: u32,
    pub category: String,
    pub fallback_chain: Vec<String>,
    pub prediction: Option<SeatPrediction>,
    pub decision: Option<DecisionSummary>,
    pub generated_at: DateTime<Utc>,
}

impl PredictionReport {
    pub fn is_available(&self) -> bool {
        self.prediction.is_some() || self.decision.is_some()
    }
}

pub fn build_report(
    rank: u32,
    category: &str,
    table: &CutoffTable,
    overrides: Option<&FallbackOverrides>,
) -> PredictionReport {
    PredictionReport {
        rank,
        category: category.to_string(),
        fallback_chain: resolve_fallback_chain(category, overrides),
        prediction: pick_best_outcome(rank, category, table, overrides),
        decision: build_decision(category, table, overrides),
        generated_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::build_report;
    use crate::cutoffs::CutoffTable;

    #[test]
    fn report_combines_both_strategies() {
        let table: CutoffTable = serde_json::from_value(json!({
            "GM": { "2025": { "r1": 5000 }, "2024": { "r1": 4800 } }
        }))
        .expect("failed to parse table");
        let report = build_report(4900, "GMK", &table, None);
        assert_eq!(report.fallback_chain, vec!["GMK", "GM"]);
        assert!(report.is_available());
        let prediction = report.prediction.expect("prediction");
        assert_eq!(prediction.fallback_index, 1);
        let decision = report.decision.expect("decision");
        assert_eq!(decision.fallback_category, "GM");
    }

    #[test]
    fn empty_table_reports_nothing_available() {
        let report = build_report(100, "GM", &CutoffTable::new(), None);
        assert!(!report.is_available());
    }
}
