pub mod stabilize;
pub mod window;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::categories::{resolve_fallback_chain, FallbackOverrides, Round};
use crate::cutoffs::{CutoffTable, TRACKED_YEARS};
use crate::recommend::stabilize::{historically_relaxed, stabilize_cutoff};
use crate::recommend::window::rank_window;

/// Cutoff tables of one college branch, as exported for bulk recommendation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BranchCutoffs {
    pub unique_key: String,
    pub college_code: String,
    #[serde(default)]
    pub college_name: String,
    pub branch_code: String,
    #[serde(default)]
    pub branch_name: String,
    #[serde(default)]
    pub cluster: Option<String>,
    #[serde(default, deserialize_with = "crate::cutoffs::normalize::deserialize_table")]
    pub categories: CutoffTable,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendQuery {
    pub rank: u32,
    pub category: String,
    pub year: String,
    pub round: Round,
    pub cluster: Option<String>,
    pub opening_rank: Option<u32>,
    pub closing_rank: Option<u32>,
}

impl RecommendQuery {
    pub fn new(rank: u32, category: impl Into<String>) -> Self {
        Self {
            rank,
            category: category.into(),
            year: "2025".to_string(),
            round: Round::R1,
            cluster: None,
            opening_rank: None,
            closing_rank: None,
        }
    }

    /// Explicit bounds win; missing ones come from the rank band.
    pub fn window(&self) -> (u32, u32) {
        let (opening, closing) = rank_window(self.rank);
        (
            self.opening_rank.unwrap_or(opening),
            self.closing_rank.unwrap_or(closing),
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub unique_key: String,
    pub college_code: String,
    pub college_name: String,
    pub branch_code: String,
    pub branch_name: String,
    pub cluster: Option<String>,
    pub category: String,
    pub cutoff: f64,
    pub distance_from_rank: f64,
    pub eligibility_flag: bool,
    pub historically_relaxed: bool,
}

/// First cutoff for `year` found while walking `round`'s fallback order.
pub fn resolve_round_cutoff(
    table: &CutoffTable,
    category: &str,
    year: &str,
    round: Round,
) -> Option<f64> {
    let years = table.get(category)?;
    let cutoffs = years.get(year)?;
    round
        .fallback_order()
        .iter()
        .find_map(|candidate| cutoffs.get(*candidate))
}

/// Cutoffs of `round` across tracked years, oldest first.
pub fn multi_year_cutoffs(table: &CutoffTable, category: &str, round: Round) -> Vec<f64> {
    let Some(years) = table.get(category) else {
        return Vec::new();
    };
    TRACKED_YEARS
        .iter()
        .rev()
        .filter_map(|year| years.get(*year).and_then(|cutoffs| cutoffs.get(round)))
        .collect()
}

/// Lists branches whose stabilized cutoff falls inside the applicant's window,
/// one entry per college branch, lowest cutoff first.
pub fn build_recommendations(
    branches: &[BranchCutoffs],
    query: &RecommendQuery,
    overrides: Option<&FallbackOverrides>,
) -> Vec<Recommendation> {
    let (opening, closing) = query.window();
    let (opening, closing) = (f64::from(opening), f64::from(closing));
    let chain = resolve_fallback_chain(&query.category, overrides);
    let rank = f64::from(query.rank);

    let mut by_branch: BTreeMap<(String, String), Recommendation> = BTreeMap::new();

    for branch in branches {
        if let Some(cluster) = &query.cluster {
            if branch.cluster.as_deref() != Some(cluster.as_str()) {
                continue;
            }
        }

        let mut best: Option<(&str, f64)> = None;
        for category in &chain {
            let Some(resolved) =
                resolve_round_cutoff(&branch.categories, category, &query.year, query.round)
            else {
                continue;
            };
            let history = multi_year_cutoffs(&branch.categories, category, query.round);
            let cutoff = stabilize_cutoff(&history).unwrap_or(resolved);

            if cutoff < opening || cutoff > closing {
                continue;
            }
            if best.is_none_or(|(_, current)| cutoff < current) {
                best = Some((category.as_str(), cutoff));
            }
        }

        let Some((category, cutoff)) = best else {
            continue;
        };
        debug!("{} qualifies via {category} at {cutoff:.0}", branch.unique_key);

        let history = multi_year_cutoffs(&branch.categories, category, query.round);
        let candidate = Recommendation {
            unique_key: branch.unique_key.clone(),
            college_code: branch.college_code.clone(),
            college_name: branch.college_name.clone(),
            branch_code: branch.branch_code.clone(),
            branch_name: branch.branch_name.clone(),
            cluster: branch.cluster.clone(),
            category: category.to_string(),
            cutoff,
            distance_from_rank: (cutoff - rank).abs(),
            eligibility_flag: cutoff <= rank,
            historically_relaxed: historically_relaxed(&history, query.rank),
        };

        let key = (branch.college_code.clone(), branch.branch_code.clone());
        match by_branch.get_mut(&key) {
            // The first entry keeps its identity; only the seat outcome moves.
            Some(existing) => {
                if candidate.distance_from_rank < existing.distance_from_rank {
                    existing.category = candidate.category;
                    existing.cutoff = candidate.cutoff;
                    existing.distance_from_rank = candidate.distance_from_rank;
                    existing.eligibility_flag = candidate.eligibility_flag;
                    existing.historically_relaxed = candidate.historically_relaxed;
                }
            }
            None => {
                by_branch.insert(key, candidate);
            }
        }
    }

    let mut recommendations: Vec<Recommendation> = by_branch.into_values().collect();
    recommendations.sort_by(|a, b| a.cutoff.total_cmp(&b.cutoff));
    recommendations
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{
        build_recommendations, multi_year_cutoffs, resolve_round_cutoff, BranchCutoffs,
        RecommendQuery,
    };
    use crate::categories::Round;
    use crate::cutoffs::CutoffTable;

    fn branch(key: &str, college: &str, code: &str, categories: serde_json::Value) -> BranchCutoffs {
        BranchCutoffs {
            unique_key: key.to_string(),
            college_code: college.to_string(),
            college_name: format!("College {college}"),
            branch_code: code.to_string(),
            branch_name: format!("Branch {code}"),
            cluster: Some("ENG".to_string()),
            categories: serde_json::from_value(categories).expect("failed to parse categories"),
        }
    }

    #[test]
    fn round_cutoff_follows_round_fallback_order() {
        let table: CutoffTable = serde_json::from_value(json!({
            "GM": { "2025": { "r1": 900, "r3": 1100 } }
        }))
        .expect("failed to parse table");
        assert_eq!(resolve_round_cutoff(&table, "GM", "2025", Round::R2), Some(900.0));
        assert_eq!(resolve_round_cutoff(&table, "GM", "2025", Round::R3), Some(1100.0));
        assert_eq!(resolve_round_cutoff(&table, "GM", "2024", Round::R1), None);
    }

    #[test]
    fn multi_year_history_is_chronological() {
        let table: CutoffTable = serde_json::from_value(json!({
            "GM": {
                "2025": { "r1": 400 },
                "2022": { "r1": 100 },
                "2023": { "r1": 200 }
            }
        }))
        .expect("failed to parse table");
        assert_eq!(
            multi_year_cutoffs(&table, "GM", Round::R1),
            vec![100.0, 200.0, 400.0]
        );
    }

    #[test]
    fn filters_to_window_and_sorts_by_cutoff() {
        let branches = vec![
            branch("E001CS", "E001", "CS", json!({
                "GM": { "2025": { "r1": 12000 }, "2024": { "r1": 11800 } }
            })),
            branch("E002EC", "E002", "EC", json!({
                "GM": { "2025": { "r1": 8000 } }
            })),
            branch("E003ME", "E003", "ME", json!({
                "GM": { "2025": { "r1": 90000 } }
            })),
        ];
        let query = RecommendQuery::new(10_000, "GM");
        let recommendations = build_recommendations(&branches, &query, None);

        assert_eq!(recommendations.len(), 2);
        assert_eq!(recommendations[0].unique_key, "E002EC");
        assert!(recommendations[0].eligibility_flag);
        assert_eq!(recommendations[1].unique_key, "E001CS");
        assert_eq!(recommendations[1].cutoff, 12000.0);
        assert_eq!(recommendations[1].distance_from_rank, 2000.0);
    }

    #[test]
    fn keeps_lowest_qualifying_category_per_branch() {
        let branches = vec![branch("E001CS", "E001", "CS", json!({
            "2AR": { "2025": { "r1": 15000 } },
            "2AG": { "2025": { "r1": 13000 } },
            "GM": { "2025": { "r1": 11000 } }
        }))];
        let query = RecommendQuery::new(10_000, "2AR");
        let recommendations = build_recommendations(&branches, &query, None);
        assert_eq!(recommendations.len(), 1);
        assert_eq!(recommendations[0].category, "GM");
    }

    #[test]
    fn duplicate_branch_keeps_first_identity_with_closest_cutoff() {
        let branches = vec![
            branch("E001CS-A", "E001", "CS", json!({ "GM": { "2025": { "r1": 14000 } } })),
            branch("E001CS-B", "E001", "CS", json!({ "GM": { "2025": { "r1": 10500 } } })),
        ];
        let query = RecommendQuery::new(10_000, "GM");
        let recommendations = build_recommendations(&branches, &query, None);
        assert_eq!(recommendations.len(), 1);
        assert_eq!(recommendations[0].unique_key, "E001CS-A");
        assert_eq!(recommendations[0].cutoff, 10500.0);
        assert_eq!(recommendations[0].distance_from_rank, 500.0);
    }

    #[test]
    fn honours_cluster_filter_and_explicit_window() {
        let mut other = branch("E009AR", "E009", "AR", json!({
            "GM": { "2025": { "r1": 10000 } }
        }));
        other.cluster = Some("ARCH".to_string());
        let branches = vec![
            other,
            branch("E001CS", "E001", "CS", json!({ "GM": { "2025": { "r1": 10000 } } })),
        ];

        let mut query = RecommendQuery::new(10_000, "GM");
        query.cluster = Some("ARCH".to_string());
        let recommendations = build_recommendations(&branches, &query, None);
        assert_eq!(recommendations.len(), 1);
        assert_eq!(recommendations[0].unique_key, "E009AR");

        query.cluster = None;
        query.opening_rank = Some(10_001);
        assert!(build_recommendations(&branches, &query, None).is_empty());
    }
}
