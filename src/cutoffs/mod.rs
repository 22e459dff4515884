pub mod loader;
pub mod normalize;
pub mod stats;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::categories::{FallbackOverrides, Round};

/// Years tracked by the cutoff tables, most recent first.
pub const TRACKED_YEARS: [&str; 4] = ["2025", "2024", "2023", "2022"];
pub const LATEST_YEAR: &str = "2025";
pub const PREVIOUS_YEAR: &str = "2024";

/// Cutoff ranks of one year. `None` means no usable data for that round.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RoundCutoffs {
    #[serde(default, deserialize_with = "normalize::deserialize_cutoff")]
    pub r1: Option<f64>,
    #[serde(default, deserialize_with = "normalize::deserialize_cutoff")]
    pub r2: Option<f64>,
    #[serde(default, deserialize_with = "normalize::deserialize_cutoff")]
    pub r3: Option<f64>,
}

impl RoundCutoffs {
    pub fn get(&self, round: Round) -> Option<f64> {
        match round {
            Round::R1 => self.r1,
            Round::R2 => self.r2,
            Round::R3 => self.r3,
        }
    }

    pub fn is_empty(&self) -> bool {
        Round::ALL.iter().all(|round| self.get(*round).is_none())
    }
}

/// Year ("2022".."2025") -> per-round cutoffs for one category.
pub type YearCutoffs = BTreeMap<String, RoundCutoffs>;

/// Category code -> year -> per-round cutoffs.
pub type CutoffTable = BTreeMap<String, YearCutoffs>;

/// Payload served by the cutoff endpoint for a single branch.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CutoffResponse {
    #[serde(default, deserialize_with = "normalize::deserialize_table")]
    pub categories: CutoffTable,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fall_back: Option<FallbackOverrides>,
}

impl CutoffResponse {
    pub fn year_data(&self, category: &str) -> Option<&YearCutoffs> {
        self.categories.get(category)
    }

    pub fn cutoff(&self, category: &str, year: &str, round: Round) -> Option<f64> {
        self.categories
            .get(category)?
            .get(year)?
            .get(round)
    }
}
