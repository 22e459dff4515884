pub mod decision;
pub mod report;
pub mod scorer;
pub mod selector;

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::categories::Round;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum ChanceLevel {
    Low,
    Medium,
    High,
}

impl Display for ChanceLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        };
        write!(f, "{label}")
    }
}

/// How crowded the recommended round/category is, the inverse of the chance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum Competition {
    Low,
    Medium,
    High,
}

impl From<ChanceLevel> for Competition {
    fn from(level: ChanceLevel) -> Self {
        match level {
            ChanceLevel::High => Competition::Low,
            ChanceLevel::Medium => Competition::Medium,
            ChanceLevel::Low => Competition::High,
        }
    }
}

impl Display for Competition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        };
        write!(f, "{label}")
    }
}

/// Best-probability outcome across the fallback chain and rounds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeatPrediction {
    pub probability: f64,
    pub level: ChanceLevel,
    pub round: Round,
    pub effective_category: String,
    pub fallback_index: usize,
    pub used_cutoff: f64,
    pub explanation: String,
}

/// Blunt "apply if rank <= X" recommendation derived from cutoff headroom.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DecisionSummary {
    pub recommended_rank: u64,
    pub round: Round,
    pub fallback_category: String,
    pub competition: Competition,
    pub confidence: u8,
    pub probability: f64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RankError {
    #[error("rank must be a positive integer, got {0}")]
    NotPositive(i64),
    #[error("rank {0} is out of range")]
    OutOfRange(i64),
}

/// Validates applicant input before it reaches the scorer.
pub fn validate_rank(raw: i64) -> Result<u32, RankError> {
    if raw <= 0 {
        return Err(RankError::NotPositive(raw));
    }
    u32::try_from(raw).map_err(|_| RankError::OutOfRange(raw))
}

#[cfg(test)]
mod tests {
    use super::{validate_rank, ChanceLevel, Competition, RankError};

    #[test]
    fn rejects_non_positive_ranks() {
        assert_eq!(validate_rank(0), Err(RankError::NotPositive(0)));
        assert_eq!(validate_rank(-5), Err(RankError::NotPositive(-5)));
        assert_eq!(validate_rank(42), Ok(42));
        assert!(matches!(
            validate_rank(i64::MAX),
            Err(RankError::OutOfRange(_))
        ));
    }

    #[test]
    fn competition_is_inverse_of_chance() {
        assert_eq!(Competition::from(ChanceLevel::High), Competition::Low);
        assert_eq!(Competition::from(ChanceLevel::Medium), Competition::Medium);
        assert_eq!(Competition::from(ChanceLevel::Low), Competition::High);
    }

    #[test]
    fn levels_serialize_as_labels() {
        let encoded = serde_json::to_string(&ChanceLevel::High).expect("serialize level");
        assert_eq!(encoded, "\"High\"");
    }
}
