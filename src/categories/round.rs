use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One seat-allotment pass of a counselling cycle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Round {
    #[serde(alias = "R1")]
    R1,
    #[serde(alias = "R2")]
    R2,
    #[serde(alias = "R3")]
    R3,
}

impl Round {
    pub const ALL: [Round; 3] = [Round::R1, Round::R2, Round::R3];

    pub fn as_key(&self) -> &'static str {
        match self {
            Self::R1 => "r1",
            Self::R2 => "r2",
            Self::R3 => "r3",
        }
    }

    /// Within-counselling competitiveness multiplier. Later rounds admit
    /// deeper into the rank list as higher-ranked candidates withdraw.
    pub fn weight(self) -> f64 {
        match self {
            Self::R1 => 0.86,
            Self::R2 => 0.94,
            Self::R3 => 1.05,
        }
    }

    /// Order in which rounds are tried when the selected one has no cutoff.
    pub fn fallback_order(self) -> [Round; 3] {
        match self {
            Self::R1 => [Round::R1, Round::R2, Round::R3],
            Self::R2 => [Round::R2, Round::R1, Round::R3],
            Self::R3 => [Round::R3, Round::R2, Round::R1],
        }
    }
}

impl Display for Round {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let display = match self {
            Self::R1 => "R1",
            Self::R2 => "R2",
            Self::R3 => "R3",
        };
        write!(f, "{display}")
    }
}

#[derive(Debug, Error)]
#[error("unknown round: {0}")]
pub struct RoundParseError(pub String);

impl FromStr for Round {
    type Err = RoundParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', '_', ' '], "");
        match normalized.as_str() {
            "r1" | "1" | "round1" => Ok(Self::R1),
            "r2" | "2" | "round2" => Ok(Self::R2),
            "r3" | "3" | "round3" => Ok(Self::R3),
            _ => Err(RoundParseError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::Round;

    #[test]
    fn parses_round_aliases() {
        assert_eq!(Round::from_str("r2").expect("r2"), Round::R2);
        assert_eq!(Round::from_str("R3").expect("R3"), Round::R3);
        assert_eq!(Round::from_str("round-1").expect("round-1"), Round::R1);
        assert!(Round::from_str("r4").is_err());
    }

    #[test]
    fn later_rounds_weigh_more() {
        assert!(Round::R1.weight() < Round::R2.weight());
        assert!(Round::R2.weight() < Round::R3.weight());
    }

    #[test]
    fn fallback_order_starts_with_selected_round() {
        for round in Round::ALL {
            assert_eq!(round.fallback_order()[0], round);
        }
        assert_eq!(
            Round::R2.fallback_order(),
            [Round::R2, Round::R1, Round::R3]
        );
    }

    #[test]
    fn deserializes_upper_and_lower_keys() {
        let lower: Round = serde_json::from_str("\"r1\"").expect("lowercase round");
        let upper: Round = serde_json::from_str("\"R1\"").expect("uppercase round");
        assert_eq!(lower, upper);
    }
}
