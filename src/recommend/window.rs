use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RankBand {
    Tight,
    Medium,
    Wide,
    VeryWide,
}

impl RankBand {
    /// (opening, closing) multipliers applied to the applicant rank.
    fn multipliers(self) -> (f64, f64) {
        match self {
            Self::Tight => (0.4, 2.5),
            Self::Medium => (0.6, 3.0),
            Self::Wide => (0.7, 3.5),
            Self::VeryWide => (0.8, 4.0),
        }
    }
}

pub fn rank_band(rank: u32) -> RankBand {
    match rank {
        0..=1_000 => RankBand::Tight,
        1_001..=5_000 => RankBand::Medium,
        5_001..=20_000 => RankBand::Wide,
        _ => RankBand::VeryWide,
    }
}

/// Cutoff range worth showing to an applicant at `rank`.
pub fn rank_window(rank: u32) -> (u32, u32) {
    let (opening, closing) = rank_band(rank).multipliers();
    let rank = f64::from(rank);
    ((rank * opening) as u32, (rank * closing) as u32)
}

#[cfg(test)]
mod tests {
    use super::{rank_band, rank_window, RankBand};

    #[test]
    fn bands_by_rank() {
        assert_eq!(rank_band(1_000), RankBand::Tight);
        assert_eq!(rank_band(1_001), RankBand::Medium);
        assert_eq!(rank_band(20_000), RankBand::Wide);
        assert_eq!(rank_band(20_001), RankBand::VeryWide);
    }

    #[test]
    fn window_scales_with_band() {
        assert_eq!(rank_window(800), (320, 2000));
        assert_eq!(rank_window(4_000), (2_400, 12_000));
        assert_eq!(rank_window(10_000), (7_000, 35_000));
        assert_eq!(rank_window(50_000), (40_000, 200_000));
    }
}
