use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::cutoffs::{CutoffTable, RoundCutoffs, YearCutoffs};

/// Coerces a raw cutoff cell to a usable rank.
///
/// Numbers and numeric strings are accepted; anything non-finite, non-positive
/// or unparseable ("NA", "-", "") is treated as missing.
pub fn coerce_cutoff(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let sanitized = s.trim().replace([',', '_', ' '], "");
            sanitized.parse::<f64>().ok()
        }
        _ => None,
    }?;
    validate_rank_value(parsed)
}

pub fn validate_rank_value(value: f64) -> Option<f64> {
    if value.is_finite() && value > 0.0 {
        Some(value)
    } else {
        None
    }
}

pub fn deserialize_cutoff<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(coerce_cutoff))
}

/// Reads a category table where a `null` category or year stands for no data.
pub fn deserialize_table<'de, D>(deserializer: D) -> Result<CutoffTable, D::Error>
where
    D: Deserializer<'de>,
{
    type RawYears = BTreeMap<String, Option<RoundCutoffs>>;
    let raw = Option::<BTreeMap<String, Option<RawYears>>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(category, years)| {
            let years: YearCutoffs = years
                .unwrap_or_default()
                .into_iter()
                .filter_map(|(year, cutoffs)| cutoffs.map(|cutoffs| (year, cutoffs)))
                .collect();
            (category, years)
        })
        .collect())
}
