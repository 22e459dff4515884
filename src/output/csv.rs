use anyhow::Result;

use crate::cutoffs::stats::CategoryStats;
use crate::prediction::report::PredictionReport;
use crate::recommend::Recommendation;

pub fn stats_to_csv(items: &[CategoryStats]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record([
        "category",
        "chain_index",
        "round",
        "avg",
        "latest",
        "trend",
        "coverage",
    ])?;
    for item in items {
        for stat in &item.stats {
            writer.write_record([
                item.category.clone(),
                item.chain_index.to_string(),
                stat.round.as_key().to_string(),
                format!("{:.2}", stat.avg),
                format!("{:.0}", stat.latest),
                format!("{:.4}", stat.trend),
                stat.coverage.to_string(),
            ])?;
        }
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

pub fn report_to_csv(report: &PredictionReport) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record([
        "rank",
        "category",
        "probability",
        "level",
        "round",
        "effective_category",
        "used_cutoff",
        "recommended_rank",
        "decision_round",
        "fallback_category",
        "competition",
        "confidence",
    ])?;
    let prediction = report.prediction.as_ref();
    let decision = report.decision.as_ref();
    writer.write_record([
        report.rank.to_string(),
        report.category.clone(),
        prediction
            .map(|p| format!("{:.4}", p.probability))
            .unwrap_or_default(),
        prediction.map(|p| p.level.to_string()).unwrap_or_default(),
        prediction
            .map(|p| p.round.as_key().to_string())
            .unwrap_or_default(),
        prediction
            .map(|p| p.effective_category.clone())
            .unwrap_or_default(),
        prediction
            .map(|p| format!("{:.0}", p.used_cutoff))
            .unwrap_or_default(),
        decision
            .map(|d| d.recommended_rank.to_string())
            .unwrap_or_default(),
        decision
            .map(|d| d.round.as_key().to_string())
            .unwrap_or_default(),
        decision
            .map(|d| d.fallback_category.clone())
            .unwrap_or_default(),
        decision
            .map(|d| d.competition.to_string())
            .unwrap_or_default(),
        decision
            .map(|d| d.confidence.to_string())
            .unwrap_or_default(),
    ])?;
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

pub fn recommendations_to_csv(items: &[Recommendation]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record([
        "unique_key",
        "college_code",
        "branch_code",
        "category",
        "cutoff",
        "distance_from_rank",
        "eligibility_flag",
        "historically_relaxed",
    ])?;
    for item in items {
        writer.write_record([
            item.unique_key.clone(),
            item.college_code.clone(),
            item.branch_code.clone(),
            item.category.clone(),
            format!("{:.0}", item.cutoff),
            format!("{:.0}", item.distance_from_rank),
            item.eligibility_flag.to_string(),
            item.historically_relaxed.to_string(),
        ])?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}
