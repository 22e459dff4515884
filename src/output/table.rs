use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Row, Table};

use crate::cutoffs::stats::CategoryStats;
use crate::prediction::report::PredictionReport;
use crate::prediction::{ChanceLevel, Competition, DecisionSummary, SeatPrediction};
use crate::recommend::Recommendation;

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn level_cell(level: ChanceLevel) -> Cell {
    let color = match level {
        ChanceLevel::High => Color::Green,
        ChanceLevel::Medium => Color::Yellow,
        ChanceLevel::Low => Color::Red,
    };
    Cell::new(level.to_string()).fg(color)
}

fn competition_cell(competition: Competition) -> Cell {
    let color = match competition {
        Competition::Low => Color::Green,
        Competition::Medium => Color::Yellow,
        Competition::High => Color::Red,
    };
    Cell::new(competition.to_string()).fg(color)
}

pub fn render_prediction_table(prediction: Option<&SeatPrediction>) -> String {
    let Some(p) = prediction else {
        return "No prediction available: no cutoff history for this category chain.".to_string();
    };
    let mut table = new_table();
    table.set_header(vec![
        "Chance",
        "Probability",
        "Round",
        "Category",
        "Fallback Step",
        "Cutoff Used",
    ]);
    table.add_row(Row::from(vec![
        level_cell(p.level),
        Cell::new(format!("{:.1}%", p.probability * 100.0)),
        Cell::new(p.round.to_string()),
        Cell::new(p.effective_category.clone()),
        Cell::new(p.fallback_index.to_string()),
        Cell::new(format!("{:.0}", p.used_cutoff)),
    ]));
    format!("{table}\n{}", p.explanation)
}

pub fn render_decision_table(decision: Option<&DecisionSummary>) -> String {
    let Some(d) = decision else {
        return "No recommendation available: no cutoff history for this category chain."
            .to_string();
    };
    let mut table = new_table();
    table.set_header(vec![
        "Apply If Rank <=",
        "Round",
        "Category",
        "Competition",
        "Confidence",
        "Probability",
    ]);
    table.add_row(Row::from(vec![
        Cell::new(d.recommended_rank.to_string()),
        Cell::new(d.round.to_string()),
        Cell::new(d.fallback_category.clone()),
        competition_cell(d.competition),
        Cell::new(format!("{}%", d.confidence)),
        Cell::new(format!("{:.1}%", d.probability * 100.0)),
    ]));
    table.to_string()
}

pub fn render_report(report: &PredictionReport) -> String {
    format!(
        "Rank {} / {} (chain: {})\n\n{}\n\n{}",
        report.rank,
        report.category,
        report.fallback_chain.join(" -> "),
        render_prediction_table(report.prediction.as_ref()),
        render_decision_table(report.decision.as_ref()),
    )
}

pub fn render_stats_table(items: &[CategoryStats]) -> String {
    let mut table = new_table();
    table.set_header(vec![
        "Category",
        "Chain",
        "Round",
        "Average",
        "Latest",
        "Trend",
        "Years",
    ]);
    for item in items {
        for stat in &item.stats {
            let trend_cell = if stat.trend > 0.0 {
                Cell::new(format!("{:+.1}%", stat.trend * 100.0)).fg(Color::Green)
            } else if stat.trend < 0.0 {
                Cell::new(format!("{:+.1}%", stat.trend * 100.0)).fg(Color::Red)
            } else {
                Cell::new("-")
            };
            table.add_row(Row::from(vec![
                Cell::new(item.category.clone()),
                Cell::new(item.chain_index.to_string()),
                Cell::new(stat.round.to_string()),
                Cell::new(format!("{:.0}", stat.avg)),
                Cell::new(format!("{:.0}", stat.latest)),
                trend_cell,
                Cell::new(format!("{}/4", stat.coverage)),
            ]));
        }
    }
    table.to_string()
}

pub fn render_chain_table(chain: &[String]) -> String {
    let mut table = new_table();
    table.set_header(vec!["Step", "Category"]);
    for (idx, category) in chain.iter().enumerate() {
        table.add_row(vec![idx.to_string(), category.clone()]);
    }
    table.to_string()
}

pub fn render_recommendations_table(items: &[Recommendation]) -> String {
    let mut table = new_table();
    table.set_header(vec![
        "#",
        "College",
        "Branch",
        "Category",
        "Cutoff",
        "Distance",
        "Within Rank",
        "Relaxed",
    ]);
    for (idx, item) in items.iter().enumerate() {
        let within = if item.eligibility_flag {
            Cell::new("YES").fg(Color::Green)
        } else {
            Cell::new("NO").fg(Color::Red)
        };
        table.add_row(Row::from(vec![
            Cell::new((idx + 1).to_string()),
            Cell::new(format!("{} {}", item.college_code, item.college_name)),
            Cell::new(format!("{} {}", item.branch_code, item.branch_name)),
            Cell::new(item.category.clone()),
            Cell::new(format!("{:.0}", item.cutoff)),
            Cell::new(format!("{:.0}", item.distance_from_rank)),
            within,
            Cell::new(if item.historically_relaxed { "yes" } else { "-" }),
        ]));
    }
    table.to_string()
}
