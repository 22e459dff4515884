use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use admission_oracle::categories::{
    layer_overrides, parse_category, resolve_fallback_chain, FallbackOverrides, Round,
};
use admission_oracle::config::{Config, ConfigOverrides};
use admission_oracle::cutoffs::loader::{load_cutoff_response, read_json};
use admission_oracle::cutoffs::stats::{collect_chain_stats, CategoryStats};
use admission_oracle::cutoffs::CutoffResponse;
use admission_oracle::output::csv::{recommendations_to_csv, report_to_csv, stats_to_csv};
use admission_oracle::output::json::render_json;
use admission_oracle::output::table::{
    render_chain_table, render_decision_table, render_recommendations_table, render_report,
    render_stats_table,
};
use admission_oracle::prediction::decision::build_decision;
use admission_oracle::prediction::report::{build_report, PredictionReport};
use admission_oracle::prediction::{validate_rank, DecisionSummary};
use admission_oracle::recommend::{
    build_recommendations, BranchCutoffs, RecommendQuery, Recommendation,
};
use admission_oracle::server::run_server;
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Debug, Parser)]
#[command(
    name = "admission-oracle",
    about = "Admission-chance prediction from multi-year counselling cutoffs"
)]
struct Cli {
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Seat prediction and decision summary for one applicant.
    Predict {
        #[arg(long, allow_negative_numbers = true)]
        rank: Option<i64>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        cutoffs: Option<PathBuf>,
    },
    /// Safe rank threshold, round and fallback category to apply under.
    Decide {
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        cutoffs: Option<PathBuf>,
    },
    /// Per-round cutoff statistics for a fallback chain or a whole payload.
    Stats {
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        cutoffs: Option<PathBuf>,
    },
    /// Resolved fallback chain for a category.
    Chain {
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        cutoffs: Option<PathBuf>,
    },
    /// Branches whose cutoffs sit inside the applicant's rank window.
    Recommend {
        #[arg(long, allow_negative_numbers = true)]
        rank: Option<i64>,
        #[arg(long)]
        branches: Option<PathBuf>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        year: Option<String>,
        #[arg(long)]
        round: Option<Round>,
        #[arg(long)]
        cluster: Option<String>,
        #[arg(long)]
        opening: Option<u32>,
        #[arg(long)]
        closing: Option<u32>,
    },
    /// Run the REST API.
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    /// Write or show the configuration file.
    Config {
        #[arg(long)]
        init: bool,
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load(Some(&config_path))?;
    config.apply_overrides(overrides_from(&cli.command));

    match &cli.command {
        Commands::Config { init, show } => {
            handle_config_command(*init, *show, &config, &config_path)?;
        }
        Commands::Serve { .. } => {
            let bind = format!("{}:{}", config.server.host, config.server.port);
            let addr: SocketAddr = bind
                .parse()
                .map_err(|e| anyhow!("invalid bind address {bind}: {e}"))?;
            run_server(config, addr).await?;
        }
        Commands::Predict { rank, .. } => {
            let raw_rank = rank
                .or(config.applicant.rank.map(i64::from))
                .ok_or_else(|| anyhow!("--rank is required (or set [applicant] rank)"))?;
            let rank = validate_rank(raw_rank)?;
            let category = parse_category(&config.applicant.category)?;
            let response = load_cutoffs(&config)?;
            let overrides = effective_overrides(&config, &response);
            let report = build_report(rank, &category, &response.categories, Some(&overrides));
            info!("predicted rank {rank} / {category}");
            print_report(&report, cli.output)?;
        }
        Commands::Decide { .. } => {
            let category = parse_category(&config.applicant.category)?;
            let response = load_cutoffs(&config)?;
            let overrides = effective_overrides(&config, &response);
            let decision = build_decision(&category, &response.categories, Some(&overrides));
            print_decision(decision.as_ref(), cli.output)?;
        }
        Commands::Stats { category, .. } => {
            let response = load_cutoffs(&config)?;
            let chain = match category {
                Some(_) => {
                    let category = parse_category(&config.applicant.category)?;
                    let overrides = effective_overrides(&config, &response);
                    resolve_fallback_chain(&category, Some(&overrides))
                }
                None => response.categories.keys().cloned().collect(),
            };
            let stats = collect_chain_stats(&chain, &response.categories);
            print_stats(&stats, cli.output)?;
        }
        Commands::Chain { cutoffs, .. } => {
            let category = parse_category(&config.applicant.category)?;
            let overrides = match cutoffs {
                Some(path) => {
                    let response = load_cutoff_response(path)?;
                    effective_overrides(&config, &response)
                }
                None => config.fallback.chains.clone(),
            };
            let chain = resolve_fallback_chain(&category, Some(&overrides));
            print_chain(&chain, cli.output)?;
        }
        Commands::Recommend {
            rank,
            branches,
            cluster,
            opening,
            closing,
            ..
        } => {
            let raw_rank = rank
                .or(config.applicant.rank.map(i64::from))
                .ok_or_else(|| anyhow!("--rank is required (or set [applicant] rank)"))?;
            let rank = validate_rank(raw_rank)?;
            let category = parse_category(&config.applicant.category)?;
            let branches_path = branches
                .clone()
                .or_else(|| config.resolved_branches_path())
                .ok_or_else(|| anyhow!("--branches is required (or set [data] branches_path)"))?;
            let branches: Vec<BranchCutoffs> = read_json(&branches_path)?;

            let mut query = RecommendQuery::new(rank, category);
            query.year = config.recommend.year.clone();
            query.round = config.recommend.round;
            query.cluster = cluster.clone();
            query.opening_rank = *opening;
            query.closing_rank = *closing;

            let recommendations =
                build_recommendations(&branches, &query, Some(&config.fallback.chains));
            let (low, high) = query.window();
            info!(
                "{} of {} branches inside window {low}..={high}",
                recommendations.len(),
                branches.len()
            );
            print_recommendations(&recommendations, cli.output)?;
        }
    }

    Ok(())
}

fn overrides_from(command: &Commands) -> ConfigOverrides {
    match command {
        Commands::Predict {
            category, cutoffs, ..
        }
        | Commands::Decide { category, cutoffs }
        | Commands::Stats { category, cutoffs }
        | Commands::Chain { category, cutoffs } => ConfigOverrides {
            category: category.clone(),
            cutoff_path: cutoffs.as_ref().map(|p| p.display().to_string()),
            ..ConfigOverrides::default()
        },
        Commands::Recommend {
            category,
            year,
            round,
            ..
        } => ConfigOverrides {
            category: category.clone(),
            year: year.clone(),
            round: *round,
            ..ConfigOverrides::default()
        },
        Commands::Serve { host, port } => ConfigOverrides {
            host: host.clone(),
            port: *port,
            ..ConfigOverrides::default()
        },
        Commands::Config { .. } => ConfigOverrides::default(),
    }
}

fn load_cutoffs(config: &Config) -> Result<CutoffResponse> {
    let path = config
        .resolved_cutoff_path()
        .ok_or_else(|| anyhow!("--cutoffs is required (or set [data] cutoff_path)"))?;
    load_cutoff_response(&path)
        .with_context(|| format!("failed loading cutoffs from {}", path.display()))
}

/// Payload `fall_back` entries win over configured chains.
fn effective_overrides(config: &Config, response: &CutoffResponse) -> FallbackOverrides {
    layer_overrides(&config.fallback.chains, response.fall_back.as_ref())
}

fn handle_config_command(init: bool, show: bool, config: &Config, config_path: &Path) -> Result<()> {
    if init {
        Config::write_template(config_path)?;
        println!("Wrote config template to {}", config_path.display());
    }
    if show || !init {
        println!("{}", render_json(config)?);
    }
    Ok(())
}

fn print_report(report: &PredictionReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_report(report)),
        OutputFormat::Json => println!("{}", render_json(report)?),
        OutputFormat::Csv => println!("{}", report_to_csv(report)?),
    }
    Ok(())
}

fn print_decision(decision: Option<&DecisionSummary>, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_decision_table(decision)),
        OutputFormat::Json => println!("{}", render_json(&decision)?),
        OutputFormat::Csv => {
            warn!("CSV output for decide not implemented, using JSON");
            println!("{}", render_json(&decision)?);
        }
    }
    Ok(())
}

fn print_stats(stats: &[CategoryStats], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_stats_table(stats)),
        OutputFormat::Json => println!("{}", render_json(stats)?),
        OutputFormat::Csv => println!("{}", stats_to_csv(stats)?),
    }
    Ok(())
}

fn print_chain(chain: &[String], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_chain_table(chain)),
        OutputFormat::Json => println!("{}", render_json(chain)?),
        OutputFormat::Csv => {
            warn!("CSV output for chain not implemented, using JSON");
            println!("{}", render_json(chain)?);
        }
    }
    Ok(())
}

fn print_recommendations(items: &[Recommendation], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_recommendations_table(items)),
        OutputFormat::Json => println!("{}", render_json(items)?),
        OutputFormat::Csv => println!("{}", recommendations_to_csv(items)?),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::Cli;

    #[test]
    fn every_subcommand_has_help_text() {
        let command = Cli::command();
        command.clone().debug_assert();
        for sub in command.get_subcommands() {
            assert!(
                sub.get_about().is_some(),
                "{} is missing help text",
                sub.get_name()
            );
        }
    }
}
