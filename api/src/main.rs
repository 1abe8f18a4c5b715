//! PRFormance command line and HTTP server
//!
//! Without a subcommand the HTTP API is served. `run` aggregates an explicit
//! range and prints the report as JSON; the preset subcommands print a
//! medal ranking for a common period.

use std::fmt::Write as _;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use prformance_api::app::Preset;
use prformance_api::config::Config;
use prformance_api::domain::entities::{ContributionKind, Report};
use prformance_api::error::AggregationError;
use prformance_api::{build_router, build_service, AppState};

const RUN_USAGE: &str = "Usage: prformance run <startDate:YYYY-MM-DD> <endDate:YYYY-MM-DD>";

/// Contributors shown in a preset ranking
const RANKING_SIZE: usize = 10;

#[derive(Parser)]
#[command(name = "prformance", version, about = "GitHub organization contribution ranking")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the HTTP API (default)
    Serve,
    /// Aggregate an explicit date range and print the report as JSON
    Run {
        /// Range start, YYYY-MM-DD
        start: String,
        /// Range end, YYYY-MM-DD
        end: String,
    },
    /// Seven days ago until today
    LastWeek(PresetArgs),
    /// First day of this month until today
    ThisMonth(PresetArgs),
    /// First day of last month until the first day of this month
    LastMonth(PresetArgs),
}

#[derive(Args)]
struct PresetArgs {
    /// Print the full report instead of the ranking
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if !e.use_stderr() => {
            // --help / --version
            e.print()?;
            return Ok(());
        }
        Err(e) => {
            e.print()?;
            std::process::exit(1);
        }
    };

    let command = cli.command.unwrap_or(Command::Serve);
    init_tracing(!matches!(command, Command::Serve));

    let config = Config::from_env().context("Failed to load configuration")?;

    match command {
        Command::Serve => serve(config).await,
        Command::Run { start, end } => run(&config, &start, &end).await,
        Command::LastWeek(args) => run_preset(&config, Preset::LastWeek, args.json).await,
        Command::ThisMonth(args) => run_preset(&config, Preset::ThisMonth, args.json).await,
        Command::LastMonth(args) => run_preset(&config, Preset::LastMonth, args.json).await,
    }
}

/// CLI runs log to stderr so stdout only carries the report
fn init_tracing(to_stderr: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,prformance_api=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    if to_stderr {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    tracing::info!(org = %config.github_org, "Starting PRFormance API...");

    let service = build_service(&config).context("Failed to build GitHub client")?;
    let state = AppState {
        aggregation: Arc::new(service),
    };
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn run(config: &Config, start: &str, end: &str) -> anyhow::Result<()> {
    let service = build_service(config).context("Failed to build GitHub client")?;

    match service.run(start, end).await {
        Ok(report) => {
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Err(AggregationError::Validation(message)) => anyhow::bail!("{}\n{}", message, RUN_USAGE),
        Err(e) => Err(e.into()),
    }
}

async fn run_preset(config: &Config, preset: Preset, json: bool) -> anyhow::Result<()> {
    let service = build_service(config).context("Failed to build GitHub client")?;
    let window = preset.window(chrono::Utc::now().date_naive())?;
    let report = service.run_window(window).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_ranking(&report, preset.label()));
    }
    Ok(())
}

fn medal(position: usize) -> &'static str {
    match position {
        0 => "🥇",
        1 => "🥈",
        2 => "🥉",
        _ => "  ",
    }
}

/// Plain-text top contributors listing for the terminal
fn render_ranking(report: &Report, label: &str) -> String {
    let mut out = format!(
        "Top contributors, {} ({} to {})\n\n",
        label,
        report.range.start(),
        report.range.end()
    );

    if report.is_empty() {
        out.push_str("No contributions found in this period.\n");
        return out;
    }

    for (i, dev) in report.top(RANKING_SIZE).iter().enumerate() {
        let c = &dev.contributions;
        let _ = writeln!(
            out,
            "{} {:>2}. {:<24} {:>5} pts  commits {}, PRs {}, reviews {}, issues {}/{}, comments {}, branches {}",
            medal(i),
            i + 1,
            dev.username,
            dev.score,
            c.count(ContributionKind::Commits),
            c.count(ContributionKind::PullRequestsOpened),
            c.count(ContributionKind::PullRequestsReviewed),
            c.count(ContributionKind::IssuesOpened),
            c.count(ContributionKind::IssuesClosed),
            c.count(ContributionKind::PrComments),
            c.count(ContributionKind::BranchesCreated),
        );
    }

    if report.developers.len() > RANKING_SIZE {
        let _ = writeln!(out, "\n...and {} more", report.developers.len() - RANKING_SIZE);
    }
    out
}
