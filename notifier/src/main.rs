//! PRFormance Discord notifier
//!
//! Aggregates the organization's contributions for a date range and posts
//! the top contributors to a Discord webhook.

mod client;
mod formatter;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use client::DiscordClient;
use prformance_api::build_service;
use prformance_api::config::Config;
use prformance_api::domain::entities::is_iso_date;

#[derive(Parser, Debug)]
#[command(
    name = "prformance-notify",
    version,
    about = "Post the contribution ranking to a Discord webhook"
)]
struct Cli {
    /// Range start, YYYY-MM-DD
    #[arg(long = "startDate", value_name = "YYYY-MM-DD")]
    start_date: String,

    /// Range end, YYYY-MM-DD
    #[arg(long = "endDate", value_name = "YYYY-MM-DD")]
    end_date: String,

    /// Webhook URL, defaults to DISCORD_WEBHOOK_URL
    #[arg(long = "webhook", value_name = "URL")]
    webhook: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if !e.use_stderr() => {
            e.print()?;
            return Ok(());
        }
        Err(e) => {
            e.print()?;
            std::process::exit(1);
        }
    };

    // stdout stays free for the posted message
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,prformance_api=debug,prformance_notify=debug".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    if !is_iso_date(&cli.start_date) || !is_iso_date(&cli.end_date) {
        anyhow::bail!("Invalid date format, use YYYY-MM-DD");
    }

    let config = Config::from_env().context("Failed to load configuration")?;
    let webhook = cli
        .webhook
        .clone()
        .or_else(|| config.discord.webhook_url.clone())
        .context("Discord webhook not configured, set DISCORD_WEBHOOK_URL or pass --webhook=URL")?;
    let discord = DiscordClient::new(&webhook, &config.discord)?;

    tracing::info!(start = %cli.start_date, end = %cli.end_date, "Computing ranking for Discord");
    let service = build_service(&config).context("Failed to build GitHub client")?;
    let report = service.run(&cli.start_date, &cli.end_date).await?;

    let message = formatter::format_ranking(&report);
    discord
        .send(&message)
        .await
        .context("Failed to send the ranking to Discord")?;

    tracing::info!(developers = report.developers.len(), "Ranking posted to Discord");
    Ok(())
}
