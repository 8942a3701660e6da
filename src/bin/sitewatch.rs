//! sitewatch CLI: runs the reply bot and inspects its ledger.
//!
//! All runtime configuration comes from the environment (see `Config`).

use clap::{Parser, Subcommand};
use sitewatch::candidates::{self, RemoteCandidates};
use sitewatch::config::Config;
use sitewatch::engine::ActionLoop;
use sitewatch::ledger::Ledger;
use sitewatch::source::CandidateLoader;
use sitewatch::telemetry::{TelemetryConfig, init_telemetry};
use sitewatch::twitter::{PostHandle, SearchHandle, TwitterClient};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "sitewatch", about = "Reply once to every new mention of a listed site")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run one pass over the sites list (the default)
    Run,
    /// Inspect the reply ledger
    Ledger {
        #[command(subcommand)]
        action: LedgerAction,
    },
}

#[derive(Subcommand)]
enum LedgerAction {
    /// Show the most recent entries
    List {
        /// Maximum entries to show
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Report whether an item was already answered
    Check {
        /// Item id
        id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => cmd_run().await,
        Command::Ledger { action } => {
            let path = std::env::var("LEDGER_PATH")
                .ok()
                .filter(|p| !p.is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("posted.csv"));
            let ledger = Ledger::open(&path)?;
            match action {
                LedgerAction::List { limit } => cmd_ledger_list(&ledger, limit),
                LedgerAction::Check { id } => cmd_ledger_check(&ledger, &id),
            }
        }
    }
}

async fn cmd_run() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    let _guard = init_telemetry(TelemetryConfig {
        endpoint: config.otel_endpoint.clone(),
        service_name: "sitewatch".to_string(),
        log_level: config.log_level.clone(),
    })?;

    let ledger = Ledger::open(&config.ledger_path)?;

    let search = SearchHandle::new(TwitterClient::new(
        config.api_base_url.clone(),
        config.search_credentials,
    ));
    let post = PostHandle::new(TwitterClient::new(
        config.api_base_url.clone(),
        config.post_credentials,
    ));
    search.verify().await?;
    post.verify().await?;

    let loader = RemoteCandidates::new(config.sites_csv_url, config.sites_cache_path);
    let sites = loader.load().await?;
    info!(candidates = sites.len(), "shuffling candidates");
    let sites = candidates::shuffle(sites, &mut candidates::time_seeded_rng());

    let mut action_loop = ActionLoop::new(Arc::new(search), Arc::new(post), ledger, config.pacing);

    let stop = action_loop.shutdown_handle();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("interrupt received");
        stop.shutdown();
    });

    let summary = action_loop.run(sites).await?;
    info!(
        candidates = summary.candidates,
        replied = summary.replied,
        post_failures = summary.post_failures,
        skipped_reshares = summary.skipped_reshares,
        skipped_duplicates = summary.skipped_duplicates,
        interrupted = summary.interrupted,
        "run complete"
    );
    Ok(())
}

fn cmd_ledger_list(ledger: &Ledger, limit: usize) -> anyhow::Result<()> {
    if ledger.is_empty() {
        println!("No replies recorded in {}.", ledger.path().display());
        return Ok(());
    }

    println!(
        "{:<20}  {:<20}  {:<16}  {:<30}  ITEM_URL",
        "ITEM", "REPLY_ID", "USER", "DOMAIN"
    );
    println!("{}", "-".repeat(100));

    let skip = ledger.len().saturating_sub(limit);
    for entry in ledger.entries().iter().skip(skip) {
        println!(
            "{:<20}  {:<20}  {:<16}  {:<30}  https://twitter.com/{}/status/{}",
            entry.id_str,
            entry.reply_tweet_id,
            entry.user_name,
            truncate(&entry.domain, 30),
            entry.user_name,
            entry.id_str,
        );
    }

    println!("\n{} of {} entries", ledger.len() - skip, ledger.len());
    Ok(())
}

fn cmd_ledger_check(ledger: &Ledger, id: &str) -> anyhow::Result<()> {
    match ledger.get(id) {
        Some(entry) => println!(
            "{id}: replied with {} (user {}, domain {})",
            entry.reply_tweet_id, entry.user_name, entry.domain
        ),
        None => println!("{id}: not replied to"),
    }
    Ok(())
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
