//! # Yahoo! News Harvest
//!
//! A scheduled batch job that incrementally harvests keyword-matched
//! news articles into a spreadsheet. One run walks a linear pipeline:
//!
//! 1. **Search**: query the news search page once per keyword.
//! 2. **Append**: add unseen URLs to the append-only master log.
//! 3. **Promote**: copy master-log rows from the rolling editorial
//!    window (yesterday 15:00 through today 14:59:59) into today's
//!    working table, skipping URLs already promoted.
//! 4. **Enrich**: for each promoted article, fetch up to 10 body pages
//!    and the reader-comment stream (capped at 5000), pack comments into
//!    JSON cells, and write the row back.
//!
//! A run with no search results exits cleanly; per-article failures
//! degrade to empty enrichment rows instead of failing the batch. Only
//! setup failures (credentials, token exchange) abort with a non-zero
//! exit.

use chrono::Local;
use clap::Parser;
use std::error::Error;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod dates;
mod models;
mod pack;
mod paginate;
mod render;
mod scrapers;
mod sheets;
mod store;

use cli::Cli;
use config::HarvestConfig;
use models::Enrichment;
use render::RenderClient;
use sheets::SheetsClient;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("yahoo_news_harvest starting up");

    let args = Cli::parse();
    let cfg = HarvestConfig::from_cli(&args);
    info!(keywords = ?cfg.keywords, master = %cfg.master_sheet, cell_capacity = cfg.cell_capacity, "run configuration");

    // --- Setup (fatal on failure, before any scraping) ---
    let sheets = SheetsClient::connect(&args.spreadsheet_id, &args.credentials_file).await?;
    let render = RenderClient::new(&args.browserless_url, args.browserless_token.as_deref())?;
    let http = reqwest::Client::builder()
        .user_agent("Mozilla/5.0")
        .timeout(Duration::from_secs(20))
        .build()?;

    // --- SEARCH ---
    let mut articles = Vec::new();
    for keyword in &cfg.keywords {
        let found = scrapers::search::search_keyword(&render, &cfg, keyword).await;
        if found.is_empty() {
            warn!(keyword, "keyword produced no results");
        }
        articles.extend(found);
        tokio::time::sleep(cfg.search_delay).await;
    }
    info!(count = articles.len(), "search complete");
    if articles.is_empty() {
        info!("no articles found; nothing to do");
        return Ok(());
    }

    // --- APPEND_LOG ---
    let appended = store::append_new(&sheets, &cfg.master_sheet, &articles).await?;
    info!(appended, master = %cfg.master_sheet, "append stage complete");

    // --- PROMOTE ---
    let now = Local::now().naive_local();
    let working = now.format("%y%m%d").to_string();
    let promoted = store::promote_window(&sheets, &cfg, &working, now).await?;
    info!(promoted, table = %working, "promote stage complete");

    // --- ENRICH ---
    let enriched = store::enrich(&sheets, &cfg, &working, |url| {
        let http = &http;
        let render = &render;
        let cfg = &cfg;
        async move {
            let bodies = scrapers::body::extract_body(http, &url, cfg.max_body_pages).await;
            let comments = scrapers::comments::extract_comments(render, cfg, &url).await;
            info!(%url, body_pages = bodies.len(), comments = comments.len(), "article enriched");
            Ok::<_, Box<dyn Error>>(Enrichment {
                comment_count: comments.len(),
                comment_cells: pack::pack(&comments, cfg.cell_capacity),
                body_pages: bodies,
            })
        }
    })
    .await?;

    let elapsed = start_time.elapsed();
    info!(
        enriched,
        secs = elapsed.as_secs(),
        "run complete"
    );
    Ok(())
}
