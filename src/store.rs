//! Dedup/merge store over the tabular backend.
//!
//! Three operations, one per pipeline stage:
//! - [`append_new`]: URL-deduplicated append into the append-only master
//!   log, retried with backoff on transient backend errors.
//! - [`promote_window`]: time-windowed, idempotent copy of master-log
//!   rows into the per-run working table.
//! - [`enrich`]: body/comment enrichment of working rows, with the
//!   self-describing header widened in place when a row needs more
//!   comment columns than any previous row.

use std::collections::HashSet;
use std::time::Duration;

use chrono::NaiveDateTime;
use rand::Rng;
use tracing::{debug, error, info, instrument, warn};

use crate::config::HarvestConfig;
use crate::dates::{format_compact, parse_posted, promotion_window};
use crate::models::{ArticleRecord, Enrichment};
use crate::sheets::{Result, SheetStore};

const MASTER_HEADER: [&str; 4] = ["タイトル", "URL", "投稿日", "引用元"];
const BASE_HEADER: [&str; 5] = ["ソース", "タイトル", "URL", "投稿日", "掲載元"];
const COUNT_HEADER: &str = "コメント数";

const MAX_ATTEMPTS: usize = 5;
const BASE_DELAY: Duration = Duration::from_secs(1);
const MAX_DELAY: Duration = Duration::from_secs(30);

/// Run `op` up to five times, backing off with jitter on transient
/// backend errors. Non-transient errors and exhaustion are terminal.
async fn with_backoff<T, F, Fut>(what: &str, op: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0usize;
    loop {
        match op().await {
            Ok(v) => return Ok(v),
            Err(e) => {
                attempt += 1;
                if !e.is_transient() || attempt >= MAX_ATTEMPTS {
                    error!(what, attempt, error = %e, "backend operation failed terminally");
                    return Err(e);
                }
                let mut delay = BASE_DELAY.saturating_mul(1 << (attempt - 1));
                if delay > MAX_DELAY {
                    delay = MAX_DELAY;
                }
                let jitter_ms: u64 = rand::rng().random_range(0..=250);
                let delay = delay + Duration::from_millis(jitter_ms);
                warn!(what, attempt, max = MAX_ATTEMPTS, ?delay, error = %e, "transient backend error; backing off");
                tokio::time::sleep(delay).await;
            }
        }
    }
}

/// Append records whose URL is not yet in the master log, preserving
/// input order (first occurrence wins inside the batch too). Creates the
/// log with its header on first use. Returns the number appended.
#[instrument(level = "info", skip_all, fields(candidates = records.len()))]
pub async fn append_new<S: SheetStore>(
    store: &S,
    master: &str,
    records: &[ArticleRecord],
) -> Result<usize> {
    with_backoff("append to master log", || async move {
        if store.ensure_sheet(master, 1, MASTER_HEADER.len() as u32).await? {
            store
                .append_rows(master, &[MASTER_HEADER.map(String::from).to_vec()])
                .await?;
        }

        let existing: HashSet<String> = store
            .col_values(master, 2)
            .await?
            .into_iter()
            .skip(1)
            .filter(|u| !u.is_empty())
            .collect();

        let mut seen = existing;
        let fresh: Vec<Vec<String>> = records
            .iter()
            .filter(|r| seen.insert(r.url.clone()))
            .map(ArticleRecord::master_row)
            .collect();

        if fresh.is_empty() {
            info!("no new urls; master log unchanged");
            return Ok(0);
        }
        store.append_rows(master, &fresh).await?;
        info!(appended = fresh.len(), "master log updated");
        Ok(fresh.len())
    })
    .await
}

/// Copy master-log rows whose posted-at falls inside the rolling
/// editorial window into the working table, skipping URLs already there.
/// Rows with unparseable timestamps are excluded, not errored. Returns
/// the number promoted.
#[instrument(level = "info", skip(store, cfg))]
pub async fn promote_window<S: SheetStore>(
    store: &S,
    cfg: &HarvestConfig,
    working: &str,
    now: NaiveDateTime,
) -> Result<usize> {
    let (start, end) = promotion_window(now);
    debug!(%start, %end, "promotion window");

    // 600 columns leaves room for the widest possible header: base 5,
    // 10 body pages, the count, and 5000/10 comment-page cells.
    store.ensure_sheet(working, 300, 600).await?;
    ensure_base_header(store, working).await?;

    let existing: HashSet<String> = store
        .col_values(working, 3)
        .await?
        .into_iter()
        .skip(1)
        .filter(|u| !u.is_empty())
        .collect();

    let rows = store.read_all(&cfg.master_sheet).await?;
    let mut promoted: Vec<Vec<String>> = Vec::new();
    for row in rows.iter().skip(1) {
        let title = row.first().map(|s| s.trim()).unwrap_or_default();
        let url = row.get(1).map(|s| s.trim()).unwrap_or_default();
        let posted_raw = row.get(2).map(String::as_str).unwrap_or_default();
        let outlet = row.get(3).map(|s| s.trim()).unwrap_or_default();
        if title.is_empty() || url.is_empty() {
            continue;
        }
        let Some(posted) = parse_posted(posted_raw, now) else {
            debug!(url, posted_raw, "unparseable posted-at; excluded from promotion");
            continue;
        };
        if !(start..=end).contains(&posted) || existing.contains(url) {
            continue;
        }
        let record = ArticleRecord {
            source: cfg.source_tag.clone(),
            title: title.to_string(),
            url: url.to_string(),
            posted_at: posted_raw.to_string(),
            outlet: outlet.to_string(),
        };
        promoted.push(record.working_row(format_compact(posted)));
    }

    if !promoted.is_empty() {
        store.append_rows(working, &promoted).await?;
    }
    info!(promoted = promoted.len(), working, "promotion complete");
    Ok(promoted.len())
}

/// Enrich every working row that has no data beyond the base columns.
/// `fetch` produces the enrichment for one URL; a failure there degrades
/// to an all-empty enrichment instead of aborting the batch. Returns the
/// number of rows written.
#[instrument(level = "info", skip(store, cfg, fetch))]
pub async fn enrich<S, F, Fut>(
    store: &S,
    cfg: &HarvestConfig,
    working: &str,
    mut fetch: F,
) -> Result<usize>
where
    S: SheetStore,
    F: FnMut(String) -> Fut,
    Fut: Future<Output = std::result::Result<Enrichment, Box<dyn std::error::Error>>>,
{
    let rows = store.read_all(working).await?;
    if rows.len() <= 1 {
        info!(working, "working table has no data rows; skipping enrichment");
        return Ok(0);
    }

    // Never narrow the header: start from the comment columns it already has.
    let header_len = rows[0].len();
    let mut max_comment_pages = header_len.saturating_sub(BASE_HEADER.len() + cfg.max_body_pages + 1);

    let total = rows.len() - 1;
    let mut pending: Vec<(usize, Vec<String>)> = Vec::new();
    for (idx, row) in rows.iter().enumerate().skip(1) {
        let url = row.get(2).map(|s| s.trim()).unwrap_or_default().to_string();
        if url.is_empty() {
            continue;
        }
        if row.iter().skip(BASE_HEADER.len()).any(|c| !c.is_empty()) {
            debug!(%url, "row already enriched; skipping");
            continue;
        }

        info!(row = idx + 1, total, %url, "enriching article");
        let enrichment = match fetch(url.clone()).await {
            Ok(e) => e,
            Err(e) => {
                warn!(%url, error = %e, "enrichment failed; writing empty row");
                Enrichment::empty()
            }
        };
        max_comment_pages = max_comment_pages.max(enrichment.comment_cells.len());
        pending.push((idx + 1, enrichment.into_cells(cfg.max_body_pages)));
    }

    if pending.is_empty() {
        info!(working, "all rows already enriched");
        return Ok(0);
    }

    ensure_enrichment_header(store, cfg, working, max_comment_pages).await?;

    let width = cfg.max_body_pages + 1 + max_comment_pages;
    let written = pending.len();
    for (sheet_row, mut cells) in pending {
        cells.resize(width.max(cells.len()), String::new());
        store
            .write_range(working, &format!("F{sheet_row}"), &[cells])
            .await?;
    }
    info!(written, max_comment_pages, working, "enrichment complete");
    Ok(written)
}

/// Write the base A-E header if the current one does not match.
async fn ensure_base_header<S: SheetStore>(store: &S, working: &str) -> Result<()> {
    let current = store.row_values(working, 1).await?;
    let target: Vec<String> = BASE_HEADER.map(String::from).to_vec();
    if current.get(..target.len()) != Some(target.as_slice()) {
        store.write_range(working, "A1", &[target]).await?;
    }
    Ok(())
}

/// The full self-describing header: base columns, one column per body
/// page, the count column, then one column per comment page. Rewritten
/// in place whenever the required layout is wider than the current one;
/// shorter prior rows stay valid with implicit empty trailing cells.
async fn ensure_enrichment_header<S: SheetStore>(
    store: &S,
    cfg: &HarvestConfig,
    working: &str,
    comment_pages: usize,
) -> Result<()> {
    let mut target: Vec<String> = BASE_HEADER.map(String::from).to_vec();
    for i in 1..=cfg.max_body_pages {
        target.push(format!("本文({i}ページ)"));
    }
    target.push(COUNT_HEADER.to_string());
    for i in 1..=comment_pages.max(1) {
        target.push(format!("コメント({i}ページJSON)"));
    }

    let current = store.row_values(working, 1).await?;
    if current != target {
        store.write_range(working, "A1", &[target]).await?;
        debug!(working, comment_pages, "working-table header rewritten");
    }
    Ok(())
}
