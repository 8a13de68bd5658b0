//! Reader-comment extraction across `/comments?page=N`.
//!
//! Comment threads only exist after the page scripts run, so every page
//! goes through the rendering service. Candidate nodes come from the
//! configured matcher list (tried in order, results concatenated), then
//! get first-occurrence dedup within the page. Three stop rules, checked
//! in order: an empty page, a page whose first comment equals the last
//! one already accumulated (the site clamps overrun page numbers to the
//! last real page), and the hard comment cap.

use itertools::Itertools;
use scraper::{Html, Selector};
use tracing::{debug, instrument, warn};

use crate::config::HarvestConfig;
use crate::models::PageOutcome;
use crate::paginate::{StopDecision, paginate};
use crate::render::RenderClient;

/// Harvest the comment stream for one article, capped at
/// `cfg.max_comments`. Render failures end extraction early with
/// whatever was accumulated; this never errors.
#[instrument(level = "info", skip(render, cfg))]
pub async fn extract_comments(
    render: &RenderClient,
    cfg: &HarvestConfig,
    url: &str,
) -> Vec<String> {
    collect_comments(
        |page| async move {
            if page > 1 {
                tokio::time::sleep(cfg.comment_page_delay).await;
            }
            let page_url = format!("{url}/comments?page={page}");
            match render.content(&page_url).await {
                Ok(html) => {
                    let comments = extract_page_comments(&html, &cfg.comment_selectors);
                    if comments.is_empty() {
                        PageOutcome::Empty
                    } else {
                        PageOutcome::Content(comments)
                    }
                }
                Err(e) => PageOutcome::Failed(e.to_string()),
            }
        },
        cfg.max_comments,
        cfg.max_comment_pages,
    )
    .await
}

/// The pagination loop over already-parsed pages, split out so tests can
/// feed synthetic page sequences.
pub(crate) async fn collect_comments<F, Fut>(
    fetch: F,
    max_comments: usize,
    max_pages: usize,
) -> Vec<String>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = PageOutcome<Vec<String>>>,
{
    let mut total = 0usize;
    let pages = paginate(fetch, max_pages, |current: &Vec<String>, previous, _| {
        if let (Some(head), Some(tail)) = (current.first(), previous.and_then(|p| p.last())) {
            if head == tail {
                debug!("page re-serves the previous tail comment; stopping");
                return StopDecision::StopExclude;
            }
        }
        total += current.len();
        if total >= max_comments {
            StopDecision::StopInclude
        } else {
            StopDecision::Continue
        }
    })
    .await;

    let mut comments: Vec<String> = pages.into_iter().flatten().collect();
    comments.truncate(max_comments);
    comments
}

/// Candidate comment texts on one rendered page: every matcher applied
/// in order, texts trimmed, blanks dropped, first occurrence wins.
pub(crate) fn extract_page_comments(html: &str, selectors: &[String]) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut candidates = Vec::new();
    for raw in selectors {
        let Ok(sel) = Selector::parse(raw) else {
            warn!(selector = %raw, "invalid comment selector; skipping");
            continue;
        };
        for el in document.select(&sel) {
            let text = el.text().collect::<String>().trim().to_string();
            if !text.is_empty() {
                candidates.push(text);
            }
        }
    }
    candidates.into_iter().unique().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(range: std::ops::Range<usize>) -> Vec<String> {
        range.map(|i| format!("comment {i}")).collect()
    }

    #[tokio::test]
    async fn accumulates_across_pages_until_empty() {
        let got = collect_comments(
            |p| async move {
                match p {
                    1 => PageOutcome::Content(page(0..3)),
                    2 => PageOutcome::Content(page(3..5)),
                    _ => PageOutcome::Empty,
                }
            },
            5000,
            200,
        )
        .await;
        assert_eq!(got, page(0..5));
    }

    #[tokio::test]
    async fn clamped_page_number_terminates_extraction() {
        // The site clamps overrun page numbers to the last real page, so
        // page 4 onward re-serves page 3 forever; its head equals the
        // accumulated tail and the loop must stop instead of spinning.
        let got = collect_comments(
            |p| async move {
                let n = p.min(3);
                PageOutcome::Content(vec![format!("comment {n}")])
            },
            5000,
            200,
        )
        .await;
        assert_eq!(got, vec!["comment 1", "comment 2", "comment 3"]);
    }

    #[tokio::test]
    async fn never_exceeds_the_hard_cap() {
        let got = collect_comments(
            |p| async move { PageOutcome::Content(page(p * 100..(p + 1) * 100)) },
            250,
            200,
        )
        .await;
        assert_eq!(got.len(), 250);
        assert_eq!(got[0], "comment 100");
        assert_eq!(got[249], "comment 349");
    }

    #[tokio::test]
    async fn render_failure_returns_partial_results() {
        let got = collect_comments(
            |p| async move {
                match p {
                    1 => PageOutcome::Content(page(0..4)),
                    _ => PageOutcome::Failed("render timeout".to_string()),
                }
            },
            5000,
            200,
        )
        .await;
        assert_eq!(got, page(0..4));
    }

    #[tokio::test]
    async fn defensive_ceiling_bounds_a_never_repeating_source() {
        let got = collect_comments(
            |p| async move { PageOutcome::Content(vec![format!("novel {p}")]) },
            5000,
            200,
        )
        .await;
        assert_eq!(got.len(), 200);
    }

    #[test]
    fn dedup_is_first_occurrence_within_the_page() {
        let html = r#"<div>
            <p class="commentBody">同意です</p>
            <p data-ylk="cmt:cm_body">同意です</p>
            <p class="commentBody">別の意見</p>
        </div>"#;
        let selectors = crate::config::default_comment_selectors();
        assert_eq!(
            extract_page_comments(html, &selectors),
            vec!["同意です".to_string(), "別の意見".to_string()]
        );
    }

    #[test]
    fn invalid_selector_is_skipped_not_fatal() {
        let html = r#"<p class="commentBody">ok</p>"#;
        let selectors = vec!["p[[[".to_string(), "p.commentBody".to_string()];
        assert_eq!(extract_page_comments(html, &selectors), vec!["ok".to_string()]);
    }
}
