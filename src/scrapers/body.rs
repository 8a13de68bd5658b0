//! Article body extraction across `?page=N` pagination.
//!
//! Bodies are server-rendered, so a plain HTTP fetch is enough. Each
//! accepted page becomes one text block: the paragraph texts inside
//! `<article>` (falling back to `<main>`), empty paragraphs dropped,
//! joined by newlines. Yahoo clamps out-of-range page numbers back to
//! the last real page, which the repeat-of-previous-page stop detects.

use scraper::{Html, Selector};
use tracing::{debug, instrument};

use crate::models::PageOutcome;
use crate::paginate::{StopDecision, paginate};

/// Fetch up to `max_pages` body pages for one article. Returns whatever
/// was accepted before the first empty page, repeated page, or fetch
/// failure; a dead page 1 yields an empty vec, not an error.
#[instrument(level = "info", skip(http))]
pub async fn extract_body(http: &reqwest::Client, url: &str, max_pages: usize) -> Vec<String> {
    collect_body(
        |page| async move {
            let page_url = if page == 1 {
                url.to_string()
            } else {
                format!("{url}?page={page}")
            };
            let html = match fetch_html(http, &page_url).await {
                Ok(html) => html,
                Err(e) => return PageOutcome::Failed(e),
            };
            if page == 1 {
                log_page_meta(&html);
            }
            match parse_page_text(&html) {
                Some(text) => PageOutcome::Content(text),
                None => PageOutcome::Empty,
            }
        },
        max_pages,
    )
    .await
}

/// The pagination loop, split from the HTTP layer so tests can drive it
/// with synthetic pages.
pub(crate) async fn collect_body<F, Fut>(fetch: F, max_pages: usize) -> Vec<String>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = PageOutcome<String>>,
{
    paginate(fetch, max_pages, |current, previous, _accepted| {
        if previous == Some(current) {
            debug!("page text repeats the previous page; stopping");
            StopDecision::StopExclude
        } else {
            StopDecision::Continue
        }
    })
    .await
}

async fn fetch_html(http: &reqwest::Client, url: &str) -> Result<String, String> {
    let resp = http
        .get(url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| e.to_string())?;
    resp.text().await.map_err(|e| e.to_string())
}

/// Paragraph text of the primary content region, or `None` when the page
/// has no extractable container or only blank paragraphs.
fn parse_page_text(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let article_sel = Selector::parse("article p").unwrap();
    let main_sel = Selector::parse("main p").unwrap();

    for sel in [&article_sel, &main_sel] {
        let text = document
            .select(sel)
            .map(|p| p.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n");
        if !text.is_empty() {
            return Some(text);
        }
    }
    None
}

/// Page-1 metadata, logged for run diagnostics only.
fn log_page_meta(html: &str) {
    let document = Html::parse_document(html);
    let title_sel = Selector::parse("title").unwrap();
    let time_sel = Selector::parse("time").unwrap();
    let title = document
        .select(&title_sel)
        .next()
        .map(|t| {
            t.text()
                .collect::<String>()
                .trim()
                .replace(" - Yahoo!ニュース", "")
        })
        .unwrap_or_default();
    let posted = document
        .select(&time_sel)
        .next()
        .map(|t| t.text().collect::<String>().trim().to_string())
        .unwrap_or_default();
    debug!(%title, %posted, "article page 1 metadata");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stops_before_a_repeated_page() {
        let pages = vec!["one", "two", "two", "three"];
        let got = collect_body(
            |page| {
                let text = pages[page - 1].to_string();
                async move { PageOutcome::Content(text) }
            },
            10,
        )
        .await;
        // Page 3 equals page 2, so exactly 2 pages are returned.
        assert_eq!(got, vec!["one", "two"]);
    }

    #[tokio::test]
    async fn respects_the_page_cap() {
        let got = collect_body(
            |page| async move { PageOutcome::Content(format!("page {page}")) },
            10,
        )
        .await;
        assert_eq!(got.len(), 10);
    }

    #[tokio::test]
    async fn dead_first_page_yields_empty_not_error() {
        let got = collect_body(
            |_page| async move { PageOutcome::<String>::Failed("connect refused".into()) },
            10,
        )
        .await;
        assert!(got.is_empty());
    }

    #[test]
    fn parses_article_paragraphs_dropping_blanks() {
        let html = r#"<html><body><article>
            <p>first</p><p>  </p><p>second</p>
        </article></body></html>"#;
        assert_eq!(parse_page_text(html), Some("first\nsecond".to_string()));
    }

    #[test]
    fn falls_back_to_main_when_article_is_absent() {
        let html = "<html><body><main><p>only</p></main></body></html>";
        assert_eq!(parse_page_text(html), Some("only".to_string()));
    }

    #[test]
    fn no_container_means_no_content() {
        let html = "<html><body><div><p>ad copy</p></div></body></html>";
        assert_eq!(parse_page_text(html), None);
    }
}
