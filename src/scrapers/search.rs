//! Keyword search over the Yahoo! News search page.
//!
//! The results list is client-rendered, so the page goes through the
//! rendering service. The selectors target generated class-name prefixes
//! and are the brittle part of this module; the outlet falls back to a
//! text-shape heuristic when its primary selector misses.

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{error, info, instrument};
use url::Url;

use crate::config::HarvestConfig;
use crate::dates::format_display;
use crate::models::{ArticleRecord, UNAVAILABLE};
use crate::render::RenderClient;

static WEEKDAY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\((?:月|火|水|木|金|土|日)\)").unwrap());
static OUTLET_TEXT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ぁ-んァ-ン一-龥A-Za-z]").unwrap());

/// Search one keyword, returning records in result-page order. Any
/// fetch or render failure yields an empty list, never an error.
#[instrument(level = "info", skip(render, cfg))]
pub async fn search_keyword(
    render: &RenderClient,
    cfg: &HarvestConfig,
    keyword: &str,
) -> Vec<ArticleRecord> {
    let search_url = format!(
        "https://news.yahoo.co.jp/search?p={}&ei=utf-8&categories=domestic,world,business,it,science,life,local",
        urlencoding::encode(keyword)
    );
    let html = match render.content(&search_url).await {
        Ok(html) => html,
        Err(e) => {
            error!(keyword, error = %e, "search page fetch failed");
            return Vec::new();
        }
    };
    let records = parse_search_results(&html, &cfg.source_tag);
    info!(keyword, count = records.len(), "search results parsed");
    records
}

/// Parse the rendered search-results HTML into records.
pub(crate) fn parse_search_results(html: &str, source_tag: &str) -> Vec<ArticleRecord> {
    let document = Html::parse_document(html);
    let item_sel = Selector::parse("li[class*='sc-1u4589e-0']").unwrap();
    let title_sel = Selector::parse("div[class*='sc-3ls169-0']").unwrap();
    let link_sel = Selector::parse("a[href]").unwrap();
    let time_sel = Selector::parse("time").unwrap();

    let mut records = Vec::new();
    for item in document.select(&item_sel) {
        let title = item
            .select(&title_sel)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .unwrap_or_default();
        let url = item
            .select(&link_sel)
            .next()
            .and_then(|el| el.value().attr("href"))
            .and_then(absolute_url)
            .unwrap_or_default();
        if title.is_empty() || url.is_empty() {
            continue;
        }

        let raw_date = item
            .select(&time_sel)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        records.push(ArticleRecord {
            source: source_tag.to_string(),
            title,
            url,
            posted_at: normalize_posted_date(&raw_date),
            outlet: extract_outlet(item),
        });
    }
    records
}

/// Result cards sometimes carry site-relative hrefs; resolve them
/// against the news host. Unparseable hrefs drop the card.
fn absolute_url(href: &str) -> Option<String> {
    static BASE: Lazy<Url> =
        Lazy::new(|| Url::parse("https://news.yahoo.co.jp/").unwrap());
    BASE.join(href).ok().map(String::from)
}

/// Strip the Japanese weekday suffix and normalize a parseable date to
/// the display form; an unparseable non-empty date is kept verbatim and
/// a missing one becomes the unavailable marker.
fn normalize_posted_date(raw: &str) -> String {
    let cleaned = WEEKDAY_RE.replace_all(raw, "").trim().to_string();
    if cleaned.is_empty() {
        return UNAVAILABLE.to_string();
    }
    match NaiveDateTime::parse_from_str(&cleaned, "%Y/%m/%d %H:%M") {
        Ok(dt) => format_display(dt),
        Err(_) => cleaned,
    }
}

/// Outlet name: the primary selector first, then any short mixed-script
/// text node in the card that is not a counter.
fn extract_outlet(item: ElementRef<'_>) -> String {
    let primary_sel =
        Selector::parse("div.sc-n3vj8g-0.yoLqH div.sc-110wjhy-8.bsEjY span").unwrap();
    if let Some(el) = item.select(&primary_sel).next() {
        let candidate = el.text().collect::<String>().trim().to_string();
        if !candidate.is_empty() && !candidate.chars().all(|c| c.is_ascii_digit()) {
            return candidate;
        }
    }

    let fallback_sel = Selector::parse("span, div").unwrap();
    for el in item.select(&fallback_sel) {
        let text = el.text().collect::<String>().trim().to_string();
        let chars = text.chars().count();
        if (2..=20).contains(&chars)
            && !text.chars().all(|c| c.is_ascii_digit())
            && OUTLET_TEXT_RE.is_match(&text)
        {
            return text;
        }
    }
    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(title: &str, href: &str, time: &str, outlet: &str) -> String {
        format!(
            r#"<li class="sc-1u4589e-0 xyz">
                 <a href="{href}">
                   <div class="sc-3ls169-0 abc">{title}</div>
                   <time>{time}</time>
                   <div class="sc-n3vj8g-0 yoLqH"><div class="sc-110wjhy-8 bsEjY"><span>{outlet}</span></div></div>
                 </a>
               </li>"#
        )
    }

    #[test]
    fn parses_title_url_date_and_outlet() {
        let html = format!(
            "<ul>{}</ul>",
            card(
                "モビリティショー開幕",
                "https://news.yahoo.co.jp/articles/abc123",
                "2025/10/05(日) 09:00",
                "毎日新聞"
            )
        );
        let records = parse_search_results(&html, "Yahoo");
        assert_eq!(records.len(), 1);
        let rec = &records[0];
        assert_eq!(rec.source, "Yahoo");
        assert_eq!(rec.title, "モビリティショー開幕");
        assert_eq!(rec.url, "https://news.yahoo.co.jp/articles/abc123");
        assert_eq!(rec.posted_at, "2025/10/05 09:00");
        assert_eq!(rec.outlet, "毎日新聞");
    }

    #[test]
    fn relative_hrefs_resolve_against_the_news_host() {
        let html = format!(
            "<ul>{}</ul>",
            card("t", "/articles/rel456", "2025/10/05(日) 09:00", "媒体")
        );
        let records = parse_search_results(&html, "Yahoo");
        assert_eq!(records[0].url, "https://news.yahoo.co.jp/articles/rel456");
    }

    #[test]
    fn skips_cards_missing_title_or_link() {
        let html = r#"<li class="sc-1u4589e-0"><a href="http://x"></a></li>
                      <li class="sc-1u4589e-0"><div class="sc-3ls169-0">no link</div></li>"#;
        assert!(parse_search_results(html, "Yahoo").is_empty());
    }

    #[test]
    fn missing_date_becomes_unavailable_marker() {
        let html = format!(
            "<ul>{}</ul>",
            card("t", "http://x/1", "", "媒体")
        );
        let records = parse_search_results(&html, "Yahoo");
        assert_eq!(records[0].posted_at, UNAVAILABLE);
    }

    #[test]
    fn unparseable_date_is_kept_verbatim() {
        let html = format!("<ul>{}</ul>", card("t", "http://x/1", "3時間前", "媒体"));
        let records = parse_search_results(&html, "Yahoo");
        assert_eq!(records[0].posted_at, "3時間前");
    }

    #[test]
    fn outlet_falls_back_to_text_heuristic() {
        let html = r#"<li class="sc-1u4589e-0">
                        <a href="http://x/1"><div class="sc-3ls169-0">t</div></a>
                        <span>123</span>
                        <span>産経ニュース</span>
                      </li>"#;
        let records = parse_search_results(html, "Yahoo");
        assert_eq!(records[0].outlet, "産経ニュース");
    }
}
