//! Immutable run configuration.
//!
//! Every tunable the pipeline needs is collected here once at startup and
//! passed by reference; nothing reads globals after this point.

use std::time::Duration;

use crate::cli::Cli;

/// Configuration for one harvest run, built from the CLI and fixed
/// deployment constants.
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    /// Search keywords, queried in order.
    pub keywords: Vec<String>,
    /// Source tag written to column A of working tables.
    pub source_tag: String,
    /// Master log worksheet name.
    pub master_sheet: String,
    /// Body pages fetched per article, also the number of body columns.
    pub max_body_pages: usize,
    /// Hard ceiling on comments kept per article.
    pub max_comments: usize,
    /// Comments packed into one working-table cell.
    pub cell_capacity: usize,
    /// Defensive ceiling on comment pages per article, for sources that
    /// keep serving novel pages without ever repeating.
    pub max_comment_pages: usize,
    /// Comment markup matchers, tried in order and unioned. A list
    /// because the site's generated class names drift.
    pub comment_selectors: Vec<String>,
    /// Pause between keyword searches.
    pub search_delay: Duration,
    /// Pause between comment-page fetches.
    pub comment_page_delay: Duration,
}

impl HarvestConfig {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            keywords: cli.keywords.clone(),
            source_tag: "Yahoo".to_string(),
            master_sheet: cli.master_sheet.clone(),
            max_body_pages: 10,
            max_comments: 5000,
            cell_capacity: cli.cell_capacity,
            max_comment_pages: cli.max_comment_pages,
            comment_selectors: default_comment_selectors(),
            search_delay: Duration::from_secs(1),
            comment_page_delay: Duration::from_secs(2),
        }
    }
}

/// Known comment-body markup shapes, newest first. The generated class
/// name changes across site deployments, hence the attribute fallbacks.
pub fn default_comment_selectors() -> Vec<String> {
    [
        "p.sc-169yn8p-10",
        "p[data-ylk*='cm_body']",
        "p[class*='comment']",
        "div.commentBody, p.commentBody",
        "div[data-ylk*='cm_body']",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

#[cfg(test)]
pub(crate) fn test_config() -> HarvestConfig {
    HarvestConfig {
        keywords: vec!["test".to_string()],
        source_tag: "Yahoo".to_string(),
        master_sheet: "Yahoo".to_string(),
        max_body_pages: 10,
        max_comments: 5000,
        cell_capacity: 10,
        max_comment_pages: 1000,
        comment_selectors: default_comment_selectors(),
        search_delay: Duration::from_millis(0),
        comment_page_delay: Duration::from_millis(0),
    }
}
