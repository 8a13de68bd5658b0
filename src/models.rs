//! Core data types shared across the harvest pipeline.
//!
//! - [`ArticleRecord`]: one search hit, identified by its URL, as appended
//!   to the master log.
//! - [`Enrichment`]: the body pages and packed comment cells attached to a
//!   working-table row.
//! - [`PageOutcome`]: the typed result of fetching one page, so callers can
//!   tell "genuinely no content" apart from "fetch failed" when both end a
//!   pagination loop.

/// Placeholder written when a value could not be scraped from the page.
pub const UNAVAILABLE: &str = "取得不可";

/// A news article discovered by the keyword search.
///
/// Identity is the `url`; records are immutable once appended to the
/// master log. `posted_at` keeps the display string exactly as it will be
/// persisted ("YYYY/MM/DD HH:MM" when the raw date parsed, the raw source
/// string otherwise, or [`UNAVAILABLE`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleRecord {
    /// Tag naming the search source (e.g. "Yahoo").
    pub source: String,
    pub title: String,
    pub url: String,
    pub posted_at: String,
    /// The outlet that published the article on the aggregator.
    pub outlet: String,
}

impl ArticleRecord {
    /// Cells for the master log layout, columns A-D.
    pub fn master_row(&self) -> Vec<String> {
        vec![
            self.title.clone(),
            self.url.clone(),
            self.posted_at.clone(),
            self.outlet.clone(),
        ]
    }

    /// Cells for the working-table base layout, columns A-E, with the
    /// posted-at cell rewritten to the compact display form.
    pub fn working_row(&self, posted_compact: String) -> Vec<String> {
        vec![
            self.source.clone(),
            self.title.clone(),
            self.url.clone(),
            posted_compact,
            self.outlet.clone(),
        ]
    }
}

/// Body and comment data attached to one promoted article.
#[derive(Debug, Default)]
pub struct Enrichment {
    /// Extracted body text, one block per rendered page, at most the
    /// configured body-page cap.
    pub body_pages: Vec<String>,
    /// Total comments harvested (after the hard cap).
    pub comment_count: usize,
    /// JSON-array strings, one per comment page, from the cell packer.
    pub comment_cells: Vec<String>,
}

impl Enrichment {
    /// The all-empty enrichment written when an article fails entirely.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Flatten into working-table cells from column F onward: body cells
    /// padded to `max_body_pages`, then the comment count, then one cell
    /// per comment page.
    pub fn into_cells(self, max_body_pages: usize) -> Vec<String> {
        let mut cells = self.body_pages;
        cells.truncate(max_body_pages);
        cells.resize(max_body_pages, String::new());
        cells.push(self.comment_count.to_string());
        cells.extend(self.comment_cells);
        cells
    }
}

/// Result of fetching a single page inside a pagination loop.
///
/// `Empty` and `Failed` both end pagination with the pages accepted so
/// far, but are logged differently.
#[derive(Debug)]
pub enum PageOutcome<T> {
    /// The page rendered and produced extractable content.
    Content(T),
    /// The page rendered but had nothing to extract.
    Empty,
    /// The fetch or render itself failed.
    Failed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn master_row_preserves_column_order() {
        let rec = ArticleRecord {
            source: "Yahoo".into(),
            title: "A".into(),
            url: "http://x/1".into(),
            posted_at: "2025/10/05 09:00".into(),
            outlet: "O".into(),
        };
        assert_eq!(
            rec.master_row(),
            vec!["A", "http://x/1", "2025/10/05 09:00", "O"]
        );
        assert_eq!(
            rec.working_row("25/10/5 09:00".to_string()),
            vec!["Yahoo", "A", "http://x/1", "25/10/5 09:00", "O"]
        );
    }

    #[test]
    fn into_cells_pads_bodies_and_appends_count() {
        let e = Enrichment {
            body_pages: vec!["p1".into(), "p2".into()],
            comment_count: 3,
            comment_cells: vec!["[\"a\",\"b\",\"c\"]".into()],
        };
        let cells = e.into_cells(10);
        assert_eq!(cells.len(), 10 + 1 + 1);
        assert_eq!(cells[0], "p1");
        assert_eq!(cells[1], "p2");
        assert_eq!(cells[9], "");
        assert_eq!(cells[10], "3");
        assert_eq!(cells[11], "[\"a\",\"b\",\"c\"]");
    }

    #[test]
    fn empty_enrichment_is_all_blank_with_zero_count() {
        let cells = Enrichment::empty().into_cells(10);
        assert_eq!(cells.len(), 11);
        assert!(cells[..10].iter().all(|c| c.is_empty()));
        assert_eq!(cells[10], "0");
    }
}
