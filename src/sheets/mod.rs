//! Tabular storage backend.
//!
//! The pipeline talks to a named collection of worksheets through the
//! [`SheetStore`] trait; the Google Sheets REST implementation lives in
//! [`client`], and tests run against the in-memory store in `memory`.

pub mod auth;
pub mod client;
#[cfg(test)]
pub mod memory;

pub use client::SheetsClient;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SheetError>;

#[derive(Debug, Error)]
pub enum SheetError {
    #[error("sheets network error: {0}")]
    Network(String),

    #[error("sheets api error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("credential error: {0}")]
    Credentials(String),
}

impl From<reqwest::Error> for SheetError {
    fn from(err: reqwest::Error) -> Self {
        SheetError::Network(err.to_string())
    }
}

impl SheetError {
    /// Whether a retry could plausibly succeed (rate limiting, server
    /// hiccups, transport failures). Credential errors are terminal.
    pub fn is_transient(&self) -> bool {
        match self {
            SheetError::Network(_) => true,
            SheetError::Api { status, .. } => *status == 429 || (500..=599).contains(status),
            SheetError::Credentials(_) => false,
        }
    }
}

/// Operations the pipeline needs from a tabular backend.
///
/// Rows and columns are 1-indexed to match spreadsheet addressing. All
/// reads return display strings; missing trailing cells read as absent,
/// not as errors.
#[allow(async_fn_in_trait)]
pub trait SheetStore {
    /// Every row of a worksheet, including the header row.
    async fn read_all(&self, sheet: &str) -> Result<Vec<Vec<String>>>;

    /// One column, top to bottom, including the header cell.
    async fn col_values(&self, sheet: &str, col: usize) -> Result<Vec<String>>;

    /// One row, left to right.
    async fn row_values(&self, sheet: &str, row: usize) -> Result<Vec<String>>;

    /// Append rows after the current data, preserving input order.
    async fn append_rows(&self, sheet: &str, rows: &[Vec<String>]) -> Result<()>;

    /// Overwrite a rectangular region whose top-left corner is
    /// `start_cell` (e.g. "F2").
    async fn write_range(&self, sheet: &str, start_cell: &str, rows: &[Vec<String>]) -> Result<()>;

    /// Create the worksheet if it does not exist. Returns `true` when a
    /// new (empty) worksheet was created.
    async fn ensure_sheet(&self, sheet: &str, rows: u32, cols: u32) -> Result<bool>;
}

/// Spreadsheet column letter for a 1-indexed column number.
pub fn col_letter(mut col: usize) -> String {
    debug_assert!(col >= 1);
    let mut letters = Vec::new();
    while col > 0 {
        col -= 1;
        letters.push(b'A' + (col % 26) as u8);
        col /= 26;
    }
    letters.reverse();
    String::from_utf8(letters).expect("ASCII letters")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn col_letters_cover_single_and_double_width() {
        assert_eq!(col_letter(1), "A");
        assert_eq!(col_letter(3), "C");
        assert_eq!(col_letter(26), "Z");
        assert_eq!(col_letter(27), "AA");
        assert_eq!(col_letter(52), "AZ");
        assert_eq!(col_letter(703), "AAA");
    }

    #[test]
    fn transient_classification() {
        assert!(
            SheetError::Api {
                status: 429,
                message: String::new()
            }
            .is_transient()
        );
        assert!(
            SheetError::Api {
                status: 503,
                message: String::new()
            }
            .is_transient()
        );
        assert!(
            !SheetError::Api {
                status: 404,
                message: String::new()
            }
            .is_transient()
        );
        assert!(!SheetError::Credentials("bad key".into()).is_transient());
    }
}
