//! Command-line interface for the harvester.
//!
//! All options can also come from the environment, which is how the
//! scheduled (GitHub Actions style) deployment supplies them.

use clap::Parser;

/// Command-line arguments for the Yahoo! News harvester.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Spreadsheet holding the master log and the daily working tables
    #[arg(long, env = "SPREADSHEET_ID")]
    pub spreadsheet_id: String,

    /// Service-account key file, used when no credential env var is set
    #[arg(long, default_value = "credentials.json")]
    pub credentials_file: String,

    /// Base URL of the page-rendering service (Browserless /content API)
    #[arg(long, env = "BROWSERLESS_URL", default_value = "http://localhost:3000")]
    pub browserless_url: String,

    /// Optional token for the rendering service
    #[arg(long, env = "BROWSERLESS_TOKEN")]
    pub browserless_token: Option<String>,

    /// Search keywords (comma separated)
    #[arg(
        short,
        long,
        value_delimiter = ',',
        default_values_t = [
            String::from("JMS"),
            String::from("モビリティショー"),
            String::from("mobility show"),
        ]
    )]
    pub keywords: Vec<String>,

    /// Name of the master log worksheet
    #[arg(long, default_value = "Yahoo")]
    pub master_sheet: String,

    /// Comments stored per cell; the working-table header width depends
    /// on this, so pick one value per deployment
    #[arg(long, default_value_t = 10)]
    pub cell_capacity: usize,

    /// Hard ceiling on comment pages fetched per article
    #[arg(long, default_value_t = 1000)]
    pub max_comment_pages: usize,
}
