//! Google Sheets REST implementation of [`SheetStore`].
//!
//! Reads use `UNFORMATTED_VALUE` so date cells come back as numeric
//! serials (which the promotion parser understands) instead of
//! locale-formatted strings; writes use `USER_ENTERED` to match what a
//! human pasting the same values would get.

use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

use super::auth;
use super::{Result, SheetError, SheetStore, col_letter};

const API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

pub struct SheetsClient {
    http: reqwest::Client,
    spreadsheet_id: String,
    token: String,
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Deserialize)]
struct SheetProperties {
    title: String,
}

fn cell_to_string(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

impl SheetsClient {
    /// Resolve credentials, exchange them for an access token, and hand
    /// back an authenticated handle. Fails fast on any credential
    /// problem.
    pub async fn connect(spreadsheet_id: &str, credentials_file: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        let key = auth::resolve_key(credentials_file)?;
        let token = auth::access_token(&http, &key).await?;
        info!(spreadsheet_id, "authenticated sheets backend");
        Ok(Self {
            http,
            spreadsheet_id: spreadsheet_id.to_string(),
            token,
        })
    }

    fn values_url(&self, range: &str, suffix: &str) -> String {
        format!(
            "{API_BASE}/{}/values/{}{suffix}",
            self.spreadsheet_id,
            urlencoding::encode(range)
        )
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response> {
        let status = resp.status();
        if status.is_success() {
            Ok(resp)
        } else {
            let message = resp.text().await.unwrap_or_default();
            Err(SheetError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }

    async fn get_values(&self, range: &str) -> Result<Vec<Vec<String>>> {
        let url = self.values_url(range, "?valueRenderOption=UNFORMATTED_VALUE");
        let resp = self.http.get(&url).bearer_auth(&self.token).send().await?;
        let parsed: ValueRange = Self::check(resp).await?.json().await?;
        debug!(range, rows = parsed.values.len(), "read value range");
        Ok(parsed
            .values
            .iter()
            .map(|row| row.iter().map(cell_to_string).collect())
            .collect())
    }
}

impl SheetStore for SheetsClient {
    async fn read_all(&self, sheet: &str) -> Result<Vec<Vec<String>>> {
        self.get_values(&format!("'{sheet}'")).await
    }

    async fn col_values(&self, sheet: &str, col: usize) -> Result<Vec<String>> {
        let letter = col_letter(col);
        let rows = self
            .get_values(&format!("'{sheet}'!{letter}:{letter}"))
            .await?;
        Ok(rows
            .into_iter()
            .map(|row| row.into_iter().next().unwrap_or_default())
            .collect())
    }

    async fn row_values(&self, sheet: &str, row: usize) -> Result<Vec<String>> {
        let mut rows = self.get_values(&format!("'{sheet}'!{row}:{row}")).await?;
        Ok(if rows.is_empty() {
            Vec::new()
        } else {
            rows.swap_remove(0)
        })
    }

    async fn append_rows(&self, sheet: &str, rows: &[Vec<String>]) -> Result<()> {
        let url = self.values_url(
            &format!("'{sheet}'!A1"),
            ":append?valueInputOption=USER_ENTERED&insertDataOption=INSERT_ROWS",
        );
        let body = serde_json::json!({ "values": rows });
        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;
        Self::check(resp).await?;
        debug!(sheet, rows = rows.len(), "appended rows");
        Ok(())
    }

    async fn write_range(&self, sheet: &str, start_cell: &str, rows: &[Vec<String>]) -> Result<()> {
        let url = self.values_url(
            &format!("'{sheet}'!{start_cell}"),
            "?valueInputOption=USER_ENTERED",
        );
        let body = serde_json::json!({ "values": rows });
        let resp = self
            .http
            .put(&url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;
        Self::check(resp).await?;
        debug!(sheet, start_cell, rows = rows.len(), "wrote range");
        Ok(())
    }

    async fn ensure_sheet(&self, sheet: &str, rows: u32, cols: u32) -> Result<bool> {
        let meta_url = format!(
            "{API_BASE}/{}?fields=sheets.properties.title",
            self.spreadsheet_id
        );
        let resp = self
            .http
            .get(&meta_url)
            .bearer_auth(&self.token)
            .send()
            .await?;
        let meta: SpreadsheetMeta = Self::check(resp).await?.json().await?;
        if meta.sheets.iter().any(|s| s.properties.title == sheet) {
            return Ok(false);
        }

        let batch_url = format!("{API_BASE}/{}:batchUpdate", self.spreadsheet_id);
        let body = serde_json::json!({
            "requests": [{
                "addSheet": {
                    "properties": {
                        "title": sheet,
                        "gridProperties": { "rowCount": rows, "columnCount": cols },
                    }
                }
            }]
        });
        let resp = self
            .http
            .post(&batch_url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;
        Self::check(resp).await?;
        info!(sheet, "created worksheet");
        Ok(true)
    }
}
