use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use crate::error::{AppError, Result};

/// Title and numeric id of one worksheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetInfo {
    pub title: String,
    pub sheet_id: i64,
}

/// Remote tabular store, addressed by A1 ranges (`Sheet!A:C`).
///
/// Value ranges are 1-based rows with the header in row 1; structural
/// deletes are 0-based. Callers are expected to go through `rows::locate_row`
/// for the conversion instead of doing the arithmetic inline.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SheetStore: Send + Sync {
    /// Full read of a range; rows may be ragged, missing cells are absent.
    async fn get_values(&self, range: &str) -> Result<Vec<Vec<String>>>;

    /// Appends one row below the last data row of the range's sheet.
    async fn append_row(&self, range: &str, row: Vec<String>) -> Result<()>;

    /// Overwrites the cells of `range` with `rows`.
    async fn update_values(&self, range: &str, rows: Vec<Vec<String>>) -> Result<()>;

    /// Structurally removes one row; `start_index` is 0-based.
    async fn delete_row(&self, sheet_id: i64, start_index: i64) -> Result<()>;

    async fn list_sheets(&self) -> Result<Vec<SheetInfo>>;

    async fn add_sheet(&self, title: &str) -> Result<()>;

    /// Bolds the header row without touching its values.
    async fn format_header_bold(&self, sheet_id: i64, column_count: i64) -> Result<()>;
}

/// Google Sheets v4 REST client.
///
/// Authenticates with a bearer access token and carries a fixed request
/// timeout; exceeding it surfaces as a retryable `Unavailable` error.
pub struct GoogleSheetsClient {
    http: reqwest::Client,
    spreadsheet_id: String,
    access_token: String,
}

const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

#[derive(Deserialize)]
struct ValuesResponse {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Deserialize)]
struct SpreadsheetResponse {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Deserialize)]
struct SheetEntry {
    properties: SheetPropertiesEntry,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetPropertiesEntry {
    title: String,
    sheet_id: i64,
}

impl GoogleSheetsClient {
    pub fn new(
        spreadsheet_id: String,
        access_token: String,
        request_timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            spreadsheet_id,
            access_token,
        })
    }

    fn url(&self, suffix: &str) -> String {
        format!("{SHEETS_API_BASE}/{}{suffix}", self.spreadsheet_id)
    }

    /// Maps non-success statuses onto the error taxonomy.
    async fn check(&self, response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                AppError::SheetsAuth(format!("{status}: {body}"))
            }
            StatusCode::NOT_FOUND => AppError::NotFound("Sheet".to_string()),
            StatusCode::TOO_MANY_REQUESTS => AppError::Unavailable(format!("rate limited: {body}")),
            s if s.is_server_error() => AppError::Unavailable(format!("{status}: {body}")),
            _ => AppError::Internal(format!("sheets API returned {status}: {body}")),
        })
    }

    async fn batch_update(&self, requests: Vec<Value>) -> Result<()> {
        let response = self
            .http
            .post(self.url(":batchUpdate"))
            .bearer_auth(&self.access_token)
            .json(&json!({ "requests": requests }))
            .send()
            .await?;
        self.check(response).await?;
        Ok(())
    }
}

fn value_to_cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[async_trait]
impl SheetStore for GoogleSheetsClient {
    async fn get_values(&self, range: &str) -> Result<Vec<Vec<String>>> {
        let response = self
            .http
            .get(self.url(&format!("/values/{range}")))
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        let parsed: ValuesResponse = self.check(response).await?.json().await?;

        Ok(parsed
            .values
            .iter()
            .map(|row| row.iter().map(value_to_cell).collect())
            .collect())
    }

    async fn append_row(&self, range: &str, row: Vec<String>) -> Result<()> {
        let response = self
            .http
            .post(self.url(&format!("/values/{range}:append")))
            .bearer_auth(&self.access_token)
            .query(&[("valueInputOption", "USER_ENTERED")])
            .json(&json!({ "values": [row] }))
            .send()
            .await?;
        self.check(response).await?;
        Ok(())
    }

    async fn update_values(&self, range: &str, rows: Vec<Vec<String>>) -> Result<()> {
        let response = self
            .http
            .put(self.url(&format!("/values/{range}")))
            .bearer_auth(&self.access_token)
            .query(&[("valueInputOption", "USER_ENTERED")])
            .json(&json!({ "values": rows }))
            .send()
            .await?;
        self.check(response).await?;
        Ok(())
    }

    async fn delete_row(&self, sheet_id: i64, start_index: i64) -> Result<()> {
        self.batch_update(vec![json!({
            "deleteDimension": {
                "range": {
                    "sheetId": sheet_id,
                    "dimension": "ROWS",
                    "startIndex": start_index,
                    "endIndex": start_index + 1
                }
            }
        })])
        .await
    }

    async fn list_sheets(&self) -> Result<Vec<SheetInfo>> {
        let response = self
            .http
            .get(self.url(""))
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        let parsed: SpreadsheetResponse = self.check(response).await?.json().await?;

        Ok(parsed
            .sheets
            .into_iter()
            .map(|s| SheetInfo {
                title: s.properties.title,
                sheet_id: s.properties.sheet_id,
            })
            .collect())
    }

    async fn add_sheet(&self, title: &str) -> Result<()> {
        self.batch_update(vec![json!({
            "addSheet": {
                "properties": {
                    "title": title,
                    "gridProperties": { "rowCount": 1000, "columnCount": 20 }
                }
            }
        })])
        .await
    }

    async fn format_header_bold(&self, sheet_id: i64, column_count: i64) -> Result<()> {
        self.batch_update(vec![json!({
            "repeatCell": {
                "range": {
                    "sheetId": sheet_id,
                    "startRowIndex": 0,
                    "endRowIndex": 1,
                    "startColumnIndex": 0,
                    "endColumnIndex": column_count
                },
                "cell": {
                    "userEnteredFormat": { "textFormat": { "bold": true } }
                },
                "fields": "userEnteredFormat.textFormat.bold"
            }
        })])
        .await
    }
}

/// Sheet title portion of an A1 range (`Thoughts!A:C` -> `Thoughts`).
pub fn sheet_title(range: &str) -> &str {
    range.split('!').next().unwrap_or(range)
}
