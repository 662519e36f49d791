use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::Deserialize;
use serde_json::json;

use crate::config::SheetConfig;
use crate::monitor::error::{ServiceError, ServiceResult};
use crate::monitor::provider::SheetStore;
use crate::monitor::worksheet::{Cell, Worksheet};
use crate::services::google_auth::GoogleAuth;

/// Google Sheets v4 `values` client bound to one worksheet.
pub struct SheetsClient {
    base_url: String,
    spreadsheet_id: String,
    worksheet_name: String,
    http: Client,
    auth: Arc<GoogleAuth>,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Cell>>,
}

impl SheetsClient {
    pub fn new(config: &SheetConfig, http: Client, auth: Arc<GoogleAuth>) -> Self {
        Self {
            base_url: config.api_base.trim_end_matches('/').to_string(),
            spreadsheet_id: config.spreadsheet_id.clone(),
            worksheet_name: config.worksheet_name.clone(),
            http,
            auth,
        }
    }

    /// A1 range covering the whole worksheet. Quoted so names with spaces
    /// or punctuation work.
    fn range(&self) -> String {
        format!("'{}'", self.worksheet_name.replace('\'', "''"))
    }

    fn values_url(&self, suffix: &str) -> ServiceResult<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ServiceError::sheet(format!("Invalid Sheets API base '{}': {}", self.base_url, e)))?;

        url.path_segments_mut()
            .map_err(|_| ServiceError::sheet(format!("Sheets API base '{}' cannot take a path", self.base_url)))?
            .pop_if_empty()
            .extend([
                "spreadsheets",
                self.spreadsheet_id.as_str(),
                "values",
                format!("{}{}", self.range(), suffix).as_str(),
            ]);

        Ok(url)
    }

    async fn check(response: Response) -> ServiceResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(ServiceError::Http {
            service: "Google Sheets",
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl SheetStore for SheetsClient {
    async fn read_worksheet(&self) -> ServiceResult<Worksheet> {
        let url = self.values_url("")?;
        let token = self.auth.access_token().await?;

        let response = self
            .http
            .get(url)
            .bearer_auth(token)
            .query(&[
                ("majorDimension", "ROWS"),
                ("valueRenderOption", "UNFORMATTED_VALUE"),
            ])
            .send()
            .await
            .map_err(|e| ServiceError::network(format!("Sheets read failed: {}", e)))?;

        let range: ValueRange = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| ServiceError::format(format!("Malformed Sheets response: {}", e)))?;

        tracing::debug!(
            "Read {} rows from worksheet {}",
            range.values.len(),
            self.worksheet_name
        );
        Ok(Worksheet::from_values(range.values))
    }

    async fn clear_worksheet(&self) -> ServiceResult<()> {
        let url = self.values_url(":clear")?;
        let token = self.auth.access_token().await?;

        let response = self
            .http
            .post(url)
            .bearer_auth(token)
            .json(&json!({}))
            .send()
            .await
            .map_err(|e| ServiceError::network(format!("Sheets clear failed: {}", e)))?;

        Self::check(response).await?;
        Ok(())
    }

    async fn append_rows(&self, rows: Vec<Vec<Cell>>) -> ServiceResult<()> {
        let url = self.values_url(":append")?;
        let token = self.auth.access_token().await?;
        let count = rows.len();

        let response = self
            .http
            .post(url)
            .bearer_auth(token)
            .query(&[
                ("valueInputOption", "RAW"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .json(&json!({ "majorDimension": "ROWS", "values": rows }))
            .send()
            .await
            .map_err(|e| ServiceError::network(format!("Sheets append failed: {}", e)))?;

        Self::check(response).await?;
        tracing::debug!("Appended {} rows to worksheet {}", count, self.worksheet_name);
        Ok(())
    }

    fn store_name(&self) -> &str {
        &self.worksheet_name
    }
}
