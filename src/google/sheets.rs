//! Google Sheets v4 client for the handful of spreadsheet calls the
//! intake workflow needs

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};

use super::connector::TokenCache;
use crate::core::AppConfig;

/// Input mode that lets Sheets coerce values (dates, numbers) as if they
/// were typed into the UI.
const VALUE_INPUT_OPTION: &str = "USER_ENTERED";

/// Remote spreadsheet operations.
#[async_trait]
pub trait SheetStore: Send + Sync {
    /// Create a spreadsheet with a single tab whose first row is `header`.
    /// Returns the new spreadsheet id.
    async fn create_spreadsheet(
        &self,
        title: &str,
        sheet_title: &str,
        header: &[&str],
    ) -> Result<String>;

    async fn get_values(&self, spreadsheet_id: &str, range: &str) -> Result<Vec<Vec<String>>>;

    async fn append_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        rows: Vec<Vec<String>>,
    ) -> Result<()>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateSpreadsheetResponse {
    spreadsheet_id: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

fn cell_to_string(cell: Value) -> String {
    match cell {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// A bearer-authenticated client. Cheap to build, so one is made per
/// operation with whatever token is current.
pub struct SheetsClient {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl SheetsClient {
    pub fn new(http: reqwest::Client, base_url: &str, access_token: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
        }
    }

    fn values_url(&self, spreadsheet_id: &str, range: &str) -> String {
        format!(
            "{}/v4/spreadsheets/{}/values/{}",
            self.base_url,
            urlencoding::encode(spreadsheet_id),
            urlencoding::encode(range)
        )
    }

    pub async fn create_spreadsheet(
        &self,
        title: &str,
        sheet_title: &str,
        header: &[&str],
    ) -> Result<String> {
        let header_cells: Vec<Value> = header
            .iter()
            .map(|h| json!({ "userEnteredValue": { "stringValue": h } }))
            .collect();
        let body = json!({
            "properties": { "title": title },
            "sheets": [{
                "properties": { "title": sheet_title },
                "data": [{ "rowData": [{ "values": header_cells }] }]
            }]
        });

        let resp: CreateSpreadsheetResponse = self
            .http
            .post(format!("{}/v4/spreadsheets", self.base_url))
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(resp.spreadsheet_id)
    }

    pub async fn get_values(&self, spreadsheet_id: &str, range: &str) -> Result<Vec<Vec<String>>> {
        let resp: ValueRange = self
            .http
            .get(self.values_url(spreadsheet_id, range))
            .bearer_auth(&self.access_token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(resp
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect())
    }

    pub async fn append_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        rows: Vec<Vec<String>>,
    ) -> Result<()> {
        let mut url = reqwest::Url::parse(&format!(
            "{}:append",
            self.values_url(spreadsheet_id, range)
        ))?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", VALUE_INPUT_OPTION);

        self.http
            .post(url)
            .bearer_auth(&self.access_token)
            .json(&json!({ "values": rows }))
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }
}

/// Builds a fresh [`SheetsClient`] from the token cache for every call.
pub struct GoogleSheets {
    tokens: Arc<TokenCache>,
    http: reqwest::Client,
    base_url: String,
}

impl GoogleSheets {
    pub fn new(tokens: Arc<TokenCache>, http: reqwest::Client, base_url: &str) -> Self {
        Self {
            tokens,
            http,
            base_url: base_url.to_string(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let tokens = Arc::new(TokenCache::from_config(config)?);
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self::new(tokens, http, &config.sheets_api_url))
    }

    pub async fn client(&self) -> Result<SheetsClient> {
        let access_token = self.tokens.access_token().await?;
        Ok(SheetsClient::new(
            self.http.clone(),
            &self.base_url,
            &access_token,
        ))
    }
}

#[async_trait]
impl SheetStore for GoogleSheets {
    async fn create_spreadsheet(
        &self,
        title: &str,
        sheet_title: &str,
        header: &[&str],
    ) -> Result<String> {
        self.client()
            .await?
            .create_spreadsheet(title, sheet_title, header)
            .await
    }

    async fn get_values(&self, spreadsheet_id: &str, range: &str) -> Result<Vec<Vec<String>>> {
        self.client().await?.get_values(spreadsheet_id, range).await
    }

    async fn append_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        rows: Vec<Vec<String>>,
    ) -> Result<()> {
        self.client()
            .await?
            .append_values(spreadsheet_id, range, rows)
            .await
    }
}
