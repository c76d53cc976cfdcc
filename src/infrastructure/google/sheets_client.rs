// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::sheet_row::{Destination, SheetRow, ValueInputOption};
use crate::domain::services::sheet_service::{ForwardError, SheetService};
use crate::infrastructure::google::auth::AccessTokenProvider;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// 写入请求体
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValueRange<'a, T: Serialize> {
    major_dimension: &'static str,
    values: [&'a T; 1],
}

impl<'a, T: Serialize> ValueRange<'a, T> {
    fn single_row(row: &'a T) -> Self {
        Self {
            major_dimension: "ROWS",
            values: [row],
        }
    }
}

/// 读取响应体，空表时没有 `values` 字段
#[derive(Debug, Deserialize)]
struct ValueRangeResponse {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

/// Google Sheets v4 客户端
pub struct GoogleSheetsClient {
    client: reqwest::Client,
    base_url: Url,
    tokens: Arc<dyn AccessTokenProvider>,
}

impl GoogleSheetsClient {
    /// 创建新的 Sheets 客户端
    ///
    /// # 参数
    ///
    /// * `client` - HTTP 客户端
    /// * `base_url` - API 根地址，例如 `https://sheets.googleapis.com`
    /// * `tokens` - 访问令牌提供者
    pub fn new(
        client: reqwest::Client,
        base_url: &str,
        tokens: Arc<dyn AccessTokenProvider>,
    ) -> Result<Self, ForwardError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ForwardError::Config(format!("invalid api base url: {}", e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ForwardError::Config(format!(
                "invalid api base url: {}",
                base_url
            )));
        }
        Ok(Self {
            client,
            base_url,
            tokens,
        })
    }

    /// 构造 `v4/spreadsheets/{id}/values/{range}` 地址
    fn values_url(&self, spreadsheet_id: &str, range: &str) -> Result<Url, ForwardError> {
        if spreadsheet_id.is_empty() {
            return Err(ForwardError::Config("spreadsheet id is empty".into()));
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ForwardError::Config("api base url cannot be a base".into()))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", spreadsheet_id, "values", range]);
        Ok(url)
    }

    async fn bearer(&self) -> Result<String, ForwardError> {
        Ok(self.tokens.access_token().await?)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ForwardError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ForwardError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }
}

#[async_trait]
impl SheetService for GoogleSheetsClient {
    fn ensure_ready(&self) -> Result<(), ForwardError> {
        if self.tokens.is_configured() {
            Ok(())
        } else {
            Err(ForwardError::MissingCredentials(
                "service account credentials not configured".into(),
            ))
        }
    }

    async fn read_header(
        &self,
        destination: &Destination,
    ) -> Result<Option<Vec<String>>, ForwardError> {
        let url = self.values_url(&destination.spreadsheet_id, &destination.header_range())?;
        let token = self.bearer().await?;

        debug!(destination = %destination.label, %url, "Reading header row");
        let response = self.client.get(url).bearer_auth(token).send().await?;
        let body: ValueRangeResponse = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| ForwardError::Decode(e.to_string()))?;

        Ok(body.values.into_iter().next().map(|row| {
            row.into_iter()
                .map(|v| match v {
                    Value::String(s) => s,
                    other => other.to_string(),
                })
                .collect()
        }))
    }

    async fn write_header(
        &self,
        destination: &Destination,
        headers: &[String],
    ) -> Result<(), ForwardError> {
        let mut url = self.values_url(&destination.spreadsheet_id, &destination.header_range())?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", ValueInputOption::Raw.as_str());
        let token = self.bearer().await?;

        let headers = headers.to_vec();
        let response = self
            .client
            .put(url)
            .bearer_auth(token)
            .json(&ValueRange::single_row(&headers))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn append_row(
        &self,
        destination: &Destination,
        row: &SheetRow,
    ) -> Result<(), ForwardError> {
        let range = format!("{}:append", destination.append_range());
        let mut url = self.values_url(&destination.spreadsheet_id, &range)?;
        url.query_pairs_mut()
            .append_pair(
                "valueInputOption",
                destination.value_input_option.as_str(),
            )
            .append_pair("insertDataOption", "INSERT_ROWS");
        let token = self.bearer().await?;

        debug!(destination = %destination.label, %url, "Appending row");
        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(&ValueRange::single_row(row))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}
