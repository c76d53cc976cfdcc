// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::sheet_row::{header_titles, Destination, SheetRow};
use crate::domain::services::sheet_service::{ForwardError, SheetService};
use async_trait::async_trait;
use tracing::debug;

/// 旧版脚本读取的驼峰键名与对应的列键名
///
/// 其余旧键名（name、email、phone、amount、status）与列键名相同。
const LEGACY_ALIASES: [(&str, &str); 1] = [("paymentId", "payment_id")];

/// Apps Script Web 应用客户端
///
/// 把每一行以 JSON 对象的形式 POST 到部署好的 Web 应用，
/// 由脚本自己写入表格。表头由脚本维护，因此表头读写都是空操作。
/// 记录同时携带列键名和旧版脚本使用的 `paymentId`。
pub struct AppsScriptClient {
    client: reqwest::Client,
    url: Option<String>,
}

impl AppsScriptClient {
    pub fn new(client: reqwest::Client, url: Option<String>) -> Self {
        Self {
            client,
            url: url.filter(|u| !u.is_empty()),
        }
    }
}

#[async_trait]
impl SheetService for AppsScriptClient {
    fn ensure_ready(&self) -> Result<(), ForwardError> {
        match self.url {
            Some(_) => Ok(()),
            None => Err(ForwardError::MissingCredentials(
                "apps script url not configured".into(),
            )),
        }
    }

    async fn read_header(
        &self,
        _destination: &Destination,
    ) -> Result<Option<Vec<String>>, ForwardError> {
        Ok(Some(header_titles()))
    }

    async fn write_header(
        &self,
        _destination: &Destination,
        _headers: &[String],
    ) -> Result<(), ForwardError> {
        Ok(())
    }

    async fn append_row(
        &self,
        destination: &Destination,
        row: &SheetRow,
    ) -> Result<(), ForwardError> {
        let url = self.url.as_deref().ok_or_else(|| {
            ForwardError::MissingCredentials("apps script url not configured".into())
        })?;

        let mut record = row.to_record();
        for (alias, key) in LEGACY_ALIASES {
            if let Some(value) = record.get(key).cloned() {
                record.insert(alias.to_string(), value);
            }
        }
        record.insert(
            "sheet".to_string(),
            serde_json::Value::String(destination.sheet_name.clone()),
        );

        debug!(destination = %destination.label, "Posting row to apps script");
        let response = self.client.post(url).json(&record).send().await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ForwardError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }
}
