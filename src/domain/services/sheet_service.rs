// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::sheet_row::{Destination, SheetRow};
use async_trait::async_trait;
use thiserror::Error;

/// 表格写入错误
#[derive(Error, Debug)]
pub enum ForwardError {
    /// 未配置服务账号凭据
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),
    /// 获取访问令牌失败
    #[error("Authentication failed: {message}")]
    Auth { message: String, retryable: bool },
    /// 网络或传输错误
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// 远端返回非成功状态码
    #[error("Sheet API returned {status}: {body}")]
    Status { status: u16, body: String },
    /// 响应解析失败
    #[error("Failed to decode response: {0}")]
    Decode(String),
    /// 目标配置无效（例如缺少表格ID）
    #[error("Invalid destination: {0}")]
    Config(String),
}

impl ForwardError {
    /// 判断错误是否可重试
    ///
    /// 传输错误、429 和 5xx 可以重试，其余 4xx 与凭据问题不重试。
    pub fn is_retryable(&self) -> bool {
        match self {
            ForwardError::Transport(e) => {
                e.is_timeout()
                    || e.is_connect()
                    || e.is_request()
                    || e.status().is_some_and(|s| s.is_server_error())
            }
            ForwardError::Status { status, .. } => *status == 429 || *status >= 500,
            ForwardError::Auth { retryable, .. } => *retryable,
            ForwardError::MissingCredentials(_)
            | ForwardError::Decode(_)
            | ForwardError::Config(_) => false,
        }
    }

    /// 指标标签
    pub fn label(&self) -> &'static str {
        match self {
            ForwardError::MissingCredentials(_) => "missing_credentials",
            ForwardError::Auth { .. } => "auth",
            ForwardError::Transport(_) => "transport",
            ForwardError::Status { .. } => "http_status",
            ForwardError::Decode(_) => "decode",
            ForwardError::Config(_) => "config",
        }
    }
}

/// 表格服务特质
///
/// 目标表格只需要三种操作：读取表头、写入表头、追加一行。
#[async_trait]
pub trait SheetService: Send + Sync {
    /// 在发起任何请求前检查凭据是否齐全
    fn ensure_ready(&self) -> Result<(), ForwardError> {
        Ok(())
    }

    /// 读取表头行，表为空时返回 `None`
    async fn read_header(&self, destination: &Destination)
        -> Result<Option<Vec<String>>, ForwardError>;

    /// 写入表头行
    async fn write_header(
        &self,
        destination: &Destination,
        headers: &[String],
    ) -> Result<(), ForwardError>;

    /// 追加一行
    async fn append_row(&self, destination: &Destination, row: &SheetRow)
        -> Result<(), ForwardError>;
}
