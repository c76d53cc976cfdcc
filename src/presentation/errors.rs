// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// 应用错误类型
///
/// Webhook 发送方只能看到签名校验失败，其余错误都在后台任务中处理。
#[derive(Debug, Error)]
pub enum AppError {
    /// 缺少签名头
    #[error("Missing Signature")]
    MissingSignature,
    /// 签名不匹配
    #[error("Invalid Signature")]
    InvalidSignature,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Both cases look the same to the sender
        let status = match self {
            AppError::MissingSignature | AppError::InvalidSignature => StatusCode::BAD_REQUEST,
        };
        (status, "Invalid Signature").into_response()
    }
}
