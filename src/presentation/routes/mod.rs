// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::services::signature::SignatureVerifier;
use crate::presentation::handlers::webhook_handler;
use crate::workers::payment_worker::PaymentWorker;
use axum::{routing::get, Extension, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// 创建应用路由
///
/// # 参数
///
/// * `webhook_path` - Webhook 挂载路径，例如 `/webhook`
///
/// # 返回值
///
/// 返回配置好的路由，尚未注入依赖
pub fn routes(webhook_path: &str) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/version", get(version))
        .route(
            webhook_path,
            get(webhook_handler::liveness).post(webhook_handler::receive_webhook),
        )
}

/// 创建完整应用
///
/// 在 [`routes`] 的基础上注入签名校验器、工作器和请求追踪层。
pub fn app(
    webhook_path: &str,
    verifier: Arc<SignatureVerifier>,
    worker: Arc<PaymentWorker>,
) -> Router {
    routes(webhook_path)
        .layer(Extension(verifier))
        .layer(Extension(worker))
        .layer(TraceLayer::new_for_http())
}

/// 健康检查端点
///
/// # 返回值
///
/// 返回"OK"字符串
pub async fn health_check() -> &'static str {
    "OK"
}

/// 版本信息端点
///
/// # 返回值
///
/// 返回应用版本号
pub async fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
