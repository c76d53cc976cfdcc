// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use super::helpers::{create_worker, RecordingSheet, TEST_SECRET};
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use paysheet::domain::services::fanout::FanoutRule;
use paysheet::domain::services::signature::SignatureVerifier;
use paysheet::presentation::routes;
use std::sync::Arc;
use tower::util::ServiceExt;

/// 健康检查测试
///
/// 验证健康检查端点是否正常工作
#[tokio::test]
async fn health_check_works() {
    let app = routes::routes("/webhook");

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"OK");
}

#[tokio::test]
async fn version_reports_package_version() {
    let app = routes::routes("/webhook");

    let response = app
        .oneshot(
            Request::builder()
                .uri("/version")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], env!("CARGO_PKG_VERSION").as_bytes());
}

/// 自定义挂载路径测试
///
/// 验证 Webhook 可以挂载在配置的路径上，并且未签名请求返回400状态码
#[tokio::test]
async fn custom_webhook_path_rejects_unsigned_post() {
    let sheet = Arc::new(RecordingSheet::default());
    let app = routes::app(
        "/hooks/razorpay",
        Arc::new(SignatureVerifier::new(TEST_SECRET)),
        create_worker(sheet, FanoutRule::default()),
    );

    let response = app
        .oneshot(
            Request::builder()
                .uri("/hooks/razorpay")
                .method("POST")
                .header("Content-Type", "application/json")
                .body(Body::from(r#"{"event": "payment.captured"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
