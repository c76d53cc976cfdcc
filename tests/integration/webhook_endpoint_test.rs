// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{create_test_app, payment_body, sign};
use axum::body::Bytes;
use axum::http::StatusCode;
use serde_json::{json, Value};
use std::time::Duration;

#[tokio::test]
async fn test_get_webhook_reports_liveness() {
    let app = create_test_app();

    let response = app.server.get("/webhook").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(!response.text().is_empty());
}

#[tokio::test]
async fn test_missing_signature_rejected() {
    let app = create_test_app();
    let body = payment_body("payment.captured", 9900, json!({}));

    let response = app.server.post("/webhook").text(body).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.text(), "Invalid Signature");

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(app.sheet.appended().is_empty());
}

#[tokio::test]
async fn test_wrong_signature_rejected() {
    let app = create_test_app();
    let body = payment_body("payment.captured", 9900, json!({}));
    let forged = paysheet::domain::services::signature::sign(body.as_bytes(), "other_secret");

    let response = app
        .server
        .post("/webhook")
        .add_header("x-razorpay-signature", forged)
        .text(body)
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.text(), "Invalid Signature");
}

#[tokio::test]
async fn test_tampered_body_rejected() {
    let app = create_test_app();
    let body = payment_body("payment.captured", 9900, json!({}));
    let signature = sign(&body);
    let tampered = body.replace("9900", "1");

    let response = app
        .server
        .post("/webhook")
        .add_header("x-razorpay-signature", signature)
        .text(tampered)
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_valid_signature_acknowledged() {
    let app = create_test_app();
    let body = payment_body("payment.captured", 50000, json!({}));
    let signature = sign(&body);

    let response = app
        .server
        .post("/webhook")
        .add_header("x-razorpay-signature", signature)
        .text(body)
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let json = response.json::<Value>();
    assert_eq!(json, json!({ "success": true }));
}

#[tokio::test]
async fn test_signature_covers_raw_bytes() {
    let app = create_test_app();
    // Non-canonical spacing that a JSON round trip would not preserve
    let raw = r#"{"event":  "payment.captured",  "payload": {"payment": {"entity": {"id": "pay_Raw1", "amount": 50000, "notes": []}}}}"#;
    let signature = sign(raw);

    let response = app
        .server
        .post("/webhook")
        .add_header("x-razorpay-signature", signature.clone())
        .bytes(Bytes::from_static(raw.as_bytes()))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let reserialized = serde_json::to_string(&serde_json::from_str::<Value>(raw).unwrap()).unwrap();
    assert_ne!(reserialized, raw);

    let response = app
        .server
        .post("/webhook")
        .add_header("x-razorpay-signature", signature)
        .text(reserialized)
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_acknowledged_even_when_body_is_not_json() {
    let app = create_test_app();
    let body = "not json at all";
    let signature = sign(body);

    let response = app
        .server
        .post("/webhook")
        .add_header("x-razorpay-signature", signature)
        .text(body)
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(app.sheet.appended().is_empty());
}

#[tokio::test]
async fn test_non_allowed_event_never_reaches_sheet() {
    let app = create_test_app();
    let body = payment_body("order.paid", 9900, json!({}));
    let signature = sign(&body);

    let response = app
        .server
        .post("/webhook")
        .add_header("x-razorpay-signature", signature)
        .text(body)
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(app.sheet.appended().is_empty());
}
