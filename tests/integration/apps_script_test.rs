// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::destination;
use paysheet::domain::models::sheet_row::{Cell, SheetRow, COLUMNS};
use paysheet::domain::services::forwarder::{ForwardOutcome, SheetForwarder};
use paysheet::infrastructure::apps_script::AppsScriptClient;
use paysheet::utils::retry_policy::RetryPolicy;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn sample_row() -> SheetRow {
    let mut cells = vec![Cell::text(""); COLUMNS.len()];
    cells[0] = Cell::text("pay_Script1");
    cells[4] = Cell::Number(99.0);
    cells[2] = Cell::text("asha@example.com");
    cells[3] = Cell::text("+919876543210");
    cells[7] = Cell::text("success");
    cells[11] = Cell::text("Asha");
    SheetRow::new(cells)
}

fn forwarder(url: Option<String>) -> SheetForwarder {
    SheetForwarder::new(
        Arc::new(AppsScriptClient::new(reqwest::Client::new(), url)),
        RetryPolicy::fixed(3, Duration::from_millis(10)),
    )
}

#[tokio::test]
async fn test_row_posted_as_record() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/exec"))
        .and(body_partial_json(json!({
            "payment_id": "pay_Script1",
            "amount": 99.0,
            "name": "Asha",
            "sheet": "Sheet1"
        })))
        // Keys read by scripts deployed for the original receiver
        .and(body_partial_json(json!({
            "paymentId": "pay_Script1",
            "name": "Asha",
            "email": "asha@example.com",
            "phone": "+919876543210",
            "amount": 99.0,
            "status": "success"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string("Success"))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = forwarder(Some(format!("{}/exec", server.uri())))
        .forward(&destination("primary", "sheet-123"), &sample_row())
        .await;
    assert_eq!(outcome, ForwardOutcome::Appended { attempts: 1 });
}

#[tokio::test]
async fn test_script_errors_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/exec"))
        .respond_with(ResponseTemplate::new(502))
        .expect(3)
        .mount(&server)
        .await;

    let outcome = forwarder(Some(format!("{}/exec", server.uri())))
        .forward(&destination("primary", "sheet-123"), &sample_row())
        .await;
    assert!(matches!(
        outcome,
        ForwardOutcome::Exhausted { attempts: 3, .. }
    ));
}

#[tokio::test]
async fn test_missing_url_skips_without_request() {
    let outcome = forwarder(None)
        .forward(&destination("primary", "sheet-123"), &sample_row())
        .await;
    assert!(matches!(outcome, ForwardOutcome::Skipped { .. }));
}
