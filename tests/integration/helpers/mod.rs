// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use axum_test::TestServer;
use paysheet::domain::models::sheet_row::{header_titles, Destination, SheetRow, ValueInputOption};
use paysheet::domain::services::event_filter::EventFilter;
use paysheet::domain::services::fanout::FanoutRule;
use paysheet::domain::services::forwarder::SheetForwarder;
use paysheet::domain::services::normalizer::FieldNormalizer;
use paysheet::domain::services::sheet_service::{ForwardError, SheetService};
use paysheet::domain::services::signature::{self, SignatureVerifier};
use paysheet::presentation::routes;
use paysheet::utils::retry_policy::RetryPolicy;
use paysheet::workers::payment_worker::PaymentWorker;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const TEST_SECRET: &str = "test_webhook_secret";

/// 记录所有追加行的表格服务
#[derive(Default)]
pub struct RecordingSheet {
    appended: Mutex<Vec<(Destination, SheetRow)>>,
}

impl RecordingSheet {
    pub fn appended(&self) -> Vec<(Destination, SheetRow)> {
        self.appended.lock().unwrap().clone()
    }

    /// 等待至少 `count` 行写入，后台任务在应答之后才运行
    pub async fn wait_for_appends(&self, count: usize) -> Vec<(Destination, SheetRow)> {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        loop {
            let rows = self.appended();
            if rows.len() >= count || tokio::time::Instant::now() >= deadline {
                return rows;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

#[async_trait]
impl SheetService for RecordingSheet {
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
        self.appended
            .lock()
            .unwrap()
            .push((destination.clone(), row.clone()));
        Ok(())
    }
}

pub fn destination(label: &str, spreadsheet_id: &str) -> Destination {
    Destination {
        label: label.to_string(),
        spreadsheet_id: spreadsheet_id.to_string(),
        sheet_name: "Sheet1".to_string(),
        value_input_option: ValueInputOption::Raw,
        bootstrap_header: true,
    }
}

pub fn create_worker(sheet: Arc<RecordingSheet>, fanout: FanoutRule) -> Arc<PaymentWorker> {
    let forwarder = Arc::new(SheetForwarder::new(
        sheet,
        RetryPolicy::fixed(3, Duration::from_millis(10)),
    ));
    Arc::new(PaymentWorker::new(
        EventFilter::default(),
        FieldNormalizer::default(),
        forwarder,
        destination("primary", "primary-sheet"),
        Some(destination("secondary", "secondary-sheet")),
        fanout,
    ))
}

#[allow(dead_code)]
pub struct TestApp {
    pub server: TestServer,
    pub sheet: Arc<RecordingSheet>,
}

pub fn create_test_app() -> TestApp {
    create_test_app_with_fanout(FanoutRule::default())
}

pub fn create_test_app_with_fanout(fanout: FanoutRule) -> TestApp {
    let sheet = Arc::new(RecordingSheet::default());
    let worker = create_worker(sheet.clone(), fanout);
    let app = routes::app(
        "/webhook",
        Arc::new(SignatureVerifier::new(TEST_SECRET)),
        worker,
    );
    let server = TestServer::new(app).unwrap();
    TestApp { server, sheet }
}

pub fn sign(body: &str) -> String {
    signature::sign(body.as_bytes(), TEST_SECRET)
}

/// 构造 Razorpay 风格的请求体
pub fn payment_body(event: &str, amount: i64, notes: Value) -> String {
    json!({
        "entity": "event",
        "event": event,
        "payload": {
            "payment": {
                "entity": {
                    "id": "pay_Test123",
                    "order_id": "order_Test456",
                    "email": "asha@example.com",
                    "contact": "+919876543210",
                    "amount": amount,
                    "currency": "INR",
                    "method": "upi",
                    "status": "captured",
                    "notes": notes,
                    "created_at": 1_700_000_000
                }
            }
        }
    })
    .to_string()
}
