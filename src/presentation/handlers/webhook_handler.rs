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

use crate::domain::models::payment::WebhookEnvelope;
use crate::domain::services::signature::SignatureVerifier;
use crate::presentation::errors::AppError;
use crate::presentation::extractors::signature::RazorpaySignature;
use crate::workers::payment_worker::PaymentWorker;
use axum::{body::Bytes, Extension, Json};
use metrics::counter;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};

/// 接收 Razorpay Webhook
///
/// 只对原始请求体校验签名，通过后立即应答，
/// 后续处理交给 [`PaymentWorker`] 的独立任务。
pub async fn receive_webhook(
    Extension(verifier): Extension<Arc<SignatureVerifier>>,
    Extension(worker): Extension<Arc<PaymentWorker>>,
    RazorpaySignature(signature): RazorpaySignature,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let Some(signature) = signature else {
        warn!("Webhook rejected: missing signature header");
        counter!("webhook_requests_total", "outcome" => "missing_signature").increment(1);
        return Err(AppError::MissingSignature);
    };

    if !verifier.verify(&body, Some(&signature)) {
        warn!(body_len = body.len(), "Webhook rejected: invalid signature");
        counter!("webhook_requests_total", "outcome" => "invalid_signature").increment(1);
        return Err(AppError::InvalidSignature);
    }

    counter!("webhook_requests_total", "outcome" => "accepted").increment(1);
    debug!(body_len = body.len(), "Signature verified, dispatching");

    // Dropping the handle detaches the task
    let _detached = worker.dispatch(WebhookEnvelope::new(body, Some(signature)));

    Ok(Json(json!({ "success": true })))
}

/// Webhook 地址的存活探测
pub async fn liveness() -> &'static str {
    "Razorpay webhook endpoint is live"
}
