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

use paysheet::config::settings::{Settings, SheetsBackend};
use paysheet::domain::services::forwarder::SheetForwarder;
use paysheet::domain::services::sheet_service::SheetService;
use paysheet::domain::services::signature::SignatureVerifier;
use paysheet::infrastructure::apps_script::AppsScriptClient;
use paysheet::infrastructure::google::auth;
use paysheet::infrastructure::google::sheets_client::GoogleSheetsClient;
use paysheet::presentation::routes;
use paysheet::utils::retry_policy::RetryPolicy;
use paysheet::utils::telemetry;
use paysheet::workers::payment_worker::PaymentWorker;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并启动服务
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting paysheet...");

    // 2. Load configuration
    let settings = Settings::new()?;
    info!("Configuration loaded");

    if settings.webhook.secret.is_empty() {
        warn!("Webhook secret is empty, every delivery will be rejected");
    }

    // Initialize Prometheus Metrics
    paysheet::infrastructure::metrics::init_metrics(&settings.metrics);

    // 3. Build the sheet backend
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(settings.sheets.request_timeout_secs))
        .build()?;

    let service: Arc<dyn SheetService> = match settings.sheets.backend {
        SheetsBackend::Api => {
            let tokens = auth::token_provider(client.clone(), &settings.credentials);
            Arc::new(GoogleSheetsClient::new(
                client,
                &settings.sheets.api_base_url,
                tokens,
            )?)
        }
        SheetsBackend::AppsScript => Arc::new(AppsScriptClient::new(
            client,
            settings.sheets.apps_script_url.clone(),
        )),
    };
    info!(backend = ?settings.sheets.backend, "Sheet backend initialized");

    // 4. Wire the worker
    let forwarder = Arc::new(SheetForwarder::new(
        service,
        RetryPolicy::from(&settings.retry),
    ));
    let worker = Arc::new(PaymentWorker::from_settings(&settings, forwarder));
    let verifier = Arc::new(SignatureVerifier::new(settings.webhook.secret.clone()));

    // 5. Start HTTP server
    let app = routes::app(&settings.webhook.path, verifier, worker);

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
