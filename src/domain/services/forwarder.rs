// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::sheet_row::{header_titles, Destination, SheetRow};
use crate::domain::services::sheet_service::{ForwardError, SheetService};
use crate::utils::retry_policy::RetryPolicy;
use metrics::counter;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

/// 转发结果
///
/// 转发失败不会返回给调用方，只体现在结果和日志中。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForwardOutcome {
    /// 追加成功
    Appended { attempts: u32 },
    /// 重试耗尽
    Exhausted { attempts: u32, last_error: String },
    /// 不可重试的错误
    Rejected { attempts: u32, error: String },
    /// 未发起请求（例如缺少凭据）
    Skipped { reason: String },
}

impl ForwardOutcome {
    pub fn is_appended(&self) -> bool {
        matches!(self, ForwardOutcome::Appended { .. })
    }
}

/// 表格转发器
///
/// 负责表头初始化和带重试的追加写入。
pub struct SheetForwarder {
    service: Arc<dyn SheetService>,
    retry: RetryPolicy,
    /// 已确认存在表头的目标
    bootstrapped: Mutex<HashSet<String>>,
}

impl SheetForwarder {
    pub fn new(service: Arc<dyn SheetService>, retry: RetryPolicy) -> Self {
        Self {
            service,
            retry,
            bootstrapped: Mutex::new(HashSet::new()),
        }
    }

    /// 将一行写入目标表格
    ///
    /// # 参数
    ///
    /// * `destination` - 目标表格
    /// * `row` - 表格行
    ///
    /// # 返回值
    ///
    /// 返回转发结果，从不返回错误
    pub async fn forward(&self, destination: &Destination, row: &SheetRow) -> ForwardOutcome {
        if let Err(e) = self.service.ensure_ready() {
            warn!(destination = %destination.label, "Skipping sheet append: {}", e);
            counter!("sheet_append_failed_total", "reason" => e.label()).increment(1);
            return ForwardOutcome::Skipped {
                reason: e.to_string(),
            };
        }

        self.bootstrap_header(destination).await;

        let mut attempt = 0;
        loop {
            attempt += 1;
            counter!("sheet_append_attempts_total").increment(1);

            let err = match self.service.append_row(destination, row).await {
                Ok(()) => {
                    info!(
                        destination = %destination.label,
                        attempt,
                        "Row appended to sheet"
                    );
                    counter!("sheet_append_success_total").increment(1);
                    return ForwardOutcome::Appended { attempts: attempt };
                }
                Err(e) => e,
            };

            counter!("sheet_append_failed_total", "reason" => err.label()).increment(1);

            if let ForwardError::MissingCredentials(_) = err {
                warn!(destination = %destination.label, "Skipping sheet append: {}", err);
                return ForwardOutcome::Skipped {
                    reason: err.to_string(),
                };
            }

            if !err.is_retryable() {
                error!(
                    destination = %destination.label,
                    attempt,
                    "Sheet append rejected: {}", err
                );
                return ForwardOutcome::Rejected {
                    attempts: attempt,
                    error: err.to_string(),
                };
            }

            if !self.retry.should_retry(attempt) {
                error!(
                    destination = %destination.label,
                    attempts = attempt,
                    "Sheet append failed after retries: {}", err
                );
                return ForwardOutcome::Exhausted {
                    attempts: attempt,
                    last_error: err.to_string(),
                };
            }

            let backoff = self.retry.calculate_backoff(attempt);
            warn!(
                destination = %destination.label,
                attempt,
                backoff_ms = backoff.as_millis() as u64,
                "Sheet append failed, retrying: {}", err
            );
            sleep(backoff).await;
        }
    }

    /// 首次写入前确保表头存在
    ///
    /// 先读后写，不加分布式锁；两个进程同时初始化时可能写两次表头。
    async fn bootstrap_header(&self, destination: &Destination) {
        if !destination.bootstrap_header {
            return;
        }

        let key = destination.key();
        if self.bootstrapped.lock().await.contains(&key) {
            return;
        }

        match self.service.read_header(destination).await {
            Ok(Some(existing)) if existing.iter().any(|h| !h.is_empty()) => {
                debug!(destination = %destination.label, "Header row already present");
                self.bootstrapped.lock().await.insert(key);
            }
            Ok(_) => {
                match self
                    .service
                    .write_header(destination, &header_titles())
                    .await
                {
                    Ok(()) => {
                        info!(destination = %destination.label, "Header row written");
                        self.bootstrapped.lock().await.insert(key);
                    }
                    Err(e) => {
                        warn!(destination = %destination.label, "Failed to write header row: {}", e)
                    }
                }
            }
            Err(e) => {
                warn!(destination = %destination.label, "Failed to read header row: {}", e);
            }
        }
    }
}
