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

use crate::config::settings::Settings;
use crate::domain::models::payment::WebhookEnvelope;
use crate::domain::models::sheet_row::Destination;
use crate::domain::services::event_filter::{EventFilter, FilterDecision, SkipReason};
use crate::domain::services::fanout::FanoutRule;
use crate::domain::services::forwarder::{ForwardOutcome, SheetForwarder};
use crate::domain::services::normalizer::{format_major_units, FieldNormalizer};
use chrono::Utc;
use metrics::counter;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, info_span, Instrument};
use uuid::Uuid;

/// 单次投递的处理结果
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessingReport {
    /// 事件被跳过
    Skipped(SkipReason),
    /// 已转发
    Forwarded {
        primary: ForwardOutcome,
        /// 未命中分发规则或未配置次要表格时为 `None`
        secondary: Option<ForwardOutcome>,
    },
}

/// 支付事件工作器
///
/// 在 HTTP 响应之后以独立任务运行过滤、标准化和转发。
/// 网关只能看到签名校验的结果，下游失败对它不可见。
pub struct PaymentWorker {
    filter: EventFilter,
    normalizer: FieldNormalizer,
    forwarder: Arc<SheetForwarder>,
    primary: Destination,
    secondary: Option<Destination>,
    fanout: FanoutRule,
}

impl PaymentWorker {
    /// 创建新的支付事件工作器
    ///
    /// # 参数
    ///
    /// * `filter` - 事件过滤器
    /// * `normalizer` - 字段标准化器
    /// * `forwarder` - 表格转发器
    /// * `primary` - 主表格
    /// * `secondary` - 次要表格
    /// * `fanout` - 次要表格分发规则
    pub fn new(
        filter: EventFilter,
        normalizer: FieldNormalizer,
        forwarder: Arc<SheetForwarder>,
        primary: Destination,
        secondary: Option<Destination>,
        fanout: FanoutRule,
    ) -> Self {
        Self {
            filter,
            normalizer,
            forwarder,
            primary,
            secondary,
            fanout,
        }
    }

    /// 按配置创建工作器
    pub fn from_settings(settings: &Settings, forwarder: Arc<SheetForwarder>) -> Self {
        Self::new(
            EventFilter::new(settings.webhook.allowed_events.iter().cloned()),
            FieldNormalizer::new(settings.normalizer.clone()),
            forwarder,
            settings.sheets.primary_destination(),
            settings.sheets.secondary_destination(),
            settings.fanout.clone(),
        )
    }

    /// 派发独立任务处理信封
    ///
    /// 立即返回，调用方无需等待。返回的句柄仅供测试等待结果。
    pub fn dispatch(self: &Arc<Self>, envelope: WebhookEnvelope) -> JoinHandle<ProcessingReport> {
        let worker = Arc::clone(self);
        let delivery_id = Uuid::new_v4();
        let span = info_span!("payment_delivery", %delivery_id);
        tokio::spawn(async move { worker.process(envelope).await }.instrument(span))
    }

    /// 处理信封
    pub async fn process(&self, envelope: WebhookEnvelope) -> ProcessingReport {
        let (event_name, payment) = match self.filter.filter(&envelope) {
            FilterDecision::Accept {
                event_name,
                payment,
            } => (event_name, payment),
            FilterDecision::Skip(reason) => {
                info!("Skipping webhook: {}", reason);
                counter!("webhook_events_skipped_total", "reason" => reason.label()).increment(1);
                return ProcessingReport::Skipped(reason);
            }
        };

        info!(
            event = %event_name,
            payment_id = payment.id.as_deref().unwrap_or(""),
            amount = %payment.amount.map(format_major_units).unwrap_or_default(),
            "Processing payment event"
        );

        let now = Utc::now();
        let row = self
            .normalizer
            .normalize_at(&event_name, &payment, &self.primary, now);
        let primary = self.forwarder.forward(&self.primary, &row).await;

        let secondary = match &self.secondary {
            Some(destination) if self.fanout.matches(&payment) => {
                debug!("Fan-out rule matched, forwarding to secondary sheet");
                let row = self
                    .normalizer
                    .normalize_at(&event_name, &payment, destination, now);
                Some(self.forwarder.forward(destination, &row).await)
            }
            _ => None,
        };

        ProcessingReport::Forwarded { primary, secondary }
    }
}
