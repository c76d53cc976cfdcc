// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::payment::{PaymentEvent, WebhookEnvelope};
use std::collections::HashSet;
use std::fmt;

/// 默认允许的事件
pub const DEFAULT_ALLOWED_EVENTS: [&str; 5] = [
    "payment.created",
    "payment.authorized",
    "payment.captured",
    "payment.failed",
    "payment.refunded",
];

/// 跳过原因
///
/// 跳过不是错误，只记录日志。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// 请求体不是合法 JSON
    MalformedBody(String),
    /// 缺少 `event` 字段
    MissingEvent,
    /// 事件不在允许列表中
    EventNotAllowed(String),
    /// 缺少 `payload.payment.entity`
    MissingEntity,
    /// 实体字段类型不符
    InvalidEntity(String),
}

impl SkipReason {
    /// 指标标签
    pub fn label(&self) -> &'static str {
        match self {
            SkipReason::MalformedBody(_) => "malformed_body",
            SkipReason::MissingEvent => "missing_event",
            SkipReason::EventNotAllowed(_) => "event_not_allowed",
            SkipReason::MissingEntity => "missing_entity",
            SkipReason::InvalidEntity(_) => "invalid_entity",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MalformedBody(e) => write!(f, "malformed body: {}", e),
            SkipReason::MissingEvent => write!(f, "event name missing"),
            SkipReason::EventNotAllowed(name) => write!(f, "event {} not in allow-list", name),
            SkipReason::MissingEntity => write!(f, "payload.payment.entity missing"),
            SkipReason::InvalidEntity(e) => write!(f, "payment entity invalid: {}", e),
        }
    }
}

/// 过滤结果
#[derive(Debug, Clone, PartialEq)]
pub enum FilterDecision {
    /// 接受，携带事件名和支付实体
    Accept {
        event_name: String,
        payment: PaymentEvent,
    },
    /// 跳过
    Skip(SkipReason),
}

/// 事件过滤器
#[derive(Debug, Clone)]
pub struct EventFilter {
    allowed: HashSet<String>,
}

impl Default for EventFilter {
    fn default() -> Self {
        Self::new(DEFAULT_ALLOWED_EVENTS.iter().map(|s| s.to_string()))
    }
}

impl EventFilter {
    /// 创建新的事件过滤器
    ///
    /// # 参数
    ///
    /// * `allowed` - 允许的事件名称
    pub fn new<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_allowed(&self, event_name: &str) -> bool {
        self.allowed.contains(event_name)
    }

    /// 过滤信封
    ///
    /// 依次检查请求体、事件名、允许列表和支付实体。
    pub fn filter(&self, envelope: &WebhookEnvelope) -> FilterDecision {
        let parsed = match envelope.parse() {
            Ok(parsed) => parsed,
            Err(e) => return FilterDecision::Skip(SkipReason::MalformedBody(e.to_string())),
        };

        let Some(event_name) = parsed.event.clone() else {
            return FilterDecision::Skip(SkipReason::MissingEvent);
        };

        if !self.is_allowed(&event_name) {
            return FilterDecision::Skip(SkipReason::EventNotAllowed(event_name));
        }

        let Some(entity) = parsed.payment_entity() else {
            return FilterDecision::Skip(SkipReason::MissingEntity);
        };

        match PaymentEvent::from_entity(entity) {
            Ok(payment) => FilterDecision::Accept {
                event_name,
                payment,
            },
            Err(e) => FilterDecision::Skip(SkipReason::InvalidEntity(e.to_string())),
        }
    }
}
