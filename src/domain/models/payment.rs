// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::body::Bytes;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;

/// Webhook请求信封
///
/// 保存网关推送的原始字节和签名头。签名必须基于原始字节校验，
/// 因此信封从不重新序列化请求体。
#[derive(Debug, Clone)]
pub struct WebhookEnvelope {
    /// 原始请求体
    body: Bytes,
    /// `x-razorpay-signature` 头的值
    signature: Option<String>,
}

impl WebhookEnvelope {
    /// 创建新的信封
    pub fn new(body: Bytes, signature: Option<String>) -> Self {
        Self { body, signature }
    }

    /// 原始请求体字节
    pub fn raw_body(&self) -> &[u8] {
        &self.body
    }

    /// 请求头中的签名
    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }

    /// 将请求体解析为网关事件结构
    pub fn parse(&self) -> Result<GatewayEvent, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// 网关事件
///
/// 对应 `{ event, payload: { payment: { entity } } }` 结构，
/// 每一层都允许缺失。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GatewayEvent {
    /// 事件名称，例如 `payment.captured`
    #[serde(default)]
    pub event: Option<String>,
    /// 事件负载
    #[serde(default)]
    pub payload: Option<GatewayPayload>,
}

/// 事件负载
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GatewayPayload {
    #[serde(default)]
    pub payment: Option<PaymentWrapper>,
}

/// 支付实体外层
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentWrapper {
    /// 实体保持为原始 JSON，由 [`PaymentEvent::from_entity`] 做宽松转换
    #[serde(default)]
    pub entity: Option<Value>,
}

impl GatewayEvent {
    /// 取出 `payload.payment.entity`，仅当其为 JSON 对象时返回
    pub fn payment_entity(&self) -> Option<&Value> {
        self.payload
            .as_ref()
            .and_then(|p| p.payment.as_ref())
            .and_then(|p| p.entity.as_ref())
            .filter(|e| e.is_object())
    }
}

/// 标准化后的支付事件
///
/// 所有字段都是可选的，缺省值策略由字段标准化器决定。
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PaymentEvent {
    /// 支付ID (`pay_...`)
    #[serde(default)]
    pub id: Option<String>,
    /// 订单ID (`order_...`)
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// 网关字段名为 `contact`
    #[serde(default, rename = "contact")]
    pub phone: Option<String>,
    /// 金额，最小货币单位（派萨）
    #[serde(default)]
    pub amount: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    /// 支付方式 (card, upi, netbanking...)
    #[serde(default)]
    pub method: Option<String>,
    /// 网关原始状态
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub notes: Notes,
    /// 创建时间（Unix 秒）
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
}

impl PaymentEvent {
    /// 从原始实体 JSON 转换
    ///
    /// 类型不符的字段会导致整体失败，由调用方决定是否跳过。
    pub fn from_entity(entity: &Value) -> Result<Self, serde_json::Error> {
        PaymentEvent::deserialize(entity)
    }
}

/// 支付备注
///
/// 网关在没有备注时发送空数组 `[]`，有备注时发送对象。
/// 非字符串的值保留其 JSON 文本形式。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Notes(BTreeMap<String, String>);

impl Notes {
    /// 读取备注字段，缺失时返回空字符串
    pub fn get_or_empty(&self, key: &str) -> &str {
        self.0.get(key).map(String::as_str).unwrap_or("")
    }

    /// 读取备注字段
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Notes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Notes(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<'de> Deserialize<'de> for Notes {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        let notes = match value {
            Value::Object(map) => map
                .into_iter()
                .filter_map(|(k, v)| match v {
                    Value::Null => None,
                    Value::String(s) => Some((k, s)),
                    other => Some((k, other.to_string())),
                })
                .collect(),
            // `[]` and null both mean "no notes"
            _ => BTreeMap::new(),
        };
        Ok(Notes(notes))
    }
}
