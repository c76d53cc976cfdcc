// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::payment::PaymentEvent;
use serde::Deserialize;

/// 分发规则
///
/// 决定一条支付记录是否额外写入次要表格。
/// 金额必须等于 `amount_minor`；配置了 `page_id` 时，
/// 备注中 `page_id_note_key` 对应的值也必须与之相等。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FanoutRule {
    /// 触发金额（最小货币单位）
    #[serde(default = "default_amount_minor")]
    pub amount_minor: i64,
    /// 支付页面ID，为空时只按金额判断
    #[serde(default)]
    pub page_id: Option<String>,
    /// 备注中存放支付页面ID的键
    #[serde(default = "default_page_id_note_key")]
    pub page_id_note_key: String,
}

fn default_amount_minor() -> i64 {
    9900
}

fn default_page_id_note_key() -> String {
    "payment_page_id".to_string()
}

impl Default for FanoutRule {
    fn default() -> Self {
        Self {
            amount_minor: default_amount_minor(),
            page_id: None,
            page_id_note_key: default_page_id_note_key(),
        }
    }
}

impl FanoutRule {
    /// 判断支付事件是否命中规则
    pub fn matches(&self, payment: &PaymentEvent) -> bool {
        if payment.amount != Some(self.amount_minor) {
            return false;
        }

        match self.page_id.as_deref().filter(|p| !p.is_empty()) {
            Some(expected) => payment.notes.get(&self.page_id_note_key) == Some(expected),
            None => true,
        }
    }
}
