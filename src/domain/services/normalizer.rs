// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::payment::PaymentEvent;
use crate::domain::models::sheet_row::{Cell, Destination, SheetRow};
use chrono::{DateTime, FixedOffset, Utc};
use serde::Deserialize;

/// Asia/Kolkata 相对 UTC 的偏移（秒），该时区没有夏令时
const IST_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

/// 时间戳格式（en-IN 顺序，24 小时制）
pub const TIMESTAMP_FORMAT: &str = "%d/%m/%Y, %H:%M:%S";

/// 状态列的取值方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusMode {
    /// 网关原始状态
    Raw,
    /// 由事件名推导的三态：authorized / success / failed
    #[default]
    Simplified,
}

/// 标准化器配置
#[derive(Debug, Clone, Deserialize)]
pub struct NormalizerSettings {
    #[serde(default)]
    pub status_mode: StatusMode,
    /// 支付ID和邮箱是否渲染为超链接公式
    #[serde(default)]
    pub clickable_links: bool,
    /// 后台链接模板，`{id}` 会被替换为支付ID
    #[serde(default = "default_dashboard_url_template")]
    pub dashboard_url_template: String,
}

pub fn default_dashboard_url_template() -> String {
    "https://dashboard.razorpay.com/app/payments/{id}".to_string()
}

impl Default for NormalizerSettings {
    fn default() -> Self {
        Self {
            status_mode: StatusMode::default(),
            clickable_links: false,
            dashboard_url_template: default_dashboard_url_template(),
        }
    }
}

/// 将最小货币单位转换为主单位数值
pub fn to_major_units(minor: i64) -> f64 {
    minor as f64 / 100.0
}

/// 将最小货币单位格式化为两位小数，例如 `10050` -> `"100.50"`
pub fn format_major_units(minor: i64) -> String {
    let sign = if minor < 0 { "-" } else { "" };
    let abs = minor.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

/// 将 Unix 秒转换为 IST 民用时间字符串
///
/// 结果与宿主机时区无关。超出范围的时间戳返回 `None`。
pub fn format_civil_timestamp(epoch_secs: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp(epoch_secs, 0).and_then(format_ist)
}

fn format_ist(instant: DateTime<Utc>) -> Option<String> {
    let ist = FixedOffset::east_opt(IST_OFFSET_SECS)?;
    Some(instant.with_timezone(&ist).format(TIMESTAMP_FORMAT).to_string())
}

/// 由事件名推导简化状态
pub fn simplified_status(event_name: &str) -> Option<&'static str> {
    match event_name {
        "payment.authorized" => Some("authorized"),
        "payment.captured" => Some("success"),
        "payment.failed" => Some("failed"),
        _ => None,
    }
}

/// 构造超链接公式，双引号按表格规则转义
fn hyperlink(url: &str, label: &str) -> String {
    format!(
        "=HYPERLINK(\"{}\",\"{}\")",
        url.replace('"', "\"\""),
        label.replace('"', "\"\"")
    )
}

fn text_or_empty(value: Option<&str>) -> Cell {
    match value {
        Some(v) if !v.is_empty() => Cell::text(v),
        _ => Cell::Empty,
    }
}

/// 字段标准化器
///
/// 将支付实体映射为固定 18 列的表格行。
#[derive(Debug, Clone, Default)]
pub struct FieldNormalizer {
    settings: NormalizerSettings,
}

impl FieldNormalizer {
    pub fn new(settings: NormalizerSettings) -> Self {
        Self { settings }
    }

    /// 标准化支付事件
    ///
    /// 缺少创建时间时使用当前时间。
    pub fn normalize(
        &self,
        event_name: &str,
        payment: &PaymentEvent,
        destination: &Destination,
    ) -> SheetRow {
        self.normalize_at(event_name, payment, destination, Utc::now())
    }

    /// 使用指定的"当前时间"标准化支付事件
    pub fn normalize_at(
        &self,
        event_name: &str,
        payment: &PaymentEvent,
        destination: &Destination,
        now: DateTime<Utc>,
    ) -> SheetRow {
        let notes = &payment.notes;
        let links =
            self.settings.clickable_links && destination.value_input_option.evaluates_formulas();

        let email = payment
            .email
            .as_deref()
            .filter(|e| !e.is_empty())
            .or_else(|| notes.get("email"));
        let phone = payment
            .phone
            .as_deref()
            .filter(|p| !p.is_empty())
            .or_else(|| notes.get("phone"));

        let payment_id_cell = match payment.id.as_deref() {
            Some(id) if links && !id.is_empty() => {
                let url = self.settings.dashboard_url_template.replace("{id}", id);
                Cell::Formula(hyperlink(&url, id))
            }
            other => text_or_empty(other),
        };

        let email_cell = match email {
            Some(e) if links && !e.is_empty() => {
                Cell::Formula(hyperlink(&format!("mailto:{}", e), e))
            }
            other => text_or_empty(other),
        };

        let amount_cell = payment
            .amount
            .map(|a| Cell::Number(to_major_units(a)))
            .unwrap_or(Cell::Empty);

        let timestamp = payment
            .created_at
            .and_then(format_civil_timestamp)
            .or_else(|| format_ist(now))
            .unwrap_or_default();

        SheetRow::new(vec![
            payment_id_cell,
            text_or_empty(payment.order_id.as_deref()),
            email_cell,
            text_or_empty(phone),
            amount_cell,
            text_or_empty(payment.currency.as_deref()),
            Cell::text(event_name),
            text_or_empty(self.status(event_name, payment).as_deref()),
            text_or_empty(payment.method.as_deref()),
            text_or_empty(payment.error_code.as_deref()),
            text_or_empty(payment.error_description.as_deref()),
            Cell::text(notes.get_or_empty("name")),
            Cell::text(notes.get_or_empty("phone")),
            Cell::text(notes.get_or_empty("email")),
            Cell::text(notes.get_or_empty("custom1")),
            Cell::text(notes.get_or_empty("custom2")),
            Cell::text(notes.get_or_empty("city")),
            Cell::Text(timestamp),
        ])
    }

    fn status(&self, event_name: &str, payment: &PaymentEvent) -> Option<String> {
        match self.settings.status_mode {
            StatusMode::Raw => payment.status.clone(),
            StatusMode::Simplified => simplified_status(event_name)
                .map(str::to_string)
                .or_else(|| payment.status.clone()),
        }
    }
}
