// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// 表格列定义
///
/// 固定的 18 列结构（A 到 R）。第一个元素为表头文字，
/// 第二个元素为 Apps Script 模式下使用的字段键名。
pub const COLUMNS: [(&str, &str); 18] = [
    ("Payment ID", "payment_id"),
    ("Order ID", "order_id"),
    ("Email", "email"),
    ("Phone", "phone"),
    ("Amount", "amount"),
    ("Currency", "currency"),
    ("Event", "event"),
    ("Status", "status"),
    ("Method", "method"),
    ("Error Code", "error_code"),
    ("Error Description", "error_description"),
    ("Name", "name"),
    ("Notes Phone", "notes_phone"),
    ("Notes Email", "notes_email"),
    ("Custom 1", "custom1"),
    ("Custom 2", "custom2"),
    ("City", "city"),
    ("Timestamp", "timestamp"),
];

/// 最后一列的列字母
pub const LAST_COLUMN: &str = "R";

/// 表头文字
pub fn header_titles() -> Vec<String> {
    COLUMNS.iter().map(|(title, _)| title.to_string()).collect()
}

/// 单元格
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// 纯文本
    Text(String),
    /// 数值
    Number(f64),
    /// 公式，仅在目标表以 `USER_ENTERED` 写入时才会被求值
    Formula(String),
    /// 空单元格
    Empty,
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    /// 文本形式，用于日志和断言
    pub fn as_display(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) | Cell::Formula(s) => write!(f, "{}", s),
            Cell::Number(n) => write!(f, "{}", n),
            Cell::Empty => Ok(()),
        }
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Cell::Text(s) | Cell::Formula(s) => serializer.serialize_str(s),
            Cell::Number(n) => serializer.serialize_f64(*n),
            Cell::Empty => serializer.serialize_str(""),
        }
    }
}

/// 表格行
///
/// 单元格顺序与 [`COLUMNS`] 一一对应。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SheetRow(Vec<Cell>);

impl SheetRow {
    /// 创建新行，列数必须与表结构一致
    pub fn new(cells: Vec<Cell>) -> Self {
        debug_assert_eq!(cells.len(), COLUMNS.len());
        Self(cells)
    }

    pub fn cells(&self) -> &[Cell] {
        &self.0
    }

    /// 按列键名读取单元格
    pub fn get(&self, key: &str) -> Option<&Cell> {
        COLUMNS
            .iter()
            .position(|(_, k)| *k == key)
            .and_then(|idx| self.0.get(idx))
    }

    /// 转为以列键名为键的 JSON 对象（Apps Script 模式）
    pub fn to_record(&self) -> serde_json::Map<String, serde_json::Value> {
        COLUMNS
            .iter()
            .zip(self.0.iter())
            .map(|((_, key), cell)| {
                let value = serde_json::to_value(cell).unwrap_or(serde_json::Value::Null);
                (key.to_string(), value)
            })
            .collect()
    }
}

/// 写入模式
///
/// 对应 Sheets API 的 `valueInputOption`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueInputOption {
    /// 原样写入
    #[default]
    Raw,
    /// 按用户输入解析，公式会被求值
    UserEntered,
}

impl ValueInputOption {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueInputOption::Raw => "RAW",
            ValueInputOption::UserEntered => "USER_ENTERED",
        }
    }

    /// 是否支持公式求值
    pub fn evaluates_formulas(&self) -> bool {
        matches!(self, ValueInputOption::UserEntered)
    }
}

/// 目标表格
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Destination {
    /// 日志中使用的名称 (primary / secondary)
    #[serde(default)]
    pub label: String,
    /// 表格ID
    pub spreadsheet_id: String,
    /// 工作表名称
    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,
    #[serde(default)]
    pub value_input_option: ValueInputOption,
    /// 首次写入前是否检查并写入表头
    #[serde(default = "default_true")]
    pub bootstrap_header: bool,
}

fn default_sheet_name() -> String {
    "Sheet1".to_string()
}

fn default_true() -> bool {
    true
}

impl Destination {
    /// 表头所在范围，例如 `Sheet1!A1:R1`
    pub fn header_range(&self) -> String {
        format!("{}!A1:{}1", self.sheet_name, LAST_COLUMN)
    }

    /// 追加写入的范围，例如 `Sheet1!A:R`
    pub fn append_range(&self) -> String {
        format!("{}!A:{}", self.sheet_name, LAST_COLUMN)
    }

    /// 去重用的键
    pub fn key(&self) -> String {
        format!("{}/{}", self.spreadsheet_id, self.sheet_name)
    }
}
