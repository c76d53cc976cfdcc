// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// - 支付事件（payment）：Webhook 信封与支付实体
/// - 表格行（sheet_row）：列定义、单元格和目标表格
pub mod payment;
pub mod sheet_row;
