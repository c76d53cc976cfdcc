// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// 该模块包含系统的核心业务逻辑，包括：
/// - 领域模型（models）：支付事件和表格行
/// - 服务（services）：签名校验、事件过滤、字段标准化、分发规则和表格转发
///
/// 领域层只通过 [`services::sheet_service::SheetService`] 依赖外部表格，
/// 不依赖于任何具体实现。
pub mod models;
pub mod services;
