// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 包含的服务：
/// - 签名服务（signature）：HMAC-SHA256 签名与校验
/// - 事件过滤（event_filter）：按白名单筛选事件
/// - 字段标准化（normalizer）：把支付实体转换为表格行
/// - 分发规则（fanout）：决定是否写入次要表格
/// - 表格服务（sheet_service）：表格后端的抽象接口
/// - 转发器（forwarder）：表头初始化与带重试的追加
pub mod event_filter;
pub mod fanout;
pub mod forwarder;
pub mod normalizer;
pub mod sheet_service;
pub mod signature;
