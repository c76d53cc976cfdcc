// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 领域模块
///
/// 包含支付事件模型、签名校验、过滤、标准化和转发逻辑
pub mod domain;

/// 基础设施模块
///
/// 提供外部服务集成，如 Google Sheets、Apps Script 和指标导出
pub mod infrastructure;

/// 表示层模块
///
/// 处理HTTP请求和响应，包括路由、处理器和提取器
pub mod presentation;

/// 工具模块
///
/// 提供通用的工具函数和辅助功能
pub mod utils;

/// 工作器模块
///
/// 在应答之后处理支付事件的后台任务
pub mod workers;
