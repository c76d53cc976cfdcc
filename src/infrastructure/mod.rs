// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施层模块
///
/// 包含的子模块：
/// - Google（google）：服务账号认证与 Sheets v4 客户端
/// - Apps Script（apps_script）：通过部署的 Web 应用写入表格
/// - 指标（metrics）：Prometheus 指标导出
///
/// 基础设施层依赖于领域层的抽象接口，
/// 领域层不受具体后端的影响。
pub mod apps_script;
pub mod google;
pub mod metrics;
