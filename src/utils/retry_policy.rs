// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::Deserialize;
use std::time::Duration;

/// 重试策略配置
///
/// 默认对表格写入做固定间隔重试：最多 3 次尝试，每次间隔 1 秒。
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// 最大尝试次数（包含第一次）
    pub max_attempts: u32,
    /// 初始退避时间
    pub initial_backoff: Duration,
    /// 最大退避时间
    pub max_backoff: Duration,
    /// 退避乘数
    pub backoff_multiplier: f64,
    /// 是否启用指数退避
    pub exponential_backoff: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fixed(3, Duration::from_secs(1))
    }
}

/// 重试配置（来自配置文件）
#[derive(Debug, Clone, Deserialize)]
pub struct RetrySettings {
    /// 最大尝试次数
    pub max_attempts: u32,
    /// 两次尝试之间的间隔（毫秒）
    pub delay_ms: u64,
    /// 设置后改为指数退避，间隔从 `delay_ms` 翻倍直到该上限
    #[serde(default)]
    pub max_delay_ms: Option<u64>,
}

impl From<&RetrySettings> for RetryPolicy {
    fn from(settings: &RetrySettings) -> Self {
        let attempts = settings.max_attempts.max(1);
        let delay = Duration::from_millis(settings.delay_ms);
        match settings.max_delay_ms {
            Some(max) => Self::exponential(attempts, delay, Duration::from_millis(max)),
            None => Self::fixed(attempts, delay),
        }
    }
}

impl RetryPolicy {
    /// 创建固定间隔重试策略
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_backoff: delay,
            max_backoff: delay,
            backoff_multiplier: 1.0,
            exponential_backoff: false,
        }
    }

    /// 创建指数退避重试策略
    pub fn exponential(max_attempts: u32, initial: Duration, max: Duration) -> Self {
        Self {
            max_attempts,
            initial_backoff: initial,
            max_backoff: max,
            backoff_multiplier: 2.0,
            exponential_backoff: true,
        }
    }

    /// 计算第 `attempt` 次失败后的等待时间
    pub fn calculate_backoff(&self, attempt: u32) -> Duration {
        if !self.exponential_backoff {
            return self.initial_backoff;
        }

        // 计算指数退避
        let backoff_secs = self.initial_backoff.as_secs_f64()
            * self.backoff_multiplier.powi(attempt.saturating_sub(1) as i32);

        // 限制最大退避时间
        Duration::from_secs_f64(backoff_secs.min(self.max_backoff.as_secs_f64()))
    }

    /// 第 `attempt` 次尝试失败后是否还应该重试
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}
