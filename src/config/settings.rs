// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::domain::models::sheet_row::Destination;
use crate::domain::services::event_filter::DEFAULT_ALLOWED_EVENTS;
use crate::domain::services::fanout::FanoutRule;
use crate::domain::services::normalizer::NormalizerSettings;
use crate::utils::retry_policy::RetrySettings;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// 已被内置端点占用的路径
const RESERVED_PATHS: [&str; 2] = ["/health", "/version"];

/// 应用程序配置设置
///
/// 包含服务器、Webhook、字段标准化、表格目标、分发规则、凭据、重试和指标等配置项
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 服务器配置
    pub server: ServerSettings,
    /// Webhook 配置
    pub webhook: WebhookSettings,
    /// 字段标准化配置
    #[serde(default)]
    pub normalizer: NormalizerSettings,
    /// 表格配置
    pub sheets: SheetsSettings,
    /// 次要表格分发规则
    #[serde(default)]
    pub fanout: FanoutRule,
    /// 服务账号凭据
    pub credentials: CredentialsSettings,
    /// 重试配置
    pub retry: RetrySettings,
    /// 指标配置
    pub metrics: MetricsSettings,
}

/// 服务器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// 服务器监听主机地址
    pub host: String,
    /// 服务器监听端口
    pub port: u16,
}

/// Webhook配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookSettings {
    /// Webhook签名密钥
    pub secret: String,
    /// 路由路径
    pub path: String,
    /// 允许处理的事件
    pub allowed_events: Vec<String>,
}

/// 表格写入后端
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SheetsBackend {
    /// Google Sheets v4 REST API
    Api,
    /// Apps Script Web 应用
    AppsScript,
}

/// 表格配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct SheetsSettings {
    /// 写入后端
    pub backend: SheetsBackend,
    /// Sheets API 根地址
    pub api_base_url: String,
    /// Apps Script Web 应用地址 (当 backend=apps_script 时使用)
    pub apps_script_url: Option<String>,
    /// 请求超时（秒）
    pub request_timeout_secs: u64,
    /// 主表格
    pub primary: Destination,
    /// 次要表格
    pub secondary: Option<Destination>,
}

impl SheetsSettings {
    /// 主表格，带日志名称
    pub fn primary_destination(&self) -> Destination {
        labeled(&self.primary, "primary")
    }

    /// 次要表格，带日志名称
    pub fn secondary_destination(&self) -> Option<Destination> {
        self.secondary
            .as_ref()
            .filter(|d| !d.spreadsheet_id.is_empty())
            .map(|d| labeled(d, "secondary"))
    }
}

fn labeled(destination: &Destination, label: &str) -> Destination {
    let mut destination = destination.clone();
    if destination.label.is_empty() {
        destination.label = label.to_string();
    }
    destination
}

/// 服务账号凭据配置
///
/// 可以直接提供邮箱和私钥，也可以指向 JSON 密钥文件。
#[derive(Clone, Deserialize)]
pub struct CredentialsSettings {
    /// 服务账号邮箱
    pub client_email: Option<String>,
    /// PEM 私钥，允许使用 `\n` 转义换行
    pub private_key: Option<String>,
    /// JSON 密钥文件路径
    pub key_file: Option<String>,
    /// 预先获取的访问令牌，设置后不再使用服务账号换取令牌
    ///
    /// 本地开发时可用 `gcloud auth print-access-token` 获取。
    pub access_token: Option<String>,
    /// OAuth 令牌端点
    pub token_uri: String,
    /// 授权范围
    pub scope: String,
}

impl std::fmt::Debug for CredentialsSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsSettings")
            .field("client_email", &self.client_email)
            .field(
                "private_key",
                &self.private_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("key_file", &self.key_file)
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("token_uri", &self.token_uri)
            .field("scope", &self.scope)
            .finish()
    }
}

/// 指标配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsSettings {
    /// 是否启动 Prometheus 导出器
    pub enabled: bool,
    /// 导出器监听地址
    pub listen_addr: String,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 从默认值、配置文件和环境变量加载配置
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let settings: Self = Self::builder()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("PAYSHEET")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("webhook.allowed_events"),
            )
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// 校验无法由类型表达的约束
    ///
    /// Webhook 路径必须以 `/` 开头，不能包含路由参数或通配符，
    /// 也不能与 `/health`、`/version` 冲突。
    pub fn validate(&self) -> Result<(), ConfigError> {
        let path = self.webhook.path.as_str();
        if !path.starts_with('/') {
            return Err(ConfigError::Message(format!(
                "webhook.path must start with '/': {:?}",
                path
            )));
        }
        if path
            .split('/')
            .any(|segment| segment.starts_with(':') || segment.starts_with('*'))
            || path.contains(|c: char| c == '{' || c == '}')
        {
            return Err(ConfigError::Message(format!(
                "webhook.path must be a literal path: {:?}",
                path
            )));
        }
        if RESERVED_PATHS.contains(&path) {
            return Err(ConfigError::Message(format!(
                "webhook.path collides with a built-in route: {:?}",
                path
            )));
        }
        Ok(())
    }

    /// 只包含默认值的配置构建器
    ///
    /// 测试可以在此基础上追加覆盖项
    pub fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError>
    {
        Config::builder()
            // Start with default settings
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            // Default Webhook settings
            .set_default("webhook.secret", "")?
            .set_default("webhook.path", "/webhook")?
            .set_default(
                "webhook.allowed_events",
                DEFAULT_ALLOWED_EVENTS
                    .iter()
                    .map(|s| s.to_string())
                    .collect::<Vec<_>>(),
            )?
            // Default Sheets settings
            .set_default("sheets.backend", "api")?
            .set_default("sheets.api_base_url", "https://sheets.googleapis.com")?
            .set_default("sheets.request_timeout_secs", 30)?
            .set_default("sheets.primary.spreadsheet_id", "")?
            .set_default("sheets.primary.sheet_name", "Sheet1")?
            .set_default("sheets.primary.value_input_option", "RAW")?
            .set_default("sheets.primary.bootstrap_header", true)?
            // Default Credentials settings
            .set_default("credentials.token_uri", "https://oauth2.googleapis.com/token")?
            .set_default(
                "credentials.scope",
                "https://www.googleapis.com/auth/spreadsheets",
            )?
            // Default Retry settings
            .set_default("retry.max_attempts", 3)?
            .set_default("retry.delay_ms", 1000)?
            // Default Metrics settings
            .set_default("metrics.enabled", false)?
            .set_default("metrics.listen_addr", "0.0.0.0:9000")
    }
}
