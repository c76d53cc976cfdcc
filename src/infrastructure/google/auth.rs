// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::CredentialsSettings;
use crate::domain::services::sheet_service::ForwardError;
use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

/// JWT Bearer 授权类型
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// 断言有效期（秒）
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// 令牌在到期前多久刷新
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// 认证错误类型
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("service account credentials not configured")]
    MissingCredentials,
    #[error("invalid service account key: {0}")]
    InvalidKey(String),
    #[error("failed to read key file {path}: {message}")]
    KeyFile { path: String, message: String },
    #[error("token request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("token endpoint returned {status}: {body}")]
    TokenEndpoint { status: u16, body: String },
    #[error("invalid token response: {0}")]
    Decode(String),
}

impl AuthError {
    /// 判断错误是否可重试
    pub fn is_retryable(&self) -> bool {
        match self {
            AuthError::Transport(_) => true,
            AuthError::TokenEndpoint { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

impl From<AuthError> for ForwardError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingCredentials => {
                ForwardError::MissingCredentials(AuthError::MissingCredentials.to_string())
            }
            other => ForwardError::Auth {
                retryable: other.is_retryable(),
                message: other.to_string(),
            },
        }
    }
}

/// 服务账号凭据
#[derive(Clone, Deserialize)]
pub struct ServiceAccountCredentials {
    /// 服务账号邮箱
    pub client_email: String,
    /// PEM 私钥
    pub private_key: String,
    /// 令牌端点，密钥文件中可能携带
    #[serde(default)]
    pub token_uri: Option<String>,
}

impl std::fmt::Debug for ServiceAccountCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountCredentials")
            .field("client_email", &self.client_email)
            .field("private_key", &"[REDACTED]")
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

impl ServiceAccountCredentials {
    /// 从配置加载凭据
    ///
    /// 优先使用内联的邮箱和私钥，其次读取 JSON 密钥文件。
    /// 都没有配置时返回 `Ok(None)`。
    pub fn from_settings(settings: &CredentialsSettings) -> Result<Option<Self>, AuthError> {
        let email = settings.client_email.as_deref().filter(|s| !s.is_empty());
        let key = settings.private_key.as_deref().filter(|s| !s.is_empty());

        if let (Some(email), Some(key)) = (email, key) {
            return Ok(Some(Self {
                client_email: email.to_string(),
                private_key: expand_newlines(key),
                token_uri: None,
            }));
        }

        match settings.key_file.as_deref().filter(|s| !s.is_empty()) {
            Some(path) => Self::from_key_file(path).map(Some),
            None => Ok(None),
        }
    }

    /// 读取 Google 服务账号 JSON 密钥文件
    pub fn from_key_file(path: &str) -> Result<Self, AuthError> {
        let content = std::fs::read_to_string(path).map_err(|e| AuthError::KeyFile {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        let mut creds: Self =
            serde_json::from_str(&content).map_err(|e| AuthError::KeyFile {
                path: path.to_string(),
                message: e.to_string(),
            })?;
        creds.private_key = expand_newlines(&creds.private_key);
        Ok(creds)
    }
}

/// 环境变量中的私钥常用 `\n` 表示换行
fn expand_newlines(key: &str) -> String {
    key.replace("\\n", "\n")
}

/// 访问令牌提供者特质
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    /// 凭据是否已配置
    fn is_configured(&self) -> bool;

    /// 获取有效的访问令牌
    async fn access_token(&self) -> Result<String, AuthError>;
}

/// JWT 断言声明
#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: Instant,
}

impl CachedToken {
    fn is_fresh(&self) -> bool {
        Instant::now() + REFRESH_MARGIN < self.expires_at
    }
}

/// 服务账号令牌提供者
///
/// 进程内共享的令牌句柄，首次使用时获取令牌并缓存，
/// 到期前自动刷新。无需显式释放。
pub struct ServiceAccountTokenProvider {
    client: reqwest::Client,
    credentials: Option<ServiceAccountCredentials>,
    token_uri: String,
    scope: String,
    cache: RwLock<Option<CachedToken>>,
}

impl ServiceAccountTokenProvider {
    /// 创建新的令牌提供者
    ///
    /// # 参数
    ///
    /// * `client` - HTTP 客户端
    /// * `credentials` - 服务账号凭据，为空时所有请求返回 `MissingCredentials`
    /// * `settings` - 凭据配置（令牌端点和授权范围）
    pub fn new(
        client: reqwest::Client,
        credentials: Option<ServiceAccountCredentials>,
        settings: &CredentialsSettings,
    ) -> Self {
        let token_uri = credentials
            .as_ref()
            .and_then(|c| c.token_uri.clone())
            .unwrap_or_else(|| settings.token_uri.clone());

        Self {
            client,
            credentials,
            token_uri,
            scope: settings.scope.clone(),
            cache: RwLock::new(None),
        }
    }

    fn sign_assertion(&self, creds: &ServiceAccountCredentials) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            iss: &creds.client_email,
            scope: &self.scope,
            aud: &self.token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };
        let key = EncodingKey::from_rsa_pem(creds.private_key.as_bytes())
            .map_err(|e| AuthError::InvalidKey(e.to_string()))?;
        encode(&Header::new(Algorithm::RS256), &claims, &key)
            .map_err(|e| AuthError::InvalidKey(e.to_string()))
    }

    async fn fetch_token(&self, creds: &ServiceAccountCredentials) -> Result<CachedToken, AuthError> {
        let assertion = self.sign_assertion(creds)?;

        debug!(token_uri = %self.token_uri, "Requesting access token");
        let response = self
            .client
            .post(&self.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::TokenEndpoint {
                status: status.as_u16(),
                body,
            });
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Decode(e.to_string()))?;

        info!(
            client_email = %creds.client_email,
            expires_in = token.expires_in,
            "Obtained access token"
        );

        Ok(CachedToken {
            token: token.access_token,
            expires_at: Instant::now() + Duration::from_secs(token.expires_in),
        })
    }
}

#[async_trait]
impl AccessTokenProvider for ServiceAccountTokenProvider {
    fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    async fn access_token(&self) -> Result<String, AuthError> {
        let creds = self
            .credentials
            .as_ref()
            .ok_or(AuthError::MissingCredentials)?;

        if let Some(cached) = self.cache.read().await.as_ref().filter(|t| t.is_fresh()) {
            return Ok(cached.token.clone());
        }

        let mut guard = self.cache.write().await;
        // Another task may have refreshed while we waited for the lock
        if let Some(cached) = guard.as_ref().filter(|t| t.is_fresh()) {
            return Ok(cached.token.clone());
        }

        let fresh = self.fetch_token(creds).await?;
        let token = fresh.token.clone();
        *guard = Some(fresh);
        Ok(token)
    }
}

/// 固定令牌提供者
///
/// 对应 `credentials.access_token`，令牌过期后需要重启服务更换。
pub struct StaticTokenProvider(pub String);

#[async_trait]
impl AccessTokenProvider for StaticTokenProvider {
    fn is_configured(&self) -> bool {
        !self.0.is_empty()
    }

    async fn access_token(&self) -> Result<String, AuthError> {
        if self.0.is_empty() {
            return Err(AuthError::MissingCredentials);
        }
        Ok(self.0.clone())
    }
}

/// 按配置选择令牌提供者
///
/// 配置了 `access_token` 时使用固定令牌，否则使用服务账号。
/// 凭据加载失败只记录日志，之后的写入会因缺少凭据而跳过。
pub fn token_provider(
    client: reqwest::Client,
    settings: &CredentialsSettings,
) -> Arc<dyn AccessTokenProvider> {
    if let Some(token) = settings.access_token.as_deref().filter(|t| !t.is_empty()) {
        info!("Using static access token from configuration");
        return Arc::new(StaticTokenProvider(token.to_string()));
    }

    let credentials = match ServiceAccountCredentials::from_settings(settings) {
        Ok(Some(credentials)) => Some(credentials),
        Ok(None) => {
            warn!("No service account credentials configured, rows will be skipped");
            None
        }
        Err(e) => {
            error!("Failed to load service account credentials: {}", e);
            None
        }
    };
    Arc::new(ServiceAccountTokenProvider::new(client, credentials, settings))
}
