// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// 计算请求体的签名
///
/// 返回 HMAC-SHA256 的小写十六进制编码。
///
/// # 参数
///
/// * `body` - 原始请求体字节
/// * `secret` - 共享密钥
pub fn sign(body: &[u8], secret: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

/// 校验 Webhook 签名
///
/// 缺少签名或密钥为空时一律拒绝。比较使用常量时间。
///
/// # 参数
///
/// * `body` - 原始请求体字节，不能是重新序列化后的 JSON
/// * `secret` - 共享密钥
/// * `received` - 请求头中的签名
///
/// # 返回值
///
/// 签名匹配时返回 `true`
pub fn verify(body: &[u8], secret: &str, received: Option<&str>) -> bool {
    let Some(received) = received.map(str::trim) else {
        return false;
    };
    if secret.is_empty() || received.is_empty() {
        return false;
    }

    let expected = sign(body, secret);
    let expected_bytes = expected.as_bytes();
    let provided_bytes = received.as_bytes();

    // Length is not secret
    if expected_bytes.len() != provided_bytes.len() {
        return false;
    }

    expected_bytes.ct_eq(provided_bytes).into()
}

/// 签名校验器
///
/// 持有共享密钥，供 HTTP 层调用。
#[derive(Clone)]
pub struct SignatureVerifier {
    secret: String,
}

impl SignatureVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    pub fn verify(&self, body: &[u8], received: Option<&str>) -> bool {
        verify(body, &self.secret, received)
    }
}

impl std::fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("secret", &"[REDACTED]")
            .finish()
    }
}
