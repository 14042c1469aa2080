//! Credential Guard - 访问令牌校验
//!
//! 令牌为空或仍是文档中的占位符时，整个运行立即终止。

use thiserror::Error;

/// 文档中给出的占位符，用户必须替换成真实令牌
pub const CREDENTIAL_PLACEHOLDER: &str = "YOUR_HUGGING_FACE_API_TOKEN";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialError {
    #[error("API credential is empty")]
    Missing,

    #[error("API credential is still the placeholder value")]
    Placeholder,
}

impl CredentialError {
    /// 面向用户的提示信息
    pub fn instruction(&self) -> String {
        format!(
            "Please replace '{}' with your actual token.",
            CREDENTIAL_PLACEHOLDER
        )
    }
}

/// 已通过校验的 Bearer 令牌
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// 校验令牌
    ///
    /// 首尾空白会被去掉；空字符串和占位符都会被拒绝。
    pub fn guard(raw: &str) -> Result<Self, CredentialError> {
        let token = raw.trim();
        if token.is_empty() {
            return Err(CredentialError::Missing);
        }
        if token == CREDENTIAL_PLACEHOLDER {
            return Err(CredentialError::Placeholder);
        }
        Ok(Self(token.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 日志里使用的脱敏形式
    pub fn redacted(&self) -> String {
        redact(&self.0)
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Credential").field(&self.redacted()).finish()
    }
}

/// 只保留前 4 个字符
pub fn redact(token: &str) -> String {
    let visible: String = token.chars().take(4).collect();
    if token.chars().count() <= 4 {
        "****".to_string()
    } else {
        format!("{}****", visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_rejects_empty() {
        assert_eq!(Credential::guard(""), Err(CredentialError::Missing));
        assert_eq!(Credential::guard("   "), Err(CredentialError::Missing));
    }

    #[test]
    fn test_guard_rejects_placeholder() {
        assert_eq!(
            Credential::guard(CREDENTIAL_PLACEHOLDER),
            Err(CredentialError::Placeholder)
        );
        assert_eq!(
            Credential::guard(" YOUR_HUGGING_FACE_API_TOKEN\n"),
            Err(CredentialError::Placeholder)
        );
    }

    #[test]
    fn test_guard_accepts_real_token() {
        let credential = Credential::guard(" hf_abcdef123 ").unwrap();
        assert_eq!(credential.as_str(), "hf_abcdef123");
    }

    #[test]
    fn test_instruction_names_placeholder() {
        let message = CredentialError::Placeholder.instruction();
        assert_eq!(
            message,
            "Please replace 'YOUR_HUGGING_FACE_API_TOKEN' with your actual token."
        );
    }

    #[test]
    fn test_debug_is_redacted() {
        let credential = Credential::guard("hf_secretvalue").unwrap();
        let debug = format!("{:?}", credential);
        assert!(!debug.contains("secretvalue"));
        assert!(debug.contains("hf_s****"));
        assert_eq!(redact("abc"), "****");
    }
}
