use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// 支持密钥轮换的供应商
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    #[value(name = "openrouter")]
    OpenRouter,
    #[value(name = "anthropic", alias = "claude")]
    Anthropic,
    #[value(name = "openai")]
    OpenAi,
    #[value(name = "gemini", alias = "google")]
    Gemini,
    #[value(name = "deepseek")]
    DeepSeek,
    #[value(name = "xai")]
    Xai,
}

pub const ALL_PROVIDERS: [ProviderId; 6] = [
    ProviderId::OpenRouter,
    ProviderId::Anthropic,
    ProviderId::OpenAi,
    ProviderId::Gemini,
    ProviderId::DeepSeek,
    ProviderId::Xai,
];

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenRouter => "openrouter",
            ProviderId::Anthropic => "anthropic",
            ProviderId::OpenAi => "openai",
            ProviderId::Gemini => "gemini",
            ProviderId::DeepSeek => "deepseek",
            ProviderId::Xai => "xai",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderId::OpenRouter => "OpenRouter",
            ProviderId::Anthropic => "Anthropic (Claude)",
            ProviderId::OpenAi => "OpenAI",
            ProviderId::Gemini => "Google AI Studio (Gemini)",
            ProviderId::DeepSeek => "DeepSeek",
            ProviderId::Xai => "Xai (Grok)",
        }
    }

    /// chat completion source 标识
    pub fn source_id(&self) -> &'static str {
        match self {
            ProviderId::OpenRouter => "openrouter",
            ProviderId::Anthropic => "claude",
            ProviderId::OpenAi => "openai",
            ProviderId::Gemini => "google",
            ProviderId::DeepSeek => "deepseek",
            ProviderId::Xai => "xai",
        }
    }

    /// 当前生效密钥在密钥存储中的名称
    pub fn secret_key(&self) -> &'static str {
        match self {
            ProviderId::OpenRouter => "api_key_openrouter",
            ProviderId::Anthropic => "api_key_claude",
            ProviderId::OpenAi => "api_key_openai",
            ProviderId::Gemini => "api_key_makersuite",
            ProviderId::DeepSeek => "api_key_deepseek",
            ProviderId::Xai => "api_key_xai",
        }
    }

    /// 密钥组数据（JSON）在密钥存储中的名称
    pub fn data_secret_key(&self) -> String {
        format!("{}_key_sets_data", self.secret_key())
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        ALL_PROVIDERS
            .iter()
            .copied()
            .find(|p| p.as_str() == needle || p.source_id() == needle)
            .ok_or_else(|| AppError::InvalidInput(format!("Unknown provider '{s}'")))
    }
}
