use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{resolve_override_path, write_json_file};
use crate::error::AppError;
use crate::provider::ProviderId;

/// 单个供应商的开关
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderToggles {
    /// 出错时是否自动轮换 / 移除密钥
    #[serde(default)]
    pub key_switching: bool,
    /// 出错时是否展示错误详情
    #[serde(default = "default_show_error_details")]
    pub show_error_details: bool,
}

fn default_show_error_details() -> bool {
    true
}

impl Default for ProviderToggles {
    fn default() -> Self {
        Self {
            key_switching: false,
            show_error_details: true,
        }
    }
}

/// 会话级设置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitcherSettings {
    /// 当前正在发起请求的供应商
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_provider: Option<ProviderId>,
    /// 自定义密钥文件路径
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secrets_file: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub providers: BTreeMap<ProviderId, ProviderToggles>,
}

impl SwitcherSettings {
    fn normalize_paths(&mut self) {
        self.secrets_file = self
            .secrets_file
            .as_ref()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string());
    }

    pub fn load(path: &Path) -> Self {
        if let Ok(content) = fs::read_to_string(path) {
            match serde_json::from_str::<SwitcherSettings>(&content) {
                Ok(mut settings) => {
                    settings.normalize_paths();
                    settings
                }
                Err(err) => {
                    log::warn!(
                        "解析设置文件失败，将使用默认设置。路径: {}, 错误: {}",
                        path.display(),
                        err
                    );
                    Self::default()
                }
            }
        } else {
            Self::default()
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), AppError> {
        let mut normalized = self.clone();
        normalized.normalize_paths();
        write_json_file(path, &normalized)
    }

    pub fn toggles(&self, provider: ProviderId) -> ProviderToggles {
        self.providers.get(&provider).copied().unwrap_or_default()
    }

    pub fn key_switching_enabled(&self, provider: ProviderId) -> bool {
        self.toggles(provider).key_switching
    }

    pub fn show_error_details(&self, provider: ProviderId) -> bool {
        self.toggles(provider).show_error_details
    }

    pub fn set_key_switching(&mut self, provider: ProviderId, enabled: bool) {
        self.providers.entry(provider).or_default().key_switching = enabled;
    }

    pub fn set_show_error_details(&mut self, provider: ProviderId, enabled: bool) {
        self.providers.entry(provider).or_default().show_error_details = enabled;
    }

    pub fn secrets_path(&self, config_dir: &Path) -> PathBuf {
        self.secrets_file
            .as_deref()
            .map(resolve_override_path)
            .unwrap_or_else(|| crate::config::get_default_secrets_path(config_dir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_disable_switching_and_show_errors() {
        let settings = SwitcherSettings::default();
        assert!(!settings.key_switching_enabled(ProviderId::OpenAi));
        assert!(settings.show_error_details(ProviderId::OpenAi));
    }

    #[test]
    fn missing_or_broken_file_falls_back_to_defaults() {
        let dir = TempDir::new().expect("create temp dir");
        let path = dir.path().join("settings.json");
        assert_eq!(SwitcherSettings::load(&path), SwitcherSettings::default());

        fs::write(&path, "{ oops").expect("seed broken settings");
        assert_eq!(SwitcherSettings::load(&path), SwitcherSettings::default());
    }

    #[test]
    fn save_and_load_round_trip_with_normalized_paths() {
        let dir = TempDir::new().expect("create temp dir");
        let path = dir.path().join("settings.json");

        let mut settings = SwitcherSettings {
            current_provider: Some(ProviderId::Anthropic),
            secrets_file: Some("   ".into()),
            ..Default::default()
        };
        settings.set_key_switching(ProviderId::Anthropic, true);
        settings.set_show_error_details(ProviderId::Xai, false);
        settings.save(&path).expect("save settings");

        let loaded = SwitcherSettings::load(&path);
        assert_eq!(loaded.current_provider, Some(ProviderId::Anthropic));
        assert_eq!(loaded.secrets_file, None);
        assert!(loaded.key_switching_enabled(ProviderId::Anthropic));
        assert!(!loaded.show_error_details(ProviderId::Xai));
        assert!(loaded.show_error_details(ProviderId::Anthropic));
    }

    #[test]
    fn partial_toggle_entries_use_field_defaults() {
        let parsed: SwitcherSettings =
            serde_json::from_str(r#"{"providers":{"openai":{"keySwitching":true}}}"#).unwrap();
        let toggles = parsed.toggles(ProviderId::OpenAi);
        assert!(toggles.key_switching);
        assert!(toggles.show_error_details);
    }
}
