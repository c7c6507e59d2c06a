use serde::Serialize;

use crate::error::AppError;
use crate::key_sets::ProviderKeyData;
use crate::provider::ProviderId;
use crate::services::KeySetService;
use crate::settings::ProviderToggles;
use crate::store::SwitcherState;

/// 将密钥脱敏显示（显示前8位 + ...；不超过8位的密钥整体隐藏）
pub fn mask_key(key: &str) -> String {
    if key.is_empty() {
        String::new()
    } else if key.chars().count() > 8 {
        let prefix: String = key.chars().take(8).collect();
        format!("{prefix}...")
    } else {
        "***".to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetRow {
    pub index: usize,
    pub name: String,
    pub key_count: usize,
    pub active: bool,
}

/// 供应商信息面板：每次变更后从状态重建，只读
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderView {
    pub provider: ProviderId,
    pub name: &'static str,
    pub is_current: bool,
    pub toggles: ProviderToggles,
    pub active_set_index: Option<usize>,
    pub active_set_name: Option<String>,
    /// 已脱敏，未设置时为空串
    pub active_key: String,
    /// 当前密钥是否属于激活组
    pub active_key_in_set: bool,
    pub sets: Vec<SetRow>,
}

impl ProviderView {
    pub fn build(state: &SwitcherState, provider: ProviderId) -> Result<Self, AppError> {
        let settings = state.settings()?;
        let data = KeySetService::load(state, provider)?;
        let active_key = KeySetService::active_key(state, provider)?;
        Ok(Self::from_parts(
            provider,
            settings.current_provider == Some(provider),
            settings.toggles(provider),
            &data,
            &active_key,
        ))
    }

    pub fn from_parts(
        provider: ProviderId,
        is_current: bool,
        toggles: ProviderToggles,
        data: &ProviderKeyData,
        active_key: &str,
    ) -> Self {
        let active_index = data.active_index();
        let sets = data
            .sets
            .iter()
            .enumerate()
            .map(|(index, set)| SetRow {
                index,
                name: set.name.clone(),
                key_count: set.key_list().len(),
                active: active_index == Some(index),
            })
            .collect();

        Self {
            provider,
            name: provider.display_name(),
            is_current,
            toggles,
            active_set_index: active_index,
            active_set_name: data.active_set().map(|s| s.name.clone()),
            active_key: mask_key(active_key),
            active_key_in_set: !active_key.is_empty()
                && data.active_keys().iter().any(|k| k == active_key),
            sets,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key_sets::KeySet;

    #[test]
    fn mask_key_hides_short_keys() {
        assert_eq!(mask_key("sk-1234"), "***");
        assert_eq!(mask_key("12345678"), "***");
        assert_eq!(mask_key("sk-or-v1-abcdef"), "sk-or-v1...");
        assert_eq!(mask_key(""), "");
    }

    #[test]
    fn view_marks_active_set_and_divergent_key() {
        let data = ProviderKeyData {
            active_set_index: 1,
            sets: vec![KeySet::new("A", "k1;k2"), KeySet::new("B", "k3")],
        };
        let view = ProviderView::from_parts(
            ProviderId::OpenAi,
            true,
            ProviderToggles::default(),
            &data,
            "k1",
        );
        assert_eq!(view.active_set_index, Some(1));
        assert_eq!(view.active_set_name.as_deref(), Some("B"));
        assert!(!view.active_key_in_set);
        assert_eq!(view.sets[0].key_count, 2);
        assert!(view.sets[1].active);
        assert!(!view.sets[0].active);
    }
}
