use crate::engine::{plan_rotation, RotationPlan, RotationReason};
use crate::error::AppError;
use crate::provider::ProviderId;
use crate::store::SwitcherState;

use super::{read_snapshot, write_active_key};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationTrigger {
    Manual,
    Error,
    SelfHeal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RotationOutcome {
    /// 该供应商未启用密钥切换
    Disabled,
    /// 激活组索引无效，未做任何修改
    NoActiveSet,
    Unchanged {
        key: String,
    },
    Rotated {
        previous: String,
        key: String,
        reason: RotationReason,
    },
}

impl RotationOutcome {
    /// 操作完成后的当前密钥（未知时为 `None`）
    pub fn active_key(&self) -> Option<&str> {
        match self {
            RotationOutcome::Unchanged { key } | RotationOutcome::Rotated { key, .. } => {
                Some(key.as_str())
            }
            RotationOutcome::Disabled | RotationOutcome::NoActiveSet => None,
        }
    }
}

/// 在激活组内轮换当前密钥
pub struct RotationService;

impl RotationService {
    pub fn rotate(
        state: &SwitcherState,
        provider: ProviderId,
        trigger: RotationTrigger,
    ) -> Result<RotationOutcome, AppError> {
        if !state.settings()?.key_switching_enabled(provider) {
            log::debug!("{} 未启用密钥切换，跳过轮换", provider.display_name());
            return Ok(RotationOutcome::Disabled);
        }

        let _guard = state.lock_provider(provider)?;
        let snapshot = read_snapshot(state, provider)?;

        match plan_rotation(&snapshot.data, &snapshot.active_key) {
            RotationPlan::NoActiveSet => {
                log::warn!(
                    "{} 的激活组索引 {} 无效，无法轮换",
                    provider.display_name(),
                    snapshot.data.active_set_index
                );
                Ok(RotationOutcome::NoActiveSet)
            }
            RotationPlan::Unchanged => {
                log::debug!("{} 当前密钥无需变更 ({trigger:?})", provider.display_name());
                Ok(RotationOutcome::Unchanged {
                    key: snapshot.active_key,
                })
            }
            RotationPlan::Write { key, reason } => {
                log::debug!(
                    "{} 轮换密钥 ({trigger:?}, {reason:?})",
                    provider.display_name()
                );
                if write_active_key(state, provider, &key)? {
                    Ok(RotationOutcome::Rotated {
                        previous: snapshot.active_key,
                        key,
                        reason,
                    })
                } else {
                    Ok(RotationOutcome::Unchanged { key })
                }
            }
        }
    }
}
