use crate::engine::{plan_removal, RemovalPlan};
use crate::key_sets::ProviderKeyData;
use crate::provider::ProviderId;
use crate::store::SwitcherState;
use crate::view::mask_key;

use super::{persist_data, read_snapshot, write_active_key};

/// 移除结果；任何失败都表现为 `removed == false`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalOutcome {
    pub removed: bool,
    /// 被修改的组；从“无组”清除残留密钥时为 `None`
    pub set_index: Option<usize>,
    /// 操作后的当前密钥，未移除时为 `None`
    pub new_active_key: Option<String>,
    /// 操作后的密钥组数据；读取失败时为 `None`
    pub data: Option<ProviderKeyData>,
}

impl RemovalOutcome {
    fn not_removed(data: Option<ProviderKeyData>) -> Self {
        Self {
            removed: false,
            set_index: None,
            new_active_key: None,
            data,
        }
    }
}

/// 从所在组中永久删除失效密钥
pub struct RemovalService;

impl RemovalService {
    pub fn remove(state: &SwitcherState, provider: ProviderId, failed_key: &str) -> RemovalOutcome {
        let name = provider.display_name();
        let _guard = match state.lock_provider(provider) {
            Ok(guard) => guard,
            Err(err) => {
                log::error!("{name} 移除密钥失败: {err}");
                return RemovalOutcome::not_removed(None);
            }
        };

        let snapshot = match read_snapshot(state, provider) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                log::error!("{name} 读取密钥存储失败，放弃移除: {err}");
                return RemovalOutcome::not_removed(None);
            }
        };

        match plan_removal(&snapshot.data, failed_key, &snapshot.active_key) {
            RemovalPlan::NotFound => {
                log::debug!("{name} 的任何组中都没有密钥 {}", mask_key(failed_key));
                RemovalOutcome::not_removed(Some(snapshot.data))
            }
            RemovalPlan::ClearStale => {
                if let Err(err) = write_active_key(state, provider, "") {
                    log::error!("{name} 清除残留密钥失败: {err}");
                    return RemovalOutcome::not_removed(Some(snapshot.data));
                }
                log::info!("{name} 已清除不属于任何组的密钥 {}", mask_key(failed_key));
                RemovalOutcome {
                    removed: true,
                    set_index: None,
                    new_active_key: Some(String::new()),
                    data: Some(snapshot.data),
                }
            }
            RemovalPlan::Remove {
                set_index,
                updated,
                new_active_key,
            } => {
                // 先持久化组数据，失败则不触碰当前密钥
                if let Err(err) = persist_data(state, provider, &updated) {
                    log::error!("{name} 保存密钥组失败，放弃移除: {err}");
                    return RemovalOutcome::not_removed(Some(snapshot.data));
                }
                log::info!(
                    "已从 {name} 的组 \"{}\" 中移除密钥 {}",
                    updated.sets[set_index].name,
                    mask_key(failed_key)
                );

                let live_key = match new_active_key {
                    Some(key) => match write_active_key(state, provider, &key) {
                        Ok(_) => key,
                        Err(err) => {
                            log::error!("{name} 写入新密钥失败: {err}");
                            snapshot.active_key
                        }
                    },
                    None => snapshot.active_key,
                };

                RemovalOutcome {
                    removed: true,
                    set_index: Some(set_index),
                    new_active_key: Some(live_key),
                    data: Some(updated),
                }
            }
        }
    }
}
