use crate::engine::resync_active_key;
use crate::error::AppError;
use crate::key_sets::{KeySet, ProviderKeyData};
use crate::provider::ProviderId;
use crate::store::SwitcherState;

use super::{persist_data, read_snapshot, write_active_key};

/// 密钥组的增删改与激活
pub struct KeySetService;

impl KeySetService {
    /// 读取供应商的密钥组（总是重新读取存储）
    pub fn load(state: &SwitcherState, provider: ProviderId) -> Result<ProviderKeyData, AppError> {
        Ok(read_snapshot(state, provider)?.data)
    }

    /// 读取当前生效密钥
    pub fn active_key(state: &SwitcherState, provider: ProviderId) -> Result<String, AppError> {
        Ok(state
            .secrets()
            .read(provider.secret_key())?
            .unwrap_or_default())
    }

    /// 覆盖保存整份数据（先规范化）
    pub fn save(
        state: &SwitcherState,
        provider: ProviderId,
        mut data: ProviderKeyData,
    ) -> Result<ProviderKeyData, AppError> {
        data.normalize();
        Self::mutate(state, provider, move |current| {
            *current = data;
            Ok(())
        })?;
        Self::load(state, provider)
    }

    pub fn rename_set(
        state: &SwitcherState,
        provider: ProviderId,
        index: usize,
        name: &str,
    ) -> Result<(), AppError> {
        Self::mutate(state, provider, |data| data.rename_set(index, name))
    }

    pub fn set_keys(
        state: &SwitcherState,
        provider: ProviderId,
        index: usize,
        raw_keys: &str,
    ) -> Result<(), AppError> {
        Self::mutate(state, provider, |data| data.set_keys(index, raw_keys))
    }

    /// 新增组，返回新组索引
    pub fn add_set(
        state: &SwitcherState,
        provider: ProviderId,
        name: &str,
        raw_keys: &str,
    ) -> Result<usize, AppError> {
        Self::mutate(state, provider, |data| Ok(data.add_set(name, raw_keys)))
    }

    pub fn delete_set(
        state: &SwitcherState,
        provider: ProviderId,
        index: usize,
    ) -> Result<KeySet, AppError> {
        Self::mutate(state, provider, |data| data.delete_set(index))
    }

    /// 切换激活组，并立即让当前密钥指向新组
    pub fn activate_set(
        state: &SwitcherState,
        provider: ProviderId,
        index: usize,
    ) -> Result<(), AppError> {
        Self::mutate(state, provider, |data| data.activate_set(index))
    }

    /// 在供应商锁内执行 读取 -> 修改 -> 保存，之后修正当前密钥
    fn mutate<R, F>(state: &SwitcherState, provider: ProviderId, f: F) -> Result<R, AppError>
    where
        F: FnOnce(&mut ProviderKeyData) -> Result<R, AppError>,
    {
        let _guard = state.lock_provider(provider)?;
        let snapshot = read_snapshot(state, provider)?;

        let mut data = snapshot.data.clone();
        let result = f(&mut data)?;
        if data == snapshot.data {
            return Ok(result);
        }

        persist_data(state, provider, &data)?;

        // 只有激活组本身变化（切换、编辑或删除）时才修正当前密钥
        let active_changed = data.active_index() != snapshot.data.active_index()
            || data.active_set() != snapshot.data.active_set();
        if !active_changed {
            return Ok(result);
        }

        let desired = resync_active_key(&data, &snapshot.active_key);
        if desired != snapshot.active_key {
            if let Err(err) = write_active_key(state, provider, &desired) {
                // 组数据已保存，下次轮换会自行修复
                log::error!("{} 写入当前密钥失败: {err}", provider.display_name());
            }
        }

        Ok(result)
    }
}
