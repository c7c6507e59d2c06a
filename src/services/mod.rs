pub mod dispatch;
pub mod key_set;
pub mod removal;
pub mod rotation;

pub use dispatch::{classify_error, DispatchService, ErrorAction, ErrorClass, ErrorReport};
pub use key_set::KeySetService;
pub use removal::{RemovalOutcome, RemovalService};
pub use rotation::{RotationOutcome, RotationService, RotationTrigger};

use crate::error::AppError;
use crate::key_sets::ProviderKeyData;
use crate::provider::ProviderId;
use crate::store::SwitcherState;
use crate::view::mask_key;

/// 一次新鲜读取得到的供应商状态
struct Snapshot {
    data: ProviderKeyData,
    active_key: String,
}

fn read_snapshot(state: &SwitcherState, provider: ProviderId) -> Result<Snapshot, AppError> {
    let mut secrets = state.secrets().fetch_all()?;
    let data = ProviderKeyData::from_raw(
        secrets
            .get(provider.data_secret_key().as_str())
            .map(String::as_str),
    );
    let active_key = secrets
        .shift_remove(provider.secret_key())
        .unwrap_or_default();
    Ok(Snapshot { data, active_key })
}

fn persist_data(
    state: &SwitcherState,
    provider: ProviderId,
    data: &ProviderKeyData,
) -> Result<(), AppError> {
    let json = data.to_json()?;
    state.secrets().write(&provider.data_secret_key(), &json)?;
    log::debug!("已保存 {} 的密钥组数据", provider.display_name());
    Ok(())
}

/// 写入前重新读取当前密钥，相同则跳过；返回是否发生写入
fn write_active_key(
    state: &SwitcherState,
    provider: ProviderId,
    key: &str,
) -> Result<bool, AppError> {
    let current = state
        .secrets()
        .read(provider.secret_key())?
        .unwrap_or_default();
    if current == key {
        return Ok(false);
    }
    state.secrets().write(provider.secret_key(), key)?;
    if key.is_empty() {
        log::info!("已清除 {} 的当前密钥", provider.display_name());
    } else {
        log::info!(
            "{} 的当前密钥已切换为 {}",
            provider.display_name(),
            mask_key(key)
        );
    }
    Ok(true)
}
