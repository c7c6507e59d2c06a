#![allow(dead_code)]

use std::sync::Arc;

use key_switcher_lib::{
    KeySet, MemorySecretStore, ProviderId, ProviderKeyData, SecretStore, SwitcherSettings,
    SwitcherState,
};

pub fn key_data(active_set_index: i64, sets: &[(&str, &str)]) -> ProviderKeyData {
    ProviderKeyData {
        active_set_index,
        sets: sets
            .iter()
            .map(|(name, keys)| KeySet::new(*name, *keys))
            .collect(),
    }
}

/// 预置密钥组与当前密钥的会话，返回共享的内存存储以便断言
pub fn seeded_state(
    provider: ProviderId,
    data: &ProviderKeyData,
    active_key: &str,
    switching: bool,
) -> (SwitcherState, Arc<MemorySecretStore>) {
    let store = Arc::new(MemorySecretStore::with_secrets([
        (
            provider.data_secret_key(),
            data.to_json().expect("serialize seed data"),
        ),
        (provider.secret_key().to_string(), active_key.to_string()),
    ]));

    let mut settings = SwitcherSettings {
        current_provider: Some(provider),
        ..Default::default()
    };
    settings.set_key_switching(provider, switching);

    let state = SwitcherState::new(Box::new(store.clone()), settings);
    (state, store)
}

pub fn stored_data(store: &MemorySecretStore, provider: ProviderId) -> ProviderKeyData {
    ProviderKeyData::from_raw(store.get(&provider.data_secret_key()).as_deref())
}

pub fn stored_key(store: &MemorySecretStore, provider: ProviderId) -> String {
    store
        .read(provider.secret_key())
        .expect("read active key")
        .unwrap_or_default()
}
