use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, RwLock};

use crate::config::get_settings_path;
use crate::error::AppError;
use crate::provider::{ProviderId, ALL_PROVIDERS};
use crate::secrets::{FileSecretStore, SecretStore};
use crate::settings::SwitcherSettings;

/// 会话上下文：密钥存储、设置，以及每个供应商一把的变更锁
pub struct SwitcherState {
    secrets: Box<dyn SecretStore>,
    settings: RwLock<SwitcherSettings>,
    settings_path: Option<PathBuf>,
    provider_locks: HashMap<ProviderId, Mutex<()>>,
    settings_ready: AtomicBool,
}

impl SwitcherState {
    pub fn new(secrets: Box<dyn SecretStore>, settings: SwitcherSettings) -> Self {
        Self {
            secrets,
            settings: RwLock::new(settings),
            settings_path: None,
            provider_locks: ALL_PROVIDERS
                .iter()
                .map(|p| (*p, Mutex::new(())))
                .collect(),
            settings_ready: AtomicBool::new(false),
        }
    }

    /// 设置变更时同步写回该路径
    pub fn with_settings_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.settings_path = Some(path.into());
        self
    }

    /// 从配置目录打开：读取 settings.json，并使用其中指定（或默认）的密钥文件
    pub fn open(config_dir: &Path) -> Self {
        let settings_path = get_settings_path(config_dir);
        let settings = SwitcherSettings::load(&settings_path);
        let secrets_path = settings.secrets_path(config_dir);
        log::debug!("使用密钥文件: {}", secrets_path.display());

        Self::new(Box::new(FileSecretStore::new(secrets_path)), settings)
            .with_settings_path(settings_path)
    }

    pub fn secrets(&self) -> &dyn SecretStore {
        self.secrets.as_ref()
    }

    pub fn settings(&self) -> Result<SwitcherSettings, AppError> {
        Ok(self.settings.read()?.clone())
    }

    /// 修改设置并持久化；保存失败时内存中的设置保持不变
    pub fn update_settings<F>(&self, f: F) -> Result<SwitcherSettings, AppError>
    where
        F: FnOnce(&mut SwitcherSettings),
    {
        let mut guard = self.settings.write()?;
        let mut next = guard.clone();
        f(&mut next);
        if let Some(path) = &self.settings_path {
            next.save(path)?;
        }
        *guard = next.clone();
        Ok(next)
    }

    /// 同一供应商的 读取 -> 修改 -> 保存 必须串行执行
    pub fn lock_provider(&self, provider: ProviderId) -> Result<MutexGuard<'_, ()>, AppError> {
        let lock = self
            .provider_locks
            .get(&provider)
            .ok_or_else(|| AppError::Message(format!("No lock registered for {provider}")))?;
        Ok(lock.lock()?)
    }

    /// 首次调用返回 true
    pub fn mark_settings_ready(&self) -> bool {
        !self.settings_ready.swap(true, Ordering::SeqCst)
    }
}
