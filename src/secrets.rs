use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use indexmap::IndexMap;

use crate::config::{read_json_file, write_json_file};
use crate::error::AppError;

pub type SecretMap = IndexMap<String, String>;

/// 外部密钥存储：扁平的 `名称 -> 值` 映射，不提供事务保证
pub trait SecretStore: Send + Sync {
    fn fetch_all(&self) -> Result<SecretMap, AppError>;

    fn write(&self, name: &str, value: &str) -> Result<(), AppError>;

    fn read(&self, name: &str) -> Result<Option<String>, AppError> {
        Ok(self.fetch_all()?.shift_remove(name))
    }
}

impl<T: SecretStore + ?Sized> SecretStore for Arc<T> {
    fn fetch_all(&self) -> Result<SecretMap, AppError> {
        (**self).fetch_all()
    }

    fn write(&self, name: &str, value: &str) -> Result<(), AppError> {
        (**self).write(name, value)
    }

    fn read(&self, name: &str) -> Result<Option<String>, AppError> {
        (**self).read(name)
    }
}

/// 基于 JSON 文件的密钥存储（`{"api_key_openai": "..."}`）
pub struct FileSecretStore {
    path: PathBuf,
}

impl FileSecretStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SecretStore for FileSecretStore {
    fn fetch_all(&self) -> Result<SecretMap, AppError> {
        if !self.path.exists() {
            return Ok(SecretMap::new());
        }
        read_json_file(&self.path)
    }

    fn write(&self, name: &str, value: &str) -> Result<(), AppError> {
        let mut secrets = self.fetch_all()?;
        secrets.insert(name.to_string(), value.to_string());
        write_json_file(&self.path, &secrets)
    }
}

#[derive(Default)]
struct MemoryInner {
    secrets: SecretMap,
    fail_reads: bool,
    failing_writes: HashSet<String>,
    write_log: Vec<(String, String)>,
}

/// 进程内密钥存储，可注入读写失败
#[derive(Default)]
pub struct MemorySecretStore {
    inner: Mutex<MemoryInner>,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_secrets<I, K, V>(secrets: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let store = Self::new();
        if let Ok(mut inner) = store.inner.lock() {
            inner.secrets = secrets
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect();
        }
        store
    }

    pub fn set_fail_reads(&self, fail: bool) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.fail_reads = fail;
        }
    }

    pub fn fail_writes_to(&self, name: &str) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.failing_writes.insert(name.to_string());
        }
    }

    pub fn clear_failures(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.fail_reads = false;
            inner.failing_writes.clear();
        }
    }

    /// 成功写入的 `(名称, 值)` 记录，按写入顺序
    pub fn writes(&self) -> Vec<(String, String)> {
        self.inner
            .lock()
            .map(|inner| inner.write_log.clone())
            .unwrap_or_default()
    }

    pub fn get(&self, name: &str) -> Option<String> {
        self.inner
            .lock()
            .ok()
            .and_then(|inner| inner.secrets.get(name).cloned())
    }

    /// 绕过写入记录直接修改，模拟外部改动
    pub fn set_external(&self, name: &str, value: &str) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.secrets.insert(name.to_string(), value.to_string());
        }
    }
}

impl SecretStore for MemorySecretStore {
    fn fetch_all(&self) -> Result<SecretMap, AppError> {
        let inner = self.inner.lock()?;
        if inner.fail_reads {
            return Err(AppError::SecretStore("secret fetch failed".into()));
        }
        Ok(inner.secrets.clone())
    }

    fn write(&self, name: &str, value: &str) -> Result<(), AppError> {
        let mut inner = self.inner.lock()?;
        if inner.failing_writes.contains(name) {
            return Err(AppError::SecretStore(format!("write to '{name}' rejected")));
        }
        inner.secrets.insert(name.to_string(), value.to_string());
        inner.write_log.push((name.to_string(), value.to_string()));
        Ok(())
    }
}
