use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::AppError;

const APP_DIR_NAME: &str = ".key-switcher";

/// 默认配置目录 `~/.key-switcher`
pub fn get_app_config_dir() -> Result<PathBuf, AppError> {
    dirs::home_dir()
        .map(|home| home.join(APP_DIR_NAME))
        .ok_or_else(|| AppError::Config("无法获取用户主目录".into()))
}

pub fn get_settings_path(config_dir: &Path) -> PathBuf {
    config_dir.join("settings.json")
}

pub fn get_default_secrets_path(config_dir: &Path) -> PathBuf {
    config_dir.join("secrets.json")
}

/// 展开 `~` / `~/` 前缀
pub fn resolve_override_path(raw: &str) -> PathBuf {
    if raw == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    } else if let Some(stripped) = raw.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    } else if let Some(stripped) = raw.strip_prefix("~\\") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }

    PathBuf::from(raw)
}

pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T, AppError> {
    let content = fs::read_to_string(path).map_err(|e| AppError::io(path, e))?;
    serde_json::from_str(&content).map_err(|e| AppError::json(path, e))
}

pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<(), AppError> {
    let json =
        serde_json::to_string_pretty(value).map_err(|e| AppError::JsonSerialize { source: e })?;
    write_text_file(path, &json)
}

/// 原子写入：先写入同目录临时文件，再重命名覆盖目标文件
pub fn write_text_file(path: &Path, content: &str) -> Result<(), AppError> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).map_err(|e| AppError::io(parent, e))?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(|e| AppError::io(parent, e))?;
    tmp.write_all(content.as_bytes())
        .map_err(|e| AppError::io(tmp.path(), e))?;
    tmp.flush().map_err(|e| AppError::io(tmp.path(), e))?;
    tmp.persist(path).map_err(|e| AppError::io(path, e.error))?;
    Ok(())
}
