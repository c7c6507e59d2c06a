//! 密钥组数据模型与（反）序列化
//!
//! 每个供应商在密钥存储中保存一份 JSON：
//! `{ "activeSetIndex": 0, "sets": [{ "name": "Default", "keys": "k1\nk2" }] }`。
//! 读取时永不失败，任何损坏的数据都会回退为默认记录并修复。

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AppError;

pub const DEFAULT_SET_NAME: &str = "Default";
pub const UNNAMED_SET_NAME: &str = "Unnamed Set";
/// `sets` 为空时写出的“无激活组”标记
pub const NO_ACTIVE_SET: i64 = -1;

/// 按换行或分号拆分密钥列表，去除首尾空白并丢弃空项，保持原有顺序
pub fn split_keys(raw: &str) -> Vec<String> {
    raw.split(['\n', ';'])
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn join_keys<S: AsRef<str>>(keys: &[S]) -> String {
    keys.iter()
        .map(|k| k.as_ref())
        .collect::<Vec<_>>()
        .join("\n")
}

/// 规范化用户输入的密钥文本
pub fn normalize_keys(raw: &str) -> String {
    join_keys(&split_keys(raw))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySet {
    pub name: String,
    pub keys: String,
}

impl KeySet {
    pub fn new(name: impl Into<String>, keys: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            keys: keys.into(),
        }
    }

    pub fn key_list(&self) -> Vec<String> {
        split_keys(&self.keys)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.key_list().iter().any(|k| k == key)
    }
}

impl Default for KeySet {
    fn default() -> Self {
        Self::new(DEFAULT_SET_NAME, "")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderKeyData {
    pub active_set_index: i64,
    pub sets: Vec<KeySet>,
}

impl Default for ProviderKeyData {
    fn default() -> Self {
        Self {
            active_set_index: 0,
            sets: vec![KeySet::default()],
        }
    }
}

impl ProviderKeyData {
    /// 从密钥存储中的原始字符串加载，缺失或损坏时返回默认记录
    pub fn from_raw(raw: Option<&str>) -> Self {
        let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
            return Self::default();
        };

        let value: Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(err) => {
                log::warn!("解析密钥组数据失败，将使用默认数据: {err}");
                return Self::default();
            }
        };

        match Self::from_value(&value) {
            Some(data) => data,
            None => {
                log::warn!("密钥组数据结构无效，将使用默认数据");
                Self::default()
            }
        }
    }

    fn from_value(value: &Value) -> Option<Self> {
        let index = value.get("activeSetIndex")?;
        let active_set_index = index
            .as_i64()
            .or_else(|| index.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))?;
        let sets = value
            .get("sets")?
            .as_array()?
            .iter()
            .map(|entry| KeySet {
                name: entry
                    .get("name")
                    .and_then(Value::as_str)
                    .unwrap_or(UNNAMED_SET_NAME)
                    .to_string(),
                keys: entry
                    .get("keys")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            })
            .collect();

        let mut data = Self {
            active_set_index,
            sets,
        };
        data.normalize();
        Some(data)
    }

    /// 保证至少存在一个组，并把越界的激活索引夹到 0
    pub fn normalize(&mut self) {
        if self.sets.is_empty() {
            log::warn!("密钥组列表为空，已插入默认组");
            self.sets.push(KeySet::default());
        }
        if self.active_index().is_none() {
            log::warn!(
                "激活组索引 {} 越界（共 {} 组），已重置为 0",
                self.active_set_index,
                self.sets.len()
            );
            self.active_set_index = 0;
        }
    }

    pub fn to_json(&self) -> Result<String, AppError> {
        let mut out = self.clone();
        if out.sets.is_empty() {
            out.active_set_index = NO_ACTIVE_SET;
        }
        serde_json::to_string(&out).map_err(|e| AppError::JsonSerialize { source: e })
    }

    pub fn active_index(&self) -> Option<usize> {
        usize::try_from(self.active_set_index)
            .ok()
            .filter(|idx| *idx < self.sets.len())
    }

    pub fn active_set(&self) -> Option<&KeySet> {
        self.active_index().map(|idx| &self.sets[idx])
    }

    pub fn active_keys(&self) -> Vec<String> {
        self.active_set().map(KeySet::key_list).unwrap_or_default()
    }

    /// 第一个包含该密钥的组及其在组内的位置
    pub fn find_key(&self, key: &str) -> Option<(usize, usize)> {
        self.sets.iter().enumerate().find_map(|(set_idx, set)| {
            set.key_list()
                .iter()
                .position(|k| k == key)
                .map(|pos| (set_idx, pos))
        })
    }

    fn check_index(&self, index: usize) -> Result<(), AppError> {
        if index < self.sets.len() {
            Ok(())
        } else {
            Err(AppError::InvalidInput(format!(
                "Set index {index} out of range (0..{})",
                self.sets.len()
            )))
        }
    }

    pub fn rename_set(&mut self, index: usize, name: &str) -> Result<(), AppError> {
        self.check_index(index)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::InvalidInput("Set name cannot be empty".into()));
        }
        self.sets[index].name = name.to_string();
        Ok(())
    }

    pub fn set_keys(&mut self, index: usize, raw_keys: &str) -> Result<(), AppError> {
        self.check_index(index)?;
        self.sets[index].keys = normalize_keys(raw_keys);
        Ok(())
    }

    /// 追加新组并返回其索引；名称为空时自动命名为 `Set N`
    pub fn add_set(&mut self, name: &str, raw_keys: &str) -> usize {
        let name = name.trim();
        let name = if name.is_empty() {
            format!("Set {}", self.sets.len() + 1)
        } else {
            name.to_string()
        };
        self.sets.push(KeySet::new(name, normalize_keys(raw_keys)));
        self.sets.len() - 1
    }

    /// 删除组，激活指针尽量保持指向原来的组
    pub fn delete_set(&mut self, index: usize) -> Result<KeySet, AppError> {
        self.check_index(index)?;
        let removed = self.sets.remove(index);
        let active = self.active_set_index;
        if active == index as i64 {
            self.active_set_index = 0;
        } else if active > index as i64 {
            self.active_set_index = active - 1;
        }
        self.normalize();
        Ok(removed)
    }

    pub fn activate_set(&mut self, index: usize) -> Result<(), AppError> {
        self.check_index(index)?;
        self.active_set_index = index as i64;
        Ok(())
    }
}
