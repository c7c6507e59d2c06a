//! 轮换 / 移除的纯计算部分，不做任何 I/O
//!
//! 调用方负责在写入前重新读取当前生效密钥，并根据返回的计划执行写入。

use crate::key_sets::{join_keys, ProviderKeyData};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationReason {
    /// 激活组已空，清除残留密钥
    Cleared,
    /// 激活组只有一个密钥，修正不一致
    SingleKey,
    /// 当前密钥的循环后继
    Next,
    /// 当前密钥不在激活组中，回退到第一个
    FirstKey,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RotationPlan {
    NoActiveSet,
    Unchanged,
    Write { key: String, reason: RotationReason },
}

pub fn plan_rotation(data: &ProviderKeyData, stored_key: &str) -> RotationPlan {
    let Some(active) = data.active_set() else {
        return RotationPlan::NoActiveSet;
    };
    let keys = active.key_list();

    let (key, reason) = match keys.len() {
        0 => (String::new(), RotationReason::Cleared),
        1 => (keys[0].clone(), RotationReason::SingleKey),
        len => match keys.iter().position(|k| k == stored_key) {
            Some(idx) => (keys[(idx + 1) % len].clone(), RotationReason::Next),
            None => (keys[0].clone(), RotationReason::FirstKey),
        },
    };

    if key == stored_key {
        RotationPlan::Unchanged
    } else {
        RotationPlan::Write { key, reason }
    }
}

/// 激活组变化后应当生效的密钥：当前密钥仍在组内则保留，否则取第一个（组为空时为空串）
pub fn resync_active_key(data: &ProviderKeyData, stored_key: &str) -> String {
    let keys = data.active_keys();
    if !stored_key.is_empty() && keys.iter().any(|k| k == stored_key) {
        return stored_key.to_string();
    }
    keys.into_iter().next().unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemovalPlan {
    /// 不在任何组中，也不是当前密钥
    NotFound,
    /// 不在任何组中，但仍是当前密钥（组被外部修改），清除即可
    ClearStale,
    Remove {
        set_index: usize,
        updated: ProviderKeyData,
        /// 激活组受影响时的新密钥；非激活组时为 `None`
        new_active_key: Option<String>,
    },
}

pub fn plan_removal(data: &ProviderKeyData, failed_key: &str, stored_key: &str) -> RemovalPlan {
    let Some((set_index, position)) = data.find_key(failed_key) else {
        if !failed_key.is_empty() && failed_key == stored_key {
            return RemovalPlan::ClearStale;
        }
        return RemovalPlan::NotFound;
    };

    let mut remaining = data.sets[set_index].key_list();
    remaining.remove(position);

    let mut updated = data.clone();
    updated.sets[set_index].keys = join_keys(&remaining);

    let new_active_key = if data.active_index() == Some(set_index) {
        Some(if remaining.is_empty() {
            String::new()
        } else {
            // 保持旧实现的取模规则：取原位置（对剩余长度取模）上的密钥
            remaining[position % remaining.len()].clone()
        })
    } else {
        None
    };

    RemovalPlan::Remove {
        set_index,
        updated,
        new_active_key,
    }
}
