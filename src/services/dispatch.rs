//! 供应商请求出错时的处理：判断移除还是轮换，并生成错误报告

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;

use crate::provider::ProviderId;
use crate::store::SwitcherState;
use crate::view::mask_key;

use super::removal::RemovalService;
use super::rotation::{RotationOutcome, RotationService, RotationTrigger};

/// 触发移除的状态码
pub const REMOVAL_STATUS_CODES: [u16; 5] = [400, 401, 403, 404, 429];

fn status_code_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // ASCII 词边界与数字，与宿主端 JS 正则一致
    RE.get_or_init(|| {
        Regex::new(r"(?-u:\b)([0-9]{3})(?-u:\b)").expect("valid status code regex")
    })
}

fn removal_message_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)Unauthorized|Forbidden|Permission|Invalid|Exceeded|Internal")
            .expect("valid removal message regex")
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorClass {
    /// 消息中出现的第一个三位数
    pub status_code: Option<u16>,
    pub removal_status: bool,
    pub removal_message: bool,
}

impl ErrorClass {
    pub fn should_remove(&self) -> bool {
        self.removal_status || self.removal_message
    }
}

pub fn classify_error(message: &str) -> ErrorClass {
    let status_code = status_code_regex()
        .captures(message)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u16>().ok());
    ErrorClass {
        status_code,
        removal_status: status_code.is_some_and(|code| REMOVAL_STATUS_CODES.contains(&code)),
        removal_message: removal_message_regex().is_match(message),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum ErrorAction {
    /// 未启用切换或没有当前密钥
    None,
    /// 触发了移除，但密钥未被移除
    RemovalFailed,
    Removed { new_active_key: String },
    Rotated { key: String },
    /// 轮换没有改变当前密钥
    Kept,
    Failed { reason: String },
}

/// 展示给用户的错误摘要
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    pub provider: ProviderId,
    pub title: String,
    pub message: String,
    pub class: ErrorClass,
    pub key_removed: bool,
    /// 已脱敏
    pub removed_key: Option<String>,
    pub action: ErrorAction,
    pub show_details: bool,
    pub occurred_at: DateTime<Utc>,
}

/// 宿主事件入口；不会向调用方返回错误
pub struct DispatchService;

impl DispatchService {
    /// 处理一次请求错误，仅作用于当前供应商
    pub fn handle_error(
        state: &SwitcherState,
        message: &str,
        title: Option<&str>,
    ) -> Option<ErrorReport> {
        let settings = match state.settings() {
            Ok(settings) => settings,
            Err(err) => {
                log::error!("读取设置失败，忽略错误事件: {err}");
                return None;
            }
        };
        let Some(provider) = settings.current_provider else {
            log::warn!("未设置当前供应商，忽略错误事件");
            return None;
        };
        log::debug!("{} 请求出错: {message}", provider.display_name());

        let class = classify_error(message);
        let switching = settings.key_switching_enabled(provider);
        let failed_key = if switching {
            match state.secrets().read(provider.secret_key()) {
                Ok(key) => key.filter(|k| !k.is_empty()),
                Err(err) => {
                    log::error!("读取 {} 当前密钥失败: {err}", provider.display_name());
                    None
                }
            }
        } else {
            None
        };

        let mut key_removed = false;
        let mut removed_key = None;
        let action = match failed_key {
            None => ErrorAction::None,
            Some(failed_key) if class.should_remove() => {
                let outcome = RemovalService::remove(state, provider, &failed_key);
                if outcome.removed {
                    key_removed = true;
                    removed_key = Some(mask_key(&failed_key));
                    ErrorAction::Removed {
                        new_active_key: mask_key(
                            outcome.new_active_key.as_deref().unwrap_or_default(),
                        ),
                    }
                } else {
                    ErrorAction::RemovalFailed
                }
            }
            Some(_) => match RotationService::rotate(state, provider, RotationTrigger::Error) {
                Ok(RotationOutcome::Rotated { key, .. }) => ErrorAction::Rotated {
                    key: mask_key(&key),
                },
                Ok(_) => ErrorAction::Kept,
                Err(err) => {
                    log::error!("{} 轮换密钥失败: {err}", provider.display_name());
                    ErrorAction::Failed {
                        reason: err.to_string(),
                    }
                }
            },
        };

        Some(ErrorReport {
            provider,
            title: title
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| format!("{} API Error", provider.display_name())),
            message: message.to_string(),
            class,
            key_removed,
            removed_key,
            action,
            show_details: settings.show_error_details(provider),
            occurred_at: Utc::now(),
        })
    }

    /// 宿主配置就绪后执行一次自修复轮换；每个会话只执行一次
    pub fn on_settings_ready(state: &SwitcherState) -> Option<RotationOutcome> {
        if !state.mark_settings_ready() {
            log::debug!("已初始化，忽略重复的就绪事件");
            return None;
        }
        let provider = state.settings().ok()?.current_provider?;
        match RotationService::rotate(state, provider, RotationTrigger::SelfHeal) {
            Ok(outcome) => Some(outcome),
            Err(err) => {
                log::error!("{} 初始轮换失败: {err}", provider.display_name());
                None
            }
        }
    }
}
