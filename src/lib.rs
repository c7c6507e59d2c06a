// Core modules
mod config;
mod engine;
mod error;
mod key_sets;
mod provider;
mod secrets;
mod services;
mod settings;
mod store;
mod view;

// CLI module
pub mod cli;

// Public exports
pub use config::{get_app_config_dir, get_settings_path, read_json_file, write_json_file};
pub use engine::{
    plan_removal, plan_rotation, resync_active_key, RemovalPlan, RotationPlan, RotationReason,
};
pub use error::AppError;
pub use key_sets::{join_keys, normalize_keys, split_keys, KeySet, ProviderKeyData};
pub use provider::{ProviderId, ALL_PROVIDERS};
pub use secrets::{FileSecretStore, MemorySecretStore, SecretMap, SecretStore};
pub use services::{
    classify_error, DispatchService, ErrorAction, ErrorClass, ErrorReport, KeySetService,
    RemovalOutcome, RemovalService, RotationOutcome, RotationService, RotationTrigger,
};
pub use settings::{ProviderToggles, SwitcherSettings};
pub use store::SwitcherState;
pub use view::{mask_key, ProviderView, SetRow};
