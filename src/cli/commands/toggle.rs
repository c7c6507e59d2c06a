use clap::{Subcommand, ValueEnum};

use crate::cli::ui::Tone;
use crate::error::AppError;
use crate::provider::ProviderId;
use crate::store::SwitcherState;

#[derive(Clone, Copy, ValueEnum)]
pub enum Switch {
    On,
    Off,
}

#[derive(Subcommand)]
pub enum ToggleCommand {
    /// Automatic rotation / removal after failed requests
    Switching {
        /// Omit to flip the current value
        #[arg(value_enum)]
        state: Option<Switch>,
    },
    /// Show error details after failed requests
    Errors {
        /// Omit to flip the current value
        #[arg(value_enum)]
        state: Option<Switch>,
    },
}

pub fn execute(
    state: &SwitcherState,
    provider: ProviderId,
    cmd: ToggleCommand,
) -> Result<(), AppError> {
    let settings = state.settings()?;
    match cmd {
        ToggleCommand::Switching { state: value } => {
            let enabled = resolve(value, settings.key_switching_enabled(provider));
            state.update_settings(|s| s.set_key_switching(provider, enabled))?;
            println!(
                "{}",
                Tone::Done.paint(&format!(
                    "✓ Key switching for {}: {}",
                    provider.display_name(),
                    label(enabled)
                ))
            );
        }
        ToggleCommand::Errors { state: value } => {
            let enabled = resolve(value, settings.show_error_details(provider));
            state.update_settings(|s| s.set_show_error_details(provider, enabled))?;
            println!(
                "{}",
                Tone::Done.paint(&format!(
                    "✓ Error details for {}: {}",
                    provider.display_name(),
                    label(enabled)
                ))
            );
        }
    }
    Ok(())
}

fn resolve(value: Option<Switch>, current: bool) -> bool {
    match value {
        Some(Switch::On) => true,
        Some(Switch::Off) => false,
        None => !current,
    }
}

fn label(enabled: bool) -> &'static str {
    if enabled {
        "on"
    } else {
        "off"
    }
}
