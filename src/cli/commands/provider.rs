use clap::Subcommand;

use crate::cli::ui::{accent, create_table, Tone};
use crate::error::AppError;
use crate::provider::{ProviderId, ALL_PROVIDERS};
use crate::store::SwitcherState;

#[derive(Subcommand)]
pub enum ProviderCommand {
    /// List all providers
    List,
    /// Show the current provider
    Current,
    /// Set the provider whose requests are being made
    Use {
        /// Provider ID
        #[arg(value_enum)]
        id: ProviderId,
    },
}

pub fn execute(state: &SwitcherState, cmd: ProviderCommand) -> Result<(), AppError> {
    match cmd {
        ProviderCommand::List => list_providers(state),
        ProviderCommand::Current => show_current(state),
        ProviderCommand::Use { id } => use_provider(state, id),
    }
}

fn list_providers(state: &SwitcherState) -> Result<(), AppError> {
    let settings = state.settings()?;

    let mut table = create_table();
    table.set_header(vec!["", "ID", "Name", "Secret", "Switching"]);
    for provider in ALL_PROVIDERS {
        let current_marker = if settings.current_provider == Some(provider) {
            "✓"
        } else {
            ""
        };
        let switching = if settings.key_switching_enabled(provider) {
            "on"
        } else {
            "off"
        };
        table.add_row(vec![
            current_marker.to_string(),
            provider.as_str().to_string(),
            provider.display_name().to_string(),
            provider.secret_key().to_string(),
            switching.to_string(),
        ]);
    }

    println!("{}", table);
    Ok(())
}

fn show_current(state: &SwitcherState) -> Result<(), AppError> {
    match state.settings()?.current_provider {
        Some(provider) => println!(
            "{} Current: {} ({})",
            Tone::Note.paint("→"),
            accent(provider, provider.display_name()),
            provider.as_str()
        ),
        None => println!(
            "{}",
            Tone::Note.paint("No current provider. Use 'key-switcher provider use <id>'.")
        ),
    }
    Ok(())
}

fn use_provider(state: &SwitcherState, provider: ProviderId) -> Result<(), AppError> {
    state.update_settings(|s| s.current_provider = Some(provider))?;
    println!(
        "{}",
        Tone::Done.paint(&format!("✓ Current provider set to '{}'", provider.display_name()))
    );
    Ok(())
}
