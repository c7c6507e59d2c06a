use clap::Subcommand;

use crate::cli::ui::{accent, create_table, prompt_config, Tone};
use crate::error::AppError;
use crate::key_sets::split_keys;
use crate::provider::ProviderId;
use crate::services::KeySetService;
use crate::store::SwitcherState;
use crate::view::{mask_key, ProviderView};

#[derive(Subcommand)]
pub enum SetCommand {
    /// List key sets
    List {
        /// Show masked keys of every set
        #[arg(long)]
        keys: bool,
    },
    /// Add a key set
    Add {
        /// Set name (defaults to "Set N")
        name: Option<String>,
        /// Keys separated by ';' or newlines
        #[arg(long)]
        keys: Option<String>,
    },
    /// Rename a key set
    Rename {
        /// Set index
        index: usize,
        /// New name
        name: String,
    },
    /// Replace the keys of a set (opens $EDITOR when no keys are given)
    Keys {
        /// Set index
        index: usize,
        /// Keys separated by ';' or newlines
        keys: Option<String>,
    },
    /// Delete a key set
    Delete {
        /// Set index
        index: usize,
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Make a set the active one
    Activate {
        /// Set index
        index: usize,
    },
}

pub fn execute(
    state: &SwitcherState,
    provider: ProviderId,
    cmd: SetCommand,
) -> Result<(), AppError> {
    match cmd {
        SetCommand::List { keys } => list_sets(state, provider, keys),
        SetCommand::Add { name, keys } => add_set(
            state,
            provider,
            name.as_deref().unwrap_or_default(),
            keys.as_deref().unwrap_or_default(),
        ),
        SetCommand::Rename { index, name } => rename_set(state, provider, index, &name),
        SetCommand::Keys { index, keys } => edit_keys(state, provider, index, keys),
        SetCommand::Delete { index, yes } => delete_set(state, provider, index, yes),
        SetCommand::Activate { index } => activate_set(state, provider, index),
    }
}

fn list_sets(state: &SwitcherState, provider: ProviderId, show_keys: bool) -> Result<(), AppError> {
    let data = KeySetService::load(state, provider)?;
    let active_key = KeySetService::active_key(state, provider)?;
    let active_index = data.active_index();

    let mut table = create_table();
    if show_keys {
        table.set_header(vec!["", "#", "Name", "Keys"]);
    } else {
        table.set_header(vec!["", "#", "Name", "Count"]);
    }

    for (index, set) in data.sets.iter().enumerate() {
        let marker = if active_index == Some(index) { "✓" } else { "" };
        let keys = set.key_list();
        let last_column = if show_keys {
            keys.iter()
                .map(|k| {
                    if k == &active_key {
                        format!("* {}", mask_key(k))
                    } else {
                        format!("  {}", mask_key(k))
                    }
                })
                .collect::<Vec<_>>()
                .join("\n")
        } else {
            keys.len().to_string()
        };
        table.add_row(vec![
            marker.to_string(),
            index.to_string(),
            set.name.clone(),
            last_column,
        ]);
    }

    println!("{}", accent(provider, provider.display_name()));
    println!("{}", table);
    Ok(())
}

fn add_set(
    state: &SwitcherState,
    provider: ProviderId,
    name: &str,
    keys: &str,
) -> Result<(), AppError> {
    let index = KeySetService::add_set(state, provider, name, keys)?;
    println!("{}", Tone::Done.paint(&format!("✓ Added set #{index}")));
    Ok(())
}

fn rename_set(
    state: &SwitcherState,
    provider: ProviderId,
    index: usize,
    name: &str,
) -> Result<(), AppError> {
    KeySetService::rename_set(state, provider, index, name)?;
    println!("{}", Tone::Done.paint(&format!("✓ Renamed set #{index} to '{}'", name.trim())));
    Ok(())
}

fn edit_keys(
    state: &SwitcherState,
    provider: ProviderId,
    index: usize,
    keys: Option<String>,
) -> Result<(), AppError> {
    let raw = match keys {
        Some(keys) => keys,
        None => {
            let data = KeySetService::load(state, provider)?;
            let set = data.sets.get(index).ok_or_else(|| {
                AppError::InvalidInput(format!("Set index {index} out of range"))
            })?;
            edit::edit(&set.keys)
                .map_err(|e| AppError::Message(format!("Editor failed: {e}")))?
        }
    };

    let count = split_keys(&raw).len();
    KeySetService::set_keys(state, provider, index, &raw)?;
    println!(
        "{}",
        Tone::Done.paint(&format!("✓ Set #{index} now holds {count} key(s)"))
    );
    print_active(state, provider)
}

fn delete_set(
    state: &SwitcherState,
    provider: ProviderId,
    index: usize,
    yes: bool,
) -> Result<(), AppError> {
    if !yes {
        let confirm = inquire::Confirm::new(&format!("Delete set #{index}?"))
            .with_default(false)
            .with_render_config(prompt_config(provider))
            .prompt()
            .map_err(|e| AppError::Message(format!("Prompt failed: {}", e)))?;
        if !confirm {
            println!("{}", Tone::Note.paint("Cancelled."));
            return Ok(());
        }
    }

    let removed = KeySetService::delete_set(state, provider, index)?;
    println!(
        "{}",
        Tone::Done.paint(&format!("✓ Deleted set #{index} '{}'", removed.name))
    );
    print_active(state, provider)
}

fn activate_set(state: &SwitcherState, provider: ProviderId, index: usize) -> Result<(), AppError> {
    KeySetService::activate_set(state, provider, index)?;
    println!("{}", Tone::Done.paint(&format!("✓ Set #{index} is now active")));
    print_active(state, provider)
}

fn print_active(state: &SwitcherState, provider: ProviderId) -> Result<(), AppError> {
    let view = ProviderView::build(state, provider)?;
    let key = if view.active_key.is_empty() {
        "N/A"
    } else {
        view.active_key.as_str()
    };
    println!("{} Active key: {}", Tone::Note.paint("→"), accent(provider, key));
    Ok(())
}
