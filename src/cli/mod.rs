use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

pub mod commands;
pub mod ui;

use crate::config::get_app_config_dir;
use crate::error::AppError;
use crate::provider::ProviderId;
use crate::store::SwitcherState;

#[derive(Parser)]
#[command(
    name = "key-switcher",
    version,
    about = "Rotating API key sets for chat completion providers",
    long_about = "Keep several named sets of API keys per provider, rotate the active key on demand or after a failed request, and drop keys that the provider rejects."
)]
pub struct Cli {
    /// Provider to operate on (defaults to the current provider)
    #[arg(short, long, global = true, value_enum)]
    pub provider: Option<ProviderId>,

    /// Configuration directory (defaults to ~/.key-switcher)
    #[arg(long, global = true, env = "KEY_SWITCHER_CONFIG_DIR")]
    pub config_dir: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show key sets and the active key
    Status {
        /// Show every provider
        #[arg(long)]
        all: bool,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage the provider whose requests are being made
    #[command(subcommand)]
    Provider(commands::provider::ProviderCommand),

    /// Manage key sets (list, add, rename, keys, delete, activate)
    #[command(subcommand)]
    Set(commands::set::SetCommand),

    /// Rotate to the next key in the active set
    Rotate,

    /// Toggle automatic key switching or error details
    #[command(subcommand)]
    Toggle(commands::toggle::ToggleCommand),

    /// Report a failed request for the current provider
    ReportError {
        /// Error message returned by the provider
        message: String,
        /// Error title
        #[arg(long)]
        title: Option<String>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Signal that host settings are ready (runs one self-heal rotation)
    Ready,

    /// Generate shell completions
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

pub fn run(cli: Cli) -> Result<(), AppError> {
    if let Commands::Completions { shell } = cli.command {
        generate_completions(shell);
        return Ok(());
    }

    let config_dir = match cli.config_dir {
        Some(dir) => dir,
        None => get_app_config_dir()?,
    };
    let state = SwitcherState::open(&config_dir);
    let selected = cli.provider;

    match cli.command {
        Commands::Status { all, json } => commands::status::execute(&state, selected, all, json),
        Commands::Provider(cmd) => commands::provider::execute(&state, cmd),
        Commands::Set(cmd) => {
            commands::set::execute(&state, resolve_provider(&state, selected)?, cmd)
        }
        Commands::Rotate => commands::rotate::execute(&state, resolve_provider(&state, selected)?),
        Commands::Toggle(cmd) => {
            commands::toggle::execute(&state, resolve_provider(&state, selected)?, cmd)
        }
        Commands::ReportError {
            message,
            title,
            json,
        } => commands::events::report_error(&state, selected, &message, title.as_deref(), json),
        Commands::Ready => commands::events::ready(&state, selected),
        Commands::Completions { .. } => Ok(()),
    }
}

/// `--provider` 优先，否则使用当前供应商
pub(crate) fn resolve_provider(
    state: &SwitcherState,
    selected: Option<ProviderId>,
) -> Result<ProviderId, AppError> {
    match selected {
        Some(provider) => Ok(provider),
        None => state.settings()?.current_provider.ok_or_else(|| {
            AppError::Message(
                "No provider selected. Pass --provider or run 'key-switcher provider use <id>'."
                    .to_string(),
            )
        }),
    }
}

/// Generate shell completions
pub fn generate_completions(shell: Shell) {
    use clap::CommandFactory;
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
}
