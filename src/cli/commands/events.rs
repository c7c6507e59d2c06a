use crate::cli::ui::{accent, Tone};
use crate::error::AppError;
use crate::provider::ProviderId;
use crate::services::{DispatchService, ErrorAction, ErrorReport};
use crate::store::SwitcherState;

use super::rotate::print_outcome;

pub fn report_error(
    state: &SwitcherState,
    selected: Option<ProviderId>,
    message: &str,
    title: Option<&str>,
    json: bool,
) -> Result<(), AppError> {
    ensure_current(state, selected)?;

    let Some(report) = DispatchService::handle_error(state, message, title) else {
        println!("{}", Tone::Note.paint("No current provider; the error was ignored."));
        return Ok(());
    };

    if json {
        let out = serde_json::to_string_pretty(&report)
            .map_err(|e| AppError::JsonSerialize { source: e })?;
        println!("{out}");
        return Ok(());
    }

    print_action(&report);
    if report.show_details {
        print_details(&report);
    }
    Ok(())
}

pub fn ready(state: &SwitcherState, selected: Option<ProviderId>) -> Result<(), AppError> {
    let provider = ensure_current(state, selected)?;
    match DispatchService::on_settings_ready(state) {
        Some(outcome) => match provider {
            Some(provider) => print_outcome(provider, &outcome),
            None => println!("{}", Tone::Note.paint("Initial rotation check complete.")),
        },
        None => println!("{}", Tone::Note.paint("Nothing to do.")),
    }
    Ok(())
}

/// 错误事件只作用于当前供应商
fn ensure_current(
    state: &SwitcherState,
    selected: Option<ProviderId>,
) -> Result<Option<ProviderId>, AppError> {
    let current = state.settings()?.current_provider;
    if let (Some(selected), Some(current)) = (selected, current) {
        if selected != current {
            return Err(AppError::Message(format!(
                "'{}' is not the current provider ('{}'). Run 'key-switcher provider use {}' first.",
                selected, current, selected
            )));
        }
    }
    if selected.is_some() && current.is_none() {
        return Err(AppError::Message(
            "No current provider. Run 'key-switcher provider use <id>' first.".to_string(),
        ));
    }
    Ok(current)
}

fn print_action(report: &ErrorReport) {
    match &report.action {
        ErrorAction::None => {}
        ErrorAction::RemovalFailed => {
            let text = "Removal was triggered but the key was not removed.";
            println!("{}", Tone::Caution.paint(text))
        }
        ErrorAction::Removed { new_active_key } => {
            println!(
                "{}",
                Tone::Done.paint(&format!(
                    "✓ Removed key {}",
                    report.removed_key.as_deref().unwrap_or_default()
                ))
            );
            if new_active_key.is_empty() {
                let text = "  No keys left in the set; the active key was cleared.";
                println!("{}", Tone::Caution.paint(text));
            } else {
                println!("{}", Tone::Note.paint(&format!("  Active key: {new_active_key}")));
            }
        }
        ErrorAction::Rotated { key } => {
            println!("{}", Tone::Done.paint(&format!("✓ Rotated to {key}")))
        }
        ErrorAction::Kept => println!("{}", Tone::Note.paint("Active key unchanged.")),
        ErrorAction::Failed { reason } => {
            println!("{}", Tone::Failure.paint(&format!("Key rotation failed: {reason}")))
        }
    }
}

fn print_details(report: &ErrorReport) {
    println!();
    println!("{}", accent(report.provider, &report.title));
    println!("{}", "─".repeat(60));
    println!("  Provider: {}", report.provider.display_name());
    println!(
        "  Time:     {}",
        report.occurred_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    if let Some(code) = report.class.status_code {
        println!("  Status:   {code}");
    }
    println!("  Message:  {}", report.message);
    if report.key_removed {
        println!(
            "  {}",
            Tone::Caution.paint(&format!(
                "Key {} was removed from its set.",
                report.removed_key.as_deref().unwrap_or_default()
            ))
        );
    }
}
