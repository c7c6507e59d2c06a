use crate::cli::ui::Tone;
use crate::engine::RotationReason;
use crate::error::AppError;
use crate::provider::ProviderId;
use crate::services::{RotationOutcome, RotationService, RotationTrigger};
use crate::store::SwitcherState;
use crate::view::mask_key;

pub fn execute(state: &SwitcherState, provider: ProviderId) -> Result<(), AppError> {
    let outcome = RotationService::rotate(state, provider, RotationTrigger::Manual)?;
    print_outcome(provider, &outcome);
    Ok(())
}

pub(crate) fn print_outcome(provider: ProviderId, outcome: &RotationOutcome) {
    match outcome {
        RotationOutcome::Disabled => println!(
            "{}",
            Tone::Caution.paint(&format!(
                "Key switching is off for {}. Enable it with 'key-switcher toggle switching on'.",
                provider.display_name()
            ))
        ),
        RotationOutcome::NoActiveSet => {
            println!("{}", Tone::Caution.paint("No valid active set; nothing to rotate."))
        }
        RotationOutcome::Unchanged { key } if key.is_empty() => {
            println!("{}", Tone::Note.paint("Active set is empty; no key is active."))
        }
        RotationOutcome::Unchanged { key } => {
            println!("{}", Tone::Note.paint(&format!("Active key unchanged: {}", mask_key(key))))
        }
        RotationOutcome::Rotated { key, reason, .. } => {
            let text = match reason {
                RotationReason::Cleared => {
                    "✓ Active set is empty; cleared the active key".to_string()
                }
                RotationReason::SingleKey => format!("✓ Restored the only key {}", mask_key(key)),
                RotationReason::Next => format!("✓ Rotated to {}", mask_key(key)),
                RotationReason::FirstKey => {
                    format!("✓ Active key was not in the set; using {}", mask_key(key))
                }
            };
            println!("{}", Tone::Done.paint(&text));
        }
    }
}
