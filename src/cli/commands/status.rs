use crate::cli::ui::{accent, create_table, Tone};
use crate::error::AppError;
use crate::provider::{ProviderId, ALL_PROVIDERS};
use crate::store::SwitcherState;
use crate::view::ProviderView;

pub fn execute(
    state: &SwitcherState,
    selected: Option<ProviderId>,
    all: bool,
    json: bool,
) -> Result<(), AppError> {
    let providers: Vec<ProviderId> = if all {
        ALL_PROVIDERS.to_vec()
    } else {
        vec![crate::cli::resolve_provider(state, selected)?]
    };

    let views = providers
        .into_iter()
        .map(|p| ProviderView::build(state, p))
        .collect::<Result<Vec<_>, _>>()?;

    if json {
        let out = serde_json::to_string_pretty(&views)
            .map_err(|e| AppError::JsonSerialize { source: e })?;
        println!("{out}");
        return Ok(());
    }

    for (i, view) in views.iter().enumerate() {
        if i > 0 {
            println!();
        }
        print_view(view);
    }
    Ok(())
}

pub(crate) fn print_view(view: &ProviderView) {
    let marker = if view.is_current { " (current)" } else { "" };
    println!("{}{}", accent(view.provider, view.name), marker);
    println!("{}", "─".repeat(60));

    println!(
        "  Key switching:  {}",
        on_off(view.toggles.key_switching)
    );
    println!(
        "  Error details:  {}",
        on_off(view.toggles.show_error_details)
    );
    println!(
        "  Active set:     {}",
        view.active_set_name.as_deref().unwrap_or("N/A")
    );

    let key = if view.active_key.is_empty() {
        "N/A".to_string()
    } else {
        view.active_key.clone()
    };
    if view.active_key.is_empty() || view.active_key_in_set {
        println!("  Active key:     {}", key);
    } else {
        println!(
            "  Active key:     {} {}",
            key,
            Tone::Caution.paint("(not in active set)")
        );
    }

    let mut table = create_table();
    table.set_header(vec!["", "#", "Name", "Keys"]);
    for row in &view.sets {
        table.add_row(vec![
            if row.active { "✓" } else { "" }.to_string(),
            row.index.to_string(),
            row.name.clone(),
            row.key_count.to_string(),
        ]);
    }
    println!("{table}");
}

fn on_off(enabled: bool) -> String {
    if enabled {
        Tone::Done.paint("on")
    } else {
        Tone::Note.paint("off")
    }
}
