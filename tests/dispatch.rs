use key_switcher_lib::{
    DispatchService, ErrorAction, MemorySecretStore, ProviderId, RotationOutcome,
    SwitcherSettings, SwitcherState,
};

#[path = "support.rs"]
mod support;
use support::{key_data, seeded_state, stored_data, stored_key};

const P: ProviderId = ProviderId::Gemini;

#[test]
fn unauthorized_error_removes_the_active_key() {
    let data = key_data(0, &[("Default", "AIzaSy-one;AIzaSy-two;AIzaSy-three")]);
    let (state, store) = seeded_state(P, &data, "AIzaSy-one", true);

    let report = DispatchService::handle_error(&state, "Request failed: 401 Unauthorized", None)
        .expect("report");
    assert!(report.key_removed);
    assert_eq!(report.removed_key.as_deref(), Some("AIzaSy-o..."));
    assert_eq!(
        report.action,
        ErrorAction::Removed {
            new_active_key: "AIzaSy-t...".into()
        }
    );
    assert_eq!(report.class.status_code, Some(401));
    assert_eq!(report.title, "Google AI Studio (Gemini) API Error");
    assert_eq!(stored_key(&store, P), "AIzaSy-two");
    assert_eq!(
        stored_data(&store, P).sets[0].key_list(),
        vec!["AIzaSy-two".to_string(), "AIzaSy-three".to_string()]
    );
}

#[test]
fn quota_message_without_status_code_still_removes() {
    let data = key_data(0, &[("Default", "g1;g2")]);
    let (state, store) = seeded_state(P, &data, "g2", true);

    let report =
        DispatchService::handle_error(&state, "Quota exceeded for this key", Some("Oops"))
            .expect("report");
    assert!(report.key_removed);
    assert_eq!(report.title, "Oops");
    assert_eq!(stored_key(&store, P), "g1");
}

#[test]
fn other_errors_rotate_instead_of_removing() {
    let data = key_data(0, &[("Default", "g1;g2")]);
    let (state, store) = seeded_state(P, &data, "g1", true);

    let report = DispatchService::handle_error(&state, "502 Bad Gateway", None).expect("report");
    assert!(!report.key_removed);
    // 短密钥在报告中整体隐藏
    assert_eq!(report.action, ErrorAction::Rotated { key: "***".into() });
    assert_eq!(stored_key(&store, P), "g2");
    assert_eq!(stored_data(&store, P), data);
}

#[test]
fn disabled_switching_only_reports() {
    let data = key_data(0, &[("Default", "g1;g2")]);
    let (state, store) = seeded_state(P, &data, "g1", false);

    let report = DispatchService::handle_error(&state, "401 Unauthorized", None).expect("report");
    assert_eq!(report.action, ErrorAction::None);
    assert!(!report.key_removed);
    assert!(report.show_details);
    assert!(store.writes().is_empty());
}

#[test]
fn missing_active_key_does_nothing() {
    let data = key_data(0, &[("Default", "g1;g2")]);
    let (state, store) = seeded_state(P, &data, "", true);

    let report = DispatchService::handle_error(&state, "403 Forbidden", None).expect("report");
    assert_eq!(report.action, ErrorAction::None);
    assert!(store.writes().is_empty());
}

#[test]
fn no_current_provider_ignores_the_error() {
    let state = SwitcherState::new(
        Box::new(MemorySecretStore::new()),
        SwitcherSettings::default(),
    );
    assert!(DispatchService::handle_error(&state, "401", None).is_none());
}

#[test]
fn error_details_toggle_is_reported() {
    let data = key_data(0, &[("Default", "g1")]);
    let (state, _store) = seeded_state(P, &data, "g1", true);
    state
        .update_settings(|s| s.set_show_error_details(P, false))
        .expect("update settings");

    let report = DispatchService::handle_error(&state, "timeout", None).expect("report");
    assert!(!report.show_details);
    assert_eq!(report.action, ErrorAction::Kept);
}

#[test]
fn settings_ready_heals_once_per_session() {
    let data = key_data(0, &[("Default", "only")]);
    let (state, store) = seeded_state(P, &data, "", true);

    let outcome = DispatchService::on_settings_ready(&state).expect("first ready");
    assert!(matches!(outcome, RotationOutcome::Rotated { .. }));
    assert_eq!(stored_key(&store, P), "only");

    assert!(DispatchService::on_settings_ready(&state).is_none());
}

#[test]
fn settings_ready_respects_disabled_switching() {
    let data = key_data(0, &[("Default", "only")]);
    let (state, store) = seeded_state(P, &data, "", false);

    assert_eq!(
        DispatchService::on_settings_ready(&state),
        Some(RotationOutcome::Disabled)
    );
    assert!(store.writes().is_empty());
}
