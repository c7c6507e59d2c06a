use key_switcher_lib::{ProviderId, RemovalService};

#[path = "support.rs"]
mod support;
use support::{key_data, seeded_state, stored_data, stored_key};

const P: ProviderId = ProviderId::Anthropic;

#[test]
fn removing_active_key_picks_key_at_same_position() {
    let data = key_data(0, &[("Default", "a;b;c")]);
    let (state, store) = seeded_state(P, &data, "b", true);

    let outcome = RemovalService::remove(&state, P, "b");
    assert!(outcome.removed);
    assert_eq!(outcome.set_index, Some(0));
    // 剩余 [a, c]，原位置 1 对 2 取模 -> c
    assert_eq!(outcome.new_active_key.as_deref(), Some("c"));
    assert_eq!(stored_key(&store, P), "c");
    assert_eq!(
        stored_data(&store, P).sets[0].key_list(),
        vec!["a".to_string(), "c".to_string()]
    );
}

#[test]
fn removing_last_entry_wraps_to_first() {
    let data = key_data(0, &[("Default", "a;b;c")]);
    let (state, store) = seeded_state(P, &data, "c", true);

    let outcome = RemovalService::remove(&state, P, "c");
    assert_eq!(outcome.new_active_key.as_deref(), Some("a"));
    assert_eq!(stored_key(&store, P), "a");
}

#[test]
fn removing_only_key_empties_set_and_clears_active_key() {
    let data = key_data(0, &[("Default", "only")]);
    let (state, store) = seeded_state(P, &data, "only", true);

    let outcome = RemovalService::remove(&state, P, "only");
    assert!(outcome.removed);
    assert_eq!(outcome.new_active_key.as_deref(), Some(""));
    assert_eq!(stored_key(&store, P), "");

    let data = stored_data(&store, P);
    assert_eq!(data.active_set_index, 0);
    assert_eq!(data.sets.len(), 1);
    assert!(data.sets[0].key_list().is_empty());
}

#[test]
fn removing_from_inactive_set_keeps_active_key() {
    let data = key_data(0, &[("A", "k1;k2"), ("B", "k3;k4")]);
    let (state, store) = seeded_state(P, &data, "k1", true);

    let outcome = RemovalService::remove(&state, P, "k3");
    assert!(outcome.removed);
    assert_eq!(outcome.set_index, Some(1));
    assert_eq!(outcome.new_active_key.as_deref(), Some("k1"));
    assert_eq!(stored_key(&store, P), "k1");

    let data = stored_data(&store, P);
    assert_eq!(data.active_set_index, 0);
    assert_eq!(data.sets[1].key_list(), vec!["k4".to_string()]);
    assert!(!store
        .writes()
        .iter()
        .any(|(name, _)| name == P.secret_key()));
}

#[test]
fn unknown_key_is_not_removed_and_nothing_is_written() {
    let data = key_data(0, &[("Default", "a;b")]);
    let (state, store) = seeded_state(P, &data, "a", true);

    let outcome = RemovalService::remove(&state, P, "zzz");
    assert!(!outcome.removed);
    assert_eq!(outcome.new_active_key, None);
    assert!(store.writes().is_empty());
}

#[test]
fn stale_active_key_outside_all_sets_is_cleared() {
    let data = key_data(0, &[("Default", "a;b")]);
    let (state, store) = seeded_state(P, &data, "edited-out", true);

    let outcome = RemovalService::remove(&state, P, "edited-out");
    assert!(outcome.removed);
    assert_eq!(outcome.set_index, None);
    assert_eq!(outcome.new_active_key.as_deref(), Some(""));
    assert_eq!(stored_key(&store, P), "");
    assert_eq!(stored_data(&store, P), data);
}

#[test]
fn removing_twice_is_a_safe_no_op() {
    let data = key_data(0, &[("Default", "a;b;c")]);
    let (state, store) = seeded_state(P, &data, "b", true);

    assert!(RemovalService::remove(&state, P, "b").removed);
    let writes = store.writes().len();

    let second = RemovalService::remove(&state, P, "b");
    assert!(!second.removed);
    assert_eq!(store.writes().len(), writes);
}

#[test]
fn first_matching_set_wins_for_duplicated_keys() {
    let data = key_data(1, &[("A", "dup;x"), ("B", "dup;y")]);
    let (state, store) = seeded_state(P, &data, "dup", true);

    let outcome = RemovalService::remove(&state, P, "dup");
    assert_eq!(outcome.set_index, Some(0));
    let data = stored_data(&store, P);
    assert_eq!(data.sets[0].key_list(), vec!["x".to_string()]);
    assert_eq!(data.sets[1].key_list(), vec!["dup".to_string(), "y".to_string()]);
    assert_eq!(stored_key(&store, P), "dup");
}

#[test]
fn persistence_failure_aborts_before_touching_active_key() {
    let data = key_data(0, &[("Default", "a;b;c")]);
    let (state, store) = seeded_state(P, &data, "b", true);
    store.fail_writes_to(&P.data_secret_key());

    let outcome = RemovalService::remove(&state, P, "b");
    assert!(!outcome.removed);
    assert_eq!(outcome.new_active_key, None);
    assert_eq!(stored_key(&store, P), "b");
    assert_eq!(stored_data(&store, P), data);
    assert!(store.writes().is_empty());
}

#[test]
fn fetch_failure_reports_not_removed() {
    let data = key_data(0, &[("Default", "a;b")]);
    let (state, store) = seeded_state(P, &data, "a", true);
    store.set_fail_reads(true);

    let outcome = RemovalService::remove(&state, P, "a");
    assert!(!outcome.removed);
    assert_eq!(outcome.data, None);
    assert!(store.writes().is_empty());
}
