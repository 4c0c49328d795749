use super::*;
use std::time::Duration;
use stride_core::model::{HistoryAction, HistoryRecord, InverseAction, Priority, TaskKind};
use stride_remote::MemoryStore;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::sleep;

fn p(n: i64) -> Priority {
    Priority::new(n).unwrap()
}

fn coordinator(store: &Arc<MemoryStore>) -> (SyncCoordinator, UnboundedReceiver<SyncEvent>) {
    let store: Arc<dyn ReminderStore> = store.clone();
    SyncCoordinator::new(store, &Config::default())
}

fn drain(rx: &mut UnboundedReceiver<SyncEvent>) -> Vec<SyncEvent> {
    let mut out = Vec::new();
    while let Ok(event) = rx.try_recv() {
        out.push(event);
    }
    out
}

fn texts(coord: &SyncCoordinator) -> Vec<String> {
    coord
        .queue_view()
        .iter()
        .map(|t| t.text().to_string())
        .collect()
}

/// Let spawned tasks run up to their next timer without moving the clock
/// by any meaningful amount.
async fn settle() {
    sleep(Duration::from_millis(1)).await;
}

// --- submit ---

#[tokio::test(start_paused = true)]
async fn test_submit_orders_by_priority() {
    let store = Arc::new(MemoryStore::default());
    let (coord, _rx) = coordinator(&store);
    coord.start().await.unwrap();

    let out = coord.submit(p(5), "Do 20 Pushups").await.unwrap();
    assert_eq!(out.kind, TaskKind::Workout);
    assert!(out.link.as_deref().unwrap().ends_with("Do%2020%20Pushups%20tutorial"));
    assert!(out.history_synced);

    coord.submit(p(9), "  Submit Report ").await.unwrap();
    assert_eq!(texts(&coord), vec!["Submit Report", "Do 20 Pushups"]);
    assert!(coord.queue_view().iter().all(|t| !t.is_pending()));

    let history = coord.history_view();
    assert_eq!(history[0].action.label(), "Added: Submit Report");
    assert_eq!(history[1].action.label(), "Added: Do 20 Pushups");
    assert_eq!(store.history().len(), 2);

    // The authoritative state agrees after a refresh.
    coord.refresh().await.unwrap();
    assert_eq!(texts(&coord), vec!["Submit Report", "Do 20 Pushups"]);
    assert_eq!(coord.history_view().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_submit_rejects_blank_text() {
    let store = Arc::new(MemoryStore::default());
    let (coord, _rx) = coordinator(&store);

    let err = coord.submit(p(3), "   ").await.unwrap_err();
    assert!(matches!(err, StrideError::EmptyText));
    assert!(coord.queue_view().is_empty());
    assert_eq!(store.create_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_failed_create_rolls_back() {
    let store = Arc::new(MemoryStore::default());
    let (coord, mut rx) = coordinator(&store);
    coord.submit(p(4), "Stretch").await.unwrap();
    drain(&mut rx);

    store.fail_next_creates(1);
    let err = coord.submit(p(8), "Pay rent").await.unwrap_err();
    assert!(matches!(err, StrideError::RemoteCreateFailure(_)));

    assert_eq!(texts(&coord), vec!["Stretch"]);
    let history = coord.history_view();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].action.label(), "Added: Stretch");
    assert_eq!(store.history().len(), 1);

    let events = drain(&mut rx);
    assert!(events
        .iter()
        .any(|e| matches!(e, SyncEvent::CreateRolledBack { .. })));
}

#[tokio::test(start_paused = true)]
async fn test_pending_task_visible_before_create_settles() {
    let store = Arc::new(MemoryStore::default());
    store.set_create_delay(Duration::from_millis(200));
    let (coord, _rx) = coordinator(&store);

    let c = coord.clone();
    let handle = tokio::spawn(async move { c.submit(p(6), "Yoga").await });
    settle().await;

    let view = coord.queue_view();
    assert_eq!(view.len(), 1);
    assert!(view[0].is_pending());

    handle.await.unwrap().unwrap();
    assert!(!coord.queue_view()[0].is_pending());
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_submits_reach_store_one_at_a_time() {
    let store = Arc::new(MemoryStore::default());
    store.set_create_delay(Duration::from_millis(50));
    let (coord, _rx) = coordinator(&store);

    let (a, b, c) = tokio::join!(
        coord.submit(p(2), "first"),
        coord.submit(p(2), "second"),
        coord.submit(p(7), "third"),
    );
    a.unwrap();
    b.unwrap();
    c.unwrap();

    assert_eq!(store.max_creates_in_flight(), 1);
    let stored: Vec<String> = store.reminders().into_iter().map(|(_, t)| t).collect();
    assert_eq!(stored, vec!["first", "second", "third"]);
    assert_eq!(texts(&coord), vec!["third", "first", "second"]);
}

// --- refresh ---

#[tokio::test(start_paused = true)]
async fn test_start_loads_remote_state() {
    let store = Arc::new(MemoryStore::default());
    store.seed_reminders(vec![
        (p(2), "Drink water".to_string()),
        (p(9), "Submit Report".to_string()),
    ]);
    let (coord, mut rx) = coordinator(&store);
    coord.start().await.unwrap();

    assert_eq!(texts(&coord), vec!["Submit Report", "Drink water"]);
    let events = drain(&mut rx);
    assert!(events.contains(&SyncEvent::QueueChanged));
    assert!(events.contains(&SyncEvent::HistoryChanged));
}

#[tokio::test(start_paused = true)]
async fn test_refresh_waits_for_inflight_create() {
    let store = Arc::new(MemoryStore::default());
    store.set_create_delay(Duration::from_millis(200));
    let (coord, _rx) = coordinator(&store);

    let c = coord.clone();
    let submit = tokio::spawn(async move { c.submit(p(5), "Plank").await });
    settle().await;

    coord.refresh().await.unwrap();
    assert!(submit.is_finished());
    let view = coord.queue_view();
    assert_eq!(view.len(), 1);
    assert_eq!(view[0].text(), "Plank");
    assert!(!view[0].is_pending());
}

#[tokio::test(start_paused = true)]
async fn test_refresh_keeps_pending_submission() {
    let store = Arc::new(MemoryStore::default());
    store.set_create_delay(Duration::from_millis(100));
    let (coord, _rx) = coordinator(&store);

    let c = coord.clone();
    let first = tokio::spawn(async move { c.submit(p(3), "Walk").await });
    settle().await;
    let c = coord.clone();
    let refresh = tokio::spawn(async move { c.refresh().await });
    settle().await;
    let c = coord.clone();
    let second = tokio::spawn(async move { c.submit(p(8), "Call mom").await });
    settle().await;

    // The refresh runs between the two creates: "Call mom" is still pending
    // and must survive the merge.
    refresh.await.unwrap().unwrap();
    let view = coord.queue_view();
    assert_eq!(texts(&coord), vec!["Call mom", "Walk"]);
    assert!(view[0].is_pending());
    assert!(!view[1].is_pending());
    assert_eq!(coord.history_view().len(), 2);

    first.await.unwrap().unwrap();
    second.await.unwrap().unwrap();
    coord.refresh().await.unwrap();
    assert_eq!(texts(&coord), vec!["Call mom", "Walk"]);
    assert_eq!(coord.history_view().len(), 2);
}

// --- undo ---

#[tokio::test(start_paused = true)]
async fn test_undo_empty_log() {
    let store = Arc::new(MemoryStore::default());
    let (coord, _rx) = coordinator(&store);
    assert_eq!(coord.undo().await.unwrap(), UndoOutcome::NothingToUndo);
}

#[tokio::test(start_paused = true)]
async fn test_undo_pops_most_recent_entry() {
    let store = Arc::new(MemoryStore::default());
    let (coord, _rx) = coordinator(&store);
    coord.submit(p(5), "Squats").await.unwrap();
    coord.submit(p(7), "Email boss").await.unwrap();

    match coord.undo().await.unwrap() {
        UndoOutcome::Undone { entry, inverse } => {
            assert!(matches!(
                entry.action,
                HistoryAction::AddReminder { ref text, .. } if text == "Email boss"
            ));
            assert_eq!(
                inverse,
                Some(InverseAction::RemoveReminder {
                    priority: p(7),
                    text: "Email boss".to_string(),
                })
            );
        }
        other => panic!("expected Undone, got {other:?}"),
    }

    let history = coord.history_view();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].action.label(), "Added: Squats");
    assert_eq!(store.history().len(), 1);
    // Undo prunes history only.
    assert_eq!(coord.queue_view().len(), 2);

    coord.undo().await.unwrap();
    assert_eq!(coord.undo().await.unwrap(), UndoOutcome::NothingToUndo);
    assert!(coord.history_view().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_undo_after_refresh_matches_legacy_record() {
    let store = Arc::new(MemoryStore::default());
    store.seed_history(vec![HistoryRecord {
        action: HistoryAction::AddWorkout {
            title: "Leg Day".to_string(),
        },
        time: "7:00".to_string(),
        ordinal: None,
    }]);
    let (coord, _rx) = coordinator(&store);
    coord.start().await.unwrap();
    assert_eq!(coord.history_view().len(), 1);

    match coord.undo().await.unwrap() {
        UndoOutcome::Undone { entry, inverse } => {
            assert_eq!(entry.action.label(), "Added Workout: Leg Day");
            assert_eq!(inverse, None);
        }
        other => panic!("expected Undone, got {other:?}"),
    }
    assert!(coord.history_view().is_empty());
}

fn record(message: &str, ordinal: Option<u64>) -> HistoryRecord {
    HistoryRecord {
        action: HistoryAction::Note {
            message: message.to_string(),
        },
        time: String::new(),
        ordinal,
    }
}

fn history_labels(coord: &SyncCoordinator) -> Vec<String> {
    coord
        .history_view()
        .iter()
        .map(|e| e.action.label())
        .collect()
}

fn store_labels(store: &MemoryStore) -> Vec<String> {
    store.history().iter().map(|r| r.action.label()).collect()
}

#[tokio::test(start_paused = true)]
async fn test_undo_mirrors_remote_pop_over_mixed_ordinals() {
    let store = Arc::new(MemoryStore::default());
    store.seed_history(vec![
        record("bottom", Some(1)),
        record("legacy", None),
        record("top", Some(2)),
    ]);
    let (coord, _rx) = coordinator(&store);
    coord.start().await.unwrap();
    assert_eq!(history_labels(&coord), vec!["top", "legacy", "bottom"]);

    match coord.undo().await.unwrap() {
        UndoOutcome::Undone { entry, .. } => assert_eq!(entry.action.label(), "top"),
        other => panic!("expected Undone, got {other:?}"),
    }
    assert_eq!(history_labels(&coord), vec!["legacy", "bottom"]);
    assert_eq!(history_labels(&coord), store_labels(&store));

    coord.undo().await.unwrap();
    assert_eq!(history_labels(&coord), vec!["bottom"]);
    assert_eq!(history_labels(&coord), store_labels(&store));
}

#[tokio::test(start_paused = true)]
async fn test_undo_after_load_then_local_push() {
    let store = Arc::new(MemoryStore::default());
    store.seed_history(vec![record("older", Some(5)), record("legacy", None)]);
    let (coord, _rx) = coordinator(&store);
    coord.start().await.unwrap();

    coord.submit(p(3), "Stretch").await.unwrap();
    assert_eq!(
        history_labels(&coord),
        vec!["Added: Stretch", "legacy", "older"]
    );

    coord.undo().await.unwrap();
    assert_eq!(history_labels(&coord), store_labels(&store));
    coord.undo().await.unwrap();
    assert_eq!(history_labels(&coord), vec!["older"]);
    assert_eq!(history_labels(&coord), store_labels(&store));
}

#[tokio::test(start_paused = true)]
async fn test_inverse_locates_reminder_after_refresh() {
    let store = Arc::new(MemoryStore::default());
    let (coord, _rx) = coordinator(&store);
    coord.submit(p(4), "Walk dog").await.unwrap();
    let rent = coord.submit(p(9), "Pay rent").await.unwrap();
    coord.refresh().await.unwrap();

    let UndoOutcome::Undone { inverse, .. } = coord.undo().await.unwrap() else {
        panic!("expected Undone");
    };
    let task = coord.locate(&inverse.unwrap()).unwrap();
    assert_eq!(task.text(), "Pay rent");
    assert_eq!(task.priority(), p(9));
    // Refresh renumbered the queue; the inverse still finds the task.
    assert_ne!(task.id(), rent.id);
    assert_eq!(coord.queue_view()[0].id(), task.id());
}

#[tokio::test(start_paused = true)]
async fn test_inverse_resolves_in_another_session() {
    let store = Arc::new(MemoryStore::default());
    let (first, _rx) = coordinator(&store);
    first.submit(p(4), "Walk dog").await.unwrap();
    first.shutdown();

    let (second, _rx2) = coordinator(&store);
    second.start().await.unwrap();
    second.submit(p(9), "Pay rent").await.unwrap();

    second.undo().await.unwrap();
    let UndoOutcome::Undone { entry, inverse } = second.undo().await.unwrap() else {
        panic!("expected Undone");
    };
    assert_eq!(entry.action.label(), "Added: Walk dog");
    let task = second.locate(&inverse.unwrap()).unwrap();
    assert_eq!(task.text(), "Walk dog");
    assert_eq!(task.priority(), p(4));
    assert!(second.history_view().is_empty());
}

// --- search ---

#[tokio::test(start_paused = true)]
async fn test_rapid_keystrokes_dispatch_once() {
    let store = Arc::new(MemoryStore::default());
    let (coord, mut rx) = coordinator(&store);

    coord.keystroke("c");
    sleep(Duration::from_millis(100)).await;
    coord.keystroke("ch");
    sleep(Duration::from_millis(100)).await;
    let seq = coord.keystroke("che");
    assert_eq!(coord.search_phase(), SearchPhase::Debouncing(seq));

    sleep(Duration::from_millis(400)).await;

    assert_eq!(store.searched(), vec!["che".to_string()]);
    let applied: Vec<SyncEvent> = drain(&mut rx)
        .into_iter()
        .filter(|e| matches!(e, SyncEvent::SuggestionsApplied { .. }))
        .collect();
    assert_eq!(applied.len(), 1);
    assert!(matches!(
        &applied[0],
        SyncEvent::SuggestionsApplied { seq: s, query, .. } if *s == seq && query == "che"
    ));
    assert!(coord.suggestions().contains(&"Cheddar Cheese".to_string()));
    assert_eq!(coord.search_phase(), SearchPhase::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_stale_response_is_discarded() {
    let store = Arc::new(MemoryStore::default());
    store.set_search_delay("pu", Duration::from_millis(500));
    store.set_search_delay("pull", Duration::from_millis(10));
    let (coord, mut rx) = coordinator(&store);

    let first = coord.keystroke("pu");
    sleep(Duration::from_millis(350)).await;
    assert_eq!(coord.search_phase(), SearchPhase::Fetching(first));

    let second = coord.keystroke("pull");
    sleep(Duration::from_millis(1000)).await;

    assert_eq!(store.searched(), vec!["pu".to_string(), "pull".to_string()]);
    let events = drain(&mut rx);
    let applied: Vec<u64> = events
        .iter()
        .filter_map(|e| match e {
            SyncEvent::SuggestionsApplied { seq, .. } => Some(*seq),
            _ => None,
        })
        .collect();
    assert_eq!(applied, vec![second]);
    assert!(events.contains(&SyncEvent::SuggestionsDiscarded { seq: first }));

    let suggestions = coord.suggestions();
    assert!(suggestions.contains(&"Pullups".to_string()));
    assert!(!suggestions.contains(&"Pushups".to_string()));
}

#[tokio::test(start_paused = true)]
async fn test_blank_query_clears_without_dispatch() {
    let store = Arc::new(MemoryStore::default());
    let (coord, _rx) = coordinator(&store);

    coord.keystroke("yog");
    sleep(Duration::from_millis(400)).await;
    assert_eq!(coord.suggestions().first().map(String::as_str), Some("Yoga"));

    coord.keystroke("");
    assert!(coord.suggestions().is_empty());
    sleep(Duration::from_millis(400)).await;
    assert_eq!(store.searched(), vec!["yog".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_cancels_pending_timer() {
    let store = Arc::new(MemoryStore::default());
    let (coord, _rx) = coordinator(&store);

    coord.keystroke("squat");
    coord.shutdown();
    sleep(Duration::from_millis(400)).await;
    assert!(store.searched().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_failed_search_reports_and_keeps_suggestions() {
    let store = Arc::new(MemoryStore::default());
    let (coord, mut rx) = coordinator(&store);

    coord.keystroke("squat");
    sleep(Duration::from_millis(400)).await;
    let before = coord.suggestions();
    assert!(!before.is_empty());
    drain(&mut rx);

    store.fail_next_searches(1);
    let seq = coord.keystroke("squats");
    sleep(Duration::from_millis(400)).await;

    let events = drain(&mut rx);
    assert!(events.iter().any(|e| matches!(
        e,
        SyncEvent::SuggestionsFailed { seq: s, reason } if *s == seq && reason.contains("rejected")
    )));
    assert!(!events
        .iter()
        .any(|e| matches!(e, SyncEvent::SuggestionsApplied { .. })));
    assert_eq!(coord.search_phase(), SearchPhase::Idle);
    assert_eq!(coord.suggestions(), before);
}

#[tokio::test(start_paused = true)]
async fn test_superseded_failed_search_is_discarded() {
    let store = Arc::new(MemoryStore::default());
    store.set_search_delay("pu", Duration::from_millis(500));
    store.fail_next_searches(1);
    let (coord, mut rx) = coordinator(&store);

    let first = coord.keystroke("pu");
    sleep(Duration::from_millis(350)).await;
    let second = coord.keystroke("pull");
    sleep(Duration::from_millis(1000)).await;

    let events = drain(&mut rx);
    assert!(events.contains(&SyncEvent::SuggestionsDiscarded { seq: first }));
    assert!(!events
        .iter()
        .any(|e| matches!(e, SyncEvent::SuggestionsFailed { .. })));
    assert!(events.iter().any(|e| matches!(
        e,
        SyncEvent::SuggestionsApplied { seq, .. } if *seq == second
    )));
}
