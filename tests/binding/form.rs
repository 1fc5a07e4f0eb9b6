use std::sync::Arc;

use clubsync::{
    catalog, CollectionError, FormBinding, InMemoryCollections, ListController, Outcome,
    RecordId, SubmitError,
};
use serde_json::json;

use crate::support::{recording_notifier, row, ProbeCollections};

fn announcements(
    probe: Arc<ProbeCollections>,
) -> (
    ListController<ProbeCollections>,
    impl Fn() -> Vec<clubsync::Notification>,
) {
    let (notifier, recorded) = recording_notifier();
    (
        ListController::new(probe, catalog::announcements(), notifier),
        recorded,
    )
}

#[tokio::test]
async fn submit_creates_and_clears_draft() {
    let probe = Arc::new(ProbeCollections::default());
    let (controller, recorded) = announcements(probe.clone());
    controller.load().await;

    let mut form = FormBinding::for_controller(&controller);
    form.set_input("title", "  Club fair  ");
    form.set_input("content", "Booths open at noon.\n");
    form.set_input("date", "2024-09-12");

    let outcome = form.submit(&controller).await.unwrap();
    let created = outcome.applied().unwrap();

    assert_eq!(created.str("title"), Some("Club fair"));
    assert_eq!(created.str("content"), Some("Booths open at noon.\n"));
    assert!(form.draft().is_empty());
    assert_eq!(controller.len(), 1);
    assert_eq!(
        recorded().last().map(|n| n.message.as_str()),
        Some("Announcement added successfully")
    );
}

#[tokio::test]
async fn blank_required_field_never_reaches_the_store() {
    let probe = Arc::new(ProbeCollections::default());
    let (controller, recorded) = announcements(probe.clone());

    let mut form = FormBinding::for_controller(&controller);
    form.set_field("title", "Club fair");
    form.set_input("content", "   ");

    let err = form.submit(&controller).await.unwrap_err();
    assert_eq!(err.missing, vec!["content".to_string()]);
    assert_eq!(probe.calls("create"), 0);
    assert!(recorded().is_empty());
    assert_eq!(form.draft().get("title"), Some(&json!("Club fair")));
}

#[tokio::test]
async fn failed_submit_keeps_draft_for_another_try() {
    let probe = Arc::new(ProbeCollections::default());
    let (controller, recorded) = announcements(probe.clone());
    probe.fail_next(
        "create",
        CollectionError::connectivity("announcements", "request timed out"),
    );

    let mut form = FormBinding::for_controller(&controller);
    form.set_field("title", "Club fair");
    form.set_field("content", "Booths open at noon.");

    let outcome = form.submit(&controller).await.unwrap();
    assert!(matches!(outcome, Outcome::Failed(SubmitError::Remote(_))));
    assert_eq!(form.draft().len(), 2);
    assert_eq!(recorded().len(), 1);

    let outcome = form.submit(&controller).await.unwrap();
    assert!(outcome.is_applied());
    assert!(form.draft().is_empty());
}

#[tokio::test]
async fn editing_updates_the_target_row() {
    let store = InMemoryCollections::new();
    store
        .seed(
            "announcements",
            [row(
                8,
                json!({
                    "title": "Club fair",
                    "content": "Booths open at noon.",
                    "date": "2024-09-12",
                    "created_at": "2024-09-01T10:00:00.000Z"
                }),
            )],
        )
        .unwrap();
    let probe = Arc::new(ProbeCollections::new(store));
    let (controller, _) = announcements(probe.clone());
    controller.load().await;

    let mut form = FormBinding::for_controller(&controller);
    form.edit(&controller.rows()[0]);
    assert_eq!(form.edit_target(), Some(&RecordId::Int(8)));
    assert!(form.draft().get("created_at").is_none());

    form.set_field("content", "Booths open at one.");
    let outcome = form.submit(&controller).await.unwrap();
    assert!(outcome.is_applied());
    assert_eq!(probe.calls("update"), 1);
    assert_eq!(probe.calls("create"), 0);
    assert!(!form.is_editing());

    let shown = controller.row(&RecordId::Int(8)).unwrap();
    assert_eq!(shown.str("content"), Some("Booths open at one."));
    assert_eq!(shown.str("title"), Some("Club fair"));
    assert_eq!(shown.created_at(), Some("2024-09-01T10:00:00.000Z"));
}

#[tokio::test]
async fn reset_replaces_draft_only() {
    let probe = Arc::new(ProbeCollections::default());
    let (controller, _) = announcements(probe);

    let mut form = FormBinding::for_controller(&controller);
    form.set_field("title", "Draft one");
    form.reset(controller.schema().blank_draft());

    assert_eq!(form.draft().get("title"), Some(&json!(null)));
    assert!(form.validate().is_err());
}
