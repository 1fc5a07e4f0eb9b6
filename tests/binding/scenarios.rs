//! End-to-end flows a page runs through.

use std::sync::Arc;

use clubsync::{
    catalog, CollectionError, Draft, InMemoryCollections, ListController, ListView, Notification,
    NotificationKind, Outcome, Phase, RecordId,
};
use serde_json::json;

use crate::support::{recording_notifier, row, ProbeCollections};

#[tokio::test]
async fn tech_talk_shows_up_after_create() {
    let store = InMemoryCollections::new().with_schema(&catalog::events());
    let (notifier, recorded) = recording_notifier();
    let events = ListController::new(Arc::new(store), catalog::events(), notifier);

    events.load().await;
    assert_eq!(events.view(), ListView::Empty);

    let draft = Draft::new()
        .with("title", "Tech Talk")
        .with("date", "2024-09-20")
        .with("time", "14:00")
        .with("duration", 60)
        .with("location", "Hall A")
        .with("description", "AI talk");
    assert!(events.submit_create(draft).await.is_applied());

    let rows = events.rows();
    assert_eq!(rows.len(), 1);
    assert!(matches!(rows[0].id, RecordId::Int(_)));
    assert_eq!(rows[0].str("title"), Some("Tech Talk"));
    assert_eq!(
        recorded(),
        vec![Notification::success("Event added successfully")]
    );
}

#[tokio::test]
async fn remove_drops_row_without_refetch() {
    let store = InMemoryCollections::new();
    store
        .seed(
            "clubs",
            [
                row(4, json!({ "name": "Math", "category": "Academic" })),
                row(5, json!({ "name": "Chess", "category": "Games" })),
            ],
        )
        .unwrap();
    let probe = Arc::new(ProbeCollections::new(store));
    let (notifier, recorded) = recording_notifier();
    let clubs = ListController::new(probe.clone(), catalog::clubs(), notifier);
    clubs.load().await;
    let lists_before = probe.calls("list");

    let outcome = clubs.remove(&RecordId::Int(5)).await;

    assert_eq!(outcome, Outcome::Applied(RecordId::Int(5)));
    assert!(clubs.row(&RecordId::Int(5)).is_none());
    assert_eq!(clubs.len(), 1);
    assert_eq!(probe.calls("list"), lists_before);
    assert_eq!(clubs.phase(), Phase::Ready);

    let notes = recorded();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].kind, NotificationKind::Success);
    assert_eq!(notes[0].message, "Club deleted successfully");
}

#[tokio::test]
async fn rejected_create_emits_exactly_one_error() {
    let probe = Arc::new(ProbeCollections::default());
    let (notifier, recorded) = recording_notifier();
    let gallery = ListController::new(probe.clone(), catalog::gallery(), notifier);
    gallery.load().await;
    let before = gallery.len();

    probe.fail_next(
        "create",
        CollectionError::remote_write("gallery", "permission denied for table gallery"),
    );
    let draft = Draft::new()
        .with("title", "Sunset")
        .with("image_url", "https://cdn.example.org/sunset.jpg");
    let outcome = gallery.submit_create(draft).await;

    assert!(outcome.is_failed());
    assert_eq!(gallery.len(), before);
    let notes = recorded();
    assert_eq!(notes.len(), 1);
    assert!(notes[0].is_error());
    assert_eq!(
        notes[0].message,
        "failed to add gallery item: gallery rejected the operation: permission denied for table gallery"
    );
}

#[tokio::test]
async fn feedback_flow_with_every_form_input() {
    let store = InMemoryCollections::new().with_schema(&catalog::feedback());
    let (notifier, recorded) = recording_notifier();
    let feedback = ListController::new(Arc::new(store), catalog::feedback(), notifier);
    feedback.load().await;

    let mut form = clubsync::FormBinding::for_controller(&feedback);
    form.reset(feedback.schema().blank_draft());
    form.set_input("name", "Ada");
    form.set_input("email", "ada@example.edu");
    form.set_input("event_name", "Tech Talk");
    form.set_input("rating", "5");
    form.set_input("would_recommend", "on");

    let created = form.submit(&feedback).await.unwrap().applied().unwrap();
    assert_eq!(created.fields.get("rating"), Some(&json!(5)));
    assert_eq!(created.fields.get("would_recommend"), Some(&json!(true)));
    assert_eq!(created.fields.get("comments"), Some(&json!(null)));
    assert_eq!(feedback.len(), 1);
    assert_eq!(recorded().len(), 1);
}

#[cfg(feature = "emitter")]
#[tokio::test]
async fn emitter_notifier_reaches_listeners() {
    use std::sync::Mutex;
    use std::time::Duration;

    use clubsync::EmitterNotifier;

    let received = Arc::new(Mutex::new(Vec::new()));
    let notifier = Arc::new(EmitterNotifier::default());
    notifier.on_notification({
        let received = received.clone();
        move |n: Notification| received.lock().unwrap().push(n)
    });

    let clubs = ListController::new(
        Arc::new(InMemoryCollections::new()),
        catalog::clubs(),
        notifier,
    );
    let draft = Draft::new().with("name", "Chess").with("category", "Games");
    clubs.submit_create(draft).await;

    for _ in 0..200 {
        if !received.lock().unwrap().is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(
        received.lock().unwrap().clone(),
        vec![Notification::success("Club added successfully")]
    );
}
