//! Integration tests for the widget controller

use chrono::{DateTime, TimeZone, Utc};
use mailsift_domain::{EmailRecord, RecordId};
use mailsift_widget::{DisplayController, MemorySurface, RenderedView, RowBody};

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap()
}

fn widget() -> DisplayController<MemorySurface> {
    DisplayController::new(MemorySurface::new()).with_clock(fixed_now)
}

fn record(id: &str, priority: u8) -> EmailRecord {
    let mut record = EmailRecord::new(
        id,
        format!("Subject {}", id),
        "Sender",
        "Preview text",
        "2025-03-10T11:45:00Z",
        false,
    );
    record.priority = priority;
    record
}

fn rows(view: Option<&RenderedView>) -> Vec<mailsift_widget::RenderedRow> {
    match view {
        Some(RenderedView::List { rows }) => rows.clone(),
        other => panic!("expected list view, got {:?}", other),
    }
}

fn expanded_flag(view: Option<&RenderedView>, id: &str) -> bool {
    let row = rows(view).into_iter().find(|row| row.id == id).unwrap();
    match row.body {
        RowBody::Summary { expanded, .. } => expanded,
        RowBody::Snippet { .. } => panic!("row {} has no summary", id),
    }
}

#[test]
fn test_toggle_expanded_twice_restores_state() {
    let mut widget = widget();
    let id = RecordId::new("a");
    widget.set_top_emails(vec![record("a", 50)]);
    widget.set_summary(id.clone(), "Budget approved for Q3.");

    assert!(!expanded_flag(widget.current_view(), "a"));
    assert!(widget.toggle_expanded(&id));
    assert!(expanded_flag(widget.current_view(), "a"));
    assert!(!widget.toggle_expanded(&id));
    assert!(!expanded_flag(widget.current_view(), "a"));
    assert!(!widget.state().is_expanded(&id));

    // Summary view, expanded view, collapsed view, plus the initial list.
    assert_eq!(widget.surface().present_count(), 4);
}

#[test]
fn test_summaries_survive_reordering() {
    let mut widget = widget();
    widget.set_top_emails(vec![record("a", 50), record("b", 40)]);
    widget.set_summary(RecordId::new("b"), "Lunch on Friday.");
    widget.toggle_expanded(&RecordId::new("b"));

    widget.set_top_emails(vec![record("b", 60), record("a", 50)]);
    let listed = rows(widget.current_view());
    assert_eq!(listed[0].id, "b");
    assert_eq!(listed[0].rank, 1);
    assert!(matches!(listed[0].body, RowBody::Summary { expanded: true, .. }));
    assert!(listed[1].can_summarize());
}

#[test]
fn test_late_summary_for_unlisted_record_is_ignored_by_render() {
    let mut widget = widget();
    widget.set_top_emails(vec![record("a", 50)]);
    let before = widget.surface().present_count();

    widget.set_summary(RecordId::new("gone"), "Stale result");
    assert_eq!(widget.surface().present_count(), before);
    assert_eq!(widget.state().summary(&RecordId::new("gone")), Some("Stale result"));

    // If the record comes back, its summary shows.
    widget.set_top_emails(vec![record("gone", 30)]);
    assert!(!rows(widget.current_view())[0].can_summarize());
}

#[test]
fn test_last_view_always_matches_latest_state() {
    let mut widget = widget();
    widget.set_loading(true);
    widget.set_top_emails(vec![record("a", 50)]);
    widget.set_summary(RecordId::new("a"), "Done.");
    widget.set_loading(true);
    widget.set_loading(false);

    let listed = rows(widget.surface().last());
    assert_eq!(listed.len(), 1);
    assert!(matches!(&listed[0].body, RowBody::Summary { full, .. } if full == "Done."));
    assert_eq!(listed[0].time, "now");
}

#[test]
fn test_view_serializes_with_tags() {
    let mut widget = widget();
    widget.set_error(Some("Inbox could not be read".to_string()));
    let json = serde_json::to_value(widget.current_view().unwrap()).unwrap();
    assert_eq!(json["view"], "error");
    assert_eq!(json["retry_label"], "Retry");
}
