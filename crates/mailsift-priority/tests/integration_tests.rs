//! Integration tests for the Priority Engine
//!
//! Runs extraction, scoring and highlighting together over snapshot trees to
//! check that marking the top records never changes what the next pass reads.

use chrono::{DateTime, TimeZone, Utc};
use mailsift_domain::{DocumentTree, EmailRecord, KeywordSet, Selector};
use mailsift_extractor::{ExtractorConfig, NodeSpec, RecordExtractor, SnapshotTree};
use mailsift_priority::{Highlighter, PriorityEngine, BADGE_CLASS};

const GMAIL: &str = "https://mail.google.com/mail/u/0/#inbox";
const OUTLOOK: &str = "https://outlook.live.com/mail/0/inbox";

type Fields = (String, String, String, String, u8);

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
}

fn gmail_row(sender: &str, subject: &str, snippet: &str) -> NodeSpec {
    NodeSpec::element("tr")
        .class("zA")
        .class("zE")
        .child(NodeSpec::element("td").child(NodeSpec::element("span").class("yX").class("xY").text(sender)))
        .child(
            NodeSpec::element("td")
                .child(NodeSpec::element("span").class("bog").text(subject))
                .child(NodeSpec::element("span").class("y2").text(snippet)),
        )
}

/// Rows without identity attributes or timestamps, so ids are fingerprints
/// and every record falls back to the extraction time
fn gmail_inbox() -> SnapshotTree {
    let table = NodeSpec::element("table")
        .child(gmail_row("Alice", "Urgent budget", "Numbers attached"))
        .child(gmail_row("Bob", "Team meeting", "Agenda below"));
    SnapshotTree::from_spec(NodeSpec::element("div").attr("role", "main").child(table))
}

fn outlook_inbox() -> SnapshotTree {
    let row = NodeSpec::element("div")
        .attr("role", "row")
        .child(NodeSpec::element("span").attr("title", "Urgent budget").text("Urgent budget"));
    SnapshotTree::from_spec(NodeSpec::element("div").attr("role", "main").child(row))
}

fn score(extractor: &RecordExtractor, tree: &SnapshotTree) -> Vec<EmailRecord> {
    let records = extractor.extract_at(tree, fixed_now());
    PriorityEngine::default_config().prioritize_at(records, &KeywordSet::defaults(), fixed_now())
}

fn fields(records: &[EmailRecord]) -> Vec<Fields> {
    records
        .iter()
        .map(|r| {
            (
                r.id.to_string(),
                r.subject.clone(),
                r.sender.clone(),
                r.timestamp.clone(),
                r.priority,
            )
        })
        .collect()
}

fn badges(tree: &SnapshotTree) -> usize {
    tree.select_all(tree.root(), &Selector::class(BADGE_CLASS)).len()
}

#[test]
fn test_highlighting_does_not_change_gmail_extraction() {
    let extractor = RecordExtractor::for_url(GMAIL, ExtractorConfig::default()).unwrap();
    let mut tree = gmail_inbox();

    let before = score(&extractor, &tree);
    assert_eq!(before.len(), 2);
    assert!(before.iter().all(|r| r.id.as_str().starts_with("fp-")));

    let outcome = Highlighter::default().apply(&mut tree, &before);
    assert_eq!(outcome.marked, 2);
    assert_eq!(badges(&tree), 2);

    let after = score(&extractor, &tree);
    assert_eq!(fields(&after), fields(&before));
}

#[test]
fn test_highlighting_does_not_change_outlook_extraction() {
    let extractor = RecordExtractor::for_url(OUTLOOK, ExtractorConfig::default()).unwrap();
    let mut tree = outlook_inbox();

    let before = score(&extractor, &tree);
    assert_eq!(before.len(), 1);
    assert_eq!(before[0].subject, "Urgent budget");

    Highlighter::default().apply(&mut tree, &before);
    assert_eq!(badges(&tree), 1);

    let after = score(&extractor, &tree);
    assert_eq!(after[0].subject, "Urgent budget");
    assert_eq!(after[0].sender, "Urgent budget");
    assert_eq!(fields(&after), fields(&before));
}

#[test]
fn test_repeated_cycles_are_stable() {
    let extractor = RecordExtractor::for_url(GMAIL, ExtractorConfig::default()).unwrap();
    let highlighter = Highlighter::default();
    let mut tree = gmail_inbox();

    let first = score(&extractor, &tree);
    for _ in 0..3 {
        let records = score(&extractor, &tree);
        assert_eq!(fields(&records), fields(&first));
        highlighter.apply(&mut tree, &records);
    }
    assert_eq!(badges(&tree), 2);
}
