//! Integration tests for the CLI commands
//!
//! Drives the command functions against snapshot files and config files in a
//! temporary directory. Consent stays off so no provider is ever contacted.

use mailsift_cli::cli::{ConsentAction, ConsentArgs, RunArgs, ScoreArgs, SnapshotArgs};
use mailsift_cli::commands::{execute_consent, execute_run, execute_score, load_snapshot};
use mailsift_cli::config::OutputFormat;
use mailsift_cli::{CliError, Config, Formatter};
use mailsift_extractor::NodeSpec;
use mailsift_priority::HIGHLIGHT_CLASS;
use std::fs;
use std::path::{Path, PathBuf};

const GMAIL: &str = "https://mail.google.com/mail/u/0/#inbox";

fn gmail_row(id: &str, sender: &str, subject: &str) -> NodeSpec {
    NodeSpec::element("tr")
        .class("zA")
        .class("zE")
        .attr("data-thread-perm-id", id)
        .child(NodeSpec::element("td").child(NodeSpec::element("span").class("yX").class("xY").text(sender)))
        .child(NodeSpec::element("td").child(NodeSpec::element("span").class("bog").text(subject)))
}

fn write_snapshot(dir: &Path) -> PathBuf {
    let table = NodeSpec::element("table")
        .child(gmail_row("t1", "Alice", "Urgent: budget deadline"))
        .child(gmail_row("t2", "Bob", "Lunch"));
    let spec = NodeSpec::element("div").attr("role", "main").child(table);

    let path = dir.join("inbox.json");
    fs::write(&path, serde_json::to_string(&spec).unwrap()).unwrap();
    path
}

fn snapshot_args(snapshot: PathBuf, url: &str) -> SnapshotArgs {
    SnapshotArgs {
        snapshot,
        url: url.to_string(),
        keywords: Vec::new(),
    }
}

#[tokio::test]
async fn test_run_writes_highlighted_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot = write_snapshot(dir.path());
    let output = dir.path().join("out.json");
    let formatter = Formatter::new(OutputFormat::Table, false);

    let args = RunArgs {
        input: snapshot_args(snapshot, GMAIL),
        output: Some(output.clone()),
    };
    execute_run(args, &Config::default(), None, &formatter).await.unwrap();

    let written = fs::read_to_string(&output).unwrap();
    assert_eq!(written.matches(HIGHLIGHT_CLASS).count(), 2);

    // The written snapshot is itself a valid input
    assert!(load_snapshot(&output).is_ok());
}

#[tokio::test]
async fn test_run_without_highlighting_leaves_snapshot_clean() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot = write_snapshot(dir.path());
    let output = dir.path().join("out.json");
    let formatter = Formatter::new(OutputFormat::Json, false);

    let mut config = Config::default();
    config.features.highlight_mode = false;

    let args = RunArgs {
        input: snapshot_args(snapshot, GMAIL),
        output: Some(output.clone()),
    };
    execute_run(args, &config, None, &formatter).await.unwrap();

    assert!(!fs::read_to_string(&output).unwrap().contains(HIGHLIGHT_CLASS));
}

#[tokio::test]
async fn test_unsupported_url_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot = write_snapshot(dir.path());
    let formatter = Formatter::new(OutputFormat::Table, false);

    let args = ScoreArgs {
        input: snapshot_args(snapshot, "https://example.com/inbox"),
        positive: false,
    };
    let result = execute_score(args, &Config::default(), &formatter).await;
    assert!(matches!(result, Err(CliError::Extractor(_))));
}

#[tokio::test]
async fn test_missing_snapshot_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let formatter = Formatter::new(OutputFormat::Table, false);

    let args = ScoreArgs {
        input: snapshot_args(dir.path().join("missing.json"), GMAIL),
        positive: true,
    };
    let result = execute_score(args, &Config::default(), &formatter).await;
    assert!(matches!(result, Err(CliError::Io(_))));
}

#[test]
fn test_config_roundtrip_and_consent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");
    let formatter = Formatter::new(OutputFormat::Table, false);

    let mut config = Config::load(Some(&path)).unwrap();
    assert_eq!(config, Config::default());

    let grant = ConsentArgs {
        action: ConsentAction::Grant,
    };
    execute_consent(grant, &mut config, Some(&path), OutputFormat::Table, &formatter).unwrap();

    let saved = Config::load(Some(&path)).unwrap();
    assert!(saved.consent.given);
    let granted_at = saved.consent.granted_at.unwrap();
    assert!(granted_at.ends_with('Z'));
    assert!(chrono::DateTime::parse_from_rfc3339(&granted_at).is_ok());

    let decline = ConsentArgs {
        action: ConsentAction::Decline,
    };
    execute_consent(decline, &mut config, Some(&path), OutputFormat::Table, &formatter).unwrap();

    let saved = Config::load(Some(&path)).unwrap();
    assert!(!saved.consent.given);
    assert!(!saved.features.summarization_enabled);
}
