//! Run command implementation.

use crate::cli::RunArgs;
use crate::commands::load_snapshot;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use mailsift_domain::ConsentGate;
use mailsift_extractor::{ExtractorConfig, RecordExtractor};
use mailsift_orchestrator::{MemoryStore, Orchestrator, OrchestratorConfig};
use mailsift_priority::PriorityEngine;
use mailsift_summarizer::SummarizationClient;
use mailsift_widget::{DisplayController, MemorySurface};
use std::fs;
use std::sync::{Arc, Mutex};

/// Execute the run command.
///
/// Runs one full cycle over the snapshot, including automatic summaries,
/// and prints the resulting widget view.
pub async fn execute_run(
    args: RunArgs,
    config: &Config,
    api_key: Option<&str>,
    formatter: &Formatter,
) -> Result<()> {
    let tree = Arc::new(Mutex::new(load_snapshot(&args.input.snapshot)?));
    let extractor = RecordExtractor::for_url(&args.input.url, ExtractorConfig::default())?;
    let store = MemoryStore::with_values(config.store_values(&args.input.keywords)?);
    let summarizer = SummarizationClient::new(
        config.provider(api_key)?,
        ConsentGate::new(config.consent.given),
    );

    let mut orchestrator = Orchestrator::new(
        Arc::clone(&tree),
        extractor,
        PriorityEngine::default_config(),
        summarizer,
        store,
        DisplayController::new(MemorySurface::new()),
        OrchestratorConfig::default(),
    )?;

    let rejected = orchestrator.load_settings().await;
    for (keyword, reason) in rejected {
        eprintln!("{}", formatter.warning(&format!("Skipping keyword '{}': {}", keyword, reason)));
    }
    let report = orchestrator.process().await;

    println!("{}", formatter.format_view(orchestrator.widget().current_view())?);
    tracing::debug!("{}", orchestrator.metrics().summary());

    if !orchestrator.summarization_allowed() && !report.top.is_empty() {
        eprintln!(
            "{}",
            formatter.info("Summaries are off. Run 'mailsift consent grant' to enable them.")
        );
    }

    if let Some(path) = args.output {
        let json = {
            let tree = tree
                .lock()
                .map_err(|_| CliError::InvalidInput("Snapshot became unreadable".to_string()))?;
            tree.to_json()?
        };
        fs::write(&path, json)?;
        let marked = report.highlight.map(|outcome| outcome.marked).unwrap_or(0);
        eprintln!(
            "{}",
            formatter.success(&format!(
                "Wrote snapshot with {} highlighted record(s) to {}",
                marked,
                path.display()
            ))
        );
    }

    Ok(())
}
