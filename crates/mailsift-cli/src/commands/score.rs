//! Score command implementation.

use crate::cli::ScoreArgs;
use crate::commands::load_snapshot;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use mailsift_domain::KeywordSet;
use mailsift_extractor::{ExtractorConfig, RecordExtractor};
use mailsift_priority::PriorityEngine;

/// Execute the score command.
pub async fn execute_score(args: ScoreArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let tree = load_snapshot(&args.input.snapshot)?;
    let extractor = RecordExtractor::for_url(&args.input.url, ExtractorConfig::default())?;

    let (keywords, rejected) = if args.input.keywords.is_empty() {
        config.keyword_set()
    } else {
        KeywordSet::from_lossy(&args.input.keywords)
    };
    for (keyword, reason) in rejected {
        eprintln!("{}", formatter.warning(&format!("Skipping keyword '{}': {}", keyword, reason)));
    }

    let report = extractor.report(&tree, chrono::Utc::now());
    if !report.failures.is_empty() {
        eprintln!(
            "{}",
            formatter.warning(&format!(
                "{} of {} rows could not be read",
                report.failures.len(),
                report.containers
            ))
        );
    }

    let engine = PriorityEngine::default_config();
    let mut records = engine.prioritize(report.records, &keywords);
    if args.positive {
        records.retain(|record| record.priority > 0);
    }

    println!("{}", formatter.format_records(&records)?);
    Ok(())
}
