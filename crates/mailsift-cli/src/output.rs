//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use mailsift_domain::{EmailRecord, PriorityTier, Provider};
use mailsift_summarizer::SummaryOutcome;
use mailsift_widget::{RenderedView, RowBody};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format the widget view.
    pub fn format_view(&self, view: Option<&RenderedView>) -> Result<String> {
        let view = match view {
            Some(view) => view,
            None => return Ok(self.colorize("Nothing rendered.", "yellow")),
        };
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(view)?),
            OutputFormat::Table => Ok(self.format_view_table(view)),
        }
    }

    fn format_view_table(&self, view: &RenderedView) -> String {
        match view {
            RenderedView::Hidden => self.info("Widget disabled"),
            RenderedView::Minimized => self.info("Widget minimized"),
            RenderedView::Error { message, retry_label } => {
                format!("{} [{}]", self.error(message), retry_label)
            }
            RenderedView::Loading { message } => self.info(message),
            RenderedView::Empty { title, hint } => {
                format!("{}\n{}", self.colorize(title, "yellow"), hint)
            }
            RenderedView::List { rows } => {
                let mut builder = Builder::default();
                builder.push_record(["#", "Subject", "From", "Time", "Score", "Preview"]);
                for row in rows {
                    let preview = match &row.body {
                        RowBody::Snippet { text } => text.clone(),
                        RowBody::Summary { preview, .. } => format!("Summary: {}", preview),
                    };
                    builder.push_record([
                        row.rank.to_string(),
                        row.subject.clone(),
                        row.sender.clone(),
                        row.time.clone(),
                        self.score(row.priority),
                        preview,
                    ]);
                }
                self.finish(builder)
            }
        }
    }

    /// Format scored records.
    pub fn format_records(&self, records: &[EmailRecord]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let json_records: Vec<serde_json::Value> = records
                    .iter()
                    .map(|r| {
                        serde_json::json!({
                            "id": r.id.as_str(),
                            "subject": r.subject,
                            "sender": r.sender,
                            "timestamp": r.timestamp,
                            "is_read": r.is_read,
                            "priority": r.priority,
                            "tier": r.tier().as_str(),
                        })
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&json_records)?)
            }
            OutputFormat::Table => {
                if records.is_empty() {
                    return Ok(self.colorize("No records found.", "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(["ID", "Subject", "From", "Read", "Score", "Tier"]);
                for record in records {
                    builder.push_record([
                        record.id.to_string(),
                        mailsift_widget::truncate(&record.subject, 40),
                        mailsift_widget::truncate(&record.sender, 20),
                        if record.is_read { "yes" } else { "no" }.to_string(),
                        self.score(record.priority),
                        record.tier().as_str().to_string(),
                    ]);
                }
                Ok(self.finish(builder))
            }
        }
    }

    /// Format a summary and where it came from.
    pub fn format_summary(&self, outcome: &SummaryOutcome) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&serde_json::json!({
                "summary": outcome.text,
                "source": outcome.source.as_str(),
            }))?),
            OutputFormat::Table => Ok(format!(
                "{}\n{}",
                outcome.text,
                self.colorize(&format!("(source: {})", outcome.source), "cyan")
            )),
        }
    }

    /// Format the supported providers.
    pub fn format_providers(&self) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let providers: Vec<serde_json::Value> = Provider::all()
                    .iter()
                    .map(|p| {
                        serde_json::json!({
                            "name": p.name(),
                            "url_patterns": p.url_patterns(),
                        })
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&providers)?)
            }
            OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record(["Provider", "URL patterns"]);
                for provider in Provider::all() {
                    builder.push_record([provider.name().to_string(), provider.url_patterns().join(", ")]);
                }
                Ok(self.finish(builder))
            }
        }
    }

    /// Format a list of keywords.
    pub fn format_keywords(&self, keywords: &[String]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(keywords)?),
            OutputFormat::Table => {
                if keywords.is_empty() {
                    return Ok(self.colorize("No keywords configured.", "yellow"));
                }
                Ok(keywords.join("\n"))
            }
        }
    }

    fn finish(&self, builder: Builder) -> String {
        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    fn score(&self, priority: u8) -> String {
        let color = match PriorityTier::from_score(priority) {
            PriorityTier::Critical => "red",
            PriorityTier::High => "magenta",
            PriorityTier::Medium => "yellow",
            PriorityTier::Low => "blue",
            PriorityTier::Minimal => "",
        };
        self.colorize(&priority.to_string(), color)
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            "magenta" => text.magenta().to_string(),
            _ => text.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mailsift_summarizer::SummarySource;
    use mailsift_widget::RenderedRow;

    fn record(priority: u8) -> EmailRecord {
        let mut record = EmailRecord::new("t1", "Budget review", "Alice", "Numbers", "2025-03-01T09:30:00Z", false);
        record.priority = priority;
        record
    }

    #[test]
    fn test_records_table() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_records(&[record(75)]).unwrap();
        assert!(output.contains("Subject"));
        assert!(output.contains("Budget review"));
        assert!(output.contains("high"));
    }

    #[test]
    fn test_records_json() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter.format_records(&[record(85)]).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed[0]["tier"], "critical");
        assert_eq!(parsed[0]["priority"], 85);
    }

    #[test]
    fn test_empty_records() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert!(formatter.format_records(&[]).unwrap().contains("No records found"));
    }

    #[test]
    fn test_list_view_shows_summary_preview() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let view = RenderedView::List {
            rows: vec![RenderedRow {
                rank: 1,
                id: "t1".to_string(),
                subject: "Budget review".to_string(),
                sender: "Alice".to_string(),
                time: "2h".to_string(),
                priority: 45,
                tier: 2,
                body: RowBody::Summary {
                    preview: "Approve by Friday".to_string(),
                    full: "Approve by Friday".to_string(),
                    expanded: false,
                    toggle_label: "Show more".to_string(),
                },
            }],
        };
        let output = formatter.format_view(Some(&view)).unwrap();
        assert!(output.contains("Summary: Approve by Friday"));
    }

    #[test]
    fn test_error_view() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let view = RenderedView::Error {
            message: "Could not read the inbox.".to_string(),
            retry_label: "Retry".to_string(),
        };
        assert_eq!(
            formatter.format_view(Some(&view)).unwrap(),
            "✗ Could not read the inbox. [Retry]"
        );
    }

    #[test]
    fn test_summary_json() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let outcome = SummaryOutcome {
            text: "Short.".to_string(),
            source: SummarySource::Heuristic,
        };
        let output = formatter.format_summary(&outcome).unwrap();
        assert!(output.contains("\"source\": \"heuristic\""));
    }

    #[test]
    fn test_providers_table() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_providers().unwrap();
        assert!(output.contains("Gmail"));
        assert!(output.contains("outlook.live.com"));
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert_eq!(formatter.success("test"), "✓ test");
    }
}
