//! Pure rendering of [`DisplayState`] into a view model
//!
//! The view is rebuilt from scratch on every change. Nothing here mutates
//! state, so the output can never drift from it.

use crate::format::{relative_time, truncate};
use crate::state::DisplayState;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Shown while the pipeline runs
pub const LOADING_TEXT: &str = "Analyzing emails...";

/// Heading of the empty view
pub const EMPTY_TITLE: &str = "No priority emails found";

/// Hint under the empty heading
pub const EMPTY_HINT: &str = "Add keywords in settings to prioritize emails";

/// Label of the retry action in the error view
pub const RETRY_LABEL: &str = "Retry";

const SUBJECT_CHARS: usize = 50;
const SENDER_CHARS: usize = 25;
const SNIPPET_CHARS: usize = 60;
const SUMMARY_PREVIEW_CHARS: usize = 100;

/// Body of a listed record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowBody {
    /// Content preview; the record can still be summarized
    Snippet {
        /// Truncated content
        text: String,
    },
    /// Summary with an expand toggle
    Summary {
        /// First characters of the summary
        preview: String,
        /// Whole summary
        full: String,
        /// Whether the full text is shown
        expanded: bool,
        /// "Show more" or "Show less"
        toggle_label: String,
    },
}

/// One listed record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedRow {
    /// 1-based position in the list
    pub rank: usize,
    /// Record id
    pub id: String,
    /// Truncated subject
    pub subject: String,
    /// Truncated sender
    pub sender: String,
    /// Age label
    pub time: String,
    /// Priority score
    pub priority: u8,
    /// Presentation tier
    pub tier: u8,
    /// Snippet or summary
    pub body: RowBody,
}

impl RenderedRow {
    /// Whether the row offers the summarize action
    pub fn can_summarize(&self) -> bool {
        matches!(self.body, RowBody::Snippet { .. })
    }
}

/// What the widget shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum RenderedView {
    /// Nothing shown
    Hidden,
    /// Header only
    Minimized,
    /// Error in place of the list, with a retry action
    Error {
        /// Error text
        message: String,
        /// Retry action label
        retry_label: String,
    },
    /// Progress message in place of the list
    Loading {
        /// Progress text
        message: String,
    },
    /// No records to list
    Empty {
        /// Heading
        title: String,
        /// Hint
        hint: String,
    },
    /// Ranked records
    List {
        /// Rows in rank order
        rows: Vec<RenderedRow>,
    },
}

/// Build the view for `state` as of `now`
pub fn render(state: &DisplayState, now: DateTime<Utc>) -> RenderedView {
    if !state.visible {
        return RenderedView::Hidden;
    }
    if state.minimized {
        return RenderedView::Minimized;
    }
    if let Some(message) = &state.error {
        return RenderedView::Error {
            message: message.clone(),
            retry_label: RETRY_LABEL.to_string(),
        };
    }
    if state.loading {
        return RenderedView::Loading {
            message: LOADING_TEXT.to_string(),
        };
    }
    if state.top_emails.is_empty() {
        return RenderedView::Empty {
            title: EMPTY_TITLE.to_string(),
            hint: EMPTY_HINT.to_string(),
        };
    }

    let rows = state
        .top_emails
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let body = match state.summary(&record.id) {
                Some(summary) if !summary.is_empty() => {
                    let expanded = state.is_expanded(&record.id);
                    RowBody::Summary {
                        preview: truncate(summary, SUMMARY_PREVIEW_CHARS),
                        full: summary.to_string(),
                        expanded,
                        toggle_label: if expanded { "Show less" } else { "Show more" }.to_string(),
                    }
                }
                _ => RowBody::Snippet {
                    text: truncate(&record.content, SNIPPET_CHARS),
                },
            };
            RenderedRow {
                rank: index + 1,
                id: record.id.to_string(),
                subject: truncate(&record.subject, SUBJECT_CHARS),
                sender: truncate(&record.sender, SENDER_CHARS),
                time: relative_time(&record.timestamp, now),
                priority: record.priority,
                tier: record.tier().level(),
                body,
            }
        })
        .collect();

    RenderedView::List { rows }
}

impl fmt::Display for RenderedView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderedView::Hidden => Ok(()),
            RenderedView::Minimized => writeln!(f, "MailSift (minimized)"),
            RenderedView::Error { message, retry_label } => {
                writeln!(f, "! {}", message)?;
                writeln!(f, "[{}]", retry_label)
            }
            RenderedView::Loading { message } => writeln!(f, "{}", message),
            RenderedView::Empty { title, hint } => {
                writeln!(f, "{}", title)?;
                writeln!(f, "{}", hint)
            }
            RenderedView::List { rows } => {
                for row in rows {
                    writeln!(f, "#{} {} ({}) [{}]", row.rank, row.sender, row.time, row.priority)?;
                    writeln!(f, "   {}", row.subject)?;
                    match &row.body {
                        RowBody::Snippet { text } => {
                            if !text.is_empty() {
                                writeln!(f, "   {}", text)?;
                            }
                            writeln!(f, "   [Summarize]")?;
                        }
                        RowBody::Summary {
                            preview,
                            full,
                            expanded,
                            toggle_label,
                        } => {
                            let shown = if *expanded { full } else { preview };
                            writeln!(f, "   {} [{}]", shown, toggle_label)?;
                        }
                    }
                }
                Ok(())
            }
        }
    }
}
