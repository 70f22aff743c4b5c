//! MailSift Widget
//!
//! Display state for the ranked-email panel and a pure renderer over it.
//!
//! The controller owns [`DisplayState`]; each mutation re-renders the full
//! view and hands it to a [`RenderSurface`]. Loading and error views replace
//! the list rather than overlaying it.
//!
//! # Examples
//!
//! ```
//! use mailsift_domain::EmailRecord;
//! use mailsift_widget::{DisplayController, MemorySurface, RenderedView};
//!
//! let mut widget = DisplayController::new(MemorySurface::new());
//! let mut record = EmailRecord::new("r1", "Deadline", "Alice", "Friday", "", false);
//! record.priority = 45;
//! widget.set_top_emails(vec![record]);
//!
//! match widget.current_view() {
//!     Some(RenderedView::List { rows }) => assert_eq!(rows[0].rank, 1),
//!     other => panic!("unexpected view: {:?}", other),
//! }
//! ```

#![warn(missing_docs)]

mod controller;
mod format;
mod render;
mod state;

pub use controller::{DisplayController, MemorySurface, RenderSurface};
pub use format::{relative_time, truncate};
pub use render::{
    render, RenderedRow, RenderedView, RowBody, EMPTY_HINT, EMPTY_TITLE, LOADING_TEXT, RETRY_LABEL,
};
pub use state::DisplayState;
