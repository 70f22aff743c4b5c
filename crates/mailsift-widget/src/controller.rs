//! Display State Controller
//!
//! Every mutation updates [`DisplayState`] and then re-renders the whole
//! view from it. A view equal to the last presented one is not presented
//! again.

use crate::render::{render, RenderedView};
use crate::state::DisplayState;
use chrono::{DateTime, Utc};
use mailsift_domain::{EmailRecord, RecordId};
use tracing::debug;

/// Where rendered views go
pub trait RenderSurface {
    /// Replace whatever is shown with `view`
    fn present(&mut self, view: &RenderedView);
}

/// Surface that keeps every presented view
#[derive(Debug, Clone, Default)]
pub struct MemorySurface {
    views: Vec<RenderedView>,
}

impl MemorySurface {
    /// Empty surface
    pub fn new() -> Self {
        Self::default()
    }

    /// All presented views, oldest first
    pub fn views(&self) -> &[RenderedView] {
        &self.views
    }

    /// Most recently presented view
    pub fn last(&self) -> Option<&RenderedView> {
        self.views.last()
    }

    /// Number of presentations
    pub fn present_count(&self) -> usize {
        self.views.len()
    }
}

impl RenderSurface for MemorySurface {
    fn present(&mut self, view: &RenderedView) {
        self.views.push(view.clone());
    }
}

/// Owns the display state and keeps the surface in sync with it
pub struct DisplayController<R> {
    state: DisplayState,
    surface: R,
    last_presented: Option<RenderedView>,
    clock: fn() -> DateTime<Utc>,
}

impl<R: RenderSurface> DisplayController<R> {
    /// Controller over `surface` with an empty, visible state
    pub fn new(surface: R) -> Self {
        Self {
            state: DisplayState::default(),
            surface,
            last_presented: None,
            clock: Utc::now,
        }
    }

    /// Use a different clock for relative time labels
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    /// Current state
    pub fn state(&self) -> &DisplayState {
        &self.state
    }

    /// The surface
    pub fn surface(&self) -> &R {
        &self.surface
    }

    /// Last view handed to the surface
    pub fn current_view(&self) -> Option<&RenderedView> {
        self.last_presented.as_ref()
    }

    /// Replace the listed records
    ///
    /// Summaries and expansion flags are kept. Loading and error states end.
    pub fn set_top_emails(&mut self, records: Vec<EmailRecord>) {
        self.state.top_emails = records;
        self.state.loading = false;
        self.state.error = None;
        self.redraw();
    }

    /// Attach a summary to a record
    ///
    /// Accepted even if the record is not listed; it shows if it returns.
    pub fn set_summary(&mut self, id: RecordId, text: impl Into<String>) {
        self.state.summaries.insert(id, text.into());
        self.redraw();
    }

    /// Flip a record's expansion flag, returning the new value
    pub fn toggle_expanded(&mut self, id: &RecordId) -> bool {
        let expanded = if self.state.expanded.remove(id) {
            false
        } else {
            self.state.expanded.insert(id.clone());
            true
        };
        self.redraw();
        expanded
    }

    /// Enter or leave the loading state
    pub fn set_loading(&mut self, loading: bool) {
        self.state.loading = loading;
        if loading {
            self.state.error = None;
        }
        self.redraw();
    }

    /// Show or clear an error in place of the list
    pub fn set_error(&mut self, error: Option<String>) {
        if error.is_some() {
            self.state.loading = false;
        }
        self.state.error = error;
        self.redraw();
    }

    /// Make the widget visible
    pub fn show(&mut self) {
        self.state.visible = true;
        self.redraw();
    }

    /// Hide the widget
    pub fn hide(&mut self) {
        self.state.visible = false;
        self.redraw();
    }

    /// Collapse or expand the widget, returning whether it is now minimized
    pub fn toggle_minimized(&mut self) -> bool {
        self.state.minimized = !self.state.minimized;
        self.redraw();
        self.state.minimized
    }

    /// Re-render from state and present if the view changed
    ///
    /// Returns whether the surface was updated.
    pub fn redraw(&mut self) -> bool {
        let view = render(&self.state, (self.clock)());
        if self.last_presented.as_ref() == Some(&view) {
            return false;
        }
        debug!("Presenting widget view");
        self.surface.present(&view);
        self.last_presented = Some(view);
        true
    }
}
