use chrono::{DateTime, Utc};
use repopulse_core::app::{paginate, ActionFilter, Page, ReadProjection};
use repopulse_core::domain::{Event, RepoEvent};
use repopulse_core::Action;

/// Status and error lines kept around; older ones are dropped
const MAX_MESSAGES: usize = 20;

const FETCH_FAILED_PREFIX: &str = "Fetch failed: ";

/// The TUI Model - the complete UI state
/// This is separate from the core ReadProjection to allow UI-specific state
#[derive(Debug)]
pub struct TuiModel {
    /// Feed data from the service
    pub projection: ReadProjection,

    /// Actions currently shown
    pub filter: ActionFilter,

    /// UI-specific state
    pub ui_state: UiState,

    /// Current view mode
    pub mode: ViewMode,

    /// Error messages to display
    pub errors: Vec<String>,

    /// Status messages to display
    pub messages: Vec<String>,

    /// Source description for the title bar
    pub source_label: String,

    /// Whether the application should quit
    pub should_quit: bool,
}

/// UI-specific state (page, cursor, etc.)
#[derive(Debug)]
pub struct UiState {
    /// Current page, starting at 1
    pub page: usize,

    /// Events per page
    pub page_size: usize,

    /// Cursor position within the current page
    pub cursor: usize,

    /// Time used for relative ages; refreshed by the main loop
    pub now: DateTime<Utc>,

    /// Terminal size
    pub terminal_width: u16,
    pub terminal_height: u16,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 5,
            cursor: 0,
            now: Utc::now(),
            terminal_width: 0,
            terminal_height: 0,
        }
    }
}

/// Different view modes for the TUI
#[derive(Debug, Default, Clone, PartialEq)]
pub enum ViewMode {
    #[default]
    /// Paginated activity list
    Feed,

    /// Full details of one event
    Detail { event: Box<RepoEvent> },

    /// Help view
    Help,
}

impl Default for TuiModel {
    fn default() -> Self {
        Self::new(5, ActionFilter::default())
    }
}

impl TuiModel {
    pub fn new(page_size: usize, filter: ActionFilter) -> Self {
        Self {
            projection: ReadProjection::new(),
            filter,
            ui_state: UiState {
                page_size: page_size.max(1),
                ..UiState::default()
            },
            mode: ViewMode::default(),
            errors: Vec::new(),
            messages: Vec::new(),
            source_label: String::new(),
            should_quit: false,
        }
    }

    /// Apply an event to update both projection and UI state
    pub fn apply_event(&mut self, event: &Event) {
        self.projection.apply(event);

        match event {
            Event::FetchStarted => {}

            Event::EventsLoaded { events, at, .. } => {
                self.ui_state.now = *at;
                self.clamp_position();
                self.add_message(format!("Loaded {} events", events.len()));
            }

            Event::FetchFailed { msg } => {
                // Polling repeats the failure; show only the latest one
                self.errors.retain(|e| !e.starts_with(FETCH_FAILED_PREFIX));
                self.add_error(format!("{}{}", FETCH_FAILED_PREFIX, msg));
            }

            Event::FilterPersisted => {}

            Event::Error { msg } => {
                self.add_error(msg.clone());
            }

            Event::QuitRequested => {
                self.should_quit = true;
            }
        }
    }

    /// Events passing the filter, latest first
    pub fn visible_events(&self) -> Vec<&RepoEvent> {
        self.filter.apply(&self.projection.events)
    }

    /// The slice of visible events on the current page
    pub fn with_current_page<R>(&self, f: impl FnOnce(Page<'_, &RepoEvent>) -> R) -> R {
        let visible = self.visible_events();
        f(paginate(&visible, self.ui_state.page, self.ui_state.page_size))
    }

    pub fn total_pages(&self) -> usize {
        self.with_current_page(|page| page.total_pages)
    }

    /// Event under the cursor
    pub fn selected_event(&self) -> Option<RepoEvent> {
        self.with_current_page(|page| page.items.get(self.ui_state.cursor).map(|e| (*e).clone()))
    }

    /// Flip an action in the filter; resets to the first page
    pub fn toggle_filter(&mut self, action: Action) {
        self.filter.toggle(action);
        self.reset_position();
    }

    pub fn clear_filter(&mut self) {
        self.filter.clear();
        self.reset_position();
    }

    pub fn next_page(&mut self) {
        if self.ui_state.page < self.total_pages() {
            self.ui_state.page += 1;
            self.ui_state.cursor = 0;
        }
    }

    pub fn prev_page(&mut self) {
        if self.ui_state.page > 1 {
            self.ui_state.page -= 1;
            self.ui_state.cursor = 0;
        }
    }

    pub fn first_page(&mut self) {
        self.reset_position();
    }

    pub fn last_page(&mut self) {
        self.ui_state.page = self.total_pages();
        self.ui_state.cursor = 0;
    }

    pub fn cursor_down(&mut self) {
        let len = self.with_current_page(|page| page.items.len());
        if self.ui_state.cursor + 1 < len {
            self.ui_state.cursor += 1;
        } else if self.ui_state.page < self.total_pages() {
            self.next_page();
        }
    }

    pub fn cursor_up(&mut self) {
        if self.ui_state.cursor > 0 {
            self.ui_state.cursor -= 1;
        } else if self.ui_state.page > 1 {
            self.prev_page();
            let len = self.with_current_page(|page| page.items.len());
            self.ui_state.cursor = len.saturating_sub(1);
        }
    }

    fn reset_position(&mut self) {
        self.ui_state.page = 1;
        self.ui_state.cursor = 0;
    }

    /// Keep page and cursor valid after the list changed underneath them
    fn clamp_position(&mut self) {
        let (page, len) = self.with_current_page(|page| (page.page, page.items.len()));
        self.ui_state.page = page;
        self.ui_state.cursor = self.ui_state.cursor.min(len.saturating_sub(1));
    }

    /// Clear all error messages
    pub fn clear_errors(&mut self) {
        self.errors.clear();
    }

    /// Add a status message
    pub fn add_message(&mut self, message: String) {
        self.messages.push(message);
        Self::truncate_front(&mut self.messages);
    }

    /// Add an error message
    pub fn add_error(&mut self, error: String) {
        self.errors.push(error);
        Self::truncate_front(&mut self.errors);
    }

    fn truncate_front(lines: &mut Vec<String>) {
        if lines.len() > MAX_MESSAGES {
            lines.drain(..lines.len() - MAX_MESSAGES);
        }
    }

    /// Most recent status message
    pub fn last_message(&self) -> Option<&str> {
        self.messages.last().map(String::as_str)
    }
}
