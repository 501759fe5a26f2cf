use super::feed::ActionFilter;

/// Commands that can be sent to the feed service
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Fetch now instead of waiting for the next poll
    Refresh,

    /// Remember the current filter selection
    PersistFilter { filter: ActionFilter },

    /// Quit the application
    Quit,
}
