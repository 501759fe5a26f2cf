use super::model::{TuiModel, ViewMode};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyModifiers};
use repopulse_core::app::Command;
use repopulse_core::Action;

/// Messages that can be sent from the TUI to the feed service
#[derive(Debug, Clone, PartialEq)]
pub enum TuiMessage {
    /// Send a command to the feed service
    Command(Command),

    /// No action needed
    None,
}

/// The Update function - handles user input and updates the model
pub struct TuiUpdate;

impl TuiUpdate {
    /// Handle a key press and update the model accordingly
    /// Returns a TuiMessage that should be sent to the feed service
    pub fn handle_key(
        model: &mut TuiModel,
        key: KeyCode,
        modifiers: KeyModifiers,
    ) -> Result<TuiMessage> {
        if let Some(msg) = Self::handle_global_keys(model, key, modifiers)? {
            return Ok(msg);
        }

        match model.mode {
            ViewMode::Feed => Self::handle_feed_keys(model, key),
            ViewMode::Detail { .. } => Self::handle_detail_keys(model, key),
            ViewMode::Help => {
                // Any key exits help
                model.mode = ViewMode::Feed;
                Ok(TuiMessage::None)
            }
        }
    }

    /// Handle terminal resize
    pub fn handle_resize(model: &mut TuiModel, width: u16, height: u16) -> Result<TuiMessage> {
        model.ui_state.terminal_width = width;
        model.ui_state.terminal_height = height;
        Ok(TuiMessage::None)
    }

    /// Handle global keys that work in any mode
    fn handle_global_keys(
        model: &mut TuiModel,
        key: KeyCode,
        modifiers: KeyModifiers,
    ) -> Result<Option<TuiMessage>> {
        match key {
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                Ok(Some(TuiMessage::Command(Command::Quit)))
            }

            KeyCode::Char('q') if modifiers.is_empty() => {
                Ok(Some(TuiMessage::Command(Command::Quit)))
            }

            KeyCode::Esc => {
                if !model.errors.is_empty() {
                    model.clear_errors();
                    Ok(Some(TuiMessage::None))
                } else if !matches!(model.mode, ViewMode::Feed) {
                    model.mode = ViewMode::Feed;
                    Ok(Some(TuiMessage::None))
                } else {
                    Ok(Some(TuiMessage::Command(Command::Quit)))
                }
            }

            KeyCode::Char('?') => {
                model.mode = ViewMode::Help;
                Ok(Some(TuiMessage::None))
            }

            KeyCode::F(5) => Ok(Some(TuiMessage::Command(Command::Refresh))),

            _ => Ok(None),
        }
    }

    /// Handle keys in the activity list
    fn handle_feed_keys(model: &mut TuiModel, key: KeyCode) -> Result<TuiMessage> {
        match key {
            // Filters
            KeyCode::Char('1') => Ok(Self::toggle(model, Action::Push)),
            KeyCode::Char('2') => Ok(Self::toggle(model, Action::PullRequest)),
            KeyCode::Char('3') => Ok(Self::toggle(model, Action::Merge)),
            KeyCode::Char('0') | KeyCode::Char('c') => {
                if !model.filter.is_active() {
                    return Ok(TuiMessage::None);
                }
                model.clear_filter();
                Ok(Self::persist(model))
            }

            // Paging
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('n') => {
                model.next_page();
                Ok(TuiMessage::None)
            }
            KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('p') => {
                model.prev_page();
                Ok(TuiMessage::None)
            }
            KeyCode::Char('g') | KeyCode::Home => {
                model.first_page();
                Ok(TuiMessage::None)
            }
            KeyCode::Char('G') | KeyCode::End => {
                model.last_page();
                Ok(TuiMessage::None)
            }

            // Navigation
            KeyCode::Down | KeyCode::Char('j') => {
                model.cursor_down();
                Ok(TuiMessage::None)
            }
            KeyCode::Up | KeyCode::Char('k') => {
                model.cursor_up();
                Ok(TuiMessage::None)
            }

            KeyCode::Enter => {
                if let Some(event) = model.selected_event() {
                    model.mode = ViewMode::Detail {
                        event: Box::new(event),
                    };
                }
                Ok(TuiMessage::None)
            }

            KeyCode::Char('r') => Ok(TuiMessage::Command(Command::Refresh)),

            _ => Ok(TuiMessage::None),
        }
    }

    /// Handle keys in the event detail view
    fn handle_detail_keys(model: &mut TuiModel, key: KeyCode) -> Result<TuiMessage> {
        match key {
            KeyCode::Char('b') | KeyCode::Backspace | KeyCode::Enter => {
                model.mode = ViewMode::Feed;
                Ok(TuiMessage::None)
            }
            KeyCode::Char('r') => Ok(TuiMessage::Command(Command::Refresh)),
            _ => Ok(TuiMessage::None),
        }
    }

    fn toggle(model: &mut TuiModel, action: Action) -> TuiMessage {
        model.toggle_filter(action);
        Self::persist(model)
    }

    fn persist(model: &TuiModel) -> TuiMessage {
        TuiMessage::Command(Command::PersistFilter {
            filter: model.filter.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use repopulse_core::app::ActionFilter;
    use repopulse_core::domain::{sample_events, Event, Origin};

    fn press(model: &mut TuiModel, key: KeyCode) -> TuiMessage {
        TuiUpdate::handle_key(model, key, KeyModifiers::NONE).unwrap()
    }

    fn model() -> TuiModel {
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();
        let mut model = TuiModel::new(4, ActionFilter::default());
        model.apply_event(&Event::EventsLoaded {
            events: sample_events(now),
            origin: Origin::Sample,
            page_info: None,
            at: now,
        });
        model
    }

    #[test]
    fn test_quit_keys() {
        let mut model = model();
        assert_eq!(
            press(&mut model, KeyCode::Char('q')),
            TuiMessage::Command(Command::Quit)
        );
        assert_eq!(
            TuiUpdate::handle_key(&mut model, KeyCode::Char('c'), KeyModifiers::CONTROL).unwrap(),
            TuiMessage::Command(Command::Quit)
        );
        assert_eq!(press(&mut model, KeyCode::Esc), TuiMessage::Command(Command::Quit));
    }

    #[test]
    fn test_filter_keys_toggle_and_persist() {
        let mut model = model();

        let msg = press(&mut model, KeyCode::Char('3'));
        assert_eq!(
            msg,
            TuiMessage::Command(Command::PersistFilter {
                filter: ActionFilter::from_actions([Action::Merge])
            })
        );
        assert!(model.visible_events().iter().all(|e| e.action == Action::Merge));

        press(&mut model, KeyCode::Char('1'));
        assert_eq!(model.visible_events().len(), 4);

        let msg = press(&mut model, KeyCode::Char('c'));
        assert_eq!(
            msg,
            TuiMessage::Command(Command::PersistFilter {
                filter: ActionFilter::default()
            })
        );
        assert_eq!(model.visible_events().len(), 6);

        // Clearing an empty filter is a no-op
        assert_eq!(press(&mut model, KeyCode::Char('0')), TuiMessage::None);
    }

    #[test]
    fn test_paging_keys() {
        let mut model = model();
        press(&mut model, KeyCode::Char('n'));
        assert_eq!(model.ui_state.page, 2);
        press(&mut model, KeyCode::Right);
        assert_eq!(model.ui_state.page, 2);
        press(&mut model, KeyCode::Char('p'));
        assert_eq!(model.ui_state.page, 1);
        press(&mut model, KeyCode::Char('G'));
        assert_eq!(model.ui_state.page, 2);
        press(&mut model, KeyCode::Char('g'));
        assert_eq!(model.ui_state.page, 1);
    }

    #[test]
    fn test_detail_view_roundtrip() {
        let mut model = model();
        press(&mut model, KeyCode::Char('j'));
        press(&mut model, KeyCode::Enter);

        match &model.mode {
            ViewMode::Detail { event } => assert_eq!(event.request_id, "req_002"),
            other => panic!("unexpected mode: {:?}", other),
        }

        press(&mut model, KeyCode::Backspace);
        assert_eq!(model.mode, ViewMode::Feed);
    }

    #[test]
    fn test_q_quits_from_every_mode() {
        let mut model = model();
        press(&mut model, KeyCode::Enter);
        assert!(matches!(model.mode, ViewMode::Detail { .. }));
        assert_eq!(
            press(&mut model, KeyCode::Char('q')),
            TuiMessage::Command(Command::Quit)
        );

        model.mode = ViewMode::Help;
        assert_eq!(
            press(&mut model, KeyCode::Char('q')),
            TuiMessage::Command(Command::Quit)
        );
    }

    #[test]
    fn test_help_and_escape() {
        let mut model = model();
        press(&mut model, KeyCode::Char('?'));
        assert_eq!(model.mode, ViewMode::Help);
        assert_eq!(press(&mut model, KeyCode::Esc), TuiMessage::None);
        assert_eq!(model.mode, ViewMode::Feed);

        press(&mut model, KeyCode::Char('?'));
        press(&mut model, KeyCode::Char('x'));
        assert_eq!(model.mode, ViewMode::Feed);
    }

    #[test]
    fn test_escape_dismisses_errors_first() {
        let mut model = model();
        model.add_error("boom".to_string());
        assert_eq!(press(&mut model, KeyCode::Esc), TuiMessage::None);
        assert!(model.errors.is_empty());
    }

    #[test]
    fn test_refresh_keys() {
        let mut model = model();
        assert_eq!(
            press(&mut model, KeyCode::Char('r')),
            TuiMessage::Command(Command::Refresh)
        );
        assert_eq!(press(&mut model, KeyCode::F(5)), TuiMessage::Command(Command::Refresh));
    }
}
