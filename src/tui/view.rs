use super::model::{TuiModel, ViewMode};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};
use repopulse_core::app::{page_markers, PageMarker};
use repopulse_core::domain::{format_age, format_full, RepoEvent};
use repopulse_core::Action;

/// The View component of MVU - responsible for rendering the model
pub struct TuiView;

impl TuiView {
    /// Render the entire TUI based on the current model state
    pub fn render(model: &TuiModel, frame: &mut Frame) {
        let size = frame.area();
        let banner_height = if model.projection.is_demo() { 1 } else { 0 };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),             // Title bar
                Constraint::Length(banner_height), // Demo banner
                Constraint::Length(3),             // Stat cards
                Constraint::Length(3),             // Filter bar
                Constraint::Min(0),                // Main content
                Constraint::Length(1),             // Pagination
                Constraint::Length(2),             // Status bar
            ])
            .split(size);

        Self::render_title_bar(model, frame, chunks[0]);
        if banner_height > 0 {
            Self::render_demo_banner(frame, chunks[1]);
        }
        Self::render_stats(model, frame, chunks[2]);
        Self::render_filter_bar(model, frame, chunks[3]);

        match &model.mode {
            ViewMode::Feed => Self::render_event_list(model, frame, chunks[4]),
            ViewMode::Detail { event } => Self::render_detail(model, frame, chunks[4], event),
            ViewMode::Help => Self::render_help_view(frame, chunks[4]),
        }

        Self::render_pagination(model, frame, chunks[5]);
        Self::render_status_bar(model, frame, chunks[6]);

        if !model.errors.is_empty() {
            Self::render_error_overlay(model, frame, size);
        }
    }

    pub fn action_color(action: Action) -> Color {
        match action {
            Action::Push => Color::Blue,
            Action::PullRequest => Color::Green,
            Action::Merge => Color::Magenta,
        }
    }

    fn render_title_bar(model: &TuiModel, frame: &mut Frame, area: Rect) {
        let mut title = String::from("RepoPulse - Repository Activity");
        if !model.source_label.is_empty() {
            title.push_str(&format!(" ({})", model.source_label));
        }
        if model.projection.loading {
            title.push_str(" [LOADING...]");
        }
        if model.projection.is_demo() {
            title.push_str(" [DEMO MODE]");
        }

        let paragraph = Paragraph::new(title)
            .style(Style::default().fg(Color::White).bg(Color::Blue))
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
    }

    fn render_demo_banner(frame: &mut Frame, area: Rect) {
        let banner = Paragraph::new(Line::from(vec![
            Span::styled("Demo mode: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("showing sample data. Start the receiver with `repopulse serve` to see live events."),
        ]))
        .style(Style::default().fg(Color::Yellow));
        frame.render_widget(banner, area);
    }

    fn render_stats(model: &TuiModel, frame: &mut Frame, area: Rect) {
        let stats = model.projection.stats();
        let cards = [
            ("Total Events", stats.total, Color::White),
            ("Pushes", stats.pushes, Self::action_color(Action::Push)),
            (
                "Pull Requests",
                stats.pull_requests,
                Self::action_color(Action::PullRequest),
            ),
            ("Merges", stats.merges, Self::action_color(Action::Merge)),
        ];

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 4); 4])
            .split(area);

        for ((title, count, color), column) in cards.into_iter().zip(columns.iter()) {
            let card = Paragraph::new(count.to_string())
                .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).title(title));
            frame.render_widget(card, *column);
        }
    }

    fn render_filter_bar(model: &TuiModel, frame: &mut Frame, area: Rect) {
        let mut spans = Vec::new();
        for (index, action) in Action::ALL.into_iter().enumerate() {
            let selected = model.filter.is_selected(action);
            let color = Self::action_color(action);
            let style = if selected {
                Style::default()
                    .fg(Color::Black)
                    .bg(color)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(color)
            };
            spans.push(Span::styled(
                format!(" {} {} ", index + 1, action.label()),
                style,
            ));
            spans.push(Span::raw(" "));
        }

        let shown = model.visible_events().len();
        let total = model.projection.events.len();
        if model.filter.is_active() {
            spans.push(Span::styled(
                format!(" showing {} of {} (c clears)", shown, total),
                Style::default().fg(Color::Gray),
            ));
        } else {
            spans.push(Span::styled(" all events", Style::default().fg(Color::Gray)));
        }

        let bar = Paragraph::new(Line::from(spans))
            .block(Block::default().borders(Borders::ALL).title("Filter by action"));
        frame.render_widget(bar, area);
    }

    /// Sentence plus branch details for one event
    fn event_lines(model: &TuiModel, event: &RepoEvent) -> Vec<Line<'static>> {
        let color = Self::action_color(event.action);
        let header = Line::from(vec![
            Span::styled(
                format!("[{}]", event.action.label()),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
            Span::raw(event.description()),
        ]);

        let mut details = vec![Span::raw("    ")];
        match (&event.from_branch, event.uses_source_branch()) {
            (Some(from), true) => {
                details.push(Span::styled(from.clone(), Style::default().fg(Color::Cyan)));
                details.push(Span::raw(" → "));
                details.push(Span::styled(
                    event.to_branch.clone(),
                    Style::default().fg(Color::Cyan),
                ));
            }
            _ => {
                details.push(Span::raw("branch "));
                details.push(Span::styled(
                    event.to_branch.clone(),
                    Style::default().fg(Color::Cyan),
                ));
            }
        }
        details.push(Span::styled(
            format!("  · {}", format_age(event.timestamp, model.ui_state.now)),
            Style::default().fg(Color::Gray),
        ));

        vec![header, Line::from(details)]
    }

    fn render_event_list(model: &TuiModel, frame: &mut Frame, area: Rect) {
        let empty_msg = if model.projection.is_initial_load() {
            Some("Loading events...")
        } else if model.projection.events.is_empty() {
            Some("No repository activity yet. Events will appear here when there's repository activity.")
        } else if model.visible_events().is_empty() {
            Some("No events match your current filters. Press c to clear them.")
        } else {
            None
        };

        if let Some(msg) = empty_msg {
            let paragraph = Paragraph::new(msg)
                .style(Style::default().fg(Color::Yellow))
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .block(Block::default().borders(Borders::ALL).title("Recent Activity"));
            frame.render_widget(paragraph, area);
            return;
        }

        let (items, shown) = model.with_current_page(|page| {
            let items: Vec<ListItem> = page
                .items
                .iter()
                .enumerate()
                .map(|(index, event)| {
                    let style = if index == model.ui_state.cursor {
                        Style::default().bg(Color::DarkGray)
                    } else {
                        Style::default()
                    };
                    ListItem::new(Self::event_lines(model, event)).style(style)
                })
                .collect();
            (items, page.total_count)
        });

        let title = format!(
            "Recent Activity ({} event{})",
            shown,
            if shown == 1 { "" } else { "s" }
        );
        let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(list, area);
    }

    fn render_detail(model: &TuiModel, frame: &mut Frame, area: Rect, event: &RepoEvent) {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let mut lines = vec![
            Line::from(Span::styled(
                event.action.label(),
                bold.fg(Self::action_color(event.action)),
            )),
            Line::from(event.description()),
            Line::from(""),
            Line::from(format!("Request:  {}", event.request_id)),
            Line::from(format!("Author:   {}", event.author)),
        ];

        if let (Some(from), true) = (&event.from_branch, event.uses_source_branch()) {
            lines.push(Line::from(format!("From:     {}", from)));
        }
        lines.push(Line::from(format!("To:       {}", event.to_branch)));
        lines.push(Line::from(format!(
            "When:     {} ({})",
            format_full(event.timestamp),
            format_age(event.timestamp, model.ui_state.now)
        )));
        lines.push(Line::from(""));
        lines.push(Line::from("Press b to go back."));

        let paragraph = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Event Details"))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn render_help_view(frame: &mut Frame, area: Rect) {
        let heading = Style::default().add_modifier(Modifier::UNDERLINED);
        let help_text = vec![
            Line::from(Span::styled("RepoPulse Help", Style::default().add_modifier(Modifier::BOLD))),
            Line::from(""),
            Line::from(Span::styled("Filters:", heading)),
            Line::from("  1 - Toggle pushes"),
            Line::from("  2 - Toggle pull requests"),
            Line::from("  3 - Toggle merges"),
            Line::from("  0/c - Clear filters"),
            Line::from(""),
            Line::from(Span::styled("Navigation:", heading)),
            Line::from("  ↑/k ↓/j - Move selection"),
            Line::from("  ←/h/p →/l/n - Previous / next page"),
            Line::from("  g/G - First / last page"),
            Line::from("  Enter - Event details"),
            Line::from(""),
            Line::from(Span::styled("Global:", heading)),
            Line::from("  r/F5 - Refresh now"),
            Line::from("  ? - Show this help"),
            Line::from("  Ctrl+C / Esc / q - Quit"),
            Line::from(""),
            Line::from("Press any key to close help..."),
        ];

        let help = Paragraph::new(help_text)
            .block(Block::default().borders(Borders::ALL).title("Help"))
            .wrap(Wrap { trim: true });
        frame.render_widget(help, area);
    }

    fn render_pagination(model: &TuiModel, frame: &mut Frame, area: Rect) {
        let (page, total_pages, total_count) =
            model.with_current_page(|p| (p.page, p.total_pages, p.total_count));

        let enabled = Style::default().fg(Color::White);
        let disabled = Style::default().fg(Color::DarkGray);

        let mut spans = vec![Span::styled(
            "‹ Prev ",
            if page > 1 { enabled } else { disabled },
        )];
        for marker in page_markers(page, total_pages) {
            match marker {
                PageMarker::Number(n) if n == page => spans.push(Span::styled(
                    format!(" {} ", n),
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::Magenta)
                        .add_modifier(Modifier::BOLD),
                )),
                PageMarker::Number(n) => spans.push(Span::raw(format!(" {} ", n))),
                PageMarker::Gap => spans.push(Span::raw(" … ")),
            }
        }
        spans.push(Span::styled(
            " Next ›",
            if page < total_pages { enabled } else { disabled },
        ));
        spans.push(Span::styled(
            format!(
                "  ({} total event{})",
                total_count,
                if total_count == 1 { "" } else { "s" }
            ),
            Style::default().fg(Color::Gray),
        ));

        frame.render_widget(
            Paragraph::new(Line::from(spans)).alignment(Alignment::Center),
            area,
        );
    }

    fn render_status_bar(model: &TuiModel, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Length(1)])
            .split(area);

        let status = Paragraph::new(Self::build_status_text(model))
            .style(Style::default().fg(Color::White).bg(Color::DarkGray));
        frame.render_widget(status, chunks[0]);

        let hints = Paragraph::new(Self::get_key_hints(model)).style(Style::default().fg(Color::Gray));
        frame.render_widget(hints, chunks[1]);
    }

    /// Build status text for the status bar
    fn build_status_text(model: &TuiModel) -> String {
        let mut parts = Vec::new();

        match model.projection.last_updated {
            Some(at) => parts.push(format!("Updated {}", at.format("%H:%M:%S UTC"))),
            None => parts.push("Waiting for first fetch".to_string()),
        }

        if let Some(info) = model.projection.page_info {
            parts.push(format!(
                "server page {}/{} of {} events",
                info.page, info.total_pages, info.total_count
            ));
        }

        if let Some(err) = &model.projection.last_error {
            parts.push(format!("Last fetch failed: {}", err));
        } else if let Some(msg) = model.last_message() {
            parts.push(msg.to_string());
        }

        parts.join(" | ")
    }

    /// Get key hints for current mode
    fn get_key_hints(model: &TuiModel) -> &'static str {
        match &model.mode {
            ViewMode::Feed => "1/2/3 Filter | c Clear | n/p Page | Enter Details | r Refresh | ? Help | q Quit",
            ViewMode::Detail { .. } => "b/Esc Back | r Refresh | q Quit",
            ViewMode::Help => "Any key to close | q Quit",
        }
    }

    /// Render error overlay
    fn render_error_overlay(model: &TuiModel, frame: &mut Frame, area: Rect) {
        let popup_area = Self::centered_rect(60, 20, area);

        frame.render_widget(Clear, popup_area);

        let error_text: Vec<Line> = model
            .errors
            .iter()
            .map(|error| Line::from(error.as_str()))
            .collect();

        let error_popup = Paragraph::new(error_text)
            .block(Block::default().borders(Borders::ALL).title("Errors (Esc to dismiss)"))
            .style(Style::default().fg(Color::Red))
            .wrap(Wrap { trim: true });

        frame.render_widget(error_popup, popup_area);
    }

    /// Helper to create centered rectangle
    fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
        let popup_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage((100 - percent_y) / 2),
                Constraint::Percentage(percent_y),
                Constraint::Percentage((100 - percent_y) / 2),
            ])
            .split(r);

        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ])
            .split(popup_layout[1])[1]
    }
}
