use anyhow::{Context, Result};
use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::{backend::TestBackend, Terminal};
use repopulse::adapters::http::HttpEventSource;
use repopulse::adapters::persistence::FileStateStore;
use repopulse::services::feed_service::FeedService;
use repopulse::tui::{TuiMessage, TuiModel, TuiUpdate, TuiView};
use repopulse_core::app::Command;
use repopulse_core::domain::Event;
use repopulse_core::ports::{AppConfig, StateStore, SystemClock};
use repopulse_core::Action;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::mpsc;
use tokio::time::timeout;

async fn wait_for(
    rx: &mut mpsc::UnboundedReceiver<Event>,
    model: &mut TuiModel,
    done: impl Fn(&Event) -> bool,
) -> Result<()> {
    loop {
        let event = timeout(Duration::from_secs(10), rx.recv())
            .await?
            .context("feed service closed its channel")?;
        model.apply_event(&event);
        if done(&event) {
            return Ok(());
        }
    }
}

fn press(model: &mut TuiModel, key: char) -> Result<Command> {
    match TuiUpdate::handle_key(model, KeyCode::Char(key), KeyModifiers::NONE)? {
        TuiMessage::Command(cmd) => Ok(cmd),
        TuiMessage::None => anyhow::bail!("key {:?} produced no command", key),
    }
}

fn screen_text(model: &TuiModel) -> Result<String> {
    let mut terminal = Terminal::new(TestBackend::new(120, 40))?;
    terminal.draw(|frame| TuiView::render(model, frame))?;
    Ok(terminal
        .backend()
        .buffer()
        .content
        .iter()
        .map(|cell| cell.symbol())
        .collect())
}

#[tokio::test]
async fn test_unreachable_receiver_shows_demo_data_and_remembers_filter() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let state_path = temp_dir.path().join("state.toml");

    let mut config = AppConfig::default();
    // Nothing listens on port 1
    config.source.endpoint = "http://127.0.0.1:1/webhook/events".to_string();
    config.source.request_timeout = Duration::from_secs(2);

    let source = Arc::new(HttpEventSource::new(
        &config.source.endpoint,
        config.source.request_timeout,
    )?);
    let state_store = Arc::new(FileStateStore::with_path(&state_path));
    let (mut service, mut event_rx, command_tx) =
        FeedService::new(source, state_store, Arc::new(SystemClock), &config);

    let mut model = TuiModel::new(config.ui.page_size, service.saved_filter());
    assert!(!model.filter.is_active());

    let handle = tokio::spawn(async move { service.run().await });

    wait_for(&mut event_rx, &mut model, |e| {
        matches!(e, Event::EventsLoaded { .. })
    })
    .await?;

    assert!(model.projection.is_demo());
    assert_eq!(model.projection.stats().total, 6);
    assert!(screen_text(&model)?.contains("[DEMO MODE]"));

    command_tx.send(press(&mut model, '2')?)?;
    wait_for(&mut event_rx, &mut model, |e| matches!(e, Event::FilterPersisted)).await?;

    assert_eq!(model.visible_events().len(), 2);
    assert!(model
        .visible_events()
        .iter()
        .all(|e| e.action == Action::PullRequest));
    // Counters still describe the whole feed
    assert_eq!(model.projection.stats().total, 6);

    let quit = press(&mut model, 'q')?;
    assert_eq!(quit, Command::Quit);
    command_tx.send(quit)?;
    handle.await??;

    let saved = FileStateStore::with_path(&state_path)
        .load_state()?
        .context("filter was not saved")?;
    assert!(saved.filter.is_selected(Action::PullRequest));
    assert!(!saved.filter.is_selected(Action::Push));

    Ok(())
}
