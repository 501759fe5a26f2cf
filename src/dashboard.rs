//! Composition root for the interactive dashboard.

use crate::adapters::http::HttpEventSource;
use crate::adapters::persistence::FileStateStore;
use crate::services::feed_service::FeedService;
use crate::tui::{TuiMessage, TuiModel, TuiUpdate, TuiView};
use anyhow::{anyhow, Result};
use crossterm::{
    event::{self, Event as TermEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use repopulse_core::app::Command;
use repopulse_core::domain::Event;
use repopulse_core::ports::{AppConfig, Clock, EventSource, StateStore, SystemClock};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

type Term = Terminal<CrosstermBackend<io::Stdout>>;

/// Wires the feed service to the terminal UI
pub struct Dashboard {
    service: FeedService,
    model: TuiModel,
    clock: Arc<dyn Clock>,
    event_rx: mpsc::UnboundedReceiver<Event>,
    command_tx: mpsc::UnboundedSender<Command>,
}

impl Dashboard {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let source = HttpEventSource::new(&config.source.endpoint, config.source.request_timeout)?;
        let source_label = source.describe();
        let source: Arc<dyn EventSource> = Arc::new(source);
        let state_store: Arc<dyn StateStore> = Arc::new(FileStateStore::new()?);
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        let (service, event_rx, command_tx) =
            FeedService::new(source, state_store, clock.clone(), config);

        let mut model = TuiModel::new(config.ui.page_size, service.saved_filter());
        model.source_label = source_label;
        model.ui_state.now = clock.now();

        Ok(Self {
            service,
            model,
            clock,
            event_rx,
            command_tx,
        })
    }

    pub async fn run(self) -> Result<()> {
        let Dashboard {
            mut service,
            mut model,
            clock,
            event_rx,
            command_tx,
        } = self;

        let service_handle = tokio::spawn(async move { service.run().await });

        let mut terminal = setup_terminal()?;
        let result = run_main_loop(&mut model, &mut terminal, clock.as_ref(), event_rx, &command_tx).await;
        restore_terminal(&mut terminal)?;

        // Stops the service if the loop ended on an error
        let _ = command_tx.send(Command::Quit);
        match service_handle.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!("Feed service failed: {:#}", e),
            Err(e) => error!("Feed service task failed: {:?}", e),
        }

        result
    }
}

fn setup_terminal() -> Result<Term> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn restore_terminal(terminal: &mut Term) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Apply one terminal event to the model, forwarding any resulting command
fn handle_input(
    model: &mut TuiModel,
    input: TermEvent,
    command_tx: &mpsc::UnboundedSender<Command>,
) -> Result<()> {
    match input {
        TermEvent::Key(key) if key.kind == KeyEventKind::Press => {
            let message = TuiUpdate::handle_key(model, key.code, key.modifiers)?;
            if let TuiMessage::Command(cmd) = message {
                debug!("Sending command to feed service: {:?}", cmd);
                if matches!(cmd, Command::Quit) {
                    model.should_quit = true;
                }
                if let Err(e) = command_tx.send(cmd) {
                    error!("Failed to send command: {}", e);
                }
            }
        }
        TermEvent::Resize(width, height) => {
            TuiUpdate::handle_resize(model, width, height)?;
        }
        _ => {}
    }
    Ok(())
}

/// Read terminal input on a blocking thread until the receiver goes away
fn spawn_input_reader(tx: mpsc::UnboundedSender<TermEvent>) -> JoinHandle<Result<()>> {
    tokio::task::spawn_blocking(move || {
        while !tx.is_closed() {
            if event::poll(Duration::from_millis(100))? && tx.send(event::read()?).is_err() {
                break;
            }
        }
        Ok(())
    })
}

async fn run_main_loop(
    model: &mut TuiModel,
    terminal: &mut Term,
    clock: &dyn Clock,
    mut event_rx: mpsc::UnboundedReceiver<Event>,
    command_tx: &mpsc::UnboundedSender<Command>,
) -> Result<()> {
    let (input_tx, mut input_rx) = mpsc::unbounded_channel();
    let reader = spawn_input_reader(input_tx);

    // Relative ages only need refreshing now and then
    let mut clock_tick = tokio::time::interval(Duration::from_secs(30));
    clock_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

    terminal.draw(|frame| TuiView::render(model, frame))?;

    loop {
        tokio::select! {
            Some(event) = event_rx.recv() => {
                debug!("Received event from feed service: {:?}", event);
                model.apply_event(&event);
            }

            input = input_rx.recv() => match input {
                Some(input) => handle_input(model, input, command_tx)?,
                None => {
                    // The reader only stops on its own when reading failed
                    return match reader.await {
                        Ok(Err(e)) => Err(e.context("Failed to read terminal input")),
                        Ok(Ok(())) => Err(anyhow!("Terminal input reader stopped")),
                        Err(e) => Err(anyhow!("Terminal input reader failed: {}", e)),
                    };
                }
            },

            _ = clock_tick.tick() => {
                model.ui_state.now = clock.now();
            }
        }

        if model.should_quit {
            info!("Quit requested, exiting main loop");
            break;
        }

        terminal.draw(|frame| TuiView::render(model, frame))?;
    }

    // Closing the channel stops the reader at its next poll
    drop(input_rx);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use repopulse_core::app::ActionFilter;
    use repopulse_core::Action;

    fn key(c: char) -> TermEvent {
        TermEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
    }

    #[test]
    fn test_input_forwards_commands() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut model = TuiModel::new(5, ActionFilter::default());

        handle_input(&mut model, key('1'), &tx).unwrap();
        assert_eq!(
            rx.try_recv().unwrap(),
            Command::PersistFilter {
                filter: ActionFilter::from_actions([Action::Push])
            }
        );

        handle_input(&mut model, key('q'), &tx).unwrap();
        assert_eq!(rx.try_recv().unwrap(), Command::Quit);
        assert!(model.should_quit);
    }

    #[test]
    fn test_input_resize_and_releases() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut model = TuiModel::new(5, ActionFilter::default());

        handle_input(&mut model, TermEvent::Resize(100, 30), &tx).unwrap();
        assert_eq!(model.ui_state.terminal_width, 100);
        assert_eq!(model.ui_state.terminal_height, 30);

        let mut release = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;
        handle_input(&mut model, TermEvent::Key(release), &tx).unwrap();
        assert!(!model.should_quit);
        assert!(rx.try_recv().is_err());
    }
}
