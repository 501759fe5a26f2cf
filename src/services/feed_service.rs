use crate::adapters::sample::SampleEventSource;
use anyhow::Result;
use repopulse_core::app::{normalize, ActionFilter, Command};
use repopulse_core::domain::{Event, Origin};
use repopulse_core::ports::{
    AppConfig, CachedState, Clock, EventSource, FetchReq, StateStore,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

const MIN_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Polling and persistence knobs taken from the config
#[derive(Debug, Clone)]
pub struct FeedSettings {
    pub poll_interval: Duration,
    pub dedupe: bool,
    pub server_page_size: Option<usize>,
    pub remember_filter: bool,
}

impl FeedSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            // tokio intervals cannot tick at a zero period
            poll_interval: config.source.poll_interval.max(MIN_POLL_INTERVAL),
            dedupe: config.source.dedupe,
            server_page_size: config.source.server_page_size,
            remember_filter: config.ui.remember_filter,
        }
    }

    pub fn fetch_req(&self) -> FetchReq {
        FetchReq {
            page: self.server_page_size.map(|_| 1),
            per_page: self.server_page_size,
        }
    }
}

/// Fetch from `source`, substituting `fallback` data when the fetch fails.
///
/// Always resolves to an `EventsLoaded` or `FetchFailed` event.
pub async fn fetch_feed(
    source: &dyn EventSource,
    fallback: Option<&dyn EventSource>,
    clock: &dyn Clock,
    req: &FetchReq,
    dedupe: bool,
) -> Event {
    let err = match source.fetch(req).await {
        Ok(fetched) => {
            return Event::EventsLoaded {
                events: normalize(fetched.events, dedupe),
                origin: Origin::Live,
                page_info: fetched.page_info,
                at: clock.now(),
            };
        }
        Err(e) => e,
    };

    let Some(fallback) = fallback else {
        error!("Fetch from {} failed: {:#}", source.describe(), err);
        return Event::FetchFailed {
            msg: format!("{:#}", err),
        };
    };

    warn!(
        "Failed to fetch from {}, using {}: {:#}",
        source.describe(),
        fallback.describe(),
        err
    );

    match fallback.fetch(req).await {
        Ok(fetched) => Event::EventsLoaded {
            events: normalize(fetched.events, dedupe),
            origin: Origin::Sample,
            page_info: None,
            at: clock.now(),
        },
        Err(e) => Event::FetchFailed {
            msg: format!("{:#}", e),
        },
    }
}

/// Background service that polls the event source and feeds the UI.
///
/// Communicates only through channels: commands in, events out.
pub struct FeedService {
    source: Arc<dyn EventSource>,
    fallback: Option<Arc<dyn EventSource>>,
    state_store: Arc<dyn StateStore>,
    clock: Arc<dyn Clock>,
    settings: FeedSettings,

    // Internal event bus
    event_tx: mpsc::UnboundedSender<Event>,
    event_rx: mpsc::UnboundedReceiver<Event>,

    // External event sender (for the TUI)
    event_tx_external: mpsc::UnboundedSender<Event>,

    command_rx: mpsc::UnboundedReceiver<Command>,

    fetch_in_flight: bool,
    tasks: JoinSet<Result<()>>,
}

impl FeedService {
    pub fn new(
        source: Arc<dyn EventSource>,
        state_store: Arc<dyn StateStore>,
        clock: Arc<dyn Clock>,
        config: &AppConfig,
    ) -> (Self, mpsc::UnboundedReceiver<Event>, mpsc::UnboundedSender<Command>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (event_tx_external, event_rx_external) = mpsc::unbounded_channel();
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        let fallback: Option<Arc<dyn EventSource>> = if config.source.fallback_to_sample {
            Some(Arc::new(SampleEventSource::new(clock.clone())))
        } else {
            None
        };

        let service = Self {
            source,
            fallback,
            state_store,
            clock,
            settings: FeedSettings::from_config(config),
            event_tx,
            event_rx,
            event_tx_external,
            command_rx,
            fetch_in_flight: false,
            tasks: JoinSet::new(),
        };

        (service, event_rx_external, command_tx)
    }

    /// Filter selection saved by a previous session, if remembering is on
    pub fn saved_filter(&self) -> ActionFilter {
        if !self.settings.remember_filter {
            return ActionFilter::default();
        }

        match self.state_store.load_state() {
            Ok(Some(state)) => state.filter,
            Ok(None) => ActionFilter::default(),
            Err(e) => {
                warn!("Ignoring unreadable state file: {:#}", e);
                ActionFilter::default()
            }
        }
    }

    /// Run until `Command::Quit` arrives or the command channel closes
    pub async fn run(&mut self) -> Result<()> {
        info!(
            "Polling {} every {:?}",
            self.source.describe(),
            self.settings.poll_interval
        );

        let mut ticker = tokio::time::interval(self.settings.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.start_fetch();
                }

                command = self.command_rx.recv() => {
                    match command {
                        Some(Command::Quit) | None => {
                            info!("Feed service stopping");
                            let _ = self.event_tx_external.send(Event::QuitRequested);
                            break;
                        }
                        Some(cmd) => self.handle_command(cmd),
                    }
                }

                Some(event) = self.event_rx.recv() => {
                    self.handle_event(event);
                }

                Some(task_result) = self.tasks.join_next(), if !self.tasks.is_empty() => {
                    match task_result {
                        Ok(Ok(())) => {}
                        Ok(Err(e)) => {
                            error!("Background task failed: {:#}", e);
                        }
                        Err(e) => {
                            error!("Background task panicked: {}", e);
                            // A panicked fetch never reports back
                            self.fetch_in_flight = false;
                            let _ = self.event_tx_external.send(Event::Error {
                                msg: format!("Background task failed: {}", e),
                            });
                        }
                    }
                }
            }
        }

        self.tasks.abort_all();
        Ok(())
    }

    /// Handle a command from the UI
    pub fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Refresh => {
                info!("Manual refresh requested");
                self.start_fetch();
            }
            Command::PersistFilter { filter } => {
                self.persist_filter(filter);
            }
            Command::Quit => {
                let _ = self.event_tx.send(Event::QuitRequested);
            }
        }
    }

    fn start_fetch(&mut self) {
        if self.fetch_in_flight {
            debug!("Fetch already in flight, skipping");
            return;
        }
        self.fetch_in_flight = true;
        let _ = self.event_tx.send(Event::FetchStarted);

        let source = self.source.clone();
        let fallback = self.fallback.clone();
        let clock = self.clock.clone();
        let req = self.settings.fetch_req();
        let dedupe = self.settings.dedupe;
        let event_tx = self.event_tx.clone();

        self.tasks.spawn(async move {
            let event = fetch_feed(
                source.as_ref(),
                fallback.as_deref(),
                clock.as_ref(),
                &req,
                dedupe,
            )
            .await;
            let _ = event_tx.send(event);
            Ok(())
        });
    }

    fn persist_filter(&mut self, filter: ActionFilter) {
        if !self.settings.remember_filter {
            return;
        }

        let state_store = self.state_store.clone();
        let event_tx = self.event_tx.clone();

        self.tasks.spawn(async move {
            let result = tokio::task::spawn_blocking(move || {
                state_store.save_state(&CachedState { filter })
            })
            .await;

            match result {
                Ok(Ok(())) => {
                    let _ = event_tx.send(Event::FilterPersisted);
                }
                Ok(Err(e)) => {
                    error!("Failed to save filter: {:#}", e);
                    let _ = event_tx.send(Event::Error {
                        msg: format!("Saving filter failed: {:#}", e),
                    });
                }
                Err(e) => {
                    error!("Filter save task panicked: {}", e);
                    let _ = event_tx.send(Event::Error {
                        msg: format!("Saving filter failed: {}", e),
                    });
                }
            }

            Ok(())
        });
    }

    /// Track fetch completion and forward the event to the UI
    fn handle_event(&mut self, event: Event) {
        match &event {
            Event::EventsLoaded { events, origin, .. } => {
                self.fetch_in_flight = false;
                debug!("Loaded {} events ({:?})", events.len(), origin);
            }
            Event::FetchFailed { msg } => {
                self.fetch_in_flight = false;
                debug!("Fetch failed: {}", msg);
            }
            Event::FilterPersisted => {
                debug!("Filter saved");
            }
            Event::FetchStarted | Event::Error { .. } | Event::QuitRequested => {}
        }

        let _ = self.event_tx_external.send(event);
    }
}

impl Drop for FeedService {
    fn drop(&mut self) {
        self.tasks.abort_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use repopulse_core::domain::{sample_events, PageInfo};
    use repopulse_core::ports::{FetchedEvents, FixedClock};
    use repopulse_core::Action;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn clock() -> Arc<dyn Clock> {
        Arc::new(FixedClock(
            Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap(),
        ))
    }

    struct DownSource;

    #[async_trait]
    impl EventSource for DownSource {
        async fn fetch(&self, _req: &FetchReq) -> Result<FetchedEvents> {
            Err(anyhow!("connection refused"))
        }

        fn describe(&self) -> String {
            "down".to_string()
        }
    }

    /// Serves the sample set twice over, counting calls
    #[derive(Default)]
    struct CountingSource {
        calls: AtomicUsize,
        last_req: Mutex<Option<FetchReq>>,
    }

    #[async_trait]
    impl EventSource for CountingSource {
        async fn fetch(&self, req: &FetchReq) -> Result<FetchedEvents> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_req.lock().unwrap() = Some(req.clone());
            let mut events = sample_events(Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap());
            events.extend(events.clone());
            events.reverse();
            Ok(FetchedEvents {
                events,
                page_info: Some(PageInfo {
                    page: 1,
                    total_pages: 1,
                    total_count: 12,
                }),
            })
        }

        fn describe(&self) -> String {
            "counting".to_string()
        }
    }

    #[derive(Default)]
    struct MemoryState(Mutex<Option<CachedState>>);

    impl StateStore for MemoryState {
        fn load_state(&self) -> Result<Option<CachedState>> {
            Ok(self.0.lock().unwrap().clone())
        }

        fn save_state(&self, state: &CachedState) -> Result<()> {
            *self.0.lock().unwrap() = Some(state.clone());
            Ok(())
        }
    }

    fn quiet_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.source.poll_interval = Duration::from_secs(3600);
        config
    }

    async fn next_loaded(rx: &mut mpsc::UnboundedReceiver<Event>) -> Event {
        loop {
            let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
                .await
                .expect("timed out waiting for event")
                .expect("channel closed");
            if matches!(event, Event::EventsLoaded { .. } | Event::FetchFailed { .. }) {
                return event;
            }
        }
    }

    #[tokio::test]
    async fn test_fetch_failure_falls_back_to_sample() {
        let (mut service, mut events, commands) = FeedService::new(
            Arc::new(DownSource),
            Arc::new(MemoryState::default()),
            clock(),
            &quiet_config(),
        );
        let handle = tokio::spawn(async move { service.run().await });

        match next_loaded(&mut events).await {
            Event::EventsLoaded { events, origin, .. } => {
                assert_eq!(origin, Origin::Sample);
                assert_eq!(events.len(), 6);
                assert_eq!(events[0].request_id, "req_001");
            }
            other => panic!("unexpected event: {:?}", other),
        }

        commands.send(Command::Quit).unwrap();
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_fetch_failure_without_fallback_reports_error() {
        let mut config = quiet_config();
        config.source.fallback_to_sample = false;
        let (mut service, mut events, commands) = FeedService::new(
            Arc::new(DownSource),
            Arc::new(MemoryState::default()),
            clock(),
            &config,
        );
        let handle = tokio::spawn(async move { service.run().await });

        match next_loaded(&mut events).await {
            Event::FetchFailed { msg } => assert!(msg.contains("connection refused")),
            other => panic!("unexpected event: {:?}", other),
        }

        commands.send(Command::Quit).unwrap();
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_live_events_are_normalised_and_refresh_fetches_again() {
        let source = Arc::new(CountingSource::default());
        let mut config = quiet_config();
        config.source.server_page_size = Some(50);
        let (mut service, mut events, commands) = FeedService::new(
            source.clone(),
            Arc::new(MemoryState::default()),
            clock(),
            &config,
        );
        let handle = tokio::spawn(async move { service.run().await });

        match next_loaded(&mut events).await {
            Event::EventsLoaded {
                events,
                origin,
                page_info,
                ..
            } => {
                assert_eq!(origin, Origin::Live);
                assert_eq!(events.len(), 6);
                assert!(events.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
                assert_eq!(page_info.map(|p| p.total_count), Some(12));
            }
            other => panic!("unexpected event: {:?}", other),
        }

        commands.send(Command::Refresh).unwrap();
        next_loaded(&mut events).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
        assert_eq!(
            *source.last_req.lock().unwrap(),
            Some(FetchReq {
                page: Some(1),
                per_page: Some(50)
            })
        );

        commands.send(Command::Quit).unwrap();
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_persist_filter_writes_state() {
        let state = Arc::new(MemoryState::default());
        let (mut service, mut events, commands) = FeedService::new(
            Arc::new(DownSource),
            state.clone(),
            clock(),
            &quiet_config(),
        );
        assert_eq!(service.saved_filter(), ActionFilter::default());
        let handle = tokio::spawn(async move { service.run().await });

        let filter = ActionFilter::from_actions([Action::Push]);
        commands
            .send(Command::PersistFilter {
                filter: filter.clone(),
            })
            .unwrap();

        loop {
            let event = tokio::time::timeout(Duration::from_secs(5), events.recv())
                .await
                .unwrap()
                .unwrap();
            if matches!(event, Event::FilterPersisted) {
                break;
            }
        }
        assert_eq!(state.load_state().unwrap(), Some(CachedState { filter }));

        commands.send(Command::Quit).unwrap();
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_saved_filter_ignored_when_not_remembering() {
        let state = Arc::new(MemoryState::default());
        state
            .save_state(&CachedState {
                filter: ActionFilter::from_actions([Action::Merge]),
            })
            .unwrap();

        let mut config = quiet_config();
        let (service, _events, _commands) =
            FeedService::new(Arc::new(DownSource), state.clone(), clock(), &config);
        assert_eq!(
            service.saved_filter(),
            ActionFilter::from_actions([Action::Merge])
        );

        config.ui.remember_filter = false;
        let (service, _events, _commands) =
            FeedService::new(Arc::new(DownSource), state, clock(), &config);
        assert_eq!(service.saved_filter(), ActionFilter::default());
    }

    #[test]
    fn test_settings_never_use_a_zero_poll_interval() {
        let mut config = AppConfig::default();
        config.source.poll_interval = Duration::ZERO;
        assert_eq!(
            FeedSettings::from_config(&config).poll_interval,
            MIN_POLL_INTERVAL
        );
    }

    #[tokio::test]
    async fn test_closing_command_channel_stops_service() {
        let (mut service, mut events, commands) = FeedService::new(
            Arc::new(DownSource),
            Arc::new(MemoryState::default()),
            clock(),
            &quiet_config(),
        );
        drop(commands);
        service.run().await.unwrap();

        let mut saw_quit = false;
        while let Ok(event) = events.try_recv() {
            saw_quit |= matches!(event, Event::QuitRequested);
        }
        assert!(saw_quit);
    }
}
