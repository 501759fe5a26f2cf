//! `repopulse list`: one fetch, printed as plain text.

use crate::adapters::http::HttpEventSource;
use crate::adapters::sample::SampleEventSource;
use crate::services::feed_service::{fetch_feed, FeedSettings};
use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use repopulse_core::app::{paginate, ActionFilter};
use repopulse_core::domain::{format_age, Event, Origin, RepoEvent};
use repopulse_core::ports::{AppConfig, Clock, EventSource, SystemClock};
use std::fmt::Write;
use std::sync::Arc;

/// Fetch once from the configured endpoint and print one page
pub async fn run(config: &AppConfig, filter: ActionFilter, page: usize) -> Result<()> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let source = HttpEventSource::new(&config.source.endpoint, config.source.request_timeout)?;
    let fallback = config
        .source
        .fallback_to_sample
        .then(|| SampleEventSource::new(clock.clone()));

    let settings = FeedSettings::from_config(config);
    let event = fetch_feed(
        &source,
        fallback.as_ref().map(|f| f as &dyn EventSource),
        clock.as_ref(),
        &settings.fetch_req(),
        settings.dedupe,
    )
    .await;

    match event {
        Event::EventsLoaded { events, origin, .. } => {
            let listing = render_listing(
                &events,
                origin,
                &filter,
                page,
                config.ui.page_size,
                clock.now(),
            );
            print!("{}", listing);
            Ok(())
        }
        Event::FetchFailed { msg } => bail!("Could not load events: {}", msg),
        other => bail!("Unexpected fetch result: {:?}", other),
    }
}

/// Plain text rendering of one page of the filtered list
pub fn render_listing(
    events: &[RepoEvent],
    origin: Origin,
    filter: &ActionFilter,
    page: usize,
    per_page: usize,
    now: DateTime<Utc>,
) -> String {
    let visible = filter.apply(events);
    let page = paginate(&visible, page, per_page);
    let mut out = String::new();

    if origin == Origin::Sample {
        let _ = writeln!(out, "Demo mode: receiver unreachable, showing sample data");
    }

    let filter_desc = if filter.is_active() {
        filter
            .selected()
            .map(|a| a.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    } else {
        "all".to_string()
    };
    let _ = writeln!(
        out,
        "Page {}/{} | {} of {} events | filter: {}",
        page.page,
        page.total_pages,
        page.total_count,
        events.len(),
        filter_desc
    );

    if page.is_empty() {
        let msg = if events.is_empty() {
            "No repository activity yet."
        } else {
            "No events match your current filters."
        };
        let _ = writeln!(out, "{}", msg);
        return out;
    }

    for event in page.items {
        let _ = writeln!(
            out,
            "{:>10}  {}  ({})",
            format_age(event.timestamp, now),
            event,
            event.request_id
        );
    }

    out
}
