use anyhow::{anyhow, Result};
use repopulse_core::app::sort_latest_first;
use repopulse_core::ports::EventStore;
use repopulse_core::RepoEvent;
use std::collections::VecDeque;
use std::sync::RwLock;

/// Bounded in-memory event store used by the webhook receiver
pub struct MemoryEventStore {
    events: RwLock<VecDeque<RepoEvent>>,
    capacity: usize,
}

impl MemoryEventStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            events: RwLock::new(VecDeque::new()),
            capacity: capacity.max(1),
        }
    }
}

impl EventStore for MemoryEventStore {
    fn insert(&self, event: RepoEvent) -> Result<()> {
        let mut events = self
            .events
            .write()
            .map_err(|_| anyhow!("Event store lock poisoned"))?;

        events.push_back(event);
        while events.len() > self.capacity {
            events.pop_front();
        }
        Ok(())
    }

    fn latest(&self, limit: Option<usize>) -> Result<Vec<RepoEvent>> {
        let events = self
            .events
            .read()
            .map_err(|_| anyhow!("Event store lock poisoned"))?;

        // Insertion order breaks timestamp ties: newer insert first
        let mut result: Vec<_> = events.iter().rev().cloned().collect();
        sort_latest_first(&mut result);
        if let Some(limit) = limit {
            result.truncate(limit);
        }
        Ok(result)
    }

    fn len(&self) -> Result<usize> {
        let events = self
            .events
            .read()
            .map_err(|_| anyhow!("Event store lock poisoned"))?;
        Ok(events.len())
    }
}
