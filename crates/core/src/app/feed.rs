//! Pure operations over the fetched event list.

use crate::domain::{Action, RepoEvent};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// Drop repeated events, keeping the first occurrence of every key
pub fn dedupe(events: Vec<RepoEvent>) -> Vec<RepoEvent> {
    let mut seen = HashSet::with_capacity(events.len());
    events
        .into_iter()
        .filter(|event| seen.insert(event.key()))
        .collect()
}

/// Latest first; equal timestamps keep their relative order
pub fn sort_latest_first(events: &mut [RepoEvent]) {
    events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}

/// Prepare a freshly fetched list for display
pub fn normalize(events: Vec<RepoEvent>, dedupe_events: bool) -> Vec<RepoEvent> {
    let mut events = if dedupe_events { dedupe(events) } else { events };
    sort_latest_first(&mut events);
    events
}

/// Set of actions the user wants to see. An empty set shows everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionFilter {
    selected: BTreeSet<Action>,
}

impl ActionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_actions<I: IntoIterator<Item = Action>>(actions: I) -> Self {
        Self {
            selected: actions.into_iter().collect(),
        }
    }

    /// Flip membership of `action`; returns whether it is now selected
    pub fn toggle(&mut self, action: Action) -> bool {
        if !self.selected.remove(&action) {
            self.selected.insert(action);
            true
        } else {
            false
        }
    }

    pub fn select(&mut self, action: Action) {
        self.selected.insert(action);
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn is_selected(&self, action: Action) -> bool {
        self.selected.contains(&action)
    }

    pub fn is_active(&self) -> bool {
        !self.selected.is_empty()
    }

    pub fn selected(&self) -> impl Iterator<Item = Action> + '_ {
        self.selected.iter().copied()
    }

    pub fn matches(&self, event: &RepoEvent) -> bool {
        self.selected.is_empty() || self.selected.contains(&event.action)
    }

    pub fn apply<'a>(&self, events: &'a [RepoEvent]) -> Vec<&'a RepoEvent> {
        events.iter().filter(|e| self.matches(e)).collect()
    }
}

/// Aggregate counters for the stat cards
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActivityStats {
    pub total: usize,
    pub pushes: usize,
    pub pull_requests: usize,
    pub merges: usize,
}

impl ActivityStats {
    pub fn from_events(events: &[RepoEvent]) -> Self {
        events.iter().fold(Self::default(), |mut stats, event| {
            stats.total += 1;
            match event.action {
                Action::Push => stats.pushes += 1,
                Action::PullRequest => stats.pull_requests += 1,
                Action::Merge => stats.merges += 1,
            }
            stats
        })
    }

    pub fn count(&self, action: Action) -> usize {
        match action {
            Action::Push => self.pushes,
            Action::PullRequest => self.pull_requests,
            Action::Merge => self.merges,
        }
    }
}
