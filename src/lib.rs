//! RepoPulse application library
//!
//! Adapters, services and front ends built on `repopulse-core`. Exposed as a
//! library so the integration tests can drive them directly.

pub mod adapters;
pub mod cli;
pub mod dashboard;
pub mod list;
pub mod server;
pub mod services;
pub mod tui;
