//! RepoPulse Core - Pure domain logic with no I/O
//!
//! This crate contains the activity event model, webhook payload parsing,
//! the feed operations (dedupe, filter, paginate, stats), and the ports
//! (interfaces) that adapters implement. It has no dependencies on UI
//! frameworks, HTTP clients, or the filesystem.

pub mod domain;
pub mod ports;
pub mod app;
pub mod error;

// Re-exports for ergonomics
pub use domain::*;
pub use error::*;
