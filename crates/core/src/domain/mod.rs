pub mod event;
pub mod envelope;
pub mod events;
pub mod sample;
pub mod webhook;

// Re-exports for convenience
pub use event::*;
pub use envelope::*;
pub use events::*;
pub use sample::*;
pub use webhook::*;
