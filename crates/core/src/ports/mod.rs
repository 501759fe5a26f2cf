pub mod source;
pub mod store;
pub mod persistence;
pub mod time;

// Re-exports
pub use source::*;
pub use store::*;
pub use persistence::*;
pub use time::*;
