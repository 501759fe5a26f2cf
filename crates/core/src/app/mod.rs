pub mod commands;
pub mod feed;
pub mod pagination;
pub mod queries;

pub use commands::*;
pub use feed::*;
pub use pagination::*;
pub use queries::*;
