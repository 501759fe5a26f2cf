pub mod model;
pub mod update;
pub mod view;

pub use model::{TuiModel, UiState, ViewMode};
pub use update::{TuiMessage, TuiUpdate};
pub use view::TuiView;
