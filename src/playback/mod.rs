pub mod controller;
pub mod state;
pub mod timer;

pub use controller::PlaybackController;
pub use state::{format_time, PlaybackState, PlaybackStatus, StatusColor};
