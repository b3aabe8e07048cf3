pub mod frame;
pub mod time;

pub use frame::Frame;
pub use time::{Clock, FPS, FRAME_DURATION_MS};
