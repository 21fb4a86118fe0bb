//! Foundational types shared by every Orrery crate.

pub mod errors;
pub mod input;
pub mod time;

pub use errors::{AssetError, ConfigError, DrawError, Error, Result};
pub use input::{ButtonState, Input, MouseButton};
pub use time::{FrameState, Timer};
