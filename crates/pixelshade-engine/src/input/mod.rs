//! Input subsystem.
//!
//! `InputState` holds what is down, `InputFrame` what changed this frame.
//! Platform events are converted in `platform`; nothing here exposes winit.

mod debounce;
mod frame;
pub(crate) mod platform;
mod state;
mod types;

pub use debounce::{DebounceState, KeyDebounce};
pub use frame::InputFrame;
pub use state::InputState;
pub use types::{ButtonState, InputEvent, Key, MouseButton};
