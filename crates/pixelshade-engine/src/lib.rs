//! Pixelshade engine crate.
//!
//! Platform and GPU runtime (window, surface, input, frame clock, logging) and
//! the render core: shadow-mapped scene, pixel-art post effect, shader programs.

pub mod assets;
pub mod core;
pub mod device;
pub mod input;
pub mod logging;
pub mod render;
pub mod time;
pub mod window;
