//! Adapter, device and window surface.
//!
//! `Gpu` presents to a window; `HeadlessGpu` renders offscreen only.

mod adapter;
mod frame;
mod gpu;
mod headless;
mod init;
mod surface;

pub use frame::{GpuFrame, SurfaceErrorAction};
pub use gpu::Gpu;
pub use headless::HeadlessGpu;
pub use init::GpuInit;
