//! Palette preprocessing for the pixelshade outline pass.
//!
//! This crate is intentionally dependency-free so the palette step can run
//! from build scripts or tooling without pulling in any GPU code.
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`color`] | `Rgb` hex parsing, `Oklab` conversion |
//! | [`error`] | `PaletteError` |
//! | [`palette`] | `Palette`, WGSL generation, marker substitution |
//!
//! ```rust
//! use pixelshade_palette::{compile_outline_shader, Palette};
//!
//! let palette = Palette::parse("#1a1c2c\n#5d275d\n\n#b13e53\n").unwrap();
//! assert_eq!(palette.len(), 3);
//!
//! let wgsl = compile_outline_shader("//#PALETTE\nfn f() {}", &palette).unwrap();
//! assert!(wgsl.contains("PALETTE_LEN: u32 = 3u"));
//! ```

pub mod color;
pub mod error;
pub mod palette;

pub use color::{Oklab, Rgb};
pub use error::PaletteError;
pub use palette::{compile_outline_shader, Palette, PALETTE_MARKER};
