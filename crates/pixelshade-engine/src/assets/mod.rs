//! Asset loading: Wavefront OBJ/MTL geometry and PNG texture maps.
//!
//! Loading happens once at scene setup; every failure here is fatal to the caller.

mod image;
mod obj;
mod texture;

pub use image::{DecodedImage, decode_image};
pub use obj::{MeshSource, ObjError, ObjFace, ObjMaterial, load_obj, parse_mtl, parse_obj};
pub use texture::{upload_rgba8, white_texture};
