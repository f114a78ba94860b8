//! Image input: everything between a design file on disk and the pixel
//! buffer the engine scans.
//!
//! | Step | Crate / function |
//! |---|---|
//! | **Decode** (PNG, JPEG, TIFF, WebP) | `image::load_from_memory` |
//! | **Pixel density** | custom reader (PNG `pHYs`, JPEG JFIF/EXIF, TIFF IFD) |
//! | **Buffer** | [`RasterImage`], RGBA or CMYK, 4 bytes per pixel |
//!
//! The engine itself never touches the filesystem; [`load_raster`] is the
//! collaborator the CLI calls before handing the buffer over.

pub(crate) mod density;
mod loader;
pub mod raster;

pub use density::read_resolution;
pub use loader::{decode_raster, load_raster};
pub use raster::{PixelLayout, RasterImage};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImageError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("Pixel buffer holds {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },
}
