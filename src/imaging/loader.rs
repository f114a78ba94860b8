//! Design file → [`RasterImage`].

use super::ImageError;
use super::density::read_resolution;
use super::raster::RasterImage;
use std::path::Path;
use tracing::{debug, info};

/// Read and decode a design file, attaching its pixel density when the file
/// records one.
pub fn load_raster(path: &Path) -> Result<RasterImage, ImageError> {
    let bytes = std::fs::read(path).map_err(|source| ImageError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let raster = decode_raster(&bytes)?;
    info!(
        path = %path.display(),
        width = raster.width(),
        height = raster.height(),
        "loaded design"
    );
    Ok(raster)
}

/// Decode in-memory image bytes (format guessed from the signature).
pub fn decode_raster(bytes: &[u8]) -> Result<RasterImage, ImageError> {
    let img = image::load_from_memory(bytes)?;
    let resolution = read_resolution(bytes);
    debug!(?resolution, "read pixel density");
    Ok(RasterImage::from_dynamic(&img).with_resolution(resolution))
}
