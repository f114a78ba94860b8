//! In-memory pixel buffer the coverage analyzer reads.
//!
//! A [`RasterImage`] holds either RGBA pixels (alpha 0 = fully transparent)
//! or CMYK pixels (0 = no ink, 255 = full ink), four bytes per pixel, row
//! major. The buffer length is checked once on construction so the scan
//! code can index without bounds surprises.

use super::ImageError;
use crate::types::Resolution;
use image::{DynamicImage, RgbaImage};

/// Bytes per pixel for both layouts.
pub const CHANNELS: usize = 4;

/// Pixel layout of a [`RasterImage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelLayout {
    Rgba,
    Cmyk,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    layout: PixelLayout,
    data: Vec<u8>,
    resolution: Option<Resolution>,
}

impl RasterImage {
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self, ImageError> {
        Self::new(width, height, PixelLayout::Rgba, data)
    }

    pub fn from_cmyk(width: u32, height: u32, data: Vec<u8>) -> Result<Self, ImageError> {
        Self::new(width, height, PixelLayout::Cmyk, data)
    }

    fn new(
        width: u32,
        height: u32,
        layout: PixelLayout,
        data: Vec<u8>,
    ) -> Result<Self, ImageError> {
        let expected = width as usize * height as usize * CHANNELS;
        if data.len() != expected {
            return Err(ImageError::BufferSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            layout,
            data,
            resolution: None,
        })
    }

    /// Convert a decoded image to RGBA8. Resolution is not carried by
    /// `DynamicImage`; attach it with [`with_resolution`](Self::with_resolution).
    ///
    /// Alpha that is nonzero in a 16-bit or float source never quantizes to
    /// 0: such pixels keep alpha 1 so they still count as printed.
    pub fn from_dynamic(img: &DynamicImage) -> Self {
        let mut rgba = img.to_rgba8();
        match img {
            DynamicImage::ImageLumaA16(_) | DynamicImage::ImageRgba16(_) => {
                let wide = img.to_rgba16();
                keep_faint_alpha(&mut rgba, wide.pixels().map(|px| px[3] > 0));
            }
            DynamicImage::ImageRgba32F(_) => {
                let wide = img.to_rgba32f();
                keep_faint_alpha(&mut rgba, wide.pixels().map(|px| px[3] > 0.0));
            }
            _ => {}
        }
        let (width, height) = rgba.dimensions();
        Self {
            width,
            height,
            layout: PixelLayout::Rgba,
            data: rgba.into_raw(),
            resolution: None,
        }
    }

    pub fn with_resolution(mut self, resolution: Option<Resolution>) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn layout(&self) -> PixelLayout {
        self.layout
    }

    pub fn resolution(&self) -> Option<Resolution> {
        self.resolution
    }

    pub fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Raw interleaved bytes, `CHANNELS` per pixel.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Bytes in one row of pixels.
    pub fn row_stride(&self) -> usize {
        self.width as usize * CHANNELS
    }
}

/// Raise alpha 0 to 1 wherever the source pixel was not fully transparent.
fn keep_faint_alpha(rgba: &mut RgbaImage, visible: impl Iterator<Item = bool>) {
    for (px, visible) in rgba.pixels_mut().zip(visible) {
        if visible && px[3] == 0 {
            px[3] = 1;
        }
    }
}
