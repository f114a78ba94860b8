//! Coverage analyzer: how much of a design actually carries ink.
//!
//! ## Methods
//!
//! | Method | Question answered | `overall_ratio` |
//! |---|---|---|
//! | [`AlphaThreshold`](CoverageMethod::AlphaThreshold) | what fraction of the area is printed? | printed pixels / total pixels |
//! | [`ColorantMean`](CoverageMethod::ColorantMean) | how much colorant lands on average? | mean of the four CMYK channel means |
//!
//! A pixel counts as printed iff its alpha is strictly greater than zero.
//! CMYK buffers have no alpha channel, so every pixel counts.
//!
//! For the colorant method RGBA pixels are converted with the naive
//! `k = 1 - max(r, g, b)` separation and scaled by alpha: a fully
//! transparent pixel deposits nothing, whatever its color bytes say.
//!
//! ## Parallel scan
//!
//! The buffer is split into fixed blocks of rows and scanned with
//! [rayon](https://docs.rs/rayon). Each block is summed sequentially and the
//! partial sums are merged in block order, so the result does not depend on
//! how many threads ran or how work was stolen: the same bytes always give
//! the same ratio.

use crate::error::EstimateError;
use crate::imaging::raster::CHANNELS;
use crate::imaging::{PixelLayout, RasterImage};
use crate::types::{ChannelCoverage, CoverageMethod, CoverageResult};
use rayon::prelude::*;
use tracing::debug;

/// Rows per parallel work item.
const ROWS_PER_BLOCK: usize = 64;

/// Measure coverage of `image` with the chosen method.
///
/// Fails with [`EstimateError::EmptyImage`] when the image has no pixels.
pub fn analyze(image: &RasterImage, method: CoverageMethod) -> Result<CoverageResult, EstimateError> {
    let total = image.pixel_count();
    if total == 0 {
        return Err(EstimateError::EmptyImage);
    }

    let result = match method {
        CoverageMethod::AlphaThreshold => alpha_coverage(image, total),
        CoverageMethod::ColorantMean => colorant_coverage(image, total),
    };
    debug!(
        %method,
        pixels = total,
        ratio = result.overall_ratio,
        "coverage scan complete"
    );
    Ok(result)
}

/// Coverage supplied by the operator instead of measured.
///
/// Used when there is no design image (the default is 1.0, full coverage)
/// or when the operator overrides the measurement.
pub fn forced(ratio: f64) -> Result<CoverageResult, EstimateError> {
    if !(0.0..=1.0).contains(&ratio) {
        return Err(EstimateError::InvalidCoverage { value: ratio });
    }
    Ok(CoverageResult {
        overall_ratio: ratio,
        per_channel_ratios: None,
        method: None,
        pixels: 0,
    })
}

/// Split the buffer into row blocks, reduce each, and merge in order.
fn scan_blocks<T, F>(image: &RasterImage, block: F) -> Vec<T>
where
    T: Send,
    F: Fn(&[u8]) -> T + Sync + Send,
{
    let chunk = image.row_stride() * ROWS_PER_BLOCK;
    image.as_bytes().par_chunks(chunk).map(block).collect()
}

fn alpha_coverage(image: &RasterImage, total: u64) -> CoverageResult {
    let printed = match image.layout() {
        PixelLayout::Cmyk => total,
        PixelLayout::Rgba => scan_blocks(image, |bytes| {
            bytes
                .chunks_exact(CHANNELS)
                .filter(|px| px[3] > 0)
                .count() as u64
        })
        .into_iter()
        .sum(),
    };

    CoverageResult {
        overall_ratio: printed as f64 / total as f64,
        per_channel_ratios: None,
        method: Some(CoverageMethod::AlphaThreshold),
        pixels: total,
    }
}

fn colorant_coverage(image: &RasterImage, total: u64) -> CoverageResult {
    let sums = match image.layout() {
        PixelLayout::Cmyk => {
            // Integer sums are exact; normalise once at the end.
            let sums = scan_blocks(image, |bytes| {
                bytes.chunks_exact(CHANNELS).fold([0u64; 4], |mut acc, px| {
                    for (sum, &v) in acc.iter_mut().zip(px) {
                        *sum += v as u64;
                    }
                    acc
                })
            })
            .into_iter()
            .fold([0u64; 4], |mut acc, block| {
                for (sum, v) in acc.iter_mut().zip(block) {
                    *sum += v;
                }
                acc
            });
            sums.map(|s| s as f64 / 255.0)
        }
        PixelLayout::Rgba => scan_blocks(image, |bytes| {
            bytes.chunks_exact(CHANNELS).fold([0f64; 4], |mut acc, px| {
                for (sum, v) in acc.iter_mut().zip(rgba_to_cmyk(px)) {
                    *sum += v;
                }
                acc
            })
        })
        .into_iter()
        .fold([0f64; 4], |mut acc, block| {
            for (sum, v) in acc.iter_mut().zip(block) {
                *sum += v;
            }
            acc
        }),
    };

    let n = total as f64;
    let channels = ChannelCoverage {
        cyan: sums[0] / n,
        magenta: sums[1] / n,
        yellow: sums[2] / n,
        black: sums[3] / n,
    };

    CoverageResult {
        overall_ratio: channels.mean(),
        per_channel_ratios: Some(channels),
        method: Some(CoverageMethod::ColorantMean),
        pixels: total,
    }
}

/// Naive RGB → CMYK separation, each channel in `[0, 1]`, scaled by alpha.
fn rgba_to_cmyk(px: &[u8]) -> [f64; 4] {
    let r = px[0] as f64 / 255.0;
    let g = px[1] as f64 / 255.0;
    let b = px[2] as f64 / 255.0;
    let a = px[3] as f64 / 255.0;

    let k = 1.0 - r.max(g).max(b);
    if k >= 1.0 {
        return [0.0, 0.0, 0.0, a];
    }
    let c = (1.0 - r - k) / (1.0 - k);
    let m = (1.0 - g - k) / (1.0 - k);
    let y = (1.0 - b - k) / (1.0 - k);
    [c * a, m * a, y * a, k * a]
}
