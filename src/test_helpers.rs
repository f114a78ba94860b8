//! Shared test utilities: synthetic rasters and the worked-example price
//! book used across the engine tests.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! let img = half_opaque(6000, 2000);
//! let cov = coverage::analyze(&img, CoverageMethod::AlphaThreshold).unwrap();
//! assert_close(cov.overall_ratio, 0.5);
//! ```

use crate::imaging::RasterImage;
use crate::price_book::{MaterialPrice, Overhead, PriceBook};
use crate::rates::{ConsumptionRate, ConsumptionRates};

// =========================================================================
// Rasters
// =========================================================================

/// Every pixel set to `px`.
pub fn solid_rgba(width: u32, height: u32, px: [u8; 4]) -> RasterImage {
    let data = px.repeat(width as usize * height as usize);
    RasterImage::from_rgba(width, height, data).unwrap()
}

pub fn solid_cmyk(width: u32, height: u32, px: [u8; 4]) -> RasterImage {
    let data = px.repeat(width as usize * height as usize);
    RasterImage::from_cmyk(width, height, data).unwrap()
}

/// RGBA raster from explicit pixels, row major.
pub fn rgba_from_pixels(width: u32, height: u32, pixels: &[[u8; 4]]) -> RasterImage {
    RasterImage::from_rgba(width, height, pixels.concat()).unwrap()
}

/// Single-row CMYK raster.
pub fn cmyk_from_pixels(pixels: &[[u8; 4]]) -> RasterImage {
    RasterImage::from_cmyk(pixels.len() as u32, 1, pixels.concat()).unwrap()
}

/// Top half opaque black, bottom half fully transparent. `height` must be even
/// for an exact 50%.
pub fn half_opaque(width: u32, height: u32) -> RasterImage {
    let opaque_rows = height as usize / 2;
    let row = width as usize;
    let mut data = Vec::with_capacity(row * height as usize * 4);
    for y in 0..height as usize {
        let px = if y < opaque_rows { [0, 0, 0, 255] } else { [0, 0, 0, 0] };
        for _ in 0..row {
            data.extend_from_slice(&px);
        }
    }
    RasterImage::from_rgba(width, height, data).unwrap()
}

/// Deterministic pseudo-random RGBA (xorshift), roughly a third transparent.
pub fn noise_rgba(width: u32, height: u32, seed: u64) -> RasterImage {
    let mut state = seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) | 1;
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        state
    };
    let mut data = Vec::with_capacity(width as usize * height as usize * 4);
    for _ in 0..width as usize * height as usize {
        let v = next();
        let alpha = if v % 3 == 0 { 0 } else { (v >> 32) as u8 };
        data.extend_from_slice(&[v as u8, (v >> 8) as u8, (v >> 16) as u8, alpha]);
    }
    RasterImage::from_rgba(width, height, data).unwrap()
}

// =========================================================================
// Price book fixtures
// =========================================================================

/// Ink at 1.35 per litre; 85000 labor + 15000 electricity over 4000 units.
pub fn scenario_price_book() -> PriceBook {
    PriceBook::new(
        vec![MaterialPrice::new("ink", "litre", 1.35)],
        Overhead {
            labor_monthly: 85000.0,
            electricity_monthly: 15000.0,
            monthly_output: 4000.0,
        },
    )
    .unwrap()
}

/// 20 ml of ink per area unit, priced per litre.
pub fn scenario_rates() -> ConsumptionRates {
    ConsumptionRates::new().with("ink", ConsumptionRate::per_area(20.0, 1000.0))
}

// =========================================================================
// Assertions
// =========================================================================

/// Relative comparison for money and ratios (1e-9).
#[track_caller]
pub fn assert_close(actual: f64, expected: f64) {
    let tolerance = 1e-9 * expected.abs().max(1.0);
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {expected}, got {actual}"
    );
}
