//! Dimension resolver: pixel extents → physical job size.
//!
//! The print medium is a roll of fixed width, so width never comes from the
//! image. Height is the image's pixel height divided by its resolution,
//! unless the operator supplies a manual height, which replaces the derived
//! value outright.
//!
//! All functions here are pure and testable without any I/O or images.

use crate::error::EstimateError;
use crate::types::{LengthUnit, PhysicalDimensions, Resolution};
use tracing::debug;

/// Resolve the physical size of a design printed on a fixed-width medium.
///
/// # Arguments
/// * `pixels` - Image extents as (width, height) in pixels
/// * `resolution` - Pixel density of the image
/// * `fixed_width` - Medium width, in `unit`
/// * `unit` - Billing length unit for the result
/// * `manual_height` - Operator-supplied height in `unit`; wins over the derived one
///
/// # Examples
/// ```
/// # use dtf_cost::dimensions::resolve;
/// # use dtf_cost::types::{LengthUnit, Resolution};
/// let unit = LengthUnit::Centimeter;
/// // 2000 px tall at 100 px/cm → 20 cm
/// let dims = resolve((6000, 2000), Resolution::new(100.0, unit), 60.0, unit, None).unwrap();
/// assert_eq!((dims.width, dims.height), (60.0, 20.0));
/// ```
pub fn resolve(
    pixels: (u32, u32),
    resolution: Resolution,
    fixed_width: f64,
    unit: LengthUnit,
    manual_height: Option<f64>,
) -> Result<PhysicalDimensions, EstimateError> {
    if !(resolution.pixels_per_unit.is_finite() && resolution.pixels_per_unit > 0.0) {
        return Err(EstimateError::InvalidResolution {
            value: resolution.pixels_per_unit,
            unit: resolution.unit,
        });
    }

    let (pixels_wide, pixels_tall) = pixels;
    let height = match manual_height {
        Some(h) => h,
        None => pixels_tall as f64 / resolution.pixels_per(unit),
    };
    debug!(
        pixels_wide,
        pixels_tall,
        height,
        manual = manual_height.is_some(),
        "resolved design height"
    );

    checked(fixed_width, height, unit)
}

/// Dimensions for a job with no design image: both values come from the
/// operator.
pub fn from_manual(
    fixed_width: f64,
    height: f64,
    unit: LengthUnit,
) -> Result<PhysicalDimensions, EstimateError> {
    checked(fixed_width, height, unit)
}

fn checked(width: f64, height: f64, unit: LengthUnit) -> Result<PhysicalDimensions, EstimateError> {
    ensure_positive("width", width)?;
    ensure_positive("height", height)?;
    Ok(PhysicalDimensions {
        width,
        height,
        unit,
    })
}

fn ensure_positive(field: &'static str, value: f64) -> Result<(), EstimateError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(EstimateError::InvalidDimension { field, value })
    }
}
