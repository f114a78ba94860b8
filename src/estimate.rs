//! Estimator: one request in, one [`Estimate`] out.
//!
//! Composes the dimension resolver, the coverage analyzer and the cost model.
//! Holds no state between calls; identical requests against the same config
//! always give identical estimates.
//!
//! Precedence rules:
//!
//! | Input | Wins | Then | Fallback |
//! |---|---|---|---|
//! | height | `manual_height` | pixel height / resolution | `MissingHeight` (no image) |
//! | coverage | `forced_coverage` | measured by `method` | 1.0 (no image) |
//! | resolution | `resolution` | density recorded in the file | `[medium] fallback_resolution` |

use crate::config::CostConfig;
use crate::cost;
use crate::coverage;
use crate::dimensions;
use crate::error::EstimateError;
use crate::imaging::RasterImage;
use crate::types::{CoverageMethod, Estimate, Resolution};
use tracing::info;

/// Inputs for a single job.
#[derive(Debug, Clone, Copy)]
pub struct EstimateRequest<'a> {
    /// Decoded design, if the operator has one.
    pub image: Option<&'a RasterImage>,
    /// Height in the billing unit; replaces the derived height.
    pub manual_height: Option<f64>,
    /// Coverage ratio in `[0, 1]`; replaces the measured coverage.
    pub forced_coverage: Option<f64>,
    pub method: CoverageMethod,
    /// Explicit pixel density; beats whatever the file recorded.
    pub resolution: Option<Resolution>,
}

impl<'a> EstimateRequest<'a> {
    /// Request for a design image with the given coverage method.
    pub fn for_image(image: &'a RasterImage, method: CoverageMethod) -> Self {
        Self {
            image: Some(image),
            manual_height: None,
            forced_coverage: None,
            method,
            resolution: None,
        }
    }

    /// Request with no design image: the operator supplies the height.
    pub fn manual(height: f64) -> Self {
        Self {
            image: None,
            manual_height: Some(height),
            forced_coverage: None,
            method: CoverageMethod::AlphaThreshold,
            resolution: None,
        }
    }
}

/// Price one job against `config`.
pub fn estimate(request: &EstimateRequest<'_>, config: &CostConfig) -> Result<Estimate, EstimateError> {
    let medium = &config.medium;

    let (dimensions, coverage) = match request.image {
        Some(image) => {
            let resolution = request
                .resolution
                .or(image.resolution())
                .unwrap_or(medium.fallback_resolution);
            let dimensions = dimensions::resolve(
                image.dimensions(),
                resolution,
                medium.width,
                medium.unit,
                request.manual_height,
            )?;
            let coverage = match request.forced_coverage {
                Some(ratio) => coverage::forced(ratio)?,
                None => coverage::analyze(image, request.method)?,
            };
            (dimensions, coverage)
        }
        None => {
            let height = request.manual_height.ok_or(EstimateError::MissingHeight)?;
            let dimensions = dimensions::from_manual(medium.width, height, medium.unit)?;
            let coverage = coverage::forced(request.forced_coverage.unwrap_or(1.0))?;
            (dimensions, coverage)
        }
    };

    let breakdown = cost::estimate(&dimensions, &coverage, &config.price_book, &config.rates)?;
    info!(
        width = dimensions.width,
        height = dimensions.height,
        unit = %dimensions.unit,
        coverage = coverage.overall_ratio,
        total = breakdown.total(),
        "estimate complete"
    );

    Ok(Estimate {
        dimensions,
        coverage,
        breakdown,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use crate::types::LengthUnit;

    /// 60 cm medium, ink-only price book, 100 px/cm fallback.
    fn scenario_config() -> CostConfig {
        let mut config = CostConfig::default();
        config.medium.unit = LengthUnit::Centimeter;
        config.medium.width = 60.0;
        config.medium.fallback_resolution = Resolution::new(100.0, LengthUnit::Centimeter);
        config.price_book = scenario_price_book();
        config.rates = scenario_rates();
        config
    }

    #[test]
    fn half_coverage_design_scenario() {
        let image = half_opaque(6000, 2000);
        let request = EstimateRequest::for_image(&image, CoverageMethod::AlphaThreshold);
        let estimate = estimate(&request, &scenario_config()).unwrap();

        assert_eq!(estimate.dimensions.width, 60.0);
        assert_close(estimate.dimensions.height, 20.0);
        assert_close(estimate.coverage.overall_ratio, 0.5);
        assert_close(estimate.breakdown.get("ink").unwrap(), 16.2);
        assert_close(estimate.breakdown.overhead_total(), 500.0);
        assert_close(estimate.breakdown.total(), 516.2);
    }

    #[test]
    fn no_image_manual_height_uses_full_coverage() {
        let estimate = estimate(&EstimateRequest::manual(100.0), &scenario_config()).unwrap();
        assert_eq!(estimate.coverage.overall_ratio, 1.0);
        assert_eq!(estimate.coverage.method, None);
        // 60 * 100 * 1.0 = 6000 area units * 20 ml * 1.35 / 1000
        assert_close(estimate.breakdown.get("ink").unwrap(), 162.0);
        assert_close(estimate.breakdown.overhead_total(), 2500.0);
    }

    #[test]
    fn no_image_no_height_is_missing_height() {
        let request = EstimateRequest {
            manual_height: None,
            ..EstimateRequest::manual(1.0)
        };
        assert_eq!(
            estimate(&request, &scenario_config()).unwrap_err(),
            EstimateError::MissingHeight
        );
    }

    #[test]
    fn manual_height_replaces_derived_height() {
        let image = half_opaque(600, 2000);
        let request = EstimateRequest {
            manual_height: Some(35.0),
            ..EstimateRequest::for_image(&image, CoverageMethod::AlphaThreshold)
        };
        let estimate = estimate(&request, &scenario_config()).unwrap();
        assert_eq!(estimate.dimensions.height, 35.0);
        // Coverage is still measured from the image
        assert_close(estimate.coverage.overall_ratio, 0.5);
    }

    #[test]
    fn forced_coverage_overrides_measurement() {
        let image = solid_rgba(100, 100, [0, 0, 0, 255]);
        let request = EstimateRequest {
            forced_coverage: Some(0.25),
            ..EstimateRequest::for_image(&image, CoverageMethod::AlphaThreshold)
        };
        let estimate = estimate(&request, &scenario_config()).unwrap();
        assert_eq!(estimate.coverage.overall_ratio, 0.25);
        assert_eq!(estimate.coverage.pixels, 0);
    }

    #[test]
    fn forced_coverage_out_of_range_rejected() {
        let request = EstimateRequest {
            forced_coverage: Some(1.5),
            ..EstimateRequest::manual(10.0)
        };
        assert_eq!(
            estimate(&request, &scenario_config()).unwrap_err(),
            EstimateError::InvalidCoverage { value: 1.5 }
        );
    }

    #[test]
    fn request_resolution_beats_embedded_resolution() {
        let image = solid_rgba(10, 1000, [0, 0, 0, 255])
            .with_resolution(Some(Resolution::new(10.0, LengthUnit::Centimeter)));

        let embedded = estimate(
            &EstimateRequest::for_image(&image, CoverageMethod::AlphaThreshold),
            &scenario_config(),
        )
        .unwrap();
        assert_close(embedded.dimensions.height, 100.0);

        let request = EstimateRequest {
            resolution: Some(Resolution::new(50.0, LengthUnit::Centimeter)),
            ..EstimateRequest::for_image(&image, CoverageMethod::AlphaThreshold)
        };
        let overridden = estimate(&request, &scenario_config()).unwrap();
        assert_close(overridden.dimensions.height, 20.0);
    }

    #[test]
    fn zero_resolution_rejected() {
        let image = solid_rgba(10, 10, [0, 0, 0, 255]);
        let request = EstimateRequest {
            resolution: Some(Resolution::per_inch(0.0)),
            ..EstimateRequest::for_image(&image, CoverageMethod::AlphaThreshold)
        };
        assert!(matches!(
            estimate(&request, &scenario_config()),
            Err(EstimateError::InvalidResolution { .. })
        ));
    }

    #[test]
    fn empty_image_rejected() {
        let image = RasterImage::from_rgba(0, 0, Vec::new()).unwrap();
        let request = EstimateRequest {
            manual_height: Some(10.0),
            ..EstimateRequest::for_image(&image, CoverageMethod::AlphaThreshold)
        };
        assert_eq!(
            estimate(&request, &scenario_config()).unwrap_err(),
            EstimateError::EmptyImage
        );
    }

    #[test]
    fn estimates_are_reproducible() {
        let image = noise_rgba(300, 200, 7);
        let request = EstimateRequest::for_image(&image, CoverageMethod::ColorantMean);
        let config = scenario_config();
        let first = estimate(&request, &config).unwrap();
        let second = estimate(&request, &config).unwrap();
        assert_eq!(first, second);
    }
}
