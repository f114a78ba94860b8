//! Property tests for the estimation engine.
//!
//! Run with: cargo test --test properties

use dtf_cost::config::CostConfig;
use dtf_cost::cost;
use dtf_cost::coverage;
use dtf_cost::estimate::{EstimateRequest, estimate};
use dtf_cost::imaging::RasterImage;
use dtf_cost::price_book::PriceBook;
use dtf_cost::rates::ConsumptionRates;
use dtf_cost::types::{CostKind, CoverageMethod, LengthUnit, PhysicalDimensions};
use proptest::prelude::*;

fn dims(height: f64) -> PhysicalDimensions {
    PhysicalDimensions {
        width: 0.6,
        height,
        unit: LengthUnit::Meter,
    }
}

fn rgba(width: u32, height: u32, pixel: [u8; 4]) -> RasterImage {
    let data = pixel.repeat(width as usize * height as usize);
    RasterImage::from_rgba(width, height, data).unwrap()
}

proptest! {
    #[test]
    fn cost_is_monotone_in_coverage(
        height in 0.01f64..50.0,
        a in 0.0f64..=1.0,
        b in 0.0f64..=1.0,
    ) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        let book = PriceBook::default();
        let rates = ConsumptionRates::default();
        let low = cost::estimate(&dims(height), &coverage::forced(low).unwrap(), &book, &rates).unwrap();
        let high = cost::estimate(&dims(height), &coverage::forced(high).unwrap(), &book, &rates).unwrap();
        prop_assert!(high.total() >= low.total());
        prop_assert!(high.material_total() >= low.material_total());
    }

    #[test]
    fn overhead_ignores_coverage(
        height in 0.01f64..50.0,
        a in 0.0f64..=1.0,
        b in 0.0f64..=1.0,
    ) {
        let book = PriceBook::default();
        let rates = ConsumptionRates::default();
        let first = cost::estimate(&dims(height), &coverage::forced(a).unwrap(), &book, &rates).unwrap();
        let second = cost::estimate(&dims(height), &coverage::forced(b).unwrap(), &book, &rates).unwrap();
        prop_assert_eq!(first.overhead_total(), second.overhead_total());
    }

    #[test]
    fn total_is_sum_of_lines(
        height in 0.01f64..50.0,
        ratio in 0.0f64..=1.0,
        ink_price in 0.0f64..10_000.0,
    ) {
        let mut book = PriceBook::default();
        book.set_price("ink", ink_price).unwrap();
        let breakdown = cost::estimate(
            &dims(height),
            &coverage::forced(ratio).unwrap(),
            &book,
            &ConsumptionRates::default(),
        )
        .unwrap();
        let sum = breakdown.lines().iter().fold(0.0, |acc, line| acc + line.amount);
        prop_assert_eq!(breakdown.total(), sum);
    }

    #[test]
    fn manual_height_replaces_derived(
        pixels_tall in 1u32..400,
        manual in 0.01f64..100.0,
    ) {
        let image = rgba(4, pixels_tall, [0, 0, 0, 255]);
        let request = EstimateRequest {
            manual_height: Some(manual),
            ..EstimateRequest::for_image(&image, CoverageMethod::AlphaThreshold)
        };
        let estimate = estimate(&request, &CostConfig::default()).unwrap();
        prop_assert_eq!(estimate.dimensions.height, manual);
    }

    #[test]
    fn opaque_image_is_full_coverage(
        width in 1u32..64,
        height in 1u32..200,
        alpha in 1u8..=255,
        color in any::<[u8; 3]>(),
    ) {
        let image = rgba(width, height, [color[0], color[1], color[2], alpha]);
        let result = coverage::analyze(&image, CoverageMethod::AlphaThreshold).unwrap();
        prop_assert_eq!(result.overall_ratio, 1.0);
    }

    #[test]
    fn coverage_ratio_stays_in_unit_interval(
        width in 1u32..32,
        height in 1u32..150,
        pixels in proptest::collection::vec(any::<[u8; 4]>(), 1..64),
        colorant in any::<bool>(),
    ) {
        let data: Vec<u8> = (0..width as usize * height as usize)
            .flat_map(|i| pixels[i % pixels.len()])
            .collect();
        let image = RasterImage::from_rgba(width, height, data).unwrap();
        let method = if colorant { CoverageMethod::ColorantMean } else { CoverageMethod::AlphaThreshold };
        let result = coverage::analyze(&image, method).unwrap();
        prop_assert!((0.0..=1.0).contains(&result.overall_ratio));
    }

    #[test]
    fn no_image_defaults_to_full_coverage(height in 0.01f64..100.0) {
        let estimate = estimate(&EstimateRequest::manual(height), &CostConfig::default()).unwrap();
        prop_assert_eq!(estimate.coverage.overall_ratio, 1.0);
        prop_assert!(estimate.breakdown.total() > 0.0);
    }
}

#[test]
fn transparent_image_has_zero_cost_material_lines() {
    let image = rgba(50, 50, [255, 0, 0, 0]);
    let request = EstimateRequest {
        manual_height: Some(1.0),
        ..EstimateRequest::for_image(&image, CoverageMethod::AlphaThreshold)
    };
    let estimate = estimate(&request, &CostConfig::default()).unwrap();
    assert_eq!(estimate.coverage.overall_ratio, 0.0);
    assert_eq!(estimate.breakdown.get("ink"), Some(0.0));
    assert_eq!(estimate.breakdown.get("powder"), Some(0.0));
    assert_eq!(estimate.breakdown.material_total(), 0.0);

    // Film is billed per metre of run, as a media line
    let film = estimate
        .breakdown
        .lines()
        .iter()
        .find(|line| line.name == "film")
        .unwrap();
    assert_eq!(film.kind, CostKind::Media);
    assert_eq!(film.amount, 18.0);
    assert_eq!(estimate.breakdown.media_total(), 18.0);
}
