//! Cost model: dimensions + coverage + prices → [`CostBreakdown`].
//!
//! ```text
//! printed_area      = width * height * coverage
//! material line     = printed_area * rate * unit_price / conversion_factor
//! media line        = height * rate * unit_price / conversion_factor
//! overhead per unit = (labor + electricity) / monthly_output
//! labor line        = labor / monthly_output * height
//! electricity line  = electricity / monthly_output * height
//! total             = sum of all lines
//! ```
//!
//! Material and media lines follow price book order; the two overhead lines
//! come last. A rate's [`Basis`] decides which of the two a row produces, so
//! a fully transparent design has zero-cost material lines and only pays for
//! the film it runs over.
//! Overhead is amortised by run length only, so two jobs of equal height
//! carry equal overhead whatever their coverage.
//!
//! The model is stateless: every breakdown is reproducible from its four
//! inputs, and nothing is rounded before the total is summed.

use crate::error::EstimateError;
use crate::price_book::PriceBook;
use crate::rates::{Basis, ConsumptionRates};
use crate::types::{CostBreakdown, CostKind, CostLine, CoverageResult, PhysicalDimensions};
use tracing::debug;

pub const LABOR: &str = "labor";
pub const ELECTRICITY: &str = "electricity";

/// Area that actually receives ink: run area scaled by coverage.
pub fn printed_area(dimensions: &PhysicalDimensions, coverage: &CoverageResult) -> f64 {
    dimensions.width * dimensions.height * coverage.overall_ratio
}

/// Price one job.
///
/// Fails atomically: either every line is computed or an error names the
/// first invalid input.
pub fn estimate(
    dimensions: &PhysicalDimensions,
    coverage: &CoverageResult,
    price_book: &PriceBook,
    rates: &ConsumptionRates,
) -> Result<CostBreakdown, EstimateError> {
    price_book.validate()?;
    rates.validate()?;
    check_rates_match(price_book, rates)?;

    let overhead = price_book.overhead();
    let overhead_per_unit = overhead.per_unit()?;
    let area = printed_area(dimensions, coverage);

    let mut lines = Vec::with_capacity(price_book.len() + 2);
    for row in price_book.materials() {
        let rate = rates.get(&row.name).ok_or_else(|| missing_rate(&row.name))?;
        let (quantity, kind) = match rate.basis {
            Basis::PrintedArea => (area, CostKind::Material),
            Basis::RunLength => (dimensions.height, CostKind::Media),
        };
        lines.push(CostLine {
            name: row.name.clone(),
            kind,
            amount: quantity * rate.rate * row.unit_price / rate.conversion_factor,
        });
    }

    lines.push(CostLine {
        name: LABOR.to_string(),
        kind: CostKind::Overhead,
        amount: overhead.labor_monthly / overhead.monthly_output * dimensions.height,
    });
    lines.push(CostLine {
        name: ELECTRICITY.to_string(),
        kind: CostKind::Overhead,
        amount: overhead.electricity_monthly / overhead.monthly_output * dimensions.height,
    });

    let breakdown = CostBreakdown::from_lines(lines);
    debug!(
        printed_area = area,
        overhead_per_unit,
        total = breakdown.total(),
        "priced job"
    );
    Ok(breakdown)
}

/// Every price row needs a rate; every nonzero rate needs a price row.
fn check_rates_match(price_book: &PriceBook, rates: &ConsumptionRates) -> Result<(), EstimateError> {
    if let Some(row) = price_book
        .materials()
        .iter()
        .find(|row| rates.get(&row.name).is_none())
    {
        return Err(missing_rate(&row.name));
    }
    if let Some((name, _)) = rates
        .iter()
        .find(|(name, rate)| rate.rate != 0.0 && !price_book.contains(name))
    {
        return Err(EstimateError::MissingRate {
            material: name.to_string(),
            detail: "consumption rate has no price book row",
        });
    }
    Ok(())
}

fn missing_rate(material: &str) -> EstimateError {
    EstimateError::MissingRate {
        material: material.to_string(),
        detail: "price book row has no consumption rate",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coverage;
    use crate::price_book::{MaterialPrice, Overhead};
    use crate::rates::ConsumptionRate;
    use crate::test_helpers::*;
    use crate::types::LengthUnit;

    fn dims(width: f64, height: f64) -> PhysicalDimensions {
        PhysicalDimensions {
            width,
            height,
            unit: LengthUnit::Centimeter,
        }
    }

    #[test]
    fn printed_area_scales_with_coverage() {
        let cov = coverage::forced(0.5).unwrap();
        assert_eq!(printed_area(&dims(60.0, 20.0), &cov), 600.0);
    }

    #[test]
    fn ink_and_overhead_scenario() {
        // 60 x 20 at 50% coverage → 600 area-units
        let breakdown = estimate(
            &dims(60.0, 20.0),
            &coverage::forced(0.5).unwrap(),
            &scenario_price_book(),
            &scenario_rates(),
        )
        .unwrap();

        assert_close(breakdown.get("ink").unwrap(), 16.2);
        assert_eq!(breakdown.overhead_total(), 500.0);
        assert_eq!(breakdown.get(LABOR), Some(425.0));
        assert_eq!(breakdown.get(ELECTRICITY), Some(75.0));
        assert_close(breakdown.total(), 516.2);
    }

    #[test]
    fn lines_follow_price_book_order_then_overhead() {
        let breakdown = estimate(
            &dims(0.6, 1.0),
            &coverage::forced(1.0).unwrap(),
            &PriceBook::default(),
            &ConsumptionRates::default(),
        )
        .unwrap();
        let names: Vec<&str> = breakdown.lines().iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["film", "ink", "powder", "labor", "electricity"]);
    }

    #[test]
    fn default_book_matches_calculator_sheet() {
        // One metre of full-coverage run on a 1 m wide medium:
        // ink 1350/1000*10 = 13.5, powder 450/1000*20 = 9, film 1800/100 = 18, overhead 25
        let breakdown = estimate(
            &dims(1.0, 1.0),
            &coverage::forced(1.0).unwrap(),
            &PriceBook::default(),
            &ConsumptionRates::default(),
        )
        .unwrap();
        assert_close(breakdown.get("ink").unwrap(), 13.5);
        assert_close(breakdown.get("powder").unwrap(), 9.0);
        assert_close(breakdown.get("film").unwrap(), 18.0);
        assert_close(breakdown.overhead_total(), 25.0);
        assert_close(breakdown.total(), 65.5);
    }

    #[test]
    fn zero_coverage_zeroes_material_lines() {
        let breakdown = estimate(
            &dims(0.6, 2.0),
            &coverage::forced(0.0).unwrap(),
            &PriceBook::default(),
            &ConsumptionRates::default(),
        )
        .unwrap();
        assert_eq!(breakdown.get("ink"), Some(0.0));
        assert_eq!(breakdown.get("powder"), Some(0.0));
        assert_eq!(breakdown.material_total(), 0.0);
        // Film is consumed by run length
        assert_close(breakdown.get("film").unwrap(), 36.0);
        assert_close(breakdown.media_total(), 36.0);
        assert_close(breakdown.overhead_total(), 50.0);
    }

    #[test]
    fn basis_decides_line_kind() {
        let breakdown = estimate(
            &dims(0.6, 1.0),
            &coverage::forced(1.0).unwrap(),
            &PriceBook::default(),
            &ConsumptionRates::default(),
        )
        .unwrap();
        let kinds: Vec<CostKind> = breakdown.lines().iter().map(|l| l.kind).collect();
        assert_eq!(
            kinds,
            [
                CostKind::Media,
                CostKind::Material,
                CostKind::Material,
                CostKind::Overhead,
                CostKind::Overhead
            ]
        );
    }

    #[test]
    fn overhead_independent_of_coverage() {
        let book = PriceBook::default();
        let rates = ConsumptionRates::default();
        let low = estimate(&dims(0.6, 3.0), &coverage::forced(0.1).unwrap(), &book, &rates).unwrap();
        let high = estimate(&dims(0.6, 3.0), &coverage::forced(0.9).unwrap(), &book, &rates).unwrap();
        assert_eq!(low.get(LABOR), high.get(LABOR));
        assert_eq!(low.get(ELECTRICITY), high.get(ELECTRICITY));
        assert!(high.material_total() > low.material_total());
    }

    #[test]
    fn total_is_exact_sum_of_lines() {
        let breakdown = estimate(
            &dims(0.6, 1.37),
            &coverage::forced(0.731).unwrap(),
            &PriceBook::default(),
            &ConsumptionRates::default(),
        )
        .unwrap();
        let sum = breakdown.lines().iter().fold(0.0, |acc, l| acc + l.amount);
        assert_eq!(breakdown.total(), sum);
    }

    #[test]
    fn price_row_without_rate_is_missing_rate() {
        let mut book = PriceBook::default();
        book.insert(MaterialPrice::new("glitter", "kg", 900.0)).unwrap();
        let err = estimate(
            &dims(1.0, 1.0),
            &coverage::forced(1.0).unwrap(),
            &book,
            &ConsumptionRates::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            EstimateError::MissingRate {
                material: "glitter".into(),
                detail: "price book row has no consumption rate",
            }
        );
    }

    #[test]
    fn nonzero_rate_without_price_row_is_missing_rate() {
        let mut book = PriceBook::default();
        book.remove("powder");
        let err = estimate(
            &dims(1.0, 1.0),
            &coverage::forced(1.0).unwrap(),
            &book,
            &ConsumptionRates::default(),
        )
        .unwrap_err();
        assert!(matches!(err, EstimateError::MissingRate { ref material, .. } if material == "powder"));
    }

    #[test]
    fn zero_rate_without_price_row_is_ignored() {
        let mut book = PriceBook::default();
        book.remove("powder");
        let rates = ConsumptionRates::default().with("powder", ConsumptionRate::per_area(0.0, 1000.0));
        let breakdown = estimate(&dims(1.0, 1.0), &coverage::forced(1.0).unwrap(), &book, &rates).unwrap();
        assert_eq!(breakdown.get("powder"), None);
    }

    #[test]
    fn empty_price_book_is_overhead_only() {
        let book = PriceBook::new(Vec::new(), *PriceBook::default().overhead()).unwrap();
        let breakdown = estimate(
            &dims(1.0, 4.0),
            &coverage::forced(1.0).unwrap(),
            &book,
            &ConsumptionRates::new(),
        )
        .unwrap();
        assert_eq!(breakdown.material_total(), 0.0);
        assert_eq!(breakdown.total(), 100.0);
    }

    #[test]
    fn invalid_rate_is_reported() {
        let rates = ConsumptionRates::default().with("ink", ConsumptionRate::per_area(f64::INFINITY, 1000.0));
        let err = estimate(
            &dims(1.0, 1.0),
            &coverage::forced(1.0).unwrap(),
            &PriceBook::default(),
            &rates,
        )
        .unwrap_err();
        assert!(matches!(err, EstimateError::InvalidRate { field: "rate", .. }));
    }

    #[test]
    fn overhead_is_validated_when_built_directly() {
        let bad = Overhead {
            labor_monthly: 1.0,
            electricity_monthly: 1.0,
            monthly_output: 0.0,
        };
        assert!(matches!(
            bad.per_unit(),
            Err(EstimateError::InvalidPriceBook { .. })
        ));
    }
}
