//! Consumption rates: how much of each material a job uses.
//!
//! Rates are engine configuration, separate from prices. Each rate says how
//! much material is consumed per unit of its basis, and how many of those
//! consumption units make up one priced unit:
//!
//! ```text
//! cost = basis_quantity * rate * unit_price / conversion_factor
//!
//! ink:    printed m² * 10 ml/m²  * price per litre / 1000 ml
//! powder: printed m² * 20 g/m²   * price per kg    / 1000 g
//! film:   run m      * 1 m/m     * price per roll  / 100 m
//! ```

use crate::error::EstimateError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What a consumption rate is multiplied by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Basis {
    /// `width * height * coverage` (unit²). Ink and powder only land where
    /// the design prints.
    #[default]
    PrintedArea,
    /// Job height (unit). Film is consumed for the whole run regardless of
    /// what is printed on it.
    RunLength,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConsumptionRate {
    /// Consumption units per basis unit (e.g. ml per m²).
    pub rate: f64,
    /// Consumption units per priced unit (e.g. 1000 ml per litre).
    #[serde(default = "default_conversion_factor")]
    pub conversion_factor: f64,
    #[serde(default)]
    pub basis: Basis,
}

fn default_conversion_factor() -> f64 {
    1.0
}

impl ConsumptionRate {
    pub fn per_area(rate: f64, conversion_factor: f64) -> Self {
        Self {
            rate,
            conversion_factor,
            basis: Basis::PrintedArea,
        }
    }

    pub fn per_length(rate: f64, conversion_factor: f64) -> Self {
        Self {
            rate,
            conversion_factor,
            basis: Basis::RunLength,
        }
    }

    fn validate(&self, material: &str) -> Result<(), EstimateError> {
        if !(self.rate.is_finite() && self.rate >= 0.0) {
            return Err(EstimateError::InvalidRate {
                material: material.to_string(),
                field: "rate",
                value: self.rate,
            });
        }
        if !(self.conversion_factor.is_finite() && self.conversion_factor > 0.0) {
            return Err(EstimateError::InvalidRate {
                material: material.to_string(),
                field: "conversion_factor",
                value: self.conversion_factor,
            });
        }
        Ok(())
    }
}

/// Rates keyed by material name; names match price book rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConsumptionRates(BTreeMap<String, ConsumptionRate>);

impl ConsumptionRates {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Builder-style insert.
    pub fn with(mut self, material: impl Into<String>, rate: ConsumptionRate) -> Self {
        self.0.insert(material.into(), rate);
        self
    }

    pub fn insert(&mut self, material: impl Into<String>, rate: ConsumptionRate) {
        self.0.insert(material.into(), rate);
    }

    pub fn get(&self, material: &str) -> Option<&ConsumptionRate> {
        self.0.get(material)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConsumptionRate)> {
        self.0.iter().map(|(name, rate)| (name.as_str(), rate))
    }

    pub fn validate(&self) -> Result<(), EstimateError> {
        self.iter().try_for_each(|(name, rate)| rate.validate(name))
    }
}

impl Default for ConsumptionRates {
    fn default() -> Self {
        Self::new()
            .with("film", ConsumptionRate::per_length(1.0, 100.0))
            .with("ink", ConsumptionRate::per_area(10.0, 1000.0))
            .with("powder", ConsumptionRate::per_area(20.0, 1000.0))
    }
}
