//! Operator-editable price book.
//!
//! Two tables:
//!
//! - **Materials**: ordered rows `{name, unit, unit_price}`, keyed by name.
//!   Row order is the order cost lines appear in a breakdown.
//! - **Overhead**: monthly labor and electricity, amortised over the declared
//!   monthly output (in billing length units).
//!
//! Every mutation is validated, so a `PriceBook` value is always usable:
//! names are non-empty and unique, prices are finite and non-negative, and
//! monthly output is strictly positive. Deserialization goes through the
//! same checks.
//!
//! ```toml
//! [[price_book.materials]]
//! name = "ink"
//! unit = "litre"
//! unit_price = 1350.0
//!
//! [price_book.overhead]
//! labor_monthly = 85000.0
//! electricity_monthly = 15000.0
//! monthly_output = 4000.0
//! ```

use crate::error::EstimateError;
use serde::{Deserialize, Serialize};

/// One priced material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MaterialPrice {
    pub name: String,
    /// Unit the price refers to (display only; e.g. "litre", "kg", "roll").
    pub unit: String,
    pub unit_price: f64,
}

impl MaterialPrice {
    pub fn new(name: impl Into<String>, unit: impl Into<String>, unit_price: f64) -> Self {
        Self {
            name: name.into(),
            unit: unit.into(),
            unit_price,
        }
    }

    fn validate(&self) -> Result<(), EstimateError> {
        if self.name.trim().is_empty() {
            return Err(EstimateError::price_book("materials.name", "must not be empty"));
        }
        check_price(&format!("{}.unit_price", self.name), self.unit_price)
    }
}

/// Monthly fixed costs and the output they are spread over.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Overhead {
    pub labor_monthly: f64,
    pub electricity_monthly: f64,
    /// Length produced per month, in billing units.
    pub monthly_output: f64,
}

impl Overhead {
    pub fn validate(&self) -> Result<(), EstimateError> {
        check_price("overhead.labor_monthly", self.labor_monthly)?;
        check_price("overhead.electricity_monthly", self.electricity_monthly)?;
        if !(self.monthly_output.is_finite() && self.monthly_output > 0.0) {
            return Err(EstimateError::price_book(
                "overhead.monthly_output",
                format!("must be greater than zero, got {}", self.monthly_output),
            ));
        }
        Ok(())
    }

    /// Fixed cost per billing unit of run length.
    pub fn per_unit(&self) -> Result<f64, EstimateError> {
        self.validate()?;
        Ok((self.labor_monthly + self.electricity_monthly) / self.monthly_output)
    }
}

fn check_price(field: &str, value: f64) -> Result<(), EstimateError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(EstimateError::price_book(
            field,
            format!("must be a non-negative amount, got {value}"),
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PriceBookFields")]
pub struct PriceBook {
    materials: Vec<MaterialPrice>,
    overhead: Overhead,
}

/// Unvalidated shape of a price book as it appears in TOML.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct PriceBookFields {
    #[serde(default)]
    materials: Vec<MaterialPrice>,
    overhead: Overhead,
}

impl TryFrom<PriceBookFields> for PriceBook {
    type Error = EstimateError;

    fn try_from(fields: PriceBookFields) -> Result<Self, Self::Error> {
        PriceBook::new(fields.materials, fields.overhead)
    }
}

impl PriceBook {
    /// Build a price book, rejecting invalid or duplicate rows.
    pub fn new(materials: Vec<MaterialPrice>, overhead: Overhead) -> Result<Self, EstimateError> {
        overhead.validate()?;
        let mut book = Self {
            materials: Vec::with_capacity(materials.len()),
            overhead,
        };
        for row in materials {
            if book.contains(&row.name) {
                return Err(EstimateError::price_book(
                    "materials.name",
                    format!("duplicate material '{}'", row.name),
                ));
            }
            book.insert(row)?;
        }
        Ok(book)
    }

    pub fn materials(&self) -> &[MaterialPrice] {
        &self.materials
    }

    pub fn overhead(&self) -> &Overhead {
        &self.overhead
    }

    pub fn get(&self, name: &str) -> Option<&MaterialPrice> {
        self.materials.iter().find(|row| row.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    /// Add a row, or replace the row with the same name in place.
    ///
    /// Returns the replaced row. New rows go to the end.
    pub fn insert(&mut self, row: MaterialPrice) -> Result<Option<MaterialPrice>, EstimateError> {
        row.validate()?;
        match self.materials.iter_mut().find(|r| r.name == row.name) {
            Some(existing) => Ok(Some(std::mem::replace(existing, row))),
            None => {
                self.materials.push(row);
                Ok(None)
            }
        }
    }

    /// Remove a row by name, keeping the order of the rest.
    pub fn remove(&mut self, name: &str) -> Option<MaterialPrice> {
        let index = self.materials.iter().position(|row| row.name == name)?;
        Some(self.materials.remove(index))
    }

    /// Change the unit price of an existing row.
    pub fn set_price(&mut self, name: &str, unit_price: f64) -> Result<(), EstimateError> {
        check_price(&format!("{name}.unit_price"), unit_price)?;
        let row = self
            .materials
            .iter_mut()
            .find(|row| row.name == name)
            .ok_or_else(|| {
                EstimateError::price_book("materials.name", format!("unknown material '{name}'"))
            })?;
        row.unit_price = unit_price;
        Ok(())
    }

    pub fn set_overhead(&mut self, overhead: Overhead) -> Result<(), EstimateError> {
        overhead.validate()?;
        self.overhead = overhead;
        Ok(())
    }

    /// Re-check every row. Mutations already enforce this; estimates call it
    /// once more before reading prices.
    pub fn validate(&self) -> Result<(), EstimateError> {
        self.overhead.validate()?;
        self.materials.iter().try_for_each(MaterialPrice::validate)
    }
}

impl Default for PriceBook {
    /// Prices from the shop's original calculator sheet.
    fn default() -> Self {
        Self {
            materials: vec![
                MaterialPrice::new("film", "roll (100 m)", 1800.0),
                MaterialPrice::new("ink", "litre", 1350.0),
                MaterialPrice::new("powder", "kg", 450.0),
            ],
            overhead: Overhead {
                labor_monthly: 85000.0,
                electricity_monthly: 15000.0,
                monthly_output: 4000.0,
            },
        }
    }
}
