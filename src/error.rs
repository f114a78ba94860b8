//! Validation failures raised by the estimation engine.
//!
//! Every variant names the offending field or value. None of them is
//! transient: an estimate either succeeds completely or fails with the first
//! invalid input it meets.

use crate::types::LengthUnit;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EstimateError {
    #[error("invalid resolution {value} px/{unit}: must be a positive number")]
    InvalidResolution { value: f64, unit: LengthUnit },
    #[error("invalid {field} {value}: must be a positive length")]
    InvalidDimension { field: &'static str, value: f64 },
    #[error("no design image and no manual height: cannot size the job")]
    MissingHeight,
    #[error("image has no pixels")]
    EmptyImage,
    #[error("invalid coverage ratio {value}: must be between 0 and 1")]
    InvalidCoverage { value: f64 },
    #[error("material '{material}': {detail}")]
    MissingRate {
        material: String,
        detail: &'static str,
    },
    #[error("invalid consumption rate for '{material}': {field} = {value}")]
    InvalidRate {
        material: String,
        field: &'static str,
        value: f64,
    },
    #[error("invalid price book field '{field}': {reason}")]
    InvalidPriceBook { field: String, reason: String },
}

impl EstimateError {
    pub(crate) fn price_book(field: impl Into<String>, reason: impl Into<String>) -> Self {
        EstimateError::InvalidPriceBook {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
