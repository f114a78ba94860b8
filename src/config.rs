//! Estimator configuration.
//!
//! Handles loading, validating, and merging `dtf-cost.toml`. Stock defaults
//! (the shop's calculator values) are overridden by whatever the user file
//! sets; everything else keeps its default.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [medium]
//! unit = "m"                # Billing unit: mm, cm, m or in
//! width = 0.6               # Fixed roll width, in `unit`
//! fallback_resolution = { pixels_per_unit = 300.0, unit = "in" }
//!
//! [coverage]
//! method = "alpha"          # alpha | colorant
//!
//! [rates.ink]
//! rate = 10.0               # ml per unit² of printed area
//! conversion_factor = 1000.0
//!
//! [[price_book.materials]]
//! name = "ink"
//! unit = "litre"
//! unit_price = 1350.0
//!
//! [price_book.overhead]
//! labor_monthly = 85000.0
//! electricity_monthly = 15000.0
//! monthly_output = 4000.0
//!
//! [processing]
//! max_threads = 4           # Omit for auto = CPU cores
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse: override just the values you want:
//!
//! ```toml
//! [medium]
//! width = 0.3
//! ```
//!
//! Tables merge key by key; arrays (the material rows) replace the default
//! list wholesale. Unknown keys are rejected to catch typos early.

use crate::price_book::PriceBook;
use crate::rates::ConsumptionRates;
use crate::types::{CoverageMethod, LengthUnit, Resolution};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name looked up in the working directory when `--config` is absent.
pub const CONFIG_FILE_NAME: &str = "dtf-cost.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Everything an estimate needs besides the design itself.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CostConfig {
    /// Print medium: billing unit, roll width, fallback pixel density.
    pub medium: MediumConfig,
    /// Default coverage method.
    pub coverage: CoverageConfig,
    /// Consumption rates keyed by material name.
    pub rates: ConsumptionRates,
    /// Unit prices and monthly overhead.
    pub price_book: PriceBook,
    /// Parallel scan settings.
    pub processing: ProcessingConfig,
}

impl CostConfig {
    /// Validate values and the cross references between rates and prices.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.medium.width.is_finite() && self.medium.width > 0.0) {
            return Err(ConfigError::Validation(
                "medium.width must be greater than zero".into(),
            ));
        }
        let fallback = self.medium.fallback_resolution.pixels_per_unit;
        if !(fallback.is_finite() && fallback > 0.0) {
            return Err(ConfigError::Validation(
                "medium.fallback_resolution.pixels_per_unit must be greater than zero".into(),
            ));
        }
        self.rates
            .validate()
            .map_err(|e| ConfigError::Validation(e.to_string()))?;
        self.price_book
            .validate()
            .map_err(|e| ConfigError::Validation(e.to_string()))?;

        for row in self.price_book.materials() {
            if self.rates.get(&row.name).is_none() {
                return Err(ConfigError::Validation(format!(
                    "price_book material '{}' has no [rates.{}] entry",
                    row.name, row.name
                )));
            }
        }
        for (name, rate) in self.rates.iter() {
            if rate.rate != 0.0 && !self.price_book.contains(name) {
                return Err(ConfigError::Validation(format!(
                    "[rates.{name}] has no matching price_book material; add the row or set rate = 0"
                )));
            }
        }
        Ok(())
    }
}

/// Print medium settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MediumConfig {
    /// Billing unit for width, height, rates and monthly output.
    pub unit: LengthUnit,
    /// Roll width, in `unit`. Designs are always billed at this width.
    pub width: f64,
    /// Density assumed when a design file records none.
    pub fallback_resolution: Resolution,
}

impl Default for MediumConfig {
    fn default() -> Self {
        Self {
            unit: LengthUnit::Meter,
            width: 0.6,
            fallback_resolution: Resolution::per_inch(300.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoverageConfig {
    pub method: CoverageMethod,
}

impl Default for CoverageConfig {
    fn default() -> Self {
        Self {
            method: CoverageMethod::AlphaThreshold,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of threads scanning pixels.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_threads: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)`, at least 1
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_threads
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged onto.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(CostConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay, arrays included, replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<CostConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: CostConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from an explicit file. A missing file is an error.
pub fn load_config_file(path: &Path) -> Result<CostConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let overlay: toml::Value = toml::from_str(&content)?;
    resolve_config(stock_defaults_value(), Some(overlay))
}

/// Load `dtf-cost.toml` from `dir` if present, stock defaults otherwise.
pub fn load_config(dir: &Path) -> Result<CostConfig, ConfigError> {
    let overlay = load_raw_config(&dir.join(CONFIG_FILE_NAME))?;
    resolve_config(stock_defaults_value(), overlay)
}

/// Returns a fully-commented stock `dtf-cost.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# DTF Cost Configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file as ./dtf-cost.toml or pass it with --config.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Print medium
# ---------------------------------------------------------------------------
[medium]
# Billing length unit: mm, cm, m or in. Width, design height, consumption
# rates (per unit²) and monthly output (units per month) all use it.
unit = "m"

# Fixed roll width. Every job is billed at this width.
width = 0.6

# Pixel density assumed when a design file records none.
fallback_resolution = { pixels_per_unit = 300.0, unit = "in" }

# ---------------------------------------------------------------------------
# Coverage
# ---------------------------------------------------------------------------
[coverage]
# alpha:    fraction of pixels that are not fully transparent
# colorant: mean CMYK channel intensity
method = "alpha"

# ---------------------------------------------------------------------------
# Consumption rates
# ---------------------------------------------------------------------------
# cost = quantity * rate * unit_price / conversion_factor
# basis = "printed_area": quantity is width * height * coverage (default)
# basis = "run_length":   quantity is the job height
# Every price_book material needs a rate; a rate with no material must be 0.

# 10 ml per m² printed, ink priced per litre.
[rates.ink]
rate = 10.0
conversion_factor = 1000.0
basis = "printed_area"

# 20 g per m² printed, powder priced per kg.
[rates.powder]
rate = 20.0
conversion_factor = 1000.0
basis = "printed_area"

# 1 m of film per m of run, priced per 100 m roll.
[rates.film]
rate = 1.0
conversion_factor = 100.0
basis = "run_length"

# ---------------------------------------------------------------------------
# Price book
# ---------------------------------------------------------------------------
# Material rows are listed in breakdown order. Defining any
# [[price_book.materials]] row replaces the whole default list.
[[price_book.materials]]
name = "film"
unit = "roll (100 m)"
unit_price = 1800.0

[[price_book.materials]]
name = "ink"
unit = "litre"
unit_price = 1350.0

[[price_book.materials]]
name = "powder"
unit = "kg"
unit_price = 450.0

# Monthly fixed costs, spread over monthly output (in billing units).
[price_book.overhead]
labor_monthly = 85000.0
electricity_monthly = 15000.0
monthly_output = 4000.0

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum threads used to scan pixels.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_threads = 4
"##
}
