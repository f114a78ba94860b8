//! CLI output formatting.
//!
//! # Architecture
//!
//! Each report has a `format_*` function (returns `Vec<String>` or `String`)
//! for testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.
//!
//! Amounts are carried at full precision everywhere else in the crate. The
//! table rounds to two decimals at display time; CSV and JSON never round.
//!
//! # Output Format
//!
//! ## Table
//!
//! ```text
//! Job
//!     Width: 0.60 m
//!     Height: 1.25 m
//!
//! Coverage
//!     Ratio: 42.10% (alpha, 7500000 px)
//!
//! Costs
//!     film            22.50
//!     ink              4.26
//!     powder           2.84
//!     labor           26.56
//!     electricity      4.69
//!     Total           60.85
//!     Per m           48.68
//! ```
//!
//! ## CSV
//!
//! ```text
//! section,name,value
//! job,width,0.6
//! job,height,1.25
//! coverage,ratio,0.421
//! cost,film,22.5
//! cost,total,60.85
//! ```

use crate::config::CostConfig;
use crate::types::{Estimate, LengthUnit};
use serde::Serialize;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Display rounding for money and lengths.
fn money(amount: f64) -> String {
    format!("{:.2}", amount)
}

fn percent(ratio: f64) -> String {
    format!("{:.2}%", ratio * 100.0)
}

/// Quote a CSV field when it contains a separator, quote or newline.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn csv_row(section: &str, name: &str, value: impl std::fmt::Display) -> String {
    format!("{},{},{}", section, csv_field(name), value)
}

const CSV_HEADER: &str = "section,name,value";

// ============================================================================
// Estimate
// ============================================================================

/// Human-readable estimate table.
pub fn format_estimate(estimate: &Estimate) -> Vec<String> {
    let mut lines = Vec::new();
    let dims = &estimate.dimensions;
    let unit = dims.unit;

    lines.push("Job".to_string());
    lines.push(format!("{}Width: {} {}", indent(1), money(dims.width), unit));
    lines.push(format!("{}Height: {} {}", indent(1), money(dims.height), unit));

    lines.push(String::new());
    lines.push("Coverage".to_string());
    let cov = &estimate.coverage;
    match cov.method {
        Some(method) => lines.push(format!(
            "{}Ratio: {} ({}, {} px)",
            indent(1),
            percent(cov.overall_ratio),
            method,
            cov.pixels
        )),
        None => lines.push(format!(
            "{}Ratio: {} (fixed)",
            indent(1),
            percent(cov.overall_ratio)
        )),
    }
    if let Some(channels) = &cov.per_channel_ratios {
        for (channel, ratio) in channels.iter() {
            lines.push(format!("{}{}: {}", indent(2), channel.name(), percent(ratio)));
        }
    }

    lines.push(String::new());
    lines.push("Costs".to_string());
    let breakdown = &estimate.breakdown;
    let label_width = breakdown
        .lines()
        .iter()
        .map(|line| line.name.chars().count())
        .chain(["Total".len(), per_unit_label(unit).len()])
        .max()
        .unwrap_or(0);
    let amounts: Vec<(String, String)> = breakdown
        .lines()
        .iter()
        .map(|line| (line.name.clone(), money(line.amount)))
        .chain([
            ("Total".to_string(), money(breakdown.total())),
            (per_unit_label(unit), money(estimate.cost_per_length())),
        ])
        .collect();
    let amount_width = amounts.iter().map(|(_, a)| a.len()).max().unwrap_or(0);
    for (label, amount) in amounts {
        lines.push(format!(
            "{}{:<lw$}  {:>aw$}",
            indent(1),
            label,
            amount,
            lw = label_width,
            aw = amount_width
        ));
    }

    lines
}

fn per_unit_label(unit: LengthUnit) -> String {
    format!("Per {}", unit)
}

/// Estimate as `section,name,value` rows at full precision.
pub fn format_csv(estimate: &Estimate) -> Vec<String> {
    let dims = &estimate.dimensions;
    let cov = &estimate.coverage;
    let mut rows = vec![
        CSV_HEADER.to_string(),
        csv_row("job", "unit", dims.unit),
        csv_row("job", "width", dims.width),
        csv_row("job", "height", dims.height),
        csv_row(
            "coverage",
            "method",
            cov.method.map_or_else(|| "fixed".to_string(), |m| m.to_string()),
        ),
        csv_row("coverage", "ratio", cov.overall_ratio),
    ];
    if let Some(channels) = &cov.per_channel_ratios {
        rows.extend(
            channels
                .iter()
                .map(|(channel, ratio)| csv_row("coverage", channel.name(), ratio)),
        );
    }
    rows.extend(
        estimate
            .breakdown
            .lines()
            .iter()
            .map(|line| csv_row("cost", &line.name, line.amount)),
    );
    rows.push(csv_row("cost", "total", estimate.breakdown.total()));
    rows.push(csv_row("cost", "per_length", estimate.cost_per_length()));
    rows
}

#[derive(Serialize)]
struct EstimateReport<'a> {
    #[serde(flatten)]
    estimate: &'a Estimate,
    cost_per_length: f64,
}

/// Estimate as pretty-printed JSON, including the per-length figure.
pub fn format_json(estimate: &Estimate) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&EstimateReport {
        estimate,
        cost_per_length: estimate.cost_per_length(),
    })
}

pub fn print_estimate(estimate: &Estimate) {
    for line in format_estimate(estimate) {
        println!("{}", line);
    }
}

pub fn print_csv(estimate: &Estimate) {
    for line in format_csv(estimate) {
        println!("{}", line);
    }
}

// ============================================================================
// Config
// ============================================================================

/// Price book and medium summary printed by `check-config`.
///
/// ```text
/// Medium
///     Width: 0.60 m
///     Fallback resolution: 300 px/in
///
/// Materials
/// 001 film: 1800.00 per roll (100 m)
///     Rate: 1 per m, / 100
/// ```
pub fn format_config_summary(config: &CostConfig) -> Vec<String> {
    let medium = &config.medium;
    let unit = medium.unit;
    let mut lines = vec![
        "Medium".to_string(),
        format!("{}Width: {} {}", indent(1), money(medium.width), unit),
        format!(
            "{}Fallback resolution: {} px/{}",
            indent(1),
            medium.fallback_resolution.pixels_per_unit,
            medium.fallback_resolution.unit
        ),
        format!("{}Coverage method: {}", indent(1), config.coverage.method),
        String::new(),
        "Materials".to_string(),
    ];

    if config.price_book.is_empty() {
        lines.push(format!("{}(none)", indent(1)));
    }
    for (i, row) in config.price_book.materials().iter().enumerate() {
        lines.push(format!(
            "{} {}: {} per {}",
            format_index(i + 1),
            row.name,
            money(row.unit_price),
            row.unit
        ));
        if let Some(rate) = config.rates.get(&row.name) {
            let per = match rate.basis {
                crate::rates::Basis::PrintedArea => format!("{}²", unit),
                crate::rates::Basis::RunLength => unit.to_string(),
            };
            lines.push(format!(
                "{}Rate: {} per {}, / {}",
                indent(1),
                rate.rate,
                per,
                rate.conversion_factor
            ));
        }
    }

    let overhead = config.price_book.overhead();
    lines.push(String::new());
    lines.push("Overhead".to_string());
    lines.push(format!("{}Labor: {} / month", indent(1), money(overhead.labor_monthly)));
    lines.push(format!(
        "{}Electricity: {} / month",
        indent(1),
        money(overhead.electricity_monthly)
    ));
    lines.push(format!(
        "{}Output: {} {} / month",
        indent(1),
        overhead.monthly_output,
        unit
    ));
    if let Ok(per_unit) = overhead.per_unit() {
        lines.push(format!("{}{}: {}", indent(1), per_unit_label(unit), money(per_unit)));
    }
    lines
}

pub fn print_config_summary(config: &CostConfig) {
    for line in format_config_summary(config) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
