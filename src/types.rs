//! Shared value types passed between the resolver, the coverage analyzer and
//! the cost model.
//!
//! Everything here is a plain value: no I/O, no interior mutability. An
//! [`Estimate`] is serialized as-is by the `--format json` output.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Billing length unit.
///
/// Width, height, monthly output and consumption rates are all expressed in
/// one unit (areas in its square), chosen by `[medium] unit` in the config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LengthUnit {
    #[serde(rename = "mm")]
    Millimeter,
    #[serde(rename = "cm")]
    Centimeter,
    #[serde(rename = "m")]
    Meter,
    #[serde(rename = "in")]
    Inch,
}

impl LengthUnit {
    /// Length of one unit in meters.
    pub fn meters(self) -> f64 {
        match self {
            LengthUnit::Millimeter => 0.001,
            LengthUnit::Centimeter => 0.01,
            LengthUnit::Meter => 1.0,
            LengthUnit::Inch => 0.0254,
        }
    }

    /// How many `target` units fit in one `self` unit.
    pub fn factor_to(self, target: LengthUnit) -> f64 {
        if self == target {
            1.0
        } else {
            self.meters() / target.meters()
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            LengthUnit::Millimeter => "mm",
            LengthUnit::Centimeter => "cm",
            LengthUnit::Meter => "m",
            LengthUnit::Inch => "in",
        }
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for LengthUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mm" => Ok(LengthUnit::Millimeter),
            "cm" => Ok(LengthUnit::Centimeter),
            "m" => Ok(LengthUnit::Meter),
            "in" | "inch" => Ok(LengthUnit::Inch),
            other => Err(format!("unknown length unit '{other}' (expected mm, cm, m or in)")),
        }
    }
}

/// Pixel density: how many pixels make up one physical `unit`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Resolution {
    pub pixels_per_unit: f64,
    pub unit: LengthUnit,
}

impl Resolution {
    pub fn new(pixels_per_unit: f64, unit: LengthUnit) -> Self {
        Self {
            pixels_per_unit,
            unit,
        }
    }

    /// The usual DPI figure.
    pub fn per_inch(dpi: f64) -> Self {
        Self::new(dpi, LengthUnit::Inch)
    }

    /// Pixels covering one `target` unit.
    ///
    /// ```
    /// # use dtf_cost::types::{LengthUnit, Resolution};
    /// let r = Resolution::new(100.0, LengthUnit::Centimeter);
    /// assert_eq!(r.pixels_per(LengthUnit::Meter), 10_000.0);
    /// ```
    pub fn pixels_per(self, target: LengthUnit) -> f64 {
        self.pixels_per_unit * target.factor_to(self.unit)
    }
}

/// Physical size of one print job, in the billing unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PhysicalDimensions {
    pub width: f64,
    pub height: f64,
    pub unit: LengthUnit,
}

impl PhysicalDimensions {
    /// Full run area (`width * height`), before coverage is applied.
    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

/// How coverage is measured from pixel data.
///
/// The two methods answer different questions and are never blended:
/// - `AlphaThreshold`: what fraction of the area is printed at all
/// - `ColorantMean`: how much colorant is deposited on average
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoverageMethod {
    #[serde(rename = "alpha")]
    AlphaThreshold,
    #[serde(rename = "colorant")]
    ColorantMean,
}

impl fmt::Display for CoverageMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoverageMethod::AlphaThreshold => f.write_str("alpha"),
            CoverageMethod::ColorantMean => f.write_str("colorant"),
        }
    }
}

impl FromStr for CoverageMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "alpha" => Ok(CoverageMethod::AlphaThreshold),
            "colorant" | "cmyk" => Ok(CoverageMethod::ColorantMean),
            other => Err(format!(
                "unknown coverage method '{other}' (expected alpha or colorant)"
            )),
        }
    }
}

/// One of the four subtractive colorants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Cyan,
    Magenta,
    Yellow,
    Black,
}

impl Channel {
    pub const ALL: [Channel; 4] = [
        Channel::Cyan,
        Channel::Magenta,
        Channel::Yellow,
        Channel::Black,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Channel::Cyan => "cyan",
            Channel::Magenta => "magenta",
            Channel::Yellow => "yellow",
            Channel::Black => "black",
        }
    }
}

/// Mean intensity per colorant channel, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChannelCoverage {
    pub cyan: f64,
    pub magenta: f64,
    pub yellow: f64,
    pub black: f64,
}

impl ChannelCoverage {
    pub fn get(&self, channel: Channel) -> f64 {
        match channel {
            Channel::Cyan => self.cyan,
            Channel::Magenta => self.magenta,
            Channel::Yellow => self.yellow,
            Channel::Black => self.black,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Channel, f64)> + '_ {
        Channel::ALL.into_iter().map(|c| (c, self.get(c)))
    }

    /// Unweighted mean of the four channels.
    pub fn mean(&self) -> f64 {
        (self.cyan + self.magenta + self.yellow + self.black) / 4.0
    }
}

/// Outcome of a coverage measurement (or an explicit override).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CoverageResult {
    /// Fraction in `[0, 1]`.
    pub overall_ratio: f64,
    /// Only present for [`CoverageMethod::ColorantMean`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_channel_ratios: Option<ChannelCoverage>,
    /// `None` when the ratio was forced rather than measured.
    pub method: Option<CoverageMethod>,
    /// Pixels scanned; zero for a forced ratio.
    pub pixels: u64,
}

/// Which physical process a cost line pays for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CostKind {
    /// Consumed where the design prints (ink, powder); scales with coverage.
    Material,
    /// Consumed for the whole run (film); scales with height only.
    Media,
    Overhead,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostLine {
    pub name: String,
    pub kind: CostKind,
    pub amount: f64,
}

/// Ordered cost lines plus their total.
///
/// `total` is always the left-to-right sum of `lines` at full precision;
/// rounding belongs to display code only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostBreakdown {
    lines: Vec<CostLine>,
    total: f64,
}

impl CostBreakdown {
    pub fn from_lines(lines: Vec<CostLine>) -> Self {
        let total = lines.iter().fold(0.0, |acc, line| acc + line.amount);
        Self { lines, total }
    }

    pub fn lines(&self) -> &[CostLine] {
        &self.lines
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    /// Amount of the line called `name`, if present.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.lines
            .iter()
            .find(|line| line.name == name)
            .map(|line| line.amount)
    }

    pub fn material_total(&self) -> f64 {
        self.sum_of(CostKind::Material)
    }

    pub fn media_total(&self) -> f64 {
        self.sum_of(CostKind::Media)
    }

    pub fn overhead_total(&self) -> f64 {
        self.sum_of(CostKind::Overhead)
    }

    fn sum_of(&self, kind: CostKind) -> f64 {
        self.lines
            .iter()
            .filter(|line| line.kind == kind)
            .fold(0.0, |acc, line| acc + line.amount)
    }
}

/// Everything one estimate produces: the breakdown plus the diagnostics it
/// was derived from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Estimate {
    pub dimensions: PhysicalDimensions,
    pub coverage: CoverageResult,
    pub breakdown: CostBreakdown,
}

impl Estimate {
    /// Total cost per billing unit of run length.
    pub fn cost_per_length(&self) -> f64 {
        self.breakdown.total() / self.dimensions.height
    }
}
