//! # DTF Cost
//!
//! Production cost estimator for direct-to-film (DTF) printing. Given a
//! design image (or just a run length) and the shop's price book, it answers
//! "what does printing this cost us?" as an itemised breakdown.
//!
//! # Architecture: Three Pure Components
//!
//! ```text
//! RasterImage ──┬─> dimensions::resolve ──> PhysicalDimensions ─┐
//!               └─> coverage::analyze   ──> CoverageResult     ─┼─> cost::estimate ──> CostBreakdown
//!                                  PriceBook + ConsumptionRates ─┘
//! ```
//!
//! [`estimate::estimate`] wires the three together for one request. The
//! engine does no I/O: decoding files ([`imaging`]), reading config
//! ([`config`]) and printing ([`output`]) all happen at the edges, in the
//! binary.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`estimate`] | One request → one [`types::Estimate`]; precedence of manual and measured inputs |
//! | [`dimensions`] | Pixel extents + resolution → physical size on a fixed-width medium |
//! | [`coverage`] | Parallel pixel scan: alpha threshold or CMYK colorant mean |
//! | [`cost`] | Material lines, overhead lines, total |
//! | [`price_book`] | Validated, ordered unit prices and monthly overhead |
//! | [`rates`] | Consumption rates per material and what they are multiplied by |
//! | [`config`] | `dtf-cost.toml` loading, merging onto stock defaults, validation |
//! | [`imaging`] | Decode design files to a [`imaging::RasterImage`]; read embedded pixel density |
//! | [`output`] | Table, CSV and JSON rendering of an estimate |
//! | [`types`] | Shared value types: units, dimensions, coverage, breakdown |
//! | [`error`] | [`error::EstimateError`], the engine's validation failures |
//! | [`logging`] | `tracing` subscriber setup for the binary |
//!
//! # Design Decisions
//!
//! ## Fixed-Width Medium
//!
//! DTF film comes on a roll of fixed width, so a job is billed by the length
//! of roll it uses. Width always comes from the config; only height is derived
//! from the image. An operator-supplied height replaces the derived one
//! outright, never blends with it.
//!
//! ## Two Consumption Bases
//!
//! Ink and powder only land where the design prints, so they scale with
//! *printed area* (`width * height * coverage`). Film is used for the whole
//! run whether or not it carries ink, so it scales with *run length*. Each
//! rate declares its basis; see [`rates::Basis`].
//!
//! ## Overhead by Length
//!
//! Labor and electricity are monthly figures spread over the month's output
//! length. Two jobs of equal height carry equal overhead whatever their
//! coverage.
//!
//! ## No Rounding Until Display
//!
//! Every amount is carried as `f64` at full precision and the total is the
//! exact sum of the lines. Only the table output rounds, to two decimals.
//!
//! ## Deterministic Parallel Scan
//!
//! Coverage is computed over fixed row blocks with rayon and merged in block
//! order, so the same image always gives the same ratio regardless of the
//! thread count in `[processing] max_threads`.

pub mod config;
pub mod cost;
pub mod coverage;
pub mod dimensions;
pub mod error;
pub mod estimate;
pub mod imaging;
pub mod logging;
pub mod output;
pub mod price_book;
pub mod rates;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
