//! Measurement units, values and numeric ranges for growth charts.
//!
//! Everything is computed with exact base-10 decimals so that comparisons of
//! clinical measurements never pick up binary rounding error.
//!
//! * [`registry::UnitRegistry`] – the catalog of dimensions (length, weight,
//!   time, ...) and their units, loaded once from TOML and then shared.
//! * [`unit::Unit`] – a named unit with a multiplier to its dimension's base
//!   unit, a display precision and optional plausibility bounds.
//! * [`value::Value`] – a number (or "not measured") in a unit.
//! * [`range::Range`] – an optionally bounded interval parsed from
//!   expressions like `1 - 2`, `< 100` or `≥ 2.5`.

pub mod decimal;
pub mod error;
pub mod range;
pub mod registry;
pub mod unit;
pub mod value;

pub use error::UnitError;
pub use range::{Range, RangeDisplayStyle, RangeResult};
pub use registry::{RegistryConfig, UnitRegistry};
pub use unit::{DimensionKind, Unit, UnitRef, ValueStringSize};
pub use value::{Value, ValueRecord};
