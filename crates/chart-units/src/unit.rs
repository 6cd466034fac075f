use std::fmt;
use std::sync::{Arc, OnceLock};

use chrono::{DateTime, TimeDelta, Utc};
use rust_decimal::{Decimal, prelude::ToPrimitive};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decimal::{
    checked_divide, checked_multiply, format_decimal, parse_decimal, round_half_away,
};
use crate::error::UnitError;
use crate::range::{Range, RangeResult};

/// Units are shared between the registry and every value measured in them.
pub type UnitRef = Arc<Unit>;

pub const DEFAULT_PRECISION: u32 = 2;

const MILLIS_PER_SECOND: Decimal = dec!(1000);

/// Seconds from the Unix epoch to 2001-01-01T00:00:00Z.
const REFERENCE_DATE_TIMESTAMP: i64 = 978_307_200;

/// How much of the unit to spell out when rendering a number.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueStringSize {
    /// `12.5 centimeter`
    Long,
    /// `12.5 cm`
    #[default]
    Small,
    /// `12.5`
    Compact,
}

/// Per-dimension behaviour, fixed when the registry is loaded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DimensionKind {
    Scalar,
    /// Numbers count base units (seconds) from a reference instant.
    Date { reference: DateTime<Utc> },
}

impl DimensionKind {
    /// 2001-01-01T00:00:00Z
    pub fn default_reference_date() -> DateTime<Utc> {
        // `DateTime<Utc>::default()` is the Unix epoch.
        DateTime::<Utc>::default() + TimeDelta::seconds(REFERENCE_DATE_TIMESTAMP)
    }

    pub fn date() -> Self {
        DimensionKind::Date {
            reference: Self::default_reference_date(),
        }
    }
}

/// A named unit within a dimension, e.g. `length.centimeter` labelled `cm`.
///
/// `base_multiplier` converts a quantity in this unit to the dimension's base
/// unit: `base = quantity * base_multiplier`. Plausibility bounds are kept as
/// literals in base-unit terms and parsed on first use.
#[derive(Debug)]
pub struct Unit {
    dimension: Arc<str>,
    name: String,
    label: String,
    precision: u32,
    base_multiplier: Decimal,
    is_base_unit: bool,
    kind: DimensionKind,
    plausible_min: Option<String>,
    plausible_max: Option<String>,
    plausible_range: OnceLock<Range>,
}

impl Unit {
    pub fn new(
        dimension: impl Into<Arc<str>>,
        name: impl Into<String>,
        label: impl Into<String>,
        base_multiplier: Decimal,
    ) -> Self {
        Self {
            dimension: dimension.into(),
            name: name.into(),
            label: label.into(),
            precision: DEFAULT_PRECISION,
            base_multiplier,
            is_base_unit: false,
            kind: DimensionKind::Scalar,
            plausible_min: None,
            plausible_max: None,
            plausible_range: OnceLock::new(),
        }
    }

    /// A base unit always has a multiplier of exactly one.
    pub fn base(
        dimension: impl Into<Arc<str>>,
        name: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        let mut unit = Self::new(dimension, name, label, Decimal::ONE);
        unit.is_base_unit = true;
        unit
    }

    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_kind(mut self, kind: DimensionKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set plausibility literals (base-unit terms). Parsed lazily.
    pub fn with_plausible_bounds(mut self, min: Option<&str>, max: Option<&str>) -> Self {
        self.plausible_min = min.map(str::to_string);
        self.plausible_max = max.map(str::to_string);
        self.plausible_range = OnceLock::new();
        self
    }

    pub fn dimension(&self) -> &str {
        &self.dimension
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn precision(&self) -> u32 {
        self.precision
    }

    pub fn base_multiplier(&self) -> Decimal {
        self.base_multiplier
    }

    pub fn is_base_unit(&self) -> bool {
        self.is_base_unit
    }

    pub fn kind(&self) -> &DimensionKind {
        &self.kind
    }

    /// `dimension.name`, the form accepted by the registry's path lookup.
    pub fn path(&self) -> String {
        format!("{}.{}", self.dimension, self.name)
    }

    pub fn is_same_dimension(&self, other: &Unit) -> bool {
        Arc::ptr_eq(&self.dimension, &other.dimension) || self.dimension == other.dimension
    }

    pub fn number_in_base_unit(&self, number: Decimal) -> Result<Decimal, UnitError> {
        if self.is_base_unit {
            return Ok(number);
        }
        checked_multiply(number, self.base_multiplier)
    }

    /// Convert `number` from this unit into `unit` of the same dimension.
    pub fn convert_number(&self, number: Decimal, unit: &Unit) -> Result<Decimal, UnitError> {
        if !self.is_same_dimension(unit) {
            return Err(UnitError::DimensionMismatch {
                from: self.path(),
                to: unit.path(),
            });
        }
        let converted = checked_divide(self.number_in_base_unit(number)?, unit.base_multiplier)?;
        log::trace!(
            "{} {} -> {} {}",
            number,
            self.path(),
            converted,
            unit.path()
        );
        Ok(converted)
    }

    /// Round to this unit's precision, halves away from zero.
    pub fn rounded_number(&self, number: Decimal) -> Decimal {
        round_half_away(number, self.precision)
    }

    /// Render a number in this unit. A missing number renders as an empty
    /// string at every size.
    pub fn string_value_for_number(
        &self,
        number: Option<Decimal>,
        size: ValueStringSize,
    ) -> String {
        let Some(number) = number else {
            return String::new();
        };
        let text = format_decimal(self.rounded_number(number));
        match size {
            ValueStringSize::Long => format!("{} {}", text, self.name),
            ValueStringSize::Small if !self.label.is_empty() => format!("{} {}", text, self.label),
            ValueStringSize::Small | ValueStringSize::Compact => text,
        }
    }

    /// Plausibility bounds in base-unit terms, parsed once and cached.
    ///
    /// A malformed literal is logged and treated as an absent bound.
    pub fn plausible_range(&self) -> &Range {
        self.plausible_range.get_or_init(|| {
            let parse = |literal: &Option<String>, which: &str| {
                literal.as_deref().and_then(|s| match parse_decimal(s) {
                    Ok(number) => Some(number),
                    Err(err) => {
                        log::warn!("Ignoring plausible {} of {}: {}", which, self.path(), err);
                        None
                    }
                })
            };
            Range::from_bounds(
                parse(&self.plausible_min, "min"),
                parse(&self.plausible_max, "max"),
            )
        })
    }

    pub fn plausible_min(&self) -> Option<Decimal> {
        self.plausible_range().from
    }

    pub fn plausible_max(&self) -> Option<Decimal> {
        self.plausible_range().to
    }

    /// Classify a number already expressed in the base unit against the
    /// inclusive plausibility bounds. Undefined when no bound is set.
    pub fn check_plausibility(&self, number_in_base_unit: Decimal) -> RangeResult {
        self.plausible_range().test(number_in_base_unit)
    }

    fn reference_date(&self) -> Result<DateTime<Utc>, UnitError> {
        match &self.kind {
            DimensionKind::Date { reference } => Ok(*reference),
            DimensionKind::Scalar => Err(UnitError::NotADateUnit {
                dimension: self.dimension.to_string(),
            }),
        }
    }

    /// The instant `number` of this unit after `from` (or the dimension's
    /// reference date), at millisecond resolution.
    pub fn date_for_number(
        &self,
        number: Decimal,
        from: Option<DateTime<Utc>>,
    ) -> Result<DateTime<Utc>, UnitError> {
        let start = from.unwrap_or(self.reference_date()?);

        let seconds = self.number_in_base_unit(number)?;
        let millis = round_half_away(checked_multiply(seconds, MILLIS_PER_SECOND)?, 0)
            .to_i64()
            .ok_or(UnitError::Overflow)?;
        let delta = TimeDelta::try_milliseconds(millis).ok_or(UnitError::Overflow)?;
        start.checked_add_signed(delta).ok_or(UnitError::Overflow)
    }

    /// How many of this unit lie between `from` (or the reference date) and `date`.
    pub fn number_for_date(
        &self,
        date: DateTime<Utc>,
        from: Option<DateTime<Utc>>,
    ) -> Result<Decimal, UnitError> {
        let start = from.unwrap_or(self.reference_date()?);

        let seconds = Decimal::new((date - start).num_milliseconds(), 3);
        checked_divide(seconds, self.base_multiplier)
    }
}

impl PartialEq for Unit {
    fn eq(&self, other: &Self) -> bool {
        self.is_same_dimension(other) && self.name == other.name
    }
}

impl Eq for Unit {}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn centimeter() -> Unit {
        Unit::new("length", "centimeter", "cm", dec!(0.01)).with_precision(1)
    }

    fn inch() -> Unit {
        Unit::new("length", "inch", "in", dec!(0.0254))
    }

    fn gram() -> Unit {
        Unit::base("weight", "gram", "g")
    }

    #[test]
    fn test_base_unit_identity() {
        let meter = Unit::base("length", "meter", "m");
        assert!(meter.is_base_unit());
        assert_eq!(meter.base_multiplier(), Decimal::ONE);
        for number in [dec!(0), dec!(1.234), dec!(-7), Decimal::MAX] {
            assert_eq!(meter.number_in_base_unit(number).unwrap(), number);
        }
    }

    #[test]
    fn test_convert_number() {
        let cm = centimeter();
        let meter = Unit::base("length", "meter", "m");
        assert_eq!(cm.convert_number(dec!(150), &meter).unwrap(), dec!(1.5));
        assert_eq!(meter.convert_number(dec!(1.5), &cm).unwrap(), dec!(150));
        assert_eq!(inch().convert_number(dec!(10), &cm).unwrap(), dec!(25.4));
    }

    #[test]
    fn test_round_trip_within_precision() {
        let (cm, inch) = (centimeter(), inch());
        for number in [dec!(52.3), dec!(100), dec!(0.1), dec!(187.4)] {
            let there = cm.convert_number(number, &inch).unwrap();
            let back = inch.convert_number(there, &cm).unwrap();
            assert_eq!(cm.rounded_number(back), number);
        }
    }

    #[test]
    fn test_dimension_mismatch() {
        let kg = Unit::base("weight", "kilogram", "kg");
        let err = centimeter().convert_number(dec!(1), &kg).unwrap_err();
        assert!(matches!(err, UnitError::DimensionMismatch { .. }));
        assert!(!centimeter().is_same_dimension(&kg));
        assert!(centimeter().is_same_dimension(&inch()));
    }

    #[test]
    fn test_string_sizes() {
        let cm = centimeter();
        for (number, size, expected) in [
            (Some(dec!(52.34)), ValueStringSize::Long, "52.3 centimeter"),
            (Some(dec!(52.35)), ValueStringSize::Small, "52.4 cm"),
            (Some(dec!(52.00)), ValueStringSize::Compact, "52"),
            (Some(dec!(-0.04)), ValueStringSize::Compact, "0"),
            (None, ValueStringSize::Long, ""),
            (None, ValueStringSize::Compact, ""),
        ] {
            assert_eq!(cm.string_value_for_number(number, size), expected);
        }
    }

    #[test]
    fn test_plausibility() {
        let unit = gram().with_plausible_bounds(Some("10"), Some("200"));
        assert_eq!(unit.check_plausibility(dec!(5)), RangeResult::TooLow);
        assert_eq!(unit.check_plausibility(dec!(10)), RangeResult::Ok);
        assert_eq!(unit.check_plausibility(dec!(50)), RangeResult::Ok);
        assert_eq!(unit.check_plausibility(dec!(200)), RangeResult::Ok);
        assert_eq!(unit.check_plausibility(dec!(500)), RangeResult::TooHigh);
        assert_eq!(unit.plausible_min(), Some(dec!(10)));

        let unbounded = gram();
        for number in [dec!(-1), dec!(0), dec!(1000000)] {
            assert_eq!(unbounded.check_plausibility(number), RangeResult::Undefined);
        }

        let lower_only = gram().with_plausible_bounds(Some("1"), None);
        assert_eq!(
            lower_only.check_plausibility(dec!(0.5)),
            RangeResult::TooLow
        );
        assert_eq!(
            lower_only.check_plausibility(dec!(1000000)),
            RangeResult::Ok
        );
    }

    #[test]
    fn test_malformed_plausibility_literal_is_ignored() {
        let unit = gram().with_plausible_bounds(Some("ten"), Some("200"));
        assert_eq!(unit.plausible_min(), None);
        assert_eq!(unit.check_plausibility(dec!(-5)), RangeResult::Ok);
        assert_eq!(unit.check_plausibility(dec!(201)), RangeResult::TooHigh);
    }

    #[test]
    fn test_dates() {
        let day = Unit::new("time", "day", "d", dec!(86400)).with_kind(DimensionKind::date());
        let reference = DimensionKind::default_reference_date();
        assert_eq!(reference.to_rfc3339(), "2001-01-01T00:00:00+00:00");

        let date = day.date_for_number(dec!(31), None).unwrap();
        assert_eq!(date.to_rfc3339(), "2001-02-01T00:00:00+00:00");
        assert_eq!(day.number_for_date(date, None).unwrap(), dec!(31));

        let half = day.date_for_number(dec!(0.5), Some(reference)).unwrap();
        assert_eq!(half.to_rfc3339(), "2001-01-01T12:00:00+00:00");

        let err = centimeter()
            .date_for_number(dec!(1), Some(reference))
            .unwrap_err();
        assert!(matches!(err, UnitError::NotADateUnit { .. }));
    }

    #[test]
    fn test_path_and_equality() {
        assert_eq!(centimeter().path(), "length.centimeter");
        assert_eq!(centimeter(), centimeter().with_precision(3));
        assert_ne!(centimeter(), inch());
    }
}
