use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::{format_decimal, parse_decimal};
use crate::error::UnitError;
use crate::range::RangeResult;
use crate::registry::UnitRegistry;
use crate::unit::{Unit, UnitRef, ValueStringSize};

/// A measurement: an exact number (or no number at all) in a unit.
///
/// A missing number means "not measured" and is distinct from zero.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Value {
    number: Option<Decimal>,
    unit: UnitRef,
}

impl Value {
    pub fn new(number: Decimal, unit: UnitRef) -> Self {
        Self {
            number: Some(number),
            unit,
        }
    }

    pub fn null(unit: UnitRef) -> Self {
        Self { number: None, unit }
    }

    pub fn from_parts(number: Option<Decimal>, unit: UnitRef) -> Self {
        Self { number, unit }
    }

    /// Parse a decimal literal in `unit`. Blank text gives a null value.
    pub fn parse(text: &str, unit: UnitRef) -> Result<Self, UnitError> {
        if text.trim().is_empty() {
            return Ok(Self::null(unit));
        }
        Ok(Self::new(parse_decimal(text)?, unit))
    }

    pub fn number(&self) -> Option<Decimal> {
        self.number
    }

    pub fn unit(&self) -> &UnitRef {
        &self.unit
    }

    pub fn is_null(&self) -> bool {
        self.number.is_none()
    }

    pub fn number_in_base_unit(&self) -> Result<Option<Decimal>, UnitError> {
        self.number
            .map(|number| self.unit.number_in_base_unit(number))
            .transpose()
    }

    /// This value's number expressed in `unit`. A null value stays null, but
    /// the dimensions must still agree.
    pub fn number_in_unit(&self, unit: &Unit) -> Result<Option<Decimal>, UnitError> {
        if !self.unit.is_same_dimension(unit) {
            return Err(UnitError::DimensionMismatch {
                from: self.unit.path(),
                to: unit.path(),
            });
        }
        self.number
            .map(|number| self.unit.convert_number(number, unit))
            .transpose()
    }

    /// Like [`Value::number_in_unit`], naming a unit of this value's own dimension.
    pub fn number_in_unit_named(
        &self,
        name: &str,
        registry: &UnitRegistry,
    ) -> Result<Option<Decimal>, UnitError> {
        let unit = registry.unit(self.unit.dimension(), name)?;
        self.number_in_unit(&unit)
    }

    /// Rescale in place. Returns `false` and leaves the value untouched when
    /// the conversion is not possible.
    pub fn convert_to_unit(&mut self, unit: &UnitRef) -> bool {
        match self.number_in_unit(unit) {
            Ok(number) => {
                self.number = number;
                self.unit = unit.clone();
                true
            }
            Err(err) => {
                log::debug!("Not converting {}: {}", self.unit.path(), err);
                false
            }
        }
    }

    /// A converted copy, or `None` when the conversion is not possible.
    pub fn value_in_unit(&self, unit: &UnitRef) -> Option<Value> {
        let number = self.number_in_unit(unit).ok()?;
        Some(Self::from_parts(number, unit.clone()))
    }

    /// Null values render as an empty string.
    pub fn string_value(&self, size: ValueStringSize) -> String {
        self.unit.string_value_for_number(self.number, size)
    }

    /// Null values are [`RangeResult::Undefined`].
    pub fn check_plausibility(&self) -> RangeResult {
        match self.number_in_base_unit() {
            Ok(Some(number)) => self.unit.check_plausibility(number),
            Ok(None) => RangeResult::Undefined,
            Err(err) => {
                log::warn!("Cannot check plausibility of {}: {}", self.unit.path(), err);
                RangeResult::Undefined
            }
        }
    }

    pub fn record(&self) -> ValueRecord {
        ValueRecord {
            number: self.number.map(format_decimal),
            unit: self.unit.path(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.string_value(ValueStringSize::Small))
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.record().serialize(serializer)
    }
}

/// Storable form of a [`Value`]: a decimal literal and a unit path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    pub unit: String,
}

impl ValueRecord {
    pub fn resolve(&self, registry: &UnitRegistry) -> Result<Value, UnitError> {
        let unit = registry.unit_with_path(&self.unit)?;
        match &self.number {
            Some(number) => Value::parse(number, unit),
            None => Ok(Value::null(unit)),
        }
    }
}
