//! The unit catalog: dimensions, their units, and default units per data type.
//!
//! A registry is loaded once from static configuration and is read-only
//! afterwards. It is an ordinary value passed to whoever needs lookups; units
//! handed out are shared [`UnitRef`]s, so values never copy them.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::UnitError;
use crate::unit::{DEFAULT_PRECISION, DimensionKind, Unit, UnitRef};

/// The catalog shipped with the crate.
pub const BUILTIN_UNITS: &str = include_str!("../units.toml");

/// Separator between dimension and unit name in a unit path.
pub const PATH_SEPARATOR: char = '.';

/// Top-level registry configuration, usually read from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RegistryConfig {
    /// Data type name → unit path, e.g. `bodyweight = "weight.kilogram"`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub data_types: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dimensions: BTreeMap<String, DimensionConfig>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DimensionKindConfig {
    #[default]
    Scalar,
    Date,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DimensionConfig {
    #[serde(default)]
    pub kind: DimensionKindConfig,

    /// Only meaningful for date dimensions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_date: Option<DateTime<Utc>>,

    /// In display order.
    #[serde(default)]
    pub units: Vec<UnitConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct UnitConfig {
    pub name: String,
    pub label: String,

    /// Required unless `base` is set, in which case it must be 1 if given.
    #[serde(
        default,
        with = "rust_decimal::serde::str_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub base_multiplier: Option<Decimal>,

    #[serde(default = "default_precision")]
    pub precision: u32,

    #[serde(default)]
    pub base: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plausible_min: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plausible_max: Option<String>,
}

fn default_precision() -> u32 {
    DEFAULT_PRECISION
}

impl RegistryConfig {
    /// Parse from TOML string
    pub fn parse(content: &str) -> Result<Self, UnitError> {
        Ok(toml::from_str(content)?)
    }
}

/// One dimension's units in configuration order plus its base unit.
#[derive(Debug, Clone)]
pub struct Dimension {
    name: Arc<str>,
    kind: DimensionKind,
    units: Vec<UnitRef>,
    base: UnitRef,
}

impl Dimension {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &DimensionKind {
        &self.kind
    }

    pub fn units(&self) -> &[UnitRef] {
        &self.units
    }

    pub fn base_unit(&self) -> &UnitRef {
        &self.base
    }

    pub fn unit(&self, name: &str) -> Option<&UnitRef> {
        self.units.iter().find(|unit| unit.name() == name)
    }

    fn load(name: &str, config: &DimensionConfig) -> Result<Self, UnitError> {
        if name.is_empty() || name.contains(PATH_SEPARATOR) {
            return Err(UnitError::invalid_config(
                name,
                format!("dimension names must be non-empty and free of '{PATH_SEPARATOR}'"),
            ));
        }
        if config.units.is_empty() {
            return Err(UnitError::invalid_config(name, "dimension has no units"));
        }

        let kind = match (config.kind, config.reference_date) {
            (DimensionKindConfig::Scalar, None) => DimensionKind::Scalar,
            (DimensionKindConfig::Scalar, Some(_)) => {
                return Err(UnitError::invalid_config(
                    name,
                    "reference-date requires kind = \"date\"",
                ));
            }
            (DimensionKindConfig::Date, reference) => DimensionKind::Date {
                reference: reference.unwrap_or_else(DimensionKind::default_reference_date),
            },
        };

        let dimension: Arc<str> = Arc::from(name);
        let mut seen = HashSet::new();
        let mut units = Vec::with_capacity(config.units.len());
        for unit in &config.units {
            let scope = format!("{name}{PATH_SEPARATOR}{}", unit.name);
            if unit.name.is_empty() {
                return Err(UnitError::invalid_config(name, "unit without a name"));
            }
            if !seen.insert(unit.name.as_str()) {
                return Err(UnitError::invalid_config(&scope, "duplicate unit name"));
            }

            let loaded = if unit.base {
                if unit.base_multiplier.is_some_and(|m| m != Decimal::ONE) {
                    return Err(UnitError::invalid_config(
                        &scope,
                        "base unit multiplier must be 1",
                    ));
                }
                Unit::base(dimension.clone(), unit.name.as_str(), unit.label.as_str())
            } else {
                let multiplier = unit.base_multiplier.ok_or_else(|| {
                    UnitError::invalid_config(&scope, "missing base-multiplier")
                })?;
                if multiplier <= Decimal::ZERO {
                    return Err(UnitError::invalid_config(
                        &scope,
                        "base-multiplier must be positive",
                    ));
                }
                Unit::new(
                    dimension.clone(),
                    unit.name.as_str(),
                    unit.label.as_str(),
                    multiplier,
                )
            };

            units.push(Arc::new(
                loaded
                    .with_precision(unit.precision)
                    .with_kind(kind.clone())
                    .with_plausible_bounds(
                        unit.plausible_min.as_deref(),
                        unit.plausible_max.as_deref(),
                    ),
            ));
        }

        let mut bases = units.iter().filter(|unit| unit.is_base_unit());
        let base = match (bases.next(), bases.next()) {
            (Some(base), None) => base.clone(),
            (None, _) => return Err(UnitError::invalid_config(name, "no base unit")),
            (Some(_), Some(_)) => {
                return Err(UnitError::invalid_config(name, "more than one base unit"));
            }
        };

        Ok(Self {
            name: dimension,
            kind,
            units,
            base,
        })
    }
}

#[derive(Debug, Clone)]
pub struct UnitRegistry {
    dimensions: BTreeMap<String, Dimension>,
    data_types: BTreeMap<String, UnitRef>,
}

impl UnitRegistry {
    /// Load the catalog embedded in the crate.
    pub fn builtin() -> Result<Self, UnitError> {
        Self::from_toml_str(BUILTIN_UNITS)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, UnitError> {
        Self::from_config(&RegistryConfig::parse(content)?)
    }

    /// Read a TOML catalog from disk.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        use anyhow::Context;

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("failed to load {}", path.display()))
    }

    pub fn from_config(config: &RegistryConfig) -> Result<Self, UnitError> {
        let dimensions = config
            .dimensions
            .iter()
            .map(|(name, dimension)| Ok((name.clone(), Dimension::load(name, dimension)?)))
            .collect::<Result<BTreeMap<_, _>, UnitError>>()?;

        let mut registry = Self {
            dimensions,
            data_types: BTreeMap::new(),
        };

        for (data_type, path) in &config.data_types {
            let unit = registry.unit_with_path(path).map_err(|err| {
                UnitError::invalid_config(data_type, format!("default unit: {err}"))
            })?;
            registry.data_types.insert(data_type.clone(), unit);
        }

        log::debug!(
            "Loaded {} units in {} dimensions, {} data types",
            registry
                .dimensions
                .values()
                .map(|d| d.units.len())
                .sum::<usize>(),
            registry.dimensions.len(),
            registry.data_types.len()
        );
        Ok(registry)
    }

    /// Dimensions sorted by name.
    pub fn dimensions(&self) -> impl Iterator<Item = &Dimension> {
        self.dimensions.values()
    }

    pub fn dimension(&self, dimension: &str) -> Result<&Dimension, UnitError> {
        self.dimensions
            .get(dimension)
            .ok_or_else(|| UnitError::UnknownDimension {
                dimension: dimension.to_string(),
            })
    }

    /// All units of a dimension in configuration order, and its base unit.
    pub fn units_of_dimension(&self, dimension: &str) -> Result<(&[UnitRef], &UnitRef), UnitError> {
        let dimension = self.dimension(dimension)?;
        Ok((dimension.units(), dimension.base_unit()))
    }

    pub fn unit(&self, dimension: &str, name: &str) -> Result<UnitRef, UnitError> {
        self.dimension(dimension)?
            .unit(name)
            .cloned()
            .ok_or_else(|| UnitError::UnknownUnit {
                dimension: dimension.to_string(),
                name: name.to_string(),
            })
    }

    /// Look up `dimension.name`, splitting on the first separator.
    pub fn unit_with_path(&self, path: &str) -> Result<UnitRef, UnitError> {
        let Some((dimension, name)) = path.split_once(PATH_SEPARATOR) else {
            return Err(UnitError::MalformedPath {
                path: path.to_string(),
            });
        };
        self.unit(dimension, name)
    }

    pub fn default_unit_for_data_type(&self, data_type: &str) -> Result<UnitRef, UnitError> {
        self.data_types
            .get(data_type)
            .cloned()
            .ok_or_else(|| UnitError::UnknownDataType {
                data_type: data_type.to_string(),
            })
    }

    /// Data type names with their default units, sorted by name.
    pub fn data_types(&self) -> impl Iterator<Item = (&str, &UnitRef)> {
        self.data_types
            .iter()
            .map(|(name, unit)| (name.as_str(), unit))
    }
}
