/// Failures raised by unit lookups, conversions and decimal arithmetic.
///
/// Range parsing never produces one of these: an unparseable range string
/// yields an undefined [`crate::range::Range`] instead.
#[derive(Debug, thiserror::Error)]
pub enum UnitError {
    #[error("Unknown dimension '{dimension}'")]
    UnknownDimension { dimension: String },
    #[error("Unknown unit '{name}' in dimension '{dimension}'")]
    UnknownUnit { dimension: String, name: String },
    #[error("No default unit for data type '{data_type}'")]
    UnknownDataType { data_type: String },
    #[error("Malformed unit path '{path}', expected 'dimension.name'")]
    MalformedPath { path: String },
    #[error("Dimension mismatch: cannot convert {from} to {to}")]
    DimensionMismatch { from: String, to: String },
    #[error("Division by zero")]
    DivisionByZero,
    #[error("Decimal overflow")]
    Overflow,
    #[error("Failed to parse '{input}': {reason}")]
    ParseFailure { input: String, reason: String },
    #[error("Dimension '{dimension}' does not describe dates")]
    NotADateUnit { dimension: String },
    #[error("Invalid unit configuration for '{scope}': {reason}")]
    InvalidConfig { scope: String, reason: String },
    #[error("Invalid unit configuration: {0}")]
    Toml(#[from] toml::de::Error),
}

impl UnitError {
    pub(crate) fn parse_failure(input: &str, reason: impl Into<String>) -> Self {
        UnitError::ParseFailure {
            input: input.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_config(scope: &str, reason: impl Into<String>) -> Self {
        UnitError::InvalidConfig {
            scope: scope.to_string(),
            reason: reason.into(),
        }
    }
}
