//! Exact base-10 arithmetic helpers on top of [`rust_decimal::Decimal`].
//!
//! Every operation returns a new value. Anything that could produce an
//! infinite, NaN or silently saturated result is surfaced as a [`UnitError`]
//! instead.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::UnitError;

pub trait DecimalExt: Sized {
    /// Floored modulo: `self - divisor * floor(self / divisor)`.
    ///
    /// The result takes the sign of the divisor, so `-1 mod 3 == 2`.
    fn modulo(self, divisor: Decimal) -> Result<Decimal, UnitError>;

    /// Number of digits after the decimal point, ignoring trailing zeros.
    fn decimal_places(self) -> u32;

    fn absolute_number(self) -> Decimal;

    fn greater_number(self, other: Decimal) -> Decimal;

    fn smaller_number(self, other: Decimal) -> Decimal;
}

impl DecimalExt for Decimal {
    fn modulo(self, divisor: Decimal) -> Result<Decimal, UnitError> {
        if divisor.is_zero() {
            return Err(UnitError::DivisionByZero);
        }
        // `%` truncates toward zero; shift into the divisor's sign.
        let rem = self.checked_rem(divisor).ok_or(UnitError::Overflow)?;
        if !rem.is_zero() && rem.is_sign_negative() != divisor.is_sign_negative() {
            Ok(rem + divisor)
        } else {
            Ok(rem)
        }
    }

    fn decimal_places(self) -> u32 {
        self.normalize().scale()
    }

    fn absolute_number(self) -> Decimal {
        self.abs()
    }

    fn greater_number(self, other: Decimal) -> Decimal {
        if other > self { other } else { self }
    }

    fn smaller_number(self, other: Decimal) -> Decimal {
        if other < self { other } else { self }
    }
}

pub fn checked_divide(dividend: Decimal, divisor: Decimal) -> Result<Decimal, UnitError> {
    if divisor.is_zero() {
        return Err(UnitError::DivisionByZero);
    }
    dividend.checked_div(divisor).ok_or(UnitError::Overflow)
}

pub fn checked_multiply(lhs: Decimal, rhs: Decimal) -> Result<Decimal, UnitError> {
    lhs.checked_mul(rhs).ok_or(UnitError::Overflow)
}

/// Round to `places` decimal places, halves going away from zero.
pub fn round_half_away(number: Decimal, places: u32) -> Decimal {
    number.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero)
}

/// Parse a plain decimal literal such as `"12"`, `"-0.5"` or `"+3.25"`.
///
/// Exponents, thousands separators and literals that would lose digits are
/// rejected rather than approximated.
pub fn parse_decimal(input: &str) -> Result<Decimal, UnitError> {
    let trimmed = input.trim();
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let digits = unsigned.strip_prefix('-').unwrap_or(unsigned);

    if !digits.chars().any(|c| c.is_ascii_digit()) {
        return Err(UnitError::parse_failure(input, "expected a number"));
    }
    if !digits.chars().all(|c| c.is_ascii_digit() || c == '.') || digits.matches('.').count() > 1 {
        return Err(UnitError::parse_failure(input, "invalid decimal literal"));
    }

    let sign = if unsigned.starts_with('-') { "-" } else { "" };
    let digits = digits.strip_suffix('.').unwrap_or(digits);
    let literal = if digits.starts_with('.') {
        format!("{sign}0{digits}")
    } else {
        format!("{sign}{digits}")
    };

    Decimal::from_str_exact(&literal)
        .map_err(|err| UnitError::parse_failure(input, err.to_string()))
}

/// Minimal textual form: trailing zeros trimmed, negative zero printed as `0`.
pub fn format_decimal(number: Decimal) -> String {
    number.normalize().to_string()
}
