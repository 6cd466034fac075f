//! Optionally bounded numeric ranges parsed from short human-written
//! expressions.
//!
//! Supported forms (whitespace is ignored):
//!
//! ```text
//! 1 - 2        both bounds, inclusive
//! 1 -< 2       upper bound exclusive
//! >1 - 2       lower bound exclusive
//! 1 -          open upwards
//! - 2          open downwards
//! < 100        exclusive upper bound only
//! <= 100       inclusive upper bound only (also `≤`)
//! > 2.5        exclusive lower bound only
//! >= 2.5       inclusive lower bound only (also `≥`)
//! ```
//!
//! A lower bound only accepts `>`/`>=`/`≥` and an upper bound only
//! `<`/`<=`/`≤`. Anything else leaves the range undefined; parsing never
//! fails loudly.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::{
    checked_divide, checked_multiply, format_decimal, parse_decimal, round_half_away,
};
use crate::error::UnitError;

/// Outcome of testing a number against a range or plausibility bounds.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RangeResult {
    /// Nothing to test against.
    Undefined,
    TooLow,
    Ok,
    TooHigh,
}

impl RangeResult {
    pub const fn as_str(&self) -> &'static str {
        match self {
            RangeResult::Undefined => "undefined",
            RangeResult::TooLow => "too low",
            RangeResult::Ok => "ok",
            RangeResult::TooHigh => "too high",
        }
    }
}

impl fmt::Display for RangeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum RangeDisplayStyle {
    /// `a - b`, `≥ a`, `< b`
    #[default]
    Dash,
    /// `[a,b]`, `(a,∞)`
    SquareBrackets,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Range {
    pub from: Option<Decimal>,
    pub including_from: bool,
    pub to: Option<Decimal>,
    pub including_to: bool,
    /// The literal the bounds were parsed from. Not kept in sync with
    /// direct bound mutation; see [`Range::update_string_value`].
    string_value: Option<String>,
}

impl Default for Range {
    fn default() -> Self {
        Self {
            from: None,
            including_from: true,
            to: None,
            including_to: true,
            string_value: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Comparator {
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

#[derive(Clone, Copy)]
enum Side {
    Lower,
    Upper,
}

const COMPARATORS: [(&str, Comparator); 6] = [
    ("<=", Comparator::LessEqual),
    ("≤", Comparator::LessEqual),
    (">=", Comparator::GreaterEqual),
    ("≥", Comparator::GreaterEqual),
    ("<", Comparator::Less),
    (">", Comparator::Greater),
];

fn split_comparator(s: &str) -> (Option<Comparator>, &str) {
    for (prefix, comparator) in COMPARATORS {
        if let Some(rest) = s.strip_prefix(prefix) {
            return (Some(comparator), rest);
        }
    }
    (None, s)
}

/// The dash separating two bounds is the first `-` that closes a number.
/// A leading dash with no such successor means "no lower bound".
fn find_separator(s: &str) -> Option<usize> {
    let mut prev: Option<char> = None;
    for (idx, ch) in s.char_indices() {
        if ch == '-' && prev.is_some_and(|p| p.is_ascii_digit() || p == '.') {
            return Some(idx);
        }
        prev = Some(ch);
    }
    s.starts_with('-').then_some(0)
}

/// `None` on a syntax error, `Some(None)` for an empty bound.
fn parse_bound(text: &str, side: Side) -> Option<Option<(Decimal, bool)>> {
    if text.is_empty() {
        return Some(None);
    }
    let (comparator, number) = split_comparator(text);
    let inclusive = match (side, comparator) {
        (_, None) => true,
        (Side::Lower, Some(Comparator::Greater)) | (Side::Upper, Some(Comparator::Less)) => false,
        (Side::Lower, Some(Comparator::GreaterEqual))
        | (Side::Upper, Some(Comparator::LessEqual)) => true,
        _ => return None,
    };
    let number = parse_decimal(number).ok()?;
    Some(Some((number, inclusive)))
}

fn parse_bounds(input: &str) -> Option<Range> {
    let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return None;
    }

    if let (Some(comparator), rest) = split_comparator(&compact)
        && let Ok(number) = parse_decimal(rest)
    {
        let mut range = Range::default();
        match comparator {
            Comparator::Less | Comparator::LessEqual => {
                range.to = Some(number);
                range.including_to = comparator == Comparator::LessEqual;
            }
            Comparator::Greater | Comparator::GreaterEqual => {
                range.from = Some(number);
                range.including_from = comparator == Comparator::GreaterEqual;
            }
        }
        return Some(range);
    }

    let sep = find_separator(&compact)?;
    let lower = parse_bound(&compact[..sep], Side::Lower)?;
    let upper = parse_bound(&compact[sep + 1..], Side::Upper)?;
    if lower.is_none() && upper.is_none() {
        return None;
    }

    let mut range = Range::default();
    if let Some((from, inclusive)) = lower {
        range.from = Some(from);
        range.including_from = inclusive;
    }
    if let Some((to, inclusive)) = upper {
        range.to = Some(to);
        range.including_to = inclusive;
    }
    Some(range)
}

impl Range {
    /// Parse a range expression. Unparseable input yields an undefined range
    /// that still remembers the literal.
    pub fn parse(input: &str) -> Self {
        let mut range = Range::default();
        range.set_string_value(input);
        range
    }

    /// Both bounds inclusive; `None` leaves that side open.
    pub fn from_bounds(from: Option<Decimal>, to: Option<Decimal>) -> Self {
        Self {
            from,
            to,
            ..Self::default()
        }
    }

    /// Build from two decimal literals; an empty or blank literal is an open bound.
    pub fn from_strings(min: &str, max: &str) -> Result<Self, UnitError> {
        let bound = |s: &str| {
            if s.trim().is_empty() {
                Ok(None)
            } else {
                parse_decimal(s).map(Some)
            }
        };
        Ok(Self::from_bounds(bound(min)?, bound(max)?))
    }

    /// Copy with replaced bounds, keeping this range's inclusivity.
    pub fn copy_with_custom(&self, from: Option<Decimal>, to: Option<Decimal>) -> Self {
        Self {
            from,
            including_from: self.including_from,
            to,
            including_to: self.including_to,
            string_value: None,
        }
    }

    /// Replace bounds and inclusivity by parsing `input`.
    pub fn set_string_value(&mut self, input: &str) {
        let parsed = parse_bounds(input).unwrap_or_else(|| {
            log::debug!("Unparseable range '{}', leaving it undefined", input);
            Range::default()
        });
        self.from = parsed.from;
        self.including_from = parsed.including_from;
        self.to = parsed.to;
        self.including_to = parsed.including_to;
        self.string_value = Some(input.trim().to_string());
    }

    /// The literal this range was parsed from, or its dash rendering.
    pub fn string_value(&self) -> String {
        match &self.string_value {
            Some(s) => s.clone(),
            None => self.string_value_with_style(RangeDisplayStyle::Dash),
        }
    }

    /// Store the dash rendering of the current bounds as the literal.
    pub fn update_string_value(&mut self) {
        self.string_value = self
            .is_defined()
            .then(|| self.string_value_with_style(RangeDisplayStyle::Dash));
    }

    pub fn is_defined(&self) -> bool {
        self.from.is_some() || self.to.is_some()
    }

    fn is_inverted(&self) -> bool {
        matches!((self.from, self.to), (Some(from), Some(to)) if from > to)
    }

    fn satisfies_lower(&self, number: Decimal) -> bool {
        match self.from {
            None => true,
            Some(from) if self.including_from => number >= from,
            Some(from) => number > from,
        }
    }

    fn satisfies_upper(&self, number: Decimal) -> bool {
        match self.to {
            None => true,
            Some(to) if self.including_to => number <= to,
            Some(to) => number < to,
        }
    }

    pub fn contains(&self, number: Decimal) -> bool {
        self.is_defined() && self.satisfies_lower(number) && self.satisfies_upper(number)
    }

    /// Classify `number`. Undefined and inverted (`from > to`) ranges give
    /// [`RangeResult::Undefined`].
    pub fn test(&self, number: Decimal) -> RangeResult {
        if !self.is_defined() || self.is_inverted() {
            RangeResult::Undefined
        } else if !self.satisfies_lower(number) {
            RangeResult::TooLow
        } else if !self.satisfies_upper(number) {
            RangeResult::TooHigh
        } else {
            RangeResult::Ok
        }
    }

    fn map_bounds(&mut self, mut f: impl FnMut(Decimal) -> Decimal) {
        self.from = self.from.map(&mut f);
        self.to = self.to.map(&mut f);
    }

    pub fn multiply_by(&mut self, factor: Decimal) -> Result<(), UnitError> {
        let from = self.from.map(|n| checked_multiply(n, factor)).transpose()?;
        let to = self.to.map(|n| checked_multiply(n, factor)).transpose()?;
        self.from = from;
        self.to = to;
        Ok(())
    }

    pub fn divide_by(&mut self, divisor: Decimal) -> Result<(), UnitError> {
        let from = self.from.map(|n| checked_divide(n, divisor)).transpose()?;
        let to = self.to.map(|n| checked_divide(n, divisor)).transpose()?;
        self.from = from;
        self.to = to;
        Ok(())
    }

    pub fn rounded_to_precision(&self, precision: u32) -> Range {
        let mut rounded = self.clone();
        rounded.round_to_precision(precision);
        rounded
    }

    pub fn round_to_precision(&mut self, precision: u32) {
        self.map_bounds(|n| round_half_away(n, precision));
    }

    pub fn ceil(&mut self) {
        self.map_bounds(|n| n.ceil());
    }

    pub fn floor(&mut self) {
        self.map_bounds(|n| n.floor());
    }

    pub fn string_value_with_style(&self, style: RangeDisplayStyle) -> String {
        match style {
            RangeDisplayStyle::Dash => self.dash_string(),
            RangeDisplayStyle::SquareBrackets => self.bracket_string(),
        }
    }

    fn dash_string(&self) -> String {
        match (self.from, self.to) {
            (Some(from), Some(to)) => format!(
                "{}{} - {}{}",
                if self.including_from { "" } else { ">" },
                format_decimal(from),
                if self.including_to { "" } else { "<" },
                format_decimal(to)
            ),
            (Some(from), None) => format!(
                "{} {}",
                if self.including_from { "≥" } else { ">" },
                format_decimal(from)
            ),
            (None, Some(to)) => format!(
                "{} {}",
                if self.including_to { "≤" } else { "<" },
                format_decimal(to)
            ),
            (None, None) => String::new(),
        }
    }

    fn bracket_string(&self) -> String {
        if !self.is_defined() {
            return String::new();
        }
        let (open, from) = match self.from {
            Some(from) if self.including_from => ('[', format_decimal(from)),
            Some(from) => ('(', format_decimal(from)),
            None => ('(', "-∞".to_string()),
        };
        let (close, to) = match self.to {
            Some(to) if self.including_to => (']', format_decimal(to)),
            Some(to) => (')', format_decimal(to)),
            None => (')', "∞".to_string()),
        };
        format!("{open}{from},{to}{close}")
    }
}

impl From<&str> for Range {
    fn from(s: &str) -> Self {
        Range::parse(s)
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.string_value())
    }
}

impl Serialize for Range {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.string_value())
    }
}

impl<'de> Deserialize<'de> for Range {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Range::parse(&s))
    }
}
