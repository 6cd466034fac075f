pub mod check;
pub mod convert;
pub mod range;
pub mod units;

use chart_units::RangeResult;
use colored::{ColoredString, Colorize};

pub(crate) fn colored_result(result: RangeResult) -> ColoredString {
    match result {
        RangeResult::Ok => result.as_str().green(),
        RangeResult::TooLow | RangeResult::TooHigh => result.as_str().yellow().bold(),
        RangeResult::Undefined => result.as_str().dimmed(),
    }
}
