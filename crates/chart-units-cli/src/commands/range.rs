use anyhow::{Result, bail};
use chart_units::decimal::format_decimal;
use chart_units::{Range, RangeDisplayStyle};
use rust_decimal::Decimal;
use serde_json::json;

use crate::OutputFormat;
use crate::commands::colored_result;

pub fn execute(
    expression: &str,
    numbers: &[Decimal],
    style: RangeDisplayStyle,
    format: OutputFormat,
) -> Result<()> {
    let range = Range::parse(expression);
    if !range.is_defined() {
        bail!("could not parse range '{}'", expression);
    }

    match format {
        OutputFormat::Text => {
            println!("{}", range.string_value_with_style(style));
            for &number in numbers {
                println!(
                    "{}: {}",
                    format_decimal(number),
                    colored_result(range.test(number))
                );
            }
        }
        OutputFormat::Json => {
            let results: Vec<_> = numbers
                .iter()
                .map(|&number| {
                    json!({
                        "number": format_decimal(number),
                        "result": range.test(number),
                    })
                })
                .collect();
            let output = json!({
                "range": range.string_value_with_style(style),
                "from": range.from.map(format_decimal),
                "including-from": range.including_from,
                "to": range.to.map(format_decimal),
                "including-to": range.including_to,
                "results": results,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}
