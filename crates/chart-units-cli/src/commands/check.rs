use anyhow::Result;
use chart_units::{UnitRegistry, Value, ValueStringSize};
use rust_decimal::Decimal;
use serde_json::json;

use crate::OutputFormat;
use crate::commands::colored_result;

pub fn execute(
    registry: &UnitRegistry,
    number: Decimal,
    unit: Option<&str>,
    data_type: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    // clap makes `unit` and `--data-type` mutually exclusive, one of them required.
    let unit = match data_type {
        Some(data_type) => registry.default_unit_for_data_type(data_type)?,
        None => registry.unit_with_path(unit.unwrap_or_default())?,
    };
    let value = Value::new(number, unit);
    let result = value.check_plausibility();
    log::debug!("{} -> {:?}", value.unit().path(), result);

    match format {
        OutputFormat::Text => println!(
            "{}: {}",
            value.string_value(ValueStringSize::Small),
            colored_result(result)
        ),
        OutputFormat::Json => {
            let output = json!({
                "value": value,
                "plausibility": result,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}
