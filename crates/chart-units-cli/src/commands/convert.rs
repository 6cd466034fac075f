use anyhow::{Context, Result};
use chart_units::{UnitRegistry, Value, ValueStringSize};
use rust_decimal::Decimal;
use serde_json::json;

use crate::OutputFormat;

pub fn execute(
    registry: &UnitRegistry,
    number: Decimal,
    from: &str,
    to: &str,
    size: ValueStringSize,
    format: OutputFormat,
) -> Result<()> {
    let source = Value::new(number, registry.unit_with_path(from)?);
    let target = registry.unit_with_path(to)?;
    let converted = source
        .number_in_unit(&target)
        .with_context(|| format!("cannot convert {} to {}", from, to))?;
    let converted = Value::from_parts(converted, target);
    let text = converted.string_value(size);

    match format {
        OutputFormat::Text => println!("{text}"),
        OutputFormat::Json => {
            let output = json!({
                "input": source,
                "output": converted,
                "text": text,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}
