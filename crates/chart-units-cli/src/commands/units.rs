use anyhow::Result;
use chart_units::decimal::format_decimal;
use chart_units::registry::Dimension;
use chart_units::{DimensionKind, RangeDisplayStyle, Unit, UnitRegistry};
use colored::Colorize;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Cell, Color, Table};
use serde_json::json;

use crate::OutputFormat;

pub fn execute(
    registry: &UnitRegistry,
    dimension: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    match (dimension, format) {
        (None, OutputFormat::Text) => print_dimensions(registry),
        (None, OutputFormat::Json) => {
            let dimensions: Vec<_> = registry.dimensions().map(dimension_json).collect();
            println!("{}", serde_json::to_string_pretty(&dimensions)?);
        }
        (Some(name), OutputFormat::Text) => {
            let dimension = registry.dimension(name)?;
            println!("{}", name.bold());
            print_units(dimension.units().iter().map(|u| u.as_ref()));
        }
        (Some(name), OutputFormat::Json) => {
            let (units, _) = registry.units_of_dimension(name)?;
            let units: Vec<_> = units.iter().map(|u| unit_json(u)).collect();
            println!("{}", serde_json::to_string_pretty(&units)?);
        }
    }
    Ok(())
}

pub fn execute_data_types(registry: &UnitRegistry, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            let mut table = Table::new();
            table.load_preset(UTF8_FULL_CONDENSED);
            table.set_header(vec!["Data type", "Default unit"]);
            for (data_type, unit) in registry.data_types() {
                table.add_row(vec![
                    Cell::new(data_type).fg(Color::Cyan),
                    Cell::new(unit.path()),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Json => {
            let map: serde_json::Map<_, _> = registry
                .data_types()
                .map(|(data_type, unit)| (data_type.to_string(), json!(unit.path())))
                .collect();
            println!("{}", serde_json::to_string_pretty(&map)?);
        }
    }
    Ok(())
}

fn kind_name(kind: &DimensionKind) -> &'static str {
    match kind {
        DimensionKind::Scalar => "scalar",
        DimensionKind::Date { .. } => "date",
    }
}

fn print_dimensions(registry: &UnitRegistry) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["Dimension", "Kind", "Base unit", "Units"]);
    for dimension in registry.dimensions() {
        let names: Vec<_> = dimension.units().iter().map(|u| u.name()).collect();
        table.add_row(vec![
            Cell::new(dimension.name()).fg(Color::Cyan),
            Cell::new(kind_name(dimension.kind())),
            Cell::new(dimension.base_unit().name()),
            Cell::new(names.join(", ")),
        ]);
    }
    println!("{table}");
}

fn print_units<'a>(units: impl Iterator<Item = &'a Unit>) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["Name", "Label", "Multiplier", "Precision", "Bounds"]);
    for unit in units {
        let name = if unit.is_base_unit() {
            Cell::new(format!("{} (base)", unit.name())).fg(Color::Green)
        } else {
            Cell::new(unit.name())
        };
        table.add_row(vec![
            name,
            Cell::new(unit.label()),
            Cell::new(format_decimal(unit.base_multiplier())),
            Cell::new(unit.precision()),
            Cell::new(plausible_bounds(unit)),
        ]);
    }
    println!("{table}");
}

fn plausible_bounds(unit: &Unit) -> String {
    let range = unit.plausible_range();
    range.string_value_with_style(RangeDisplayStyle::SquareBrackets)
}

fn dimension_json(dimension: &Dimension) -> serde_json::Value {
    let units: Vec<_> = dimension.units().iter().map(|u| unit_json(u)).collect();
    json!({
        "dimension": dimension.name(),
        "kind": kind_name(dimension.kind()),
        "base": dimension.base_unit().name(),
        "units": units,
    })
}

fn unit_json(unit: &Unit) -> serde_json::Value {
    json!({
        "path": unit.path(),
        "name": unit.name(),
        "label": unit.label(),
        "base-multiplier": format_decimal(unit.base_multiplier()),
        "precision": unit.precision(),
        "base": unit.is_base_unit(),
        "plausible-min": unit.plausible_min().map(format_decimal),
        "plausible-max": unit.plausible_max().map(format_decimal),
    })
}
