use std::path::PathBuf;

use anyhow::Result;
use chart_units::{RangeDisplayStyle, UnitRegistry, ValueStringSize, decimal::parse_decimal};
use clap::{Parser, Subcommand, ValueEnum};
use env_logger::Env;
use rust_decimal::Decimal;

mod commands;

#[derive(Parser)]
#[command(name = "chart-units")]
#[command(about = "Convert, format and validate growth-chart measurements", long_about = None)]
#[command(version)]
struct Cli {
    /// Unit catalog to load instead of the built-in one
    #[arg(long, global = true, value_hint = clap::ValueHint::FilePath)]
    registry: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List dimensions, or the units of one dimension
    Units {
        /// Dimension to list, e.g. "length"
        dimension: Option<String>,
    },

    /// List data types and their default units
    DataTypes,

    /// Convert a number between two units of the same dimension
    #[command(allow_negative_numbers = true)]
    Convert {
        #[arg(value_parser = decimal_arg)]
        number: Decimal,

        /// Source unit path, e.g. "length.inch"
        from: String,

        /// Target unit path, e.g. "length.centimeter"
        to: String,

        /// How much of the unit to print
        #[arg(short, long, default_value = "small")]
        size: SizeArg,
    },

    /// Check a measurement against its unit's plausibility bounds
    #[command(allow_negative_numbers = true)]
    Check {
        #[arg(value_parser = decimal_arg)]
        number: Decimal,

        /// Unit path of the number
        #[arg(required_unless_present = "data_type", conflicts_with = "data_type")]
        unit: Option<String>,

        /// Use the default unit of this data type instead of a unit path
        #[arg(long)]
        data_type: Option<String>,
    },

    /// Parse a range expression and classify numbers against it
    #[command(allow_negative_numbers = true)]
    Range {
        /// Range expression, e.g. "1 - 2", "< 100" or ">= 2.5"
        expression: String,

        /// Numbers to test
        #[arg(value_parser = decimal_arg)]
        numbers: Vec<Decimal>,

        /// Display style for the parsed range
        #[arg(short, long, default_value = "dash")]
        style: StyleArg,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum SizeArg {
    Long,
    Small,
    Compact,
}

impl From<SizeArg> for ValueStringSize {
    fn from(size: SizeArg) -> Self {
        match size {
            SizeArg::Long => ValueStringSize::Long,
            SizeArg::Small => ValueStringSize::Small,
            SizeArg::Compact => ValueStringSize::Compact,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum StyleArg {
    Dash,
    Brackets,
}

impl From<StyleArg> for RangeDisplayStyle {
    fn from(style: StyleArg) -> Self {
        match style {
            StyleArg::Dash => RangeDisplayStyle::Dash,
            StyleArg::Brackets => RangeDisplayStyle::SquareBrackets,
        }
    }
}

fn decimal_arg(s: &str) -> Result<Decimal, String> {
    parse_decimal(s).map_err(|e| e.to_string())
}

fn load_registry(path: Option<&PathBuf>) -> Result<UnitRegistry> {
    match path {
        Some(path) => UnitRegistry::from_file(path),
        None => Ok(UnitRegistry::builtin()?),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect NO_COLOR
    if std::env::var("NO_COLOR").is_ok() {
        colored::control::set_override(false);
    }

    // Initialize logger with default level (overridden by RUST_LOG)
    let env = Env::default().default_filter_or("warn");
    env_logger::Builder::from_env(env).init();

    let registry = load_registry(cli.registry.as_ref())?;

    match cli.command {
        Commands::Units { dimension } => {
            commands::units::execute(&registry, dimension.as_deref(), cli.format)
        }
        Commands::DataTypes => commands::units::execute_data_types(&registry, cli.format),
        Commands::Convert {
            number,
            from,
            to,
            size,
        } => commands::convert::execute(&registry, number, &from, &to, size.into(), cli.format),
        Commands::Check {
            number,
            unit,
            data_type,
        } => commands::check::execute(
            &registry,
            number,
            unit.as_deref(),
            data_type.as_deref(),
            cli.format,
        ),
        Commands::Range {
            expression,
            numbers,
            style,
        } => commands::range::execute(&expression, &numbers, style.into(), cli.format),
    }
}
