//! Output formatting utilities
//!
//! Every command produces one serializable result plus a set of primary rows
//! (curve samples, ranked points, cost curve, histogram bins). YAML and JSON
//! dump the full result; table and CSV show only the rows.

use std::io;

use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::cli::helpers::format_number;
use crate::cli::OutputFormat;

/// A single table/CSV cell
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Num(f64),
    Int(u64),
    Flag(bool),
}

impl Cell {
    /// Rounded for reading in a terminal
    fn display(&self) -> String {
        match self {
            Cell::Num(v) => format_number(*v),
            Cell::Int(v) => v.to_string(),
            Cell::Flag(b) => (if *b { "yes" } else { "" }).to_string(),
        }
    }

    /// Full precision for machine consumption
    fn raw(&self) -> String {
        match self {
            Cell::Num(v) => v.to_string(),
            Cell::Int(v) => v.to_string(),
            Cell::Flag(b) => b.to_string(),
        }
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::Num(v)
    }
}

impl From<u64> for Cell {
    fn from(v: u64) -> Self {
        Cell::Int(v)
    }
}

impl From<bool> for Cell {
    fn from(v: bool) -> Self {
        Cell::Flag(v)
    }
}

/// Determine the effective output format for a command.
///
/// Commands without a natural set of rows fall back to YAML when a
/// row-oriented format was requested.
pub fn effective_format(format: OutputFormat, has_rows: bool) -> OutputFormat {
    match format {
        OutputFormat::Table | OutputFormat::Csv if !has_rows => OutputFormat::Yaml,
        other => other,
    }
}

/// Print a serializable value as YAML or JSON.
///
/// Returns `false` for the other formats so the caller can render them.
pub fn print_structured<T: Serialize>(value: &T, format: OutputFormat) -> Result<bool> {
    match format {
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(value).into_diagnostic()?);
            Ok(true)
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(value).into_diagnostic()?);
            Ok(true)
        }
        _ => Ok(false),
    }
}

/// Render rows as a rounded table
pub fn render_table(headers: &[&str], rows: &[Vec<Cell>]) -> String {
    let mut builder = Builder::default();
    builder.push_record(headers.iter().map(|h| h.to_string()));
    for row in rows {
        builder.push_record(row.iter().map(Cell::display));
    }
    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}

/// Write rows as CSV with a header line
pub fn write_csv<W: io::Write>(writer: W, headers: &[&str], rows: &[Vec<Cell>]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(headers).into_diagnostic()?;
    for row in rows {
        wtr.write_record(row.iter().map(Cell::raw)).into_diagnostic()?;
    }
    wtr.flush().into_diagnostic()?;
    Ok(())
}

/// Print rows in the table or CSV format
pub fn print_rows(headers: &[&str], rows: &[Vec<Cell>], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Csv => write_csv(io::stdout().lock(), headers, rows),
        _ => {
            println!("{}", render_table(headers, rows));
            Ok(())
        }
    }
}
