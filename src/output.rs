use serde_json::{Map, Value};
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use crate::dataset::{Cell, Dataset};
use crate::{debug_println, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// UTF-8, comma separated, `.` decimals.
    #[default]
    Csv,
    /// Latin-1, semicolon separated, `,` decimals, for spreadsheet apps
    /// set to a Brazilian locale.
    Spreadsheet,
    /// Pretty-printed array of objects keyed by column header.
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OutputFormat::Csv => write!(f, "csv"),
            OutputFormat::Spreadsheet => write!(f, "spreadsheet"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "spreadsheet" | "csv-latin1" => Ok(OutputFormat::Spreadsheet),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format: {}", other)),
        }
    }
}

fn format_decimal(value: f64, decimal_comma: bool) -> String {
    let text = value.to_string();
    if decimal_comma {
        text.replace('.', ",")
    } else {
        text
    }
}

/// Missing values render as an empty cell, never as zero.
fn render_cell(cell: Cell, decimal_comma: bool) -> String {
    match cell {
        Cell::Text(text) => text.unwrap_or_default().to_string(),
        Cell::Integer(value) => value.map(|v| v.to_string()).unwrap_or_default(),
        Cell::Decimal(value) => value
            .map(|v| format_decimal(v, decimal_comma))
            .unwrap_or_default(),
    }
}

fn json_cell(cell: Cell) -> Value {
    match cell {
        Cell::Text(text) => text.map_or(Value::Null, |t| Value::String(t.to_string())),
        Cell::Integer(value) => value.map_or(Value::Null, Value::from),
        Cell::Decimal(value) => value.map_or(Value::Null, Value::from),
    }
}

/// Encodes text as ISO-8859-1. Characters outside Latin-1 become `?`.
pub fn encode_latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

pub fn write_dataset<W: Write>(dataset: &Dataset, writer: W, format: OutputFormat) -> Result<usize> {
    match format {
        OutputFormat::Csv => write_csv(dataset, writer, b',', false, false),
        OutputFormat::Spreadsheet => write_csv(dataset, writer, b';', true, true),
        OutputFormat::Json => write_json(dataset, writer),
    }
}

fn write_csv<W: Write>(
    dataset: &Dataset,
    writer: W,
    delimiter: u8,
    decimal_comma: bool,
    latin1: bool,
) -> Result<usize> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);

    let encode = |text: &str| -> Vec<u8> {
        if latin1 {
            encode_latin1(text)
        } else {
            text.as_bytes().to_vec()
        }
    };

    writer.write_record(dataset.schema.headers().into_iter().map(encode))?;

    for row in &dataset.rows {
        let record = dataset
            .schema
            .columns
            .iter()
            .map(|column| encode(&render_cell(column.cell(row), decimal_comma)));
        writer.write_record(record)?;
    }

    writer.flush()?;
    Ok(dataset.rows.len())
}

fn write_json<W: Write>(dataset: &Dataset, mut writer: W) -> Result<usize> {
    let rows: Vec<Value> = dataset
        .rows
        .iter()
        .map(|row| {
            let object: Map<String, Value> = dataset
                .schema
                .columns
                .iter()
                .map(|column| (column.header().to_string(), json_cell(column.cell(row))))
                .collect();
            Value::Object(object)
        })
        .collect();

    serde_json::to_writer_pretty(&mut writer, &rows)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(rows.len())
}

pub fn save_dataset(dataset: &Dataset, output_path: &str, format: OutputFormat) -> Result<usize> {
    let path = Path::new(output_path);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let file = File::create(path)?;
    let written = write_dataset(dataset, BufWriter::new(file), format)?;
    debug_println!("Saved {} rows to {} as {}", written, output_path, format);
    Ok(written)
}
