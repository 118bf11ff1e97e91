//! CSV decoding command.
//!
//! # Usage
//!
//! ```bash
//! fofurices decode produtos.csv                  # raw records
//! fofurices decode produtos.csv --as products    # typed products
//! fofurices decode categorias.csv --as categories
//! ```

use std::path::Path;

use clap::ValueEnum;
use fofurices_core::csv::{Field, Record, decode};
use fofurices_core::Catalog;
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors that can occur while decoding a file.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The file could not be read.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    /// The output could not be serialized.
    #[error("Failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// How decoded rows are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DecodeAs {
    /// Column name to cell value, as decoded
    Records,
    /// Typed products, deduplicated by id
    Products,
    /// Typed categories, deduplicated by id
    Categories,
}

/// Decode `path` and print it as pretty JSON.
pub fn run(path: &Path, shape: DecodeAs) -> Result<(), DecodeError> {
    let text = std::fs::read_to_string(path).map_err(|source| DecodeError::Read {
        path: path.display().to_string(),
        source,
    })?;

    let output = render(&text, shape)?;

    #[allow(clippy::print_stdout)]
    {
        println!("{output}");
    }
    Ok(())
}

/// Decode `text` into the JSON document for `shape`.
fn render(text: &str, shape: DecodeAs) -> Result<String, serde_json::Error> {
    let records = decode(text);
    tracing::debug!(rows = records.len(), "Decoded CSV");

    match shape {
        DecodeAs::Records => {
            let rows: Vec<Value> = records.iter().map(record_to_json).collect();
            serde_json::to_string_pretty(&rows)
        }
        DecodeAs::Products => {
            serde_json::to_string_pretty(Catalog::from_records(&records, &[]).products())
        }
        DecodeAs::Categories => {
            serde_json::to_string_pretty(Catalog::from_records(&[], &records).categories())
        }
    }
}

fn record_to_json(record: &Record) -> Value {
    let fields: Map<String, Value> = record
        .iter()
        .map(|(column, field)| (column.to_string(), field_to_json(field)))
        .collect();
    Value::Object(fields)
}

fn field_to_json(field: &Field) -> Value {
    match field {
        Field::Text(text) => Value::String(text.clone()),
        Field::Number(number) => number
            .to_string()
            .parse::<serde_json::Number>()
            .map_or_else(|_| Value::String(number.to_string()), Value::Number),
    }
}
