//! Decoder for published spreadsheet CSV exports.
//!
//! The exports are simple: one record per line, comma separated, values
//! optionally wrapped in double quotes. The first non-blank line names the
//! columns and every following line becomes a [`Record`] keyed by those
//! names.
//!
//! The decoder never fails. Short rows are padded with empty strings, long
//! rows are cut at the header width and a price column that does not parse
//! becomes zero.
//!
//! Not supported: quoted values spanning several lines and `""` escapes
//! inside a quoted value.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::types::parse_price;

/// Column names whose values are coerced to a decimal price.
pub const PRICE_COLUMNS: &[&str] = &["preco", "price"];

/// A single decoded cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    Text(String),
    Number(Decimal),
}

impl Field {
    /// The cell as text. Numbers are rendered in their canonical form.
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Number(number) => number.to_string(),
        }
    }
}

/// One data row, keyed by header name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: BTreeMap<String, Field>,
}

impl Record {
    /// Look up a cell by column name.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&Field> {
        self.fields.get(column)
    }

    /// First non-empty text value among `columns`, or `""`.
    ///
    /// Columns are tried in order, which lets callers accept both the
    /// Portuguese and the English header for the same field.
    #[must_use]
    pub fn text(&self, columns: &[&str]) -> String {
        columns
            .iter()
            .filter_map(|column| self.fields.get(*column))
            .map(Field::to_text)
            .find(|value| !value.is_empty())
            .unwrap_or_default()
    }

    /// First numeric value among `columns`, or zero.
    #[must_use]
    pub fn number(&self, columns: &[&str]) -> Decimal {
        columns
            .iter()
            .find_map(|column| match self.fields.get(*column) {
                Some(Field::Number(number)) => Some(*number),
                Some(Field::Text(text)) if !text.is_empty() => Some(parse_price(text)),
                _ => None,
            })
            .unwrap_or(Decimal::ZERO)
    }

    /// Number of columns in the record.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over `(column, value)` pairs in column-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>> FromIterator<(K, Field)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, Field)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Decode a CSV export into records.
///
/// Returns an empty vector for empty or blank input, and for input that
/// only has a header line.
#[must_use]
pub fn decode(text: &str) -> Vec<Record> {
    let mut lines = text.lines().filter(|line| !line.trim().is_empty());

    let Some(header_line) = lines.next() else {
        return Vec::new();
    };
    let header = split_line(header_line);

    lines
        .map(|line| {
            let mut values = split_line(line).into_iter();
            header
                .iter()
                .map(|column| {
                    let value = values.next().unwrap_or_default();
                    (column.clone(), coerce(column, value))
                })
                .collect::<Record>()
        })
        .collect()
}

fn coerce(column: &str, value: String) -> Field {
    if PRICE_COLUMNS.contains(&column) {
        Field::Number(parse_price(&value))
    } else {
        Field::Text(value)
    }
}

/// Split one line on commas that are not inside double quotes.
///
/// Quote characters only toggle the quoted state; they never end up in a
/// value.
fn split_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in line.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);

    fields
        .into_iter()
        .map(|field| field.trim().to_string())
        .collect()
}
