//! The tracking worksheet as a grid of cells.
//!
//! Rows are kept exactly as the Sheets API returned them so a rewrite only
//! drops whole rows and never reshapes the ones it keeps.

use std::collections::HashSet;

use serde_json::Value;

use crate::monitor::error::RecordError;
use crate::monitor::types::{LineItemId, TrackedLineItem};

pub const LINE_ITEM_ID_COLUMN: &str = "Line Item ID";
pub const THRESHOLD_COLUMN: &str = "Impression Threshold";

pub type Cell = Value;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Worksheet {
    pub header: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Worksheet {
    /// Splits raw `values` (header first) into header and data rows.
    pub fn from_values(mut values: Vec<Vec<Cell>>) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        let header = values
            .remove(0)
            .iter()
            .map(|cell| cell_text(cell).unwrap_or_default())
            .collect();

        Self {
            header,
            rows: values,
        }
    }

    /// Header row followed by the data rows, ready for an append call.
    pub fn to_values(&self) -> Vec<Vec<Cell>> {
        let mut values = Vec::with_capacity(self.rows.len() + 1);
        values.push(self.header.iter().cloned().map(Value::String).collect());
        values.extend(self.rows.iter().cloned());
        values
    }

    pub fn is_empty(&self) -> bool {
        self.header.is_empty() && self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h.trim() == name)
    }

    /// Validates every non-blank data row into a record.
    ///
    /// A missing required column fails the whole sheet; a bad row only
    /// fails its own entry.
    pub fn records(&self) -> Result<Vec<Result<TrackedLineItem, RecordError>>, RecordError> {
        let id_col = self.required_column(LINE_ITEM_ID_COLUMN)?;
        let threshold_col = self.required_column(THRESHOLD_COLUMN)?;

        let records = self
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| !is_blank(row))
            .map(|(index, row)| {
                // +1 for the header, +1 for 1-based numbering
                parse_record(row, index + 2, id_col, threshold_col)
            })
            .collect();

        Ok(records)
    }

    /// Copy of the worksheet without the rows whose line item ID is in
    /// `excluded`. Relative order of the kept rows is unchanged.
    pub fn without_line_items(&self, excluded: &HashSet<LineItemId>) -> Self {
        let Some(id_col) = self.column_index(LINE_ITEM_ID_COLUMN) else {
            return self.clone();
        };

        let rows = self
            .rows
            .iter()
            .filter(|row| {
                let id = row
                    .get(id_col)
                    .and_then(cell_text)
                    .and_then(|text| LineItemId::parse(&text));
                !matches!(id, Some(id) if excluded.contains(&id))
            })
            .cloned()
            .collect();

        Self {
            header: self.header.clone(),
            rows,
        }
    }

    fn required_column(&self, name: &str) -> Result<usize, RecordError> {
        self.column_index(name).ok_or_else(|| RecordError::MissingColumn {
            column: name.to_string(),
        })
    }
}

fn parse_record(
    row: &[Cell],
    row_number: usize,
    id_col: usize,
    threshold_col: usize,
) -> Result<TrackedLineItem, RecordError> {
    let raw_id = required_text(row, id_col, row_number, LINE_ITEM_ID_COLUMN)?;
    let line_item_id =
        LineItemId::parse(&raw_id).ok_or_else(|| RecordError::InvalidLineItemId {
            row: row_number,
            value: raw_id.clone(),
        })?;

    let raw_threshold = required_text(row, threshold_col, row_number, THRESHOLD_COLUMN)?;
    let impression_threshold = parse_threshold(&raw_threshold).ok_or_else(|| {
        RecordError::InvalidThreshold {
            row: row_number,
            value: raw_threshold.clone(),
        }
    })?;

    Ok(TrackedLineItem {
        line_item_id,
        impression_threshold,
        row_number,
    })
}

fn required_text(
    row: &[Cell],
    col: usize,
    row_number: usize,
    column: &str,
) -> Result<String, RecordError> {
    row.get(col)
        .and_then(cell_text)
        .filter(|text| !text.is_empty())
        .ok_or_else(|| RecordError::MissingValue {
            row: row_number,
            column: column.to_string(),
        })
}

/// Thresholds are typed by hand, so tolerate thousands separators.
fn parse_threshold(raw: &str) -> Option<u64> {
    let digits: String = raw.chars().filter(|c| *c != ',' && *c != '_').collect();
    digits.parse::<u64>().ok()
}

/// Text form of a cell. Whole numbers render without a fractional part so
/// a numeric ID cell compares equal to its string form.
pub fn cell_text(cell: &Cell) -> Option<String> {
    match cell {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                Some(u.to_string())
            } else if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else {
                n.as_f64().map(|f| {
                    if f.fract() == 0.0 && f.abs() < 1e15 {
                        format!("{:.0}", f)
                    } else {
                        f.to_string()
                    }
                })
            }
        }
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn is_blank(row: &[Cell]) -> bool {
    row.iter()
        .all(|cell| cell_text(cell).map_or(true, |text| text.is_empty()))
}
