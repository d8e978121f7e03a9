//! Column-oriented working table for the cleaning pipeline.
//!
//! Every cell is an explicitly nullable scalar; nested structures fetched from
//! the catalog stay as [`Cell::Nested`] until a pipeline stage flattens them.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde_json::Value;
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
    /// A nested mapping or sequence that has not been flattened yet.
    Nested(Value),
}

impl Cell {
    #[must_use]
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Text(b.to_string()),
            Value::Number(n) => n
                .as_i64()
                .map(Self::Int)
                .or_else(|| n.as_f64().map(Self::Float))
                .unwrap_or(Self::Null),
            Value::String(s) => Self::Text(s),
            nested @ (Value::Array(_) | Value::Object(_)) => Self::Nested(nested),
        }
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            #[allow(clippy::cast_precision_loss)]
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// CSV form of the cell. Nulls become empty fields; nested structures are
    /// serialized so a reloaded raw table carries them as literal strings.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Text(s) => s.clone(),
            Self::Date(d) => d.format("%Y-%m-%d").to_string(),
            Self::Nested(v) => serde_json::to_string(v).unwrap_or_default(),
        }
    }
}

/// One row of a [`Table`], with column-name access.
pub struct Row<'a> {
    columns: &'a [String],
    cells: &'a [Cell],
}

impl Row<'_> {
    #[must_use]
    pub fn get(&self, column: &str) -> &Cell {
        self.columns
            .iter()
            .position(|c| c == column)
            .map_or(&Cell::Null, |i| &self.cells[i])
    }

    #[must_use]
    pub fn populated_cells(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_null()).count()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    #[must_use]
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Builds a table from fetched records. Columns are the union of all field
    /// names (sorted); fields absent from a record become null cells.
    #[must_use]
    pub fn from_records(records: &[serde_json::Map<String, Value>]) -> Self {
        let mut columns: Vec<String> = records
            .iter()
            .flat_map(serde_json::Map::keys)
            .cloned()
            .collect();
        columns.sort();
        columns.dedup();

        let rows = records
            .iter()
            .map(|record| {
                columns
                    .iter()
                    .map(|col| {
                        record
                            .get(col)
                            .cloned()
                            .map_or(Cell::Null, Cell::from_json)
                    })
                    .collect()
            })
            .collect();

        Self { columns, rows }
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn push_row(&mut self, cells: Vec<Cell>) {
        assert_eq!(cells.len(), self.columns.len(), "row width mismatch");
        self.rows.push(cells);
    }

    #[must_use]
    pub fn row(&self, index: usize) -> Row<'_> {
        Row {
            columns: &self.columns,
            cells: &self.rows[index],
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().map(|cells| Row {
            columns: &self.columns,
            cells,
        })
    }

    /// Cells of one column in row order; absent columns read as all-null.
    #[must_use]
    pub fn column(&self, name: &str) -> Vec<Cell> {
        self.column_index(name).map_or_else(
            || vec![Cell::Null; self.rows.len()],
            |i| self.rows.iter().map(|r| r[i].clone()).collect(),
        )
    }

    /// Adds `name` with the given cells, or replaces it if already present.
    pub fn set_column(&mut self, name: &str, cells: Vec<Cell>) {
        assert_eq!(cells.len(), self.rows.len(), "column height mismatch");
        if let Some(i) = self.column_index(name) {
            for (row, cell) in self.rows.iter_mut().zip(cells) {
                row[i] = cell;
            }
        } else {
            self.columns.push(name.to_string());
            for (row, cell) in self.rows.iter_mut().zip(cells) {
                row.push(cell);
            }
        }
    }

    pub fn drop_column(&mut self, name: &str) {
        if let Some(i) = self.column_index(name) {
            self.columns.remove(i);
            for row in &mut self.rows {
                row.remove(i);
            }
        }
    }

    /// Rewrites every cell of a column in place; no-op for absent columns.
    pub fn map_column(&mut self, name: &str, f: impl Fn(&Cell) -> Cell) {
        if let Some(i) = self.column_index(name) {
            for row in &mut self.rows {
                row[i] = f(&row[i]);
            }
        }
    }

    /// Keeps only rows the predicate accepts; returns the number dropped.
    pub fn retain_rows(&mut self, keep: impl Fn(&Row<'_>) -> bool) -> usize {
        let before = self.rows.len();
        let columns = std::mem::take(&mut self.columns);
        self.rows.retain(|cells| {
            keep(&Row {
                columns: &columns,
                cells,
            })
        });
        self.columns = columns;
        before - self.rows.len()
    }

    /// Projects onto `target` in order. Columns missing from the working table
    /// are materialized as all-null; anything not in `target` is discarded.
    #[must_use]
    pub fn project(&self, target: &[&str]) -> Self {
        let indices: Vec<Option<usize>> =
            target.iter().map(|name| self.column_index(name)).collect();

        let rows = self
            .rows
            .iter()
            .map(|row| {
                indices
                    .iter()
                    .map(|i| i.map_or(Cell::Null, |i| row[i].clone()))
                    .collect()
            })
            .collect();

        Self {
            columns: target.iter().map(ToString::to_string).collect(),
            rows,
        }
    }

    pub fn save_csv(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;

        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row.iter().map(Cell::render))?;
        }
        writer.flush()?;

        Ok(())
    }

    /// Loads a previously persisted table. Every non-empty field comes back as
    /// text; type coercion is the cleaning pipeline's job, and nested columns
    /// come back as the serialized strings the tolerant parser decodes.
    pub fn load_csv(path: &Path) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let columns: Vec<String> = reader
            .headers()
            .context("Missing CSV header row")?
            .iter()
            .map(ToString::to_string)
            .collect();

        let mut table = Self::new(columns);
        for record in reader.records() {
            let record = record.context("Malformed CSV record")?;
            let cells = record
                .iter()
                .map(|field| {
                    if field.is_empty() {
                        Cell::Null
                    } else {
                        Cell::Text(field.to_string())
                    }
                })
                .collect();
            table.push_row(cells);
        }

        Ok(table)
    }
}
