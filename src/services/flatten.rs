//! Projection of nested structure cells into scalar columns.

use crate::parser::parse_structured;
use crate::table::{Cell, Table};
use serde_json::Value;

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Flattens one cell.
///
/// A mapping yields the value of `key` (absent or empty means no value); a
/// sequence of mappings yields `key` from every mapping that carries it,
/// joined with `separator`. Anything else, including unparseable text, yields
/// no value.
#[must_use]
pub fn flatten_cell(cell: &Cell, key: &str, separator: &str) -> Option<String> {
    match parse_structured(cell) {
        Value::Object(map) => map.get(key).and_then(scalar_text),
        Value::Array(items) => {
            let values: Vec<String> = items
                .iter()
                .filter_map(Value::as_object)
                .filter_map(|item| item.get(key))
                .filter_map(scalar_text)
                .collect();
            if values.is_empty() {
                None
            } else {
                Some(values.join(separator))
            }
        }
        _ => None,
    }
}

/// Flattens a whole column; an empty result is a null cell, never an empty
/// string. Applied independently per column.
#[must_use]
pub fn flatten_column(table: &Table, column: &str, key: &str, separator: &str) -> Vec<Cell> {
    table
        .column(column)
        .iter()
        .map(|cell| flatten_cell(cell, key, separator).map_or(Cell::Null, Cell::Text))
        .collect()
}
