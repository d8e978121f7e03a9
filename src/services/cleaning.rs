//! The cleaning pipeline: raw catalog table in, fixed-schema table out.
//!
//! Stages run in a fixed order, each producing a new table state: irrelevant
//! columns go first, nested columns are flattened, types are coerced (with
//! zero-as-missing normalization), financial metrics are derived, credits are
//! resolved, under-populated rows are filtered, and the result is projected
//! onto the target schema. Every stage is a single-threaded pure transform.

use crate::constants::cleaning::{
    IRRELEVANT_COLUMNS, LIST_COLUMNS, MIN_POPULATED_CELLS, MISSING_TEXT_PLACEHOLDER,
    NUMERIC_COLUMNS, PLACEHOLDER_TEXT_COLUMNS, RELEASED, SEPARATOR, ZERO_AS_MISSING,
};
use crate::constants::schema::TARGET_COLUMNS;
use crate::services::{credits, flatten};
use crate::table::{Cell, Table};
use chrono::NaiveDate;
use tracing::info;

/// Row-drop accounting for the batch report.
#[derive(Debug, Clone, Copy, Default)]
pub struct CleanStats {
    pub input_rows: usize,
    pub non_released: usize,
    pub missing_keys: usize,
    pub sparse: usize,
    pub output_rows: usize,
}

pub fn drop_irrelevant_columns(table: &mut Table) {
    for column in IRRELEVANT_COLUMNS {
        table.drop_column(column);
    }
}

/// Derives `collection_name` from the collection mapping and flattens every
/// list-of-mappings column to a joined name string. The raw
/// `belongs_to_collection` cells stay in place; the final schema carries both.
pub fn flatten_nested_columns(table: &mut Table) {
    let collection = flatten::flatten_column(table, "belongs_to_collection", "name", SEPARATOR);
    table.set_column("collection_name", collection);

    for column in LIST_COLUMNS {
        let flattened = flatten::flatten_column(table, column, "name", SEPARATOR);
        table.set_column(column, flattened);
    }
}

fn coerce_numeric(cell: &Cell) -> Cell {
    match cell {
        Cell::Int(_) | Cell::Float(_) => cell.clone(),
        Cell::Text(text) => {
            let text = text.trim();
            text.parse::<i64>().map(Cell::Int).unwrap_or_else(|_| {
                text.parse::<f64>().map_or(Cell::Null, Cell::Float)
            })
        }
        _ => Cell::Null,
    }
}

/// Coerces dates and numerics, keeps only released movies (dropping the then
/// uninformative status column), and normalizes zero budget/revenue/runtime to
/// null before any metric is derived. Returns the non-released row count.
pub fn convert_datatypes(table: &mut Table) -> usize {
    table.map_column("release_date", |cell| match cell {
        Cell::Date(_) => cell.clone(),
        Cell::Text(text) => NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .map_or(Cell::Null, Cell::Date),
        _ => Cell::Null,
    });

    let non_released = if table.has_column("status") {
        let dropped = table.retain_rows(|row| row.get("status").as_str() == Some(RELEASED));
        table.drop_column("status");
        if dropped > 0 {
            info!("Filtered out {} non-released movies", dropped);
        }
        dropped
    } else {
        0
    };

    for column in NUMERIC_COLUMNS {
        table.map_column(column, coerce_numeric);
    }

    for column in ZERO_AS_MISSING {
        table.map_column(column, |cell| match cell.as_f64() {
            Some(value) if value == 0.0 => Cell::Null,
            _ => cell.clone(),
        });
    }

    non_released
}

fn in_millions(cells: &[Cell]) -> Vec<Cell> {
    cells
        .iter()
        .map(|cell| cell.as_f64().map_or(Cell::Null, |v| Cell::Float(v / 1e6)))
        .collect()
}

/// Derives `budget_musd`, `revenue_musd`, `profit_musd` and `roi`. Null
/// operands propagate; budget is never zero here, so ROI cannot divide by
/// zero.
pub fn calculate_financials(table: &mut Table) {
    let budget = in_millions(&table.column("budget"));
    let revenue = in_millions(&table.column("revenue"));

    let profit: Vec<Cell> = revenue
        .iter()
        .zip(&budget)
        .map(|(r, b)| match (r.as_f64(), b.as_f64()) {
            (Some(r), Some(b)) => Cell::Float(r - b),
            _ => Cell::Null,
        })
        .collect();

    let roi: Vec<Cell> = revenue
        .iter()
        .zip(&budget)
        .map(|(r, b)| match (r.as_f64(), b.as_f64()) {
            (Some(r), Some(b)) => Cell::Float(r / b),
            _ => Cell::Null,
        })
        .collect();

    table.set_column("budget_musd", budget);
    table.set_column("revenue_musd", revenue);
    table.set_column("profit_musd", profit);
    table.set_column("roi", roi);
}

/// Resolves cast, cast size, director and crew size from the credits column.
pub fn process_credits(table: &mut Table) {
    let credit_cells = table.column("credits");

    let mut cast = Vec::with_capacity(credit_cells.len());
    let mut cast_size = Vec::with_capacity(credit_cells.len());
    let mut director = Vec::with_capacity(credit_cells.len());
    let mut crew_size = Vec::with_capacity(credit_cells.len());

    for cell in &credit_cells {
        let (names, size) = credits::resolve_cast(cell, SEPARATOR);
        cast.push(names.map_or(Cell::Null, Cell::Text));
        cast_size.push(Cell::Int(size));

        let (name, size) = credits::resolve_director(cell);
        director.push(name.map_or(Cell::Null, Cell::Text));
        crew_size.push(Cell::Int(size));
    }

    table.set_column("cast", cast);
    table.set_column("cast_size", cast_size);
    table.set_column("director", director);
    table.set_column("crew_size", crew_size);
}

/// Normalizes placeholder text to null, then applies the two row filters:
/// rows without id or title go first, then rows with fewer than
/// [`MIN_POPULATED_CELLS`] populated cells. Returns (missing-key, sparse)
/// drop counts.
pub fn handle_missing(table: &mut Table) -> (usize, usize) {
    for column in PLACEHOLDER_TEXT_COLUMNS {
        table.map_column(column, |cell| match cell.as_str() {
            Some("") | Some(MISSING_TEXT_PLACEHOLDER) => Cell::Null,
            _ => cell.clone(),
        });
    }

    let missing_keys =
        table.retain_rows(|row| !row.get("id").is_null() && !row.get("title").is_null());
    let sparse = table.retain_rows(|row| row.populated_cells() >= MIN_POPULATED_CELLS);

    if missing_keys + sparse > 0 {
        info!(
            "Dropped {} rows missing id/title and {} sparse rows",
            missing_keys, sparse
        );
    }

    (missing_keys, sparse)
}

/// Projects onto the fixed target schema. Absent columns materialize as
/// all-null; working helper columns never leak into the output.
#[must_use]
pub fn finalize_schema(table: &Table) -> Table {
    table.project(TARGET_COLUMNS)
}

/// Runs the full pipeline in order.
#[must_use]
pub fn clean(mut table: Table) -> (Table, CleanStats) {
    let mut stats = CleanStats {
        input_rows: table.len(),
        ..CleanStats::default()
    };

    info!("Starting cleaning pipeline on {} records", table.len());

    drop_irrelevant_columns(&mut table);
    flatten_nested_columns(&mut table);
    stats.non_released = convert_datatypes(&mut table);
    calculate_financials(&mut table);
    process_credits(&mut table);
    let (missing_keys, sparse) = handle_missing(&mut table);
    stats.missing_keys = missing_keys;
    stats.sparse = sparse;

    let cleaned = finalize_schema(&table);
    stats.output_rows = cleaned.len();

    info!("Cleaning complete. Final dataset has {} records", cleaned.len());

    (cleaned, stats)
}
