//! Cast and crew extraction from the nested credits block.

use crate::parser::parse_structured;
use crate::table::Cell;
use serde_json::Value;

/// Extracts the cast name list (source order, joined with `separator`) and the
/// raw cast-list length. Entries without a usable name still count toward the
/// length. Missing or malformed credits yield no names and a zero count.
#[must_use]
pub fn resolve_cast(cell: &Cell, separator: &str) -> (Option<String>, i64) {
    let parsed = parse_structured(cell);
    let Some(cast) = parsed.get("cast").and_then(Value::as_array) else {
        return (None, 0);
    };

    let names: Vec<&str> = cast
        .iter()
        .filter_map(|entry| entry.get("name"))
        .filter_map(Value::as_str)
        .collect();

    let joined = if names.is_empty() {
        None
    } else {
        Some(names.join(separator))
    };

    #[allow(clippy::cast_possible_wrap)]
    (joined, cast.len() as i64)
}

/// Crew job title that identifies the director.
pub const DIRECTOR_JOB: &str = "Director";

/// Resolves the director and the raw crew-list length.
///
/// The director is the first crew entry in list order whose job is exactly
/// "Director"; a first match without a name resolves to no director, and no
/// later entry is considered.
#[must_use]
pub fn resolve_director(cell: &Cell) -> (Option<String>, i64) {
    let parsed = parse_structured(cell);
    let Some(crew) = parsed.get("crew").and_then(Value::as_array) else {
        return (None, 0);
    };

    let director = crew
        .iter()
        .find(|entry| entry.get("job").and_then(Value::as_str) == Some(DIRECTOR_JOB))
        .and_then(|entry| entry.get("name"))
        .and_then(Value::as_str)
        .map(ToString::to_string);

    #[allow(clippy::cast_possible_wrap)]
    (director, crew.len() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cast_counts_raw_entries() {
        let cell = Cell::Nested(json!({
            "cast": [
                {"name": "Sam Worthington"},
                {"character": "uncredited"},
                {"name": "Zoe Saldana"}
            ]
        }));

        let (names, size) = resolve_cast(&cell, "|");
        assert_eq!(names.as_deref(), Some("Sam Worthington|Zoe Saldana"));
        assert_eq!(size, 3);
    }

    #[test]
    fn test_empty_cast_has_no_names() {
        let (names, size) = resolve_cast(&Cell::Nested(json!({"cast": []})), "|");
        assert_eq!(names, None);
        assert_eq!(size, 0);
    }

    #[test]
    fn test_first_director_wins() {
        let cell = Cell::Nested(json!({
            "crew": [
                {"job": "Editor", "name": "E"},
                {"job": "Director", "name": "A"},
                {"job": "Director", "name": "B"}
            ]
        }));

        let (director, size) = resolve_director(&cell);
        assert_eq!(director.as_deref(), Some("A"));
        assert_eq!(size, 3);
    }

    #[test]
    fn test_first_matching_entry_without_name_yields_none() {
        let cell = Cell::Nested(json!({
            "crew": [
                {"job": "Director"},
                {"job": "Director", "name": "B"}
            ]
        }));

        let (director, size) = resolve_director(&cell);
        assert_eq!(director, None);
        assert_eq!(size, 2);
    }

    #[test]
    fn test_malformed_credits_degrade_to_empty() {
        let (names, cast_size) = resolve_cast(&Cell::Text("{'cast': [".into()), "|");
        assert_eq!(names, None);
        assert_eq!(cast_size, 0);

        let (director, crew_size) = resolve_director(&Cell::Null);
        assert_eq!(director, None);
        assert_eq!(crew_size, 0);

        // A credits block whose cast is not a list counts as no data.
        let (names, size) = resolve_cast(&Cell::Nested(json!({"cast": "oops"})), "|");
        assert_eq!(names, None);
        assert_eq!(size, 0);
    }
}
