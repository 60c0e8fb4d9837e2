//! Validation helpers for the user input table.
//!
//! Header checks and group-list splitting.

use std::collections::HashMap;

/// Columns every input table must carry.
pub const REQUIRED_COLUMNS: &[&str] = &[
    "username",
    "first_name",
    "last_name",
    "display_name",
    "email",
];

/// Optional column holding a `;`-separated list of group display names.
pub const GROUPS_COLUMN: &str = "groups";

/// Separator between group names in the groups column.
pub const GROUP_SEPARATOR: char = ';';

/// Validate input headers and map column positions (`column_name` -> index).
///
/// Matching is case-insensitive and ignores surrounding whitespace. When a
/// column name repeats, the first occurrence wins. Unknown columns are
/// ignored. The error lists every missing required column.
pub fn validate_headers(headers: &[String]) -> Result<HashMap<String, usize>, String> {
    let mut columns = HashMap::new();

    for (idx, header) in headers.iter().enumerate() {
        let normalized = header.trim().to_lowercase();
        if normalized.is_empty() {
            continue;
        }

        let known = REQUIRED_COLUMNS.contains(&normalized.as_str()) || normalized == GROUPS_COLUMN;
        if known {
            columns.entry(normalized).or_insert(idx);
        }
    }

    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|c| !columns.contains_key(*c))
        .collect();

    if missing.is_empty() {
        Ok(columns)
    } else {
        Err(format!("Missing required columns: {}", missing.join(", ")))
    }
}

/// Split a raw groups cell into trimmed, non-empty names in list order.
#[must_use]
pub fn split_group_names(raw: &str) -> Vec<String> {
    raw.split(GROUP_SEPARATOR)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
