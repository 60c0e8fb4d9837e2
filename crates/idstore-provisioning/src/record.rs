//! Input table parsing.
//!
//! Turns the raw user table into statically validated [`UserRecord`]s.
//! Structural problems (unreadable file, missing required column) are fatal;
//! problems confined to one row become a [`RowError`] and the remaining rows
//! are still parsed.

use std::collections::HashMap;
use std::path::Path;

use idstore_connector::NewUser;
use serde::Serialize;

use crate::error::{ProvisionError, ProvisionResult};
use crate::validation::{self, GROUPS_COLUMN};

/// UTF-8 BOM bytes.
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// One validated row of the input table. Immutable once read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    /// 1-based line the row starts on (header = 1).
    pub line_number: usize,
    /// Unique login name.
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub display_name: String,
    pub email: String,
    /// Group display names, trimmed, in input order.
    pub groups: Vec<String>,
}

impl UserRecord {
    /// Borrow the attributes needed to create this user.
    #[must_use]
    pub fn as_new_user(&self) -> NewUser<'_> {
        NewUser {
            username: &self.username,
            given_name: &self.first_name,
            family_name: &self.last_name,
            display_name: &self.display_name,
            email: &self.email,
        }
    }
}

/// A row rejected at the input boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowError {
    pub line_number: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    pub message: String,
}

/// Result of parsing a complete input table.
#[derive(Debug, Default)]
pub struct ParsedInput {
    /// Rows that passed validation, in input order.
    pub records: Vec<UserRecord>,
    /// Rows that did not.
    pub errors: Vec<RowError>,
    /// Total data rows seen (excluding header).
    pub total_rows: usize,
}

/// Read and parse the input table at `path`.
///
/// Any failure to open or read the file is reported as
/// [`ProvisionError::InputMissing`].
pub fn read_records<P: AsRef<Path>>(path: P) -> ProvisionResult<ParsedInput> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|source| ProvisionError::InputMissing {
        path: path.to_path_buf(),
        source,
    })?;

    let parsed = parse_records(&data)?;

    tracing::debug!(
        path = %path.display(),
        total_rows = parsed.total_rows,
        valid_rows = parsed.records.len(),
        invalid_rows = parsed.errors.len(),
        "Input table parsed"
    );

    Ok(parsed)
}

/// Strip UTF-8 BOM from the beginning of data if present.
fn strip_utf8_bom(data: &[u8]) -> &[u8] {
    data.strip_prefix(UTF8_BOM).unwrap_or(data)
}

/// Parse an input table from raw bytes.
pub fn parse_records(data: &[u8]) -> ProvisionResult<ParsedInput> {
    let data = strip_utf8_bom(data);

    if data.iter().all(u8::is_ascii_whitespace) {
        return Err(ProvisionError::InvalidInput("input file is empty".to_string()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(b',')
        .from_reader(data);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ProvisionError::InvalidInput(format!("failed to read header row: {e}")))?
        .iter()
        .map(str::to_string)
        .collect();

    let columns = validation::validate_headers(&headers).map_err(ProvisionError::InvalidInput)?;

    let mut parsed = ParsedInput::default();
    let mut last_line = 1;

    for result in reader.records() {
        let position = match &result {
            Ok(r) => r.position(),
            Err(e) => e.position(),
        };
        let line_number = position
            .map(|p| record_start_line(data, p))
            .unwrap_or(last_line + 1);
        last_line = line_number;
        parsed.total_rows += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                parsed.errors.push(RowError {
                    line_number,
                    username: None,
                    column: None,
                    message: format!("Failed to parse row: {e}"),
                });
                continue;
            }
        };

        match build_record(&record, &columns, line_number) {
            Ok(user) => parsed.records.push(user),
            Err(error) => parsed.errors.push(error),
        }
    }

    Ok(parsed)
}

/// Line on which the record at `position` starts.
///
/// Rows may span lines (quoted newlines), so counting rows is not enough.
/// The reader stamps a record with its position before skipping blank
/// lines, so those are stepped over here.
fn record_start_line(data: &[u8], position: &csv::Position) -> usize {
    let start = usize::try_from(position.byte())
        .unwrap_or(data.len())
        .min(data.len());
    let blank_lines = data[start..]
        .iter()
        .take_while(|&&b| matches!(b, b'\n' | b'\r'))
        .filter(|&&b| b == b'\n')
        .count();

    usize::try_from(position.line())
        .unwrap_or(usize::MAX)
        .saturating_add(blank_lines)
}

/// Validate one row and build its record.
///
/// Required fields are checked in column order; the first empty one rejects
/// the row.
fn build_record(
    record: &csv::StringRecord,
    columns: &HashMap<String, usize>,
    line_number: usize,
) -> Result<UserRecord, RowError> {
    let username = get_field(record, columns, "username");

    let require = |column: &str| {
        get_field(record, columns, column).ok_or_else(|| RowError {
            line_number,
            username: username.clone(),
            column: Some(column.to_string()),
            message: format!("Required field '{column}' is empty"),
        })
    };

    let groups = get_field(record, columns, GROUPS_COLUMN)
        .map(|g| validation::split_group_names(&g))
        .unwrap_or_default();

    Ok(UserRecord {
        line_number,
        username: require("username")?,
        first_name: require("first_name")?,
        last_name: require("last_name")?,
        display_name: require("display_name")?,
        email: require("email")?,
        groups,
    })
}

/// Get a trimmed, non-empty field from a record by column name.
fn get_field(
    record: &csv::StringRecord,
    columns: &HashMap<String, usize>,
    name: &str,
) -> Option<String> {
    columns
        .get(name)
        .and_then(|&idx| record.get(idx))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
