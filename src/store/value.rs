//! # Store Values
//!
//! Bound parameter values and result rows exchanged with a record store.

use std::collections::BTreeMap;

use serde::Serialize;

use super::errors::{StoreError, StoreResult};

/// Named parameters bound to a query, keyed by placeholder name (without
/// the leading `:`). Ordered so that rendering and logging are stable.
pub type Params = BTreeMap<String, SqlValue>;

/// A scalar value crossing the store boundary
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SqlValue {
    #[default]
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// Integer view of the value. Reals are truncated, numeric text is parsed.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SqlValue::Integer(i) => Some(*i),
            SqlValue::Real(f) if f.is_finite() => Some(f.trunc() as i64),
            SqlValue::Text(s) => s.trim().parse::<i64>().ok().or_else(|| {
                s.trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(|f| f.trunc() as i64)
            }),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SqlValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Text rendering of any non-null value
    pub fn to_text(&self) -> Option<String> {
        match self {
            SqlValue::Null => None,
            SqlValue::Integer(i) => Some(i.to_string()),
            SqlValue::Real(f) => Some(f.to_string()),
            SqlValue::Text(s) => Some(s.clone()),
        }
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Integer(value)
    }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self {
        SqlValue::Integer(i64::from(value))
    }
}

impl From<u64> for SqlValue {
    fn from(value: u64) -> Self {
        i64::try_from(value)
            .map(SqlValue::Integer)
            .unwrap_or(SqlValue::Integer(i64::MAX))
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(SqlValue::Null)
    }
}

/// Ordered rows with their column metadata
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSet {
    columns: Vec<String>,
    rows: Vec<Vec<SqlValue>>,
}

impl RowSet {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<SqlValue>>) -> Self {
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column, matched case-insensitively
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(name))
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().map(move |values| Row {
            set: self,
            values,
        })
    }

    /// The first row, if any
    pub fn first(&self) -> Option<Row<'_>> {
        self.rows().next()
    }
}

/// A borrowed view of one row
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    set: &'a RowSet,
    values: &'a [SqlValue],
}

impl<'a> Row<'a> {
    /// Value of a named column
    pub fn get(&self, column: &str) -> StoreResult<&'a SqlValue> {
        self.set
            .column_index(column)
            .and_then(|idx| self.values.get(idx))
            .ok_or_else(|| StoreError::MissingColumn(column.to_string()))
    }

    /// Nullable integer column
    pub fn get_i64(&self, column: &str) -> StoreResult<Option<i64>> {
        let value = self.get(column)?;
        if value.is_null() {
            return Ok(None);
        }
        value.as_i64().map(Some).ok_or_else(|| StoreError::Decode {
            column: column.to_string(),
            reason: format!("expected an integer, got {:?}", value),
        })
    }

    /// Non-negative count column; NULL counts as zero
    pub fn get_count(&self, column: &str) -> StoreResult<u64> {
        match self.get_i64(column)? {
            None => Ok(0),
            Some(n) => u64::try_from(n).map_err(|_| StoreError::Decode {
                column: column.to_string(),
                reason: format!("negative count {}", n),
            }),
        }
    }

    /// Nullable text column; numbers are rendered as text
    pub fn get_text(&self, column: &str) -> StoreResult<Option<String>> {
        Ok(self.get(column)?.to_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RowSet {
        RowSet::new(
            vec!["NAME".to_string(), "TOTAL".to_string()],
            vec![
                vec![SqlValue::from("Ana"), SqlValue::Integer(3)],
                vec![SqlValue::Null, SqlValue::Text("7".to_string())],
            ],
        )
    }

    #[test]
    fn test_column_lookup_is_case_insensitive() {
        let rows = sample();
        assert_eq!(rows.column_index("name"), Some(0));
        assert_eq!(rows.column_index("missing"), None);
    }

    #[test]
    fn test_row_accessors() {
        let rows = sample();
        let all: Vec<_> = rows.rows().collect();

        assert_eq!(all[0].get_text("NAME").unwrap(), Some("Ana".to_string()));
        assert_eq!(all[0].get_count("TOTAL").unwrap(), 3);
        assert_eq!(all[1].get_text("NAME").unwrap(), None);
        assert_eq!(all[1].get_i64("TOTAL").unwrap(), Some(7));
    }

    #[test]
    fn test_missing_column_is_an_error() {
        let rows = sample();
        let row = rows.first().unwrap();
        assert!(matches!(
            row.get("NOPE"),
            Err(StoreError::MissingColumn(c)) if c == "NOPE"
        ));
    }

    #[test]
    fn test_non_numeric_text_fails_integer_decode() {
        let rows = RowSet::new(
            vec!["N".to_string()],
            vec![vec![SqlValue::from("abc")]],
        );
        let row = rows.first().unwrap();
        assert!(matches!(row.get_i64("N"), Err(StoreError::Decode { .. })));
    }

    #[test]
    fn test_real_values_truncate() {
        assert_eq!(SqlValue::Real(4.9).as_i64(), Some(4));
        assert_eq!(SqlValue::Text("12.0".to_string()).as_i64(), Some(12));
        assert_eq!(SqlValue::Null.as_i64(), None);
    }

    #[test]
    fn test_option_conversion() {
        assert_eq!(SqlValue::from(None::<i32>), SqlValue::Null);
        assert_eq!(SqlValue::from(Some(1980)), SqlValue::Integer(1980));
    }
}
