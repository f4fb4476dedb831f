//! # Birth-Year Normalization
//!
//! Birth dates are stored as `MM/DD/YY`. The century is resolved by one
//! rule: read the year as `2000 + YY`, and fold it back into the 1900s when
//! that lands after the cutoff year.
//!
//! This module is the only place the rule exists. SQL reaches it through
//! the `BIRTH_YEAR` scalar function that stores register from
//! [`BirthYearRule::normalize`], and queries only ever spell the derived
//! year through [`birth_year_expr`].

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::columns;

/// Latest plausible birth year
pub const DEFAULT_CENTURY_CUTOFF: i32 = 2025;

/// Name of the SQL scalar function exposing the rule
pub const BIRTH_YEAR_FUNCTION: &str = "BIRTH_YEAR";

const RAW_DATE_FORMAT: &str = "%m/%d/%y";

/// Century disambiguation rule for two-digit birth years
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BirthYearRule {
    /// Years after this are moved back one century
    pub century_cutoff: i32,
}

impl Default for BirthYearRule {
    fn default() -> Self {
        Self {
            century_cutoff: DEFAULT_CENTURY_CUTOFF,
        }
    }
}

impl BirthYearRule {
    pub fn new(century_cutoff: i32) -> Self {
        Self { century_cutoff }
    }

    /// Four-digit birth year of a raw `MM/DD/YY` value.
    ///
    /// Returns `None` for anything that is not a real calendar date in that
    /// format; such records take no part in year-dependent queries.
    pub fn normalize(&self, raw: &str) -> Option<i32> {
        let date = NaiveDate::parse_from_str(raw.trim(), RAW_DATE_FORMAT).ok()?;
        Some(self.resolve_century(date.year().rem_euclid(100)))
    }

    /// Apply the century rule to a two-digit year
    pub fn resolve_century(&self, two_digit_year: i32) -> i32 {
        let year = 2000 + two_digit_year;
        if year > self.century_cutoff {
            year - 100
        } else {
            year
        }
    }
}

/// SQL expression for the normalized birth year of the current row
pub fn birth_year_expr() -> String {
    format!("{}({})", BIRTH_YEAR_FUNCTION, columns::BIRTH_DATE)
}
