//! Sex labels used by the API and the codes stored in the table

use serde::{Deserialize, Serialize};

/// Labels offered to clients, in display order
pub const SEX_LABELS: [&str; 3] = ["Hombre", "Mujer", "Otros"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    Male,
    Female,
    Other,
}

impl Sex {
    /// Map a client label. Anything but `Hombre` or `Mujer` is `Other`.
    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        if label.eq_ignore_ascii_case("hombre") {
            Sex::Male
        } else if label.eq_ignore_ascii_case("mujer") {
            Sex::Female
        } else {
            Sex::Other
        }
    }

    /// Map a stored code
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "1" => Sex::Male,
            "2" => Sex::Female,
            _ => Sex::Other,
        }
    }

    /// Code stored in the `SEXO` column
    pub fn code(&self) -> &'static str {
        match self {
            Sex::Male => "1",
            Sex::Female => "2",
            Sex::Other => "3",
        }
    }

    /// SQL expression folding a stored code to `'1'`, `'2'` or `'3'` the
    /// way [`Sex::from_code`] does, so grouping sees one value per sex
    pub fn code_sql(column: &str) -> String {
        format!(
            "CASE TRIM({col}) WHEN '{m}' THEN '{m}' WHEN '{f}' THEN '{f}' ELSE '{o}' END",
            col = column,
            m = Sex::Male.code(),
            f = Sex::Female.code(),
            o = Sex::Other.code()
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            Sex::Male => SEX_LABELS[0],
            Sex::Female => SEX_LABELS[1],
            Sex::Other => SEX_LABELS[2],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_mapping() {
        assert_eq!(Sex::from_label("Hombre").code(), "1");
        assert_eq!(Sex::from_label("mujer").code(), "2");
        assert_eq!(Sex::from_label("Otros").code(), "3");
        assert_eq!(Sex::from_label("anything").code(), "3");
    }

    #[test]
    fn test_code_mapping() {
        assert_eq!(Sex::from_code("1").label(), "Hombre");
        assert_eq!(Sex::from_code("2").label(), "Mujer");
        assert_eq!(Sex::from_code("9").label(), "Otros");
        assert_eq!(Sex::from_code("").label(), "Otros");
    }

    #[test]
    fn test_code_sql_trims() {
        assert_eq!(
            Sex::code_sql("SEXO"),
            "CASE TRIM(SEXO) WHEN '1' THEN '1' WHEN '2' THEN '2' ELSE '3' END"
        );
    }
}
