//! Warnings recorded for ignored rows and fields.

use std::fmt;

/// What went wrong with a row or a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WarningKind {
    /// The tokenizer could not split the input into columns.
    Tokenize {
        /// Error reported by the tokenizer.
        message: String,
    },
    /// The row had the wrong number of columns.
    ColumnCount {
        /// Columns found in the row.
        got: usize,
        /// Columns required by the schema plus the skipped columns.
        expected: usize,
    },
    /// A field transform rejected its value. The field was set to null.
    Field {
        /// Schema field name.
        field: String,
        /// Raw cell value, lossily decoded for display.
        value: String,
        /// Name of the transform that failed.
        transform: String,
        /// Error reported by the transform.
        message: String,
    },
}

/// A single ignored row or field, with its position in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    /// Line counter when the problem was seen.
    pub line: usize,
    /// Row counter (ignored + success) when the problem was seen.
    pub row: usize,
    /// Details.
    pub kind: WarningKind,
}

impl Warning {
    /// Create a new warning.
    pub const fn new(line: usize, row: usize, kind: WarningKind) -> Self {
        Self { line, row, kind }
    }

    /// Returns true if the whole row was skipped, false for a single field.
    pub fn is_row(&self) -> bool {
        !matches!(self.kind, WarningKind::Field { .. })
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            WarningKind::Tokenize { message } => write!(
                f,
                "line {} (row {}) ignored because of error: {}",
                self.line, self.row, message
            ),
            WarningKind::ColumnCount { got, expected } => write!(
                f,
                "line {} (row {}) ignored because of error: wrong column count: got {}, expected {}",
                self.line, self.row, got, expected
            ),
            WarningKind::Field {
                field,
                value,
                transform,
                message,
            } => write!(
                f,
                "{} (field=\"{}\", value=\"{}\", line {}, transform {})",
                message, field, value, self.line, transform
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_count_message() {
        let warning = Warning::new(4, 3, WarningKind::ColumnCount { got: 3, expected: 4 });
        assert_eq!(
            warning.to_string(),
            "line 4 (row 3) ignored because of error: wrong column count: got 3, expected 4"
        );
        assert!(warning.is_row());
    }

    #[test]
    fn test_field_message() {
        let warning = Warning::new(
            7,
            7,
            WarningKind::Field {
                field: "id".to_string(),
                value: "abc".to_string(),
                transform: "to_int".to_string(),
                message: "invalid digit found in string".to_string(),
            },
        );
        let msg = warning.to_string();
        assert!(msg.contains("field=\"id\""));
        assert!(msg.contains("value=\"abc\""));
        assert!(msg.contains("line 7"));
        assert!(msg.contains("to_int"));
        assert!(!warning.is_row());
    }
}
