//! csv-salvage: turn messy delimited text into schema-shaped records
//!
//! Built for bulk imports where the input cannot be trusted: rows with the
//! wrong number of columns, values in mixed character encodings, records
//! broken over several lines, and header rows that may or may not be there.
//! Bad rows and fields are skipped and reported instead of aborting the
//! whole import.
//!
//! # Quick Start
//!
//! ```
//! use csv_salvage::{ReaderBuilder, Schema, Transform, Value};
//!
//! // Three output fields; input column 2 is dropped.
//! let schema = Schema::builder()
//!     .field("id", Transform::Int)
//!     .field("fullname", Transform::String)
//!     .field("email", Transform::String)
//!     .skip(2)
//!     .build()
//!     .unwrap();
//!
//! let data = "\
//! 1,Maurits van Rees,ignored,maurits@example.org
//! 2,Arthur Dent
//! ";
//!
//! let mut reader = ReaderBuilder::new(schema).from_reader(data.as_bytes()).unwrap();
//! let records: Vec<_> = reader.by_ref().collect::<Result<_, _>>().unwrap();
//!
//! assert_eq!(records.len(), 1);
//! assert_eq!(records[0].get("id"), Some(&Value::Int(1)));
//! assert_eq!(reader.success(), 1);
//! assert_eq!(reader.ignored(), 1);
//! assert_eq!(reader.warnings().len(), 1);
//! ```
//!
//! # How rows are read
//!
//! 1. Optionally, continued lines are joined into one logical line
//!    ([`multiline`]).
//! 2. The `csv` crate splits the input into rows ([`RowSource`]).
//! 3. Rows with the wrong column count, and rows the tokenizer rejects, are
//!    skipped and counted, up to `max_tries` attempts per record.
//! 4. The first row is dropped if it looks like a header ([`is_header`]).
//! 5. Each column is mapped onto its schema field: skipped columns are
//!    dropped, the null token becomes [`Value::Null`], transforms run with
//!    per-field error isolation, and text is decoded with a sticky
//!    best-guess encoding ([`EncodingResolver`]).
//!
//! Nothing here installs a `tracing` subscriber; warnings are emitted at
//! `warn` level and collected on the reader.

mod config;
mod dialect;
mod encoding;
mod error;
mod header;
pub mod multiline;
mod reader;
mod schema;
mod source;
mod transform;
mod value;
mod warning;

pub use error::{ImportError, Result};
pub use reader::{ImportSummary, Phase, Reader, ReaderBuilder};
pub use schema::{Field, Schema, SchemaBuilder};
pub use value::{Cell, Record, Value};
pub use warning::{Warning, WarningKind};

pub use config::{DEFAULT_MAX_TRIES, DEFAULT_NULL_TOKEN, ReaderConfig};
pub use dialect::{Dialect, Quote};
pub use header::{HeaderMode, is_header};
pub use source::{CsvSource, Input, RowSource, SourceError};
pub use transform::{
    NEWLINE_MARKER, Transform, TransformError, TransformFn, to_bool, to_int, to_string, to_text,
};

// Re-export for advanced usage
pub use encoding::{
    DEFAULT_FALLBACKS, EncodingResolver, encoding_for_label, guess_encoding, is_utf8,
};
pub use encoding_rs::Encoding;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_api() {
        // Verify all public types are accessible
        let _dialect = Dialect::excel_tab();
        let _quote = Quote::Some(b'"');
        let _mode = HeaderMode::Detect;
        let _value = Value::Null;
        let _resolver = EncodingResolver::default();
        let _transform = Transform::Text;
    }

    #[test]
    fn test_example_importer() {
        let schema = Schema::builder()
            .field("id", Transform::Int)
            .field("fullname", Transform::String)
            .field("email", Transform::String)
            .skip(2)
            .build()
            .unwrap();
        let data = "1,Maurits van Rees,ignored,maurits@example.org\n\
                    2,Arthur Dent,ignored again,dentarthurdent@example.org\n";

        let records: Vec<Record> = ReaderBuilder::new(schema)
            .from_reader(data.as_bytes())
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(
            records[1].to_string(),
            r#"{"id": 2, "fullname": "Arthur Dent", "email": "dentarthurdent@example.org"}"#
        );
    }
}
