use std::fmt;

use crate::error::{ImportError, Result};

/// Tokenizer settings handed to the `csv` crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialect {
    /// Field delimiter character.
    pub delimiter: u8,
    /// Quote character configuration.
    pub quote: Quote,
    /// Escape character inside quoted fields, if any.
    pub escape: Option<u8>,
    /// Whether two quote characters in a row mean one literal quote.
    pub double_quote: bool,
    /// Lines starting with this byte are ignored.
    pub comment: Option<u8>,
}

impl Default for Dialect {
    fn default() -> Self {
        Self::excel()
    }
}

impl Dialect {
    /// Comma separated, double quotes, doubled quotes as escapes.
    pub const fn excel() -> Self {
        Self {
            delimiter: b',',
            quote: Quote::Some(b'"'),
            escape: None,
            double_quote: true,
            comment: None,
        }
    }

    /// Like [`Dialect::excel`] but tab separated.
    pub const fn excel_tab() -> Self {
        Self {
            delimiter: b'\t',
            ..Self::excel()
        }
    }

    /// Comma separated with backslash escapes, as written by Unix tools.
    pub const fn unix() -> Self {
        Self {
            delimiter: b',',
            quote: Quote::Some(b'"'),
            escape: Some(b'\\'),
            double_quote: false,
            comment: None,
        }
    }

    /// Look up a named dialect: `excel`, `excel-tab` or `unix`.
    pub fn from_name(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "excel" => Ok(Self::excel()),
            "excel-tab" | "excel_tab" | "tab" => Ok(Self::excel_tab()),
            "unix" => Ok(Self::unix()),
            other => Err(ImportError::InvalidConfig(format!(
                "unknown dialect: {other}"
            ))),
        }
    }

    /// Set the delimiter.
    pub const fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub(crate) fn to_builder(&self) -> csv::ReaderBuilder {
        let mut builder = csv::ReaderBuilder::new();
        builder
            .delimiter(self.delimiter)
            .has_headers(false)
            .flexible(true)
            .double_quote(self.double_quote)
            .escape(self.escape)
            .comment(self.comment)
            .quoting(self.quote.char().is_some());

        if let Some(q) = self.quote.char() {
            builder.quote(q);
        }

        builder
    }
}

/// Quote character configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quote {
    /// No quoting.
    None,
    /// Quote with the specified character.
    Some(u8),
}

impl Default for Quote {
    fn default() -> Self {
        Quote::Some(b'"')
    }
}

impl Quote {
    /// Returns the quote character if set.
    pub fn char(&self) -> Option<u8> {
        match self {
            Quote::None => None,
            Quote::Some(c) => Some(*c),
        }
    }
}

impl fmt::Display for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quote::None => write!(f, "none"),
            Quote::Some(c) => write!(f, "{}", *c as char),
        }
    }
}
