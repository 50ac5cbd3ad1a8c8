//! Per-field value transforms.
//!
//! Each standard transform trims ASCII whitespace before looking at the value.
//! Text results stay as raw bytes ([`Cell::Raw`]) so the reader can decode
//! them with its encoding resolver afterwards.

use std::fmt;
use std::num::ParseIntError;
use std::sync::Arc;

use thiserror::Error;

use crate::value::{Cell, Value};

/// Sentinel that replaces embedded newlines in joined multiline rows.
pub const NEWLINE_MARKER: &str = "--NEWLINE--";

/// Error returned by a transform that rejects its input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransformError {
    /// The value is not a valid integer.
    #[error("invalid integer {value:?}: {source}")]
    InvalidInt {
        /// The trimmed input.
        value: String,
        /// Underlying parse error.
        source: ParseIntError,
    },

    /// Failure reported by a custom transform.
    #[error("{0}")]
    Custom(String),
}

/// Signature of a custom transform.
pub type TransformFn = dyn Fn(&[u8]) -> Result<Cell, TransformError> + Send + Sync;

/// A transform applied to one field's raw value.
#[derive(Clone)]
pub enum Transform {
    /// [`to_string`]
    String,
    /// [`to_int`]
    Int,
    /// [`to_bool`]
    Bool,
    /// [`to_text`]
    Text,
    /// A named caller-supplied function.
    Custom {
        /// Name reported in warnings.
        name: Arc<str>,
        /// The function itself.
        func: Arc<TransformFn>,
    },
}

impl Transform {
    /// Wrap a closure as a named custom transform.
    pub fn custom<F>(name: &str, func: F) -> Self
    where
        F: Fn(&[u8]) -> Result<Cell, TransformError> + Send + Sync + 'static,
    {
        Transform::Custom {
            name: Arc::from(name),
            func: Arc::new(func),
        }
    }

    /// Parse a transform kind name as used on the command line.
    ///
    /// Returns `None` for unknown names. `raw` is accepted by callers to mean
    /// "no transform" and is not handled here.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "string" | "to_string" => Some(Transform::String),
            "int" | "to_int" => Some(Transform::Int),
            "bool" | "to_bool" => Some(Transform::Bool),
            "text" | "to_text" => Some(Transform::Text),
            _ => None,
        }
    }

    /// Name used in warnings.
    pub fn name(&self) -> &str {
        match self {
            Transform::String => "to_string",
            Transform::Int => "to_int",
            Transform::Bool => "to_bool",
            Transform::Text => "to_text",
            Transform::Custom { name, .. } => name.as_ref(),
        }
    }

    /// Apply the transform to a raw value.
    pub fn apply(&self, raw: &[u8]) -> Result<Cell, TransformError> {
        match self {
            Transform::String => Ok(to_string(raw)),
            Transform::Int => to_int(raw),
            Transform::Bool => Ok(to_bool(raw)),
            Transform::Text => Ok(to_text(raw)),
            Transform::Custom { func, .. } => func(raw),
        }
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transform::Custom { name, .. } => f.debug_tuple("Custom").field(name).finish(),
            other => f.write_str(other.name()),
        }
    }
}

impl PartialEq for Transform {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Transform::Custom { func: a, .. }, Transform::Custom { func: b, .. }) => {
                Arc::ptr_eq(a, b)
            }
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }
}

/// Trimmed text, with a lone `0` mapped to empty.
pub fn to_string(raw: &[u8]) -> Cell {
    let v = raw.trim_ascii();
    if v == b"0" {
        return Cell::Raw(Vec::new());
    }
    Cell::Raw(v.to_vec())
}

/// Integer, with empty mapped to null.
pub fn to_int(raw: &[u8]) -> Result<Cell, TransformError> {
    let v = raw.trim_ascii();
    if v.is_empty() {
        return Ok(Cell::NULL);
    }
    let text = String::from_utf8_lossy(v);
    text.parse::<i64>()
        .map(|i| Cell::Value(Value::Int(i)))
        .map_err(|source| TransformError::InvalidInt {
            value: text.into_owned(),
            source,
        })
}

/// False for empty, true for anything else.
pub fn to_bool(raw: &[u8]) -> Cell {
    Cell::Value(Value::Bool(!raw.trim_ascii().is_empty()))
}

/// Text with [`NEWLINE_MARKER`] turned back into real newlines.
pub fn to_text(raw: &[u8]) -> Cell {
    let v = raw.trim_ascii();
    if v.is_empty() {
        return Cell::Raw(Vec::new());
    }
    Cell::Raw(replace_marker(v))
}

fn replace_marker(v: &[u8]) -> Vec<u8> {
    let marker = NEWLINE_MARKER.as_bytes();
    let mut out = Vec::with_capacity(v.len());
    let mut i = 0;
    while i < v.len() {
        if v[i..].starts_with(marker) {
            out.push(b'\n');
            i += marker.len();
        } else {
            out.push(v[i]);
            i += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(cell: Cell) -> Vec<u8> {
        match cell {
            Cell::Raw(b) => b,
            Cell::Value(v) => panic!("expected raw bytes, got {v:?}"),
        }
    }

    #[test]
    fn test_to_string() {
        assert_eq!(raw(to_string(b"  Arthur Dent ")), b"Arthur Dent");
        assert_eq!(raw(to_string(b" 0 ")), b"");
        assert_eq!(raw(to_string(b"00")), b"00");
    }

    #[test]
    fn test_to_int() {
        assert_eq!(to_int(b" 42 ").unwrap(), Cell::Value(Value::Int(42)));
        assert_eq!(to_int(b"-7").unwrap(), Cell::Value(Value::Int(-7)));
        assert_eq!(to_int(b"   ").unwrap(), Cell::NULL);
        assert!(matches!(
            to_int(b"forty-two"),
            Err(TransformError::InvalidInt { .. })
        ));
        assert!(to_int(b"99999999999999999999").is_err());
    }

    #[test]
    fn test_to_bool() {
        assert_eq!(to_bool(b""), Cell::Value(Value::Bool(false)));
        assert_eq!(to_bool(b"  "), Cell::Value(Value::Bool(false)));
        assert_eq!(to_bool(b"no"), Cell::Value(Value::Bool(true)));
    }

    #[test]
    fn test_to_text() {
        assert_eq!(raw(to_text(b"first--NEWLINE--second")), b"first\nsecond");
        assert_eq!(raw(to_text(b"a--NEWLINE----NEWLINE--b")), b"a\n\nb");
        assert_eq!(raw(to_text(b"  ")), b"");
        assert_eq!(raw(to_text(b"--NEWLINE")), b"--NEWLINE");
    }

    #[test]
    fn test_custom_transform() {
        let upper = Transform::custom("upper", |v| Ok(Cell::Raw(v.to_ascii_uppercase())));
        assert_eq!(upper.name(), "upper");
        assert_eq!(raw(upper.apply(b"abc").unwrap()), b"ABC");
        assert_eq!(upper, upper.clone());
    }

    #[test]
    fn test_from_name() {
        assert_eq!(Transform::from_name("int"), Some(Transform::Int));
        assert_eq!(Transform::from_name("TO_TEXT"), Some(Transform::Text));
        assert_eq!(Transform::from_name("float"), None);
    }
}
