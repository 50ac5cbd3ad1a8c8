use std::fmt;
use std::sync::Arc;

/// A single field value in an output [`Record`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Value {
    /// Missing value (null token, empty integer, or failed transform).
    #[default]
    Null,
    /// Boolean value.
    Bool(bool),
    /// Signed integer value.
    Int(i64),
    /// Decoded text value.
    Text(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Text(s) => write!(f, "{s:?}"),
        }
    }
}

impl Value {
    /// Returns true if this is [`Value::Null`].
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the integer, if this is [`Value::Int`].
    #[inline]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the boolean, if this is [`Value::Bool`].
    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the text, if this is [`Value::Text`].
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Output of a transform: either still-undecoded text or a final value.
///
/// Undecoded bytes are run through the reader's encoding resolver before
/// they end up in a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    /// Text bytes in the input's (unknown) encoding.
    Raw(Vec<u8>),
    /// A value that needs no decoding.
    Value(Value),
}

impl Cell {
    /// Shorthand for `Cell::Value(Value::Null)`.
    pub const NULL: Cell = Cell::Value(Value::Null);
}

impl From<Value> for Cell {
    fn from(v: Value) -> Self {
        Cell::Value(v)
    }
}

/// One imported row: field names mapped to values, in schema order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    entries: Vec<(Arc<str>, Value)>,
}

impl Record {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, name: Arc<str>, value: Value) {
        self.entries.push((name, value));
    }

    /// Look up a value by field name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(n, _)| n.as_ref() == name)
            .map(|(_, v)| v)
    }

    /// Number of fields.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the record has no fields.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Field names in schema order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_ref())
    }

    /// `(name, value)` pairs in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(n, v)| (n.as_ref(), v))
    }

    /// Consume the record, returning owned `(name, value)` pairs.
    pub fn into_pairs(self) -> Vec<(String, Value)> {
        self.entries
            .into_iter()
            .map(|(n, v)| (n.to_string(), v))
            .collect()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, value)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name:?}: {value}")?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Record {
        let mut record = Record::with_capacity(3);
        record.push(Arc::from("id"), Value::Int(1));
        record.push(Arc::from("name"), Value::from("Arthur Dent"));
        record.push(Arc::from("active"), Value::Null);
        record
    }

    #[test]
    fn test_record_lookup_and_order() {
        let record = sample();
        assert_eq!(record.len(), 3);
        assert_eq!(record.get("id"), Some(&Value::Int(1)));
        assert_eq!(record.get("missing"), None);
        assert_eq!(record.names().collect::<Vec<_>>(), vec!["id", "name", "active"]);
    }

    #[test]
    fn test_record_display() {
        assert_eq!(
            sample().to_string(),
            r#"{"id": 1, "name": "Arthur Dent", "active": null}"#
        );
    }

    #[test]
    fn test_value_from_option() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some(3i64)), Value::Int(3));
    }
}
