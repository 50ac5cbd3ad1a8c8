//! Output schema: ordered fields plus the input columns to skip.

use std::sync::Arc;

use foldhash::HashSet;

use crate::error::{ImportError, Result};
use crate::transform::Transform;

/// One output field.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Name in the output record.
    pub name: Arc<str>,
    /// Transform applied to the raw value, if any.
    pub transform: Option<Transform>,
}

impl Field {
    /// Create a new field.
    pub fn new(name: &str, transform: Option<Transform>) -> Self {
        Self {
            name: Arc::from(name),
            transform,
        }
    }
}

/// The shape of every record a reader produces.
///
/// A schema is immutable once built and can be shared between readers.
///
/// # Example
///
/// ```
/// use csv_salvage::{Schema, Transform};
///
/// let schema = Schema::builder()
///     .field("id", Transform::Int)
///     .field("fullname", Transform::String)
///     .field("email", Transform::String)
///     .skip(2)
///     .build()
///     .unwrap();
///
/// assert_eq!(schema.len(), 3);
/// assert_eq!(schema.required_columns(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct Schema {
    fields: Vec<Field>,
    skip: HashSet<usize>,
}

impl Schema {
    /// Start building a schema.
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// Fields in output order.
    #[inline]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Number of output fields.
    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Always false for a built schema.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns true if the input column at `index` is dropped.
    #[inline]
    pub fn is_skipped(&self, index: usize) -> bool {
        self.skip.contains(&index)
    }

    /// Skipped input column indexes, sorted.
    pub fn skipped(&self) -> Vec<usize> {
        let mut skip: Vec<usize> = self.skip.iter().copied().collect();
        skip.sort_unstable();
        skip
    }

    /// Number of columns a well-formed input row has.
    #[inline]
    pub fn required_columns(&self) -> usize {
        self.fields.len() + self.skip.len()
    }
}

/// Builder for [`Schema`].
#[derive(Debug, Clone, Default)]
pub struct SchemaBuilder {
    fields: Vec<Field>,
    skip: Vec<usize>,
}

impl SchemaBuilder {
    /// Add a field with a transform.
    pub fn field(mut self, name: &str, transform: Transform) -> Self {
        self.fields.push(Field::new(name, Some(transform)));
        self
    }

    /// Add a field whose raw value is only decoded.
    pub fn raw_field(mut self, name: &str) -> Self {
        self.fields.push(Field::new(name, None));
        self
    }

    /// Drop the input column at `index` (zero-based) before mapping.
    pub fn skip(mut self, index: usize) -> Self {
        self.skip.push(index);
        self
    }

    /// Validate and build the schema.
    pub fn build(self) -> Result<Schema> {
        if self.fields.is_empty() {
            return Err(ImportError::InvalidConfig(
                "schema must have at least one field".to_string(),
            ));
        }

        let mut names: HashSet<Arc<str>> = HashSet::default();
        for field in &self.fields {
            if !names.insert(field.name.clone()) {
                return Err(ImportError::InvalidConfig(format!(
                    "duplicate field name: {}",
                    field.name
                )));
            }
        }

        let skip: HashSet<usize> = self.skip.iter().copied().collect();
        let required = self.fields.len() + skip.len();
        if let Some(&bad) = skip.iter().find(|&&i| i >= required) {
            return Err(ImportError::InvalidConfig(format!(
                "skip index {bad} is outside the {required} input columns"
            )));
        }

        Ok(Schema {
            fields: self.fields,
            skip,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_columns() {
        let schema = Schema::builder()
            .field("id", Transform::Int)
            .raw_field("name")
            .skip(0)
            .skip(3)
            .build()
            .unwrap();

        assert_eq!(schema.len(), 2);
        assert_eq!(schema.required_columns(), 4);
        assert!(schema.is_skipped(0));
        assert!(!schema.is_skipped(1));
        assert_eq!(schema.skipped(), vec![0, 3]);
    }

    #[test]
    fn test_duplicate_skip_counts_once() {
        let schema = Schema::builder()
            .raw_field("a")
            .skip(1)
            .skip(1)
            .build()
            .unwrap();
        assert_eq!(schema.required_columns(), 2);
    }

    #[test]
    fn test_invalid_schemas() {
        assert!(matches!(
            Schema::builder().build(),
            Err(ImportError::InvalidConfig(_))
        ));
        assert!(matches!(
            Schema::builder().raw_field("a").raw_field("a").build(),
            Err(ImportError::InvalidConfig(_))
        ));
        assert!(matches!(
            Schema::builder().raw_field("a").skip(5).build(),
            Err(ImportError::InvalidConfig(_))
        ));
    }
}
