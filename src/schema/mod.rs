//! Schema declaration: field descriptors, derivation, and the record traits.
//!
//! A schema is an ordered list of [`Field`] descriptors. Types declare their
//! schema by implementing [`RowRecord`] (one instance per data row) or
//! [`ColumnTable`] (one instance per table, attributes as parallel arrays)
//! and returning their column list from `columns()`. Declaration order *is*
//! column order: it decides the header row and how data cells line up.
//!
//! Cell values travel as [`serde_json::Value`], so a field parser turns the
//! raw cell text into any JSON value and serde maps the assembled value map
//! onto the user's struct. Without a parser the cell stays a string; no
//! implicit type coercion ever happens.

pub mod convert;

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{BoxError, MissingColumnError, SchemaError};

/// Parser stored in a field descriptor: raw cell text to a typed value.
pub type ParseFn = Arc<dyn Fn(&str) -> Result<Value, BoxError> + Send + Sync>;

/// Serializer stored in a field descriptor: typed value back to cell text.
pub type SerializeFn = Arc<dyn Fn(&Value) -> Result<String, BoxError> + Send + Sync>;

// =============================================================================
// Field Descriptor
// =============================================================================

/// Metadata for one column: name, optional parser, optional serializer,
/// optional default value.
///
/// # Example
///
/// ```
/// use csvbind::{convert, Field};
///
/// let fields = vec![
///     Field::new("name"),
///     Field::new("age").parse_with(convert::int),
///     Field::new("height")
///         .parse_with(convert::float)
///         .serialize_with(convert::fixed(2)),
/// ];
/// assert_eq!(fields[1].name(), "age");
/// ```
#[derive(Clone)]
pub struct Field {
    name: String,
    parser: Option<ParseFn>,
    serializer: Option<SerializeFn>,
    default: Option<Value>,
}

impl Field {
    /// Create a descriptor with identity parsing and natural serialization.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parser: None,
            serializer: None,
            default: None,
        }
    }

    /// Set the parser applied to this column's raw cells on decode.
    pub fn parse_with<F>(mut self, parser: F) -> Self
    where
        F: Fn(&str) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        self.parser = Some(Arc::new(parser));
        self
    }

    /// Set the serializer applied to this column's values on encode.
    pub fn serialize_with<F>(mut self, serializer: F) -> Self
    where
        F: Fn(&Value) -> Result<String, BoxError> + Send + Sync + 'static,
    {
        self.serializer = Some(Arc::new(serializer));
        self
    }

    /// Set the default value used on encode when a record carries no value
    /// for this field. Column-style schemas require sequence defaults.
    pub fn default_value(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// The column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Run the parser, or keep the raw cell as a string when none is set.
    pub(crate) fn parse(&self, raw: &str) -> Result<Value, BoxError> {
        match &self.parser {
            Some(parser) => parser(raw),
            None => Ok(Value::String(raw.to_string())),
        }
    }

    /// Run the serializer, or fall back to the value's natural string form:
    /// strings as-is, null as empty, anything else as its JSON text.
    pub(crate) fn serialize(&self, value: &Value) -> Result<String, BoxError> {
        match &self.serializer {
            Some(serializer) => serializer(value),
            None => Ok(natural_string(value)),
        }
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("parser", &self.parser.is_some())
            .field("serializer", &self.serializer.is_some())
            .field("default", &self.default)
            .finish()
    }
}

fn natural_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

// =============================================================================
// Schema
// =============================================================================

/// Which conversion style a schema drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    /// One record instance per table row.
    Rows,
    /// One instance total, each attribute a parallel array.
    Columns,
}

/// A validated, immutable, ordered field list.
///
/// Derived from a type's `columns()` declaration and memoized by the
/// [`SchemaRegistry`](crate::SchemaRegistry); never constructed per call.
#[derive(Debug, Clone)]
pub struct Schema {
    kind: SchemaKind,
    fields: Vec<Field>,
}

impl Schema {
    /// Validate a declaration and freeze it into a schema.
    ///
    /// Fails with [`SchemaError`] if the declaration is empty, two fields
    /// share a name, or a column-style field declares a non-sequence
    /// default.
    pub fn derive(kind: SchemaKind, fields: Vec<Field>) -> Result<Self, SchemaError> {
        if fields.is_empty() {
            return Err(SchemaError::Empty);
        }

        let mut seen = HashSet::new();
        for field in &fields {
            if !seen.insert(field.name.as_str()) {
                return Err(SchemaError::DuplicateField(field.name.clone()));
            }
        }

        if kind == SchemaKind::Columns {
            for field in &fields {
                if let Some(default) = &field.default {
                    if !default.is_array() {
                        return Err(SchemaError::NonSequenceDefault(field.name.clone()));
                    }
                }
            }
        }

        Ok(Self { kind, fields })
    }

    pub fn kind(&self) -> SchemaKind {
        self.kind
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field names in declaration order; this is the header row on encode.
    pub fn header(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }

    /// Map each schema field to its column index in an observed header.
    ///
    /// Header columns that no field claims are ignored. Fails with
    /// [`MissingColumnError`] on the first schema field absent from the
    /// header.
    pub fn header_positions(&self, header: &[String]) -> Result<Vec<usize>, MissingColumnError> {
        self.fields
            .iter()
            .map(|field| {
                header
                    .iter()
                    .position(|cell| cell == &field.name)
                    .ok_or_else(|| MissingColumnError { column: field.name.clone() })
            })
            .collect()
    }
}

// =============================================================================
// Record Traits
// =============================================================================

/// A row-style record: one instance per CSV data row.
///
/// # Example
///
/// ```
/// use csvbind::{convert, Field, RowRecord};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, PartialEq, Serialize, Deserialize)]
/// struct Reading {
///     filename: String,
///     temp: i64,
/// }
///
/// impl RowRecord for Reading {
///     fn columns() -> Vec<Field> {
///         vec![
///             Field::new("filename"),
///             Field::new("temp").parse_with(convert::int),
///         ]
///     }
/// }
///
/// let rows: Vec<Reading> = csvbind::rows::from_str("filename,temp\na.csv,42\n").unwrap();
/// assert_eq!(rows[0].temp, 42);
/// ```
pub trait RowRecord: Serialize + DeserializeOwned + 'static {
    /// Column declaration, in order. Derived once per type and memoized.
    fn columns() -> Vec<Field>;
}

/// A column-style table: one instance whose attributes are parallel arrays,
/// one per CSV column. Every attribute must be a sequence, and all sequences
/// must share one length equal to the data-row count.
pub trait ColumnTable: Serialize + DeserializeOwned + 'static {
    /// Column declaration, in order. Derived once per type and memoized.
    fn columns() -> Vec<Field>;
}
