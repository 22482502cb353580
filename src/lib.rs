//! # csvbind - declarative mapping between CSV text and typed records
//!
//! csvbind converts CSV tables to and from collections of typed Rust values.
//! A type declares its columns once - name, optional parser, optional
//! serializer, optional default - and the engine handles the header row,
//! cell alignment, and per-field conversion in both directions.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐     ┌──────────────┐     ┌──────────────┐     ┌───────────────┐
//! │ CSV text  │────▶│   TextGrid   │────▶│  row/column  │────▶│ typed records │
//! │ (RFC4180) │     │ (string grid)│     │    codec     │     │    (serde)    │
//! └───────────┘     └──────────────┘     └──────────────┘     └───────────────┘
//! ```
//!
//! Two conversion styles share the same grid layer:
//!
//! - **rows**: one record instance per data row ([`RowRecord`], [`rows`])
//! - **columns**: one instance per table whose attributes are parallel
//!   arrays, one per column ([`ColumnTable`], [`columns`])
//!
//! ## Quick Start
//!
//! ```
//! use csvbind::{convert, Field, RowRecord};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, PartialEq, Serialize, Deserialize)]
//! struct Person {
//!     name: String,
//!     age: i64,
//!     height: f64,
//! }
//!
//! impl RowRecord for Person {
//!     fn columns() -> Vec<Field> {
//!         vec![
//!             Field::new("name"),
//!             Field::new("age").parse_with(convert::int),
//!             Field::new("height")
//!                 .parse_with(convert::float)
//!                 .serialize_with(convert::fixed(2)),
//!         ]
//!     }
//! }
//!
//! let text = "name,age,height\nJane,42,1.65\nJoe,36,1.75\n";
//! let people: Vec<Person> = csvbind::rows::from_str(text)?;
//! assert_eq!(people[0].age, 42);
//! assert_eq!(csvbind::rows::to_string(&people)?, text);
//! # Ok::<(), csvbind::Error>(())
//! ```
//!
//! Cells without a declared parser stay strings; no implicit type coercion
//! ever happens. Without a serializer, values fall back to their natural
//! string form.
//!
//! ## Modules
//!
//! - [`error`] - error taxonomy and the `Result` alias
//! - [`schema`] - field descriptors, schema derivation, record traits
//! - [`registry`] - per-type schema cache
//! - [`grid`] - the raw textual table and its CSV stream I/O
//! - [`rows`] - row-style load/dump
//! - [`columns`] - column-style load/dump

pub mod columns;
pub mod error;
pub mod grid;
pub mod registry;
pub mod rows;
pub mod schema;

// =============================================================================
// Re-exports - Errors
// =============================================================================

pub use error::{
    BoxError, Error, FormatError, MissingColumnError, Result, SchemaError, ShapeMismatchError,
};

// =============================================================================
// Re-exports - Schema
// =============================================================================

pub use schema::{convert, ColumnTable, Field, ParseFn, RowRecord, Schema, SchemaKind, SerializeFn};

// =============================================================================
// Re-exports - Registry & Grid
// =============================================================================

pub use grid::TextGrid;
pub use registry::SchemaRegistry;
