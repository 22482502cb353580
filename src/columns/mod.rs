//! Column-style conversion: one instance per table, attributes as parallel
//! arrays.
//!
//! The same entry-point shape as [`rows`](crate::rows), but loading yields a
//! single value whose attributes each hold one column, and dumping consumes
//! one such value. Both directions enforce the shape invariant: every
//! attribute is a sequence and all sequences share the data-row count.

use std::io;

use serde_json::{Map, Value};

use crate::error::{Error, FormatError, Result, ShapeMismatchError};
use crate::grid::{self, TextGrid};
use crate::registry::{self, SchemaRegistry};
use crate::schema::{ColumnTable, Schema};

/// Load a column table from a readable CSV stream.
pub fn from_reader<T: ColumnTable, R: io::Read>(reader: R) -> Result<T> {
    from_reader_with(registry::global(), reader)
}

/// Load a column table from a readable CSV stream using the given registry.
pub fn from_reader_with<T: ColumnTable, R: io::Read>(
    registry: &SchemaRegistry,
    reader: R,
) -> Result<T> {
    let schema = registry.columns::<T>()?;
    let grid = grid::read(reader)?;
    decode_grid(&schema, &grid)
}

/// Load a column table from CSV text.
pub fn from_str<T: ColumnTable>(text: &str) -> Result<T> {
    from_reader(text.as_bytes())
}

/// Load a column table from CSV text using the given registry.
pub fn from_str_with<T: ColumnTable>(registry: &SchemaRegistry, text: &str) -> Result<T> {
    from_reader_with(registry, text.as_bytes())
}

/// Write a column table to a CSV stream, row *i* holding element *i* of
/// every column.
pub fn to_writer<T: ColumnTable, W: io::Write>(writer: W, table: &T) -> Result<()> {
    to_writer_with(registry::global(), writer, table)
}

/// Write a column table to a CSV stream using the given registry.
pub fn to_writer_with<T: ColumnTable, W: io::Write>(
    registry: &SchemaRegistry,
    writer: W,
    table: &T,
) -> Result<()> {
    let schema = registry.columns::<T>()?;
    let grid = encode_grid(&schema, table)?;
    grid::write(writer, &grid)
}

/// Render a column table as CSV text.
pub fn to_string<T: ColumnTable>(table: &T) -> Result<String> {
    to_string_with(registry::global(), table)
}

/// Render a column table as CSV text using the given registry.
pub fn to_string_with<T: ColumnTable>(registry: &SchemaRegistry, table: &T) -> Result<String> {
    let mut buf = Vec::new();
    to_writer_with(registry, &mut buf, table)?;
    String::from_utf8(buf).map_err(|e| Error::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
}

fn decode_grid<T: ColumnTable>(schema: &Schema, grid: &TextGrid) -> Result<T> {
    let positions = schema.header_positions(&grid.header)?;

    let mut columns: Vec<Vec<Value>> = schema
        .fields()
        .iter()
        .map(|_| Vec::with_capacity(grid.row_count()))
        .collect();

    for (row_idx, cells) in grid.rows.iter().enumerate() {
        for ((field, &pos), column) in schema.fields().iter().zip(&positions).zip(&mut columns) {
            let raw = cells.get(pos).ok_or_else(|| FormatError {
                line: row_idx + 2,
                message: format!("row has no cell for column '{}'", field.name()),
            })?;
            let value = field.parse(raw).map_err(|source| Error::Field {
                field: field.name().to_string(),
                source,
            })?;
            column.push(value);
        }
    }

    let expected = grid.row_count();
    for (field, column) in schema.fields().iter().zip(&columns) {
        if column.len() != expected {
            return Err(ShapeMismatchError::UnequalLength {
                column: field.name().to_string(),
                expected,
                actual: column.len(),
            }
            .into());
        }
    }

    let mut object = Map::new();
    for (field, column) in schema.fields().iter().zip(columns) {
        object.insert(field.name().to_string(), Value::Array(column));
    }
    Ok(serde_json::from_value(Value::Object(object))?)
}

fn encode_grid<T: ColumnTable>(schema: &Schema, table: &T) -> Result<TextGrid> {
    let value = serde_json::to_value(table)?;
    let object = value
        .as_object()
        .ok_or(Error::InvalidRecord(std::any::type_name::<T>()))?;

    let mut columns: Vec<&Vec<Value>> = Vec::with_capacity(schema.len());
    for field in schema.fields() {
        let attr = object
            .get(field.name())
            .or_else(|| field.default())
            .ok_or_else(|| Error::MissingValue(field.name().to_string()))?;
        let column = attr
            .as_array()
            .ok_or_else(|| ShapeMismatchError::NotASequence(field.name().to_string()))?;
        columns.push(column);
    }

    let expected = columns.first().map_or(0, |column| column.len());
    for (field, column) in schema.fields().iter().zip(&columns).skip(1) {
        if column.len() != expected {
            return Err(ShapeMismatchError::UnequalLength {
                column: field.name().to_string(),
                expected,
                actual: column.len(),
            }
            .into());
        }
    }

    let mut rows = Vec::with_capacity(expected);
    for i in 0..expected {
        let mut cells = Vec::with_capacity(schema.len());
        for (field, column) in schema.fields().iter().zip(&columns) {
            let cell = field.serialize(&column[i]).map_err(|source| Error::Field {
                field: field.name().to_string(),
                source,
            })?;
            cells.push(cell);
        }
        rows.push(cells);
    }

    Ok(TextGrid { header: schema.header(), rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{convert, Field};
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Series {
        x: Vec<i64>,
        y: Vec<i64>,
    }

    impl ColumnTable for Series {
        fn columns() -> Vec<Field> {
            vec![
                Field::new("x").parse_with(convert::int),
                Field::new("y").parse_with(convert::int),
            ]
        }
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Scalar {
        x: i64,
    }

    impl ColumnTable for Scalar {
        fn columns() -> Vec<Field> {
            vec![Field::new("x").parse_with(convert::int)]
        }
    }

    fn series() -> Series {
        Series { x: vec![1, 2, 3], y: vec![4, 5, 6] }
    }

    #[test]
    fn test_encode_produces_one_row_per_element() {
        let text = to_string(&series()).unwrap();
        assert_eq!(text, "x,y\n1,4\n2,5\n3,6\n");
    }

    #[test]
    fn test_decode_collects_columns() {
        let table: Series = from_str("x,y\n1,4\n2,5\n3,6\n").unwrap();
        assert_eq!(table, series());
    }

    #[test]
    fn test_column_round_trip() {
        let table: Series = from_str(&to_string(&series()).unwrap()).unwrap();
        assert_eq!(table, series());
    }

    #[test]
    fn test_unequal_columns_fail_encode() {
        let table = Series { x: vec![1, 2, 3], y: vec![4, 5] };
        let err = to_string(&table).unwrap_err();
        match err {
            Error::Shape(ShapeMismatchError::UnequalLength { column, expected, actual }) => {
                assert_eq!(column, "y");
                assert_eq!(expected, 3);
                assert_eq!(actual, 2);
            }
            other => panic!("expected Shape error, got {other:?}"),
        }
    }

    #[test]
    fn test_scalar_attribute_fails_encode() {
        let err = to_string(&Scalar { x: 7 }).unwrap_err();
        assert!(matches!(
            err,
            Error::Shape(ShapeMismatchError::NotASequence(field)) if field == "x"
        ));
    }

    #[test]
    fn test_header_only_table_decodes_to_empty_columns() {
        let table: Series = from_str("x,y\n").unwrap();
        assert_eq!(table, Series { x: vec![], y: vec![] });
    }

    #[test]
    fn test_empty_columns_encode_header_only() {
        let text = to_string(&Series { x: vec![], y: vec![] }).unwrap();
        assert_eq!(text, "x,y\n");
    }

    #[test]
    fn test_missing_column_fails_decode() {
        let err = from_str::<Series>("x\n1\n").unwrap_err();
        assert!(matches!(err, Error::MissingColumn(m) if m.column == "y"));
    }

    #[test]
    fn test_header_order_is_free() {
        let table: Series = from_str("y,x\n4,1\n5,2\n").unwrap();
        assert_eq!(table, Series { x: vec![1, 2], y: vec![4, 5] });
    }

    #[test]
    fn test_parser_error_names_field() {
        let err = from_str::<Series>("x,y\n1,oops\n").unwrap_err();
        assert!(matches!(err, Error::Field { field, .. } if field == "y"));
    }

    #[test]
    fn test_registry_injection() {
        let registry = SchemaRegistry::new();
        let table: Series = from_str_with(&registry, "x,y\n1,4\n").unwrap();
        assert_eq!(table.x, vec![1]);
        assert_eq!(registry.len(), 1);
    }
}
