//! Row-style conversion: one typed record per CSV data row.
//!
//! Entry points mirror `serde_json`: [`from_reader`]/[`from_str`] to load,
//! [`to_writer`]/[`to_string`] to dump. The `_with` variants take an
//! explicit [`SchemaRegistry`] instead of the process-wide one.
//!
//! Decoding matches header cells to schema fields by name, so the columns
//! may appear in any order; header columns no field claims are ignored.
//! Records come back in table order, exactly one per data row.

use std::io;

use serde_json::{Map, Value};

use crate::error::{Error, FormatError, Result};
use crate::grid::{self, TextGrid};
use crate::registry::{self, SchemaRegistry};
use crate::schema::{RowRecord, Schema};

/// Load records from a readable CSV stream.
pub fn from_reader<T: RowRecord, R: io::Read>(reader: R) -> Result<Vec<T>> {
    from_reader_with(registry::global(), reader)
}

/// Load records from a readable CSV stream using the given registry.
pub fn from_reader_with<T: RowRecord, R: io::Read>(
    registry: &SchemaRegistry,
    reader: R,
) -> Result<Vec<T>> {
    let schema = registry.rows::<T>()?;
    let grid = grid::read(reader)?;
    decode_grid(&schema, &grid)
}

/// Load records from CSV text.
pub fn from_str<T: RowRecord>(text: &str) -> Result<Vec<T>> {
    from_reader(text.as_bytes())
}

/// Load records from CSV text using the given registry.
pub fn from_str_with<T: RowRecord>(registry: &SchemaRegistry, text: &str) -> Result<Vec<T>> {
    from_reader_with(registry, text.as_bytes())
}

/// Write records to a CSV stream, header first, one row per record.
pub fn to_writer<T: RowRecord, W: io::Write>(writer: W, records: &[T]) -> Result<()> {
    to_writer_with(registry::global(), writer, records)
}

/// Write records to a CSV stream using the given registry.
pub fn to_writer_with<T: RowRecord, W: io::Write>(
    registry: &SchemaRegistry,
    writer: W,
    records: &[T],
) -> Result<()> {
    let schema = registry.rows::<T>()?;
    let grid = encode_grid(&schema, records)?;
    grid::write(writer, &grid)
}

/// Render records as CSV text.
pub fn to_string<T: RowRecord>(records: &[T]) -> Result<String> {
    to_string_with(registry::global(), records)
}

/// Render records as CSV text using the given registry.
pub fn to_string_with<T: RowRecord>(registry: &SchemaRegistry, records: &[T]) -> Result<String> {
    let mut buf = Vec::new();
    to_writer_with(registry, &mut buf, records)?;
    String::from_utf8(buf).map_err(|e| Error::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
}

fn decode_grid<T: RowRecord>(schema: &Schema, grid: &TextGrid) -> Result<Vec<T>> {
    let positions = schema.header_positions(&grid.header)?;

    grid.rows
        .iter()
        .enumerate()
        .map(|(row_idx, cells)| decode_row(schema, &positions, cells, row_idx))
        .collect()
}

fn decode_row<T: RowRecord>(
    schema: &Schema,
    positions: &[usize],
    cells: &[String],
    row_idx: usize,
) -> Result<T> {
    let mut object = Map::new();
    for (field, &pos) in schema.fields().iter().zip(positions) {
        let raw = cells.get(pos).ok_or_else(|| FormatError {
            line: row_idx + 2,
            message: format!("row has no cell for column '{}'", field.name()),
        })?;
        let value = field.parse(raw).map_err(|source| Error::Field {
            field: field.name().to_string(),
            source,
        })?;
        object.insert(field.name().to_string(), value);
    }
    Ok(serde_json::from_value(Value::Object(object))?)
}

fn encode_grid<T: RowRecord>(schema: &Schema, records: &[T]) -> Result<TextGrid> {
    let rows = records
        .iter()
        .map(|record| encode_row(schema, record))
        .collect::<Result<Vec<_>>>()?;

    Ok(TextGrid { header: schema.header(), rows })
}

fn encode_row<T: RowRecord>(schema: &Schema, record: &T) -> Result<Vec<String>> {
    let value = serde_json::to_value(record)?;
    let object = value
        .as_object()
        .ok_or(Error::InvalidRecord(std::any::type_name::<T>()))?;

    let mut cells = Vec::with_capacity(schema.len());
    for field in schema.fields() {
        let value = object
            .get(field.name())
            .or_else(|| field.default())
            .ok_or_else(|| Error::MissingValue(field.name().to_string()))?;
        let cell = field.serialize(value).map_err(|source| Error::Field {
            field: field.name().to_string(),
            source,
        })?;
        cells.push(cell);
    }
    Ok(cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{convert, Field};
    use serde::{Deserialize, Serialize};
    use std::io::{Seek, SeekFrom};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Person {
        name: String,
        age: i64,
        height: f64,
    }

    impl RowRecord for Person {
        fn columns() -> Vec<Field> {
            vec![
                Field::new("name"),
                Field::new("age").parse_with(convert::int),
                Field::new("height")
                    .parse_with(convert::float)
                    .serialize_with(convert::fixed(2)),
            ]
        }
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Plain {
        a: String,
        b: String,
    }

    impl RowRecord for Plain {
        fn columns() -> Vec<Field> {
            vec![Field::new("a"), Field::new("b")]
        }
    }

    fn people() -> Vec<Person> {
        vec![
            Person { name: "Jane".into(), age: 42, height: 1.65 },
            Person { name: "Joe".into(), age: 36, height: 1.75 },
        ]
    }

    #[test]
    fn test_encode_matches_expected_text() {
        let text = to_string(&people()).unwrap();
        assert_eq!(text, "name,age,height\nJane,42,1.65\nJoe,36,1.75\n");
    }

    #[test]
    fn test_decode_applies_parsers() {
        let rows: Vec<Person> = from_str("name,age,height\nJane,42,1.65\nJoe,36,1.75\n").unwrap();
        assert_eq!(rows, people());
    }

    #[test]
    fn test_round_trip_preserves_order_and_values() {
        let rows: Vec<Person> = from_str(&to_string(&people()).unwrap()).unwrap();
        assert_eq!(rows, people());
    }

    #[test]
    fn test_identity_fields_stay_strings() {
        let rows: Vec<Plain> = from_str("a,b\n1,2\n").unwrap();
        assert_eq!(rows[0], Plain { a: "1".into(), b: "2".into() });
    }

    #[test]
    fn test_header_order_is_free() {
        let rows: Vec<Person> = from_str("height,name,age\n1.65,Jane,42\n").unwrap();
        assert_eq!(rows[0].name, "Jane");
        assert_eq!(rows[0].age, 42);
    }

    #[test]
    fn test_extra_header_columns_ignored() {
        let rows: Vec<Plain> = from_str("a,ignored,b\n1,x,2\n").unwrap();
        assert_eq!(rows[0], Plain { a: "1".into(), b: "2".into() });
    }

    #[test]
    fn test_missing_column_fails_before_parsing() {
        let err = from_str::<Person>("name,age\nJane,42\n").unwrap_err();
        match err {
            Error::MissingColumn(missing) => assert_eq!(missing.column, "height"),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn test_parser_error_names_field_and_keeps_source() {
        let err = from_str::<Person>("name,age,height\nJane,not-a-number,1.65\n").unwrap_err();
        match err {
            Error::Field { field, source } => {
                assert_eq!(field, "age");
                assert!(source.is::<std::num::ParseIntError>());
            }
            other => panic!("expected Field error, got {other:?}"),
        }
    }

    #[test]
    fn test_quoted_cells_round_trip() {
        let rows = vec![Plain { a: "Doe, Jane".into(), b: "say \"hi\"\nbye".into() }];
        let text = to_string(&rows).unwrap();
        let reread: Vec<Plain> = from_str(&text).unwrap();
        assert_eq!(reread, rows);
    }

    #[test]
    fn test_empty_table_decodes_to_no_records() {
        let rows: Vec<Plain> = from_str("a,b\n").unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_empty_input_reports_missing_column() {
        let err = from_str::<Plain>("").unwrap_err();
        assert!(matches!(err, Error::MissingColumn(m) if m.column == "a"));
    }

    #[test]
    fn test_unparsed_cell_does_not_coerce() {
        // "age" declares no parser here, so the cell stays a string and the
        // i64 attribute rejects it instead of coercing.
        #[derive(Debug, Serialize, Deserialize)]
        struct Strict {
            age: i64,
        }

        impl RowRecord for Strict {
            fn columns() -> Vec<Field> {
                vec![Field::new("age")]
            }
        }

        let err = from_str::<Strict>("age\n42\n").unwrap_err();
        assert!(matches!(err, Error::Convert(_)));
    }

    #[test]
    fn test_encode_empty_slice_writes_header_only() {
        let text = to_string::<Plain>(&[]).unwrap();
        assert_eq!(text, "a,b\n");
    }

    #[test]
    fn test_registry_injection() {
        let registry = SchemaRegistry::new();
        let rows: Vec<Plain> = from_str_with(&registry, "a,b\n1,2\n").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(registry.len(), 1);
        registry.clear();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_file_handle_round_trip() {
        let mut file = tempfile::tempfile().unwrap();
        to_writer(&mut file, &people()).unwrap();
        file.seek(SeekFrom::Start(0)).unwrap();
        let rows: Vec<Person> = from_reader(&mut file).unwrap();
        assert_eq!(rows, people());
    }

    mod defaults {
        use super::*;

        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct Sparse {
            name: String,
            #[serde(skip_serializing_if = "Option::is_none", default)]
            note: Option<String>,
        }

        impl RowRecord for Sparse {
            fn columns() -> Vec<Field> {
                vec![Field::new("name"), Field::new("note").default_value("n/a")]
            }
        }

        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct SparseNoDefault {
            name: String,
            #[serde(skip_serializing_if = "Option::is_none", default)]
            note: Option<String>,
        }

        impl RowRecord for SparseNoDefault {
            fn columns() -> Vec<Field> {
                vec![Field::new("name"), Field::new("note")]
            }
        }

        #[test]
        fn test_encode_falls_back_to_declared_default() {
            let rows = vec![Sparse { name: "Jane".into(), note: None }];
            assert_eq!(to_string(&rows).unwrap(), "name,note\nJane,n/a\n");
        }

        #[test]
        fn test_encode_without_value_or_default_fails() {
            let rows = vec![SparseNoDefault { name: "Jane".into(), note: None }];
            let err = to_string(&rows).unwrap_err();
            assert!(matches!(err, Error::MissingValue(field) if field == "note"));
        }

        #[test]
        fn test_decode_never_fills_defaults() {
            // The declared default does not excuse an absent column.
            let err = from_str::<Sparse>("name\nJane\n").unwrap_err();
            assert!(matches!(err, Error::MissingColumn(m) if m.column == "note"));
        }
    }
}
