//! Raw CSV grid reading and writing.
//!
//! A [`TextGrid`] is the textual table: the header row plus every data row
//! as plain string cells, before any type-aware conversion. Reading and
//! writing follow the standard CSV convention (comma delimiter, double-quote
//! enclosure, doubled-quote escaping, quoted cells may span lines). The
//! caller owns the stream; this module only reads or writes through it.

use std::io::{Read, Write};

use crate::error::Result;

/// The parsed grid of string cells prior to type-aware decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextGrid {
    /// Header cells, first line of the table.
    pub header: Vec<String>,
    /// Data rows in table order, each aligned to the header.
    pub rows: Vec<Vec<String>>,
}

impl TextGrid {
    /// Number of data rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Read a full CSV stream into a grid.
///
/// The first line is always the header. Ragged rows and invalid UTF-8
/// surface as [`FormatError`](crate::FormatError) carrying the offending
/// line number.
pub fn read<R: Read>(reader: R) -> Result<TextGrid> {
    let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);

    let header: Vec<String> = rdr.headers()?.iter().map(String::from).collect();

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        rows.push(record.iter().map(String::from).collect());
    }

    tracing::debug!(columns = header.len(), rows = rows.len(), "read CSV grid");
    Ok(TextGrid { header, rows })
}

/// Write a grid to a CSV stream, quoting cells as the convention requires.
pub fn write<W: Write>(writer: W, grid: &TextGrid) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    wtr.write_record(&grid.header)?;
    for row in &grid.rows {
        wtr.write_record(row)?;
    }
    wtr.flush()?;

    tracing::debug!(columns = grid.header.len(), rows = grid.rows.len(), "wrote CSV grid");
    Ok(())
}
