//! Single-channel reader for delimited motion-capture exports.

use crate::core::SubjectSignal;
use crate::error::{EntropyError, Result};
use csv::ReaderBuilder;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Reads one named column from a delimited table.
///
/// Rows before `header_row` are ignored, the header row names the columns and
/// the next `skip_rows` rows (units, sub-headers) are dropped before data
/// starts. Blank cells are skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelReader {
    column: String,
    header_row: usize,
    skip_rows: usize,
    delimiter: u8,
}

impl ChannelReader {
    /// Reader for `column`, with the header on the first row.
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            header_row: 0,
            skip_rows: 0,
            delimiter: b',',
        }
    }

    /// Set the 0-based row index of the header.
    pub fn header_row(mut self, header_row: usize) -> Self {
        self.header_row = header_row;
        self
    }

    /// Set the number of non-data rows following the header.
    pub fn skip_rows(mut self, skip_rows: usize) -> Self {
        self.skip_rows = skip_rows;
        self
    }

    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    /// Read the channel from any byte source.
    pub fn read<R: Read>(&self, source: R) -> Result<Vec<f64>> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(self.delimiter)
            .from_reader(source);

        let mut column_index = None;
        let mut samples = Vec::new();

        for (row, record) in reader.records().enumerate() {
            let record = record?;
            if row < self.header_row {
                continue;
            }
            if row == self.header_row {
                column_index = record.iter().position(|name| name.trim() == self.column);
                if column_index.is_none() {
                    return Err(EntropyError::MissingColumn(self.column.clone()));
                }
                continue;
            }
            if row <= self.header_row + self.skip_rows {
                continue;
            }

            let Some(cell) = column_index.and_then(|i| record.get(i)).map(str::trim) else {
                continue;
            };
            if cell.is_empty() {
                continue;
            }
            let value = cell.parse::<f64>().map_err(|_| EntropyError::Parse {
                row,
                value: cell.to_string(),
            })?;
            samples.push(value);
        }

        if column_index.is_none() {
            return Err(EntropyError::MissingColumn(self.column.clone()));
        }
        Ok(samples)
    }

    /// Read the channel from a file.
    pub fn read_path<P: AsRef<Path>>(&self, path: P) -> Result<Vec<f64>> {
        self.read(File::open(path)?)
    }

    /// Read the channel from a file into a subject record.
    pub fn read_subject<P: AsRef<Path>>(
        &self,
        path: P,
        subject_id: impl Into<String>,
        group: impl Into<String>,
    ) -> Result<SubjectSignal> {
        Ok(SubjectSignal::new(subject_id, group, self.read_path(path)?))
    }
}
