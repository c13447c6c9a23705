use csv::{Reader, ReaderBuilder, StringRecord};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use tracing::info;

use crate::error::{ParseError, RowError};

/// Open a GeoNames dump file, decompressing it on the fly when it ends in `.gz`.
pub(crate) fn open_dump(path: &Path) -> Result<Box<dyn Read>, ParseError> {
    info!("Reading {}", path.display());

    let file = File::open(path).map_err(|source| ParseError::Open {
        file: path.display().to_string(),
        source,
    })?;
    let reader: Box<dyn Read> = if path.extension().map_or(false, |e| e == "gz") {
        Box::new(GzDecoder::new(file))
    } else {
        Box::new(file)
    };
    Ok(reader)
}

/// Passes bytes through unchanged and remembers the first empty line.
///
/// The csv parser drops empty lines without reporting them, but an empty
/// line in a GeoNames dump is a malformed record.
struct LineFraming<R> {
    inner: R,
    line: u64,
    at_line_start: bool,
    blank_line: Option<u64>,
}

impl<R> LineFraming<R> {
    fn new(inner: R) -> Self {
        Self {
            inner,
            line: 1,
            at_line_start: true,
            blank_line: None,
        }
    }
}

impl<R: Read> Read for LineFraming<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        if self.blank_line.is_some() {
            return Ok(n);
        }
        for &byte in &buf[..n] {
            match byte {
                b'\n' if self.at_line_start => {
                    self.blank_line = Some(self.line);
                    break;
                }
                b'\n' => {
                    self.line += 1;
                    self.at_line_start = true;
                }
                b'\r' => {}
                _ => self.at_line_start = false,
            }
        }
        Ok(n)
    }
}

/// Tab-separated records of a GeoNames dump with their 1-based line numbers.
///
/// Rows may have varying widths; column checks happen per record, except
/// that an empty line fails with zero columns found.
pub(crate) struct TsvRecords<R> {
    reader: Reader<LineFraming<R>>,
    record: StringRecord,
    file: String,
    columns: usize,
}

impl<R: Read> TsvRecords<R> {
    /// `quoting` enables `"` quoted fields. The cities dump never quotes, so
    /// there a `"` inside a name is plain data and must not merge columns.
    pub(crate) fn new(reader: R, file: &str, columns: usize, quoting: bool) -> Self {
        let reader = ReaderBuilder::new()
            .has_headers(false)
            .delimiter(b'\t')
            .quoting(quoting)
            .flexible(true)
            .from_reader(LineFraming::new(reader));
        Self {
            reader,
            record: StringRecord::new(),
            file: file.to_string(),
            columns,
        }
    }

    /// Next record, or `None` at the end of input
    pub(crate) fn next_record(&mut self) -> Result<Option<(u64, &StringRecord)>, ParseError> {
        let more = self
            .reader
            .read_record(&mut self.record)
            .map_err(|e| ParseError::read(&self.file, e))?;

        // the parser has already stepped over any empty line it consumed
        if let Some(line) = self.reader.get_ref().blank_line {
            if self.reader.position().line() > line {
                return Err(ParseError::row(
                    &self.file,
                    line,
                    RowError::MissingColumns {
                        expected: self.columns,
                        found: 0,
                    },
                ));
            }
        }

        if !more {
            return Ok(None);
        }
        let line = self.record.position().map_or(0, |p| p.line());
        Ok(Some((line, &self.record)))
    }
}
