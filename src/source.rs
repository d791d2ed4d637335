//! Delimited-record source: turns raw bytes into a lazy stream of records.

use std::io::Read;

use futures::stream;

use crate::error::{PipelineError, Stage};
use crate::io::RecordInput;
use crate::record::Record;

/// Options controlling how input rows are decoded into records.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Field delimiter byte
    pub delimiter: u8,
    /// Treat the first row as field names; otherwise fields get positional
    /// names `field1..fieldN`
    pub has_headers: bool,
    /// Strip a leading UTF-8 byte-order mark before parsing
    pub strip_bom: bool,
    /// Trim whitespace from headers and fields
    pub trim: bool,
    /// Allow rows with varying field counts
    pub flexible: bool,
    /// Quote character
    pub quote: u8,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            has_headers: true,
            strip_bom: true,
            trim: false,
            flexible: false,
            quote: b'"',
        }
    }
}

impl ParseOptions {
    /// Set the field delimiter.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set whether the first row names the fields.
    pub fn with_headers(mut self, has_headers: bool) -> Self {
        self.has_headers = has_headers;
        self
    }

    /// Set whether a leading byte-order mark is stripped.
    pub fn with_strip_bom(mut self, strip_bom: bool) -> Self {
        self.strip_bom = strip_bom;
        self
    }

    /// Set whether whitespace is trimmed from headers and fields.
    pub fn with_trim(mut self, trim: bool) -> Self {
        self.trim = trim;
        self
    }

    /// Set whether rows may have varying field counts.
    pub fn with_flexible(mut self, flexible: bool) -> Self {
        self.flexible = flexible;
        self
    }

    /// Set the quote character.
    pub fn with_quote(mut self, quote: u8) -> Self {
        self.quote = quote;
        self
    }
}

/// Open an input and return a lazy stream of records.
///
/// The stream yields one `Record` per data row, with field order equal to
/// column order. Row decoding happens as the stream is polled; the whole
/// input is never held in memory.
pub fn record_stream(
    input: &dyn RecordInput,
    options: &ParseOptions,
) -> Result<impl futures::Stream<Item = Result<Record, PipelineError>> + Send + Unpin + use<>, PipelineError>
{
    let target = input.id().to_string();
    let reader = input
        .open()
        .map_err(|e| PipelineError::new(Stage::Read, e).with_target(&target))?;

    let reader: Box<dyn Read + Send> = if options.strip_bom {
        Box::new(BomStrip::new(reader))
    } else {
        reader
    };

    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(options.has_headers)
        .flexible(options.flexible)
        .quote(options.quote)
        .trim(if options.trim {
            csv::Trim::All
        } else {
            csv::Trim::None
        })
        .from_reader(reader);

    let headers = if options.has_headers {
        let headers = rdr.headers().map_err(|e| csv_error(&target, e))?;
        Some(headers.iter().map(str::to_string).collect::<Vec<_>>())
    } else {
        None
    };

    Ok(stream::iter(RecordIter {
        target,
        headers,
        rows: rdr.into_records(),
    }))
}

/// Map a csv error to the stage it belongs to: transport failures are read
/// errors, everything else is a decode error.
fn csv_error(target: &str, e: csv::Error) -> PipelineError {
    let stage = match e.kind() {
        csv::ErrorKind::Io(_) => Stage::Read,
        _ => Stage::Parse,
    };
    PipelineError::new(stage, e).with_target(target)
}

struct RecordIter {
    target: String,
    headers: Option<Vec<String>>,
    rows: csv::StringRecordsIntoIter<Box<dyn Read + Send>>,
}

impl Iterator for RecordIter {
    type Item = Result<Record, PipelineError>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = match self.rows.next()? {
            Ok(row) => row,
            Err(e) => return Some(Err(csv_error(&self.target, e))),
        };

        let mut record = Record::new();
        for (i, field) in row.iter().enumerate() {
            let name = match &self.headers {
                Some(headers) => match headers.get(i) {
                    Some(name) => name.clone(),
                    // flexible rows can be wider than the header
                    None => format!("field{}", i + 1),
                },
                None => format!("field{}", i + 1),
            };
            record.push(name, field);
        }

        Some(Ok(record))
    }
}

const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// Reader adapter that removes a leading UTF-8 byte-order mark.
struct BomStrip<R> {
    inner: R,
    pending: Vec<u8>,
    checked: bool,
}

impl<R: Read> BomStrip<R> {
    fn new(inner: R) -> Self {
        Self {
            inner,
            pending: Vec::new(),
            checked: false,
        }
    }

    fn check(&mut self) -> std::io::Result<()> {
        let mut head = [0u8; 3];
        let mut filled = 0;
        while filled < head.len() {
            let n = self.inner.read(&mut head[filled..])?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        if !(filled == 3 && head == UTF8_BOM) {
            self.pending.extend_from_slice(&head[..filled]);
        }
        self.checked = true;
        Ok(())
    }
}

impl<R: Read> Read for BomStrip<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if !self.checked {
            self.check()?;
        }
        if !self.pending.is_empty() {
            let n = self.pending.len().min(buf.len());
            buf[..n].copy_from_slice(&self.pending[..n]);
            self.pending.drain(..n);
            return Ok(n);
        }
        self.inner.read(buf)
    }
}
