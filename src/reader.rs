//! The schema-driven reader and its builder.
//!
//! A [`Reader`] pulls tokenized rows from a [`RowSource`], skips rows that
//! cannot be used, maps the rest onto the [`Schema`] and yields one
//! [`Record`] per good row. Counters and warnings are kept on the reader so
//! the caller can judge the import afterwards.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;

use csv::ByteRecord;
use encoding_rs::Encoding;

use crate::config::{ENCODING_SAMPLE_BYTES, ReaderConfig};
use crate::dialect::Dialect;
use crate::encoding::{EncodingResolver, guess_encoding};
use crate::error::{ImportError, Result};
use crate::header::{HeaderMode, is_header};
use crate::schema::{Field, Schema};
use crate::source::{CsvSource, RowSource, SourceError};
use crate::value::{Cell, Record, Value};
use crate::warning::{Warning, WarningKind};

/// Builder for [`Reader`].
///
/// # Example
///
/// ```
/// use csv_salvage::{ReaderBuilder, Schema, Transform, Value};
///
/// let schema = Schema::builder()
///     .field("id", Transform::Int)
///     .field("fullname", Transform::String)
///     .field("email", Transform::String)
///     .skip(2)
///     .build()
///     .unwrap();
///
/// let data = "1,Maurits van Rees,ignored,maurits@example.org\n";
/// let mut reader = ReaderBuilder::new(schema).from_reader(data.as_bytes()).unwrap();
///
/// let record = reader.next().unwrap().unwrap();
/// assert_eq!(record.get("id"), Some(&Value::Int(1)));
/// assert_eq!(reader.success(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct ReaderBuilder {
    schema: Arc<Schema>,
    config: ReaderConfig,
}

impl ReaderBuilder {
    /// Create a builder with default settings.
    pub fn new(schema: impl Into<Arc<Schema>>) -> Self {
        Self {
            schema: schema.into(),
            config: ReaderConfig::default(),
        }
    }

    /// Set the tokenizer dialect.
    pub fn dialect(&mut self, dialect: Dialect) -> &mut Self {
        self.config.dialect = dialect;
        self
    }

    /// Set the encoding tried first.
    pub fn encoding(&mut self, encoding: &'static Encoding) -> &mut Self {
        self.config.encoding = encoding;
        self
    }

    /// Replace the fallback encoding list.
    pub fn fallback_encodings(&mut self, encodings: Vec<&'static Encoding>) -> &mut Self {
        self.config.fallback_encodings = encodings;
        self
    }

    /// Guess the initial encoding from the input instead of using the
    /// configured one. Only applies to [`from_path`](Self::from_path) and
    /// [`from_bytes`](Self::from_bytes).
    pub fn detect_encoding(&mut self, yes: bool) -> &mut Self {
        self.config.detect_encoding = yes;
        self
    }

    /// Fail on the first bad row or field instead of skipping it.
    pub fn raise_on_error(&mut self, yes: bool) -> &mut Self {
        self.config.raise_on_error = yes;
        self
    }

    /// Set the number of attempts per pull before the input is given up on.
    pub fn max_tries(&mut self, max_tries: usize) -> &mut Self {
        self.config.max_tries = max_tries;
        self
    }

    /// Set the cell value that means null.
    pub fn null_token(&mut self, token: &[u8]) -> &mut Self {
        self.config.null_token = token.to_vec();
        self
    }

    /// Join continued lines before tokenizing.
    pub fn multiline(&mut self, yes: bool) -> &mut Self {
        self.config.multiline = yes;
        self
    }

    /// Set how the first row is treated.
    pub fn header_mode(&mut self, mode: HeaderMode) -> &mut Self {
        self.config.header_mode = mode;
        self
    }

    /// Current settings.
    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Read from any byte source.
    pub fn from_reader<R: Read>(&self, rdr: R) -> Result<Reader<CsvSource<R>>> {
        let source = CsvSource::new(rdr, &self.config.dialect, self.config.multiline);
        self.build(source, self.config.encoding)
    }

    /// Read from an in-memory buffer.
    pub fn from_bytes<'a>(&self, data: &'a [u8]) -> Result<Reader<CsvSource<&'a [u8]>>> {
        let encoding = if self.config.detect_encoding {
            guess_encoding(&data[..data.len().min(ENCODING_SAMPLE_BYTES)])
        } else {
            self.config.encoding
        };
        let source = CsvSource::new(data, &self.config.dialect, self.config.multiline);
        self.build(source, encoding)
    }

    /// Read a file.
    pub fn from_path<P: AsRef<Path>>(&self, path: P) -> Result<Reader<CsvSource<BufReader<File>>>> {
        let mut file = File::open(path.as_ref())?;
        let encoding = if self.config.detect_encoding {
            let mut sample = Vec::with_capacity(ENCODING_SAMPLE_BYTES);
            (&mut file)
                .take(ENCODING_SAMPLE_BYTES as u64)
                .read_to_end(&mut sample)?;
            file.seek(SeekFrom::Start(0))?;
            guess_encoding(&sample)
        } else {
            self.config.encoding
        };
        let source = CsvSource::new(
            BufReader::new(file),
            &self.config.dialect,
            self.config.multiline,
        );
        self.build(source, encoding)
    }

    /// Read from a custom row source.
    pub fn from_source<S: RowSource>(&self, source: S) -> Result<Reader<S>> {
        self.build(source, self.config.encoding)
    }

    fn build<S: RowSource>(&self, source: S, encoding: &'static Encoding) -> Result<Reader<S>> {
        if self.config.max_tries == 0 {
            return Err(ImportError::InvalidConfig(
                "max_tries must be at least 1".to_string(),
            ));
        }

        tracing::debug!(
            fields = self.schema.len(),
            columns = self.schema.required_columns(),
            encoding = encoding.name(),
            multiline = self.config.multiline,
            "starting import"
        );

        Ok(Reader {
            source,
            schema: Arc::clone(&self.schema),
            row: ByteRecord::new(),
            resolver: EncodingResolver::with_fallbacks(
                encoding,
                self.config.fallback_encodings.clone(),
            ),
            raise_on_error: self.config.raise_on_error,
            max_tries: self.config.max_tries,
            null_token: self.config.null_token.clone(),
            header_mode: self.config.header_mode,
            header_checked: false,
            phase: Phase::Reading,
            line: 0,
            ignored: 0,
            success: 0,
            warnings: Vec::new(),
        })
    }
}

/// Where a reader is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Rows are being read normally.
    Reading,
    /// The last record was produced after skipping bad rows.
    Recovering,
    /// The input is drained.
    Exhausted,
    /// A fatal error was returned. No more records will be produced.
    Failed,
}

/// Counters and warnings of an import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    /// Rows turned into records.
    pub success: usize,
    /// Rows skipped.
    pub ignored: usize,
    /// Every warning recorded, in order.
    pub warnings: Vec<Warning>,
}

impl fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} entries read without errors, {} entries ignored due to errors, {} warnings",
            self.success,
            self.ignored,
            self.warnings.len()
        )
    }
}

/// Schema-driven reader over a [`RowSource`].
///
/// Iterating yields `Result<Record>`. Bad rows and fields are skipped and
/// recorded as warnings unless `raise_on_error` is set. After an `Err` or
/// the end of input the iterator only returns `None`.
#[derive(Debug)]
pub struct Reader<S> {
    source: S,
    schema: Arc<Schema>,
    row: ByteRecord,
    resolver: EncodingResolver,
    raise_on_error: bool,
    max_tries: usize,
    null_token: Vec<u8>,
    header_mode: HeaderMode,
    header_checked: bool,
    phase: Phase,
    line: usize,
    ignored: usize,
    success: usize,
    warnings: Vec<Warning>,
}

impl<S: RowSource> Reader<S> {
    /// Read the next record. `Ok(None)` means the input is exhausted.
    pub fn read_record(&mut self) -> Result<Option<Record>> {
        if matches!(self.phase, Phase::Exhausted | Phase::Failed) {
            return Ok(None);
        }

        self.phase = Phase::Reading;
        let result = self.pull();
        match &result {
            // Reading, or Recovering if rows were skipped on the way.
            Ok(Some(_)) => {}
            Ok(None) => {
                self.phase = Phase::Exhausted;
                tracing::debug!(
                    success = self.success,
                    ignored = self.ignored,
                    lines = self.line,
                    "input exhausted"
                );
            }
            Err(e) => {
                self.phase = Phase::Failed;
                tracing::error!(line = self.line, row = self.rows(), "import failed: {e}");
            }
        }
        result
    }

    fn pull(&mut self) -> Result<Option<Record>> {
        if !self.read_good_row()? {
            return Ok(None);
        }

        if !self.header_checked {
            self.header_checked = true;
            let discard = self.line == 1
                && match self.header_mode {
                    HeaderMode::Detect => is_header(self.row.iter()),
                    HeaderMode::Present => true,
                    HeaderMode::Absent => false,
                };
            if discard {
                tracing::debug!(columns = self.row.len(), "discarding header row");
                if !self.read_good_row()? {
                    return Ok(None);
                }
            }
        }

        let row = std::mem::take(&mut self.row);
        let mapped = self.map_row(&row);
        self.row = row;

        let record = mapped?;
        self.success += 1;
        Ok(Some(record))
    }

    /// Pull rows until one has the right column count.
    ///
    /// Only the first bad row of a pull is counted and reported: later bad
    /// rows in the same pull are usually leftovers of the same broken record.
    fn read_good_row(&mut self) -> Result<bool> {
        let expected = self.schema.required_columns();
        let mut tries = 0;

        loop {
            if tries >= self.max_tries {
                return Err(ImportError::RecoveryBoundExceeded {
                    tries,
                    line: self.line,
                    row: self.rows(),
                });
            }
            tries += 1;
            self.line += 1;

            match self.source.read_row(&mut self.row) {
                Ok(false) => return Ok(false),
                Ok(true) if self.row.len() == expected => return Ok(true),
                Ok(true) => {
                    if tries == 1 {
                        let got = self.row.len();
                        self.ignored += 1;
                        self.report(WarningKind::ColumnCount { got, expected }, self.rows())?;
                    }
                }
                Err(SourceError::Tokenize(message)) => {
                    self.ignored += 1;
                    self.report(WarningKind::Tokenize { message }, self.rows())?;
                }
                Err(SourceError::Io(e)) => return Err(ImportError::Io(e)),
            }

            self.phase = Phase::Recovering;
        }
    }

    fn map_row(&mut self, row: &ByteRecord) -> Result<Record> {
        let schema = Arc::clone(&self.schema);
        let mut record = Record::with_capacity(schema.len());

        let columns = row
            .iter()
            .enumerate()
            .filter(|(i, _)| !schema.is_skipped(*i))
            .map(|(_, c)| c);

        for (field, raw) in schema.fields().iter().zip(columns) {
            let value = self.map_field(field, raw)?;
            record.push(Arc::clone(&field.name), value);
        }

        Ok(record)
    }

    fn map_field(&mut self, field: &Field, raw: &[u8]) -> Result<Value> {
        if raw == self.null_token.as_slice() {
            return Ok(Value::Null);
        }

        let Some(transform) = &field.transform else {
            return Ok(Value::Text(self.resolver.decode(raw)));
        };

        let cell = match transform.apply(raw) {
            Ok(cell) => cell,
            Err(e) => {
                let kind = WarningKind::Field {
                    field: field.name.to_string(),
                    value: String::from_utf8_lossy(raw).into_owned(),
                    transform: transform.name().to_string(),
                    message: e.to_string(),
                };
                self.report(kind, self.rows() + 1)?;
                Cell::NULL
            }
        };

        Ok(match cell {
            Cell::Raw(bytes) => Value::Text(self.resolver.decode(&bytes)),
            Cell::Value(value) => value,
        })
    }

    fn report(&mut self, kind: WarningKind, row: usize) -> Result<()> {
        let warning = Warning::new(self.line, row, kind);
        tracing::warn!(line = warning.line, row = warning.row, "{warning}");
        self.warnings.push(warning.clone());
        if self.raise_on_error {
            return Err(ImportError::Rejected(warning));
        }
        Ok(())
    }
}

impl<S> Reader<S> {
    /// Rows turned into records so far.
    #[inline]
    pub fn success(&self) -> usize {
        self.success
    }

    /// Rows skipped so far.
    #[inline]
    pub fn ignored(&self) -> usize {
        self.ignored
    }

    /// Rows consumed so far (`success + ignored`).
    #[inline]
    pub fn rows(&self) -> usize {
        self.success + self.ignored
    }

    /// Line counter: one per row pulled from the source.
    #[inline]
    pub fn line(&self) -> usize {
        self.line
    }

    /// Warnings recorded so far, oldest first.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The encoding that will be tried first for the next value.
    pub fn encoding(&self) -> &'static Encoding {
        self.resolver.current()
    }

    /// The schema records are mapped onto.
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Snapshot of the counters and warnings.
    pub fn summary(&self) -> ImportSummary {
        ImportSummary {
            success: self.success,
            ignored: self.ignored,
            warnings: self.warnings.clone(),
        }
    }
}

impl<S: RowSource> Iterator for Reader<S> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_record().transpose()
    }
}
