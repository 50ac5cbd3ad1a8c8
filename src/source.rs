//! Row sources: the tokenizer seam in front of the reader.

use std::io::{self, BufReader, Read};

use csv::ByteRecord;

use crate::dialect::Dialect;
use crate::multiline::JoinedReader;

/// Why a source could not produce the next row.
#[derive(Debug)]
pub enum SourceError {
    /// The input could not be split into columns. The row is skipped and the
    /// source may be read again.
    Tokenize(String),
    /// The input itself failed. Reading stops.
    Io(io::Error),
}

/// Anything that yields tokenized rows one at a time.
pub trait RowSource {
    /// Read the next row into `record`. Returns `Ok(false)` at end of input.
    fn read_row(&mut self, record: &mut ByteRecord) -> Result<bool, SourceError>;
}

impl<S: RowSource + ?Sized> RowSource for Box<S> {
    fn read_row(&mut self, record: &mut ByteRecord) -> Result<bool, SourceError> {
        (**self).read_row(record)
    }
}

/// Raw input, optionally passed through the multiline joiner.
#[derive(Debug)]
pub enum Input<R> {
    /// Passed to the tokenizer unchanged.
    Plain(R),
    /// Continued lines joined first.
    Multiline(JoinedReader<BufReader<R>>),
}

impl<R: Read> Input<R> {
    /// Wrap `inner`, joining continued lines when `multiline` is set.
    pub fn new(inner: R, multiline: bool) -> Self {
        if multiline {
            Input::Multiline(JoinedReader::new(BufReader::new(inner)))
        } else {
            Input::Plain(inner)
        }
    }
}

impl<R: Read> Read for Input<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Input::Plain(r) => r.read(buf),
            Input::Multiline(r) => r.read(buf),
        }
    }
}

/// A [`RowSource`] backed by the `csv` crate.
#[derive(Debug)]
pub struct CsvSource<R> {
    reader: csv::Reader<Input<R>>,
}

impl<R: Read> CsvSource<R> {
    /// Tokenize `inner` with `dialect`.
    pub fn new(inner: R, dialect: &Dialect, multiline: bool) -> Self {
        Self {
            reader: dialect.to_builder().from_reader(Input::new(inner, multiline)),
        }
    }
}

impl<R: Read> RowSource for CsvSource<R> {
    fn read_row(&mut self, record: &mut ByteRecord) -> Result<bool, SourceError> {
        self.reader.read_byte_record(record).map_err(|e| {
            let message = e.to_string();
            match e.into_kind() {
                csv::ErrorKind::Io(io) => SourceError::Io(io),
                _ => SourceError::Tokenize(message),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_source_reads_rows() {
        let mut source = CsvSource::new(&b"1,a\n2,b,c\n"[..], &Dialect::default(), false);
        let mut record = ByteRecord::new();

        assert!(source.read_row(&mut record).unwrap());
        assert_eq!(record.len(), 2);
        assert!(source.read_row(&mut record).unwrap());
        assert_eq!(record.len(), 3);
        assert!(!source.read_row(&mut record).unwrap());
    }

    #[test]
    fn test_csv_source_multiline() {
        let mut source = CsvSource::new(&b"1,one\\\ntwo\n"[..], &Dialect::default(), true);
        let mut record = ByteRecord::new();

        assert!(source.read_row(&mut record).unwrap());
        assert_eq!(&record[1], b"one--NEWLINE--two");
        assert!(!source.read_row(&mut record).unwrap());
    }

    struct Failing;

    impl Read for Failing {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("disk on fire"))
        }
    }

    #[test]
    fn test_csv_source_invalid_utf8_is_not_an_error() {
        let mut source = CsvSource::new(&b"1,Ren\xE9e\n"[..], &Dialect::default(), false);
        let mut record = ByteRecord::new();
        assert!(source.read_row(&mut record).unwrap());
        assert_eq!(&record[1], b"Ren\xE9e");
    }

    #[test]
    fn test_csv_source_io_error() {
        let mut source = CsvSource::new(Failing, &Dialect::default(), false);
        let mut record = ByteRecord::new();
        assert!(matches!(
            source.read_row(&mut record),
            Err(SourceError::Io(_))
        ));
    }
}
