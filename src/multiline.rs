//! Joining of rows that were split over several physical lines.
//!
//! Some exporters write an embedded newline as a backslash at the end of the
//! line, or as a line holding nothing but a backslash. Such lines are merged
//! into one logical line, with [`NEWLINE_MARKER`] standing in for each
//! newline, so a line-oriented tokenizer sees one row. The `to_text`
//! transform turns the marker back into real newlines.

use std::io::{self, BufRead, Read};

use crate::transform::NEWLINE_MARKER;

/// Iterator over logical lines, without line terminators.
#[derive(Debug)]
pub struct ContinuationLines<R> {
    inner: R,
    buf: Vec<u8>,
    last: Option<Vec<u8>>,
    pending: bool,
    done: bool,
}

impl<R: BufRead> ContinuationLines<R> {
    /// Wrap a buffered reader.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buf: Vec::new(),
            last: None,
            pending: false,
            done: false,
        }
    }

    /// Read one physical line into `self.buf`, terminator removed.
    /// Returns false at end of input.
    fn read_physical(&mut self) -> io::Result<bool> {
        self.buf.clear();
        if self.inner.read_until(b'\n', &mut self.buf)? == 0 {
            return Ok(false);
        }
        if self.buf.last() == Some(&b'\n') {
            self.buf.pop();
            if self.buf.last() == Some(&b'\r') {
                self.buf.pop();
            }
        }
        Ok(true)
    }
}

impl<R: BufRead> Iterator for ContinuationLines<R> {
    type Item = io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            match self.read_physical() {
                Ok(true) => {}
                Ok(false) => {
                    // A continuation still pending here has nothing to join.
                    self.done = true;
                    self.pending = false;
                    return self.last.take().map(Ok);
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }

            if self.buf == b"\\" {
                self.pending = true;
                continue;
            }

            let continues = self.buf.last() == Some(&b'\\');
            if continues {
                self.buf.pop();
            }

            if self.pending
                && let Some(last) = self.last.as_mut()
            {
                last.extend_from_slice(NEWLINE_MARKER.as_bytes());
                last.extend_from_slice(&self.buf);
                self.pending = continues;
                continue;
            }

            self.pending = continues;
            let line = self.buf.clone();
            if let Some(complete) = self.last.replace(line) {
                return Some(Ok(complete));
            }
        }
    }
}

/// [`Read`] adapter emitting each logical line followed by `\n`.
#[derive(Debug)]
pub struct JoinedReader<R> {
    lines: ContinuationLines<R>,
    out: Vec<u8>,
    pos: usize,
}

impl<R: BufRead> JoinedReader<R> {
    /// Wrap a buffered reader.
    pub fn new(inner: R) -> Self {
        Self {
            lines: ContinuationLines::new(inner),
            out: Vec::new(),
            pos: 0,
        }
    }
}

impl<R: BufRead> Read for JoinedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        while self.pos >= self.out.len() {
            match self.lines.next() {
                Some(line) => {
                    self.out = line?;
                    self.out.push(b'\n');
                    self.pos = 0;
                }
                None => return Ok(0),
            }
        }

        let n = buf.len().min(self.out.len() - self.pos);
        buf[..n].copy_from_slice(&self.out[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

/// Join continued lines of `data`, returning the logical lines.
pub fn join_continued_lines(data: &[u8]) -> io::Result<Vec<Vec<u8>>> {
    ContinuationLines::new(data).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::to_text;
    use crate::value::Cell;

    fn lines(data: &str) -> Vec<String> {
        join_continued_lines(data.as_bytes())
            .unwrap()
            .into_iter()
            .map(|l| String::from_utf8(l).unwrap())
            .collect()
    }

    #[test]
    fn test_plain_lines_pass_through() {
        assert_eq!(lines("a,b\nc,d\n"), vec!["a,b", "c,d"]);
        assert_eq!(lines("a,b\r\nc,d"), vec!["a,b", "c,d"]);
        assert!(lines("").is_empty());
    }

    #[test]
    fn test_marker_line_joins_next_line() {
        assert_eq!(
            lines("1,first\n\\\nsecond\n2,other\n"),
            vec!["1,first--NEWLINE--second", "2,other"]
        );
    }

    #[test]
    fn test_trailing_backslash_joins_next_line() {
        assert_eq!(
            lines("1,one\\\ntwo\\\nthree\n2,x\n"),
            vec!["1,one--NEWLINE--two--NEWLINE--three", "2,x"]
        );
    }

    #[test]
    fn test_pending_at_end_is_dropped() {
        assert_eq!(lines("1,a\\\n"), vec!["1,a"]);
        assert_eq!(lines("1,a\n\\\n"), vec!["1,a"]);
    }

    #[test]
    fn test_marker_before_any_line_starts_new_line() {
        assert_eq!(lines("\\\n1,a\n"), vec!["1,a"]);
    }

    #[test]
    fn test_round_trip_with_to_text() {
        let original = "first line\nsecond line\nthird";
        let escaped = original.replace('\n', "\\\n");
        let joined = join_continued_lines(escaped.as_bytes()).unwrap();
        assert_eq!(joined.len(), 1);

        match to_text(&joined[0]) {
            Cell::Raw(bytes) => assert_eq!(String::from_utf8(bytes).unwrap(), original),
            Cell::Value(v) => panic!("unexpected value {v:?}"),
        }
    }

    #[test]
    fn test_joined_reader() {
        let mut out = String::new();
        JoinedReader::new(&b"1,a\\\nb\n2,c"[..])
            .read_to_string(&mut out)
            .unwrap();
        assert_eq!(out, "1,a--NEWLINE--b\n2,c\n");
    }
}
