use encoding_rs::{Encoding, UTF_8};

use crate::dialect::Dialect;
use crate::encoding::DEFAULT_FALLBACKS;
use crate::header::HeaderMode;

/// Default bound on attempts to find a good row within one pull.
pub const DEFAULT_MAX_TRIES: usize = 100;

/// Default cell value that means null.
pub const DEFAULT_NULL_TOKEN: &[u8] = b"\\N";

/// Number of bytes inspected when guessing the input encoding.
pub const ENCODING_SAMPLE_BYTES: usize = 64 * 1024;

/// Reader settings. Built through [`ReaderBuilder`](crate::ReaderBuilder).
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Tokenizer dialect.
    pub dialect: Dialect,
    /// Encoding tried first for every value.
    pub encoding: &'static Encoding,
    /// Encodings tried, in order, when the current one fails.
    pub fallback_encodings: Vec<&'static Encoding>,
    /// Guess the initial encoding from the start of the input.
    pub detect_encoding: bool,
    /// Fail on the first bad row or field instead of skipping it.
    pub raise_on_error: bool,
    /// Attempts per pull before giving up on the input.
    pub max_tries: usize,
    /// Cell value meaning null.
    pub null_token: Vec<u8>,
    /// Join continued lines before tokenizing.
    pub multiline: bool,
    /// How the first row is treated.
    pub header_mode: HeaderMode,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            encoding: UTF_8,
            fallback_encodings: DEFAULT_FALLBACKS.to_vec(),
            detect_encoding: false,
            raise_on_error: false,
            max_tries: DEFAULT_MAX_TRIES,
            null_token: DEFAULT_NULL_TOKEN.to_vec(),
            multiline: false,
            header_mode: HeaderMode::Detect,
        }
    }
}
