//! Per-value decoding with a sticky best-guess encoding, built on `encoding_rs`.
//!
//! Input files are not assumed to use one encoding throughout, so every text
//! value is decoded on its own. The first encoding that works is remembered
//! and tried first for the next value.

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use simdutf8::basic::from_utf8;

use crate::error::{ImportError, Result};

/// Encodings tried, in order, when the current default fails.
///
/// `encoding_rs` follows WHATWG, where the `iso-8859-1` label resolves to
/// windows-1252.
pub const DEFAULT_FALLBACKS: &[&Encoding] = &[UTF_8, WINDOWS_1252];

/// Check if the given bytes are valid UTF-8.
///
/// Uses SIMD-accelerated validation for performance.
pub fn is_utf8(data: &[u8]) -> bool {
    from_utf8(data).is_ok()
}

/// Check if the data starts with a UTF-8 BOM (Byte Order Mark).
///
/// The UTF-8 BOM is the byte sequence: EF BB BF
pub fn has_utf8_bom(data: &[u8]) -> bool {
    data.starts_with(&[0xEF, 0xBB, 0xBF])
}

/// Skip the UTF-8 BOM if present and return the remaining data.
pub fn skip_bom(data: &[u8]) -> &[u8] {
    if has_utf8_bom(data) { &data[3..] } else { data }
}

/// Look up an encoding by WHATWG label (`"utf-8"`, `"latin1"`, `"cp1252"`, ...).
pub fn encoding_for_label(label: &str) -> Result<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| ImportError::UnknownEncoding(label.to_string()))
}

/// Guess the encoding of a sample with chardetng.
///
/// Valid UTF-8 (with or without BOM) is reported as UTF-8 without running
/// the detector.
pub fn guess_encoding(sample: &[u8]) -> &'static Encoding {
    let sample = skip_bom(sample);
    if is_utf8(sample) {
        return UTF_8;
    }

    let mut detector = EncodingDetector::new();
    detector.feed(sample, true);
    detector.guess(None, true)
}

/// Decodes raw cell bytes, remembering which encoding worked last.
#[derive(Debug, Clone)]
pub struct EncodingResolver {
    current: &'static Encoding,
    fallbacks: Vec<&'static Encoding>,
}

impl Default for EncodingResolver {
    fn default() -> Self {
        Self::new(UTF_8)
    }
}

impl EncodingResolver {
    /// Create a resolver with the given default and the standard fallbacks.
    pub fn new(default: &'static Encoding) -> Self {
        Self::with_fallbacks(default, DEFAULT_FALLBACKS.to_vec())
    }

    /// Create a resolver with an explicit fallback list.
    pub fn with_fallbacks(default: &'static Encoding, fallbacks: Vec<&'static Encoding>) -> Self {
        Self {
            current: default,
            fallbacks,
        }
    }

    /// The encoding that will be tried first for the next value.
    pub fn current(&self) -> &'static Encoding {
        self.current
    }

    /// Decode a value. Never fails.
    ///
    /// Tries the current encoding, then each fallback in order; the first
    /// fallback that works becomes the current encoding. When nothing works
    /// the value is decoded as UTF-8 with replacement characters.
    pub fn decode(&mut self, raw: &[u8]) -> String {
        let raw = skip_bom(raw);

        if let Some(text) = strict_decode(self.current, raw) {
            return text;
        }

        let failed = self.current;
        for &encoding in &self.fallbacks {
            if encoding == failed {
                continue;
            }
            if let Some(text) = strict_decode(encoding, raw) {
                tracing::debug!(
                    from = failed.name(),
                    to = encoding.name(),
                    "switching default encoding"
                );
                self.current = encoding;
                return text;
            }
        }

        tracing::debug!(
            encoding = self.current.name(),
            "no encoding fits, decoding lossily"
        );
        String::from_utf8_lossy(raw).into_owned()
    }
}

fn strict_decode(encoding: &'static Encoding, raw: &[u8]) -> Option<String> {
    if encoding == UTF_8 {
        return from_utf8(raw).ok().map(str::to_string);
    }
    encoding
        .decode_without_bom_handling_and_without_replacement(raw)
        .map(std::borrow::Cow::into_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_utf8() {
        assert!(is_utf8(b"Hello, World!"));
        assert!(is_utf8("こんにちは".as_bytes()));
        assert!(is_utf8(b""));
        assert!(!is_utf8(&[0xFF, 0xFE]));
    }

    #[test]
    fn test_utf8_bom() {
        let with_bom = [0xEF, 0xBB, 0xBF, b'a', b'b', b'c'];
        assert!(has_utf8_bom(&with_bom));
        assert!(!has_utf8_bom(b"abc"));
        assert_eq!(skip_bom(&with_bom), b"abc");
        assert_eq!(skip_bom(b"abc"), b"abc");
    }

    #[test]
    fn test_decode_keeps_default_when_it_works() {
        let mut resolver = EncodingResolver::default();
        assert_eq!(resolver.decode("Zoë".as_bytes()), "Zoë");
        assert_eq!(resolver.current(), UTF_8);
    }

    #[test]
    fn test_decode_falls_back_and_sticks() {
        let mut resolver = EncodingResolver::default();
        // "Zoë" in windows-1252
        assert_eq!(resolver.decode(&[b'Z', b'o', 0xEB]), "Zoë");
        assert_eq!(resolver.current(), WINDOWS_1252);

        // Plain ASCII decodes under the sticky default without switching back.
        assert_eq!(resolver.decode(b"plain"), "plain");
        assert_eq!(resolver.current(), WINDOWS_1252);
    }

    #[test]
    fn test_decode_lossy_last_resort() {
        let mut resolver = EncodingResolver::with_fallbacks(UTF_8, vec![UTF_8]);
        let text = resolver.decode(&[b'a', 0xFF, b'b']);
        assert_eq!(text, "a\u{FFFD}b");
        assert_eq!(resolver.current(), UTF_8);
    }

    #[test]
    fn test_decode_strips_bom() {
        let mut resolver = EncodingResolver::default();
        assert_eq!(resolver.decode(&[0xEF, 0xBB, 0xBF, b'i', b'd']), "id");
    }

    #[test]
    fn test_encoding_for_label() {
        assert_eq!(encoding_for_label("latin1").unwrap(), WINDOWS_1252);
        assert_eq!(encoding_for_label(" UTF-8 ").unwrap(), UTF_8);
        assert!(matches!(
            encoding_for_label("klingon"),
            Err(ImportError::UnknownEncoding(_))
        ));
    }

    #[test]
    fn test_guess_encoding() {
        assert_eq!(guess_encoding(b"id,name\n1,Arthur\n"), UTF_8);
        // Windows-1251 encoded Cyrillic text: "Привет"
        let data: &[u8] = &[0xCF, 0xF0, 0xE8, 0xE2, 0xE5, 0xF2];
        assert_ne!(guess_encoding(data), UTF_8);
    }
}
