//! Header row detection.

/// How the first row of a stream is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeaderMode {
    /// Discard the first row if [`is_header`] says it looks like one.
    #[default]
    Detect,
    /// The first row is always a header.
    Present,
    /// There is no header row.
    Absent,
}

impl HeaderMode {
    /// Parse `detect`, `present` or `absent`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "detect" | "auto" => Some(HeaderMode::Detect),
            "present" | "yes" => Some(HeaderMode::Present),
            "absent" | "no" => Some(HeaderMode::Absent),
            _ => None,
        }
    }
}

/// Best-effort guess whether a row is a header.
///
/// Data rows are expected to contain at least one integer column (usually an
/// id), so a row is a header when none of its trimmed columns is an integer.
/// This is wrong for all-text data and for headers with numeric labels; use
/// [`HeaderMode`] to override it.
pub fn is_header<'a, I>(columns: I) -> bool
where
    I: IntoIterator<Item = &'a [u8]>,
{
    !columns.into_iter().any(|c| is_integer(c.trim_ascii()))
}

/// Optional sign followed by one or more ASCII digits.
fn is_integer(v: &[u8]) -> bool {
    let digits = match v.first() {
        Some(b'+' | b'-') => &v[1..],
        _ => v,
    };
    !digits.is_empty() && digits.iter().all(u8::is_ascii_digit)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row<'a>(cols: &'a [&'a str]) -> impl Iterator<Item = &'a [u8]> {
        cols.iter().map(|c| c.as_bytes())
    }

    #[test]
    fn test_text_row_is_header() {
        assert!(is_header(row(&["id", "name", "email"])));
    }

    #[test]
    fn test_row_with_integer_is_data() {
        assert!(!is_header(row(&[
            "1",
            "Maurits van Rees",
            "maurits@example.org"
        ])));
        assert!(!is_header(row(&["name", " -12 "])));
    }

    #[test]
    fn test_non_integer_numbers_do_not_count() {
        assert!(is_header(row(&["1.5", "+", "", "1e3"])));
    }

    #[test]
    fn test_header_mode_from_name() {
        assert_eq!(HeaderMode::from_name("Detect"), Some(HeaderMode::Detect));
        assert_eq!(HeaderMode::from_name("absent"), Some(HeaderMode::Absent));
        assert_eq!(HeaderMode::from_name("maybe"), None);
    }
}
