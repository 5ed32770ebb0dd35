//! String plausibility checks shared by all extraction strategies.

/// Substrings produced by encoding artefacts rather than real text.
pub const ARTEFACT_PATTERNS: &[&str] = &["}}}", "{{{", "|||", "~~~", "^^^"];

/// Returns `true` if `byte` is printable ASCII (`0x20..=0x7E`).
#[must_use]
pub fn is_printable(byte: u8) -> bool {
    (0x20..=0x7E).contains(&byte)
}

/// Share of printable ASCII bytes in `bytes`, `0.0` for an empty slice.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn printable_ratio(bytes: &[u8]) -> f64 {
    if bytes.is_empty() {
        return 0.0;
    }
    let printable = bytes.iter().filter(|&&b| is_printable(b)).count();
    printable as f64 / bytes.len() as f64
}

/// Returns `true` if `text` contains one of the [`ARTEFACT_PATTERNS`].
#[must_use]
pub fn is_artefact(text: &str) -> bool {
    ARTEFACT_PATTERNS.iter().any(|pattern| text.contains(pattern))
}

/// Decide whether `text` looks like a real string rather than noise.
///
/// A valid string has at least two characters, at least one ASCII alphanumeric character,
/// is not made up entirely of whitespace and bracket characters, and contains no encoding
/// artefact pattern.
///
/// # Examples
///
/// ```rust
/// use fasscope::strings::is_valid_string;
///
/// assert!(is_valid_string("dict_name"));
/// assert!(!is_valid_string("}}}}"));
/// assert!(!is_valid_string(""));
/// assert!(!is_valid_string("   "));
/// ```
#[must_use]
pub fn is_valid_string(text: &str) -> bool {
    if text.chars().count() < 2 {
        return false;
    }
    if !text.chars().any(|c| c.is_ascii_alphanumeric()) {
        return false;
    }
    if text
        .chars()
        .all(|c| c.is_whitespace() || "{}[]()".contains(c))
    {
        return false;
    }
    !is_artefact(text)
}

/// Convert raw record bytes to text: trailing NULs dropped, each byte mapped to one `char`.
#[must_use]
pub fn bytes_to_text(bytes: &[u8]) -> String {
    let end = bytes
        .iter()
        .rposition(|&b| b != 0)
        .map_or(0, |last| last + 1);
    bytes[..end].iter().map(|&b| char::from(b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_strings() {
        assert!(is_valid_string("dict_name"));
        assert!(is_valid_string("c:PDI"));
        assert!(is_valid_string("Continue? [y/N]:"));
        assert!(is_valid_string("42"));
    }

    #[test]
    fn invalid_strings() {
        assert!(!is_valid_string("}}}}"));
        assert!(!is_valid_string(""));
        assert!(!is_valid_string("   "));
        assert!(!is_valid_string("a"));
        assert!(!is_valid_string("(( ))"));
        assert!(!is_valid_string("--==--"));
        assert!(!is_valid_string("ab|||cd"));
        assert!(!is_valid_string("x~~~y"));
    }

    #[test]
    fn brace_runs_are_symmetric() {
        assert!(!is_valid_string("ab}}}cd"));
        assert!(!is_valid_string("ab{{{cd"));
        assert!(is_valid_string("ab}}cd"));
        assert!(is_valid_string("ab{{cd"));
    }

    #[test]
    fn ratio() {
        assert_eq!(printable_ratio(b""), 0.0);
        assert_eq!(printable_ratio(b"abcd"), 1.0);
        assert!((printable_ratio(&[b'a', 0, b'b', 0]) - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn text_conversion() {
        assert_eq!(bytes_to_text(b"hello\0\0"), "hello");
        assert_eq!(bytes_to_text(b"\0"), "");
        assert_eq!(bytes_to_text(&[b'a', 0x01, b'b']), "a\u{1}b");
    }
}
