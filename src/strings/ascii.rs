//! Embedded-ASCII strategy: maximal runs of printable bytes.

use crate::strings::{bytes_to_text, is_printable, is_valid_string, StringCandidate, Strategy};

/// Maximal printable runs of at least `min_run` bytes, as `(offset, bytes)`.
pub(crate) fn printable_runs(buffer: &[u8], min_run: usize) -> Vec<(usize, &[u8])> {
    let mut runs = Vec::new();
    let mut start = None;

    for (offset, &byte) in buffer.iter().enumerate() {
        match (is_printable(byte), start) {
            (true, None) => start = Some(offset),
            (false, Some(run_start)) => {
                if offset - run_start >= min_run {
                    runs.push((run_start, &buffer[run_start..offset]));
                }
                start = None;
            }
            _ => {}
        }
    }

    if let Some(run_start) = start {
        if buffer.len() - run_start >= min_run {
            runs.push((run_start, &buffer[run_start..]));
        }
    }

    runs
}

fn accept(run: &[u8]) -> Option<String> {
    if !run.iter().any(u8::is_ascii_alphanumeric) {
        return None;
    }
    let text = bytes_to_text(run);
    is_valid_string(&text).then_some(text)
}

/// Collect valid printable runs. Candidates are keyed by the run start.
pub(crate) fn scan(buffer: &[u8], min_run: usize) -> Vec<StringCandidate> {
    printable_runs(buffer, min_run)
        .into_iter()
        .filter_map(|(offset, run)| {
            accept(run).map(|text| StringCandidate::new(offset, text, Strategy::EmbeddedAscii, 100))
        })
        .collect()
}

/// Number of valid embedded strings in `buffer`.
///
/// Used as the structural plausibility signal of decoded payloads.
///
/// # Examples
///
/// ```rust
/// use fasscope::strings::count_embedded_strings;
///
/// assert_eq!(count_embedded_strings(b"\x00setq\x00\x01princ\x02}}}}\x00", 3), 2);
/// ```
#[must_use]
pub fn count_embedded_strings(buffer: &[u8], min_run: usize) -> usize {
    printable_runs(buffer, min_run)
        .into_iter()
        .filter(|(_, run)| accept(run).is_some())
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_are_maximal() {
        let runs = printable_runs(b"\x00abc\x01de\x02fghi", 3);
        assert_eq!(runs, vec![(1, &b"abc"[..]), (8, &b"fghi"[..])]);
    }

    #[test]
    fn scan_filters_artefacts() {
        let candidates = scan(b"\x00dict_name\x00{{{{\x00|||x\x00---\x00", 3);
        let texts: Vec<&str> = candidates.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["dict_name"]);
        assert_eq!(candidates[0].offset, 1);
    }

    #[test]
    fn plausibility_count() {
        assert_eq!(count_embedded_strings(b"abcd", 3), 1);
        assert_eq!(count_embedded_strings(&[0x01, 0x02, 0x03], 3), 0);
    }
}
