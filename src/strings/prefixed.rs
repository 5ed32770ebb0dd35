//! Length-prefixed strategy: every offset is tried as a 1-byte and as a 2-byte length prefix.

use crate::{
    config::ResolverConfig,
    file::io::read_le_at_width,
    strings::{bytes_to_text, is_valid_string, printable_ratio, StringCandidate, Strategy},
};

const PREFIX_WIDTHS: [usize; 2] = [1, 2];

fn try_prefix(
    buffer: &[u8],
    offset: usize,
    width: usize,
    config: &ResolverConfig,
) -> Option<StringCandidate> {
    let mut cursor = offset;
    let length = read_le_at_width(buffer, &mut cursor, width).ok()? as usize;
    if length < 2 || length > config.max_string_len {
        return None;
    }

    let bytes = buffer.get(cursor..cursor.checked_add(length)?)?;
    let ratio = printable_ratio(bytes);
    if ratio < config.prefixed_min_printable || !bytes.iter().any(u8::is_ascii_alphabetic) {
        return None;
    }

    let text = bytes_to_text(bytes);
    if !is_valid_string(&text) {
        return None;
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let score = (ratio * 100.0).round() as u32;
    Some(StringCandidate::new(
        offset,
        text,
        Strategy::LengthPrefixed,
        score,
    ))
}

/// Scan every offset of `buffer`. Candidates are keyed by the offset of the prefix.
pub(crate) fn scan(buffer: &[u8], config: &ResolverConfig) -> Vec<StringCandidate> {
    let candidates: Vec<StringCandidate> = (0..buffer.len())
        .flat_map(|offset| {
            PREFIX_WIDTHS
                .iter()
                .filter_map(move |&width| try_prefix(buffer, offset, width, config))
        })
        .collect();

    log::debug!("length-prefixed scan: {} candidates", candidates.len());
    candidates
}
