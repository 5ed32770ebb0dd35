//! Pointer-table strategy.
//!
//! The first dword of a buffer is read as the offset of a record table. Each record is
//! `index:u32 length:u32 bytes[length]`, and the walk stops at the first record that does
//! not conform.

use crate::{
    config::ResolverConfig,
    file::{io::read_le, parser::Parser},
    strings::{bytes_to_text, is_valid_string, printable_ratio, StringCandidate, Strategy},
    Result,
};

struct Record<'a> {
    index: u32,
    bytes: &'a [u8],
}

fn read_record<'a>(parser: &mut Parser<'a>, config: &ResolverConfig) -> Result<Option<Record<'a>>> {
    parser.transactional(|parser| {
        let index = parser.read_le::<u32>()?;
        let length = parser.read_le::<u32>()? as usize;
        if length == 0 || length > config.max_string_len {
            return Ok(None);
        }

        let bytes = parser.read_bytes(length)?;
        if printable_ratio(bytes) < config.pointer_min_printable {
            return Ok(None);
        }

        Ok(Some(Record { index, bytes }))
    })
}

/// Walk the record table referenced by the first dword of `buffer`.
///
/// Candidates are keyed by the record index, not by byte offset.
pub(crate) fn scan(buffer: &[u8], config: &ResolverConfig) -> Vec<StringCandidate> {
    let Ok(table_offset) = read_le::<u32>(buffer) else {
        return Vec::new();
    };
    let table_offset = table_offset as usize;
    if table_offset == 0 || table_offset >= buffer.len() {
        return Vec::new();
    }

    let mut parser = Parser::new(buffer);
    if parser.seek(table_offset).is_err() {
        return Vec::new();
    }

    let mut candidates = Vec::new();
    for _ in 0..config.pointer_max_records {
        let record = match read_record(&mut parser, config) {
            Ok(Some(record)) => record,
            Ok(None) | Err(_) => break,
        };

        let text = bytes_to_text(record.bytes);
        if is_valid_string(&text) {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let score = (printable_ratio(record.bytes) * 100.0).round() as u32;
            candidates.push(StringCandidate::new(
                record.index as usize,
                text,
                Strategy::PointerTable,
                score,
            ));
        }
    }

    log::debug!(
        "pointer table at {:#x}: {} records",
        table_offset,
        candidates.len()
    );
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(index: u32, text: &[u8]) -> Vec<u8> {
        let mut out = index.to_le_bytes().to_vec();
        out.extend_from_slice(&(text.len() as u32).to_le_bytes());
        out.extend_from_slice(text);
        out
    }

    #[test]
    fn single_record() {
        let mut buffer = 8u32.to_le_bytes().to_vec();
        buffer.extend_from_slice(&[0xEE; 4]);
        buffer.extend(record(7, b"hello"));

        let candidates = scan(&buffer, &ResolverConfig::default());
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].offset, 7);
        assert_eq!(candidates[0].text, "hello");
        assert_eq!(candidates[0].strategy, Strategy::PointerTable);
        assert_eq!(candidates[0].score, 100);
    }

    #[test]
    fn stops_at_first_bad_record() {
        let mut buffer = 4u32.to_le_bytes().to_vec();
        buffer.extend(record(1, b"first"));
        buffer.extend(record(2, &[0x01, 0x02, 0x03, 0x04]));
        buffer.extend(record(3, b"third"));

        let candidates = scan(&buffer, &ResolverConfig::default());
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].text, "first");
    }

    #[test]
    fn rejects_out_of_range_offsets() {
        let config = ResolverConfig::default();
        assert!(scan(&[0, 0, 0, 0, b'a', b'b'], &config).is_empty());
        assert!(scan(&[0xFF, 0, 0, 0, b'a', b'b'], &config).is_empty());
        assert!(scan(&[1, 0], &config).is_empty());
    }

    #[test]
    fn loop_guard() {
        let mut buffer = 4u32.to_le_bytes().to_vec();
        for index in 0..10 {
            buffer.extend(record(index, b"name"));
        }
        let config = ResolverConfig {
            pointer_max_records: 3,
            ..ResolverConfig::default()
        };
        assert_eq!(scan(&buffer, &config).len(), 3);
    }
}
