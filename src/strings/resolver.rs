use crate::{
    config::ResolverConfig,
    strings::{ascii, keyed, pointer, prefixed, StringCandidate, StringTable, Strategy},
    utils::with_worker_pool,
};

/// Outcome of one string recovery run.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Merged table.
    pub table: StringTable,
    /// Candidate count per strategy, before merging.
    pub candidate_counts: [(Strategy, usize); 4],
    /// The keyed-transform scan was not run because of earlier hits.
    pub keyed_not_needed: bool,
    /// The keyed-transform scan ran out of its wall-clock budget and was dropped.
    pub keyed_timed_out: bool,
}

/// Runs all extraction strategies over a buffer and merges their results.
///
/// # Examples
///
/// ```rust
/// use fasscope::{config::ResolverConfig, strings::StringTableResolver};
///
/// let mut buffer = 8u32.to_le_bytes().to_vec();
/// buffer.extend_from_slice(&[0xEE; 4]);
/// buffer.extend_from_slice(&7u32.to_le_bytes());
/// buffer.extend_from_slice(&5u32.to_le_bytes());
/// buffer.extend_from_slice(b"hello");
///
/// let resolution = StringTableResolver::new(ResolverConfig::default(), 1).resolve(&buffer);
/// assert_eq!(resolution.table.get(7), Some("hello"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct StringTableResolver {
    config: ResolverConfig,
    workers: usize,
}

impl StringTableResolver {
    /// Create a resolver running the keyed-transform search on `workers` threads
    /// (0 = one per core).
    #[must_use]
    pub fn new(config: ResolverConfig, workers: usize) -> Self {
        StringTableResolver { config, workers }
    }

    /// Recover the string table of `buffer`.
    ///
    /// Strategies never fail: a strategy that finds nothing contributes no candidates.
    #[must_use]
    pub fn resolve(&self, buffer: &[u8]) -> Resolution {
        let pointer = pointer::scan(buffer, &self.config);
        let prefixed = prefixed::scan(buffer, &self.config);
        let embedded = ascii::scan(buffer, self.config.ascii_min_run);

        let structured = pointer.len() + prefixed.len();
        let keyed_not_needed = self
            .config
            .keyed_skip_threshold
            .is_some_and(|threshold| structured >= threshold);

        let (keyed, keyed_timed_out) = if keyed_not_needed {
            log::debug!("keyed-transform scan skipped, {structured} structured candidates");
            (Vec::new(), false)
        } else {
            let outcome = with_worker_pool(self.workers, || keyed::scan(buffer, &self.config));
            (outcome.candidates, outcome.timed_out)
        };

        let candidate_counts = [
            (Strategy::PointerTable, pointer.len()),
            (Strategy::LengthPrefixed, prefixed.len()),
            (Strategy::EmbeddedAscii, embedded.len()),
            (Strategy::KeyedTransform, keyed.len()),
        ];

        let all: Vec<StringCandidate> = pointer
            .into_iter()
            .chain(prefixed)
            .chain(embedded)
            .chain(keyed)
            .collect();
        let table = StringTable::from_candidates(all);

        log::debug!(
            "string table: {} entries from {:?}",
            table.len(),
            candidate_counts
        );

        Resolution {
            table,
            candidate_counts,
            keyed_not_needed,
            keyed_timed_out,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn length_prefixed_record_at_start_offset() {
        let mut buffer = vec![0u8; 32];
        buffer.extend_from_slice(&[0x05, b'h', b'e', b'l', b'l', b'o']);
        buffer.extend_from_slice(&[0u8; 32]);

        let resolution = StringTableResolver::new(ResolverConfig::default(), 1).resolve(&buffer);
        assert_eq!(resolution.table.get(32), Some("hello"));
        assert_eq!(
            resolution.table.entry(32).map(|e| e.strategy),
            Some(Strategy::LengthPrefixed)
        );
    }

    #[test]
    fn keyed_scan_skipped_when_structured_hits_suffice() {
        let mut buffer = Vec::new();
        for name in ["alpha", "bravo", "charlie"] {
            buffer.push(0);
            buffer.push(name.len() as u8);
            buffer.extend_from_slice(name.as_bytes());
        }
        let config = ResolverConfig {
            keyed_skip_threshold: Some(3),
            ..ResolverConfig::default()
        };
        let resolution = StringTableResolver::new(config, 1).resolve(&buffer);
        assert!(resolution.keyed_not_needed);
        assert!(!resolution.keyed_timed_out);
        assert!(resolution.table.contains_text("charlie"));
    }

    #[test]
    fn keyed_timeout_is_reported() {
        let config = ResolverConfig {
            keyed_skip_threshold: None,
            keyed_budget: Duration::ZERO,
            ..ResolverConfig::default()
        };
        let resolution = StringTableResolver::new(config, 2).resolve(b"\x01\x02\x03\x04");
        assert!(resolution.keyed_timed_out);
        assert_eq!(resolution.candidate_counts[3], (Strategy::KeyedTransform, 0));
    }

    #[test]
    fn worker_count_does_not_change_table() {
        let mut buffer: Vec<u8> = (0u8..=255).collect();
        buffer.extend(b"princ".iter().map(|b| b ^ 0x33));
        buffer.extend_from_slice(&[0x04, b'c', b':', b'g', b'o']);
        buffer.extend_from_slice(b"\x00strcat\x00");

        let config = ResolverConfig {
            keyed_skip_threshold: None,
            keyed_budget: Duration::from_secs(60),
            ..ResolverConfig::default()
        };
        let sequential = StringTableResolver::new(config.clone(), 1).resolve(&buffer);
        let parallel = StringTableResolver::new(config, 4).resolve(&buffer);
        assert_eq!(sequential.table, parallel.table);
    }
}
