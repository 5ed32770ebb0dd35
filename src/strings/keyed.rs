//! Keyed-transform strategy.
//!
//! Every single-byte XOR key is applied to the whole buffer and the printable-run scan is
//! repeated on the result. Only runs that are exactly one of the configured interpreter
//! keywords are kept, which keeps the false-positive rate of 256 blind transforms low.
//! Keys are independent and run on the worker pool; results are gathered in key order.

use std::time::Instant;

use rayon::prelude::*;

use crate::{
    config::ResolverConfig,
    strings::{ascii::printable_runs, StringCandidate, Strategy},
};

/// Result of the 256-key search.
#[derive(Debug, Default)]
pub(crate) struct KeyedOutcome {
    pub candidates: Vec<StringCandidate>,
    /// At least one key ran past the wall-clock budget; `candidates` is empty then.
    pub timed_out: bool,
}

fn scan_key(
    buffer: &[u8],
    key: u8,
    min_run: usize,
    config: &ResolverConfig,
    started: Instant,
) -> Option<Vec<StringCandidate>> {
    if started.elapsed() >= config.keyed_budget {
        return None;
    }

    let transformed: Vec<u8> = buffer.iter().map(|byte| byte ^ key).collect();
    let hits = printable_runs(&transformed, min_run)
        .into_iter()
        .filter_map(|(offset, run)| {
            config
                .keywords
                .iter()
                .find(|keyword| keyword.as_bytes() == run)
                .map(|keyword| {
                    StringCandidate::new(offset, keyword.clone(), Strategy::KeyedTransform, 100)
                })
        })
        .collect();

    Some(hits)
}

/// Try all 256 keys against `buffer`.
///
/// Must be called inside the worker pool the caller wants to use.
pub(crate) fn scan(buffer: &[u8], config: &ResolverConfig) -> KeyedOutcome {
    if config.keywords.is_empty() || buffer.is_empty() {
        return KeyedOutcome::default();
    }

    // Runs only have to be long enough for the shortest keyword to match.
    let min_run = config
        .keywords
        .iter()
        .map(String::len)
        .min()
        .map_or(config.ascii_min_run, |shortest| {
            shortest.clamp(1, config.ascii_min_run.max(1))
        });

    let started = Instant::now();
    let per_key: Vec<Option<Vec<StringCandidate>>> = (0..=u8::MAX)
        .into_par_iter()
        .map(|key| scan_key(buffer, key, min_run, config, started))
        .collect();

    if per_key.iter().any(Option::is_none) {
        return KeyedOutcome {
            candidates: Vec::new(),
            timed_out: true,
        };
    }

    let candidates: Vec<StringCandidate> = per_key.into_iter().flatten().flatten().collect();
    log::debug!("keyed-transform scan: {} keyword hits", candidates.len());

    KeyedOutcome {
        candidates,
        timed_out: false,
    }
}
