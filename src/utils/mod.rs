//! Small shared helpers.

mod pool;

pub(crate) use pool::with_worker_pool;

/// Position of the first occurrence of `needle` in `haystack`.
///
/// An empty needle never matches.
#[must_use]
pub fn find_bytes(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
