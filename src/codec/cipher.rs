//! Keyed substitution cipher used by some FAS4 writers instead of compression.

/// Advance the rolling key.
#[inline]
#[must_use]
pub fn next_key(key: u8) -> u8 {
    key.wrapping_mul(13).wrapping_add(7)
}

/// Apply the cipher starting at `start_key`.
///
/// Each output byte is the input byte XORed with the current key, after which the key
/// becomes `(key * 13 + 7) mod 256`. The transform is its own inverse.
///
/// # Examples
///
/// ```rust
/// use fasscope::codec::apply_keyed_cipher;
///
/// let encoded = apply_keyed_cipher(b"setq", 0x55);
/// assert_eq!(apply_keyed_cipher(&encoded, 0x55), b"setq");
/// ```
#[must_use]
pub fn apply_keyed_cipher(data: &[u8], start_key: u8) -> Vec<u8> {
    let mut key = start_key;
    data.iter()
        .map(|&byte| {
            let out = byte ^ key;
            key = next_key(key);
            out
        })
        .collect()
}
