//! Printable rendering of arbitrary bytes for session tokens.
//!
//! Bytes are packed little-endian six bits at a time into the alphabet
//! `./0-9A-Za-z`, which is safe in cookies and URLs without escaping.
//! The encoding is never decoded; it only has to be total and
//! deterministic.

/// The 64-symbol output alphabet. The index of a symbol is its 6-bit value.
pub const TOKEN_ALPHABET: &[u8; 64] =
    b"./0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Number of characters [`encode_token`] produces for `len` input bytes.
pub const fn encoded_len(len: usize) -> usize {
    let tail = match len % 3 {
        0 => 0,
        1 => 2,
        _ => 3,
    };
    (len / 3) * 4 + tail
}

/// Encode `src` over [`TOKEN_ALPHABET`].
///
/// Each 3-byte group becomes 4 characters. A trailing 2-byte remainder
/// becomes 3 characters and a trailing single byte becomes 2. Empty input
/// yields an empty string.
pub fn encode_token(src: &[u8]) -> String {
    let mut out = String::with_capacity(encoded_len(src.len()));
    let mut push = |v: u8| out.push(TOKEN_ALPHABET[(v & 0x3f) as usize] as char);

    let mut groups = src.chunks_exact(3);
    for group in &mut groups {
        let (b0, b1, b2) = (group[0], group[1], group[2]);
        push(b0);
        push((b0 >> 6) | (b1 << 2));
        push((b1 >> 4) | (b2 << 4));
        push(b2 >> 2);
    }

    match *groups.remainder() {
        [b0, b1] => {
            push(b0);
            push((b0 >> 6) | (b1 << 2));
            push(b1 >> 4);
        }
        [b0] => {
            push(b0);
            push(b0 >> 6);
        }
        _ => {}
    }

    out
}
