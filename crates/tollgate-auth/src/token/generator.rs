//! Cryptographically random session tokens.

use tollgate_core::error::{AppError, ErrorKind};

use super::codec::encode_token;

/// Number of random bytes drawn for every session token.
pub const TOKEN_RANDOM_BYTES: usize = 64;

/// Draw `n` bytes from the operating system CSPRNG.
///
/// Fails with [`ErrorKind::EntropyUnavailable`] when the OS source cannot
/// supply randomness. There is no fallback source.
pub fn generate_random_bytes(n: usize) -> Result<Vec<u8>, AppError> {
    let mut buf = vec![0u8; n];
    getrandom::getrandom(&mut buf).map_err(|e| {
        AppError::with_source(
            ErrorKind::EntropyUnavailable,
            "Operating system random source failed",
            e,
        )
    })?;
    Ok(buf)
}

/// Mint a session token for `username`.
///
/// The username is appended after the random bytes before encoding. It is
/// never recovered from the token; sessions are looked up by the
/// `(tier, username, token)` triple.
pub fn generate_token(username: &str) -> Result<String, AppError> {
    let mut material = generate_random_bytes(TOKEN_RANDOM_BYTES)?;
    material.extend_from_slice(username.as_bytes());
    Ok(encode_token(&material))
}
