//! Session token generation and encoding.

pub mod codec;
pub mod generator;

pub use codec::{TOKEN_ALPHABET, encode_token, encoded_len};
pub use generator::{TOKEN_RANDOM_BYTES, generate_random_bytes, generate_token};
