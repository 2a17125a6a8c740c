//! Argon2id password hashing and verification.

use std::sync::Arc;
#[cfg(test)]
use std::sync::atomic::{AtomicUsize, Ordering};

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher as ArgonHasher, PasswordVerifier, SaltString},
};
use tracing::debug;

use tollgate_core::error::AppError;

use crate::token::generate_random_bytes;

const SALT_BYTES: usize = 16;

/// Hashes and verifies passwords using Argon2id.
///
/// Verification reads the cost parameters from the stored PHC string, so
/// hashes produced with older parameters keep verifying after a change.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: Params,
    /// Hash of a fixed input under `params`, verified against when no
    /// account hash exists. Shared by clones.
    placeholder: Option<Arc<str>>,
    #[cfg(test)]
    verifications: Arc<AtomicUsize>,
}

impl PasswordHasher {
    /// Creates a hasher with the Argon2 default cost parameters.
    pub fn new() -> Self {
        Self::with_params(Params::default())
    }

    /// Creates a hasher with explicit cost parameters.
    pub fn with_params(params: Params) -> Self {
        let placeholder = placeholder_hash(&params).map(Arc::from);
        Self {
            params,
            placeholder,
            #[cfg(test)]
            verifications: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn argon2(&self) -> Argon2<'static> {
        argon2id(&self.params)
    }

    /// Hashes a plaintext password with a fresh random salt.
    pub fn hash_password(&self, password: &str) -> Result<String, AppError> {
        let salt_bytes = generate_random_bytes(SALT_BYTES)?;
        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(|e| AppError::internal(format!("Salt encoding failed: {e}")))?;

        let hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;

        Ok(hash.to_string())
    }

    /// Verifies a plaintext password against a stored hash.
    ///
    /// Returns `false` for a mismatch and for a malformed hash alike; the
    /// caller learns nothing beyond the outcome.
    pub fn verify_password(&self, password: &str, hash: &str) -> bool {
        #[cfg(test)]
        self.verifications.fetch_add(1, Ordering::SeqCst);

        let parsed = match PasswordHash::new(hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!(error = %e, "Stored password hash is malformed");
                return false;
            }
        };

        match self.argon2().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => true,
            Err(argon2::password_hash::Error::Password) => false,
            Err(e) => {
                debug!(error = %e, "Password verification failed");
                false
            }
        }
    }

    /// Spends the work of one verification when there is no stored hash.
    ///
    /// Always `false`. Unknown and ineligible accounts then cost as much
    /// as a wrong password.
    pub fn verify_placeholder(&self, password: &str) -> bool {
        match self.placeholder.as_deref() {
            Some(hash) => {
                self.verify_password(password, hash);
            }
            None => debug!("Placeholder hash unavailable"),
        }
        false
    }

    /// Number of verifications performed by this hasher and its clones.
    #[cfg(test)]
    pub(crate) fn verification_count(&self) -> usize {
        self.verifications.load(Ordering::SeqCst)
    }
}

fn argon2id(params: &Params) -> Argon2<'static> {
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params.clone())
}

/// Hash of a fixed input with a zero salt under `params`.
fn placeholder_hash(params: &Params) -> Option<String> {
    let salt = SaltString::encode_b64(&[0u8; SALT_BYTES]).ok()?;
    let hash = argon2id(params)
        .hash_password(b"tollgate-placeholder", &salt)
        .ok()?;
    Some(hash.to_string())
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
pub(crate) fn fast_hasher() -> PasswordHasher {
    PasswordHasher::with_params(Params::new(Params::MIN_M_COST, 1, 1, None).unwrap())
}
