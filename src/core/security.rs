use argon2::{password_hash::SaltString, Argon2, PasswordHasher};
use rand::rngs::OsRng;
use thiserror::Error;

const ARGON2_MEMORY_KIB: u32 = 19_456;
const ARGON2_TIME: u32 = 2;
const ARGON2_PARALLELISM: u32 = 1;

#[derive(Debug, Error)]
pub(crate) enum SecurityError {
    #[error("password hashing failed")]
    Hashing,
}

fn hasher() -> Result<Argon2<'static>, argon2::Error> {
    let params = argon2::Params::new(ARGON2_MEMORY_KIB, ARGON2_TIME, ARGON2_PARALLELISM, None)?;
    Ok(Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params))
}

/// Hashes a student login password for storage.
pub(crate) fn hash_password(password: &str) -> Result<String, SecurityError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = hasher().map_err(|_| SecurityError::Hashing)?;

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| SecurityError::Hashing)?
        .to_string();

    Ok(hash)
}

/// Compares a presented API key with the configured one without short-circuiting
/// on the first differing byte.
pub(crate) fn keys_match(presented: &str, expected: &str) -> bool {
    let presented = presented.as_bytes();
    let expected = expected.as_bytes();
    if presented.len() != expected.len() {
        return false;
    }
    presented.iter().zip(expected).fold(0u8, |acc, (a, b)| acc | (a ^ b)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use argon2::{PasswordHash, PasswordVerifier};

    fn verify_password(password: &str, hash: &str) -> bool {
        let parsed = PasswordHash::new(hash).expect("parse hash");
        hasher().expect("hasher").verify_password(password.as_bytes(), &parsed).is_ok()
    }

    #[test]
    fn password_hash_roundtrip() {
        let hash = hash_password("student-pass-01").expect("hash");
        assert!(verify_password("student-pass-01", &hash));
        assert!(!verify_password("wrong-password", &hash));
    }

    #[test]
    fn keys_match_requires_exact_key() {
        assert!(keys_match("service-key", "service-key"));
        assert!(!keys_match("service-kez", "service-key"));
        assert!(!keys_match("service", "service-key"));
        assert!(!keys_match("", "service-key"));
    }
}
