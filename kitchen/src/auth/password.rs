//! Password hashing and verification.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::config::PasswordConfig;
use crate::api::models::validation::REQUIRED;
use crate::errors::{Error, FieldErrors};

/// Argon2 hashing parameters.
#[derive(Debug, Clone, Copy)]
pub struct Argon2Params {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Argon2Params {
    fn to_argon2(self) -> Result<Argon2<'static>, Error> {
        let params = Params::new(self.memory_kib, self.iterations, self.parallelism, None).map_err(|e| Error::Internal {
            operation: format!("create argon2 params: {e}"),
        })?;

        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

impl Default for Argon2Params {
    /// Argon2id RFC recommendations
    fn default() -> Self {
        Self {
            memory_kib: 19456, // 19 MB
            iterations: 2,
            parallelism: 1,
        }
    }
}

impl From<&PasswordConfig> for Argon2Params {
    fn from(config: &PasswordConfig) -> Self {
        Self {
            memory_kib: config.argon2_memory_kib,
            iterations: config.argon2_iterations,
            parallelism: config.argon2_parallelism,
        }
    }
}

/// Hash a string using Argon2id.
///
/// Uses the provided parameters or secure defaults if None.
pub fn hash_string_with_params(input: &str, params: Option<Argon2Params>) -> Result<String, Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = params.unwrap_or_default().to_argon2()?;

    let hash = argon2.hash_password(input.as_bytes(), &salt).map_err(|e| Error::Internal {
        operation: format!("hash string: {e}"),
    })?;

    Ok(hash.to_string())
}

/// Hash a string using Argon2 with default secure parameters.
pub fn hash_string(input: &str) -> Result<String, Error> {
    hash_string_with_params(input, None)
}

/// Verify a string against a hash.
///
/// Note: Verification uses the parameters embedded in the hash itself.
pub fn verify_string(input: &str, hash: &str) -> Result<bool, Error> {
    let parsed_hash = PasswordHash::new(hash).map_err(|e| Error::Internal {
        operation: format!("parse hash: {e}"),
    })?;

    let argon2 = Argon2::default();
    Ok(argon2.verify_password(input.as_bytes(), &parsed_hash).is_ok())
}

/// Hash on a blocking thread so Argon2's memory-hard work stays off the async runtime.
pub async fn hash_password(password: String, config: &PasswordConfig) -> Result<String, Error> {
    let params = Argon2Params::from(config);
    tokio::task::spawn_blocking(move || hash_string_with_params(&password, Some(params)))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password hashing task: {e}"),
        })?
}

/// Verify on a blocking thread, see [`hash_password`].
pub async fn verify_password(password: String, hash: String) -> Result<bool, Error> {
    tokio::task::spawn_blocking(move || verify_string(&password, &hash))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password verification task: {e}"),
        })?
}

/// Check a new password and its confirmation against the configured length rules.
pub fn validate_new_password(password: &str, confirmation: &str, config: &PasswordConfig, errors: &mut FieldErrors) {
    let length = password.chars().count();
    if length == 0 {
        errors.add("password", REQUIRED);
    } else if length < config.min_length {
        errors.add(
            "password",
            format!("This password is too short. It must contain at least {} characters.", config.min_length),
        );
    } else if length > config.max_length {
        errors.add(
            "password",
            format!("This password is too long. It must contain at most {} characters.", config.max_length),
        );
    }

    if password != confirmation {
        errors.add("password_confirmation", "The two password fields didn't match.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Cheap parameters so the tests stay fast
    fn fast_params() -> Option<Argon2Params> {
        Some(Argon2Params {
            memory_kib: 128,
            iterations: 1,
            parallelism: 1,
        })
    }

    #[test]
    fn test_string_hashing() {
        let input = "test_password_123";
        let hash = hash_string_with_params(input, fast_params()).unwrap();

        assert!(!hash.is_empty());
        assert!(hash.starts_with("$argon2id$"));

        assert!(verify_string(input, &hash).unwrap());
        assert!(!verify_string("wrong_password", &hash).unwrap());
    }

    #[test]
    fn test_same_input_different_hashes() {
        let input = "same_password";

        let hash1 = hash_string_with_params(input, fast_params()).unwrap();
        let hash2 = hash_string_with_params(input, fast_params()).unwrap();

        // Salted, so the hashes differ but both verify
        assert_ne!(hash1, hash2);
        assert!(verify_string(input, &hash1).unwrap());
        assert!(verify_string(input, &hash2).unwrap());
    }

    #[test]
    fn test_default_params_hash_verifies() {
        let hash = hash_string("hunter22").unwrap();
        assert!(verify_string("hunter22", &hash).unwrap());
    }

    #[test]
    fn test_malformed_hash_is_internal_error() {
        assert!(matches!(verify_string("x", "not-a-phc-string"), Err(Error::Internal { .. })));
    }

    #[tokio::test]
    async fn test_blocking_helpers() {
        let config = PasswordConfig {
            argon2_memory_kib: 128,
            argon2_iterations: 1,
            ..Default::default()
        };

        let hash = hash_password("correct horse".to_string(), &config).await.unwrap();
        assert!(verify_password("correct horse".to_string(), hash.clone()).await.unwrap());
        assert!(!verify_password("battery staple".to_string(), hash).await.unwrap());
    }

    #[test]
    fn test_validate_new_password() {
        let config = PasswordConfig::default();

        let mut errors = FieldErrors::new();
        validate_new_password("long enough", "long enough", &config, &mut errors);
        assert!(errors.is_empty());

        let mut errors = FieldErrors::new();
        validate_new_password("short", "other", &config, &mut errors);
        assert!(errors.contains("password"));
        assert!(errors.contains("password_confirmation"));

        let mut errors = FieldErrors::new();
        let long = "x".repeat(config.max_length + 1);
        validate_new_password(&long, &long, &config, &mut errors);
        assert!(errors.contains("password"));

        let mut errors = FieldErrors::new();
        validate_new_password("", "", &config, &mut errors);
        assert_eq!(errors.get("password"), Some(&[REQUIRED.to_string()][..]));
    }
}
