use crate::error::{AppError, Result};
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, ParamsBuilder,
};
use rand::RngCore;
use rand::rngs::OsRng;
use std::sync::LazyLock;
use zeroize::Zeroize;

/// The memory cost for Argon2 in MB.
const ARGON2_MEMORY_MB: u32 = 19;
/// The number of iterations for Argon2.
const ARGON2_ITERATIONS: u32 = 3;
/// The parallelism factor for Argon2.
const ARGON2_PARALLELISM: u32 = 1;

/// Hash checked when a login names an unknown email, so both failure paths
/// run one verification.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password_blocking("jobboard-dummy-password").ok());

/// Builds the dummy hash now so the first unknown-email login costs the same
/// as any other. Returns whether the hash is available.
pub fn prime_dummy_hash() -> bool {
    DUMMY_HASH.is_some()
}

/// Hashes a password using Argon2id with a fresh random salt.
fn hash_password_blocking(password: &str) -> Result<String> {
    let mut password_bytes = password.as_bytes().to_vec();

    let mut salt_bytes = [0u8; 16];
    OsRng
        .try_fill_bytes(&mut salt_bytes)
        .map_err(|e| AppError::Internal(format!("Failed to generate salt: {}", e)))?;

    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| AppError::Internal(format!("Salt encoding error: {}", e)))?;

    let argon2 = Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        ParamsBuilder::new()
            .m_cost(ARGON2_MEMORY_MB * 1024)
            .t_cost(ARGON2_ITERATIONS)
            .p_cost(ARGON2_PARALLELISM)
            .build()
            .map_err(|e| AppError::Internal(format!("Argon2 params: {}", e)))?,
    );

    let password_hash = argon2
        .hash_password(&password_bytes, &salt)
        .map_err(|e| AppError::Internal(format!("Argon2 hash error: {}", e)))?
        .to_string();

    password_bytes.zeroize();
    Ok(password_hash)
}

/// Verifies a password against a stored PHC hash string.
fn verify_password_blocking(password: &str, hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(format!("Hash parse error: {}", e)))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Hashes `password` on the blocking thread pool.
pub async fn hash_password(password: String) -> Result<String> {
    let mut password = password;
    let hashed = tokio::task::spawn_blocking(move || {
        let hashed = hash_password_blocking(&password);
        password.zeroize();
        hashed
    })
    .await
    .map_err(|e| AppError::Internal(format!("Hashing task failed: {}", e)))??;

    tracing::debug!("Password hashed successfully with Argon2");
    Ok(hashed)
}

/// Verifies `password` against `hash` on the blocking thread pool.
///
/// With `hash == None` (unknown account) a dummy hash is checked instead and
/// the result is always `false`.
pub async fn verify_password(password: String, hash: Option<String>) -> Result<bool> {
    let mut password = password;
    tokio::task::spawn_blocking(move || {
        let verdict = match hash {
            Some(hash) => verify_password_blocking(&password, &hash),
            None => {
                if let Some(dummy) = DUMMY_HASH.as_deref() {
                    let _ = verify_password_blocking(&password, dummy);
                }
                Ok(false)
            }
        };
        password.zeroize();
        verdict
    })
    .await
    .map_err(|e| AppError::Internal(format!("Verification task failed: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_and_verify() {
        let hash = hash_password("secret1".to_string()).await.unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("secret1".to_string(), Some(hash)).await.unwrap());
    }

    #[tokio::test]
    async fn any_single_character_mutation_fails() {
        let password = "secret1";
        let hash = hash_password(password.to_string()).await.unwrap();

        for (i, _) in password.char_indices() {
            let mut mutated: Vec<char> = password.chars().collect();
            mutated[i] = if mutated[i] == 'x' { 'y' } else { 'x' };
            let mutated: String = mutated.into_iter().collect();
            assert!(
                !verify_password(mutated.clone(), Some(hash.clone())).await.unwrap(),
                "{} should not verify",
                mutated
            );
        }
    }

    #[tokio::test]
    async fn same_password_gets_distinct_salts() {
        let a = hash_password("secret1".to_string()).await.unwrap();
        let b = hash_password("secret1".to_string()).await.unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn dummy_hash_is_a_valid_argon2id_hash() {
        assert!(prime_dummy_hash());
        let dummy = DUMMY_HASH.as_deref().unwrap();
        assert!(dummy.starts_with("$argon2id$"));
        assert!(PasswordHash::new(dummy).is_ok());
    }

    #[tokio::test]
    async fn unknown_account_never_verifies() {
        assert!(!verify_password("secret1".to_string(), None).await.unwrap());
    }

    #[tokio::test]
    async fn malformed_hash_is_an_error() {
        assert!(verify_password("secret1".to_string(), Some("not-a-hash".to_string()))
            .await
            .is_err());
    }
}
