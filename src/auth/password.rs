//! bcrypt hashing, run on the blocking pool so request workers stay free.

use crate::services::ServiceError;

pub const MIN_PASSWORD_LENGTH: usize = 6;

pub async fn hash_password(plain: &str) -> Result<String, ServiceError> {
    let plain = plain.to_owned();
    tokio::task::spawn_blocking(move || bcrypt::hash(plain, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| ServiceError::Password(e.to_string()))?
        .map_err(|e| ServiceError::Password(e.to_string()))
}

/// Malformed hashes count as a mismatch
pub async fn verify_password(plain: &str, hash: &str) -> Result<bool, ServiceError> {
    let plain = plain.to_owned();
    let hash = hash.to_owned();
    let verified = tokio::task::spawn_blocking(move || bcrypt::verify(plain, &hash))
        .await
        .map_err(|e| ServiceError::Password(e.to_string()))?;

    match verified {
        Ok(matches) => Ok(matches),
        Err(e) => {
            tracing::warn!("Stored password hash could not be verified: {}", e);
            Ok(false)
        }
    }
}
