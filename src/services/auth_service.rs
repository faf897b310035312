// src/services/auth_service.rs

//! Password hashing/verification and bearer-token issue/validation.

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::models::User;
use argon2::{
  password_hash::{
    rand_core::OsRng, // For generating random salts
    PasswordHash,
    PasswordHasher,   // The main trait for hashing
    PasswordVerifier, // The main trait for verifying
    SaltString,
  },
  Argon2, // The Argon2 algorithm instance
};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, error, instrument, warn};
use uuid::Uuid;

/// Claims carried by a session token. `sub` is the identity claim (the
/// account's email); `uid` is carried alongside so authenticated handlers
/// never need a user lookup just to know who is calling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
  pub sub: String,
  pub uid: Uuid,
  pub iat: u64,
  pub exp: u64,
}

/// Hashes a plain-text password using Argon2.
///
/// Returns the PHC-format hash string, or an `AppError` if hashing fails or
/// the password is empty.
#[instrument(name = "auth_service::hash_password", skip(password), err(Display))]
pub fn hash_password(password: &str) -> Result<String, AppError> {
  if password.is_empty() {
    return Err(AppError::Validation(
      "Password cannot be empty for hashing.".to_string(),
    ));
  }

  let salt = SaltString::generate(&mut OsRng); // Cryptographically secure random salt
  let argon2_hasher = Argon2::default(); // Default Argon2 parameters (recommended)

  match argon2_hasher.hash_password(password.as_bytes(), &salt) {
    Ok(password_hash_obj) => {
      debug!("Password hashed successfully.");
      Ok(password_hash_obj.to_string())
    }
    Err(argon_err) => {
      error!(error = %argon_err, "Argon2 password hashing failed.");
      Err(AppError::Internal(format!(
        "Password hashing process failed: {}",
        argon_err
      )))
    }
  }
}

/// Verifies a plain-text password against a stored Argon2 hash.
///
/// Returns `Ok(true)` if the password matches, `Ok(false)` otherwise.
/// An `AppError` means the stored hash was malformed or verification itself
/// failed, not that the password was wrong.
#[instrument(name = "auth_service::verify_password", skip(hashed_password_str, provided_password), err(Display))]
pub fn verify_password(hashed_password_str: &str, provided_password: &str) -> Result<bool, AppError> {
  if hashed_password_str.is_empty() || provided_password.is_empty() {
    return Err(AppError::Auth("Password verification input was empty.".to_string()));
  }

  let parsed_hash = match PasswordHash::new(hashed_password_str) {
    Ok(ph) => ph,
    Err(parse_err) => {
      error!(error = %parse_err, "Failed to parse stored password hash string.");
      return Err(AppError::Internal(format!(
        "Invalid stored password hash format: {}",
        parse_err
      )));
    }
  };

  match Argon2::default().verify_password(provided_password.as_bytes(), &parsed_hash) {
    Ok(()) => Ok(true),
    Err(argon2::password_hash::Error::Password) => {
      debug!("Password verification failed: Passwords do not match.");
      Ok(false)
    }
    Err(other_argon_err) => {
      error!(error = %other_argon_err, "Argon2 password verification process encountered an error.");
      Err(AppError::Internal(format!(
        "Password verification process failed: {}",
        other_argon_err
      )))
    }
  }
}

/// Issue a signed HS256 session token for the given user.
#[instrument(name = "auth_service::issue_token", skip(user, config), fields(user_id = %user.id))]
pub fn issue_token(user: &User, config: &AppConfig) -> Result<String, AppError> {
  let now = SystemTime::now()
    .duration_since(UNIX_EPOCH)
    .map_err(|e| AppError::Internal(format!("system clock error: {e}")))?
    .as_secs();

  let claims = Claims {
    sub: user.email.clone(),
    uid: user.id,
    iat: now,
    exp: now + config.token_ttl_secs,
  };

  encode(
    &Header::new(Algorithm::HS256),
    &claims,
    &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
  )
  .map_err(|e| AppError::Internal(format!("failed to sign session token: {e}")))
}

/// Validate a session token's signature and expiry, returning its claims.
///
/// Every failure maps to `AppError::Auth` so the caller cannot distinguish a
/// forged token from an expired one.
pub fn validate_token(token: &str, jwt_secret: &str) -> Result<Claims, AppError> {
  let validation = Validation::new(Algorithm::HS256);

  let token_data = decode::<Claims>(
    token,
    &DecodingKey::from_secret(jwt_secret.as_bytes()),
    &validation,
  )
  .map_err(|e| {
    let msg = match e.kind() {
      jsonwebtoken::errors::ErrorKind::ExpiredSignature => "Session token has expired.",
      _ => "Invalid session token.",
    };
    warn!(error = %e, "Session token validation failed");
    AppError::Auth(msg.to_string())
  })?;

  debug!(sub = %token_data.claims.sub, "Session token validated");
  Ok(token_data.claims)
}
