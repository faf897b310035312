// src/web/handlers/auth_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::models::User;
use crate::services::auth_service;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

// --- Request DTOs ---

// Fields are optional so a missing one produces our own message instead of a
// deserializer error.
#[derive(Deserialize, Debug)]
pub struct RegisterRequestPayload {
  pub username: Option<String>,
  pub email: Option<String>,
  pub password: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct LoginRequestPayload {
  pub email: String,
  pub password: String,
}

// --- Handler Implementations ---

#[instrument(name = "handler::register", skip(app_state, req_payload))]
pub async fn register_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<RegisterRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = req_payload.into_inner();

  let username = payload.username.filter(|v| !v.trim().is_empty());
  let email = payload.email.filter(|v| !v.trim().is_empty());
  let password = payload.password.filter(|v| !v.trim().is_empty());
  let (username, email, password) = match (username, email, password) {
    (Some(u), Some(e), Some(p)) => (u, e, p),
    _ => {
      return Err(AppError::Validation(
        "username, email and password are all required.".to_string(),
      ))
    }
  };

  info!("Registration attempt for email: {}", email);

  let existing: Option<uuid::Uuid> = sqlx::query_scalar("SELECT id FROM users WHERE email = $1")
    .bind(&email)
    .fetch_optional(&app_state.db_pool)
    .await?;
  if existing.is_some() {
    warn!("Registration rejected, email {} is already taken.", email);
    return Err(AppError::Conflict("User is already registered.".to_string()));
  }

  let password_hash = auth_service::hash_password(&password)?;

  let user: User = sqlx::query_as(
    "INSERT INTO users (id, username, email, password_hash, created_at) \
     VALUES ($1, $2, $3, $4, NOW()) \
     RETURNING id, username, email, password_hash, created_at",
  )
  .bind(uuid::Uuid::new_v4())
  .bind(&username)
  .bind(&email)
  .bind(&password_hash)
  .fetch_one(&app_state.db_pool)
  .await
  .map_err(|e| {
    // Concurrent duplicate registration loses the race at the unique index.
    if is_unique_violation(&e) {
      AppError::Conflict("User is already registered.".to_string())
    } else {
      AppError::Sqlx(e)
    }
  })?;

  info!("User created with ID: {}", user.id);

  Ok(HttpResponse::Created().json(json!({
      "message": "User created successfully.",
      "user": user, // password hash is skipped by serde
  })))
}

#[instrument(name = "handler::login", skip(app_state, req_payload), fields(req_email = %req_payload.email))]
pub async fn login_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<LoginRequestPayload>,
) -> Result<HttpResponse, AppError> {
  info!("Login attempt for email: {}", req_payload.email);

  // Single generic failure for both unknown email and wrong password, so a
  // caller cannot probe which one was wrong.
  let invalid_credentials = || AppError::Auth("Invalid email or password.".to_string());

  let user: User = sqlx::query_as(
    "SELECT id, username, email, password_hash, created_at FROM users WHERE email = $1",
  )
  .bind(&req_payload.email)
  .fetch_optional(&app_state.db_pool)
  .await?
  .ok_or_else(invalid_credentials)?;

  if !auth_service::verify_password(&user.password_hash, &req_payload.password)? {
    warn!("Login failed for email: {}", req_payload.email);
    return Err(invalid_credentials());
  }

  let token = auth_service::issue_token(&user, &app_state.config)?;

  info!("Login successful for user ID: {}", user.id);

  Ok(HttpResponse::Ok().json(json!({
      "message": "Login successful.",
      "userId": user.id.to_string(),
      "email": user.email,
      "token": token,
  })))
}

/// Echo the identity claim carried by the caller's token.
#[instrument(name = "handler::profile", skip(auth_user), fields(user_id = %auth_user.user_id))]
pub async fn profile_handler(auth_user: AuthenticatedUser) -> Result<HttpResponse, AppError> {
  Ok(HttpResponse::Ok().json(json!({
      "userId": auth_user.user_id.to_string(),
      "email": auth_user.email,
  })))
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
  matches!(
    e.as_database_error().map(|db| db.kind()),
    Some(sqlx::error::ErrorKind::UniqueViolation)
  )
}
