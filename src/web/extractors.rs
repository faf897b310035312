// src/web/extractors.rs

//! Request extractors shared across handlers.

use actix_web::http::header;
use actix_web::{web, FromRequest, HttpRequest};
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;
use crate::services::auth_service;
use crate::state::AppState;

/// The identity behind a validated bearer token.
///
/// Extracting this from a request performs the full token check: presence of
/// the `Authorization: Bearer` header, signature, and expiry. Handlers that
/// take an `AuthenticatedUser` parameter are therefore authenticated routes.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
  pub user_id: Uuid,
  pub email: String,
}

impl FromRequest for AuthenticatedUser {
  type Error = AppError;
  type Future = futures_util::future::Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
    futures_util::future::ready(authenticate(req))
  }
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, AppError> {
  let app_state = req
    .app_data::<web::Data<AppState>>()
    .ok_or_else(|| AppError::Internal("Application state is not configured.".to_string()))?;

  let header_value = req
    .headers()
    .get(header::AUTHORIZATION)
    .ok_or_else(|| AppError::Auth("Missing Authorization header.".to_string()))?;
  let header_str = header_value
    .to_str()
    .map_err(|_| AppError::Auth("Authorization header is not valid UTF-8.".to_string()))?;

  let token = header_str.strip_prefix("Bearer ").ok_or_else(|| {
    warn!("Authorization header present but not a Bearer token.");
    AppError::Auth("Authorization header must be of the form 'Bearer <token>'.".to_string())
  })?;

  let claims = auth_service::validate_token(token, &app_state.config.jwt_secret)?;

  Ok(AuthenticatedUser {
    user_id: claims.uid,
    email: claims.sub,
  })
}
