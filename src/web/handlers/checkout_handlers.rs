// src/web/handlers/checkout_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::services::checkout_service;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

#[instrument(name = "handler::checkout", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn checkout_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  info!("Checkout attempt by user: {}", auth_user.user_id);

  let cleared = checkout_service::checkout(&app_state.db_pool, auth_user.user_id).await?;

  Ok(HttpResponse::Ok().json(json!({
      "message": "Checkout successful.",
      "clearedItems": cleared,
  })))
}
