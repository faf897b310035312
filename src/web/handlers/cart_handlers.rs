// src/web/handlers/cart_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::services::cart_service;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

// --- Request DTOs ---

#[derive(Deserialize, Debug)]
pub struct AddToCartPayload {
  pub book_id: Uuid,
  pub quantity: Option<i32>, // omitted means 1
}

#[derive(Deserialize, Debug)]
pub struct UpdateCartItemPayload {
  pub quantity: i32,
}

// --- Handler Implementations ---

#[instrument(
    name = "handler::add_to_cart",
    skip(app_state, req_payload, auth_user),
    fields(user_id = %auth_user.user_id, book_id = %req_payload.book_id)
)]
pub async fn add_to_cart_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<AddToCartPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let quantity = req_payload.quantity.unwrap_or(1);

  let item = cart_service::add_to_cart(
    &app_state.db_pool,
    auth_user.user_id,
    req_payload.book_id,
    quantity,
  )
  .await?;

  info!(
    "Add to cart successful for user {}: item {}, quantity {}.",
    auth_user.user_id, item.id, item.quantity
  );

  Ok(HttpResponse::Ok().json(json!({
      "message": "Item added to cart successfully.",
      "cartItem": item,
  })))
}

#[instrument(name = "handler::list_cart", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn list_cart_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let items = cart_service::list_cart(&app_state.db_pool, auth_user.user_id).await?;

  Ok(HttpResponse::Ok().json(json!({
      "message": "Cart fetched successfully.",
      "cartItems": items,
  })))
}

#[instrument(
    name = "handler::update_cart_item",
    skip(app_state, path, req_payload, auth_user),
    fields(user_id = %auth_user.user_id, item_id = %path.as_ref())
)]
pub async fn update_cart_item_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  req_payload: web::Json<UpdateCartItemPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let item = cart_service::update_cart_item(
    &app_state.db_pool,
    auth_user.user_id,
    path.into_inner(),
    req_payload.quantity,
  )
  .await?;

  Ok(HttpResponse::Ok().json(json!({
      "message": "Cart item updated successfully.",
      "cartItem": item,
  })))
}

#[instrument(
    name = "handler::remove_cart_item",
    skip(app_state, path, auth_user),
    fields(user_id = %auth_user.user_id, item_id = %path.as_ref())
)]
pub async fn remove_cart_item_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  cart_service::remove_cart_item(&app_state.db_pool, auth_user.user_id, path.into_inner()).await?;

  Ok(HttpResponse::Ok().json(json!({
      "message": "Cart item removed successfully.",
  })))
}
