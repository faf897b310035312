// src/services/checkout_service.rs

//! Checkout is a placeholder: its one guaranteed effect is emptying the
//! caller's cart. No order record is written and nothing is charged.

use crate::errors::AppError;
use sqlx::PgPool;
use tracing::{info, instrument};
use uuid::Uuid;

/// Clear every cart line owned by the user, all-or-nothing.
///
/// Fails with `InvalidState` when the cart is already empty. The count and
/// the bulk delete share one transaction, so a checkout can neither observe
/// nor leave a half-cleared cart.
#[instrument(name = "checkout_service::checkout", skip(pool), err(Display))]
pub async fn checkout(pool: &PgPool, user_id: Uuid) -> Result<u64, AppError> {
  let mut tx = pool.begin().await?;

  let line_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cart_items WHERE user_id = $1")
    .bind(user_id)
    .fetch_one(&mut *tx)
    .await?;

  if line_count == 0 {
    return Err(AppError::InvalidState("Cart is empty.".to_string()));
  }

  let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
    .bind(user_id)
    .execute(&mut *tx)
    .await?;

  tx.commit().await?;

  info!(
    "Checkout cleared {} cart line(s) for user {}.",
    result.rows_affected(),
    user_id
  );
  Ok(result.rows_affected())
}
