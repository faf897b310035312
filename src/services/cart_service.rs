// src/services/cart_service.rs

//! Cart line maintenance: merge-or-insert on add, ownership-checked
//! update/remove, and listing.
//!
//! The (user_id, book_id) pair is unique by application logic, not by a
//! database constraint: the add path locks any existing row with
//! `SELECT ... FOR UPDATE` inside one transaction, so two concurrent adds for
//! the same pair cannot race into duplicate rows.

use crate::errors::AppError;
use crate::models::CartItem;
use sqlx::PgPool;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Merge rule for repeated adds of the same book: an existing line absorbs
/// the new quantity, a missing line starts at it.
pub fn merge_quantity(existing: Option<i32>, added: i32) -> i32 {
  match existing {
    Some(current) => current + added,
    None => added,
  }
}

/// Add `quantity` of a book to the user's cart, merging into an existing
/// line for the same book if there is one.
#[instrument(name = "cart_service::add_to_cart", skip(pool), err(Display))]
pub async fn add_to_cart(
  pool: &PgPool,
  user_id: Uuid,
  book_id: Uuid,
  quantity: i32,
) -> Result<CartItem, AppError> {
  if quantity <= 0 {
    warn!("Rejected add-to-cart with non-positive quantity {}.", quantity);
    return Err(AppError::Validation("Quantity must be a positive number.".to_string()));
  }

  let mut tx = pool.begin().await?;

  let book_exists: Option<Uuid> = sqlx::query_scalar("SELECT id FROM books WHERE id = $1")
    .bind(book_id)
    .fetch_optional(&mut *tx)
    .await?;
  if book_exists.is_none() {
    return Err(AppError::NotFound(format!("Book with ID {} not found.", book_id)));
  }

  // Lock the existing line (if any) for the rest of the transaction.
  let existing: Option<CartItem> = sqlx::query_as(
    "SELECT id, user_id, book_id, quantity, created_at FROM cart_items \
     WHERE user_id = $1 AND book_id = $2 FOR UPDATE",
  )
  .bind(user_id)
  .bind(book_id)
  .fetch_optional(&mut *tx)
  .await?;

  let new_quantity = merge_quantity(existing.as_ref().map(|item| item.quantity), quantity);

  let item: CartItem = match existing {
    Some(line) => {
      sqlx::query_as(
        "UPDATE cart_items SET quantity = $1 WHERE id = $2 \
         RETURNING id, user_id, book_id, quantity, created_at",
      )
      .bind(new_quantity)
      .bind(line.id)
      .fetch_one(&mut *tx)
      .await?
    }
    None => {
      sqlx::query_as(
        "INSERT INTO cart_items (id, user_id, book_id, quantity, created_at) \
         VALUES ($1, $2, $3, $4, NOW()) \
         RETURNING id, user_id, book_id, quantity, created_at",
      )
      .bind(Uuid::new_v4())
      .bind(user_id)
      .bind(book_id)
      .bind(new_quantity)
      .fetch_one(&mut *tx)
      .await?
    }
  };

  tx.commit().await?;

  info!(
    "Cart updated for user {}: book {}, quantity now {}.",
    user_id, book_id, item.quantity
  );
  Ok(item)
}

/// All cart lines owned by the user. Side-effect free.
#[instrument(name = "cart_service::list_cart", skip(pool), err(Display))]
pub async fn list_cart(pool: &PgPool, user_id: Uuid) -> Result<Vec<CartItem>, AppError> {
  let items: Vec<CartItem> = sqlx::query_as(
    "SELECT id, user_id, book_id, quantity, created_at FROM cart_items \
     WHERE user_id = $1 ORDER BY created_at ASC",
  )
  .bind(user_id)
  .fetch_all(pool)
  .await?;
  Ok(items)
}

/// Set a cart line's quantity to an absolute value (no merge).
///
/// Zero or negative quantities are rejected; removal has its own operation.
/// The `user_id` predicate doubles as the ownership check: a line owned by
/// another user is indistinguishable from a missing one.
#[instrument(name = "cart_service::update_cart_item", skip(pool), err(Display))]
pub async fn update_cart_item(
  pool: &PgPool,
  user_id: Uuid,
  item_id: Uuid,
  quantity: i32,
) -> Result<CartItem, AppError> {
  if quantity <= 0 {
    warn!("Rejected cart update with non-positive quantity {}.", quantity);
    return Err(AppError::Validation(
      "Quantity must be a positive number. Use the remove operation to delete a line.".to_string(),
    ));
  }

  let updated: Option<CartItem> = sqlx::query_as(
    "UPDATE cart_items SET quantity = $1 WHERE id = $2 AND user_id = $3 \
     RETURNING id, user_id, book_id, quantity, created_at",
  )
  .bind(quantity)
  .bind(item_id)
  .bind(user_id)
  .fetch_optional(pool)
  .await?;

  updated.ok_or_else(|| AppError::NotFound(format!("Cart item {} not found.", item_id)))
}

/// Ownership-checked delete of a single cart line.
#[instrument(name = "cart_service::remove_cart_item", skip(pool), err(Display))]
pub async fn remove_cart_item(pool: &PgPool, user_id: Uuid, item_id: Uuid) -> Result<(), AppError> {
  let result = sqlx::query("DELETE FROM cart_items WHERE id = $1 AND user_id = $2")
    .bind(item_id)
    .bind(user_id)
    .execute(pool)
    .await?;

  if result.rows_affected() == 0 {
    return Err(AppError::NotFound(format!("Cart item {} not found.", item_id)));
  }

  info!("Cart item {} removed for user {}.", item_id, user_id);
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_merge_into_existing_line() {
    // Adding 2 then 3 of the same book must yield one line of 5
    assert_eq!(merge_quantity(Some(2), 3), 5);
  }

  #[test]
  fn test_merge_starts_fresh_line() {
    assert_eq!(merge_quantity(None, 1), 1);
    assert_eq!(merge_quantity(None, 4), 4);
  }

  #[test]
  fn test_merge_is_associative_over_repeated_adds() {
    let once = merge_quantity(Some(merge_quantity(None, 2)), 3);
    let twice = merge_quantity(None, 5);
    assert_eq!(once, twice);
  }
}
