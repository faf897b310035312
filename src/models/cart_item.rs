// src/models/cart_item.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// One pending purchase line: at most one row per (user_id, book_id) pair.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CartItem {
  pub id: Uuid, // Primary key for the cart item itself
  pub user_id: Uuid,
  pub book_id: Uuid,
  pub quantity: i32,
  pub created_at: DateTime<Utc>,
}
