// src/models/book.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Book {
  pub id: Uuid,
  pub title: String,
  pub author: String,
  pub description: Option<String>,
  pub price: Decimal, // NUMERIC in the database
  pub category: Option<String>,
  pub cover_url: Option<String>,
  pub created_at: DateTime<Utc>,
}
