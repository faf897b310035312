// src/web/handlers/book_handlers.rs

use actix_web::{web, HttpResponse};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::Book;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

// --- Request DTOs ---

#[derive(Deserialize, Debug)]
pub struct CreateBookPayload {
  pub title: String,
  pub author: String,
  pub description: Option<String>,
  pub price: Decimal,
  pub category: Option<String>,
  pub cover_url: Option<String>,
}

/// Every field optional: only the ones present in the body are applied.
#[derive(Deserialize, Debug)]
pub struct UpdateBookPayload {
  pub title: Option<String>,
  pub author: Option<String>,
  pub description: Option<String>,
  pub price: Option<Decimal>,
  pub category: Option<String>,
  pub cover_url: Option<String>,
}

// --- Handler Implementations ---

#[instrument(name = "handler::create_book", skip(app_state, req_payload, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn create_book_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<CreateBookPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let payload = req_payload.into_inner();

  if payload.title.trim().is_empty() || payload.author.trim().is_empty() {
    return Err(AppError::Validation("Title and author must not be empty.".to_string()));
  }
  if payload.price < Decimal::ZERO {
    return Err(AppError::Validation("Price must not be negative.".to_string()));
  }

  let book: Book = sqlx::query_as(
    "INSERT INTO books (id, title, author, description, price, category, cover_url, created_at) \
     VALUES ($1, $2, $3, $4, $5, $6, $7, NOW()) \
     RETURNING id, title, author, description, price, category, cover_url, created_at",
  )
  .bind(Uuid::new_v4())
  .bind(&payload.title)
  .bind(&payload.author)
  .bind(&payload.description)
  .bind(payload.price)
  .bind(&payload.category)
  .bind(&payload.cover_url)
  .fetch_one(&app_state.db_pool)
  .await?;

  info!("Book {} created: {}", book.id, book.title);

  Ok(HttpResponse::Created().json(json!({
      "message": "Book created successfully.",
      "book": book,
  })))
}

#[instrument(name = "handler::list_books", skip(app_state))]
pub async fn list_books_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let books: Vec<Book> = sqlx::query_as(
    "SELECT id, title, author, description, price, category, cover_url, created_at \
     FROM books ORDER BY title ASC",
  )
  .fetch_all(&app_state.db_pool)
  .await
  .map_err(|e| {
    error!("Failed to fetch books from database: {}", e);
    AppError::Sqlx(e)
  })?;

  info!("Successfully fetched {} books.", books.len());

  Ok(HttpResponse::Ok().json(json!({
      "message": "Books fetched successfully.",
      "books": books,
  })))
}

#[instrument(name = "handler::get_book", skip(app_state, path), fields(book_id = %path.as_ref()))]
pub async fn get_book_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let book_id = path.into_inner();

  let book_opt: Option<Book> = sqlx::query_as(
    "SELECT id, title, author, description, price, category, cover_url, created_at \
     FROM books WHERE id = $1",
  )
  .bind(book_id)
  .fetch_optional(&app_state.db_pool)
  .await?;

  match book_opt {
    Some(book) => Ok(HttpResponse::Ok().json(json!({
        "message": "Book fetched successfully.",
        "book": book,
    }))),
    None => {
      warn!("Book with ID {} not found.", book_id);
      Err(AppError::NotFound(format!("Book with ID {} not found.", book_id)))
    }
  }
}

#[instrument(name = "handler::update_book", skip(app_state, path, req_payload, auth_user), fields(book_id = %path.as_ref(), user_id = %auth_user.user_id))]
pub async fn update_book_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  req_payload: web::Json<UpdateBookPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let book_id = path.into_inner();
  let payload = req_payload.into_inner();

  if let Some(price) = payload.price {
    if price < Decimal::ZERO {
      return Err(AppError::Validation("Price must not be negative.".to_string()));
    }
  }

  // COALESCE keeps the stored value wherever the payload field was absent.
  let updated: Option<Book> = sqlx::query_as(
    "UPDATE books SET \
       title = COALESCE($2, title), \
       author = COALESCE($3, author), \
       description = COALESCE($4, description), \
       price = COALESCE($5, price), \
       category = COALESCE($6, category), \
       cover_url = COALESCE($7, cover_url) \
     WHERE id = $1 \
     RETURNING id, title, author, description, price, category, cover_url, created_at",
  )
  .bind(book_id)
  .bind(&payload.title)
  .bind(&payload.author)
  .bind(&payload.description)
  .bind(payload.price)
  .bind(&payload.category)
  .bind(&payload.cover_url)
  .fetch_optional(&app_state.db_pool)
  .await?;

  match updated {
    Some(book) => {
      info!("Book {} updated.", book.id);
      Ok(HttpResponse::Ok().json(json!({
          "message": "Book updated successfully.",
          "book": book,
      })))
    }
    None => Err(AppError::NotFound(format!("Book with ID {} not found.", book_id))),
  }
}

#[instrument(name = "handler::delete_book", skip(app_state, path, auth_user), fields(book_id = %path.as_ref(), user_id = %auth_user.user_id))]
pub async fn delete_book_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let book_id = path.into_inner();

  // Cart lines referencing the book go with it, in the same transaction, so
  // no cart is ever left pointing at a missing book.
  let mut tx = app_state.db_pool.begin().await?;

  let cleared = sqlx::query("DELETE FROM cart_items WHERE book_id = $1")
    .bind(book_id)
    .execute(&mut *tx)
    .await?;

  let deleted = sqlx::query("DELETE FROM books WHERE id = $1")
    .bind(book_id)
    .execute(&mut *tx)
    .await?;

  if deleted.rows_affected() == 0 {
    // Dropping the transaction rolls back the cart-line delete.
    return Err(AppError::NotFound(format!("Book with ID {} not found.", book_id)));
  }

  tx.commit().await?;

  info!(
    "Book {} deleted ({} referencing cart line(s) removed).",
    book_id,
    cleared.rows_affected()
  );

  Ok(HttpResponse::Ok().json(json!({
      "message": "Book deleted successfully.",
  })))
}
