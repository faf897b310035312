// src/web/routes.rs

use actix_web::web;

// Liveness probe. In a real deployment this might also check DB connectivity.
async fn health_check_handler() -> actix_web::HttpResponse {
  actix_web::HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

// Called in `main.rs` to configure services for the Actix App.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  use crate::web::handlers::{auth_handlers, book_handlers, cart_handlers, checkout_handlers};

  cfg
    .route("/health", web::get().to(health_check_handler))
    // Account routes (unauthenticated)
    .service(
      web::scope("/user")
        .route("/register", web::post().to(auth_handlers::register_handler))
        .route("/login", web::post().to(auth_handlers::login_handler)),
    )
    .route("/profile", web::get().to(auth_handlers::profile_handler))
    // Catalog routes; reads are open, writes require a token
    .service(
      web::scope("/books")
        .route("", web::post().to(book_handlers::create_book_handler))
        .route("", web::get().to(book_handlers::list_books_handler))
        .route("/{id}", web::get().to(book_handlers::get_book_handler))
        .route("/{id}", web::put().to(book_handlers::update_book_handler))
        .route("/{id}", web::delete().to(book_handlers::delete_book_handler)),
    )
    // Cart routes (all authenticated via the AuthenticatedUser extractor)
    .service(
      web::scope("/cart")
        .route("", web::post().to(cart_handlers::add_to_cart_handler))
        .route("", web::get().to(cart_handlers::list_cart_handler))
        .route("/{id}", web::put().to(cart_handlers::update_cart_item_handler))
        .route("/{id}", web::delete().to(cart_handlers::remove_cart_item_handler)),
    )
    .route("/checkout", web::post().to(checkout_handlers::checkout_handler));
}
