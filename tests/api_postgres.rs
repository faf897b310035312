// tests/api_postgres.rs
//
// End-to-end tests over the full HTTP surface against a real PostgreSQL
// instance. Run with a database available:
//
//   export DATABASE_URL=postgres://localhost/bookstore_test
//   cargo test -- --ignored --test-threads=1
//
// Each test registers its own throwaway users (unique emails), so the suite
// is rerunnable against the same database.

use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use serde_json::{json, Value};
use sqlx::postgres::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use bookstore::config::AppConfig;
use bookstore::state::AppState;
use bookstore::web::routes::configure_app_routes;

async fn test_state() -> AppState {
  let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for these tests");
  let pool = PgPool::connect(&database_url).await.expect("connect to test database");
  sqlx::raw_sql(include_str!("../schema.sql"))
    .execute(&pool)
    .await
    .expect("apply schema");

  AppState {
    db_pool: pool,
    config: Arc::new(AppConfig {
      server_host: "127.0.0.1".to_string(),
      server_port: 0,
      database_url,
      jwt_secret: "postgres-suite-secret-0123456789".to_string(),
      token_ttl_secs: 3600,
    }),
  }
}

macro_rules! test_app {
  ($state:expr) => {
    test::init_service(
      App::new()
        .app_data(web::Data::new($state.clone()))
        .configure(configure_app_routes),
    )
    .await
  };
}

fn unique_email(tag: &str) -> String {
  format!("{}+{}@example.com", tag, Uuid::new_v4())
}

async fn register<S>(app: &S, email: &str) -> StatusCode
where
  S: actix_web::dev::Service<actix_http::Request, Response = actix_web::dev::ServiceResponse, Error = actix_web::Error>,
{
  let req = test::TestRequest::post()
    .uri("/user/register")
    .set_json(json!({"username": "reader", "email": email, "password": "hunter2!"}))
    .to_request();
  test::call_service(app, req).await.status()
}

async fn login<S>(app: &S, email: &str) -> String
where
  S: actix_web::dev::Service<actix_http::Request, Response = actix_web::dev::ServiceResponse, Error = actix_web::Error>,
{
  let req = test::TestRequest::post()
    .uri("/user/login")
    .set_json(json!({"email": email, "password": "hunter2!"}))
    .to_request();
  let resp = test::call_service(app, req).await;
  assert_eq!(resp.status(), StatusCode::OK, "login should succeed");
  let body: Value = test::read_body_json(resp).await;
  body["token"].as_str().expect("token in login response").to_string()
}

async fn create_book<S>(app: &S, token: &str) -> String
where
  S: actix_web::dev::Service<actix_http::Request, Response = actix_web::dev::ServiceResponse, Error = actix_web::Error>,
{
  let req = test::TestRequest::post()
    .uri("/books")
    .insert_header(("Authorization", format!("Bearer {}", token)))
    .set_json(json!({
      "title": "The Test Pyramid",
      "author": "A. Reader",
      "price": "20.00",
      "category": "engineering"
    }))
    .to_request();
  let resp = test::call_service(app, req).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let body: Value = test::read_body_json(resp).await;
  body["book"]["id"].as_str().expect("book id").to_string()
}

async fn add_to_cart<S>(app: &S, token: &str, book_id: &str, quantity: i32) -> StatusCode
where
  S: actix_web::dev::Service<actix_http::Request, Response = actix_web::dev::ServiceResponse, Error = actix_web::Error>,
{
  let req = test::TestRequest::post()
    .uri("/cart")
    .insert_header(("Authorization", format!("Bearer {}", token)))
    .set_json(json!({"book_id": book_id, "quantity": quantity}))
    .to_request();
  test::call_service(app, req).await.status()
}

async fn list_cart<S>(app: &S, token: &str) -> Vec<Value>
where
  S: actix_web::dev::Service<actix_http::Request, Response = actix_web::dev::ServiceResponse, Error = actix_web::Error>,
{
  let req = test::TestRequest::get()
    .uri("/cart")
    .insert_header(("Authorization", format!("Bearer {}", token)))
    .to_request();
  let resp = test::call_service(app, req).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let body: Value = test::read_body_json(resp).await;
  body["cartItems"].as_array().expect("cartItems array").clone()
}

#[actix_web::test]
#[ignore = "requires a PostgreSQL instance via DATABASE_URL"]
async fn duplicate_registration_conflicts() {
  let state = test_state().await;
  let app = test_app!(state);
  let email = unique_email("dup");

  assert_eq!(register(&app, &email).await, StatusCode::CREATED);
  assert_eq!(register(&app, &email).await, StatusCode::CONFLICT);

  let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = $1")
    .bind(&email)
    .fetch_one(&state.db_pool)
    .await
    .unwrap();
  assert_eq!(count, 1, "second registration must not create a row");
}

#[actix_web::test]
#[ignore = "requires a PostgreSQL instance via DATABASE_URL"]
async fn repeated_add_merges_into_one_line() {
  let state = test_state().await;
  let app = test_app!(state);
  let email = unique_email("merge");

  register(&app, &email).await;
  let token = login(&app, &email).await;
  let book_id = create_book(&app, &token).await;

  assert_eq!(add_to_cart(&app, &token, &book_id, 2).await, StatusCode::OK);
  assert_eq!(add_to_cart(&app, &token, &book_id, 3).await, StatusCode::OK);

  let items = list_cart(&app, &token).await;
  assert_eq!(items.len(), 1, "adds for the same book must merge, not duplicate");
  assert_eq!(items[0]["quantity"], 5);
}

#[actix_web::test]
#[ignore = "requires a PostgreSQL instance via DATABASE_URL"]
async fn foreign_cart_line_is_invisible() {
  let state = test_state().await;
  let app = test_app!(state);
  let (owner, intruder) = (unique_email("owner"), unique_email("intruder"));

  register(&app, &owner).await;
  register(&app, &intruder).await;
  let owner_token = login(&app, &owner).await;
  let intruder_token = login(&app, &intruder).await;

  let book_id = create_book(&app, &owner_token).await;
  add_to_cart(&app, &owner_token, &book_id, 2).await;
  let line_id = list_cart(&app, &owner_token).await[0]["id"].as_str().unwrap().to_string();

  // Another account can neither update nor remove the line
  let update = test::TestRequest::put()
    .uri(&format!("/cart/{}", line_id))
    .insert_header(("Authorization", format!("Bearer {}", intruder_token)))
    .set_json(json!({"quantity": 99}))
    .to_request();
  assert_eq!(test::call_service(&app, update).await.status(), StatusCode::NOT_FOUND);

  let remove = test::TestRequest::delete()
    .uri(&format!("/cart/{}", line_id))
    .insert_header(("Authorization", format!("Bearer {}", intruder_token)))
    .to_request();
  assert_eq!(test::call_service(&app, remove).await.status(), StatusCode::NOT_FOUND);

  // ...and the owner's line is untouched
  let items = list_cart(&app, &owner_token).await;
  assert_eq!(items[0]["quantity"], 2);
}

#[actix_web::test]
#[ignore = "requires a PostgreSQL instance via DATABASE_URL"]
async fn checkout_requires_and_clears_a_nonempty_cart() {
  let state = test_state().await;
  let app = test_app!(state);
  let email = unique_email("checkout");

  register(&app, &email).await;
  let token = login(&app, &email).await;

  // Empty cart: rejected
  let req = test::TestRequest::post()
    .uri("/checkout")
    .insert_header(("Authorization", format!("Bearer {}", token)))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

  // Two lines, then checkout: both gone
  let book_a = create_book(&app, &token).await;
  let book_b = create_book(&app, &token).await;
  add_to_cart(&app, &token, &book_a, 1).await;
  add_to_cart(&app, &token, &book_b, 4).await;

  let req = test::TestRequest::post()
    .uri("/checkout")
    .insert_header(("Authorization", format!("Bearer {}", token)))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["clearedItems"], 2);

  assert!(list_cart(&app, &token).await.is_empty());
}

#[actix_web::test]
#[ignore = "requires a PostgreSQL instance via DATABASE_URL"]
async fn partial_update_touches_only_submitted_fields() {
  let state = test_state().await;
  let app = test_app!(state);
  let email = unique_email("partial");

  register(&app, &email).await;
  let token = login(&app, &email).await;
  let book_id = create_book(&app, &token).await;

  let req = test::TestRequest::put()
    .uri(&format!("/books/{}", book_id))
    .insert_header(("Authorization", format!("Bearer {}", token)))
    .set_json(json!({"price": "12.50"}))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::OK);

  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["book"]["price"], "12.50");
  assert_eq!(body["book"]["title"], "The Test Pyramid");
  assert_eq!(body["book"]["author"], "A. Reader");
  assert_eq!(body["book"]["category"], "engineering");
}

#[actix_web::test]
#[ignore = "requires a PostgreSQL instance via DATABASE_URL"]
async fn register_login_add_merge_checkout_roundtrip() {
  let state = test_state().await;
  let app = test_app!(state);
  let email = unique_email("e2e");

  register(&app, &email).await;
  let token = login(&app, &email).await;
  let book_id = create_book(&app, &token).await;

  // quantity omitted defaults to 1
  let req = test::TestRequest::post()
    .uri("/cart")
    .insert_header(("Authorization", format!("Bearer {}", token)))
    .set_json(json!({"book_id": book_id}))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

  add_to_cart(&app, &token, &book_id, 2).await;

  let items = list_cart(&app, &token).await;
  assert_eq!(items.len(), 1);
  assert_eq!(items[0]["quantity"], 3);

  let req = test::TestRequest::post()
    .uri("/checkout")
    .insert_header(("Authorization", format!("Bearer {}", token)))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

  assert!(list_cart(&app, &token).await.is_empty());
}
