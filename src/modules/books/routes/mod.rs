//! HTTP bindings for the Books module.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use bookshelf_http::error::AppError;

use super::models::Book;
use super::service::{BookError, BookService};

/// Routes served at the application root.
pub fn router(service: BookService) -> Router {
    Router::new()
        .route("/", get(home))
        .route(
            "/book",
            get(list_books).post(create_book).put(update_book),
        )
        .route("/book/{id}", get(get_book).delete(delete_book))
        .with_state(service)
}

impl From<BookError> for AppError {
    fn from(err: BookError) -> Self {
        match err {
            BookError::NotFound(_) => AppError::not_found(err.to_string()),
            BookError::MissingId => AppError::bad_request_with(
                vec![serde_json::json!({"field": "id", "error": "required"})],
                err.to_string(),
            ),
            BookError::Storage(storage) => {
                AppError::Internal(anyhow::Error::new(storage).context("book storage failed"))
            }
        }
    }
}

async fn home() -> &'static str {
    "ok"
}

async fn create_book(
    State(service): State<BookService>,
    payload: Result<Json<Book>, JsonRejection>,
) -> Result<(StatusCode, Json<Book>), AppError> {
    let Json(book) = payload?;
    let created = service.create(book).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_book(
    State(service): State<BookService>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Book>, AppError> {
    let Path(id) = id?;
    Ok(Json(service.get_one(id).await?))
}

async fn list_books(State(service): State<BookService>) -> Result<Json<Vec<Book>>, AppError> {
    Ok(Json(service.get_all().await?))
}

async fn update_book(
    State(service): State<BookService>,
    payload: Result<Json<Book>, JsonRejection>,
) -> Result<Json<Book>, AppError> {
    let Json(book) = payload?;
    Ok(Json(service.update(book).await?))
}

async fn delete_book(
    State(service): State<BookService>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<&'static str, AppError> {
    let Path(id) = id?;
    Ok(service.delete(id).await?)
}
