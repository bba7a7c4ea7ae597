pub mod models;
pub mod repository;
pub mod routes;
pub mod service;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use bookshelf_db::Database;
use bookshelf_kernel::{InitCtx, Migration, Module};

use repository::SqliteBookRepository;
use service::BookService;

/// Books module: CRUD over the `book` table, served at the application root
pub struct BooksModule {
    service: BookService,
}

impl BooksModule {
    pub fn new(service: BookService) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    fn mount_path(&self) -> String {
        "/".to_string()
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.service.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let book_ref = serde_json::json!({ "$ref": "#/components/schemas/Book" });
        let error_ref = serde_json::json!({
            "description": "Error",
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                }
            }
        });
        let ok_text = serde_json::json!({
            "description": "OK",
            "content": { "text/plain": { "schema": { "type": "string" } } }
        });
        let id_param = serde_json::json!([{
            "name": "id",
            "in": "path",
            "required": true,
            "schema": { "type": "integer", "format": "int64" }
        }]);
        let book_body = serde_json::json!({
            "required": true,
            "content": { "application/json": { "schema": book_ref } }
        });
        let book_response = |description: &str| {
            serde_json::json!({
                "description": description,
                "content": { "application/json": { "schema": book_ref } }
            })
        };

        Some(serde_json::json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "Health check",
                        "tags": ["Books"],
                        "responses": { "200": ok_text }
                    }
                },
                "/book": {
                    "get": {
                        "summary": "List books",
                        "tags": ["Books"],
                        "responses": {
                            "200": {
                                "description": "Every stored book",
                                "content": {
                                    "application/json": {
                                        "schema": { "type": "array", "items": book_ref }
                                    }
                                }
                            },
                            "500": error_ref
                        }
                    },
                    "post": {
                        "summary": "Create a book",
                        "tags": ["Books"],
                        "requestBody": book_body,
                        "responses": {
                            "201": book_response("Created book"),
                            "400": error_ref,
                            "500": error_ref
                        }
                    },
                    "put": {
                        "summary": "Update title and author of a book",
                        "tags": ["Books"],
                        "requestBody": book_body,
                        "responses": {
                            "200": book_response("Updated book"),
                            "400": error_ref,
                            "404": error_ref,
                            "500": error_ref
                        }
                    }
                },
                "/book/{id}": {
                    "get": {
                        "summary": "Get a book",
                        "tags": ["Books"],
                        "parameters": id_param,
                        "responses": {
                            "200": book_response("The book"),
                            "400": error_ref,
                            "404": error_ref,
                            "500": error_ref
                        }
                    },
                    "delete": {
                        "summary": "Delete a book",
                        "tags": ["Books"],
                        "parameters": id_param,
                        "responses": {
                            "200": ok_text,
                            "400": error_ref,
                            "500": error_ref
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "id": {
                                "type": ["integer", "null"],
                                "format": "int64",
                                "description": "Server-assigned identifier; null on create"
                            },
                            "title": {
                                "type": "string",
                                "description": "Title of the book"
                            },
                            "author": {
                                "type": "string",
                                "description": "Author of the book"
                            }
                        },
                        "required": ["title", "author"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_init",
            up: repository::SCHEMA,
        }]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Create the books module backed by the given database
pub fn create_module(db: &Database) -> Arc<dyn Module> {
    let repository = Arc::new(SqliteBookRepository::new(db.pool().clone()));
    Arc::new(BooksModule::new(BookService::new(repository)))
}
