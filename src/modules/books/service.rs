//! Business operations over books.
//!
//! Each operation owns exactly one transaction: commit on success, rollback
//! on any failure. Reads run in [`TxMode::ReadOnly`].

use std::sync::Arc;

use bookshelf_db::StorageError;
use thiserror::Error;

use super::models::Book;
use super::repository::{BookRepository, BookTransaction, TxMode};

/// Indicator returned by a successful delete.
pub const DELETED: &str = "ok";

#[derive(Debug, Error)]
pub enum BookError {
    #[error("book {0} not found")]
    NotFound(i64),
    #[error("book id is required")]
    MissingId,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Clone)]
pub struct BookService {
    repository: Arc<dyn BookRepository>,
}

impl BookService {
    pub fn new(repository: Arc<dyn BookRepository>) -> Self {
        Self { repository }
    }

    /// Persists a new book. Any id on the input is ignored.
    pub async fn create(&self, book: Book) -> Result<Book, BookError> {
        let mut tx = self.repository.begin(TxMode::ReadWrite).await?;
        let outcome = tx
            .save(Book { id: None, ..book })
            .await
            .map_err(BookError::from);
        let created = finish(tx, TxMode::ReadWrite, outcome).await?;

        tracing::info!(book_id = ?created.id, "book created");
        Ok(created)
    }

    pub async fn get_one(&self, id: i64) -> Result<Book, BookError> {
        let mut tx = self.repository.begin(TxMode::ReadOnly).await?;
        let outcome = tx
            .find_by_id(id)
            .await
            .map_err(BookError::from)
            .and_then(|found| found.ok_or(BookError::NotFound(id)));
        finish(tx, TxMode::ReadOnly, outcome).await
    }

    pub async fn get_all(&self) -> Result<Vec<Book>, BookError> {
        let mut tx = self.repository.begin(TxMode::ReadOnly).await?;
        let outcome = tx.find_all().await.map_err(BookError::from);
        finish(tx, TxMode::ReadOnly, outcome).await
    }

    /// Overwrites title and author of an existing book; the id never changes.
    pub async fn update(&self, book: Book) -> Result<Book, BookError> {
        let id = book.id.ok_or(BookError::MissingId)?;

        let mut tx = self.repository.begin(TxMode::ReadWrite).await?;
        let outcome = apply_update(tx.as_mut(), id, book).await;
        let updated = finish(tx, TxMode::ReadWrite, outcome).await?;

        tracing::info!(book_id = id, "book updated");
        Ok(updated)
    }

    /// Removes a book. Succeeds whether or not the id existed.
    pub async fn delete(&self, id: i64) -> Result<&'static str, BookError> {
        let mut tx = self.repository.begin(TxMode::ReadWrite).await?;
        let outcome = tx.delete_by_id(id).await.map_err(BookError::from);
        finish(tx, TxMode::ReadWrite, outcome).await?;

        tracing::info!(book_id = id, "book deleted");
        Ok(DELETED)
    }
}

async fn apply_update(tx: &mut dyn BookTransaction, id: i64, book: Book) -> Result<Book, BookError> {
    let mut current = tx.find_by_id(id).await?.ok_or(BookError::NotFound(id))?;
    current.title = book.title;
    current.author = book.author;
    Ok(tx.save(current).await?)
}

/// Ends the transaction according to the outcome and the mode.
async fn finish<T>(
    tx: Box<dyn BookTransaction>,
    mode: TxMode,
    outcome: Result<T, BookError>,
) -> Result<T, BookError> {
    match outcome {
        Ok(value) => {
            match mode {
                TxMode::ReadWrite => tx.commit().await?,
                TxMode::ReadOnly => tx.rollback().await?,
            }
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::warn!(error = %rollback_err, "rollback failed");
            }
            Err(err)
        }
    }
}
