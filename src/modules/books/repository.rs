//! Persistence gateway for [`Book`] records.
//!
//! Every operation runs inside a [`BookTransaction`] opened with
//! [`BookRepository::begin`]. Dropping a transaction without calling
//! [`BookTransaction::commit`] rolls it back.

use async_trait::async_trait;
use bookshelf_db::{Result, StorageError};
use sqlx::sqlite::{Sqlite, SqlitePool, SqliteRow};
use sqlx::{Row, Transaction};

use super::models::Book;

/// Table backing the Books module.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS book (
    id     INTEGER PRIMARY KEY AUTOINCREMENT,
    title  TEXT NOT NULL,
    author TEXT NOT NULL
);
"#;

/// Access mode of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxMode {
    /// Pure reads; writes are refused and the transaction is released by rollback.
    ReadOnly,
    ReadWrite,
}

#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Opens a transaction scope in the given mode.
    async fn begin(&self, mode: TxMode) -> Result<Box<dyn BookTransaction>>;
}

#[async_trait]
pub trait BookTransaction: Send {
    /// Inserts when `book.id` is `None`, otherwise upserts the row with that id.
    /// Returns the persisted record with its id populated.
    async fn save(&mut self, book: Book) -> Result<Book>;

    async fn find_by_id(&mut self, id: i64) -> Result<Option<Book>>;

    /// All records, ordered by id.
    async fn find_all(&mut self) -> Result<Vec<Book>>;

    /// Removes the record if present. Deleting a missing id is not an error.
    async fn delete_by_id(&mut self, id: i64) -> Result<()>;

    async fn commit(self: Box<Self>) -> Result<()>;

    async fn rollback(self: Box<Self>) -> Result<()>;
}

/// SQLite implementation of the repository contract.
#[derive(Debug, Clone)]
pub struct SqliteBookRepository {
    pool: SqlitePool,
}

impl SqliteBookRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookRepository for SqliteBookRepository {
    async fn begin(&self, mode: TxMode) -> Result<Box<dyn BookTransaction>> {
        // Writers take the write lock up front; a deferred read-then-write
        // transaction cannot upgrade while another writer holds a shared lock.
        let tx = match mode {
            TxMode::ReadOnly => self.pool.begin().await?,
            TxMode::ReadWrite => self.pool.begin_with("BEGIN IMMEDIATE").await?,
        };
        Ok(Box::new(SqliteBookTransaction { tx, mode }))
    }
}

struct SqliteBookTransaction {
    tx: Transaction<'static, Sqlite>,
    mode: TxMode,
}

impl SqliteBookTransaction {
    fn ensure_writable(&self, operation: &'static str) -> Result<()> {
        match self.mode {
            TxMode::ReadWrite => Ok(()),
            TxMode::ReadOnly => Err(StorageError::ReadOnly(operation)),
        }
    }
}

fn book_from_row(row: &SqliteRow) -> Result<Book> {
    Ok(Book {
        id: Some(row.try_get("id")?),
        title: row.try_get("title")?,
        author: row.try_get("author")?,
    })
}

#[async_trait]
impl BookTransaction for SqliteBookTransaction {
    async fn save(&mut self, book: Book) -> Result<Book> {
        self.ensure_writable("save")?;

        match book.id {
            None => {
                let result = sqlx::query("INSERT INTO book (title, author) VALUES (?, ?)")
                    .bind(book.title.as_str())
                    .bind(book.author.as_str())
                    .execute(&mut *self.tx)
                    .await?;

                let id = result.last_insert_rowid();
                tracing::debug!(book_id = id, "inserted book");
                Ok(book.with_id(id))
            }
            Some(id) => {
                sqlx::query(
                    r#"
                    INSERT INTO book (id, title, author)
                    VALUES (?, ?, ?)
                    ON CONFLICT(id) DO UPDATE
                    SET title = excluded.title,
                        author = excluded.author
                    "#,
                )
                .bind(id)
                .bind(book.title.as_str())
                .bind(book.author.as_str())
                .execute(&mut *self.tx)
                .await?;

                tracing::debug!(book_id = id, "saved book");
                Ok(book)
            }
        }
    }

    async fn find_by_id(&mut self, id: i64) -> Result<Option<Book>> {
        let row = sqlx::query("SELECT id, title, author FROM book WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;

        row.as_ref().map(book_from_row).transpose()
    }

    async fn find_all(&mut self) -> Result<Vec<Book>> {
        let rows = sqlx::query("SELECT id, title, author FROM book ORDER BY id")
            .fetch_all(&mut *self.tx)
            .await?;

        rows.iter().map(book_from_row).collect()
    }

    async fn delete_by_id(&mut self, id: i64) -> Result<()> {
        self.ensure_writable("delete_by_id")?;

        let result = sqlx::query("DELETE FROM book WHERE id = ?")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;

        tracing::debug!(
            book_id = id,
            removed = result.rows_affected(),
            "deleted book"
        );
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}
