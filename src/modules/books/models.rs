use serde::{Deserialize, Serialize};

/// Domain model for the Books module.
///
/// `id` is `None` until the record is first saved and never changes after.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Unique identifier for the book, assigned by storage
    #[serde(default)]
    pub id: Option<i64>,
    /// Title of the book
    pub title: String,
    /// Author of the book
    pub author: String,
}

impl Book {
    /// A book that has not been persisted yet.
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            author: author.into(),
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_id_deserializes_as_none() {
        let book: Book = serde_json::from_str(r#"{"title":"Dune","author":"Frank Herbert"}"#).unwrap();
        assert_eq!(book, Book::new("Dune", "Frank Herbert"));
    }

    #[test]
    fn unsaved_book_serializes_null_id() {
        let json = serde_json::to_value(Book::new("Dune", "Frank Herbert")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": null, "title": "Dune", "author": "Frank Herbert"})
        );
    }
}
