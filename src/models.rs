use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// The mutable fields of a book. Used both to create a book and as the
/// full replacement record when updating one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub summary: String,
}

impl NewBook {
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        summary: impl Into<String>,
    ) -> Self {
        NewBook {
            title: title.into(),
            author: author.into(),
            summary: summary.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookUpdate {
    pub id: String,
    pub patch: NewBook,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> Self {
        PageRequest { page, limit }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest { page: 1, limit: 10 }
    }
}

/// An empty query is valid and asks the server for an unfiltered page.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchRequest {
    pub query: String,
    pub page: PageRequest,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, page: PageRequest) -> Self {
        SearchRequest {
            query: query.into(),
            page,
        }
    }
}

/// One page of books plus the total number of matching records on the server.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BookPage {
    pub books: Vec<Book>,
    pub total_count: u64,
}
