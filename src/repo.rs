use crate::models::{Book, BookPage, BookUpdate, NewBook, PageRequest, SearchRequest};
use crate::outcome::Outcome;
use std::future::Future;

/// The remote book service. Implementations never fail past this boundary:
/// every call resolves to an `Outcome`.
pub trait BookRepo {
    fn list_books(&self, page: PageRequest) -> impl Future<Output = Outcome<BookPage>> + Send;

    /// A successful outcome may still carry no book if the server found none.
    fn get_book(&self, id: String) -> impl Future<Output = Outcome<Option<Book>>> + Send;

    fn insert_book(&self, new_book: NewBook) -> impl Future<Output = Outcome<Option<Book>>> + Send;

    /// Replaces every mutable field of the book with `update.patch`.
    fn update_book(&self, update: BookUpdate) -> impl Future<Output = Outcome<Option<Book>>> + Send;

    fn delete_book(&self, id: String) -> impl Future<Output = Outcome<()>> + Send;

    fn search_books(&self, search: SearchRequest) -> impl Future<Output = Outcome<BookPage>> + Send;
}
