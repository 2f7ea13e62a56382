mod config;
mod error;
mod http;
mod models;
mod notifier;
mod outcome;
mod repo;
mod selectors;
mod state;
mod store;

use std::sync::Arc;

use tracing::info;

pub use config::{ClientConfig, DEFAULT_BASE_URL};
pub use error::{ApiError, ConfigError};
pub use http::HttpBookRepo;
pub use models::{Book, BookPage, BookUpdate, NewBook, PageRequest, SearchRequest};
pub use notifier::{Notifier, TracingNotifier};
pub use outcome::Outcome;
pub use repo::BookRepo;
pub use selectors::{select_all_books, select_book};
pub use state::{
    reduce, CollectionState, Event, OperationKind, OperationState, OperationStatus, Settlement,
};
pub use store::BookStore;

/// Builds a store backed by the HTTP book service described by `config`.
pub fn connect(
    config: &ClientConfig,
    notifier: Arc<dyn Notifier>,
) -> Result<BookStore<HttpBookRepo>, ConfigError> {
    let repo = HttpBookRepo::new(config, notifier)?;
    info!("Using book service at {}", config.base_url);

    Ok(BookStore::new(repo))
}
