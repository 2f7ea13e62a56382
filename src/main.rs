use std::process::ExitCode;
use std::sync::Arc;

use book_catalog_client::{
    connect, select_all_books, ClientConfig, PageRequest, SearchRequest, TracingNotifier,
};
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Prints the first page of books, or of search results when a query is given.
#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let store = match connect(&config, Arc::new(TracingNotifier)) {
        Ok(store) => store,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let page = PageRequest::new(1, config.page_limit);
    let query = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    let outcome = if query.is_empty() {
        store.fetch_all_books(page).await
    } else {
        store.search_books(SearchRequest::new(query, page)).await
    };
    if !outcome.success {
        return ExitCode::FAILURE;
    }

    let state = store.snapshot();
    for book in select_all_books(&state) {
        println!("{}\t{}\t{}", book.id, book.title, book.author);
    }
    println!("showing {} of {} books", state.items().len(), state.total_count());

    ExitCode::SUCCESS
}
