use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tracing::info;

use crate::models::{Book, BookPage, BookUpdate, NewBook, PageRequest, SearchRequest};
use crate::outcome::Outcome;
use crate::repo::BookRepo;
use crate::state::{reduce, CollectionState, Event, OperationKind, Settlement};

/// Owns the collection snapshot and drives the remote book service.
///
/// Every operation marks its kind as pending, awaits the service and then
/// folds the result into the snapshot. Operations may run concurrently; all
/// writes go through [`reduce`] one event at a time.
pub struct BookStore<R> {
    repo: R,
    state: watch::Sender<CollectionState>,
    next_seq: AtomicU64,
}

impl<R> BookStore<R>
where
    R: BookRepo + Sync,
{
    pub fn new(repo: R) -> Self {
        let (state, _) = watch::channel(CollectionState::default());
        BookStore {
            repo,
            state,
            next_seq: AtomicU64::new(1),
        }
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// A copy of the current snapshot.
    pub fn snapshot(&self) -> CollectionState {
        self.state.borrow().clone()
    }

    /// Borrows the current snapshot. Hold the guard briefly: writers wait on it.
    pub fn state(&self) -> watch::Ref<'_, CollectionState> {
        self.state.borrow()
    }

    /// A receiver that is woken after every change to the snapshot.
    pub fn subscribe(&self) -> watch::Receiver<CollectionState> {
        self.state.subscribe()
    }

    pub async fn create_book(&self, new_book: NewBook) -> Outcome<Option<Book>> {
        self.run(OperationKind::Create, self.repo.insert_book(new_book), |book| {
            if let Some(book) = book {
                info!("Created book {}", book.id);
            }
            Settlement::Created(book.clone())
        })
        .await
    }

    pub async fn fetch_all_books(&self, page: PageRequest) -> Outcome<BookPage> {
        self.run(OperationKind::FetchAll, self.repo.list_books(page), |page| {
            info!(
                "Retrieved {} of {} books from the book service",
                page.books.len(),
                page.total_count
            );
            Settlement::Listed(page.clone())
        })
        .await
    }

    pub async fn fetch_book(&self, id: impl Into<String>) -> Outcome<Option<Book>> {
        let id = id.into();
        let call = self.repo.get_book(id.clone());
        self.run(OperationKind::FetchById, call, |book| {
            match book {
                Some(book) => info!("Retrieved book {}", book.id),
                None => info!("Book service has no book with ID: {}", id),
            }
            Settlement::Fetched(book.clone())
        })
        .await
    }

    pub async fn update_book(&self, update: BookUpdate) -> Outcome<Option<Book>> {
        let id = update.id.clone();
        self.run(OperationKind::Update, self.repo.update_book(update), |book| {
            info!("Updated book {}", id);
            Settlement::Updated {
                id: id.clone(),
                book: book.clone(),
            }
        })
        .await
    }

    pub async fn delete_book(&self, id: impl Into<String>) -> Outcome<()> {
        let id = id.into();
        let call = self.repo.delete_book(id.clone());
        self.run(OperationKind::Delete, call, |_| {
            info!("Deleted book {}", id);
            Settlement::Deleted(id.clone())
        })
        .await
    }

    pub async fn search_books(&self, search: SearchRequest) -> Outcome<BookPage> {
        let query = search.query.clone();
        self.run(OperationKind::Search, self.repo.search_books(search), |page| {
            info!("Search for {:?} matched {} books", query, page.total_count);
            Settlement::Searched(page.clone())
        })
        .await
    }

    async fn run<T, F>(
        &self,
        kind: OperationKind,
        call: F,
        settle: impl FnOnce(&T) -> Settlement,
    ) -> Outcome<T>
    where
        F: Future<Output = Outcome<T>>,
    {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.apply(Event::Dispatched { kind, seq });

        let outcome = call.await;

        let result = outcome.as_result().map(settle);
        self.apply(Event::Settled { kind, seq, result });

        outcome
    }

    fn apply(&self, event: Event) {
        self.state.send_modify(|state| {
            *state = reduce(std::mem::take(state), &event);
        });
    }
}
