//! The client-side snapshot of the book collection and the reducer that is the
//! only way to change it.

use tracing::debug;

use crate::error::ApiError;
use crate::models::{Book, BookPage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Create,
    FetchAll,
    FetchById,
    Update,
    Delete,
    Search,
}

impl OperationKind {
    pub const ALL: [OperationKind; 6] = [
        OperationKind::Create,
        OperationKind::FetchAll,
        OperationKind::FetchById,
        OperationKind::Update,
        OperationKind::Delete,
        OperationKind::Search,
    ];

    fn index(self) -> usize {
        self as usize
    }

    /// Shown when the server gives no usable message.
    pub fn fallback_message(self) -> &'static str {
        match self {
            OperationKind::Create => "Something went wrong while creating the book",
            OperationKind::FetchAll => "Something went wrong while fetching the books",
            OperationKind::FetchById => "Something went wrong while fetching the book",
            OperationKind::Update => "Something went wrong while updating the book",
            OperationKind::Delete => "Something went wrong while deleting the book",
            OperationKind::Search => "Something went wrong while searching the books",
        }
    }

    /// Used when the server reports success without a message.
    pub fn success_message(self) -> &'static str {
        match self {
            OperationKind::Create => "Book created",
            OperationKind::FetchAll => "Books fetched",
            OperationKind::FetchById => "Book fetched",
            OperationKind::Update => "Book updated",
            OperationKind::Delete => "Book deleted",
            OperationKind::Search => "Search complete",
        }
    }

    fn slot(self) -> Option<Slot> {
        match self {
            OperationKind::FetchAll | OperationKind::Search => Some(Slot::Items),
            OperationKind::FetchById => Some(Slot::SelectedBook),
            _ => None,
        }
    }
}

/// A piece of state that some operations overwrite wholesale.
#[derive(Debug, Clone, Copy)]
enum Slot {
    Items,
    SelectedBook,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OperationStatus {
    #[default]
    Idle,
    Pending,
    Succeeded,
    Failed(ApiError),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OperationState {
    in_flight: u32,
    last: OperationStatus,
}

impl OperationState {
    pub fn is_pending(&self) -> bool {
        self.in_flight > 0
    }

    pub fn status(&self) -> OperationStatus {
        if self.is_pending() {
            OperationStatus::Pending
        } else {
            self.last.clone()
        }
    }

    pub fn last_error(&self) -> Option<&ApiError> {
        match &self.last {
            OperationStatus::Failed(error) => Some(error),
            _ => None,
        }
    }
}

/// The successful result of an operation, as far as the snapshot is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    Created(Option<Book>),
    Listed(BookPage),
    Fetched(Option<Book>),
    Updated { id: String, book: Option<Book> },
    Deleted(String),
    Searched(BookPage),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Dispatched {
        kind: OperationKind,
        seq: u64,
    },
    Settled {
        kind: OperationKind,
        seq: u64,
        result: Result<Settlement, ApiError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CollectionState {
    items: Vec<Book>,
    selected_book: Option<Book>,
    total_count: u64,
    error: Option<String>,
    operations: [OperationState; 6],
    items_seq: u64,
    selected_seq: u64,
}

impl CollectionState {
    pub fn items(&self) -> &[Book] {
        &self.items
    }

    pub fn selected_book(&self) -> Option<&Book> {
        self.selected_book.as_ref()
    }

    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    /// Message of the most recently failed operation, of any kind.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// True while any operation is in flight.
    pub fn loading(&self) -> bool {
        self.operations.iter().any(OperationState::is_pending)
    }

    pub fn operation(&self, kind: OperationKind) -> &OperationState {
        &self.operations[kind.index()]
    }

    fn operation_mut(&mut self, kind: OperationKind) -> &mut OperationState {
        &mut self.operations[kind.index()]
    }

    fn applied_seq(&mut self, slot: Slot) -> &mut u64 {
        match slot {
            Slot::Items => &mut self.items_seq,
            Slot::SelectedBook => &mut self.selected_seq,
        }
    }

    /// Records `seq` for a wholesale overwrite. Returns false if a newer
    /// request has already written the slot.
    fn claim(&mut self, kind: OperationKind, seq: u64) -> bool {
        let Some(slot) = kind.slot() else {
            return true;
        };
        let applied = self.applied_seq(slot);
        if seq < *applied {
            return false;
        }
        *applied = seq;
        true
    }

    fn replace_page(&mut self, page: BookPage) {
        let mut books = page.books;
        let mut seen = std::collections::HashSet::new();
        books.retain(|book| seen.insert(book.id.clone()));
        self.items = books;
        self.total_count = page.total_count;
    }

    fn append(&mut self, book: Book) {
        self.items.retain(|item| item.id != book.id);
        self.items.push(book);
    }

    fn replace_in_place(&mut self, id: &str, book: Book) {
        let Some(index) = self.items.iter().position(|item| item.id == id) else {
            debug!("Updated book {} is not on the current page", id);
            return;
        };
        let new_id = book.id.clone();
        self.items[index] = book;
        if new_id != id {
            let mut position = 0;
            self.items.retain(|item| {
                let keep = position == index || item.id != new_id;
                position += 1;
                keep
            });
        }
    }

    fn remove(&mut self, id: &str) {
        self.items.retain(|item| item.id != id);
    }

    fn apply(&mut self, settlement: Settlement) {
        match settlement {
            Settlement::Created(Some(book)) => self.append(book),
            Settlement::Created(None) => debug!("Create succeeded without a book, nothing to add"),
            Settlement::Listed(page) | Settlement::Searched(page) => self.replace_page(page),
            Settlement::Fetched(book) => self.selected_book = book,
            Settlement::Updated { id, book: Some(book) } => self.replace_in_place(&id, book),
            Settlement::Updated { id, book: None } => {
                debug!("Update of {} succeeded without a book, nothing to replace", id)
            }
            Settlement::Deleted(id) => self.remove(&id),
        }
    }
}

/// Computes the next state from the previous one and an event.
pub fn reduce(mut state: CollectionState, event: &Event) -> CollectionState {
    match event {
        Event::Dispatched { kind, .. } => {
            state.operation_mut(*kind).in_flight += 1;
        }
        Event::Settled { kind, seq, result } => {
            let operation = state.operation_mut(*kind);
            operation.in_flight = operation.in_flight.saturating_sub(1);

            match result {
                Ok(settlement) => {
                    state.operation_mut(*kind).last = OperationStatus::Succeeded;
                    if state.claim(*kind, *seq) {
                        state.apply(settlement.clone());
                    } else {
                        debug!("Dropping stale {:?} result #{}", kind, seq);
                    }
                }
                Err(error) => {
                    state.operation_mut(*kind).last = OperationStatus::Failed(error.clone());
                    state.error = Some(error.message().to_string());
                }
            }
        }
    }
    state
}

#[cfg(test)]
mod tests {
    use super::*;

    use super::OperationKind::*;

    fn book(id: &str, title: &str) -> Book {
        Book {
            id: id.to_string(),
            title: title.to_string(),
            author: "Anon".to_string(),
            summary: String::new(),
            created_at: None,
            updated_at: None,
        }
    }

    fn page(books: Vec<Book>, total_count: u64) -> BookPage {
        BookPage { books, total_count }
    }

    fn ids(state: &CollectionState) -> Vec<&str> {
        state.items().iter().map(|b| b.id.as_str()).collect()
    }

    fn dispatch(state: CollectionState, kind: OperationKind, seq: u64) -> CollectionState {
        reduce(state, &Event::Dispatched { kind, seq })
    }

    fn finish(
        state: CollectionState,
        kind: OperationKind,
        seq: u64,
        result: Result<Settlement, ApiError>,
    ) -> CollectionState {
        reduce(state, &Event::Settled { kind, seq, result })
    }

    fn settle(
        state: CollectionState,
        kind: OperationKind,
        seq: u64,
        settlement: Settlement,
    ) -> CollectionState {
        finish(dispatch(state, kind, seq), kind, seq, Ok(settlement))
    }

    fn listed(books: Vec<Book>) -> CollectionState {
        let total_count = books.len() as u64;
        let state = CollectionState::default();
        settle(state, FetchAll, 1, Settlement::Listed(page(books, total_count)))
    }

    #[test]
    fn starts_empty() {
        let state = CollectionState::default();

        assert!(state.items().is_empty());
        assert!(!state.loading());
        assert_eq!(None, state.error());
        assert_eq!(None, state.selected_book());
        assert_eq!(0, state.total_count());
        for kind in OperationKind::ALL {
            assert_eq!(OperationStatus::Idle, state.operation(kind).status());
        }
    }

    #[test]
    fn dispatch_sets_pending_without_touching_error() {
        let mut state = CollectionState::default();
        state.error = Some("earlier".to_string());

        let state = dispatch(state, Delete, 1);

        assert!(state.loading());
        assert_eq!(OperationStatus::Pending, state.operation(Delete).status());
        assert_eq!(Some("earlier"), state.error());
    }

    #[test]
    fn loading_stays_true_until_every_operation_settles() {
        let state = dispatch(CollectionState::default(), FetchAll, 1);
        let state = dispatch(state, Delete, 2);
        let state = finish(state, Delete, 2, Ok(Settlement::Deleted("x".into())));

        assert!(state.loading());
        assert!(state.operation(FetchAll).is_pending());

        let state = finish(state, FetchAll, 1, Ok(Settlement::Listed(BookPage::default())));
        assert!(!state.loading());
    }

    #[test]
    fn create_appends_at_the_end() {
        let state = listed(vec![book("a", "A")]);

        let state = settle(state, Create, 2, Settlement::Created(Some(book("b1", "Dune"))));

        assert_eq!(vec!["a", "b1"], ids(&state));
        assert_eq!(OperationStatus::Succeeded, state.operation(Create).status());
    }

    #[test]
    fn create_without_payload_changes_nothing() {
        let before = listed(vec![book("a", "A")]);

        let after = settle(before.clone(), Create, 2, Settlement::Created(None));

        assert_eq!(before.items(), after.items());
    }

    #[test]
    fn create_of_known_id_keeps_ids_unique() {
        let state = listed(vec![book("a", "A"), book("b", "B")]);

        let state = settle(state, Create, 2, Settlement::Created(Some(book("a", "A2"))));

        assert_eq!(vec!["b", "a"], ids(&state));
    }

    #[test]
    fn update_replaces_in_place() {
        let state = listed(vec![book("a", "A"), book("b", "B"), book("c", "C")]);
        let updated = Settlement::Updated {
            id: "b".into(),
            book: Some(book("b", "B2")),
        };

        let state = settle(state, Update, 2, updated);

        assert_eq!(vec!["a", "b", "c"], ids(&state));
        assert_eq!("B2", state.items()[1].title);
        assert_eq!(book("a", "A"), state.items()[0]);
        assert_eq!(book("c", "C"), state.items()[2]);
    }

    #[test]
    fn update_of_id_off_the_page_is_a_no_op() {
        let before = listed(vec![book("a", "A")]);
        let updated = Settlement::Updated {
            id: "zzz".into(),
            book: Some(book("zzz", "Z")),
        };

        let after = settle(before.clone(), Update, 2, updated);

        assert_eq!(before.items(), after.items());
        assert_eq!(None, after.error());
    }

    #[test]
    fn delete_removes_only_the_target() {
        let state = listed(vec![book("b1", "A"), book("b2", "B")]);

        let state = settle(state, Delete, 2, Settlement::Deleted("b1".into()));
        assert_eq!(vec!["b2"], ids(&state));

        let state = settle(state, Delete, 3, Settlement::Deleted("b1".into()));
        assert_eq!(vec!["b2"], ids(&state));
    }

    #[test]
    fn listing_replaces_rather_than_accumulates() {
        let state = listed(vec![book("a", "A"), book("b", "B")]);

        let state = settle(state, FetchAll, 2, Settlement::Listed(page(vec![book("c", "C")], 41)));

        assert_eq!(vec!["c"], ids(&state));
        assert_eq!(41, state.total_count());
    }

    #[test]
    fn listing_drops_duplicate_ids() {
        let state = listed(vec![book("a", "A"), book("a", "A again"), book("b", "B")]);

        assert_eq!(vec!["a", "b"], ids(&state));
        assert_eq!("A", state.items()[0].title);
    }

    #[test]
    fn fetch_by_id_overwrites_selection_even_with_nothing() {
        let found = Settlement::Fetched(Some(book("a", "A")));
        let state = settle(CollectionState::default(), FetchById, 1, found);
        assert_eq!(Some(&book("a", "A")), state.selected_book());

        let state = settle(state, FetchById, 2, Settlement::Fetched(None));
        assert_eq!(None, state.selected_book());
    }

    #[test]
    fn failure_records_error_and_keeps_items() {
        let state = listed(vec![book("a", "A")]);
        let error = ApiError::Conflict("Book already exists".into());

        let state = dispatch(state, Create, 2);
        let state = finish(state, Create, 2, Err(error.clone()));

        assert_eq!(vec!["a"], ids(&state));
        assert_eq!(Some("Book already exists"), state.error());
        assert_eq!(OperationStatus::Failed(error.clone()), state.operation(Create).status());
        assert_eq!(Some(&error), state.operation(Create).last_error());
        assert!(!state.loading());
    }

    #[test]
    fn last_error_wins() {
        let mut state = CollectionState::default();
        for (seq, kind, message) in [(1, Delete, "first"), (2, Search, "second")] {
            state = dispatch(state, kind, seq);
            state = finish(state, kind, seq, Err(ApiError::Transport(message.into())));
        }

        assert_eq!(Some("second"), state.error());
        let delete_error = state.operation(Delete).last_error();
        assert_eq!(Some("first"), delete_error.map(ApiError::message));
    }

    #[test]
    fn stale_listing_does_not_overwrite_newer_search() {
        let state = dispatch(CollectionState::default(), FetchAll, 1);
        let state = dispatch(state, Search, 2);
        let searched = Settlement::Searched(page(vec![book("s", "S")], 1));
        let state = finish(state, Search, 2, Ok(searched));
        let listed = Settlement::Listed(page(vec![book("a", "A")], 9));
        let state = finish(state, FetchAll, 1, Ok(listed));

        assert_eq!(vec!["s"], ids(&state));
        assert_eq!(1, state.total_count());
        assert!(!state.loading());
    }

    #[test]
    fn dropped_stale_success_still_marks_the_kind_succeeded() {
        let state = dispatch(CollectionState::default(), FetchAll, 1);
        let state = finish(state, FetchAll, 1, Err(ApiError::Transport("old".into())));
        let state = dispatch(state, FetchAll, 2);
        let state = dispatch(state, Search, 3);
        let searched = Settlement::Searched(page(vec![book("s", "S")], 1));
        let state = finish(state, Search, 3, Ok(searched));
        let listed = Settlement::Listed(page(vec![book("a", "A")], 1));
        let state = finish(state, FetchAll, 2, Ok(listed));

        assert_eq!(OperationStatus::Succeeded, state.operation(FetchAll).status());
        assert_eq!(vec!["s"], ids(&state));
        assert_eq!(Some("old"), state.error());
    }

    #[test]
    fn stale_fetch_by_id_keeps_newer_selection() {
        let state = dispatch(CollectionState::default(), FetchById, 1);
        let state = dispatch(state, FetchById, 2);
        let state = finish(state, FetchById, 2, Ok(Settlement::Fetched(Some(book("new", "N")))));
        let state = finish(state, FetchById, 1, Ok(Settlement::Fetched(Some(book("old", "O")))));

        assert_eq!(Some("new"), state.selected_book().map(|b| b.id.as_str()));
    }

    #[test]
    fn incremental_operations_ignore_sequence_order() {
        let state = dispatch(CollectionState::default(), Delete, 1);
        let state = settle(state, FetchAll, 5, Settlement::Listed(page(vec![book("a", "A")], 1)));

        let state = finish(state, Delete, 1, Ok(Settlement::Deleted("a".into())));

        assert!(ids(&state).is_empty());
    }
}
