use crate::models::Book;
use crate::state::CollectionState;

pub fn select_all_books(state: &CollectionState) -> &[Book] {
    state.items()
}

pub fn select_book(state: &CollectionState) -> Option<&Book> {
    state.selected_book()
}
