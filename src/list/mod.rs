//! List renderer pieces: query state, search debounce, delete confirmation and the table view.

mod confirm;
mod debounce;
mod query;
mod view;
pub use confirm::{DeleteConfirmation, DELETE_CONFIRM_MESSAGE, DELETE_CONFIRM_TITLE};
pub use debounce::Debouncer;
pub use query::{ListQueryState, PAGE_SIZE_OPTIONS};
pub use view::{
    copy_record, render, sort_page, ActionSet, HeaderCell, ListInput, ListRender, RowAction, RowView,
    SortDirection, SortState, TableView, ACTIONS_HEADER,
};
