//! Generic filterable table
//!
//! Each dashboard view is a [`columns::TableConfig`] plus a
//! [`view::ViewSource`]; filtering, sorting, paging and fetch sequencing are
//! shared by all of them.

pub mod columns;
pub mod fence;
pub mod filter;
pub mod format;
pub mod pagination;
pub mod render;
pub mod sort;
pub mod state;
pub mod view;

pub use columns::{Column, ColumnKind, TableConfig};
pub use filter::{apply_filters, parse_bound, Filter, FilterSet};
pub use format::Format;
pub use pagination::{PageWindow, PagingMode, DEFAULT_PAGE_SIZE};
pub use sort::{SortDescriptor, SortDirection};
pub use state::{ApplyMode, DateRange, TableState, ViewPreferences};
pub use view::{FetchOutcome, FetchRequest, TableView, ViewSource};
