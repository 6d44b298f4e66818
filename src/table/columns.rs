//! Column model for filterable tables

use crate::table::format::Format;
use crate::table::pagination::PagingMode;
use crate::table::sort::SortDescriptor;
use crate::table::state::ApplyMode;

/// How a column can be filtered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// `{min?, max?}` range filter
    Numeric,
    /// Case-insensitive substring filter
    Text,
    /// Single value drawn from a fixed option list
    Category(&'static [&'static str]),
    /// Array of `{type, description}` entries; matches when any entry type is selected
    AlertList(&'static [&'static str]),
    /// Displayed only
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: ColumnKind,
    pub format: Format,
    pub filterable: bool,
}

impl Column {
    pub const fn new(key: &'static str, label: &'static str, kind: ColumnKind, format: Format) -> Self {
        Self {
            key,
            label,
            kind,
            format,
            filterable: false,
        }
    }

    pub const fn numeric(key: &'static str, label: &'static str, format: Format) -> Self {
        Self::new(key, label, ColumnKind::Numeric, format)
    }

    pub const fn text(key: &'static str, label: &'static str) -> Self {
        Self::new(key, label, ColumnKind::Text, Format::Plain)
    }

    pub const fn category(key: &'static str, label: &'static str, options: &'static [&'static str]) -> Self {
        Self::new(key, label, ColumnKind::Category(options), Format::Plain).filterable()
    }

    pub const fn plain(key: &'static str, label: &'static str, format: Format) -> Self {
        Self::new(key, label, ColumnKind::Plain, format)
    }

    pub const fn filterable(mut self) -> Self {
        self.filterable = true;
        self
    }

    /// Option list for categorical columns
    pub fn options(&self) -> &'static [&'static str] {
        match self.kind {
            ColumnKind::Category(options) | ColumnKind::AlertList(options) => options,
            _ => &[],
        }
    }
}

/// Static description of one table view
#[derive(Debug, Clone)]
pub struct TableConfig {
    /// Stable identifier, also the preferences key
    pub name: &'static str,
    pub title: &'static str,
    /// Endpoint relative to the API base
    pub endpoint: &'static str,
    pub columns: Vec<Column>,
    pub default_sort: SortDescriptor,
    /// Column sent as `sortColumn` when nothing is selected (server paging)
    pub fallback_sort_column: &'static str,
    pub paging: PagingMode,
    pub apply_mode: ApplyMode,
    /// Whether the view is tied to a reference date
    pub dated: bool,
}

impl TableConfig {
    pub fn column(&self, key: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.key == key)
    }

    pub fn filterable_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.filterable)
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.iter().map(|c| c.key)
    }
}
