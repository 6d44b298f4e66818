//! A table bound to its data source
//!
//! `TableView` owns the fetched dataset and the [`TableState`] that derives
//! the visible rows from it. Mutations that need fresh data mark the view
//! stale; the owner then runs exactly one fetch through
//! [`TableView::begin_fetch`] / [`TableView::complete`]. Fetches are fenced:
//! only the most recently issued one may replace the dataset.

use crate::api::types::{Paged, Row};
use crate::error::{AppError, Result};
use crate::table::columns::{Column, TableConfig};
use crate::table::fence::{RequestFence, Ticket};
use crate::table::filter::{apply_filters, FilterSet};
use crate::table::pagination::PagingMode;
use crate::table::sort::{sort_rows, SortDescriptor};
use crate::table::state::{ApplyMode, DateRange, TableState, ViewPreferences};
use chrono::NaiveDate;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error};

/// Path and query of one outbound fetch
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub path: String,
    pub query: Vec<(String, String)>,
}

/// Where a table's rows come from
pub trait ViewSource: Send + Sync {
    fn config(&self) -> &TableConfig;

    fn request(&self, state: &TableState) -> FetchRequest {
        let config = self.config();
        let query = match config.paging {
            PagingMode::Server => state.query_params(config),
            PagingMode::Client => date_query(config, state),
        };
        FetchRequest {
            path: config.endpoint.to_string(),
            query,
        }
    }

    /// Turn a response body into rows; views reshape rows here
    fn decode(&self, body: Value) -> Result<Paged<Row>> {
        decode_rows(body)
    }
}

/// `date=` for dated views that have a reference date
pub fn date_query(config: &TableConfig, state: &TableState) -> Vec<(String, String)> {
    match state.date() {
        Some(date) if config.dated => vec![("date".to_string(), date.format("%Y-%m-%d").to_string())],
        _ => Vec::new(),
    }
}

/// Accepts a bare row array or a `{data, totalPages, totalCount}` envelope
pub fn decode_rows(body: Value) -> Result<Paged<Row>> {
    match body {
        Value::Array(items) => {
            let rows = items
                .into_iter()
                .map(|item| match item {
                    Value::Object(row) => Ok(row),
                    other => Err(AppError::Validation(format!("Expected a row object, got {}", other))),
                })
                .collect::<Result<Vec<Row>>>()?;
            Ok(Paged::complete(rows))
        }
        Value::Null => Ok(Paged::complete(Vec::new())),
        other => Ok(serde_json::from_value(other)?),
    }
}

/// Result of handing a response to [`TableView::complete`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied,
    /// A newer fetch was issued meanwhile; the response was dropped
    Superseded,
    /// The fetch failed; the previous dataset stays visible
    Failed(String),
}

pub struct TableView {
    source: Arc<dyn ViewSource>,
    state: TableState,
    rows: Vec<Row>,
    total_pages: usize,
    total_count: usize,
    loaded: bool,
    stale: bool,
    last_error: Option<String>,
    fence: RequestFence,
}

impl TableView {
    pub fn new(source: Arc<dyn ViewSource>) -> Self {
        let state = TableState::new(source.config());
        Self {
            source,
            state,
            rows: Vec::new(),
            total_pages: 1,
            total_count: 0,
            loaded: false,
            stale: true,
            last_error: None,
            fence: RequestFence::new(),
        }
    }

    pub fn config(&self) -> &TableConfig {
        self.source.config()
    }

    pub fn source(&self) -> Arc<dyn ViewSource> {
        self.source.clone()
    }

    pub fn state(&self) -> &TableState {
        &self.state
    }

    fn server_paged(&self) -> bool {
        self.config().paging == PagingMode::Server
    }

    /// Filter, sort and page changes only need a refetch under server paging
    fn query_changed(&mut self, changed: bool) -> bool {
        if changed && self.server_paged() {
            self.stale = true;
        }
        changed
    }

    pub fn edit<F>(&mut self, f: F) -> bool
    where
        F: FnOnce(&mut FilterSet),
    {
        let changed = self.state.edit(f);
        self.query_changed(changed)
    }

    pub fn apply(&mut self) -> bool {
        let changed = self.state.apply();
        self.query_changed(changed)
    }

    pub fn clear_filters(&mut self) -> bool {
        let changed = self.state.clear_filters();
        self.query_changed(changed)
    }

    pub fn set_mode(&mut self, mode: ApplyMode) -> bool {
        let changed = self.state.set_mode(mode);
        self.query_changed(changed)
    }

    pub fn request_sort(&mut self, key: &str) -> bool {
        let changed = self.state.request_sort(key);
        self.query_changed(changed)
    }

    pub fn set_sort(&mut self, sort: SortDescriptor) -> bool {
        let changed = self.state.set_sort(sort);
        self.query_changed(changed)
    }

    pub fn set_page(&mut self, page: usize) -> bool {
        let changed = self.state.set_page(page);
        self.query_changed(changed)
    }

    pub fn set_page_size(&mut self, page_size: usize) -> bool {
        let changed = self.state.set_page_size(page_size);
        self.query_changed(changed)
    }

    /// A new reference date always needs fresh data
    pub fn set_date(&mut self, date: Option<NaiveDate>) -> bool {
        let changed = self.state.set_date(date);
        if changed {
            self.stale = true;
        }
        changed
    }

    pub fn set_range(&mut self, range: Option<DateRange>) -> bool {
        let changed = self.state.set_range(range);
        if changed {
            self.stale = true;
        }
        changed
    }

    pub fn toggle_column(&mut self, key: &str) {
        self.state.toggle_column(key);
    }

    pub fn hide_column(&mut self, key: &str) {
        self.state.hide_column(key);
    }

    pub fn restore(&mut self, prefs: ViewPreferences) {
        self.state.restore(prefs);
        self.query_changed(true);
    }

    /// Mark the dataset out of date, e.g. after the watchlist changed
    pub fn invalidate(&mut self) {
        self.stale = true;
    }

    pub fn needs_fetch(&self) -> bool {
        self.stale
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Issue a ticket for the current state; earlier tickets become stale
    pub fn begin_fetch(&mut self) -> (Ticket, FetchRequest) {
        self.stale = false;
        let ticket = self.fence.issue();
        (ticket, self.source.request(&self.state))
    }

    pub fn complete(&mut self, ticket: Ticket, result: Result<Value>) -> FetchOutcome {
        if !self.fence.is_current(ticket) {
            debug!("{}: dropping superseded response {:?}", self.config().name, ticket);
            return FetchOutcome::Superseded;
        }

        match result.and_then(|body| self.source.decode(body)) {
            Ok(page) => {
                self.total_count = page.total_count;
                self.total_pages = page.total_pages.max(1);
                self.rows = page.data;
                self.loaded = true;
                self.last_error = None;
                FetchOutcome::Applied
            }
            Err(e) => {
                error!("{}: fetch failed, keeping previous data: {}", self.config().name, e);
                let message = e.user_message();
                self.last_error = Some(message.clone());
                FetchOutcome::Failed(message)
            }
        }
    }

    /// User-facing message of the last failed fetch
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Dataset as fetched
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Rows matching the applied filters, sorted; not paged
    pub fn filtered_rows(&self) -> Vec<Row> {
        if self.server_paged() {
            return self.rows.clone();
        }
        let mut rows = apply_filters(&self.rows, self.state.applied());
        sort_rows(&mut rows, self.state.sort());
        rows
    }

    /// Rows of the current page
    pub fn visible_rows(&self) -> Vec<Row> {
        if self.server_paged() {
            return self.rows.clone();
        }
        self.state.window().slice(&self.filtered_rows()).to_vec()
    }

    pub fn visible_columns(&self) -> Vec<&Column> {
        self.state.visible_columns(self.config())
    }

    pub fn total_count(&self) -> usize {
        if self.server_paged() {
            self.total_count
        } else {
            apply_filters(&self.rows, self.state.applied()).len()
        }
    }

    pub fn total_pages(&self) -> usize {
        if self.server_paged() {
            self.total_pages
        } else {
            self.state.window().total_pages(self.total_count())
        }
    }
}
