//! Filter / sort / page state of one table
//!
//! Edits land in the pending filter set. Depending on [`ApplyMode`] they are
//! either copied to the applied set on [`TableState::apply`] or straight away.
//! Every mutator reports whether the derived rows changed, so the owner can
//! decide whether a refetch is due.

use crate::table::columns::{Column, TableConfig};
use crate::table::filter::FilterSet;
use crate::table::pagination::{PageWindow, DEFAULT_PAGE_SIZE};
use crate::table::sort::SortDescriptor;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// When filter edits take effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplyMode {
    /// Edits wait for an explicit apply
    #[default]
    Explicit,
    /// Every edit is applied immediately
    Live,
}

/// Inclusive date window for views that query a period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self { start: end, end: start }
        }
    }

    /// The `days` days up to and including `end`
    pub fn last_days(end: NaiveDate, days: i64) -> Self {
        Self::new(end - chrono::Duration::days(days), end)
    }
}

/// Persisted per-view preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewPreferences {
    #[serde(default)]
    pub filters: FilterSet,
    #[serde(default)]
    pub hidden_columns: BTreeSet<String>,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

impl Default for ViewPreferences {
    fn default() -> Self {
        Self {
            filters: FilterSet::default(),
            hidden_columns: BTreeSet::new(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TableState {
    mode: ApplyMode,
    pending: FilterSet,
    applied: FilterSet,
    sort: SortDescriptor,
    window: PageWindow,
    hidden: BTreeSet<String>,
    date: Option<NaiveDate>,
    range: Option<DateRange>,
}

impl TableState {
    pub fn new(config: &TableConfig) -> Self {
        Self {
            mode: config.apply_mode,
            pending: FilterSet::new(),
            applied: FilterSet::new(),
            sort: config.default_sort.clone(),
            window: PageWindow::default(),
            hidden: BTreeSet::new(),
            date: None,
            range: None,
        }
    }

    pub fn mode(&self) -> ApplyMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: ApplyMode) -> bool {
        self.mode = mode;
        match mode {
            ApplyMode::Live => self.apply(),
            ApplyMode::Explicit => false,
        }
    }

    pub fn pending(&self) -> &FilterSet {
        &self.pending
    }

    pub fn applied(&self) -> &FilterSet {
        &self.applied
    }

    pub fn sort(&self) -> &SortDescriptor {
        &self.sort
    }

    pub fn window(&self) -> PageWindow {
        self.window
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    /// Edit the pending filters; in live mode the edit is applied at once
    pub fn edit<F>(&mut self, f: F) -> bool
    where
        F: FnOnce(&mut FilterSet),
    {
        f(&mut self.pending);
        match self.mode {
            ApplyMode::Live => self.apply(),
            ApplyMode::Explicit => false,
        }
    }

    /// Promote pending filters and return to page 1
    pub fn apply(&mut self) -> bool {
        let changed = self.applied != self.pending || self.window.page != 1;
        self.applied = self.pending.clone();
        self.window.reset();
        changed
    }

    pub fn clear_filters(&mut self) -> bool {
        let changed = self.applied.has_active() || self.window.page != 1;
        self.pending.clear();
        self.applied.clear();
        self.window.reset();
        changed
    }

    pub fn has_active_filters(&self) -> bool {
        self.applied.has_active()
    }

    /// Edits made since the last apply
    pub fn has_pending_changes(&self) -> bool {
        self.pending != self.applied
    }

    pub fn request_sort(&mut self, key: &str) -> bool {
        self.sort.request(key);
        true
    }

    pub fn set_sort(&mut self, sort: SortDescriptor) -> bool {
        let changed = self.sort != sort;
        self.sort = sort;
        changed
    }

    pub fn set_page(&mut self, page: usize) -> bool {
        let page = page.max(1);
        let changed = self.window.page != page;
        self.window.page = page;
        changed
    }

    pub fn set_page_size(&mut self, page_size: usize) -> bool {
        let window = PageWindow::new(1, page_size);
        let changed = self.window != window;
        self.window = window;
        changed
    }

    /// Reference date; a new date returns to page 1
    pub fn set_date(&mut self, date: Option<NaiveDate>) -> bool {
        if self.date == date {
            return false;
        }
        self.date = date;
        self.window.reset();
        true
    }

    pub fn range(&self) -> Option<DateRange> {
        self.range
    }

    /// Query period; a new period returns to page 1
    pub fn set_range(&mut self, range: Option<DateRange>) -> bool {
        if self.range == range {
            return false;
        }
        self.range = range;
        self.window.reset();
        true
    }

    pub fn is_hidden(&self, key: &str) -> bool {
        self.hidden.contains(key)
    }

    pub fn toggle_column(&mut self, key: &str) {
        if !self.hidden.remove(key) {
            self.hidden.insert(key.to_string());
        }
    }

    pub fn hide_column(&mut self, key: &str) {
        self.hidden.insert(key.to_string());
    }

    pub fn show_all_columns(&mut self) {
        self.hidden.clear();
    }

    pub fn visible_columns<'a>(&self, config: &'a TableConfig) -> Vec<&'a Column> {
        config.columns.iter().filter(|c| !self.is_hidden(c.key)).collect()
    }

    /// Server paging query: window, sort, reference date and applied filters
    pub fn query_params(&self, config: &TableConfig) -> Vec<(String, String)> {
        let mut params = self.window.query_params();

        let sort_column = self.sort.key.as_deref().unwrap_or(config.fallback_sort_column);
        params.push(("sortColumn".to_string(), sort_column.to_string()));
        params.push(("sortDirection".to_string(), self.sort.direction.as_query().to_string()));

        if config.dated {
            if let Some(date) = self.date {
                params.push(("date".to_string(), date.format("%Y-%m-%d").to_string()));
            }
        }

        params.extend(self.applied.query_params());
        params
    }

    pub fn preferences(&self) -> ViewPreferences {
        ViewPreferences {
            filters: self.applied.clone(),
            hidden_columns: self.hidden.clone(),
            page_size: self.window.page_size,
        }
    }

    /// Restore saved preferences; saved filters become both pending and applied
    pub fn restore(&mut self, prefs: ViewPreferences) {
        self.pending = prefs.filters.clone();
        self.applied = prefs.filters;
        self.hidden = prefs.hidden_columns;
        self.window = PageWindow::new(1, prefs.page_size);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::filter::Filter;
    use crate::table::format::Format;
    use crate::table::pagination::PagingMode;
    use crate::table::sort::SortDirection;

    fn config(apply_mode: ApplyMode) -> TableConfig {
        TableConfig {
            name: "test",
            title: "Test",
            endpoint: "stocks/latest",
            columns: vec![
                Column::text("stock", "Stock").filterable(),
                Column::numeric("price", "Price", Format::Currency).filterable(),
                Column::numeric("pe_ratio", "P/E", Format::Ratio).filterable(),
            ],
            default_sort: SortDescriptor::none(),
            fallback_sort_column: "stock",
            paging: PagingMode::Server,
            apply_mode,
            dated: true,
        }
    }

    #[test]
    fn test_explicit_mode_waits_for_apply() {
        let mut state = TableState::new(&config(ApplyMode::Explicit));
        state.set_page(3);

        let changed = state.edit(|f| f.set_min("price", Some(10.0)));
        assert!(!changed);
        assert!(state.has_pending_changes());
        assert!(!state.has_active_filters());
        assert_eq!(state.window().page, 3);

        assert!(state.apply());
        assert!(!state.has_pending_changes());
        assert!(state.has_active_filters());
        assert_eq!(state.window().page, 1);
    }

    #[test]
    fn test_live_mode_applies_each_edit() {
        let mut state = TableState::new(&config(ApplyMode::Live));
        state.set_page(2);

        assert!(state.edit(|f| f.set_text("stock", "nv")));
        assert!(state.has_active_filters());
        assert!(!state.has_pending_changes());
        assert_eq!(state.window().page, 1);
    }

    #[test]
    fn test_clear_filters_resets_both_sets() {
        let mut state = TableState::new(&config(ApplyMode::Explicit));
        state.edit(|f| f.set_max("pe_ratio", Some(30.0)));
        state.apply();
        state.edit(|f| f.set_text("stock", "a"));

        assert!(state.clear_filters());
        assert!(!state.has_active_filters());
        assert!(!state.has_pending_changes());
    }

    #[test]
    fn test_date_change_resets_page_once() {
        let mut state = TableState::new(&config(ApplyMode::Explicit));
        state.set_page(4);
        let date = NaiveDate::from_ymd_opt(2024, 5, 1);

        assert!(state.set_date(date));
        assert_eq!(state.window().page, 1);
        assert!(!state.set_date(date));
    }

    #[test]
    fn test_date_range_orders_bounds() {
        let a = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let b = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let range = DateRange::new(a, b);
        assert_eq!(range.start, b);
        assert_eq!(DateRange::last_days(a, 30).start, b);

        let mut state = TableState::new(&config(ApplyMode::Live));
        state.set_page(2);
        assert!(state.set_range(Some(range)));
        assert_eq!(state.window().page, 1);
    }

    #[test]
    fn test_query_params_for_server_paging() {
        let cfg = config(ApplyMode::Explicit);
        let mut state = TableState::new(&cfg);
        state.set_date(NaiveDate::from_ymd_opt(2024, 5, 1));
        state.edit(|f| f.set_min("price", Some(5.0)));
        state.apply();

        let params = state.query_params(&cfg);
        let get = |k: &str| params.iter().find(|(key, _)| key == k).map(|(_, v)| v.as_str());
        assert_eq!(get("page"), Some("1"));
        assert_eq!(get("pageSize"), Some("100"));
        assert_eq!(get("sortColumn"), Some("stock"));
        assert_eq!(get("sortDirection"), Some("ASC"));
        assert_eq!(get("date"), Some("2024-05-01"));
        assert_eq!(get("min_price"), Some("5"));

        state.request_sort("price");
        state.request_sort("price");
        let params = state.query_params(&cfg);
        assert!(params.contains(&("sortColumn".to_string(), "price".to_string())));
        assert!(params.contains(&("sortDirection".to_string(), "DESC".to_string())));
        assert_eq!(state.sort().direction, SortDirection::Descending);
    }

    #[test]
    fn test_column_visibility() {
        let cfg = config(ApplyMode::Explicit);
        let mut state = TableState::new(&cfg);
        state.toggle_column("pe_ratio");
        let keys: Vec<&str> = state.visible_columns(&cfg).iter().map(|c| c.key).collect();
        assert_eq!(keys, vec!["stock", "price"]);

        state.toggle_column("pe_ratio");
        assert_eq!(state.visible_columns(&cfg).len(), 3);
    }

    #[test]
    fn test_preferences_restore() {
        let cfg = config(ApplyMode::Explicit);
        let mut state = TableState::new(&cfg);
        state.edit(|f| f.set_min("price", Some(1.0)));
        state.apply();
        state.hide_column("pe_ratio");
        state.set_page_size(50);

        let prefs = state.preferences();
        let mut restored = TableState::new(&cfg);
        restored.restore(prefs.clone());

        assert_eq!(restored.preferences(), prefs);
        assert!(restored.has_active_filters());
        assert!(!restored.has_pending_changes());
        assert_eq!(restored.window().page_size, 50);
    }

    #[test]
    fn test_reselecting_restored_choice_keeps_it_applied() {
        let cfg = config(ApplyMode::Explicit);
        let mut saved = FilterSet::new();
        saved.toggle_choice("force_index_alert_state", "$$$");
        let mut state = TableState::new(&cfg);
        state.restore(ViewPreferences {
            filters: saved,
            ..ViewPreferences::default()
        });

        state.edit(|f| f.select_choice("force_index_alert_state", "$$$"));
        state.apply();

        match state.applied().get("force_index_alert_state") {
            Some(Filter::OneOf { values }) => assert!(values.contains("$$$")),
            other => panic!("selection lost: {:?}", other),
        }
        assert!(state.preferences().filters.has_active());
    }
}
