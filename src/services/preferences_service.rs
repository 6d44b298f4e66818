//! Preferences Service
//!
//! Saves the applied filters, hidden columns and page size of a view so the
//! next session opens it the same way.

use crate::error::Result;
use crate::state::AppState;
use crate::table::{TableView, ViewPreferences};
use tracing::info;

pub struct PreferencesService;

impl PreferencesService {
    pub fn load(state: &AppState, view_name: &str) -> Result<Option<ViewPreferences>> {
        state.sqlite.load_preferences(view_name)
    }

    pub fn save(state: &AppState, view: &TableView) -> Result<ViewPreferences> {
        let name = view.config().name;
        let prefs = view.state().preferences();
        info!(
            "PreferencesService::save - {} ({} filters, {} hidden)",
            name,
            prefs.filters.iter().count(),
            prefs.hidden_columns.len()
        );

        state.sqlite.save_preferences(name, &prefs)?;
        Ok(prefs)
    }

    pub fn reset(state: &AppState, view_name: &str) -> Result<()> {
        info!("PreferencesService::reset - {}", view_name);
        state.sqlite.delete_preferences(view_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::testing::state;
    use crate::views::ViewKind;

    #[test]
    fn test_save_stores_applied_not_pending_filters() {
        let (state, _) = state();
        let mut view = ViewKind::UsStocks.open();

        view.edit(|f| f.set_min("pe_ratio", Some(10.0)));
        view.apply();
        view.edit(|f| f.set_max("pe_ratio", Some(40.0)));
        view.hide_column("stock_name");
        view.set_page_size(50);

        PreferencesService::save(&state, &view).unwrap();

        let saved = PreferencesService::load(&state, "us_stocks").unwrap().unwrap();
        assert_eq!(saved.page_size, 50);
        assert!(saved.hidden_columns.contains("stock_name"));
        assert_eq!(
            saved.filters.get("pe_ratio"),
            Some(&crate::table::Filter::Range {
                min: Some(10.0),
                max: None
            })
        );

        PreferencesService::reset(&state, "us_stocks").unwrap();
        assert!(PreferencesService::load(&state, "us_stocks").unwrap().is_none());
    }
}
