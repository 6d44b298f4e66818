//! US insider trading
//!
//! Server paged over a date window (last 30 days unless set). Filters apply
//! as they are typed.

use crate::table::{
    ApplyMode, Column, ColumnKind, DateRange, FetchRequest, Format, PagingMode, SortDescriptor, SortDirection, TableConfig,
    TableState, ViewSource,
};
use chrono::{Local, NaiveDate};

pub const DEFAULT_WINDOW_DAYS: i64 = 30;

pub const TRANSACTION_TYPES: &[&str] = &["P", "S"];

pub struct InsiderTrades {
    config: TableConfig,
}

impl InsiderTrades {
    pub fn new() -> Self {
        Self {
            config: TableConfig {
                name: "us_insider",
                title: "US Insider Trading",
                endpoint: "stocks/insider",
                columns: columns(),
                default_sort: SortDescriptor::by("datetime", SortDirection::Descending),
                fallback_sort_column: "datetime",
                paging: PagingMode::Server,
                apply_mode: ApplyMode::Live,
                dated: false,
            },
        }
    }

    /// Window used when none was chosen
    pub fn default_range(today: NaiveDate) -> DateRange {
        DateRange::last_days(today, DEFAULT_WINDOW_DAYS)
    }
}

impl Default for InsiderTrades {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewSource for InsiderTrades {
    fn config(&self) -> &TableConfig {
        &self.config
    }

    fn request(&self, state: &TableState) -> FetchRequest {
        let range = state
            .range()
            .unwrap_or_else(|| Self::default_range(Local::now().date_naive()));

        let mut query = state.query_params(&self.config);
        query.push(("start_date".to_string(), range.start.format("%Y-%m-%d").to_string()));
        query.push(("end_date".to_string(), range.end.format("%Y-%m-%d").to_string()));

        FetchRequest {
            path: self.config.endpoint.to_string(),
            query,
        }
    }
}

fn columns() -> Vec<Column> {
    use Format::*;

    vec![
        Column::text("stock", "Stock").filterable(),
        Column::text("stock_name", "Company Name"),
        Column::text("insider_name", "Insider Name").filterable(),
        Column::new("transaction_type", "Transaction Type", ColumnKind::Category(TRANSACTION_TYPES), TransactionType)
            .filterable(),
        Column::plain("relationship", "Relationship", Relationship),
        Column::numeric("shares_traded", "Shares Traded", Number).filterable(),
        Column::numeric("price_per_share", "Price/Share", Currency),
        Column::numeric("total_value", "Total Value", Currency).filterable(),
        Column::numeric("shares_owned_following", "Shares Owned After", Number),
        Column::numeric("one_month_price", "1M Price", Currency),
        Column::numeric("three_month_price", "3M Price", Currency),
        Column::numeric("one_month_return", "1M Return", Percentage).filterable(),
        Column::numeric("three_month_return", "3M Return", Percentage).filterable(),
        Column::plain("datetime", "Transaction Date", Date),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::TableView;
    use std::sync::Arc;

    fn get<'a>(query: &'a [(String, String)], key: &str) -> Vec<&'a str> {
        query
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    #[test]
    fn test_live_filters_refetch_from_page_one() {
        let mut view = TableView::new(Arc::new(InsiderTrades::new()));
        let start = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 4, 30).unwrap();
        view.set_range(Some(DateRange::new(start, end)));
        view.begin_fetch();
        view.set_page(3);
        view.begin_fetch();

        assert!(view.edit(|f| f.toggle_choice("transaction_type", "P")));
        assert!(view.needs_fetch());

        let (_, request) = view.begin_fetch();
        let query = request.query;
        assert_eq!(get(&query, "page"), vec!["1"]);
        assert_eq!(get(&query, "sortColumn"), vec!["datetime"]);
        assert_eq!(get(&query, "sortDirection"), vec!["DESC"]);
        assert_eq!(get(&query, "transaction_type[]"), vec!["P"]);
        assert_eq!(get(&query, "start_date"), vec!["2024-04-01"]);
        assert_eq!(get(&query, "end_date"), vec!["2024-04-30"]);
    }

    #[test]
    fn test_default_window_is_thirty_days() {
        let today = NaiveDate::from_ymd_opt(2024, 7, 31).unwrap();
        let range = InsiderTrades::default_range(today);
        assert_eq!(range.start, NaiveDate::from_ymd_opt(2024, 7, 1).unwrap());
        assert_eq!(range.end, today);
    }
}
