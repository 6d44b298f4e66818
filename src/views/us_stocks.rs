//! US stock screener

use crate::table::{ApplyMode, Column, Format, PagingMode, SortDescriptor, TableConfig, ViewSource};
use crate::views::ALERT_STATES;

pub struct UsStocks {
    config: TableConfig,
}

impl UsStocks {
    pub fn new() -> Self {
        Self {
            config: TableConfig {
                name: "us_stocks",
                title: "US Stock Screener",
                endpoint: "stocks/latest",
                columns: columns(),
                default_sort: SortDescriptor::none(),
                fallback_sort_column: "stock",
                paging: PagingMode::Server,
                apply_mode: ApplyMode::Explicit,
                dated: true,
            },
        }
    }
}

impl Default for UsStocks {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewSource for UsStocks {
    fn config(&self) -> &TableConfig {
        &self.config
    }
}

fn columns() -> Vec<Column> {
    use Format::*;

    vec![
        Column::text("stock", "Stock"),
        Column::text("stock_name", "Stock Name"),
        Column::numeric("market_cap", "Market Cap", Currency).filterable(),
        Column::numeric("close", "Last Day Closing Price", Currency),
        Column::numeric("pe_ratio", "P/E Ratio", Ratio).filterable(),
        Column::numeric("ev_ebitda", "EV/EBITDA", Ratio).filterable(),
        Column::numeric("pb_ratio", "P/B Ratio", Ratio).filterable(),
        Column::numeric("peg_ratio", "PEG Ratio", Ratio).filterable(),
        Column::numeric("last_quarter_sales", "Last Quarter Sales", Currency),
        Column::numeric("current_quarter_sales", "Current Quarter Sales", Currency).filterable(),
        Column::numeric("sales_change_percent", "Sales % Change", Percentage),
        Column::numeric("last_quarter_ebitda", "Last Quarter EBITDA", Currency),
        Column::numeric("current_quarter_ebitda", "Current Quarter EBITDA", Currency).filterable(),
        Column::numeric("ebitda_change_percent", "EBITDA % Change", Percentage),
        Column::numeric("free_cash_flow", "Levered Free Cash Flow", Currency),
        Column::numeric("ema", "200-EMA", Ratio).filterable(),
        Column::numeric("williams_r", "Williams %R", Ratio),
        Column::numeric("williams_r_ema", "Williams %R EMA", Ratio),
        Column::category("williams_r_momentum_alert_state", "Williams %R Momentum Alert", ALERT_STATES),
        Column::numeric("force_index_7_week", "7-Week Force Index", Ratio),
        Column::numeric("force_index_52_week", "52-Week Force Index", Ratio),
        Column::category("force_index_alert_state", "Force Index Alert", ALERT_STATES),
        Column::numeric("pe_ratio_rank", "P/E Ratio Ranking", Rank).filterable(),
        Column::numeric("ev_ebitda_rank", "EV/EBITDA Ranking", Rank).filterable(),
        Column::numeric("pb_ratio_rank", "P/B Ratio Ranking", Rank).filterable(),
        Column::numeric("peg_ratio_rank", "PEG Ratio Ranking", Rank).filterable(),
        Column::plain("datetime", "Time", DateTime),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::TableView;
    use chrono::NaiveDate;
    use std::sync::Arc;

    #[test]
    fn test_request_carries_paging_sort_and_date() {
        let mut view = TableView::new(Arc::new(UsStocks::new()));
        view.set_date(NaiveDate::from_ymd_opt(2024, 6, 3));
        view.edit(|f| f.toggle_choice("force_index_alert_state", "$$$"));
        view.apply();

        let (_, request) = view.begin_fetch();
        assert_eq!(request.path, "stocks/latest");
        for pair in [
            ("date", "2024-06-03"),
            ("page", "1"),
            ("pageSize", "100"),
            ("sortColumn", "stock"),
            ("sortDirection", "ASC"),
            ("force_index_alert_state[]", "$$$"),
        ] {
            assert!(
                request.query.contains(&(pair.0.to_string(), pair.1.to_string())),
                "missing {:?} in {:?}",
                pair,
                request.query
            );
        }
    }
}
