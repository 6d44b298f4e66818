//! Indian stock screener
//!
//! Same shape as the US screener with extra fundamentals, momentum and the
//! ERP5 ranking. Text filters on ticker and name are sent to the server.

use crate::table::{ApplyMode, Column, Format, PagingMode, SortDescriptor, TableConfig, ViewSource};
use crate::views::ALERT_STATES;

pub struct InStocks {
    config: TableConfig,
}

impl InStocks {
    pub fn new() -> Self {
        Self {
            config: TableConfig {
                name: "in_stocks",
                title: "Indian Stock Screener",
                endpoint: "in_stocks/latest",
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

impl Default for InStocks {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewSource for InStocks {
    fn config(&self) -> &TableConfig {
        &self.config
    }
}

fn columns() -> Vec<Column> {
    use Format::*;

    vec![
        Column::text("stock", "Stock").filterable(),
        Column::text("stock_name", "Stock Name").filterable(),
        Column::numeric("market_cap", "Market Cap", Currency).filterable(),
        Column::numeric("close", "Closing Price", Currency),
        Column::numeric("pe_ratio", "P/E Ratio", Ratio).filterable(),
        Column::numeric("ev_ebitda", "EV/EBITDA", Ratio).filterable(),
        Column::numeric("pb_ratio", "P/B Ratio", Ratio).filterable(),
        Column::numeric("peg_ratio", "PEG Ratio", Ratio).filterable(),
        Column::numeric("earnings_yield", "Earnings Yield", Ratio),
        Column::numeric("book_to_price", "B/P Ratio", Ratio),
        Column::numeric("return_on_equity", "ROE", Ratio).filterable(),
        Column::numeric("return_on_assets", "ROA", Ratio).filterable(),
        Column::numeric("price_to_sales", "Price to Sales", Ratio).filterable(),
        Column::numeric("free_cash_flow_yield", "FCF Yield", Ratio).filterable(),
        Column::numeric("shareholder_yield", "Shareholder Yield", Ratio).filterable(),
        Column::numeric("last_quarter_sales", "Last Quarter Sales", Currency),
        Column::numeric("current_quarter_sales", "Current Quarter Sales", Currency).filterable(),
        Column::numeric("sales_change_percent", "Sales % Change", Percentage),
        Column::numeric("last_quarter_ebitda", "Last Quarter EBITDA", Currency),
        Column::numeric("current_quarter_ebitda", "Current Quarter EBITDA", Currency).filterable(),
        Column::numeric("ebitda_change_percent", "EBITDA % Change", Percentage),
        Column::numeric("free_cash_flow", "Levered Free Cash Flow", Currency),
        Column::numeric("ema", "200-EMA", Ratio),
        Column::numeric("williams_r", "Williams %R", Ratio),
        Column::numeric("williams_r_ema", "Williams %R EMA", Ratio),
        Column::category("williams_r_momentum_alert_state", "Williams %R Momentum Alert", ALERT_STATES),
        Column::numeric("force_index_7_week", "7-Week Force Index", Ratio),
        Column::numeric("force_index_52_week", "52-Week Force Index", Ratio),
        Column::category("force_index_alert_state", "Force Index Alert", ALERT_STATES),
        Column::category("anchored_obv_alert_state", "Anchored OBV Alert", ALERT_STATES),
        Column::numeric("price_change_3m", "3-Month Price Change", Percentage),
        Column::numeric("price_change_6m", "6-Month Price Change", Percentage),
        Column::numeric("price_change_12m", "12-Month Price Change", Percentage),
        Column::numeric("pe_ratio_rank", "P/E Ratio Ranking", Rank).filterable(),
        Column::numeric("ev_ebitda_rank", "EV/EBITDA Ranking", Rank).filterable(),
        Column::numeric("pb_ratio_rank", "P/B Ratio Ranking", Rank).filterable(),
        Column::numeric("peg_ratio_rank", "PEG Ratio Ranking", Rank).filterable(),
        Column::numeric("earnings_yield_rank", "Earnings Yield Rank", Rank).filterable(),
        Column::numeric("book_to_price_rank", "B/P Rank", Rank).filterable(),
        Column::numeric("erp5_rank", "ERP5 Rank", Rank).filterable(),
        Column::plain("datetime", "Time", DateTime),
    ]
}
