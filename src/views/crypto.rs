//! Crypto screener, quoted in USD or BTC
//!
//! The whole snapshot is fetched at once and filtered in memory. Only the USD
//! snapshot is dated; the BTC one always serves the latest day.

use crate::api::types::Base;
use crate::table::{ApplyMode, Column, Format, PagingMode, SortDescriptor, TableConfig, ViewSource};
use crate::views::ALERT_STATES;

pub struct CryptoScreener {
    base: Base,
    config: TableConfig,
}

impl CryptoScreener {
    /// ETH has no screener snapshot; it falls back to USD
    pub fn new(base: Base) -> Self {
        let base = match base {
            Base::Btc => Base::Btc,
            _ => Base::Usd,
        };

        let (name, title, endpoint, dated) = match base {
            Base::Btc => ("crypto_btc", "Crypto Screener (BTC)", "crypto/latest_btc", false),
            _ => ("crypto", "Crypto Screener", "crypto/latest", true),
        };

        Self {
            base,
            config: TableConfig {
                name,
                title,
                endpoint,
                columns: columns(base),
                default_sort: SortDescriptor::none(),
                fallback_sort_column: "stock",
                paging: PagingMode::Client,
                apply_mode: ApplyMode::Explicit,
                dated,
            },
        }
    }

    pub fn base(&self) -> Base {
        self.base
    }
}

impl ViewSource for CryptoScreener {
    fn config(&self) -> &TableConfig {
        &self.config
    }
}

fn columns(base: Base) -> Vec<Column> {
    use Format::*;

    // BTC-quoted indicators are tiny; ratios would round them to zero
    let indicator = match base {
        Base::Usd => Ratio,
        _ => Number,
    };

    let mut columns = vec![
        Column::text("stock", "Crypto"),
        Column::text("crypto_name", "Crypto Name"),
        Column::numeric("close", "Last Price", Price(base)).filterable(),
        Column::numeric("ema", "200-EMA", indicator).filterable(),
        Column::numeric("williams_r", "Williams %R", Ratio).filterable(),
        Column::numeric("williams_r_ema", "Williams %R EMA", Ratio).filterable(),
        Column::category("williams_r_momentum_alert_state", "Williams %R Momentum Alert", ALERT_STATES),
        Column::numeric("force_index_7_week", "7-Week Force Index", indicator).filterable(),
        Column::numeric("force_index_52_week", "52-Week Force Index", indicator).filterable(),
        Column::category("force_index_alert_state", "Force Index Alert", ALERT_STATES),
    ];

    if base == Base::Usd {
        columns.extend([
            Column::numeric("williams_r_rank", "Williams %R Rank", Rank).filterable(),
            Column::numeric("williams_r_ema_rank", "Williams %R EMA Rank", Rank).filterable(),
            Column::numeric("force_index_7_week_rank", "7-Week Force Index Rank", Rank).filterable(),
            Column::numeric("force_index_52_week_rank", "52-Week Force Index Rank", Rank).filterable(),
            Column::numeric("ema_rank", "200-EMA Rank", Rank).filterable(),
        ]);
    }

    columns.push(Column::plain("datetime", "Time", DateTime));
    columns
}
