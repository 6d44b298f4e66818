//! Dashboard table views
//!
//! Each view is a column configuration plus the request it issues. The
//! filter, sort and paging behaviour comes from [`crate::table`].

pub mod alerts;
pub mod crypto;
pub mod fibonacci;
pub mod in_stocks;
pub mod insider;
pub mod us_stocks;

use crate::api::types::Base;
use crate::table::{TableView, ViewSource};
use std::sync::Arc;

/// Alert-state values shared by the screeners
pub const ALERT_STATES: &[&str] = &["$", "$$$", "-"];

/// Every table the dashboard offers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    UsStocks,
    InStocks,
    Crypto(Base),
    Fibonacci(Base),
    StockAlerts { watch_list_only: bool },
    CryptoAlerts(Base),
    InsiderTrades,
}

impl ViewKind {
    pub fn source(&self) -> Arc<dyn ViewSource> {
        match *self {
            ViewKind::UsStocks => Arc::new(us_stocks::UsStocks::new()),
            ViewKind::InStocks => Arc::new(in_stocks::InStocks::new()),
            ViewKind::Crypto(base) => Arc::new(crypto::CryptoScreener::new(base)),
            ViewKind::Fibonacci(base) => Arc::new(fibonacci::Fibonacci::new(base)),
            ViewKind::StockAlerts { watch_list_only } => Arc::new(alerts::StockAlerts::new(watch_list_only)),
            ViewKind::CryptoAlerts(base) => Arc::new(alerts::CryptoAlerts::new(base)),
            ViewKind::InsiderTrades => Arc::new(insider::InsiderTrades::new()),
        }
    }

    pub fn open(&self) -> TableView {
        TableView::new(self.source())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_names_are_unique() {
        let kinds = [
            ViewKind::UsStocks,
            ViewKind::InStocks,
            ViewKind::Crypto(Base::Usd),
            ViewKind::Crypto(Base::Btc),
            ViewKind::Fibonacci(Base::Eth),
            ViewKind::StockAlerts { watch_list_only: false },
            ViewKind::CryptoAlerts(Base::Usd),
            ViewKind::InsiderTrades,
        ];
        let mut names: Vec<&str> = kinds.iter().map(|k| k.source().config().name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), kinds.len());
    }

    #[test]
    fn test_every_column_key_is_unique_per_view() {
        for kind in [ViewKind::UsStocks, ViewKind::InStocks, ViewKind::Fibonacci(Base::Usd), ViewKind::InsiderTrades] {
            let source = kind.source();
            let mut keys: Vec<&str> = source.config().keys().collect();
            let total = keys.len();
            keys.sort_unstable();
            keys.dedup();
            assert_eq!(keys.len(), total, "duplicate key in {}", source.config().name);
        }
    }
}
