//! Alert feeds for stocks and crypto

use crate::api::types::{Base, Row};
use crate::table::format::parse_timestamp;
use crate::table::{
    ApplyMode, Column, ColumnKind, FetchRequest, Format, PagingMode, SortDescriptor, SortDirection, TableConfig,
    TableState, ViewSource,
};
use chrono::NaiveDate;

pub const ALERT_TYPES: &[&str] = &[
    "oversold",
    "obv_positive",
    "obv_negative",
    "heikin_ashi_3d_bullish",
    "heikin_ashi_3d_bearish",
    "heikin_ashi_2w_bullish",
    "heikin_ashi_2w_bearish",
];

/// US stock alerts, optionally limited to the caller's watchlist
pub struct StockAlerts {
    watch_list_only: bool,
    config: TableConfig,
}

impl StockAlerts {
    pub fn new(watch_list_only: bool) -> Self {
        Self {
            watch_list_only,
            config: TableConfig {
                name: "stock_alerts",
                title: "US Stock Alerts",
                endpoint: "stocks/alerts",
                columns: vec![
                    Column::text("stock", "Stock Symbol").filterable(),
                    Column::text("stock_name", "Stock Name").filterable(),
                    Column::new("alerts", "Alerts", ColumnKind::AlertList(ALERT_TYPES), Format::Alerts).filterable(),
                    Column::plain("datetime", "Date", Format::Date),
                ],
                default_sort: SortDescriptor::by("datetime", SortDirection::Descending),
                fallback_sort_column: "datetime",
                paging: PagingMode::Client,
                apply_mode: ApplyMode::Explicit,
                dated: false,
            },
        }
    }

    pub fn watch_list_only(&self) -> bool {
        self.watch_list_only
    }
}

impl ViewSource for StockAlerts {
    fn config(&self) -> &TableConfig {
        &self.config
    }

    fn request(&self, _state: &TableState) -> FetchRequest {
        let query = if self.watch_list_only {
            vec![("watch_list_only".to_string(), "true".to_string())]
        } else {
            Vec::new()
        };
        FetchRequest {
            path: self.config.endpoint.to_string(),
            query,
        }
    }
}

/// Crypto alerts per quote currency (`alerts`, `alerts_btc`, `alerts_eth`)
pub struct CryptoAlerts {
    base: Base,
    config: TableConfig,
}

impl CryptoAlerts {
    pub fn new(base: Base) -> Self {
        let endpoint = match base {
            Base::Usd => "crypto/alerts",
            Base::Eth => "crypto/alerts_eth",
            Base::Btc => "crypto/alerts_btc",
        };

        Self {
            base,
            config: TableConfig {
                name: "crypto_alerts",
                title: "Crypto Alerts",
                endpoint,
                columns: vec![
                    Column::text("stock", "Symbol").filterable(),
                    Column::text("crypto_name", "Name").filterable(),
                    Column::plain("alert", "Alert Type", Format::Plain),
                    Column::plain("datetime", "Date & Time", Format::DateTime),
                ],
                default_sort: SortDescriptor::by("datetime", SortDirection::Descending),
                fallback_sort_column: "datetime",
                paging: PagingMode::Client,
                apply_mode: ApplyMode::Explicit,
                dated: false,
            },
        }
    }

    pub fn base(&self) -> Base {
        self.base
    }
}

impl ViewSource for CryptoAlerts {
    fn config(&self) -> &TableConfig {
        &self.config
    }
}

/// Alerts of one calendar day
#[derive(Debug, Clone, PartialEq)]
pub struct AlertGroup {
    /// `None` collects rows whose timestamp could not be read
    pub date: Option<NaiveDate>,
    pub rows: Vec<Row>,
}

/// Bucket rows by the calendar date of `datetime`, newest day first
///
/// Row order inside a day is kept; undated rows go last.
pub fn group_by_date(rows: &[Row]) -> Vec<AlertGroup> {
    let mut groups: Vec<AlertGroup> = Vec::new();

    for row in rows {
        let date = row
            .get("datetime")
            .and_then(|v| v.as_str())
            .and_then(parse_timestamp)
            .map(|dt| dt.date());

        match groups.iter_mut().find(|g| g.date == date) {
            Some(group) => group.rows.push(row.clone()),
            None => groups.push(AlertGroup {
                date,
                rows: vec![row.clone()],
            }),
        }
    }

    // Some(_) > None, so descending puts undated rows last
    groups.sort_by(|a, b| b.date.cmp(&a.date));
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{FetchOutcome, TableView};
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn rows(value: Value) -> Vec<Row> {
        value
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_object().cloned().unwrap())
            .collect()
    }

    #[test]
    fn test_watch_list_only_query() {
        let mut all = TableView::new(Arc::new(StockAlerts::new(false)));
        assert!(all.begin_fetch().1.query.is_empty());

        let mut mine = TableView::new(Arc::new(StockAlerts::new(true)));
        let (_, request) = mine.begin_fetch();
        assert_eq!(request.path, "stocks/alerts");
        assert_eq!(request.query, vec![("watch_list_only".to_string(), "true".to_string())]);
    }

    #[test]
    fn test_alert_type_filter_matches_any_entry() {
        let mut view = TableView::new(Arc::new(StockAlerts::new(false)));
        let (ticket, _) = view.begin_fetch();
        let outcome = view.complete(
            ticket,
            Ok(json!([
                {"stock": "AAPL", "datetime": "2024-05-02T14:00:00", "alerts": [
                    {"type": "oversold", "description": "Williams %R below -80"},
                    {"type": "heikin_ashi_3d_bullish", "description": "3D HA turned green"}
                ]},
                {"stock": "TSLA", "datetime": "2024-05-03T14:00:00", "alerts": [
                    {"type": "obv_negative", "description": "OBV fell below anchor"}
                ]}
            ])),
        );
        assert_eq!(outcome, FetchOutcome::Applied);

        view.edit(|f| f.toggle_choice("alerts", "heikin_ashi_3d_bullish"));
        view.apply();
        let visible = view.visible_rows();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0]["stock"], "AAPL");
    }

    #[test]
    fn test_group_by_date_newest_first() {
        let data = rows(json!([
            {"stock": "A", "datetime": "2024-05-01T09:30:00"},
            {"stock": "B", "datetime": "2024-05-03T10:00:00"},
            {"stock": "C", "datetime": "2024-05-01T16:00:00"},
            {"stock": "D", "datetime": "not a date"}
        ]));

        let groups = group_by_date(&data);
        let dates: Vec<Option<NaiveDate>> = groups.iter().map(|g| g.date).collect();
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2024, 5, 3),
                NaiveDate::from_ymd_opt(2024, 5, 1),
                None
            ]
        );
        assert_eq!(groups[1].rows.len(), 2);
        assert_eq!(groups[1].rows[0]["stock"], "A");
    }

    #[test]
    fn test_crypto_alert_endpoints() {
        assert_eq!(CryptoAlerts::new(Base::Usd).config().endpoint, "crypto/alerts");
        assert_eq!(CryptoAlerts::new(Base::Btc).config().endpoint, "crypto/alerts_btc");
    }
}
