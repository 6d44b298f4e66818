//! Crypto Fibonacci retracement levels
//!
//! Each response row carries the levels as a nested map
//! (`fibonacci_levels`) and the distance of the current price to each level
//! (`level_distances`, or `distances`). Both are flattened into top-level
//! columns (`23.6`, `23.6_distance`) so the generic filters and sorting see
//! them.

use crate::api::types::{Base, Paged, Row};
use crate::error::Result;
use crate::table::view::{date_query, decode_rows};
use crate::table::{
    ApplyMode, Column, FetchRequest, Format, PagingMode, SortDescriptor, SortDirection, TableConfig, TableState,
    ViewSource,
};
use serde_json::Value;

/// `(level key, level label, distance key, distance label)`
const LEVELS: [(&str, &str, &str, &str); 8] = [
    ("23.6", "23.6% Level", "23.6_distance", "23.6% Distance"),
    ("38.2", "38.2% Level", "38.2_distance", "38.2% Distance"),
    ("50.0", "50.0% Level", "50.0_distance", "50.0% Distance"),
    ("61.8", "61.8% Level", "61.8_distance", "61.8% Distance"),
    ("78.6", "78.6% Level", "78.6_distance", "78.6% Distance"),
    ("100.0", "100.0% Level", "100.0_distance", "100.0% Distance"),
    ("161.8", "161.8% Level", "161.8_distance", "161.8% Distance"),
    ("261.8", "261.8% Level", "261.8_distance", "261.8% Distance"),
];

pub struct Fibonacci {
    base: Base,
    config: TableConfig,
}

impl Fibonacci {
    pub fn new(base: Base) -> Self {
        Self {
            base,
            config: TableConfig {
                name: "crypto_fibonacci",
                title: "Crypto Fibonacci Levels",
                endpoint: "crypto/fibonacci",
                columns: columns(base),
                default_sort: SortDescriptor::by("stock", SortDirection::Ascending),
                fallback_sort_column: "stock",
                paging: PagingMode::Client,
                apply_mode: ApplyMode::Explicit,
                dated: true,
            },
        }
    }

    pub fn base(&self) -> Base {
        self.base
    }
}

impl ViewSource for Fibonacci {
    fn config(&self) -> &TableConfig {
        &self.config
    }

    fn request(&self, state: &TableState) -> FetchRequest {
        let mut query = vec![("base".to_string(), self.base.as_str().to_string())];
        query.extend(date_query(&self.config, state));
        FetchRequest {
            path: self.config.endpoint.to_string(),
            query,
        }
    }

    fn decode(&self, body: Value) -> Result<Paged<Row>> {
        let mut page = decode_rows(body)?;
        page.data = page.data.into_iter().map(flatten_levels).collect();
        Ok(page)
    }
}

/// Lift the nested level and distance maps into `23.6` / `23.6_distance` keys
pub fn flatten_levels(mut row: Row) -> Row {
    if let Some(Value::Object(levels)) = row.remove("fibonacci_levels") {
        for (level, value) in levels {
            row.insert(level, value);
        }
    }

    let distances = row.remove("level_distances").or_else(|| row.remove("distances"));
    if let Some(Value::Object(distances)) = distances {
        for (level, value) in distances {
            row.insert(format!("{}_distance", level), value);
        }
    }

    row
}

fn columns(base: Base) -> Vec<Column> {
    let mut columns = vec![
        Column::text("stock", "Crypto"),
        Column::text("crypto_name", "Crypto Name").filterable(),
        Column::numeric("current_price", "Current Price", Format::Price(base)).filterable(),
        Column::numeric("all_time_high", "ATH", Format::Price(base)).filterable(),
        Column::numeric("all_time_low", "ATL", Format::Price(base)).filterable(),
    ];

    for (key, label, distance_key, distance_label) in LEVELS {
        columns.push(Column::numeric(key, label, Format::Price(base)));
        columns.push(Column::numeric(distance_key, distance_label, Format::Distance));
    }

    columns
}
