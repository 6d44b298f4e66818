//! Cell formatting
//!
//! Every formatter renders a missing or null value as `N/A`.

use crate::api::types::{Base, Row};
use crate::table::filter::numeric_value;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

pub const NOT_AVAILABLE: &str = "N/A";

/// Display format of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// `$1,234.57`
    Currency,
    /// Two decimals
    Ratio,
    /// Whole number
    Rank,
    /// Fraction shown as percent: `0.1234` -> `12.34%`
    Percentage,
    /// Thousands separators, up to three decimals
    Number,
    DateTime,
    Date,
    /// Price in the given quote currency
    Price(Base),
    /// Signed percent distance: `+1.23%`
    Distance,
    /// `P` / `S` transaction codes
    TransactionType,
    /// Insider relationship flags of the row
    Relationship,
    /// `alerts` array of `{type, description}`
    Alerts,
    Plain,
}

/// Format one cell of `row`
pub fn format_cell(format: Format, key: &str, row: &Row) -> String {
    let value = row.get(key);

    match format {
        Format::Relationship => return relationship(row),
        Format::Alerts => return alerts(value),
        _ => {}
    }

    let value = match value {
        None | Some(Value::Null) => return NOT_AVAILABLE.to_string(),
        Some(v) => v,
    };

    match format {
        Format::Currency => numeric_value(value).map(currency),
        Format::Ratio => numeric_value(value).map(|v| format!("{:.2}", v)),
        Format::Rank => numeric_value(value).map(|v| format!("{:.0}", v)),
        Format::Percentage => numeric_value(value).map(percentage),
        Format::Number => numeric_value(value).map(number),
        Format::Price(base) => numeric_value(value).map(|v| price(v, base)),
        Format::Distance => numeric_value(value).map(distance),
        Format::DateTime => value.as_str().map(datetime),
        Format::Date => value.as_str().map(date),
        Format::TransactionType => value.as_str().map(|s| transaction_type(s).to_string()),
        Format::Relationship | Format::Alerts | Format::Plain => None,
    }
    .unwrap_or_else(|| plain(value))
}

pub fn plain(value: &Value) -> String {
    match value {
        Value::Null => NOT_AVAILABLE.to_string(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

pub fn currency(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    format!("{}${}.{}", sign, group_thousands(int_part), frac_part)
}

pub fn percentage(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

pub fn number(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    let fixed = format!("{:.3}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');
    if frac_part.is_empty() {
        format!("{}{}", sign, group_thousands(int_part))
    } else {
        format!("{}{}.{}", sign, group_thousands(int_part), frac_part)
    }
}

pub fn price(value: f64, base: Base) -> String {
    match base {
        Base::Usd => currency(value),
        Base::Eth => format!("{:.6} ETH", value),
        Base::Btc => format!("{:.8} BTC", value),
    }
}

pub fn distance(value: f64) -> String {
    let sign = if value > 0.0 { "+" } else { "" };
    format!("{}{:.2}%", sign, value)
}

pub fn transaction_type(code: &str) -> &str {
    match code {
        "P" => "Purchase",
        "S" => "Sale",
        other => other,
    }
}

/// `w/t (p%)`, `N/A` when there were no purchases
pub fn win_rate(wins: u64, total: u64) -> String {
    if total == 0 {
        return NOT_AVAILABLE.to_string();
    }
    format!("{}/{} ({:.2}%)", wins, total, wins as f64 / total as f64 * 100.0)
}

pub fn relationship(row: &Row) -> String {
    const FLAGS: [(&str, &str); 4] = [
        ("relationship_is_director", "Director"),
        ("relationship_is_officer", "Officer"),
        ("relationship_is_ten_percent_owner", "10% Owner"),
        ("relationship_is_other", "Other"),
    ];

    FLAGS
        .iter()
        .filter(|(key, _)| row.get(*key).map(truthy).unwrap_or(false))
        .map(|(_, label)| *label)
        .collect::<Vec<_>>()
        .join(", ")
}

fn alerts(value: Option<&Value>) -> String {
    match value.and_then(Value::as_array) {
        Some(entries) if !entries.is_empty() => entries
            .iter()
            .filter_map(|entry| match entry {
                Value::String(s) => Some(s.as_str()),
                other => other.get("type").and_then(Value::as_str),
            })
            .collect::<Vec<_>>()
            .join(", "),
        _ => "-".to_string(),
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|v| v != 0.0).unwrap_or(false),
        Value::String(s) => matches!(s.as_str(), "1" | "true" | "True" | "TRUE"),
        _ => false,
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Parse the timestamp shapes the backend emits (ISO 8601, RFC 2822, plain dates)
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.naive_utc());
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, pattern) {
            return Some(dt);
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return d.and_hms_opt(0, 0, 0);
    }
    // Flask's default GMT format without the weekday
    NaiveDateTime::parse_from_str(raw, "%d %b %Y %H:%M:%S GMT").ok()
}

fn datetime(raw: &str) -> String {
    parse_timestamp(raw)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| raw.to_string())
}

fn date(raw: &str) -> String {
    parse_timestamp(raw)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| raw.to_string())
}
