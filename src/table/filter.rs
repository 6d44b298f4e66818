//! Column filters
//!
//! A [`FilterSet`] maps column keys to constraints. A key that is absent, or
//! whose constraint is empty, places no restriction on that column. A row is
//! kept only when it satisfies every active constraint.

use crate::api::types::Row;
use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Constraint on a single column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Filter {
    /// Inclusive numeric bounds; either side may be open
    Range {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
    },
    /// Case-insensitive substring
    Text { value: String },
    /// Membership in a selected set; array cells match when any entry does
    OneOf { values: BTreeSet<String> },
}

impl Filter {
    pub fn is_active(&self) -> bool {
        match self {
            Filter::Range { min, max } => min.is_some() || max.is_some(),
            Filter::Text { value } => !value.trim().is_empty(),
            Filter::OneOf { values } => !values.is_empty(),
        }
    }

    pub fn matches(&self, cell: Option<&Value>) -> bool {
        if !self.is_active() {
            return true;
        }

        match self {
            Filter::Range { min, max } => {
                let Some(v) = cell.and_then(numeric_value) else {
                    return false;
                };
                min.map_or(true, |min| v >= min) && max.map_or(true, |max| v <= max)
            }
            Filter::Text { value } => {
                let needle = value.trim().to_lowercase();
                cell.and_then(text_value)
                    .map(|hay| hay.to_lowercase().contains(&needle))
                    .unwrap_or(false)
            }
            Filter::OneOf { values } => match cell {
                Some(Value::Array(entries)) => entries
                    .iter()
                    .filter_map(choice_value)
                    .any(|v| values.contains(v.as_str())),
                Some(other) => choice_value(other)
                    .map(|v| values.contains(v.as_str()))
                    .unwrap_or(false),
                None => false,
            },
        }
    }
}

/// Numeric reading of a cell; numeric strings count, anything else does not
pub fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

fn text_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Value compared against a categorical selection (`type` for alert entries)
fn choice_value(value: &Value) -> Option<String> {
    match value {
        Value::Object(entry) => entry.get("type").and_then(text_value),
        other => text_value(other),
    }
}

/// Per-column constraints keyed by column key
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSet {
    filters: BTreeMap<String, Filter>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Filter> {
        self.filters.get(key)
    }

    /// Active constraints only
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Filter)> {
        self.filters
            .iter()
            .filter(|(_, f)| f.is_active())
            .map(|(k, f)| (k.as_str(), f))
    }

    pub fn set(&mut self, key: &str, filter: Filter) {
        if filter.is_active() {
            self.filters.insert(key.to_string(), filter);
        } else {
            self.filters.remove(key);
        }
    }

    pub fn remove(&mut self, key: &str) {
        self.filters.remove(key);
    }

    pub fn set_min(&mut self, key: &str, min: Option<f64>) {
        let max = match self.filters.get(key) {
            Some(Filter::Range { max, .. }) => *max,
            _ => None,
        };
        self.set(key, Filter::Range { min, max });
    }

    pub fn set_max(&mut self, key: &str, max: Option<f64>) {
        let min = match self.filters.get(key) {
            Some(Filter::Range { min, .. }) => *min,
            _ => None,
        };
        self.set(key, Filter::Range { min, max });
    }

    pub fn set_text(&mut self, key: &str, value: &str) {
        self.set(
            key,
            Filter::Text {
                value: value.to_string(),
            },
        );
    }

    /// Add `choice` to the selection, or remove it when already selected
    pub fn toggle_choice(&mut self, key: &str, choice: &str) {
        let mut values = match self.filters.get(key) {
            Some(Filter::OneOf { values }) => values.clone(),
            _ => BTreeSet::new(),
        };
        if !values.remove(choice) {
            values.insert(choice.to_string());
        }
        self.set(key, Filter::OneOf { values });
    }

    /// Add `choice` to the selection; already-selected values stay selected
    pub fn select_choice(&mut self, key: &str, choice: &str) {
        let mut values = match self.filters.get(key) {
            Some(Filter::OneOf { values }) => values.clone(),
            _ => BTreeSet::new(),
        };
        values.insert(choice.to_string());
        self.set(key, Filter::OneOf { values });
    }

    pub fn clear(&mut self) {
        self.filters.clear();
    }

    pub fn has_active(&self) -> bool {
        self.filters.values().any(Filter::is_active)
    }

    pub fn matches(&self, row: &Row) -> bool {
        self.iter().all(|(key, filter)| filter.matches(row.get(key)))
    }

    /// Server query parameters: `min_x`/`max_x`, `x=text`, repeated `x[]`
    pub fn query_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        for (key, filter) in self.iter() {
            match filter {
                Filter::Range { min, max } => {
                    if let Some(min) = min {
                        params.push((format!("min_{}", key), min.to_string()));
                    }
                    if let Some(max) = max {
                        params.push((format!("max_{}", key), max.to_string()));
                    }
                }
                Filter::Text { value } => params.push((key.to_string(), value.trim().to_string())),
                Filter::OneOf { values } => {
                    params.extend(values.iter().map(|v| (format!("{}[]", key), v.clone())));
                }
            }
        }
        params
    }
}

/// Rows passing every active filter, in their original order
pub fn apply_filters(rows: &[Row], filters: &FilterSet) -> Vec<Row> {
    rows.iter().filter(|row| filters.matches(row)).cloned().collect()
}

/// Parse a typed range bound for column `key`; only finite numbers are accepted
pub fn parse_bound(key: &str, raw: &str) -> Result<f64> {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(AppError::Validation(format!(
            "'{}' is not a finite number for column '{}'",
            raw, key
        ))),
    }
}
