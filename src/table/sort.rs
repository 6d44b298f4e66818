//! Single-key sorting

use crate::api::types::Row;
use crate::table::filter::numeric_value;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flip(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    /// `sortDirection` query value
    pub fn as_query(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }
}

/// Active sort key (if any) and its direction
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortDescriptor {
    pub key: Option<String>,
    pub direction: SortDirection,
}

impl SortDescriptor {
    pub fn by(key: &str, direction: SortDirection) -> Self {
        Self {
            key: Some(key.to_string()),
            direction,
        }
    }

    pub fn none() -> Self {
        Self::default()
    }

    /// Header click: the active key flips, any other key starts ascending
    pub fn request(&mut self, key: &str) {
        if self.key.as_deref() == Some(key) {
            self.direction = self.direction.flip();
        } else {
            self.key = Some(key.to_string());
            self.direction = SortDirection::Ascending;
        }
    }

    pub fn clear(&mut self) {
        *self = Self::none();
    }

    pub fn is_active(&self) -> bool {
        self.key.is_some()
    }
}

fn rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Bool(_)) => 1,
        Some(v) if numeric_value(v).is_some() => 2,
        Some(_) => 3,
    }
}

/// Total order over cells: missing/null, then booleans, numbers (numeric
/// strings included), then everything else compared as text
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let (ra, rb) = (rank(a), rank(b));
    if ra != rb {
        return ra.cmp(&rb);
    }

    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(x), Some(y)) if ra == 2 => {
            let (x, y) = (numeric_value(x).unwrap_or_default(), numeric_value(y).unwrap_or_default());
            x.total_cmp(&y)
        }
        (Some(x), Some(y)) => sort_text(x).cmp(&sort_text(y)),
        _ => Ordering::Equal,
    }
}

fn sort_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.to_lowercase(),
        other => other.to_string(),
    }
}

/// Stable in-place sort; equal keys keep their fetched order
pub fn sort_rows(rows: &mut [Row], sort: &SortDescriptor) {
    let Some(key) = sort.key.as_deref() else {
        return;
    };

    rows.sort_by(|a, b| {
        let ordering = compare_values(a.get(key), b.get(key));
        match sort.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
}
