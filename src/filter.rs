use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;
use tracing::trace;

use crate::users::{ColumnId, UserRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Contains,
    DateOrNumberEquals,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Number(f64),
}

impl FilterValue {
    /// Numbers become `Number`, everything else stays text.
    pub fn parse(s: &str) -> Self {
        match s.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => FilterValue::Number(n),
            _ => FilterValue::Text(s.to_string()),
        }
    }
}

/// What a date that cannot be parsed means for a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParsePolicy {
    /// The condition is ignored and the row passes.
    #[default]
    Permissive,
    /// The row is rejected.
    Strict,
}

/// Active filter conditions, at most one per column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSet {
    conditions: BTreeMap<ColumnId, FilterValue>,
}

impl FilterSet {
    /// Upsert the condition of a column. `None` and empty text drop it.
    pub fn set(&mut self, column: ColumnId, value: Option<FilterValue>) {
        match value {
            Some(FilterValue::Text(s)) if s.is_empty() => {
                self.conditions.remove(&column);
            }
            Some(v) => {
                self.conditions.insert(column, v);
            }
            None => {
                self.conditions.remove(&column);
            }
        }
    }

    /// Returns a copy with the condition of `column` replaced.
    pub fn with(&self, column: ColumnId, value: Option<FilterValue>) -> Self {
        let mut next = self.clone();
        next.set(column, value);
        next
    }

    pub fn get(&self, column: ColumnId) -> Option<&FilterValue> {
        self.conditions.get(&column)
    }

    pub fn text(&self, column: ColumnId) -> &str {
        match self.get(column) {
            Some(FilterValue::Text(s)) => s,
            _ => "",
        }
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// A record is visible when every column condition holds.
    pub fn matches(&self, record: &UserRecord, policy: ParsePolicy) -> bool {
        self.conditions.iter().all(|(column, value)| {
            matches(column.filter_kind(), record.value(*column), Some(value), policy)
        })
    }
}

pub fn matches(
    kind: FilterKind,
    cell: &str,
    condition: Option<&FilterValue>,
    policy: ParsePolicy,
) -> bool {
    match kind {
        FilterKind::Contains => contains(cell, condition),
        FilterKind::DateOrNumberEquals => date_or_number_equals(cell, condition, policy),
    }
}

// Case sensitive. Anything but a text condition does not constrain the row.
fn contains(cell: &str, condition: Option<&FilterValue>) -> bool {
    match condition {
        Some(FilterValue::Text(term)) => cell.contains(term.as_str()),
        _ => true,
    }
}

fn date_or_number_equals(cell: &str, condition: Option<&FilterValue>, policy: ParsePolicy) -> bool {
    match condition {
        None => true,
        Some(FilterValue::Number(n)) => cell.trim().parse::<f64>().is_ok_and(|v| v == *n),
        Some(FilterValue::Text(term)) => {
            let normalized = term.replacen('-', "/", 1);
            let condition = parse_date(&normalized).or_else(|| parse_date(term));
            match (parse_date(cell), condition) {
                (Some(a), Some(b)) => a == b,
                _ => {
                    trace!("Unparsable date filter {cell:?} vs {term:?}, policy {policy:?}");
                    policy == ParsePolicy::Permissive
                }
            }
        }
    }
}

const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y/%m/%dT%H:%M:%S",
    "%Y/%m-%dT%H:%M:%S",
];

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%Y/%m-%d", "%m/%d/%Y"];

/// Lenient date parser. Partial dates (`2020/03`, `2020`) resolve to the first day.
pub fn parse_date(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
    {
        return Some(dt);
    }
    let date = DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
        .or_else(|| NaiveDate::parse_from_str(&format!("{s}/01"), "%Y/%m/%d").ok())
        .or_else(|| NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d").ok())
        .or_else(|| {
            if s.len() == 4 && s.chars().all(|c| c.is_ascii_digit()) {
                s.parse::<i32>()
                    .ok()
                    .and_then(|y| NaiveDate::from_ymd_opt(y, 1, 1))
            } else {
                None
            }
        })?;
    date.and_hms_opt(0, 0, 0)
}
