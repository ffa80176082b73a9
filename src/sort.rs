use std::cmp::Ordering;

use clap::ValueEnum;

use crate::users::{ColumnId, UserRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

/// The single active sort column and its direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortDirective {
    pub column: ColumnId,
    pub descending: bool,
}

impl Default for SortDirective {
    fn default() -> Self {
        Self {
            column: ColumnId::Username,
            descending: false,
        }
    }
}

impl SortDirective {
    /// Header activation. The active column flips direction, any other column
    /// becomes the target with `first` as its direction.
    pub fn toggle(&self, column: ColumnId, first: SortDirection) -> Self {
        if self.column == column {
            Self {
                column,
                descending: !self.descending,
            }
        } else {
            Self {
                column,
                descending: first == SortDirection::Descending,
            }
        }
    }

    pub fn compare(&self, a: &UserRecord, b: &UserRecord) -> Ordering {
        let ord = compare_values(a.value(self.column), b.value(self.column));
        if self.descending { ord.reverse() } else { ord }
    }

    /// Sorts row indices into `rows` in place. Ties keep their order.
    pub fn sort(&self, rows: &[UserRecord], indices: &mut [usize]) {
        indices.sort_by(|&a, &b| self.compare(&rows[a], &rows[b]));
    }
}

// Numbers compare as numbers and come before everything else; the rest compares as strings.
// NaN counts as text so the order stays total.
pub fn compare_values(a: &str, b: &str) -> Ordering {
    match (parse_number(a), parse_number(b)) {
        (Some(a_float), Some(b_float)) => a_float.total_cmp(&b_float),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| !v.is_nan())
}
