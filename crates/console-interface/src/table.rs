//! Row identity, sorting, and pagination for rendered query results.

use std::{cmp::Ordering, ops::Range};

use serde_json::{Map, Value};

use crate::query::QueryRecord;

pub const PAGE_SIZE_OPTIONS: [usize; 4] = [25, 50, 100, 200];
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// A record together with its zero-based position in the result set.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TableRow<'a> {
    pub id: usize,
    pub record: &'a QueryRecord,
}

impl TableRow<'_> {
    /// Text for one cell. Strings render raw, other values as compact JSON.
    pub fn cell(&self, column_id: &str) -> String {
        match self.record.get(column_id) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(text)) => text.clone(),
            Some(other) => other.to_string(),
        }
    }

    /// The record with a leading `id` field. The positional id wins over a
    /// record field of the same name.
    pub fn to_value(&self) -> Value {
        let mut row = Map::with_capacity(self.record.len() + 1);
        row.insert("id".to_string(), Value::from(self.id));
        for (key, value) in self.record {
            if key != "id" {
                row.insert(key.clone(), value.clone());
            }
        }
        Value::Object(row)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// Stable sort by one column. Missing and null cells always sort last.
pub fn sort_rows(rows: &mut [TableRow<'_>], column_id: &str, direction: SortDirection) {
    rows.sort_by(|a, b| {
        let left = a.record.get(column_id).filter(|v| !v.is_null());
        let right = b.record.get(column_id).filter(|v| !v.is_null());
        match (left, right) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(l), Some(r)) => match direction {
                SortDirection::Ascending => compare_values(l, r),
                SortDirection::Descending => compare_values(l, r).reverse(),
            },
        }
    });
}

fn compare_values(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::Number(l), Value::Number(r)) => {
            let l = l.as_f64().unwrap_or(f64::NAN);
            let r = r.as_f64().unwrap_or(f64::NAN);
            l.partial_cmp(&r).unwrap_or(Ordering::Equal)
        }
        (Value::String(l), Value::String(r)) => l.cmp(r),
        (Value::Bool(l), Value::Bool(r)) => l.cmp(r),
        _ => type_rank(left)
            .cmp(&type_rank(right))
            .then_with(|| left.to_string().cmp(&right.to_string())),
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Page cursor over a row count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    page_size: usize,
    page: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            page: 0,
        }
    }
}

impl Pagination {
    /// Returns `None` unless `page_size` is one of [`PAGE_SIZE_OPTIONS`].
    pub fn with_page_size(page_size: usize) -> Option<Self> {
        PAGE_SIZE_OPTIONS
            .contains(&page_size)
            .then_some(Self { page_size, page: 0 })
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_count(&self, total: usize) -> usize {
        total.div_ceil(self.page_size).max(1)
    }

    pub fn range(&self, total: usize) -> Range<usize> {
        let page = self.page.min(self.page_count(total) - 1);
        let start = (page * self.page_size).min(total);
        let end = (start + self.page_size).min(total);
        start..end
    }

    pub fn next_page(&mut self, total: usize) {
        if self.page + 1 < self.page_count(total) {
            self.page += 1;
        }
    }

    pub fn prev_page(&mut self) {
        self.page = self.page.saturating_sub(1);
    }

    pub fn reset(&mut self) {
        self.page = 0;
    }

    /// Moves to the next entry of [`PAGE_SIZE_OPTIONS`], wrapping around.
    pub fn cycle_page_size(&mut self) {
        let index = PAGE_SIZE_OPTIONS
            .iter()
            .position(|size| *size == self.page_size)
            .map_or(0, |i| (i + 1) % PAGE_SIZE_OPTIONS.len());
        self.page_size = PAGE_SIZE_OPTIONS[index];
        self.page = 0;
    }
}
