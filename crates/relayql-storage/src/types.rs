//! Query option types shared by every backend.

use serde::{Deserialize, Serialize};

use crate::filter::Filter;

/// Options for a `find_all` call.
#[derive(Debug, Clone, Default)]
pub struct FindOptions {
    /// Rows must satisfy every condition.
    pub filter: Filter,
    /// Maximum number of rows to return.
    pub limit: Option<usize>,
    /// Number of rows to skip after ordering.
    pub offset: Option<usize>,
    /// Sort keys, most significant first.
    pub order: Vec<SortParam>,
}

impl FindOptions {
    /// Creates options matching every row in storage order.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Adds a sort key.
    #[must_use]
    pub fn with_sort(mut self, field: impl Into<String>, descending: bool) -> Self {
        self.order.push(SortParam::new(field, descending));
        self
    }
}

/// A sort key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortParam {
    /// The attribute to sort by.
    pub field: String,
    /// Whether to sort in descending order.
    pub descending: bool,
}

impl SortParam {
    #[must_use]
    pub fn new(field: impl Into<String>, descending: bool) -> Self {
        Self {
            field: field.into(),
            descending,
        }
    }

    /// Parses `attr` (ascending) or `reverse:attr` (descending).
    #[must_use]
    pub fn parse(order: &str) -> Self {
        match order.strip_prefix("reverse:") {
            Some(field) => Self::desc(field),
            None => Self::asc(order),
        }
    }

    #[must_use]
    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, false)
    }

    #[must_use]
    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, true)
    }
}
