//! Sort keys, pagination windows, and paged results.

use crate::error::Error;
use crate::path::AttributePath;
use crate::predicate::Predicate;
use serde::{Deserialize, Serialize};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    /// Ascending order.
    #[default]
    Ascending,
    /// Descending order.
    Descending,
}

/// One ordering key. Earlier keys take priority over later ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    /// Attribute to order by.
    pub path: AttributePath,
    /// Sort direction.
    pub direction: SortDirection,
}

impl SortKey {
    /// Create an ascending sort key.
    pub fn asc(path: AttributePath) -> Self {
        Self {
            path,
            direction: SortDirection::Ascending,
        }
    }

    /// Create a descending sort key.
    pub fn desc(path: AttributePath) -> Self {
        Self {
            path,
            direction: SortDirection::Descending,
        }
    }
}

/// A filtered and ordered selection, ready to be windowed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    /// Row filter.
    pub predicate: Predicate,
    /// Ordering keys, highest priority first. May be empty.
    pub sort: Vec<SortKey>,
}

impl Selection {
    /// Create a selection without ordering.
    pub fn new(predicate: Predicate) -> Self {
        Self {
            predicate,
            sort: Vec::new(),
        }
    }

    /// Add an ordering key.
    pub fn with_sort(mut self, key: SortKey) -> Self {
        self.sort.push(key);
        self
    }
}

/// Offset-based pagination window.
///
/// The offset is any non-negative row index; the limit is always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "PageBounds", into = "PageBounds")]
pub struct PageRequest {
    offset: u64,
    limit: u32,
}

#[derive(Serialize, Deserialize)]
struct PageBounds {
    offset: u64,
    limit: u32,
}

impl TryFrom<PageBounds> for PageRequest {
    type Error = Error;

    fn try_from(bounds: PageBounds) -> Result<Self, Self::Error> {
        PageRequest::new(bounds.offset, bounds.limit)
    }
}

impl From<PageRequest> for PageBounds {
    fn from(page: PageRequest) -> Self {
        PageBounds {
            offset: page.offset,
            limit: page.limit,
        }
    }
}

impl PageRequest {
    /// Create a window starting at `offset` and spanning at most `limit` rows.
    pub fn new(offset: u64, limit: u32) -> Result<Self, Error> {
        if limit == 0 {
            return Err(Error::InvalidPage("limit must be positive".into()));
        }
        Ok(Self { offset, limit })
    }

    /// Window over the first `limit` rows.
    pub fn first(limit: u32) -> Result<Self, Error> {
        Self::new(0, limit)
    }

    /// Number of rows to skip.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Maximum number of rows to return.
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Exclusive end row of the window.
    pub fn end(&self) -> u64 {
        self.offset.saturating_add(self.limit as u64)
    }

    /// The window immediately following this one.
    pub fn next(&self) -> Self {
        Self {
            offset: self.end(),
            limit: self.limit,
        }
    }
}

/// One window of a result set, with the size of the full filtered population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Rows in the window, in order.
    pub content: Vec<T>,
    /// Total number of rows matching the filter.
    pub total: u64,
    /// The window that produced this page.
    pub request: PageRequest,
}

impl<T> Page<T> {
    /// Create a page.
    pub fn new(content: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            content,
            total,
            request,
        }
    }

    /// Number of rows in this page.
    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// Check if this page holds no rows.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Whether rows exist beyond this window.
    pub fn has_next(&self) -> bool {
        self.request.end() < self.total
    }

    /// Transform the rows, keeping paging metadata.
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            total: self.total,
            request: self.request,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_validation() {
        assert!(PageRequest::new(0, 0).is_err());
        let page = PageRequest::new(20, 10).unwrap();
        assert_eq!(page.offset(), 20);
        assert_eq!(page.limit(), 10);
        assert_eq!(page.end(), 30);
        assert_eq!(page.next().offset(), 30);
    }

    #[test]
    fn test_page_request_json() {
        let page: PageRequest = serde_json::from_str(r#"{"offset":5,"limit":2}"#).unwrap();
        assert_eq!(page, PageRequest::new(5, 2).unwrap());

        let bad: Result<PageRequest, _> = serde_json::from_str(r#"{"offset":5,"limit":0}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_page_has_next() {
        let request = PageRequest::new(20, 10).unwrap();
        let page = Page::new(vec![1, 2, 3], 45, request);
        assert!(page.has_next());
        assert_eq!(page.len(), 3);

        let last = Page::new(vec![1; 5], 45, PageRequest::new(40, 10).unwrap());
        assert!(!last.has_next());

        let doubled = last.map(|x| x * 2);
        assert_eq!(doubled.content, vec![2; 5]);
    }
}
