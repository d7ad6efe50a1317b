//! List query construction and page envelopes.
//!
//! A [`ListQuery`] is the datastore-neutral description of one list
//! request: 1-based page, optional page size (absent means "everything"),
//! free-text search and equality filters restricted to the fields an entity
//! declares filterable.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::CoreError;

/// Page used when the client does not send one.
pub const DEFAULT_PAGE: i64 = 1;

/// Page size used when the client does not send one.
pub const DEFAULT_LIMIT: i64 = 10;

/// Largest page size a client may request; bigger values are capped.
pub const MAX_LIMIT: i64 = 100;

/// Equality filter on one column. More than one value means "any of".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub field: &'static str,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page: i64,
    /// `None` returns every matching row.
    pub limit: Option<i64>,
    /// Case-insensitive substring, already trimmed and non-empty.
    pub search: Option<String>,
    pub filters: Vec<Filter>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: Some(DEFAULT_LIMIT),
            search: None,
            filters: Vec::new(),
        }
    }
}

impl ListQuery {
    /// Unpaginated query matching every row.
    pub fn all() -> Self {
        Self {
            limit: None,
            ..Self::default()
        }
    }

    /// Paged query. Page must be at least 1 and limit at least 1; limits
    /// above [`MAX_LIMIT`] are capped.
    pub fn paged(page: Option<i64>, limit: Option<i64>) -> Result<Self, CoreError> {
        let page = page.unwrap_or(DEFAULT_PAGE);
        if page < 1 {
            return Err(CoreError::invalid_field(
                "page",
                "\"page\" must be greater than or equal to 1",
            ));
        }
        let limit = limit.unwrap_or(DEFAULT_LIMIT);
        if limit < 1 {
            return Err(CoreError::invalid_field(
                "limit",
                "\"limit\" must be greater than or equal to 1",
            ));
        }
        Ok(Self {
            page,
            limit: Some(limit.min(MAX_LIMIT)),
            ..Self::default()
        })
    }

    /// Attach a free-text search; blank input means no search.
    pub fn with_search(mut self, search: Option<&str>) -> Self {
        self.search = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned);
        self
    }

    /// Attach an equality filter. `raw` may hold several comma-separated
    /// values. Fields outside `allowed` are rejected.
    pub fn with_filter(
        mut self,
        allowed: &[&'static str],
        field: &str,
        raw: &str,
    ) -> Result<Self, CoreError> {
        let field = allowed
            .iter()
            .copied()
            .find(|candidate| *candidate == field)
            .ok_or_else(|| {
                CoreError::invalid_field(field, format!("\"{field}\" is not a filterable field"))
            })?;
        let values: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_owned)
            .collect();
        if values.is_empty() {
            return Ok(self);
        }
        match self.filters.iter_mut().find(|f| f.field == field) {
            Some(existing) => existing.values.extend(values),
            None => self.filters.push(Filter { field, values }),
        }
        Ok(self)
    }

    /// Rows to skip before the requested page. Saturates, so a page far
    /// past the end skips every row.
    pub fn offset(&self) -> i64 {
        match self.limit {
            Some(limit) => (self.page - 1).saturating_mul(limit),
            None => 0,
        }
    }

    /// `ceil(total / limit)`; a single page when unpaginated.
    pub fn total_pages(&self, total: i64) -> i64 {
        match self.limit {
            Some(limit) => (total + limit - 1) / limit,
            None => 1,
        }
    }

    /// Values filtered on for `field`, if any.
    pub fn filter(&self, field: &str) -> Option<&[String]> {
        self.filters
            .iter()
            .find(|f| f.field == field)
            .map(|f| f.values.as_slice())
    }
}

// ---------------------------------------------------------------------------
// Page envelope
// ---------------------------------------------------------------------------

/// One page of results, serialized as
/// `{ "data": [...], "totalPages": n, "currentPage": n, "<countKey>": n }`.
#[derive(Debug, Clone)]
pub struct ListPage<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub total_pages: i64,
    pub current_page: i64,
    /// Key of the total, e.g. `"totalMovies"`.
    pub count_key: &'static str,
}

impl<T> ListPage<T> {
    pub fn new(items: Vec<T>, total: i64, query: &ListQuery, count_key: &'static str) -> Self {
        Self {
            items,
            total,
            total_pages: query.total_pages(total),
            current_page: query.page,
            count_key,
        }
    }
}

impl<T: Serialize> Serialize for ListPage<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(4))?;
        map.serialize_entry("data", &self.items)?;
        map.serialize_entry("totalPages", &self.total_pages)?;
        map.serialize_entry("currentPage", &self.current_page)?;
        map.serialize_entry(self.count_key, &self.total)?;
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn defaults_to_first_page_of_ten() {
        let q = ListQuery::paged(None, None).unwrap();
        assert_eq!(q.page, 1);
        assert_eq!(q.limit, Some(10));
        assert_eq!(q.offset(), 0);
    }

    #[test]
    fn total_pages_rounds_up() {
        let q = ListQuery::paged(Some(3), Some(10)).unwrap();
        assert_eq!(q.total_pages(25), 3);
        assert_eq!(q.total_pages(30), 3);
        assert_eq!(q.total_pages(0), 0);
        assert_eq!(q.offset(), 20);
    }

    #[test]
    fn huge_page_saturates_offset() {
        let q = ListQuery::paged(Some(i64::MAX), Some(10)).unwrap();
        assert_eq!(q.offset(), i64::MAX);
    }

    #[test]
    fn limit_is_capped() {
        let q = ListQuery::paged(None, Some(5_000)).unwrap();
        assert_eq!(q.limit, Some(MAX_LIMIT));
    }

    #[test]
    fn non_positive_page_or_limit_rejected() {
        assert_matches!(
            ListQuery::paged(Some(0), None),
            Err(CoreError::InvalidField { field, .. }) if field == "page"
        );
        assert_matches!(
            ListQuery::paged(None, Some(-1)),
            Err(CoreError::InvalidField { field, .. }) if field == "limit"
        );
    }

    #[test]
    fn filters_restricted_and_split() {
        let q = ListQuery::default()
            .with_filter(&["status"], "status", "PENDING, CANCELLED")
            .unwrap();
        assert_eq!(q.filter("status").unwrap(), ["PENDING", "CANCELLED"]);

        let err = ListQuery::default()
            .with_filter(&["status"], "password", "x")
            .unwrap_err();
        assert_matches!(err, CoreError::InvalidField { .. });
    }

    #[test]
    fn blank_search_ignored() {
        assert_eq!(ListQuery::default().with_search(Some("   ")).search, None);
        assert_eq!(
            ListQuery::default().with_search(Some(" Dune ")).search.as_deref(),
            Some("Dune")
        );
    }

    #[test]
    fn page_serializes_with_count_key() {
        let q = ListQuery::paged(Some(2), Some(1)).unwrap();
        let page = ListPage::new(vec!["a"], 2, &q, "totalMovies");
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"data": ["a"], "totalPages": 2, "currentPage": 2, "totalMovies": 2})
        );
    }
}
