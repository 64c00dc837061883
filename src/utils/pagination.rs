//! Paging and sorting for the listing endpoints.
//!
//! Every listing accepts `page` (zero-based), `size`, and a single
//! `sort=field,direction` token. The parsed [`PageRequest`] carries a
//! ready-to-use `ORDER BY` clause built from a per-entity whitelist of
//! sortable columns, so raw request input never reaches the SQL text.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::{IntoParams, ToSchema};

pub const DEFAULT_PAGE_SIZE: i64 = 10;

#[derive(Debug, Error, PartialEq)]
pub enum InvalidSort {
    #[error("sort must be \"field,direction\", got {0:?}")]
    Malformed(String),
    #[error("unknown sort direction {0:?}")]
    Direction(String),
    #[error("cannot sort by {0:?}")]
    Field(String),
}

#[derive(Debug, Error, PartialEq)]
pub enum PageError {
    #[error("page index must not be negative, got {0}")]
    Page(i64),
    #[error("page size must be positive, got {0}")]
    Size(i64),
    #[error(transparent)]
    Sort(#[from] InvalidSort),
}

/// Raw paging query parameters as they arrive on the wire.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct PageQuery {
    /// Zero-based page index. Defaults to 0.
    pub page: Option<i64>,
    /// Page size. Defaults to 10.
    pub size: Option<i64>,
    /// Sort token in `field,direction` form, e.g. `title,asc`.
    pub sort: Option<String>,
}

impl PageQuery {
    /// Validate paging and resolve the sort token against `columns`, a
    /// whitelist of `(api field, sql column)` pairs. `tie_break` is the id
    /// column appended as a secondary sort key so duplicate sort values
    /// still page deterministically.
    pub fn resolve(
        &self,
        default_sort: &str,
        columns: &[(&str, &str)],
        tie_break: &str,
    ) -> Result<PageRequest, PageError> {
        let page = self.page.unwrap_or(0);
        if page < 0 {
            return Err(PageError::Page(page));
        }

        let size = self.size.unwrap_or(DEFAULT_PAGE_SIZE);
        if size <= 0 {
            return Err(PageError::Size(size));
        }

        let sort = self.sort.as_deref().unwrap_or(default_sort);
        let (field, direction) = sort
            .split_once(',')
            .ok_or_else(|| InvalidSort::Malformed(sort.to_string()))?;

        let descending = match direction.trim().to_ascii_lowercase().as_str() {
            "asc" => false,
            "desc" => true,
            other => return Err(InvalidSort::Direction(other.to_string()).into()),
        };

        let field = field.trim();
        let column = columns
            .iter()
            .find(|(api, _)| *api == field)
            .map(|(_, col)| *col)
            .ok_or_else(|| InvalidSort::Field(field.to_string()))?;

        let mut order_by = format!("{} {}", column, if descending { "DESC" } else { "ASC" });
        if column != tie_break {
            order_by.push_str(&format!(", {} ASC", tie_break));
        }

        Ok(PageRequest {
            page,
            size,
            order_by,
        })
    }
}

/// A validated page request consumed by the query executor.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    pub page: i64,
    pub size: i64,
    pub order_by: String,
}

impl PageRequest {
    /// Row offset of this page. Saturates instead of overflowing, so an
    /// absurdly large page index degrades to an empty page rather than a
    /// negative OFFSET.
    pub fn offset(&self) -> i64 {
        self.page.saturating_mul(self.size)
    }
}

/// Uniform listing envelope shared by the Courses, Students, and
/// Enrollments endpoints.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageEnvelope<T> {
    pub content: Vec<T>,
    pub page: i64,
    pub size: i64,
    pub total_elements: i64,
    pub total_pages: i64,
    pub last: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub filters_applied: Option<serde_json::Value>,
}

impl<T> PageEnvelope<T> {
    pub fn new(content: Vec<T>, request: &PageRequest, total_elements: i64) -> Self {
        let total_pages = if total_elements == 0 {
            0
        } else {
            (total_elements + request.size - 1) / request.size
        };

        Self {
            content,
            page: request.page,
            size: request.size,
            total_elements,
            total_pages,
            last: request.page + 1 >= total_pages,
            filters_applied: None,
        }
    }

    pub fn with_filters(mut self, filters: serde_json::Value) -> Self {
        self.filters_applied = Some(filters);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLUMNS: &[(&str, &str)] = &[("id", "c.id"), ("title", "c.title")];

    fn query(page: Option<i64>, size: Option<i64>, sort: Option<&str>) -> PageQuery {
        PageQuery {
            page,
            size,
            sort: sort.map(str::to_string),
        }
    }

    #[test]
    fn resolve_applies_defaults() {
        let request = query(None, None, None)
            .resolve("id,asc", COLUMNS, "c.id")
            .unwrap();
        assert_eq!(request.page, 0);
        assert_eq!(request.size, 10);
        assert_eq!(request.order_by, "c.id ASC");
    }

    #[test]
    fn resolve_parses_descending_case_insensitively() {
        let request = query(Some(2), Some(5), Some("title,DESC"))
            .resolve("id,asc", COLUMNS, "c.id")
            .unwrap();
        assert_eq!(request.order_by, "c.title DESC, c.id ASC");
        assert_eq!(request.offset(), 10);
    }

    #[test]
    fn resolve_appends_tie_break_only_for_non_id_sorts() {
        let by_id = query(None, None, Some("id,desc"))
            .resolve("id,asc", COLUMNS, "c.id")
            .unwrap();
        assert_eq!(by_id.order_by, "c.id DESC");
    }

    #[test]
    fn resolve_rejects_missing_comma() {
        let err = query(None, None, Some("title"))
            .resolve("id,asc", COLUMNS, "c.id")
            .unwrap_err();
        assert_eq!(
            err,
            PageError::Sort(InvalidSort::Malformed("title".to_string()))
        );
    }

    #[test]
    fn resolve_rejects_unknown_direction() {
        let err = query(None, None, Some("title,sideways"))
            .resolve("id,asc", COLUMNS, "c.id")
            .unwrap_err();
        assert_eq!(
            err,
            PageError::Sort(InvalidSort::Direction("sideways".to_string()))
        );
    }

    #[test]
    fn resolve_rejects_unlisted_field() {
        let err = query(None, None, Some("password,asc"))
            .resolve("id,asc", COLUMNS, "c.id")
            .unwrap_err();
        assert_eq!(
            err,
            PageError::Sort(InvalidSort::Field("password".to_string()))
        );
    }

    #[test]
    fn resolve_rejects_negative_page_and_zero_size() {
        let err = query(Some(-1), None, None)
            .resolve("id,asc", COLUMNS, "c.id")
            .unwrap_err();
        assert_eq!(err, PageError::Page(-1));

        let err = query(None, Some(0), None)
            .resolve("id,asc", COLUMNS, "c.id")
            .unwrap_err();
        assert_eq!(err, PageError::Size(0));
    }

    #[test]
    fn offset_saturates_on_huge_page_index() {
        let request = query(Some(i64::MAX / 2), Some(10), None)
            .resolve("id,asc", COLUMNS, "c.id")
            .unwrap();
        assert_eq!(request.offset(), i64::MAX);
    }

    fn request(page: i64, size: i64) -> PageRequest {
        PageRequest {
            page,
            size,
            order_by: "id ASC".to_string(),
        }
    }

    #[test]
    fn envelope_computes_page_metadata() {
        let envelope = PageEnvelope::new(vec![1, 2], &request(0, 2), 5);
        assert_eq!(envelope.total_elements, 5);
        assert_eq!(envelope.total_pages, 3);
        assert!(!envelope.last);
    }

    #[test]
    fn envelope_marks_last_on_exact_boundary() {
        let envelope = PageEnvelope::new(vec![1, 2], &request(1, 2), 4);
        assert!(envelope.last);
    }

    #[test]
    fn envelope_past_the_end_is_last() {
        // page * size >= total, so there is nothing after this page
        let envelope = PageEnvelope::new(Vec::<i32>::new(), &request(7, 10), 30);
        assert!(envelope.last);
    }

    #[test]
    fn envelope_of_empty_set_is_last() {
        let envelope = PageEnvelope::new(Vec::<i32>::new(), &request(0, 10), 0);
        assert_eq!(envelope.total_pages, 0);
        assert!(envelope.last);
    }

    #[test]
    fn envelope_serializes_contract_keys() {
        let envelope = PageEnvelope::new(vec![1], &request(0, 10), 1)
            .with_filters(serde_json::json!({"title": "Rust"}));
        let value = serde_json::to_value(&envelope).unwrap();
        let object = value.as_object().unwrap();
        for key in [
            "content",
            "page",
            "size",
            "totalElements",
            "totalPages",
            "last",
            "filtersApplied",
        ] {
            assert!(object.contains_key(key), "missing key {key}");
        }
    }
}
