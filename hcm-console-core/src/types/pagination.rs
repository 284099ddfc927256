use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::FilterExpr;

// ============ Page size defaults ============

/// Page size a list view starts with.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Page size restored whenever the filter changes.
///
/// Deliberately different from [`DEFAULT_PAGE_SIZE`]; the console has always
/// shrunk the page after a filter change and nobody has confirmed whether
/// that is product behaviour or an accident, so both are kept.
pub const FILTER_RESET_PAGE_SIZE: u32 = 10;

/// Page size knobs of a list controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListQueryConfig {
    pub default_page_size: u32,
    pub filter_reset_page_size: u32,
}

impl Default for ListQueryConfig {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            filter_reset_page_size: FILTER_RESET_PAGE_SIZE,
        }
    }
}

// ============ Pagination state ============

/// Pagination of one list view. Pages are 1-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Current page (1-indexed).
    pub current: u32,
    /// Page size.
    pub limit: u32,
    /// Total number of records, only ever written from a count response.
    pub count: u64,
}

impl Pagination {
    pub fn new(limit: u32) -> Self {
        Self {
            current: 1,
            limit,
            count: 0,
        }
    }

    /// Offset of the first record of the current page.
    pub fn start(&self) -> u64 {
        u64::from(self.current.saturating_sub(1)) * u64::from(self.limit)
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    /// Parse a table widget's direction string; anything but `desc` sorts ascending.
    pub fn from_widget(direction: &str) -> Self {
        if direction.eq_ignore_ascii_case("desc") {
            Self::Desc
        } else {
            Self::Asc
        }
    }
}

/// Active sort column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    pub field: String,
    pub order: SortOrder,
}

// ============ Wire shapes ============

/// `page` section of a list request.
///
/// A count request carries only `count: true`; a page request carries
/// `count: false` plus explicit bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub count: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<SortOrder>,
}

impl PageRequest {
    /// Count-only page section.
    pub fn count_only() -> Self {
        Self {
            count: true,
            start: None,
            limit: None,
            sort: None,
            order: None,
        }
    }

    /// Bounded page section for `pagination`, sorted by `sort` if any.
    pub fn page(pagination: &Pagination, sort: Option<&Sort>) -> Self {
        Self {
            count: false,
            start: Some(pagination.start()),
            limit: Some(pagination.limit),
            sort: sort.map(|s| s.field.clone()),
            order: sort.map(|s| s.order),
        }
    }
}

/// Body of a list or count request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListRequest {
    pub page: PageRequest,
    pub filter: FilterExpr,
    /// Caller supplied arguments merged into the top level of the body.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `data` of a list response. Older endpoints answer with `list`, newer with `details`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
}

impl ListResponse {
    /// Raw records, whichever key the backend used.
    pub fn into_records(self) -> Vec<Value> {
        self.details.or(self.list).unwrap_or_default()
    }
}

/// A fetched page: raw records plus the total count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListPage {
    pub records: Vec<Value>,
    pub count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn start_is_zero_based_offset() {
        let mut p = Pagination::new(20);
        assert_eq!(p.start(), 0);
        p.current = 3;
        assert_eq!(p.start(), 40);
    }

    #[test]
    fn page_request_wire_shape() {
        let mut p = Pagination::new(10);
        p.current = 2;
        let sort = Sort {
            field: "created_at".to_string(),
            order: SortOrder::Desc,
        };
        let value = serde_json::to_value(PageRequest::page(&p, Some(&sort))).unwrap();
        assert_eq!(
            value,
            json!({ "count": false, "start": 10, "limit": 10, "sort": "created_at", "order": "DESC" })
        );

        let value = serde_json::to_value(PageRequest::count_only()).unwrap();
        assert_eq!(value, json!({ "count": true }));
    }

    #[test]
    fn list_response_accepts_details_or_list() {
        let a: ListResponse = serde_json::from_value(json!({ "details": [{ "id": 1 }] })).unwrap();
        assert_eq!(a.into_records().len(), 1);

        let b: ListResponse = serde_json::from_value(json!({ "list": [{ "id": 1 }, { "id": 2 }] })).unwrap();
        assert_eq!(b.into_records().len(), 2);

        let c: ListResponse = serde_json::from_value(json!({ "count": 9 })).unwrap();
        assert_eq!(c.count, Some(9));
        assert!(c.into_records().is_empty());
    }

    #[test]
    fn widget_direction_parsing() {
        assert_eq!(SortOrder::from_widget("desc"), SortOrder::Desc);
        assert_eq!(SortOrder::from_widget("asc"), SortOrder::Asc);
        assert_eq!(SortOrder::from_widget("null"), SortOrder::Asc);
    }
}
