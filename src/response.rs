//! Standard response envelope and pagination helpers.

use crate::config::ResponseMessages;
use crate::error::ValidationError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Uniform JSON wrapper around every response, success or error.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub data: Value,
    pub status_code: u16,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u64>,
}

impl Envelope {
    pub fn new(data: Value, status: StatusCode, message: impl Into<String>) -> Self {
        Envelope {
            data,
            status_code: status.as_u16(),
            message: message.into(),
            page: None,
            total_pages: None,
        }
    }

    pub fn with_page(mut self, page: u64, total_pages: u64) -> Self {
        self.page = Some(page);
        self.total_pages = Some(total_pages);
        self
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

pub fn success_ok(data: Value, message: impl Into<String>) -> Envelope {
    Envelope::new(data, StatusCode::OK, message)
}

/// Missing rows answer with an empty object rather than an error body.
pub fn not_found(messages: &ResponseMessages) -> Envelope {
    Envelope::new(
        Value::Object(serde_json::Map::new()),
        StatusCode::NOT_FOUND,
        messages.not_found.clone(),
    )
}

/// Row window handed to the store. `limit: None` means every row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Page {
    pub offset: u64,
    pub limit: Option<u64>,
}

impl Page {
    pub fn all() -> Self {
        Page { offset: 0, limit: None }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    pub page: u64,
    pub total_pages: u64,
    pub window: Page,
}

/// Requested page number; absent means 1. Anything but a positive integer is `TypeInteger("page")`.
pub fn parse_page(raw: Option<&str>, messages: &ResponseMessages) -> Result<u64, ValidationError> {
    match raw {
        None => Ok(1),
        Some(s) => s
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| messages.type_integer(&"page")),
    }
}

/// Largest offset a SQL `OFFSET` accepts.
pub const MAX_OFFSET: u64 = i64::MAX as u64;

/// `total_pages = ceil(total_records / page_size)`. Offsets past `MAX_OFFSET` are clamped.
pub fn paginate(total_records: u64, page_size: u32, page: u64) -> Pagination {
    let size = u64::from(page_size);
    let total_pages = if size == 0 { 0 } else { total_records.div_ceil(size) };
    Pagination {
        page,
        total_pages,
        window: Page {
            offset: page.saturating_sub(1).saturating_mul(size).min(MAX_OFFSET),
            limit: Some(size),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    #[test]
    fn total_pages_round_up() {
        assert_eq!(paginate(25, 10, 1).total_pages, 3);
        assert_eq!(paginate(20, 10, 1).total_pages, 2);
        assert_eq!(paginate(0, 10, 1).total_pages, 0);
        assert_eq!(paginate(1, 10, 1).total_pages, 1);
    }

    #[test]
    fn huge_page_offset_stays_in_sql_range() {
        let m = ResponseMessages::default();
        let page = parse_page(Some("18446744073709551615"), &m).unwrap();
        let p = paginate(5, 10, page);
        assert_eq!(p.window.offset, MAX_OFFSET);
        assert_eq!(p.page, u64::MAX);
        assert_eq!(paginate(5, 10, 2_000_000_000_000_000_000).window.offset, MAX_OFFSET);
    }

    #[test]
    fn window_follows_page() {
        let p = paginate(25, 10, 2);
        assert_eq!(p.window, Page { offset: 10, limit: Some(10) });
        assert_eq!(paginate(25, 10, 1).window.offset, 0);
    }

    #[test]
    fn page_must_be_positive_integer() {
        let m = ResponseMessages::default();
        assert_eq!(parse_page(None, &m).unwrap(), 1);
        assert_eq!(parse_page(Some("3"), &m).unwrap(), 3);
        for bad in ["abc", "0", "-1", "1.5", ""] {
            let err = parse_page(Some(bad), &m).unwrap_err();
            assert_eq!(err.kind, ErrorKind::TypeInteger);
            assert!(err.message.contains("page"));
        }
    }

    #[test]
    fn envelope_omits_paging_unless_given() {
        let single = serde_json::to_value(success_ok(json!({"id": 1}), "OK")).unwrap();
        assert_eq!(single, json!({"data": {"id": 1}, "status_code": 200, "message": "OK"}));

        let paged = serde_json::to_value(success_ok(json!([]), "OK").with_page(2, 3)).unwrap();
        assert_eq!(
            paged,
            json!({"data": [], "status_code": 200, "message": "OK", "page": 2, "total_pages": 3})
        );
    }

    #[test]
    fn not_found_has_empty_object() {
        let env = not_found(&ResponseMessages::default());
        assert_eq!(env.status_code, 404);
        assert_eq!(env.data, json!({}));
    }
}
