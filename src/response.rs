//! Response payload shapes for the CRUD handlers.

use serde::Serialize;
use serde_json::{Map, Value};

/// A row as returned by the database collaborator.
pub type Row = Map<String, Value>;

#[derive(Debug, Serialize)]
pub struct CreateBody {
    #[serde(rename = "rowCount")]
    pub row_count: u64,
}

/// List payload. Paging fields are present only for paged requests.
#[derive(Debug, Serialize)]
pub struct ListBody {
    pub data: Vec<Row>,
    pub totalelements: u64,
    pub flag: i64,
    pub sort: Option<String>,
    pub keyword: String,
    pub start: u64,
    pub end: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub totalpages: Option<u64>,
}

/// 1-based row range covered by one page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageWindow {
    pub start: u64,
    pub end: u64,
    pub total_pages: u64,
}

/// `start`/`end` collapse to 0 past the last page; `end` is clamped to `total` on the last page.
pub fn page_window(total: u64, page: u64, size: u64) -> PageWindow {
    let size = size.max(1);
    let total_pages = total.div_ceil(size);
    if page == 0 || page > total_pages {
        return PageWindow {
            start: 0,
            end: 0,
            total_pages,
        };
    }
    let start = (page - 1) * size + 1;
    let end = (start + size - 1).min(total);
    PageWindow {
        start,
        end,
        total_pages,
    }
}

/// Mutation results that are already objects pass through; anything else is wrapped as `{result}`.
pub fn exec_result_body(result: Value) -> Value {
    match result {
        Value::Object(_) => result,
        other => serde_json::json!({ "result": other }),
    }
}

pub fn error_body(message: &str, detail: String) -> Value {
    serde_json::json!({
        "err": {
            "message": message,
            "detail": detail
        }
    })
}

pub fn missing_id_body() -> Value {
    serde_json::json!({
        "error": "query parameter error",
        "detail": "id not specified"
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn first_page_window() {
        assert_eq!(
            page_window(45, 1, 20),
            PageWindow {
                start: 1,
                end: 20,
                total_pages: 3
            }
        );
    }

    #[test]
    fn last_page_is_clamped() {
        let w = page_window(45, 3, 20);
        assert_eq!((w.start, w.end), (41, 45));
    }

    #[test]
    fn past_last_page_collapses_to_zero() {
        let w = page_window(45, 4, 20);
        assert_eq!((w.start, w.end, w.total_pages), (0, 0, 3));
    }

    #[test]
    fn empty_result_has_no_pages() {
        let w = page_window(0, 1, 20);
        assert_eq!((w.start, w.end, w.total_pages), (0, 0, 0));
    }

    #[test]
    fn window_matches_formula_across_pages() {
        for total in [1u64, 7, 10, 11, 99] {
            for size in [1u64, 3, 10] {
                let pages = total.div_ceil(size);
                for page in 1..=pages + 1 {
                    let w = page_window(total, page, size);
                    if page > pages {
                        assert_eq!((w.start, w.end), (0, 0));
                    } else {
                        assert_eq!(w.start, (page - 1) * size + 1);
                        assert_eq!(w.end, (w.start + size - 1).min(total));
                        assert!(w.end - w.start + 1 <= size);
                    }
                }
            }
        }
    }

    #[test]
    fn exec_result_wrapping() {
        assert_eq!(exec_result_body(json!(3)), json!({ "result": 3 }));
        assert_eq!(
            exec_result_body(json!({ "rowsAffected": [3] })),
            json!({ "rowsAffected": [3] })
        );
    }

    #[test]
    fn list_body_omits_paging_when_unpaged() {
        let body = ListBody {
            data: vec![],
            totalelements: 2,
            flag: 1,
            sort: None,
            keyword: String::new(),
            start: 1,
            end: 2,
            page: None,
            size: None,
            totalpages: None,
        };
        let v = serde_json::to_value(&body).unwrap();
        assert!(v.get("page").is_none());
        assert_eq!(v["end"], json!(2));
    }
}
