//! Request shape validation: turns raw query strings and JSON bodies into typed requests.

use crate::error::AppError;
use crate::response::Row;
use serde::Deserialize;
use serde_json::Value;

pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const MAX_PAGE_SIZE: u64 = 1000;

/// Raw list query string, as received.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ListParams {
    pub keyword: Option<String>,
    pub flag: Option<String>,
    pub page: Option<String>,
    pub size: Option<String>,
    pub sort: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListRequest {
    pub keyword: String,
    pub sort: Option<String>,
    /// `1` lists every matching row; anything else pages.
    pub flag: i64,
    pub page: u64,
    pub size: u64,
}

impl ListRequest {
    pub fn is_paged(&self) -> bool {
        self.flag != 1
    }
}

impl Default for ListRequest {
    fn default() -> Self {
        ListRequest {
            keyword: String::new(),
            sort: None,
            flag: 0,
            page: 1,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl From<ListParams> for ListRequest {
    /// Unparseable or non-positive numbers fall back to their defaults.
    fn from(p: ListParams) -> Self {
        let positive = |s: Option<&str>| s.and_then(|s| s.trim().parse::<u64>().ok()).filter(|n| *n > 0);
        ListRequest {
            keyword: p.keyword.unwrap_or_default(),
            sort: p.sort.filter(|s| !s.trim().is_empty()),
            flag: p.flag.and_then(|s| s.trim().parse().ok()).unwrap_or(0),
            page: positive(p.page.as_deref()).unwrap_or(1),
            size: positive(p.size.as_deref())
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .min(MAX_PAGE_SIZE),
        }
    }
}

pub struct RequestValidator;

impl RequestValidator {
    /// Create body: one record or an array of records.
    pub fn create_rows(body: Value) -> Result<Vec<Row>, AppError> {
        match body {
            Value::Object(m) => Ok(vec![m]),
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(i, v)| match v {
                    Value::Object(m) => Ok(m),
                    _ => Err(AppError::BadRequest(format!("item {} must be a JSON object", i))),
                })
                .collect(),
            _ => Err(AppError::BadRequest(
                "body must be a JSON object or an array of objects".into(),
            )),
        }
    }

    /// Update body `{cond, doc}`; either part defaults to empty when absent.
    pub fn update_parts(body: Value) -> Result<(Row, Row), AppError> {
        let mut body = Self::object(body)?;
        let cond = Self::part(&mut body, "cond")?;
        let doc = Self::part(&mut body, "doc")?;
        Ok((cond, doc))
    }

    /// Delete body: a flat key/value map.
    pub fn delete_conditions(body: Value) -> Result<Row, AppError> {
        Self::object(body)
    }

    fn object(body: Value) -> Result<Row, AppError> {
        match body {
            Value::Object(m) => Ok(m),
            _ => Err(AppError::BadRequest("body must be a JSON object".into())),
        }
    }

    fn part(body: &mut Row, name: &str) -> Result<Row, AppError> {
        match body.remove(name) {
            None | Some(Value::Null) => Ok(Row::new()),
            Some(Value::Object(m)) => Ok(m),
            Some(_) => Err(AppError::BadRequest(format!("{} must be a JSON object", name))),
        }
    }
}
