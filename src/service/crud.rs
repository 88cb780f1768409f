//! Generic CRUD dispatch: validate, synthesize SQL, execute, shape the payload.

use crate::config::{ResolvedModel, Table};
use crate::db::Database;
use crate::error::{AppError, CrudOp};
use crate::response::{exec_result_body, page_window, CreateBody, ListBody, PageWindow, Row};
use crate::service::validation::{ListRequest, RequestValidator};
use crate::sql::{count, delete, select_by_id, select_list, update, ListOptions, Paging, COUNT_LABEL};
use serde_json::Value;

pub struct CrudService;

impl CrudService {
    /// Insert one record or an array of records in one bulk operation. Unset primary keys
    /// receive time-ordered ids first.
    pub async fn create(db: &dyn Database, model: &ResolvedModel, body: Value) -> Result<CreateBody, AppError> {
        let mut rows = RequestValidator::create_rows(body)?;
        if rows.is_empty() {
            return Ok(CreateBody { row_count: 0 });
        }
        default_primary_keys(&model.table, &mut rows);
        let row_count = db
            .bulk(&model.table, &rows)
            .await
            .map_err(|e| db_failure(CrudOp::Create, model, e))?;
        Ok(CreateBody { row_count })
    }

    /// Keyword-filtered, sorted list. Runs the data query, then the count query; the count is
    /// only issued once the data query succeeded.
    pub async fn list(db: &dyn Database, model: &ResolvedModel, req: &ListRequest) -> Result<ListBody, AppError> {
        let dialect = db.dialect();
        let paging = req.is_paged().then_some(Paging {
            page: req.page,
            size: req.size,
        });
        let opts = ListOptions {
            keyword: &req.keyword,
            sort: req.sort.as_deref(),
            paging,
        };
        let data_q = select_list(dialect, model, &opts)?;
        let count_q = count(dialect, model, &req.keyword)?;

        let data = db
            .query(&data_q)
            .await
            .map_err(|e| db_failure(CrudOp::Read, model, e))?;
        let counts = db
            .query(&count_q)
            .await
            .map_err(|e| db_failure(CrudOp::Read, model, e))?;
        let total = read_count(&counts);

        let mut body = ListBody {
            data,
            totalelements: total,
            flag: req.flag,
            sort: req.sort.clone(),
            keyword: req.keyword.clone(),
            start: 1,
            end: total,
            page: None,
            size: None,
            totalpages: None,
        };
        if let Some(Paging { page, size }) = paging {
            let window = page_window(total, page, size);
            body.page = Some(page);
            body.size = Some(size);
            body.totalpages = Some(window.total_pages);
            body.start = window.start;
            body.end = window.end;
            keep_window_rows(&mut body.data, window);
        }
        Ok(body)
    }

    /// Single record by id, or `null` when nothing matched. A missing id never reaches the database.
    pub async fn one(db: &dyn Database, model: &ResolvedModel, id: Option<&str>) -> Result<Value, AppError> {
        let id = id.filter(|s| !s.is_empty()).ok_or(AppError::MissingId)?;
        let q = select_by_id(db.dialect(), model, &Value::String(id.to_string()))?;
        let rows = db
            .query(&q)
            .await
            .map_err(|e| db_failure(CrudOp::Read, model, e))?;
        Ok(rows.into_iter().next().map(Value::Object).unwrap_or(Value::Null))
    }

    /// Apply `doc` to rows matching `cond`; echoes the submitted `doc`.
    pub async fn update(db: &dyn Database, model: &ResolvedModel, body: Value) -> Result<Value, AppError> {
        let (cond, doc) = RequestValidator::update_parts(body)?;
        let q = update(db.dialect(), &model.table, &cond, &doc)?;
        db.transaction(&q)
            .await
            .map_err(|e| db_failure(CrudOp::Update, model, e))?;
        Ok(Value::Object(doc))
    }

    /// Delete rows matching every key/value pair of the body.
    pub async fn delete(db: &dyn Database, model: &ResolvedModel, body: Value) -> Result<Value, AppError> {
        let cond = RequestValidator::delete_conditions(body)?;
        let q = delete(db.dialect(), &model.table, &cond)?;
        let result = db
            .transaction(&q)
            .await
            .map_err(|e| db_failure(CrudOp::Delete, model, e))?;
        Ok(exec_result_body(result))
    }
}

/// Keep the rows inside `start..=end`. Paged rows arrive in positive order as the last `size`
/// rows of the `page * size` prefix, so the window is their tail.
fn keep_window_rows(data: &mut Vec<Row>, window: PageWindow) {
    if window.start == 0 {
        data.clear();
        return;
    }
    let wanted = (window.end - window.start + 1) as usize;
    if data.len() > wanted {
        data.drain(..data.len() - wanted);
    }
}

fn db_failure(op: CrudOp, model: &ResolvedModel, e: sqlx::Error) -> AppError {
    tracing::error!(op = %op, model = %model.key(), error = %e, "database operation failed");
    AppError::crud(op, e)
}

/// Fill every unset primary-key column with a fresh UUIDv7 (time ordered, so generated keys
/// follow insertion order). Missing, null and empty-string values count as unset.
pub fn default_primary_keys(table: &Table, rows: &mut [Row]) {
    let keys = table.primary_keys();
    for row in rows.iter_mut() {
        for key in &keys {
            let unset = match row.get(*key) {
                None | Some(Value::Null) => true,
                Some(Value::String(s)) => s.is_empty(),
                Some(_) => false,
            };
            if unset {
                row.insert((*key).to_string(), Value::String(uuid::Uuid::now_v7().to_string()));
            }
        }
    }
}

fn read_count(rows: &[Row]) -> u64 {
    let Some(v) = rows.first().and_then(|r| r.get(COUNT_LABEL)) else {
        tracing::warn!("count query returned no {} column", COUNT_LABEL);
        return 0;
    };
    match v {
        Value::Number(n) => n.as_u64().unwrap_or(0),
        Value::String(s) => s.parse().unwrap_or(0),
        _ => 0,
    }
}
