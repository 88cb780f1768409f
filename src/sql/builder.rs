//! Builds parameterized SELECT (paged/unpaged/by id), COUNT, bulk INSERT, UPDATE and DELETE
//! from a resolved model.

use super::{
    equality_conditions, joins, keyword_conditions, projection, render_columns, render_conditions,
    render_joins, render_order, Condition, Dialect, Joiner, SortSpec,
};
use crate::config::{ResolvedModel, Table};
use crate::error::{AppError, ConfigError};
use crate::response::Row;
use serde_json::Value;

/// Alias of the primary-key prefix subquery in paged lists.
const PAGE_ALIAS: &str = "w";

/// Label of the COUNT column.
pub const COUNT_LABEL: &str = "counts";

#[derive(Clone, Debug)]
pub struct QueryBuf {
    pub dialect: Dialect,
    pub sql: String,
    pub params: Vec<Value>,
}

impl QueryBuf {
    pub fn new(dialect: Dialect) -> Self {
        QueryBuf {
            dialect,
            sql: String::new(),
            params: Vec::new(),
        }
    }

    /// Bind `v` and return its placeholder text.
    pub fn push_param(&mut self, v: Value, cast: Option<&str>) -> String {
        self.params.push(v);
        self.dialect.placeholder(self.params.len(), cast)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Paging {
    /// 1-based page number.
    pub page: u64,
    pub size: u64,
}

#[derive(Clone, Debug, Default)]
pub struct ListOptions<'a> {
    pub keyword: &'a str,
    pub sort: Option<&'a str>,
    /// None renders the unpaged form.
    pub paging: Option<Paging>,
}

fn first_key(table: &Table) -> Result<&str, AppError> {
    table.primary_keys().first().copied().ok_or_else(|| {
        AppError::Config(ConfigError::NoPrimaryKey {
            table: table.name.clone(),
        })
    })
}

/// Sort tokens address base-table columns; anything else is a client error.
fn resolve_sort(table: &Table, sort: Option<&str>, key: &str) -> Result<SortSpec, AppError> {
    let spec = SortSpec::parse(sort);
    if let Some(unknown) = spec.columns().find(|c| !table.has_column(c)) {
        return Err(AppError::BadRequest(format!(
            "cannot sort {} by unknown column '{}'",
            table.name, unknown
        )));
    }
    Ok(spec.with_tiebreaker(key))
}

/// List query. Paged form:
///
/// ```text
/// SELECT <cols> FROM t <joins> WHERE t.k IN (
///     SELECT TOP size w.k FROM (
///         SELECT TOP page*size t.k, <sort cols> FROM t WHERE <cond> ORDER BY <positive>
///     ) AS w ORDER BY <reverse on w>
/// ) ORDER BY <positive>
/// ```
///
/// Only keys (and sort columns) of skipped rows are read; joins run for the page alone.
pub fn select_list(
    dialect: Dialect,
    model: &ResolvedModel,
    opts: &ListOptions<'_>,
) -> Result<QueryBuf, AppError> {
    let table = &model.table;
    let key = first_key(table)?;
    let keys = table.primary_keys();
    let sort = resolve_sort(table, opts.sort, key)?;

    let mut q = QueryBuf::new(dialect);
    let t = table.name.as_str();
    let cols = render_columns(dialect, t, &projection(table, &keys, &model.schema));
    let join_sql = render_joins(dialect, t, &joins(&model.schema));
    let conditions = keyword_conditions(table, &model.schema, opts.keyword);
    let where_sql = render_conditions(&mut q, &conditions, Joiner::Or);
    let positive = render_order(dialect, t, &sort.positive);

    q.sql = match opts.paging {
        None => format!(
            "SELECT {} FROM {}{} WHERE {} ORDER BY {}",
            cols,
            dialect.quote(t),
            join_sql,
            where_sql,
            positive
        ),
        Some(Paging { page, size }) => {
            let prefix = page.max(1).saturating_mul(size);
            let mut inner_cols = vec![dialect.qualified(t, key)];
            for c in sort.columns().filter(|c| *c != key) {
                inner_cols.push(dialect.qualified(t, c));
            }
            let inner = format!(
                "SELECT {}{} FROM {} WHERE {} ORDER BY {}{}",
                dialect.top(prefix),
                inner_cols.join(","),
                dialect.quote(t),
                where_sql,
                positive,
                dialect.limit(prefix)
            );
            let middle = format!(
                "SELECT {}{} FROM ({}) AS {} ORDER BY {}{}",
                dialect.top(size),
                dialect.qualified(PAGE_ALIAS, key),
                inner,
                dialect.quote(PAGE_ALIAS),
                render_order(dialect, PAGE_ALIAS, &sort.reverse),
                dialect.limit(size)
            );
            format!(
                "SELECT {} FROM {}{} WHERE {} IN ({}) ORDER BY {}",
                cols,
                dialect.quote(t),
                join_sql,
                dialect.qualified(t, key),
                middle,
                positive
            )
        }
    };
    Ok(q)
}

/// Row count for the same keyword filter as [`select_list`], without joins.
pub fn count(dialect: Dialect, model: &ResolvedModel, keyword: &str) -> Result<QueryBuf, AppError> {
    let table = &model.table;
    let key = first_key(table)?;
    let mut q = QueryBuf::new(dialect);
    let conditions = keyword_conditions(table, &model.schema, keyword);
    let where_sql = render_conditions(&mut q, &conditions, Joiner::Or);
    q.sql = format!(
        "SELECT COUNT({}) AS {} FROM {} WHERE {}",
        dialect.qualified(&table.name, key),
        dialect.quote(COUNT_LABEL),
        dialect.quote(&table.name),
        where_sql
    );
    Ok(q)
}

/// SELECT by id. Every primary-key column is compared with the same `id`, so a composite key
/// only matches rows whose key columns all hold that value.
pub fn select_by_id(dialect: Dialect, model: &ResolvedModel, id: &Value) -> Result<QueryBuf, AppError> {
    let table = &model.table;
    first_key(table)?;
    let keys = table.primary_keys();
    let t = table.name.as_str();

    let mut q = QueryBuf::new(dialect);
    let cols = render_columns(dialect, t, &projection(table, &keys, &model.schema));
    let join_sql = render_joins(dialect, t, &joins(&model.schema));
    let conditions: Vec<Condition> = keys.iter().map(|k| Condition::eq(table, k, id.clone())).collect();
    let where_sql = render_conditions(&mut q, &conditions, Joiner::And);
    q.sql = format!(
        "SELECT {} FROM {}{} WHERE {}",
        cols,
        dialect.quote(t),
        join_sql,
        where_sql
    );
    Ok(q)
}

/// Multi-row INSERT over the table columns present in at least one row (table order).
/// Keys that are not table columns are ignored; missing values bind as NULL.
/// Returns None when there is nothing to insert.
pub fn insert_bulk(dialect: Dialect, table: &Table, rows: &[Row]) -> Option<QueryBuf> {
    let columns: Vec<_> = table
        .columns
        .iter()
        .filter(|c| rows.iter().any(|r| r.contains_key(&c.name)))
        .collect();
    if rows.is_empty() || columns.is_empty() {
        return None;
    }
    let mut q = QueryBuf::new(dialect);
    let mut tuples = Vec::with_capacity(rows.len());
    for row in rows {
        let placeholders: Vec<String> = columns
            .iter()
            .map(|c| {
                let v = row.get(&c.name).cloned().unwrap_or(Value::Null);
                q.push_param(v, c.sql_type.as_deref())
            })
            .collect();
        tuples.push(format!("({})", placeholders.join(",")));
    }
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES {}",
        dialect.quote(&table.name),
        columns
            .iter()
            .map(|c| dialect.quote(&c.name))
            .collect::<Vec<_>>()
            .join(","),
        tuples.join(",")
    );
    Some(q)
}

/// UPDATE rows matching every `cond` pair, assigning the `doc` pairs that name table columns.
pub fn update(dialect: Dialect, table: &Table, cond: &Row, doc: &Row) -> Result<QueryBuf, AppError> {
    if cond.is_empty() {
        return Err(AppError::BadRequest("update requires a non-empty cond".into()));
    }
    let mut q = QueryBuf::new(dialect);
    let mut sets = Vec::new();
    for (k, v) in doc {
        let Some(c) = table.column(k) else { continue };
        let ph = q.push_param(v.clone(), c.sql_type.as_deref());
        sets.push(format!("{} = {}", dialect.quote(k), ph));
    }
    if sets.is_empty() {
        return Err(AppError::BadRequest(format!(
            "update doc names no columns of {}",
            table.name
        )));
    }
    let conditions = equality_conditions(table, cond)?;
    let where_sql = render_conditions(&mut q, &conditions, Joiner::And);
    q.sql = format!(
        "UPDATE {} SET {} WHERE {}",
        dialect.quote(&table.name),
        sets.join(","),
        where_sql
    );
    Ok(q)
}

/// DELETE rows matching every `cond` pair.
pub fn delete(dialect: Dialect, table: &Table, cond: &Row) -> Result<QueryBuf, AppError> {
    if cond.is_empty() {
        return Err(AppError::BadRequest("delete requires at least one condition".into()));
    }
    let mut q = QueryBuf::new(dialect);
    let conditions = equality_conditions(table, cond)?;
    let where_sql = render_conditions(&mut q, &conditions, Joiner::And);
    q.sql = format!("DELETE FROM {} WHERE {}", dialect.quote(&table.name), where_sql);
    Ok(q)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Column, Field, FieldKind, RefOptions, RefTarget, Schema};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn users() -> ResolvedModel {
        let dept = RefTarget::parse(
            "hr-dept",
            Some(RefOptions {
                value: "id".into(),
                display: "title".into(),
            }),
        )
        .unwrap();
        ResolvedModel {
            module_code: "app".into(),
            model_code: "users".into(),
            table: Table {
                name: "users".into(),
                columns: vec![Column::primary("id"), Column::new("name"), Column::new("deptRef")],
            },
            schema: Schema {
                fields: vec![
                    Field::plain("name", None),
                    Field {
                        code: "deptRef".into(),
                        ctrltype: Some("ref".into()),
                        kind: FieldKind::SingleRef(dept),
                    },
                ],
            },
        }
    }

    fn row(v: serde_json::Value) -> Row {
        v.as_object().unwrap().clone()
    }

    #[test]
    fn paged_list_mssql() {
        let opts = ListOptions {
            keyword: "",
            sort: None,
            paging: Some(Paging { page: 2, size: 10 }),
        };
        let q = select_list(Dialect::Mssql, &users(), &opts).unwrap();
        assert_eq!(
            q.sql,
            "SELECT [users].[name],[hr_dept_deptRef].[id] AS [deptRef.id],[hr_dept_deptRef].[title] AS [deptRef.title],[users].[id] \
             FROM [users] LEFT JOIN [hr_dept] AS [hr_dept_deptRef] ON [hr_dept_deptRef].[id] = [users].[deptRef] \
             WHERE [users].[id] IN (SELECT TOP 10 [w].[id] FROM (SELECT TOP 20 [users].[id] FROM [users] WHERE 1=1 ORDER BY [users].[id]) AS [w] ORDER BY [w].[id] DESC) \
             ORDER BY [users].[id]"
        );
        assert!(q.params.is_empty());
    }

    #[test]
    fn paged_list_postgres_with_sort_and_keyword() {
        let opts = ListOptions {
            keyword: "ann",
            sort: Some("-name"),
            paging: Some(Paging { page: 1, size: 5 }),
        };
        let q = select_list(Dialect::Postgres, &users(), &opts).unwrap();
        assert_eq!(
            q.sql,
            "SELECT \"users\".\"name\",\"hr_dept_deptRef\".\"id\" AS \"deptRef.id\",\"hr_dept_deptRef\".\"title\" AS \"deptRef.title\",\"users\".\"id\" \
             FROM \"users\" LEFT JOIN \"hr_dept\" AS \"hr_dept_deptRef\" ON \"hr_dept_deptRef\".\"id\" = \"users\".\"deptRef\" \
             WHERE \"users\".\"id\" IN (SELECT \"w\".\"id\" FROM (SELECT \"users\".\"id\",\"users\".\"name\" FROM \"users\" WHERE CAST(\"users\".\"name\" AS TEXT) LIKE $1 \
             ORDER BY \"users\".\"name\" DESC,\"users\".\"id\" LIMIT 5) AS \"w\" ORDER BY \"w\".\"name\",\"w\".\"id\" DESC LIMIT 5) \
             ORDER BY \"users\".\"name\" DESC,\"users\".\"id\""
        );
        assert_eq!(q.params, vec![json!("%ann%")]);
    }

    #[test]
    fn paged_list_projects_repeated_sort_column_once() {
        let opts = ListOptions {
            keyword: "",
            sort: Some("name name"),
            paging: Some(Paging { page: 1, size: 5 }),
        };
        let q = select_list(Dialect::Postgres, &users(), &opts).unwrap();
        assert!(q.sql.contains(
            "(SELECT \"users\".\"id\",\"users\".\"name\" FROM \"users\" WHERE 1=1 \
             ORDER BY \"users\".\"name\",\"users\".\"id\" LIMIT 5) AS \"w\" ORDER BY \"w\".\"name\" DESC,\"w\".\"id\" DESC"
        ));
    }

    #[test]
    fn unpaged_list() {
        let opts = ListOptions {
            keyword: "",
            sort: Some("name"),
            paging: None,
        };
        let q = select_list(Dialect::Mssql, &users(), &opts).unwrap();
        assert_eq!(
            q.sql,
            "SELECT [users].[name],[hr_dept_deptRef].[id] AS [deptRef.id],[hr_dept_deptRef].[title] AS [deptRef.title],[users].[id] \
             FROM [users] LEFT JOIN [hr_dept] AS [hr_dept_deptRef] ON [hr_dept_deptRef].[id] = [users].[deptRef] \
             WHERE 1=1 ORDER BY [users].[name],[users].[id]"
        );
    }

    #[test]
    fn list_rejects_unknown_sort_column() {
        let opts = ListOptions {
            keyword: "",
            sort: Some("salary"),
            paging: None,
        };
        assert!(matches!(
            select_list(Dialect::Postgres, &users(), &opts),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn list_and_count_refuse_keyless_tables() {
        let mut model = users();
        model.table.columns[0].primary = false;
        let opts = ListOptions::default();
        assert!(matches!(
            select_list(Dialect::Postgres, &model, &opts),
            Err(AppError::Config(ConfigError::NoPrimaryKey { .. }))
        ));
        assert!(count(Dialect::Postgres, &model, "").is_err());
        assert!(select_by_id(Dialect::Postgres, &model, &json!("1")).is_err());
    }

    #[test]
    fn count_uses_same_filter_without_joins() {
        let q = count(Dialect::Postgres, &users(), "x").unwrap();
        assert_eq!(
            q.sql,
            "SELECT COUNT(\"users\".\"id\") AS \"counts\" FROM \"users\" WHERE CAST(\"users\".\"name\" AS TEXT) LIKE $1"
        );
        assert_eq!(q.params, vec![json!("%x%")]);
    }

    #[test]
    fn by_id_repeats_id_for_composite_keys() {
        let mut model = users();
        model.table.columns.push(Column::primary("tenant"));
        let q = select_by_id(Dialect::Postgres, &model, &json!("42")).unwrap();
        assert!(q.sql.ends_with("WHERE \"users\".\"id\" = $1 AND \"users\".\"tenant\" = $2"));
        assert_eq!(q.params, vec![json!("42"), json!("42")]);
    }

    #[test]
    fn bulk_insert_uses_present_columns() {
        let table = users().table;
        let rows = vec![
            row(json!({ "id": "a", "name": "Ann", "ignored": 1 })),
            row(json!({ "id": "b" })),
        ];
        let q = insert_bulk(Dialect::Postgres, &table, &rows).unwrap();
        assert_eq!(
            q.sql,
            "INSERT INTO \"users\" (\"id\",\"name\") VALUES ($1,$2),($3,$4)"
        );
        assert_eq!(q.params, vec![json!("a"), json!("Ann"), json!("b"), json!(null)]);
        assert!(insert_bulk(Dialect::Postgres, &table, &[]).is_none());
    }

    #[test]
    fn update_sets_doc_and_filters_by_cond() {
        let table = users().table;
        let q = update(
            Dialect::Mssql,
            &table,
            &row(json!({ "id": "a" })),
            &row(json!({ "name": "O'Neil", "deptRef.title": "x" })),
        )
        .unwrap();
        assert_eq!(q.sql, "UPDATE [users] SET [name] = @P1 WHERE [users].[id] = @P2");
        assert_eq!(q.params, vec![json!("O'Neil"), json!("a")]);
    }

    #[test]
    fn update_requires_cond_and_doc() {
        let table = users().table;
        assert!(update(Dialect::Postgres, &table, &Row::new(), &row(json!({ "name": "x" }))).is_err());
        assert!(update(Dialect::Postgres, &table, &row(json!({ "id": "a" })), &Row::new()).is_err());
    }

    #[test]
    fn delete_by_equality() {
        let table = users().table;
        let q = delete(Dialect::Postgres, &table, &row(json!({ "id": "a", "name": "b" }))).unwrap();
        assert_eq!(
            q.sql,
            "DELETE FROM \"users\" WHERE \"users\".\"id\" = $1 AND \"users\".\"name\" = $2"
        );
        assert!(delete(Dialect::Postgres, &table, &Row::new()).is_err());
    }
}
