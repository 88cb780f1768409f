//! SELECT list: base columns, reference value/display pairs, then primary keys.

use super::Dialect;
use crate::config::{FieldKind, Schema, Table};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Projected {
    /// Column of the base table.
    Base { column: String },
    /// Column of a joined reference target, exposed as `label`.
    Ref {
        alias: String,
        column: String,
        label: String,
    },
}

/// Columns for `table` per the schema, followed by every primary key (even if already listed)
/// so each row carries its identity.
pub fn projection(table: &Table, keys: &[&str], schema: &Schema) -> Vec<Projected> {
    let mut columns = Vec::new();
    for field in &schema.fields {
        match &field.kind {
            FieldKind::Plain => columns.push(Projected::Base {
                column: field.code.clone(),
            }),
            FieldKind::SingleRef(target) => {
                // Without ref options there is no join to read from.
                let Some(options) = &target.options else { continue };
                let alias = target.alias(&field.code);
                for column in [&options.value, &options.display] {
                    columns.push(Projected::Ref {
                        alias: alias.clone(),
                        column: column.clone(),
                        label: format!("{}.{}", field.code, column),
                    });
                }
            }
            FieldKind::MultiRef(_) => {
                // TODO: project multi-reference display values (aggregate the target's display column per id list).
                tracing::trace!(field = %field.code, table = %table.name, "multi-reference field not projected");
            }
        }
    }
    for key in keys {
        columns.push(Projected::Base {
            column: (*key).to_string(),
        });
    }
    columns
}

pub fn render_columns(dialect: Dialect, base_table: &str, columns: &[Projected]) -> String {
    columns
        .iter()
        .map(|c| match c {
            Projected::Base { column } => dialect.qualified(base_table, column),
            Projected::Ref { alias, column, label } => format!(
                "{} AS {}",
                dialect.qualified(alias, column),
                dialect.quote(label)
            ),
        })
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Column, Field, RefOptions, RefTarget};

    fn users() -> (Table, Schema) {
        let table = Table {
            name: "users".into(),
            columns: vec![
                Column::primary("id"),
                Column::new("name"),
                Column::new("deptRef"),
                Column::new("tags"),
            ],
        };
        let dept = RefTarget::parse(
            "hr-dept",
            Some(RefOptions {
                value: "id".into(),
                display: "title".into(),
            }),
        )
        .unwrap();
        let tags = RefTarget::parse("hr-tag", None).unwrap();
        let schema = Schema {
            fields: vec![
                Field::plain("name", Some("string")),
                Field {
                    code: "deptRef".into(),
                    ctrltype: Some("ref".into()),
                    kind: FieldKind::SingleRef(dept),
                },
                Field {
                    code: "tags".into(),
                    ctrltype: Some("refs".into()),
                    kind: FieldKind::MultiRef(tags),
                },
            ],
        };
        (table, schema)
    }

    #[test]
    fn projects_reference_pairs_and_keys() {
        let (table, schema) = users();
        let cols = projection(&table, &table.primary_keys(), &schema);
        assert_eq!(
            render_columns(Dialect::Postgres, "users", &cols),
            "\"users\".\"name\",\"hr_dept_deptRef\".\"id\" AS \"deptRef.id\",\
             \"hr_dept_deptRef\".\"title\" AS \"deptRef.title\",\"users\".\"id\""
        );
    }

    #[test]
    fn multi_reference_contributes_nothing() {
        let (table, schema) = users();
        let cols = projection(&table, &[], &schema);
        assert!(!cols.iter().any(|c| matches!(c, Projected::Base { column } if column == "tags")));
        assert_eq!(cols.len(), 3);
    }

    #[test]
    fn keys_are_appended_even_when_listed() {
        let (table, mut schema) = users();
        schema.fields.insert(0, Field::plain("id", None));
        let cols = projection(&table, &["id"], &schema);
        let ids = cols
            .iter()
            .filter(|c| matches!(c, Projected::Base { column } if column == "id"))
            .count();
        assert_eq!(ids, 2);
    }
}
