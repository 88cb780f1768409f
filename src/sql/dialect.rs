//! Per-backend rendering: identifier quoting, placeholders, row limiting.

/// SQL flavor the statements are rendered for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Dialect {
    #[default]
    Postgres,
    /// Bracket-quoted identifiers, `@Pn` placeholders, `TOP n`.
    Mssql,
}

impl Dialect {
    /// Quote identifier (safe: only from validated model definitions or checked against them).
    pub fn quote(self, ident: &str) -> String {
        match self {
            Dialect::Postgres => format!("\"{}\"", ident.replace('"', "\"\"")),
            Dialect::Mssql => format!("[{}]", ident.replace(']', "]]")),
        }
    }

    /// `qualifier.column`, both quoted.
    pub fn qualified(self, qualifier: &str, column: &str) -> String {
        format!("{}.{}", self.quote(qualifier), self.quote(column))
    }

    /// Placeholder for the n-th (1-based) bound parameter, cast when the column declares a type.
    pub fn placeholder(self, n: usize, cast: Option<&str>) -> String {
        match (self, cast) {
            (Dialect::Postgres, None) => format!("${}", n),
            (Dialect::Postgres, Some(ty)) => format!("${}::{}", n, ty),
            (Dialect::Mssql, None) => format!("@P{}", n),
            (Dialect::Mssql, Some(ty)) => format!("CAST(@P{} AS {})", n, ty),
        }
    }

    /// `expr` converted to text, for LIKE against columns of any type.
    pub fn as_text(self, expr: &str) -> String {
        match self {
            Dialect::Postgres => format!("CAST({} AS TEXT)", expr),
            Dialect::Mssql => format!("CAST({} AS NVARCHAR(MAX))", expr),
        }
    }

    /// Prefix placed right after SELECT to cap the row count.
    pub fn top(self, n: u64) -> String {
        match self {
            Dialect::Postgres => String::new(),
            Dialect::Mssql => format!("TOP {} ", n),
        }
    }

    /// Suffix placed after ORDER BY to cap the row count.
    pub fn limit(self, n: u64) -> String {
        match self {
            Dialect::Postgres => format!(" LIMIT {}", n),
            Dialect::Mssql => String::new(),
        }
    }
}
