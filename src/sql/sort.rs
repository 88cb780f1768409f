//! ORDER BY construction. Every ordering is built together with its exact inverse,
//! which the paged list query needs to take the last rows of a prefix.

use super::Dialect;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn reversed(self) -> Self {
        match self {
            Direction::Asc => Direction::Desc,
            Direction::Desc => Direction::Asc,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortTerm {
    pub column: String,
    pub direction: Direction,
}

impl SortTerm {
    pub fn reversed(&self) -> Self {
        SortTerm {
            column: self.column.clone(),
            direction: self.direction.reversed(),
        }
    }
}

/// Parallel orderings: `reverse[i]` is `positive[i]` with the direction flipped.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SortSpec {
    pub positive: Vec<SortTerm>,
    pub reverse: Vec<SortTerm>,
}

impl SortSpec {
    /// Parse `"name -age"`: space separated field names, `-` prefix for descending.
    /// A column named again is ignored; its first direction wins.
    pub fn parse(sort: Option<&str>) -> Self {
        let mut spec = SortSpec::default();
        let Some(sort) = sort else { return spec };
        for item in sort.split(' ') {
            let (column, direction) = match item.strip_prefix('-') {
                Some(rest) => (rest, Direction::Desc),
                None => (item, Direction::Asc),
            };
            if column.is_empty() || spec.columns().any(|c| c == column) {
                continue;
            }
            spec.push(SortTerm {
                column: column.to_string(),
                direction,
            });
        }
        spec
    }

    pub fn is_empty(&self) -> bool {
        self.positive.is_empty()
    }

    pub fn push(&mut self, term: SortTerm) {
        self.reverse.push(term.reversed());
        self.positive.push(term);
    }

    /// Appends `key` ascending unless the ordering already mentions it.
    pub fn with_tiebreaker(mut self, key: &str) -> Self {
        if !self.positive.iter().any(|t| t.column == key) {
            self.push(SortTerm {
                column: key.to_string(),
                direction: Direction::Asc,
            });
        }
        self
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.positive.iter().map(|t| t.column.as_str())
    }
}

/// Comma-joined ORDER BY fragments qualified by `qualifier`; ascending terms carry no keyword.
pub fn render_order(dialect: Dialect, qualifier: &str, terms: &[SortTerm]) -> String {
    terms
        .iter()
        .map(|t| {
            let col = dialect.qualified(qualifier, &t.column);
            match t.direction {
                Direction::Asc => col,
                Direction::Desc => format!("{} DESC", col),
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}
