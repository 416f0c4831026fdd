// src/dataset/mod.rs

use crate::error::ScrapeError;

/// One typed column. Numeric columns stay nullable: an all-missing source
/// column has no mean to fill with and keeps its gaps.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Numbers(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Numbers(v) => v.len(),
            Column::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A cleaned table: uniquely named columns in insertion order, all the same
/// length. Constructed once per load cycle and shared read-only; downstream
/// views derive copies rather than mutating it.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    names: Vec<String>,
    columns: Vec<Column>,
}

impl Dataset {
    pub fn new(names: Vec<String>, columns: Vec<Column>) -> Result<Self, ScrapeError> {
        if names.len() != columns.len() {
            return Err(ScrapeError::parse(format!(
                "{} column names for {} columns",
                names.len(),
                columns.len()
            )));
        }
        if let Some(first) = columns.first() {
            let n = first.len();
            if columns.iter().any(|c| c.len() != n) {
                return Err(ScrapeError::parse("columns have unequal lengths"));
            }
        }
        for (i, name) in names.iter().enumerate() {
            if names[..i].contains(name) {
                return Err(ScrapeError::parse(format!("duplicate column name {:?}", name)));
            }
        }
        Ok(Dataset { names, columns })
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        let idx = self.names.iter().position(|n| n == name)?;
        Some(&self.columns[idx])
    }

    /// The column as numbers, or None if absent or text-typed.
    pub fn numbers(&self, name: &str) -> Option<&[Option<f64>]> {
        match self.column(name)? {
            Column::Numbers(v) => Some(v),
            Column::Text(_) => None,
        }
    }

    /// The column as text, or None if absent or numeric.
    pub fn text(&self, name: &str) -> Option<&[Option<String>]> {
        match self.column(name)? {
            Column::Text(v) => Some(v),
            Column::Numbers(_) => None,
        }
    }

    /// Names of numeric columns of the form `population_<year>`, with the
    /// parsed year, in column order.
    pub fn population_columns(&self) -> Vec<(String, u16)> {
        self.names
            .iter()
            .filter_map(|n| {
                let year = n.strip_prefix("population_")?.parse::<u16>().ok()?;
                matches!(self.column(n), Some(Column::Numbers(_))).then(|| (n.clone(), year))
            })
            .collect()
    }

    /// Derived copy with the rows at `keep` (in order), all columns.
    pub fn take_rows(&self, keep: &[usize]) -> Dataset {
        let columns = self
            .columns
            .iter()
            .map(|c| match c {
                Column::Numbers(v) => Column::Numbers(keep.iter().map(|&i| v[i]).collect()),
                Column::Text(v) => Column::Text(keep.iter().map(|&i| v[i].clone()).collect()),
            })
            .collect();
        Dataset {
            names: self.names.clone(),
            columns,
        }
    }

    /// Derived copy with one extra column appended. Fails on name collision
    /// or length mismatch.
    pub fn with_column(&self, name: &str, column: Column) -> Result<Dataset, ScrapeError> {
        let mut names = self.names.clone();
        names.push(name.to_string());
        let mut columns = self.columns.clone();
        columns.push(column);
        Dataset::new(names, columns)
    }
}
