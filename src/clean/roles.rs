// src/clean/roles.rs
//
// Well-known column roles on the source table. Each cleaning step declares
// the roles it needs; a role missing from the scraped header set is a
// recorded warning, not a silent no-op, so drift in the source page layout
// shows up in the report and in tests.

use serde::Serialize;

/// Columns the pipeline knows how to treat specially.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColumnRole {
    /// Entity name ("Name").
    Name,
    /// Administrative status ("Status").
    Status,
    /// Native-script name ("Native").
    Native,
    /// Any year-stamped population figure (name contains "Population").
    Population,
}

/// Role lookup resolved against the original (pre-rename) column names.
#[derive(Debug, Default, Clone)]
pub struct RoleMap {
    pub name: Option<usize>,
    pub status: Option<usize>,
    pub native: Option<usize>,
    pub population: Vec<usize>,
}

impl RoleMap {
    pub fn detect(headers: &[String]) -> Self {
        let find = |wanted: &str| headers.iter().position(|h| h == wanted);
        RoleMap {
            name: find("Name"),
            status: find("Status"),
            native: find("Native"),
            population: headers
                .iter()
                .enumerate()
                .filter(|(_, h)| h.contains("Population"))
                .map(|(i, _)| i)
                .collect(),
        }
    }

    /// Roles the source table failed to provide, in a fixed order.
    pub fn missing(&self) -> Vec<ColumnRole> {
        let mut out = Vec::new();
        if self.name.is_none() {
            out.push(ColumnRole::Name);
        }
        if self.status.is_none() {
            out.push(ColumnRole::Status);
        }
        if self.native.is_none() {
            out.push(ColumnRole::Native);
        }
        if self.population.is_empty() {
            out.push(ColumnRole::Population);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn detects_all_roles() {
        let map = RoleMap::detect(&headers(&[
            "Name",
            "Native",
            "Status",
            "Population 1996",
            "Population 2023",
        ]));
        assert_eq!(map.name, Some(0));
        assert_eq!(map.native, Some(1));
        assert_eq!(map.status, Some(2));
        assert_eq!(map.population, vec![3, 4]);
        assert!(map.missing().is_empty());
    }

    #[test]
    fn records_absent_roles() {
        let map = RoleMap::detect(&headers(&["Column_1", "Column_2"]));
        assert_eq!(
            map.missing(),
            vec![
                ColumnRole::Name,
                ColumnRole::Status,
                ColumnRole::Native,
                ColumnRole::Population
            ]
        );
    }

    #[test]
    fn population_match_is_case_sensitive() {
        let map = RoleMap::detect(&headers(&["name", "population 2023"]));
        assert!(map.population.is_empty());
        assert_eq!(map.name, None);
    }
}
