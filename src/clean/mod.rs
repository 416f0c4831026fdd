// src/clean/mod.rs
//
// Dataset Normalizer: RawTable in, typed Dataset + CleanReport out. The step
// order matters; population columns are identified against the original
// header names before anything is renamed.

pub mod csv;
pub mod roles;
pub mod text;

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::MODE_FALLBACK_LABEL;
use crate::dataset::{Column, Dataset};
use crate::error::ScrapeError;
use crate::extract::{placeholder_headers, RawTable};
use roles::{ColumnRole, RoleMap};
use text::{clean_numeric_cell, clean_text_cell, extract_year, slug_column_name, strip_bracket_note};

/// Companion metadata for one normalization run. Returned alongside the
/// dataset rather than attached to it; purely for transparency.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CleanReport {
    /// Original column name → mean used to fill its gaps.
    pub numeric_fills: BTreeMap<String, f64>,
    /// Categorical column name → value (mode or fallback) used to fill.
    pub categorical_fills: BTreeMap<String, String>,
    /// Canonical `population_<year>` name → original column name.
    pub rename_audit: BTreeMap<String, String>,
    /// Exact-duplicate rows dropped.
    pub duplicates_removed: usize,
    /// Well-known roles the source table did not provide.
    pub missing_roles: Vec<ColumnRole>,
}

/// Clean and type a raw table. Pure: the same input always yields the same
/// output, with no state carried between runs.
#[tracing::instrument(level = "debug", skip(raw), fields(rows = raw.rows.len()))]
pub fn normalize(raw: &RawTable) -> Result<(Dataset, CleanReport), ScrapeError> {
    if raw.rows.is_empty() {
        return Err(ScrapeError::Empty);
    }
    let mut report = CleanReport::default();

    // 1) Materialize into rectangular columns; short rows pad with missing.
    let width = raw.rows.iter().map(Vec::len).max().unwrap_or(0);
    if width == 0 {
        return Err(ScrapeError::Empty);
    }
    let names: Vec<String> = if raw.headers.len() == width {
        raw.headers.clone()
    } else {
        warn!(
            headers = raw.headers.len(),
            width, "header count disagrees with realized width; using generated names"
        );
        placeholder_headers(width)
    };
    let mut columns: Vec<Column> = (0..width)
        .map(|j| {
            Column::Text(
                raw.rows
                    .iter()
                    .map(|row| row.get(j).map(|c| c.trim().to_string()))
                    .collect(),
            )
        })
        .collect();

    // 2) Resolve roles against the original names, before any renaming.
    let role_map = RoleMap::detect(&names);
    report.missing_roles = role_map.missing();
    for role in &report.missing_roles {
        warn!(?role, "source table is missing a well-known column role");
    }

    // 3) Numeric coercion of every population column.
    for &idx in &role_map.population {
        if let Column::Text(cells) = &columns[idx] {
            let nums: Vec<Option<f64>> = cells
                .iter()
                .map(|c| c.as_deref().and_then(clean_numeric_cell))
                .collect();
            columns[idx] = Column::Numbers(nums);
        }
    }

    // 4) Drop bracketed annotations from the entity-name column.
    if let Some(idx) = role_map.name {
        if let Column::Text(cells) = &mut columns[idx] {
            for cell in cells.iter_mut() {
                if let Some(s) = cell {
                    *s = strip_bracket_note(s);
                }
            }
        }
    }

    // 5) Exact-duplicate removal across all columns.
    let keep = dedup_rows(&columns);
    report.duplicates_removed = raw.rows.len() - keep.len();
    if report.duplicates_removed > 0 {
        debug!(dropped = report.duplicates_removed, "removed duplicate rows");
        for col in columns.iter_mut() {
            *col = match col {
                Column::Numbers(v) => Column::Numbers(keep.iter().map(|&i| v[i]).collect()),
                Column::Text(v) => Column::Text(keep.iter().map(|&i| v[i].clone()).collect()),
            };
        }
    }

    // 6) Categorical sanitization of status and native-name columns.
    for idx in [role_map.status, role_map.native].into_iter().flatten() {
        if let Column::Text(cells) = &mut columns[idx] {
            for cell in cells.iter_mut() {
                *cell = cell.as_deref().and_then(clean_text_cell);
            }
        }
    }

    // 7a) Mean imputation of numeric columns. All-missing columns have no
    // mean and keep their gaps.
    for (idx, name) in names.iter().enumerate() {
        if let Column::Numbers(cells) = &mut columns[idx] {
            let present: Vec<f64> = cells.iter().flatten().copied().collect();
            if present.is_empty() {
                warn!(column = %name, "numeric column entirely missing; leaving unfilled");
                continue;
            }
            // The mean is recorded whenever it is defined, gap or no gap,
            // so the report always shows the fill value a gap would get.
            let mean = present.iter().sum::<f64>() / present.len() as f64;
            for cell in cells.iter_mut() {
                cell.get_or_insert(mean);
            }
            report.numeric_fills.insert(name.clone(), mean);
        }
    }

    // 7b) Mode imputation of the categorical columns.
    for idx in [role_map.status, role_map.native].into_iter().flatten() {
        if let Column::Text(cells) = &mut columns[idx] {
            if cells.iter().all(Option::is_some) {
                continue;
            }
            let fill = match mode(cells) {
                Some(m) => m,
                None => {
                    warn!(
                        column = %names[idx],
                        fallback = MODE_FALLBACK_LABEL,
                        "no mode computable; filling with fallback label"
                    );
                    MODE_FALLBACK_LABEL.to_string()
                }
            };
            for cell in cells.iter_mut() {
                cell.get_or_insert_with(|| fill.clone());
            }
            report.categorical_fills.insert(names[idx].clone(), fill);
        }
    }

    // 8) Canonical renaming, population columns first-class.
    let new_names = rename_columns(&names, &role_map, &mut report.rename_audit);

    let dataset = Dataset::new(new_names, columns)?;
    if dataset.is_empty() {
        return Err(ScrapeError::Empty);
    }
    Ok((dataset, report))
}

/// Indices of the first occurrence of each distinct row, in order.
fn dedup_rows(columns: &[Column]) -> Vec<usize> {
    let nrows = columns.first().map_or(0, Column::len);
    let mut seen: HashSet<Vec<u8>> = HashSet::with_capacity(nrows);
    let mut keep = Vec::with_capacity(nrows);
    for i in 0..nrows {
        let mut key: Vec<u8> = Vec::new();
        for col in columns {
            match col {
                // f64 keyed by bit pattern; cells here come from parsing, so
                // equal values share a representation.
                Column::Numbers(v) => match v[i] {
                    Some(x) => {
                        key.push(1);
                        key.extend_from_slice(&x.to_bits().to_le_bytes());
                    }
                    None => key.push(0),
                },
                Column::Text(v) => match &v[i] {
                    Some(s) => {
                        key.push(3);
                        key.extend_from_slice(s.as_bytes());
                        key.push(0xff);
                    }
                    None => key.push(2),
                },
            }
        }
        if seen.insert(key) {
            keep.push(i);
        }
    }
    keep
}

/// Most frequent present value; ties break toward the lexicographically
/// smallest so repeated runs agree. None when every cell is missing.
fn mode(cells: &[Option<String>]) -> Option<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for cell in cells.iter().flatten() {
        *counts.entry(cell.as_str()).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .max_by(|(a_val, a_n), (b_val, b_n)| a_n.cmp(b_n).then(b_val.cmp(a_val)))
        .map(|(val, _)| val.to_string())
}

/// Population columns with a year become `population_<year>`; everything
/// else gets its slug, suffixed on collision.
fn rename_columns(
    names: &[String],
    role_map: &RoleMap,
    rename_audit: &mut BTreeMap<String, String>,
) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(names.len());
    for (i, original) in names.iter().enumerate() {
        let is_population = role_map.population.contains(&i);
        let base = match (extract_year(original), is_population) {
            (Some(year), true) => format!("population_{}", year),
            _ => slug_column_name(original),
        };
        let mut candidate = base.clone();
        let mut counter = 1;
        while out.contains(&candidate) {
            candidate = format!("{}_{}", base, counter);
            counter += 1;
        }
        if is_population && extract_year(original).is_some() {
            rename_audit.insert(candidate.clone(), original.clone());
        }
        out.push(candidate);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable {
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn empty_table_is_empty_error() {
        let err = normalize(&raw(&["Name"], &[])).unwrap_err();
        assert!(matches!(err, ScrapeError::Empty));
    }

    #[test]
    fn population_columns_are_coerced_and_renamed() {
        let (ds, report) = normalize(&raw(
            &["Name", "Population 1996", "Population 2023-07-01"],
            &[
                &["Cairo", "1,000", "2,000"],
                &["Giza", "5,000", "…"],
            ],
        ))
        .unwrap();
        assert_eq!(
            ds.names(),
            &["name", "population_1996", "population_2023"]
        );
        assert_eq!(ds.numbers("population_1996").unwrap(), &[Some(1000.0), Some(5000.0)]);
        // "…" is missing and gets the column mean (2000).
        assert_eq!(ds.numbers("population_2023").unwrap(), &[Some(2000.0), Some(2000.0)]);
        assert_eq!(report.numeric_fills["Population 2023-07-01"], 2000.0);
        assert_eq!(report.rename_audit["population_2023"], "Population 2023-07-01");
        assert_eq!(report.rename_audit["population_1996"], "Population 1996");
    }

    #[test]
    fn mean_fill_uses_prefill_mean() {
        let (ds, report) = normalize(&raw(
            &["Name", "Population 2023"],
            &[&["a", "10"], &["b", "abc"], &["c", "20"]],
        ))
        .unwrap();
        assert_eq!(
            ds.numbers("population_2023").unwrap(),
            &[Some(10.0), Some(15.0), Some(20.0)]
        );
        assert_eq!(report.numeric_fills["Population 2023"], 15.0);
    }

    #[test]
    fn mean_is_recorded_even_without_gaps() {
        let (ds, report) = normalize(&raw(
            &["Name", "Population 2023"],
            &[&["a", "10"], &["b", "20"]],
        ))
        .unwrap();
        assert_eq!(ds.numbers("population_2023").unwrap(), &[Some(10.0), Some(20.0)]);
        assert_eq!(report.numeric_fills["Population 2023"], 15.0);
    }

    #[test]
    fn all_missing_numeric_column_stays_unfilled() {
        let (ds, report) = normalize(&raw(
            &["Name", "Population 2023"],
            &[&["a", "…"], &["b", "…"]],
        ))
        .unwrap();
        assert_eq!(ds.numbers("population_2023").unwrap(), &[None, None]);
        assert!(report.numeric_fills.is_empty());
    }

    #[test]
    fn name_column_loses_bracket_notes() {
        let (ds, _) = normalize(&raw(
            &["Name", "Population 2023"],
            &[&["Al-Qāhirah [Cairo]", "100"]],
        ))
        .unwrap();
        assert_eq!(ds.text("name").unwrap()[0], Some("Al-Qāhirah".to_string()));
    }

    #[test]
    fn exact_duplicates_are_dropped_and_counted() {
        let (ds, report) = normalize(&raw(
            &["Name", "Population 2023"],
            &[&["a", "1"], &["a", "1"], &["b", "2"]],
        ))
        .unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(report.duplicates_removed, 1);
    }

    #[test]
    fn categorical_mode_fill() {
        let (ds, report) = normalize(&raw(
            &["Name", "Status", "Population 2023"],
            &[&["a", "City", "1"], &["b", "City", "2"], &["c", "***", "3"]],
        ))
        .unwrap();
        // "***" sanitizes to missing and is filled with the mode.
        assert_eq!(
            ds.text("status").unwrap(),
            &[
                Some("City".to_string()),
                Some("City".to_string()),
                Some("City".to_string())
            ]
        );
        assert_eq!(report.categorical_fills["Status"], "City");
    }

    #[test]
    fn all_missing_categorical_gets_fallback_label() {
        let (ds, report) = normalize(&raw(
            &["Name", "Status", "Population 2023"],
            &[&["a", "***", "1"], &["b", "!!!", "2"]],
        ))
        .unwrap();
        assert_eq!(
            ds.text("status").unwrap(),
            &[Some("Unknown".to_string()), Some("Unknown".to_string())]
        );
        assert_eq!(report.categorical_fills["Status"], "Unknown");
    }

    #[test]
    fn slug_collisions_get_numeric_suffixes() {
        let (ds, _) = normalize(&raw(
            &["City [note]", "City (note)", "Population 2023"],
            &[&["a", "b", "1"]],
        ))
        .unwrap();
        assert_eq!(ds.names(), &["citynote", "citynote_1", "population_2023"]);
    }

    #[test]
    fn header_width_disagreement_falls_back_to_placeholders() {
        let (ds, _) = normalize(&raw(&["Name"], &[&["a", "b"], &["c", "d"]])).unwrap();
        assert_eq!(ds.names(), &["column_1", "column_2"]);
    }

    #[test]
    fn short_rows_are_padded_with_missing() {
        let (ds, _) = normalize(&raw(
            &["Name", "Status", "Population 2023"],
            &[&["a", "City", "5"], &["b", "City"]],
        ))
        .unwrap();
        // The padded population cell is missing and mean-filled from the rest.
        assert_eq!(ds.numbers("population_2023").unwrap(), &[Some(5.0), Some(5.0)]);
    }

    #[test]
    fn missing_roles_are_reported_not_fatal() {
        let (_, report) = normalize(&raw(&["Foo", "Bar"], &[&["a", "b"]])).unwrap();
        assert_eq!(
            report.missing_roles,
            vec![
                ColumnRole::Name,
                ColumnRole::Status,
                ColumnRole::Native,
                ColumnRole::Population
            ]
        );
    }

    #[test]
    fn normalize_is_idempotent_across_runs() {
        let table = raw(
            &["Name", "Status", "Population 1996", "Population 2023"],
            &[
                &["Cairo", "City", "1,000", "2,000"],
                &["Giza", "City", "…", "4,000"],
                &["Giza", "City", "…", "4,000"],
            ],
        );
        let (a, ra) = normalize(&table).unwrap();
        let (b, rb) = normalize(&table).unwrap();
        assert_eq!(a, b);
        assert_eq!(ra.numeric_fills, rb.numeric_fills);
        assert_eq!(ra.duplicates_removed, rb.duplicates_removed);
    }

    #[test]
    fn end_to_end_cairo_misr_fixture() {
        let (ds, _) = normalize(&raw(
            &["Name", "Population 1996", "Population 2023"],
            &[&["Cairo", "1000", "2000"], &["Miṣr", "5000", "9000"]],
        ))
        .unwrap();
        assert_eq!(ds.names(), &["name", "population_1996", "population_2023"]);
        assert_eq!(ds.numbers("population_1996").unwrap(), &[Some(1000.0), Some(5000.0)]);
        assert_eq!(ds.numbers("population_2023").unwrap(), &[Some(2000.0), Some(9000.0)]);

        // The Miṣr total row is excluded from per-area ranking.
        let rows = crate::analysis::area_rows(&ds);
        assert_eq!(rows, vec![0]);
        let top = crate::analysis::top_n(&ds, &rows, "population_2023", 10).unwrap();
        assert_eq!(top, vec![0]);
    }

    #[test]
    fn full_pipeline_from_html() {
        let html = r#"<html><body><table id="tl">
            <thead><tr><th>Name</th><th>Status</th><th>Population 1996</th><th>Population 2023</th></tr></thead>
            <tbody>
              <tr><td>Al-Qāhirah [Cairo]</td><td>Gov</td><td>6,800,992</td><td>10,100,166</td><td>→</td></tr>
              <tr><td>Al-Jīzah</td><td>Gov</td><td>2,200,000</td><td>4,458,135</td><td>→</td></tr>
              <tr><td>Miṣr</td><td>Rep</td><td>59,312,914</td><td>104,462,545</td><td>→</td></tr>
            </tbody></table></body></html>"#;
        let table = crate::extract::parse_table(html).unwrap();
        let (ds, report) = normalize(&table).unwrap();
        assert_eq!(
            ds.names(),
            &["name", "status", "population_1996", "population_2023"]
        );
        assert!(report.missing_roles.contains(&ColumnRole::Native));
        assert_eq!(ds.text("name").unwrap()[0], Some("Al-Qāhirah".to_string()));

        let rows = crate::analysis::area_rows(&ds);
        assert_eq!(rows, vec![0, 1]);
        let top = crate::analysis::top_n(&ds, &rows, "population_2023", 1).unwrap();
        assert_eq!(top, vec![0]);
    }
}
