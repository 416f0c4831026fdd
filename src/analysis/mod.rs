// src/analysis/mod.rs
//
// Read-only projections over a shared cleaned dataset. Every function copies
// or indexes; none mutates its input. A consumer whose columns are absent
// gets None and degrades, mirroring the layout-drift tolerance upstream.

use std::cmp::Ordering;

use tracing::warn;

use crate::config::TOTAL_ROW_LABEL;
use crate::dataset::{Column, Dataset};

/// Name of the appended growth-rate column.
pub static GROWTH_RATE_COL: &str = "growth_rate";

/// Row index of the country-total row: exact case-insensitive match of the
/// name column against the fixed label. A source table without that row
/// degrades to "no total row".
pub fn find_total_row(ds: &Dataset) -> Option<usize> {
    let names = ds.text("name")?;
    let wanted = TOTAL_ROW_LABEL.to_lowercase();
    names
        .iter()
        .position(|v| v.as_deref().map_or(false, |s| s.to_lowercase() == wanted))
}

/// Row indices for per-area computations: the total row is excluded only
/// when present and the dataset has more than one row.
pub fn area_rows(ds: &Dataset) -> Vec<usize> {
    let found = find_total_row(ds);
    if found.is_none() && !ds.is_empty() {
        warn!("no country-total row identified; analyzing all rows");
    }
    let excluded = match found {
        Some(i) if ds.len() > 1 => Some(i),
        _ => None,
    };
    (0..ds.len()).filter(|i| Some(*i) != excluded).collect()
}

/// `(year, total / area)` for each `population_<year>` column, in column
/// order, taken from the total row.
pub fn density_series(ds: &Dataset, total_row: usize, area_km2: f64) -> Vec<(u16, f64)> {
    total_population(ds, total_row)
        .into_iter()
        .map(|(year, pop)| (year, pop / area_km2))
        .collect()
}

/// `(year, population)` for each `population_<year>` column at `row`.
pub fn total_population(ds: &Dataset, row: usize) -> Vec<(u16, f64)> {
    ds.population_columns()
        .into_iter()
        .filter_map(|(name, year)| {
            let v = ds.numbers(&name)?.get(row).copied().flatten()?;
            Some((year, v))
        })
        .collect()
}

/// Percentage growth between two population columns, row by row. Undefined
/// (None) wherever the base is missing or zero, the later value is missing,
/// or the result is non-finite — never zero, never an error.
pub fn growth_rates(ds: &Dataset, earlier: &str, later: &str) -> Option<Vec<Option<f64>>> {
    let e = ds.numbers(earlier)?;
    let l = ds.numbers(later)?;
    Some(
        e.iter()
            .zip(l)
            .map(|(e, l)| match (e, l) {
                (Some(e), Some(l)) if *e != 0.0 => {
                    let rate = (l - e) / e * 100.0;
                    rate.is_finite().then_some(rate)
                }
                _ => None,
            })
            .collect(),
    )
}

/// Derived copy of the dataset with a `growth_rate` column appended. None if
/// either population column is absent.
pub fn with_growth_rate(ds: &Dataset, earlier: &str, later: &str) -> Option<Dataset> {
    let rates = growth_rates(ds, earlier, later)?;
    ds.with_column(GROWTH_RATE_COL, Column::Numbers(rates)).ok()
}

fn compare(a: Option<f64>, b: Option<f64>, descending: bool) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => {
            let ord = a.partial_cmp(&b).unwrap_or(Ordering::Equal);
            if descending {
                ord.reverse()
            } else {
                ord
            }
        }
        // Undefined values sort last regardless of direction.
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// The first `n` of `rows` ranked by `values`, missing values last. A stable
/// sort, so ties keep their source order.
pub fn rank_rows(values: &[Option<f64>], rows: &[usize], descending: bool, n: usize) -> Vec<usize> {
    let mut ranked: Vec<usize> = rows.to_vec();
    ranked.sort_by(|&a, &b| compare(values[a], values[b], descending));
    ranked.truncate(n);
    ranked
}

/// Top `n` of `rows` by the named numeric column. None if the column is
/// absent or not numeric.
pub fn top_n(ds: &Dataset, rows: &[usize], column: &str, n: usize) -> Option<Vec<usize>> {
    Some(rank_rows(ds.numbers(column)?, rows, true, n))
}

/// Bottom `n` of `rows` by the named numeric column.
pub fn bottom_n(ds: &Dataset, rows: &[usize], column: &str, n: usize) -> Option<Vec<usize>> {
    Some(rank_rows(ds.numbers(column)?, rows, false, n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Column, Dataset};

    fn ds(names: &[&str], cols: Vec<Column>) -> Dataset {
        Dataset::new(names.iter().map(|s| s.to_string()).collect(), cols).unwrap()
    }

    fn sample() -> Dataset {
        ds(
            &["name", "population_1996", "population_2023"],
            vec![
                Column::Text(vec![
                    Some("Cairo".into()),
                    Some("Giza".into()),
                    Some("Miṣr".into()),
                ]),
                Column::Numbers(vec![Some(100.0), Some(0.0), Some(1000.0)]),
                Column::Numbers(vec![Some(150.0), Some(80.0), Some(2000.0)]),
            ],
        )
    }

    #[test]
    fn total_row_found_case_insensitively() {
        assert_eq!(find_total_row(&sample()), Some(2));

        let no_total = ds(
            &["name"],
            vec![Column::Text(vec![Some("Cairo".into()), Some("Giza".into())])],
        );
        assert_eq!(find_total_row(&no_total), None);
    }

    #[test]
    fn area_rows_exclude_total_only_with_multiple_rows() {
        assert_eq!(area_rows(&sample()), vec![0, 1]);

        let only_total = ds(&["name"], vec![Column::Text(vec![Some("miṣr".into())])]);
        assert_eq!(area_rows(&only_total), vec![0]);
    }

    #[test]
    fn growth_rate_definitions() {
        let d = sample();
        let rates = growth_rates(&d, "population_1996", "population_2023").unwrap();
        // 100 → 150 is +50%; a zero base is undefined, not infinite.
        assert_eq!(rates[0], Some(50.0));
        assert_eq!(rates[1], None);
        assert_eq!(rates[2], Some(100.0));
    }

    #[test]
    fn growth_rate_missing_base_is_undefined() {
        let d = ds(
            &["population_1996", "population_2023"],
            vec![
                Column::Numbers(vec![None, Some(100.0)]),
                Column::Numbers(vec![Some(5.0), None]),
            ],
        );
        let rates = growth_rates(&d, "population_1996", "population_2023").unwrap();
        assert_eq!(rates, vec![None, None]);
    }

    #[test]
    fn growth_rate_requires_both_columns() {
        let d = ds(&["name"], vec![Column::Text(vec![Some("x".into())])]);
        assert!(growth_rates(&d, "population_1996", "population_2023").is_none());
    }

    #[test]
    fn ranking_sorts_undefined_last_in_both_directions() {
        let values = vec![Some(3.0), None, Some(9.0), Some(1.0)];
        let rows = vec![0, 1, 2, 3];
        assert_eq!(rank_rows(&values, &rows, true, 4), vec![2, 0, 3, 1]);
        assert_eq!(rank_rows(&values, &rows, false, 4), vec![3, 0, 2, 1]);
        assert_eq!(rank_rows(&values, &rows, true, 2), vec![2, 0]);
    }

    #[test]
    fn top_n_over_area_rows_skips_total() {
        let d = sample();
        let rows = area_rows(&d);
        let top = top_n(&d, &rows, "population_2023", 1).unwrap();
        assert_eq!(top, vec![0]); // Cairo, not the Miṣr total
    }

    #[test]
    fn density_series_divides_by_area() {
        let d = sample();
        let series = density_series(&d, 2, 1000.0);
        assert_eq!(series, vec![(1996, 1.0), (2023, 2.0)]);
    }

    #[test]
    fn growth_column_is_a_derived_copy() {
        let d = sample();
        let with = with_growth_rate(&d, "population_1996", "population_2023").unwrap();
        assert!(with.numbers(GROWTH_RATE_COL).is_some());
        assert!(d.numbers(GROWTH_RATE_COL).is_none());
        assert_eq!(with.len(), d.len());
    }
}
