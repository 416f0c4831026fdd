use anyhow::Result;
use popscraper::{
    analysis,
    cache::TtlCache,
    config::{CACHE_TTL, EGYPT_AREA_KM2, SOURCE_URL},
    dataset::Dataset,
    fetch, pipeline,
};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

fn name_at(ds: &Dataset, row: usize) -> String {
    ds.text("name")
        .and_then(|col| col.get(row).cloned().flatten())
        .unwrap_or_else(|| format!("row {}", row))
}

fn log_ranking(label: &str, ds: &Dataset, column: &str, rows: &[usize]) {
    let Some(values) = ds.numbers(column) else {
        warn!(label, column, "ranking column unavailable");
        return;
    };
    for (rank, &row) in rows.iter().enumerate() {
        match values[row] {
            Some(v) => info!(label, rank = rank + 1, name = %name_at(ds, row), value = v),
            None => info!(label, rank = rank + 1, name = %name_at(ds, row), value = "N/A"),
        }
    }
}

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();
    info!("startup");

    // ─── 2) load dataset through the TTL cache ───────────────────────
    let client = fetch::client()?;
    let cache = TtlCache::new(CACHE_TTL);
    let outcome = cache.get_or_load(SOURCE_URL, || pipeline::load(&client))?;
    let ds = &outcome.dataset;
    info!(
        rows = ds.len(),
        cols = ds.width(),
        source = ?outcome.source,
        "dataset loaded"
    );
    info!(report = %serde_json::to_string(&outcome.report)?, "clean report");

    // ─── 3) total population & density ───────────────────────────────
    if let Some(total_row) = analysis::find_total_row(ds) {
        for (year, pop) in analysis::total_population(ds, total_row) {
            info!(year, population = pop, "country total");
        }
        for (year, density) in analysis::density_series(ds, total_row, EGYPT_AREA_KM2) {
            info!(year, persons_per_km2 = %format!("{:.0}", density), "density");
        }
    } else {
        warn!("country-total row not found; skipping density figures");
    }

    // ─── 4) rankings over per-area rows ──────────────────────────────
    let rows = analysis::area_rows(ds);
    match analysis::top_n(ds, &rows, "population_2023", 10) {
        Some(top) => log_ranking("top population 2023", ds, "population_2023", &top),
        None => warn!("population_2023 column unavailable; skipping ranking"),
    }

    // ─── 5) growth 1996 → 2023 ───────────────────────────────────────
    match analysis::with_growth_rate(ds, "population_1996", "population_2023") {
        Some(with_growth) => {
            let rows = analysis::area_rows(&with_growth);
            if let Some(top) = analysis::top_n(&with_growth, &rows, analysis::GROWTH_RATE_COL, 10)
            {
                log_ranking("top growth", &with_growth, analysis::GROWTH_RATE_COL, &top);
            }
            if let Some(bottom) =
                analysis::bottom_n(&with_growth, &rows, analysis::GROWTH_RATE_COL, 10)
            {
                log_ranking("bottom growth", &with_growth, analysis::GROWTH_RATE_COL, &bottom);
            }
        }
        None => warn!("growth-rate columns unavailable; skipping growth analysis"),
    }

    Ok(())
}
