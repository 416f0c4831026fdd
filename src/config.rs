// src/config.rs
//
// All configuration is literal constants; nothing here is environment-driven.

use std::time::Duration;

/// Source page carrying the admin-area population table.
pub static SOURCE_URL: &str = "https://www.citypopulation.de/en/egypt/admin/";

/// Pre-cleaned wide CSV published alongside the dashboard. Preferred over a
/// live scrape when reachable.
pub static CLEANED_CSV_URL: &str =
    "https://raw.githubusercontent.com/Mahmoud-Ezat/Fstreamlit/master/Desktop/Streamlit/cleaned_egypt_population_wide.csv";

/// `id` attribute of the data table on the source page.
pub static TABLE_ID: &str = "tl";

/// Per-request timeout for all HTTP fetches.
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(15);

/// How long a loaded dataset stays fresh before a reload is allowed.
pub const CACHE_TTL: Duration = Duration::from_secs(3600);

/// Label of the country-total row in the name column, matched
/// case-insensitively.
pub static TOTAL_ROW_LABEL: &str = "Miṣr";

/// Land area of Egypt in km², used for density figures.
pub const EGYPT_AREA_KM2: f64 = 1_002_450.0;

/// Fill value for categorical columns whose mode cannot be computed.
pub static MODE_FALLBACK_LABEL: &str = "Unknown";
