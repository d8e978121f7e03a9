pub mod fetch {
    use std::time::Duration;

    /// Total attempts per movie: the initial call plus one retry.
    pub const MAX_ATTEMPTS: u32 = 2;

    /// Fixed delay between the first failure and the retry.
    pub const RETRY_DELAY: Duration = Duration::from_secs(5);

    pub const DEFAULT_WORKERS: usize = 10;
}

pub mod cleaning {
    /// Joined-string separator for flattened list columns.
    pub const SEPARATOR: &str = "|";

    /// Only rows with this exact release status survive cleaning.
    pub const RELEASED: &str = "Released";

    /// Rows with fewer populated cells than this are dropped as too sparse.
    /// Carried over verbatim from the upstream pipeline; tune with care.
    pub const MIN_POPULATED_CELLS: usize = 10;

    /// Columns removed before any flattening happens.
    pub const IRRELEVANT_COLUMNS: &[&str] =
        &["adult", "imdb_id", "original_title", "video", "homepage"];

    /// List-of-mappings columns flattened to joined name strings.
    pub const LIST_COLUMNS: &[&str] = &[
        "genres",
        "production_countries",
        "production_companies",
        "spoken_languages",
    ];

    /// Columns coerced to numeric cells during type conversion.
    pub const NUMERIC_COLUMNS: &[&str] = &[
        "budget",
        "id",
        "popularity",
        "revenue",
        "vote_count",
        "vote_average",
        "runtime",
    ];

    /// Columns where a raw zero means "missing"; normalized to null before
    /// any derived metric is computed.
    pub const ZERO_AS_MISSING: &[&str] = &["budget", "revenue", "runtime"];

    /// Free-text columns where the upstream placeholder means "missing".
    pub const PLACEHOLDER_TEXT_COLUMNS: &[&str] = &["overview", "tagline"];

    pub const MISSING_TEXT_PLACEHOLDER: &str = "No Data";
}

pub mod schema {
    /// Final cleaned schema, exact column order.
    pub const TARGET_COLUMNS: &[&str] = &[
        "id",
        "title",
        "tagline",
        "release_date",
        "genres",
        "belongs_to_collection",
        "original_language",
        "budget_musd",
        "revenue_musd",
        "production_companies",
        "production_countries",
        "vote_count",
        "vote_average",
        "popularity",
        "runtime",
        "overview",
        "spoken_languages",
        "poster_path",
        "cast",
        "cast_size",
        "director",
        "crew_size",
        "profit_musd",
        "roi",
        "collection_name",
    ];
}
