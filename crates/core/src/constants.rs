//! Constants used throughout the MediMap core crate.

/// Mean Earth radius in kilometres used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Decimal places kept on reported distances.
pub const DISTANCE_DECIMALS: i32 = 2;

/// Number of hospitals returned by a search when the caller does not ask for a count.
pub const DEFAULT_TOP_N: usize = 5;

/// Upper bound on `top_n` accepted from configuration or a request.
pub const MAX_TOP_N: usize = 500;

/// Search radius for recommendations when the caller does not give one.
pub const DEFAULT_RECOMMEND_RADIUS_KM: f64 = 50.0;

/// Minutes of travel per kilometre (average urban speed of 30 km/h).
pub const TRAVEL_MINUTES_PER_KM: f64 = 2.0;

/// Deepest decision tree accepted at load time, counted in questions.
pub const MAX_TREE_DEPTH: usize = 16;

/// Longest answer label accepted in a scenario definition.
pub const MAX_LABEL_LEN: usize = 120;

/// File extensions accepted by the hospital importer.
pub const ALLOWED_UPLOAD_EXTENSIONS: &[&str] = &["csv", "json"];

/// Maximum size of an uploaded hospital data file (16 MiB).
pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Default directory where uploaded hospital files are kept.
pub const DEFAULT_UPLOAD_DIR: &str = "uploads";

/// Prefix of generated hospital identifiers (`hospital_1`, `hospital_2`, ...).
pub const GENERATED_ID_PREFIX: &str = "hospital_";

/// Built-in scenario forest, compiled into the binary.
pub const BUILTIN_SCENARIOS_YAML: &str = include_str!("triage/scenarios.yaml");
