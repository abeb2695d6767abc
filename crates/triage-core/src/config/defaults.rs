// Single source of truth for all default values.

// --- Storage ---
pub const DEFAULT_DB_FILENAME: &str = "triage.db";
pub const DEFAULT_BUSY_TIMEOUT_MS: u32 = 5_000;
pub const DEFAULT_READ_POOL_SIZE: usize = 4;

// --- Mode ---
pub const DEFAULT_STALENESS_HORIZON_DAYS: i64 = 14;

// --- Routing ---
pub const DEFAULT_TIE_EPSILON: f64 = 0.02;
pub const DEFAULT_ROUTING_BACKFILL_DAMPENING: f64 = 0.85;
pub const DEFAULT_UNCERTAIN_CONFIDENCE: f64 = 0.1;
pub const DEFAULT_PROVENANCE_CAP: usize = 32;

// --- Urgency ---
pub const DEFAULT_QUIET_URGENCY_CONFIDENCE: f64 = 0.5;

// --- Excitement ---
pub const DEFAULT_EXCITEMENT_BACKFILL_DAMPENING: f64 = 0.6;
pub const DEFAULT_EXCITEMENT_BASE_SCORE: f64 = 0.1;

// --- Thresholds: backfill leans toward surfacing uncertainty and discarding stale content ---
pub const DEFAULT_BACKFILL_STORE_MIN: f64 = 0.75;
pub const DEFAULT_BACKFILL_SURFACE_MIN: f64 = 0.5;
pub const DEFAULT_BACKFILL_DISCARD_MAX: f64 = 0.2;
pub const DEFAULT_BACKFILL_ROUTING_FLOOR: f64 = 0.3;

// --- Thresholds: live ---
pub const DEFAULT_LIVE_STORE_MIN: f64 = 0.65;
pub const DEFAULT_LIVE_SURFACE_MIN: f64 = 0.7;
pub const DEFAULT_LIVE_DISCARD_MAX: f64 = 0.05;
pub const DEFAULT_LIVE_ROUTING_FLOOR: f64 = 0.3;

// --- Calibration ---
pub const DEFAULT_CALIBRATION_ALPHA: f64 = 0.1;
pub const DEFAULT_CALIBRATION_MAX_WINDOW: usize = 1_000;

// --- Pipeline ---
pub const DEFAULT_ASSESSOR_TIMEOUT_MS: u64 = 3_000;
pub const DEFAULT_MAX_CONCURRENT_ITEMS: usize = 8;
pub const DEFAULT_BATCH_LIMIT: usize = 50;
pub const DEFAULT_EXECUTOR_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_EXECUTOR_BACKOFF_MS: u64 = 200;
pub const DEFAULT_RULES_PATH: &str = "rules.toml";

// --- Observability ---
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_JSON_LOGS: bool = true;
