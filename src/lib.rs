// Night Audit Engine - Core Library
// Exposes all modules for use in the CLI and tests

pub mod error;
pub mod table;
pub mod timestamp;
pub mod occupancy;
pub mod layout;      // Column Normalizer
pub mod ingest;      // normalize → dates → occupancy
pub mod aggregate;   // Nightly summary
pub mod insights;
pub mod confidence;
pub mod pricing;     // Rate Suggestion Engine
pub mod forecast;    // Trend Forecaster
pub mod optimizer;
pub mod config;
pub mod db;

// Re-export commonly used types
pub use error::{AuditError, AuditResult, SchemaError};
pub use table::RawAuditTable;
pub use timestamp::{parse_date_lenient, resolve_date_column, ResolvedColumn, TimestampUnit};
pub use occupancy::{infer_occupancy, is_occupied_on, locate_stay_columns, StayColumns};
pub use layout::{
    LayoutNormalizer, LayoutKind, AuditLayout, CustomMapping, DateDisplayFormat, NormalizedTable,
    normalize, get_normalizer, detect_layout, apply_header_aliases, readiness,
    StandardNormalizer, MarriottNormalizer, HiltonNormalizer, CustomNormalizer,
};
pub use ingest::{ingest, AuditIngest, CanonicalRoomRecord, IngestContext, IssueKind, ParseIssue};
pub use aggregate::{summarize, AuditSummary, RoomTypeBreakdown};
pub use insights::{AdrBand, AdrInsight, OccupancyBand, room_type_distribution};
pub use confidence::{score_confidence, ConfidenceBand, ConfidenceScore, ConfidenceSignals};
pub use pricing::{
    Adjustment, AdjustmentKind, DayType, PricingRules, RateEngine, RateSuggestionInput,
    RateSuggestionResult, RoomInventory, RoomTiers, apply_adjustments,
};
pub use forecast::{forecast, ForecastPoint, ForecastReport, RateForecast, RateHistoryEntry, Trend};
pub use optimizer::{project_annual_revenue, summarize_history, OptimizerSummary, Recommendation};
pub use config::Config;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
