mod curve;
mod ecosystem;
mod engine;
mod error;
mod types;

pub use curve::activation_fraction;
pub use ecosystem::{analyze, run_ecosystem_report, run_ecosystem_report_with};
pub use engine::{MAX_HORIZON_MONTHS, run_projection, simulate, summarize, validate_horizon};
pub use error::ConfigError;
pub use types::{
    Benchmark, BenchmarkComparison, CurveKind, CurveSpec, EcosystemAssumptions, EcosystemReport,
    FinancialSummary, LicenseDistribution, MonthlyProjection, ProjectionRun, RoiOutcome,
    ScenarioConfig, Severity, UserShare, VerificationVolume, Warning, WarningCode,
};
