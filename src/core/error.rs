use thiserror::Error;

/// Rejections raised while validating a scenario before any simulation runs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} must be >= 0, got {value}")]
    NegativeValue { field: &'static str, value: f64 },
    #[error("{field} must be a finite number, got {value}")]
    NonFiniteValue { field: &'static str, value: f64 },
    #[error("{field} must be > 0, got {value}")]
    NonPositiveValue { field: &'static str, value: f64 },
    #[error("{field} must be between 0 and 1, got {value}")]
    FractionOutOfRange { field: &'static str, value: f64 },
    #[error("{field} distribution must sum to 1.0, got {sum}")]
    DistributionSum { field: &'static str, sum: f64 },
    #[error("{field} ramp-up duration must be between 1 and 12 months, got {months}")]
    CurveDuration { field: &'static str, months: u32 },
    #[error("licenses per node must be >= 1")]
    ZeroLicensesPerNode,
    #[error("horizon must be at least one month")]
    ZeroHorizon,
    #[error("horizon must be at most {max} months, got {months}")]
    HorizonTooLong { months: u32, max: u32 },
}
