use serde::{Deserialize, Serialize};

use super::error::ConfigError;

const DISTRIBUTION_EPSILON: f64 = 1e-6;
const MAX_RAMP_MONTHS: u32 = 12;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CurveKind {
    Immediate,
    Linear,
    SCurveModerate,
    Aggressive,
    Conservative,
}

/// Ramp-up curve for one license track.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurveSpec {
    pub kind: CurveKind,
    pub duration_months: u32,
}

impl CurveSpec {
    pub fn immediate() -> Self {
        Self {
            kind: CurveKind::Immediate,
            duration_months: 0,
        }
    }

    pub fn new(kind: CurveKind, duration_months: u32) -> Self {
        Self {
            kind,
            duration_months,
        }
    }

    /// Duration in months, zero for immediate curves regardless of the stored value.
    pub fn effective_duration(self) -> u32 {
        match self.kind {
            CurveKind::Immediate => 0,
            _ => self.duration_months,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseDistribution {
    pub self_run: f64,
    pub leased: f64,
    pub inactive: f64,
}

impl LicenseDistribution {
    pub fn sum(self) -> f64 {
        self.self_run + self.leased + self.inactive
    }
}

/// One fleet scenario. Built by the caller, validated before first use.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioConfig {
    pub node_count: u32,
    pub licenses_per_node: u32,
    pub distribution: LicenseDistribution,
    pub revenue_per_license: f64,
    pub lease_split: f64,
    pub uptime_self_run: f64,
    pub uptime_leased: f64,
    pub node_unit_cost: f64,
    pub phone_unit_cost: f64,
    pub sim_monthly_cost: f64,
    pub credit_monthly_cost: f64,
    pub operator_pays_credits: bool,
    pub self_run_curve: CurveSpec,
    pub leased_curve: CurveSpec,
}

impl ScenarioConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.licenses_per_node == 0 {
            return Err(ConfigError::ZeroLicensesPerNode);
        }

        for (field, value) in [
            ("revenue per license", self.revenue_per_license),
            ("node unit cost", self.node_unit_cost),
            ("phone unit cost", self.phone_unit_cost),
            ("SIM monthly cost", self.sim_monthly_cost),
            ("credit monthly cost", self.credit_monthly_cost),
        ] {
            check_non_negative(field, value)?;
        }

        for (field, value) in [
            ("self-run share", self.distribution.self_run),
            ("leased share", self.distribution.leased),
            ("inactive share", self.distribution.inactive),
            ("lease split", self.lease_split),
            ("self-run uptime", self.uptime_self_run),
            ("leased uptime", self.uptime_leased),
        ] {
            check_fraction(field, value)?;
        }

        let sum = self.distribution.sum();
        if (sum - 1.0).abs() > DISTRIBUTION_EPSILON {
            return Err(ConfigError::DistributionSum {
                field: "license",
                sum,
            });
        }

        for (field, curve) in [
            ("self-run", self.self_run_curve),
            ("leased", self.leased_curve),
        ] {
            if curve.kind != CurveKind::Immediate
                && !(1..=MAX_RAMP_MONTHS).contains(&curve.duration_months)
            {
                return Err(ConfigError::CurveDuration {
                    field,
                    months: curve.duration_months,
                });
            }
        }

        Ok(())
    }

    pub fn total_licenses(&self) -> f64 {
        self.node_count as f64 * self.licenses_per_node as f64
    }

    pub fn self_run_licenses(&self) -> f64 {
        self.total_licenses() * self.distribution.self_run
    }

    pub fn leased_licenses(&self) -> f64 {
        self.total_licenses() * self.distribution.leased
    }

    /// Up-front node purchase; the cumulative cash flow opens at its negative.
    pub fn initial_investment(&self) -> f64 {
        self.node_count as f64 * self.node_unit_cost
    }

    /// Node purchase plus a phone for every self-run license.
    pub fn capital_invested(&self) -> f64 {
        self.initial_investment() + self.self_run_licenses() * self.phone_unit_cost
    }
}

fn check_non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NonFiniteValue { field, value });
    }
    if value < 0.0 {
        return Err(ConfigError::NegativeValue { field, value });
    }
    Ok(())
}

fn check_positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NonFiniteValue { field, value });
    }
    if value <= 0.0 {
        return Err(ConfigError::NonPositiveValue { field, value });
    }
    Ok(())
}

fn check_fraction(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NonFiniteValue { field, value });
    }
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::FractionOutOfRange { field, value });
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyProjection {
    pub month: u32,
    pub self_run_activation: f64,
    pub leased_activation: f64,
    pub effective_self_run: f64,
    pub effective_leased: f64,
    pub revenue: f64,
    pub hardware_cost: f64,
    pub sim_cost: f64,
    pub credit_cost: f64,
    pub total_cost: f64,
    pub profit: f64,
    pub cumulative: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "kebab-case")]
pub enum RoiOutcome {
    Value(f64),
    InsufficientHorizon,
    ZeroInvestment,
}

impl RoiOutcome {
    pub fn value(self) -> Option<f64> {
        match self {
            RoiOutcome::Value(v) => Some(v),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSummary {
    pub horizon_months: u32,
    pub initial_investment: f64,
    /// First month whose cumulative cash flow is non-negative; `None` if never within the horizon.
    pub break_even_month: Option<u32>,
    pub roi_12_months: RoiOutcome,
    pub roi_24_months: RoiOutcome,
    pub total_revenue: f64,
    pub total_cost: f64,
    pub total_profit: f64,
    pub final_monthly_revenue: f64,
    pub cumulative_cash_flow: Vec<f64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionRun {
    pub horizon_months: u32,
    pub initial_investment: f64,
    pub series: Vec<MonthlyProjection>,
    pub summary: FinancialSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Benchmark {
    pub name: String,
    pub revenue_per_license: f64,
}

/// Fixed ecosystem constants and warning thresholds used by the reality check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EcosystemAssumptions {
    pub total_nodes: u32,
    pub distribution: LicenseDistribution,
    pub revenue_per_verification: f64,
    pub days_per_month: f64,
    pub revenue_alert_per_license: f64,
    pub daily_verification_ceiling: f64,
    pub market_share_warning_pct: f64,
    pub capital_caution_ceiling: f64,
    pub benchmark_caution_multiple: f64,
    pub break_even_notice_months: u32,
    pub benchmarks: Vec<Benchmark>,
}

impl Default for EcosystemAssumptions {
    fn default() -> Self {
        Self {
            total_nodes: 6_000,
            distribution: LicenseDistribution {
                self_run: 0.25,
                leased: 0.50,
                inactive: 0.25,
            },
            revenue_per_verification: 0.01,
            days_per_month: 30.0,
            revenue_alert_per_license: 100.0,
            daily_verification_ceiling: 500.0,
            market_share_warning_pct: 1.0,
            capital_caution_ceiling: 100_000_000.0,
            benchmark_caution_multiple: 5.0,
            break_even_notice_months: 12,
            benchmarks: vec![
                Benchmark {
                    name: "Helium Mobile".to_string(),
                    revenue_per_license: 30.0,
                },
                Benchmark {
                    name: "Nodle".to_string(),
                    revenue_per_license: 5.0,
                },
                Benchmark {
                    name: "Grass".to_string(),
                    revenue_per_license: 12.0,
                },
            ],
        }
    }
}

impl EcosystemAssumptions {
    /// Rates, ceilings and benchmark revenues are divisors or thresholds and must be positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("ecosystem self-run share", self.distribution.self_run),
            ("ecosystem leased share", self.distribution.leased),
            ("ecosystem inactive share", self.distribution.inactive),
        ] {
            check_fraction(field, value)?;
        }
        let sum = self.distribution.sum();
        if (sum - 1.0).abs() > DISTRIBUTION_EPSILON {
            return Err(ConfigError::DistributionSum {
                field: "ecosystem",
                sum,
            });
        }

        for (field, value) in [
            ("revenue per verification", self.revenue_per_verification),
            ("days per month", self.days_per_month),
            ("revenue alert per license", self.revenue_alert_per_license),
            ("daily verification ceiling", self.daily_verification_ceiling),
            ("market share warning percent", self.market_share_warning_pct),
            ("capital caution ceiling", self.capital_caution_ceiling),
            ("benchmark caution multiple", self.benchmark_caution_multiple),
        ] {
            check_positive(field, value)?;
        }

        for benchmark in &self.benchmarks {
            check_positive("benchmark revenue per license", benchmark.revenue_per_license)?;
        }
        Ok(())
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Caution,
    Warning,
    Alert,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WarningCode {
    RevenuePerLicenseHigh,
    VerificationVolumeHigh,
    MarketConcentration,
    CapitalRequirementHigh,
    BenchmarkMultipleHigh,
    LongBreakEven,
    BreakEvenNotReached,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Warning {
    pub severity: Severity,
    pub code: WarningCode,
    pub message: String,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserShare {
    pub nodes_pct: f64,
    pub licenses_pct: f64,
    pub revenue_pct: f64,
    pub investment_pct: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationVolume {
    pub daily_per_license: f64,
    pub daily_ecosystem: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkComparison {
    pub name: String,
    pub revenue_per_license: f64,
    pub ratio: f64,
}

/// Ecosystem-wide context for one scenario. Theoretical and realistic revenue are kept apart;
/// every share percentage is taken against the realistic basis.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EcosystemReport {
    pub total_nodes: u32,
    pub total_licenses: f64,
    pub theoretical_max_monthly_revenue: f64,
    pub theoretical_max_annual_revenue: f64,
    pub realistic_monthly_revenue: f64,
    pub realistic_annual_revenue: f64,
    pub theoretical_capital_requirement: f64,
    pub realistic_capital_requirement: f64,
    pub user_share: UserShare,
    pub verification: VerificationVolume,
    pub benchmarks: Vec<BenchmarkComparison>,
    pub warnings: Vec<Warning>,
}
