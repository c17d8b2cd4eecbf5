use tracing::debug;

use super::engine::monthly_revenue;
use super::error::ConfigError;
use super::types::{
    BenchmarkComparison, EcosystemAssumptions, EcosystemReport, FinancialSummary, ScenarioConfig,
    Severity, UserShare, VerificationVolume, Warning, WarningCode,
};

// Shares are compared against thresholds after two independent revenue calculations.
const SHARE_EPSILON: f64 = 1e-9;

/// Ecosystem reality check with the default assumptions.
pub fn run_ecosystem_report(
    config: &ScenarioConfig,
    summary: &FinancialSummary,
) -> Result<EcosystemReport, ConfigError> {
    run_ecosystem_report_with(config, summary, &EcosystemAssumptions::default())
}

pub fn run_ecosystem_report_with(
    config: &ScenarioConfig,
    summary: &FinancialSummary,
    assumptions: &EcosystemAssumptions,
) -> Result<EcosystemReport, ConfigError> {
    config.validate()?;
    assumptions.validate()?;
    Ok(analyze(config, summary, assumptions))
}

/// Places one operator's scenario inside the whole ecosystem. The ecosystem reuses the
/// scenario's licenses-per-node, lease split and uptime, but applies the assumed average
/// distribution rather than the operator's own. Both `config` and `assumptions` are expected
/// to have passed `validate`.
pub fn analyze(
    config: &ScenarioConfig,
    summary: &FinancialSummary,
    assumptions: &EcosystemAssumptions,
) -> EcosystemReport {
    let total_nodes = assumptions.total_nodes;
    let total_licenses = total_nodes as f64 * config.licenses_per_node as f64;

    let theoretical_max_monthly_revenue = total_licenses * config.revenue_per_license;
    let realistic_monthly_revenue = monthly_revenue(
        config,
        total_licenses * assumptions.distribution.self_run * config.uptime_self_run,
        total_licenses * assumptions.distribution.leased * config.uptime_leased,
    );

    let node_capital = total_nodes as f64 * config.node_unit_cost;
    let theoretical_capital_requirement = node_capital + total_licenses * config.phone_unit_cost;
    let realistic_capital_requirement = node_capital
        + total_licenses * assumptions.distribution.self_run * config.phone_unit_cost;

    let user_share = UserShare {
        nodes_pct: percent_of(config.node_count as f64, total_nodes as f64),
        licenses_pct: percent_of(config.total_licenses(), total_licenses),
        revenue_pct: percent_of(summary.final_monthly_revenue, realistic_monthly_revenue),
        investment_pct: percent_of(config.capital_invested(), realistic_capital_requirement),
    };

    let daily_per_license =
        if assumptions.revenue_per_verification > 0.0 && assumptions.days_per_month > 0.0 {
            let daily_revenue = config.revenue_per_license / assumptions.days_per_month;
            daily_revenue / assumptions.revenue_per_verification
        } else {
            0.0
        };
    let verification = VerificationVolume {
        daily_per_license,
        daily_ecosystem: daily_per_license * total_licenses,
    };

    let benchmarks = assumptions
        .benchmarks
        .iter()
        .filter(|b| b.revenue_per_license > 0.0)
        .map(|b| BenchmarkComparison {
            name: b.name.clone(),
            revenue_per_license: b.revenue_per_license,
            ratio: config.revenue_per_license / b.revenue_per_license,
        })
        .collect::<Vec<_>>();

    let mut report = EcosystemReport {
        total_nodes,
        total_licenses,
        theoretical_max_monthly_revenue,
        theoretical_max_annual_revenue: theoretical_max_monthly_revenue * 12.0,
        realistic_monthly_revenue,
        realistic_annual_revenue: realistic_monthly_revenue * 12.0,
        theoretical_capital_requirement,
        realistic_capital_requirement,
        user_share,
        verification,
        benchmarks,
        warnings: Vec::new(),
    };
    report.warnings = evaluate_warnings(config, summary, assumptions, &report);
    report
}

fn percent_of(value: f64, total: f64) -> f64 {
    if total > 0.0 {
        value / total * 100.0
    } else {
        0.0
    }
}

fn evaluate_warnings(
    config: &ScenarioConfig,
    summary: &FinancialSummary,
    assumptions: &EcosystemAssumptions,
    report: &EcosystemReport,
) -> Vec<Warning> {
    let mut warnings = Vec::new();
    let revenue = config.revenue_per_license;

    if revenue > assumptions.revenue_alert_per_license {
        warnings.push(Warning {
            severity: Severity::Alert,
            code: WarningCode::RevenuePerLicenseHigh,
            message: format!(
                "Revenue of {revenue:.2} per license per month exceeds the plausible ceiling of {:.2}",
                assumptions.revenue_alert_per_license
            ),
            value: revenue,
        });
    }

    let daily = report.verification.daily_per_license;
    if daily > assumptions.daily_verification_ceiling {
        warnings.push(Warning {
            severity: Severity::Alert,
            code: WarningCode::VerificationVolumeHigh,
            message: format!(
                "Implied {daily:.0} verifications per license per day exceeds the sustainable {:.0}",
                assumptions.daily_verification_ceiling
            ),
            value: daily,
        });
    }

    let revenue_pct = report.user_share.revenue_pct;
    if revenue_pct + SHARE_EPSILON >= assumptions.market_share_warning_pct {
        warnings.push(Warning {
            severity: Severity::Warning,
            code: WarningCode::MarketConcentration,
            message: format!(
                "Significant market concentration: {revenue_pct:.2}% of realistic ecosystem revenue"
            ),
            value: revenue_pct,
        });
    }

    let capital = report.theoretical_capital_requirement;
    if capital > assumptions.capital_caution_ceiling {
        warnings.push(Warning {
            severity: Severity::Caution,
            code: WarningCode::CapitalRequirementHigh,
            message: format!(
                "Fully equipping the ecosystem would require {capital:.0} in capital"
            ),
            value: capital,
        });
    }

    let top_benchmark = report
        .benchmarks
        .iter()
        .max_by(|a, b| a.ratio.total_cmp(&b.ratio));
    if let Some(top) = top_benchmark {
        if top.ratio > assumptions.benchmark_caution_multiple {
            warnings.push(Warning {
                severity: Severity::Caution,
                code: WarningCode::BenchmarkMultipleHigh,
                message: format!(
                    "Revenue per license is {:.1}x {} ({:.2})",
                    top.ratio, top.name, top.revenue_per_license
                ),
                value: top.ratio,
            });
        }
    }

    match summary.break_even_month {
        Some(month) if month > assumptions.break_even_notice_months => warnings.push(Warning {
            severity: Severity::Info,
            code: WarningCode::LongBreakEven,
            message: format!("Break-even is reached in month {month}, a long-horizon investment"),
            value: month as f64,
        }),
        Some(_) => {}
        None => warnings.push(Warning {
            severity: Severity::Info,
            code: WarningCode::BreakEvenNotReached,
            message: format!(
                "Break-even is not reached within the {}-month horizon",
                summary.horizon_months
            ),
            value: summary.horizon_months as f64,
        }),
    }

    warnings.sort_by(|a, b| b.severity.cmp(&a.severity));
    for warning in &warnings {
        debug!(
            severity = ?warning.severity,
            code = ?warning.code,
            value = warning.value,
            "ecosystem warning"
        );
    }
    warnings
}
