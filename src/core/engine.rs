use tracing::debug;

use super::curve::activation_fraction;
use super::error::ConfigError;
use super::types::{FinancialSummary, MonthlyProjection, ProjectionRun, RoiOutcome, ScenarioConfig};

/// Longest projection accepted; ten years of monthly rows.
pub const MAX_HORIZON_MONTHS: u32 = 120;

pub fn validate_horizon(horizon_months: u32) -> Result<(), ConfigError> {
    if horizon_months == 0 {
        return Err(ConfigError::ZeroHorizon);
    }
    if horizon_months > MAX_HORIZON_MONTHS {
        return Err(ConfigError::HorizonTooLong {
            months: horizon_months,
            max: MAX_HORIZON_MONTHS,
        });
    }
    Ok(())
}

/// Validates `config`, simulates `horizon_months` months and summarizes the series.
pub fn run_projection(
    config: &ScenarioConfig,
    horizon_months: u32,
) -> Result<ProjectionRun, ConfigError> {
    config.validate()?;
    validate_horizon(horizon_months)?;

    let initial_investment = config.initial_investment();
    let series = simulate(config, horizon_months);
    let summary = summarize(&series, initial_investment);
    Ok(ProjectionRun {
        horizon_months,
        initial_investment,
        series,
        summary,
    })
}

/// Month-by-month cash flow for an already validated scenario.
pub fn simulate(config: &ScenarioConfig, horizon_months: u32) -> Vec<MonthlyProjection> {
    debug!(
        nodes = config.node_count,
        licenses_per_node = config.licenses_per_node,
        horizon_months,
        "simulating scenario"
    );

    let self_run_licenses = config.self_run_licenses();
    let leased_licenses = config.leased_licenses();

    let mut series = Vec::with_capacity(horizon_months as usize);
    let mut cumulative = -config.initial_investment();
    let mut prev_self_run_frac = 0.0;

    for month in 0..horizon_months {
        let self_run_frac = activation_fraction(config.self_run_curve, month);
        let leased_frac = activation_fraction(config.leased_curve, month);

        let effective_self_run = self_run_licenses * self_run_frac * config.uptime_self_run;
        let effective_leased = leased_licenses * leased_frac * config.uptime_leased;
        let revenue = monthly_revenue(config, effective_self_run, effective_leased);

        // Phones are bought as self-run licenses come online, so the charges telescope
        // to exactly one phone per license once the ramp completes.
        let newly_active = (self_run_frac - prev_self_run_frac).max(0.0);
        let hardware_cost = config.phone_unit_cost * self_run_licenses * newly_active;
        let sim_cost = config.sim_monthly_cost * effective_self_run;
        let credit_cost = if config.operator_pays_credits {
            config.credit_monthly_cost * (effective_self_run + effective_leased)
        } else {
            0.0
        };

        let total_cost = hardware_cost + sim_cost + credit_cost;
        let profit = revenue - total_cost;
        cumulative += profit;

        series.push(MonthlyProjection {
            month,
            self_run_activation: self_run_frac,
            leased_activation: leased_frac,
            effective_self_run,
            effective_leased,
            revenue,
            hardware_cost,
            sim_cost,
            credit_cost,
            total_cost,
            profit,
            cumulative,
        });
        prev_self_run_frac = self_run_frac;
    }

    series
}

/// Operator revenue for the given uptime-adjusted license counts. Leased licenses only
/// return the operator's split.
pub(crate) fn monthly_revenue(
    config: &ScenarioConfig,
    effective_self_run: f64,
    effective_leased: f64,
) -> f64 {
    effective_self_run * config.revenue_per_license
        + effective_leased * config.revenue_per_license * config.lease_split
}

/// Reduces an existing series; never re-simulates.
pub fn summarize(series: &[MonthlyProjection], initial_investment: f64) -> FinancialSummary {
    let break_even_month = series
        .iter()
        .find(|row| row.cumulative >= 0.0)
        .map(|row| row.month);

    let summary = FinancialSummary {
        horizon_months: series.len() as u32,
        initial_investment,
        break_even_month,
        roi_12_months: roi_at(series, 12, initial_investment),
        roi_24_months: roi_at(series, 24, initial_investment),
        total_revenue: series.iter().map(|row| row.revenue).sum(),
        total_cost: series.iter().map(|row| row.total_cost).sum(),
        total_profit: series.iter().map(|row| row.profit).sum(),
        final_monthly_revenue: series.last().map(|row| row.revenue).unwrap_or(0.0),
        cumulative_cash_flow: series.iter().map(|row| row.cumulative).collect(),
    };

    debug!(
        break_even_month = ?summary.break_even_month,
        roi_12 = ?summary.roi_12_months,
        roi_24 = ?summary.roi_24_months,
        "summarized projection"
    );
    summary
}

fn roi_at(series: &[MonthlyProjection], months: usize, initial_investment: f64) -> RoiOutcome {
    let Some(row) = series.get(months - 1) else {
        return RoiOutcome::InsufficientHorizon;
    };
    if initial_investment <= 0.0 {
        return RoiOutcome::ZeroInvestment;
    }
    RoiOutcome::Value(row.cumulative / initial_investment)
}
