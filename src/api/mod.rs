use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::core::{
    ConfigError, CurveKind, CurveSpec, EcosystemAssumptions, EcosystemReport, LicenseDistribution,
    MAX_HORIZON_MONTHS, ProjectionRun, ScenarioConfig, run_ecosystem_report_with, run_projection,
    validate_horizon,
};

const DEFAULT_HORIZON_MONTHS: u32 = 24;
const MAX_COMPARE_SCENARIOS: usize = 16;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliCurveKind {
    Immediate,
    Linear,
    SCurve,
    Aggressive,
    Conservative,
}

impl From<CliCurveKind> for CurveKind {
    fn from(value: CliCurveKind) -> Self {
        match value {
            CliCurveKind::Immediate => CurveKind::Immediate,
            CliCurveKind::Linear => CurveKind::Linear,
            CliCurveKind::SCurve => CurveKind::SCurveModerate,
            CliCurveKind::Aggressive => CurveKind::Aggressive,
            CliCurveKind::Conservative => CurveKind::Conservative,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiCurveKind {
    Immediate,
    Linear,
    #[serde(
        alias = "s-curve-moderate",
        alias = "sCurve",
        alias = "s_curve",
        alias = "moderate"
    )]
    SCurve,
    Aggressive,
    Conservative,
}

impl From<ApiCurveKind> for CliCurveKind {
    fn from(value: ApiCurveKind) -> Self {
        match value {
            ApiCurveKind::Immediate => CliCurveKind::Immediate,
            ApiCurveKind::Linear => CliCurveKind::Linear,
            ApiCurveKind::SCurve => CliCurveKind::SCurve,
            ApiCurveKind::Aggressive => CliCurveKind::Aggressive,
            ApiCurveKind::Conservative => CliCurveKind::Conservative,
        }
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectionPayload {
    nodes: Option<u32>,
    licenses_per_node: Option<u32>,
    self_run_pct: Option<f64>,
    leased_pct: Option<f64>,
    inactive_pct: Option<f64>,
    revenue_per_license: Option<f64>,
    lease_split: Option<f64>,
    uptime_self_run: Option<f64>,
    uptime_leased: Option<f64>,
    node_cost: Option<f64>,
    phone_cost: Option<f64>,
    sim_monthly_cost: Option<f64>,
    credit_monthly_cost: Option<f64>,
    operator_pays_credits: Option<bool>,
    self_run_curve: Option<ApiCurveKind>,
    self_run_ramp_months: Option<u32>,
    leased_curve: Option<ApiCurveKind>,
    leased_ramp_months: Option<u32>,
    horizon_months: Option<u32>,

    ecosystem_nodes: Option<u32>,
    revenue_per_verification: Option<f64>,
    revenue_alert: Option<f64>,
    verification_ceiling: Option<f64>,
    market_share_warning: Option<f64>,
    capital_ceiling: Option<f64>,
    benchmark_multiple: Option<f64>,
    break_even_notice_months: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ComparePayload {
    scenarios: Vec<ProjectionPayload>,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "fleetcast",
    about = "License fleet ramp-up projection with an ecosystem reality check"
)]
pub struct Cli {
    #[arg(long, default_value_t = 1, help = "Number of nodes operated")]
    nodes: u32,
    #[arg(long, default_value_t = 200)]
    licenses_per_node: u32,
    #[arg(long, default_value_t = 0.0, help = "Self-run share of licenses in percent")]
    self_run_pct: f64,
    #[arg(long, default_value_t = 75.0, help = "Leased share of licenses in percent")]
    leased_pct: f64,
    #[arg(long, default_value_t = 25.0, help = "Inactive share of licenses in percent")]
    inactive_pct: f64,
    #[arg(long, default_value_t = 208.0, help = "Revenue per active license per month")]
    revenue_per_license: f64,
    #[arg(
        long,
        default_value_t = 40.0,
        help = "Share of leased license revenue paid to the operator in percent"
    )]
    lease_split: f64,
    #[arg(long, default_value_t = 95.0, help = "Self-run license uptime in percent")]
    uptime_self_run: f64,
    #[arg(long, default_value_t = 95.0, help = "Leased license uptime in percent")]
    uptime_leased: f64,
    #[arg(long, default_value_t = 5000.0, help = "One-time cost per node")]
    node_cost: f64,
    #[arg(long, default_value_t = 150.0, help = "Phone cost per self-run license")]
    phone_cost: f64,
    #[arg(long, default_value_t = 10.0, help = "Monthly SIM cost per self-run license")]
    sim_monthly_cost: f64,
    #[arg(long, default_value_t = 0.0, help = "Monthly credit cost per active license")]
    credit_monthly_cost: f64,
    #[arg(long, help = "Operator pays license credits")]
    operator_pays_credits: bool,
    #[arg(long, value_enum, default_value_t = CliCurveKind::Immediate)]
    self_run_curve: CliCurveKind,
    #[arg(long, default_value_t = 6, help = "Self-run ramp-up duration in months (1-12)")]
    self_run_ramp_months: u32,
    #[arg(long, value_enum, default_value_t = CliCurveKind::Immediate)]
    leased_curve: CliCurveKind,
    #[arg(long, default_value_t = 6, help = "Leased ramp-up duration in months (1-12)")]
    leased_ramp_months: u32,
    #[arg(long, default_value_t = DEFAULT_HORIZON_MONTHS, help = "Months to project")]
    horizon_months: u32,

    #[arg(long, help = "Total nodes in the ecosystem")]
    ecosystem_nodes: Option<u32>,
    #[arg(long, help = "Assumed revenue earned per network verification")]
    revenue_per_verification: Option<f64>,
    #[arg(long, help = "Revenue per license per month that triggers an alert")]
    revenue_alert: Option<f64>,
    #[arg(long, help = "Daily verifications per license that trigger an alert")]
    verification_ceiling: Option<f64>,
    #[arg(long, help = "Realistic revenue share in percent that triggers a warning")]
    market_share_warning: Option<f64>,
    #[arg(long, help = "Ecosystem capital requirement that triggers a caution")]
    capital_ceiling: Option<f64>,
    #[arg(long, help = "Multiple of a benchmark network that triggers a caution")]
    benchmark_multiple: Option<f64>,
    #[arg(long, help = "Break-even month after which an info notice is shown")]
    break_even_notice_months: Option<u32>,
}

#[derive(Debug)]
struct ApiRequest {
    config: ScenarioConfig,
    horizon_months: u32,
    assumptions: EcosystemAssumptions,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportResponse {
    #[serde(flatten)]
    projection: ProjectionRun,
    ecosystem: EcosystemReport,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum CompareEntry {
    Report(Box<ReportResponse>),
    Error(ErrorResponse),
}

#[derive(Debug, Serialize)]
struct CompareResponse {
    results: Vec<CompareEntry>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to encode report: {0}")]
    Encode(#[from] serde_json::Error),
}

fn build_request(cli: Cli) -> Result<ApiRequest, ConfigError> {
    let config = ScenarioConfig {
        node_count: cli.nodes,
        licenses_per_node: cli.licenses_per_node,
        distribution: LicenseDistribution {
            self_run: cli.self_run_pct / 100.0,
            leased: cli.leased_pct / 100.0,
            inactive: cli.inactive_pct / 100.0,
        },
        revenue_per_license: cli.revenue_per_license,
        lease_split: cli.lease_split / 100.0,
        uptime_self_run: cli.uptime_self_run / 100.0,
        uptime_leased: cli.uptime_leased / 100.0,
        node_unit_cost: cli.node_cost,
        phone_unit_cost: cli.phone_cost,
        sim_monthly_cost: cli.sim_monthly_cost,
        credit_monthly_cost: cli.credit_monthly_cost,
        operator_pays_credits: cli.operator_pays_credits,
        self_run_curve: CurveSpec::new(cli.self_run_curve.into(), cli.self_run_ramp_months),
        leased_curve: CurveSpec::new(cli.leased_curve.into(), cli.leased_ramp_months),
    };
    config.validate()?;
    validate_horizon(cli.horizon_months)?;

    let mut assumptions = EcosystemAssumptions::default();
    if let Some(v) = cli.ecosystem_nodes {
        assumptions.total_nodes = v;
    }
    if let Some(v) = cli.revenue_per_verification {
        assumptions.revenue_per_verification = v;
    }
    if let Some(v) = cli.revenue_alert {
        assumptions.revenue_alert_per_license = v;
    }
    if let Some(v) = cli.verification_ceiling {
        assumptions.daily_verification_ceiling = v;
    }
    if let Some(v) = cli.market_share_warning {
        assumptions.market_share_warning_pct = v;
    }
    if let Some(v) = cli.capital_ceiling {
        assumptions.capital_caution_ceiling = v;
    }
    if let Some(v) = cli.benchmark_multiple {
        assumptions.benchmark_caution_multiple = v;
    }
    if let Some(v) = cli.break_even_notice_months {
        assumptions.break_even_notice_months = v;
    }
    assumptions.validate()?;

    Ok(ApiRequest {
        config,
        horizon_months: cli.horizon_months,
        assumptions,
    })
}

fn build_report(request: &ApiRequest) -> Result<ReportResponse, ConfigError> {
    let projection = run_projection(&request.config, request.horizon_months)?;
    let ecosystem =
        run_ecosystem_report_with(&request.config, &projection.summary, &request.assumptions)?;
    Ok(ReportResponse {
        projection,
        ecosystem,
    })
}

/// Runs the full pipeline for command-line flags and returns the report as pretty JSON.
pub fn render_cli_report(cli: Cli) -> Result<String, ReportError> {
    let request = build_request(cli)?;
    let report = build_report(&request)?;
    Ok(serde_json::to_string_pretty(&report)?)
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route(
            "/api/projection",
            get(projection_get_handler).post(projection_post_handler),
        )
        .route(
            "/api/report",
            get(report_get_handler).post(report_post_handler),
        )
        .route("/api/compare", post(compare_handler))
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "fleetcast HTTP API listening");

    axum::serve(listener, app).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn projection_get_handler(Query(payload): Query<ProjectionPayload>) -> Response {
    projection_handler_impl(payload).await
}

async fn projection_post_handler(Json(payload): Json<ProjectionPayload>) -> Response {
    projection_handler_impl(payload).await
}

async fn projection_handler_impl(payload: ProjectionPayload) -> Response {
    let request = match api_request_from_payload(payload) {
        Ok(request) => request,
        Err(err) => return rejected(err),
    };
    match run_projection(&request.config, request.horizon_months) {
        Ok(run) => json_response(StatusCode::OK, run),
        Err(err) => rejected(err),
    }
}

async fn report_get_handler(Query(payload): Query<ProjectionPayload>) -> Response {
    report_handler_impl(payload).await
}

async fn report_post_handler(Json(payload): Json<ProjectionPayload>) -> Response {
    report_handler_impl(payload).await
}

async fn report_handler_impl(payload: ProjectionPayload) -> Response {
    match evaluate_payload(payload) {
        Ok(report) => json_response(StatusCode::OK, report),
        Err(err) => rejected(err),
    }
}

async fn compare_handler(Json(payload): Json<ComparePayload>) -> Response {
    if payload.scenarios.len() > MAX_COMPARE_SCENARIOS {
        let msg = format!("at most {MAX_COMPARE_SCENARIOS} scenarios can be compared");
        warn!(count = payload.scenarios.len(), "rejected comparison request");
        return error_response(StatusCode::BAD_REQUEST, &msg);
    }
    let results = compare_scenarios(payload.scenarios).await;
    json_response(StatusCode::OK, CompareResponse { results })
}

// Scenarios share nothing, so each one runs on its own blocking task.
async fn compare_scenarios(scenarios: Vec<ProjectionPayload>) -> Vec<CompareEntry> {
    let handles = scenarios
        .into_iter()
        .map(|payload| tokio::task::spawn_blocking(move || evaluate_payload(payload)))
        .collect::<Vec<_>>();

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        let entry = match handle.await {
            Ok(Ok(report)) => CompareEntry::Report(Box::new(report)),
            Ok(Err(err)) => CompareEntry::Error(ErrorResponse {
                error: err.to_string(),
            }),
            Err(join_err) => CompareEntry::Error(ErrorResponse {
                error: format!("scenario evaluation failed: {join_err}"),
            }),
        };
        results.push(entry);
    }
    results
}

fn evaluate_payload(payload: ProjectionPayload) -> Result<ReportResponse, ConfigError> {
    let request = api_request_from_payload(payload)?;
    build_report(&request)
}

fn rejected(err: ConfigError) -> Response {
    warn!(error = %err, "rejected scenario");
    error_response(StatusCode::BAD_REQUEST, &err.to_string())
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn api_request_from_json(json: &str) -> Result<ApiRequest, String> {
    let payload = serde_json::from_str::<ProjectionPayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    api_request_from_payload(payload).map_err(|e| e.to_string())
}

fn api_request_from_payload(payload: ProjectionPayload) -> Result<ApiRequest, ConfigError> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.nodes {
        cli.nodes = v;
    }
    if let Some(v) = payload.licenses_per_node {
        cli.licenses_per_node = v;
    }
    if let Some(v) = payload.self_run_pct {
        cli.self_run_pct = v;
    }
    if let Some(v) = payload.leased_pct {
        cli.leased_pct = v;
    }
    if let Some(v) = payload.inactive_pct {
        cli.inactive_pct = v;
    }
    if let Some(v) = payload.revenue_per_license {
        cli.revenue_per_license = v;
    }
    if let Some(v) = payload.lease_split {
        cli.lease_split = v;
    }
    if let Some(v) = payload.uptime_self_run {
        cli.uptime_self_run = v;
    }
    if let Some(v) = payload.uptime_leased {
        cli.uptime_leased = v;
    }
    if let Some(v) = payload.node_cost {
        cli.node_cost = v;
    }
    if let Some(v) = payload.phone_cost {
        cli.phone_cost = v;
    }
    if let Some(v) = payload.sim_monthly_cost {
        cli.sim_monthly_cost = v;
    }
    if let Some(v) = payload.credit_monthly_cost {
        cli.credit_monthly_cost = v;
    }
    if let Some(v) = payload.operator_pays_credits {
        cli.operator_pays_credits = v;
    }
    if let Some(v) = payload.self_run_curve {
        cli.self_run_curve = v.into();
    }
    if let Some(v) = payload.self_run_ramp_months {
        cli.self_run_ramp_months = v;
    }
    if let Some(v) = payload.leased_curve {
        cli.leased_curve = v.into();
    }
    if let Some(v) = payload.leased_ramp_months {
        cli.leased_ramp_months = v;
    }
    if let Some(v) = payload.horizon_months {
        cli.horizon_months = v;
    }

    cli.ecosystem_nodes = payload.ecosystem_nodes;
    cli.revenue_per_verification = payload.revenue_per_verification;
    cli.revenue_alert = payload.revenue_alert;
    cli.verification_ceiling = payload.verification_ceiling;
    cli.market_share_warning = payload.market_share_warning;
    cli.capital_ceiling = payload.capital_ceiling;
    cli.benchmark_multiple = payload.benchmark_multiple;
    cli.break_even_notice_months = payload.break_even_notice_months;

    build_request(cli)
}

fn default_cli_for_api() -> Cli {
    Cli {
        nodes: 1,
        licenses_per_node: 200,
        self_run_pct: 0.0,
        leased_pct: 75.0,
        inactive_pct: 25.0,
        revenue_per_license: 208.0,
        lease_split: 40.0,
        uptime_self_run: 95.0,
        uptime_leased: 95.0,
        node_cost: 5_000.0,
        phone_cost: 150.0,
        sim_monthly_cost: 10.0,
        credit_monthly_cost: 0.0,
        operator_pays_credits: false,
        self_run_curve: CliCurveKind::Immediate,
        self_run_ramp_months: 6,
        leased_curve: CliCurveKind::Immediate,
        leased_ramp_months: 6,
        horizon_months: DEFAULT_HORIZON_MONTHS,
        ecosystem_nodes: None,
        revenue_per_verification: None,
        revenue_alert: None,
        verification_ceiling: None,
        market_share_warning: None,
        capital_ceiling: None,
        benchmark_multiple: None,
        break_even_notice_months: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{RoiOutcome, WarningCode};

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn sample_cli() -> Cli {
        default_cli_for_api()
    }

    #[test]
    fn build_request_converts_percentages_to_fractions() {
        let request = build_request(sample_cli()).expect("valid defaults");
        let config = &request.config;
        assert_approx(config.distribution.self_run, 0.0);
        assert_approx(config.distribution.leased, 0.75);
        assert_approx(config.distribution.inactive, 0.25);
        assert_approx(config.lease_split, 0.40);
        assert_approx(config.uptime_self_run, 0.95);
        assert_approx(config.uptime_leased, 0.95);
        assert_eq!(request.horizon_months, 24);
        assert_eq!(request.assumptions, EcosystemAssumptions::default());
    }

    #[test]
    fn clap_defaults_match_api_defaults() {
        let parsed = Cli::try_parse_from(["fleetcast"]).expect("all flags have defaults");
        let from_cli = build_request(parsed).expect("valid defaults");
        let from_api = build_request(sample_cli()).expect("valid defaults");
        assert_eq!(from_cli.config, from_api.config);
        assert_eq!(from_cli.horizon_months, from_api.horizon_months);
    }

    #[test]
    fn clap_parses_curve_flags() {
        let parsed = Cli::try_parse_from([
            "fleetcast",
            "--self-run-pct",
            "100",
            "--leased-pct",
            "0",
            "--inactive-pct",
            "0",
            "--self-run-curve",
            "s-curve",
            "--self-run-ramp-months",
            "9",
        ])
        .expect("flags parse");
        let request = build_request(parsed).expect("valid flags");
        assert_eq!(
            request.config.self_run_curve,
            CurveSpec::new(CurveKind::SCurveModerate, 9)
        );
    }

    #[test]
    fn build_request_rejects_distribution_not_summing_to_one() {
        let mut cli = sample_cli();
        cli.self_run_pct = 50.0;
        cli.leased_pct = 50.0;
        cli.inactive_pct = 10.0;
        let err = build_request(cli).expect_err("must reject distribution");
        assert!(matches!(err, ConfigError::DistributionSum { .. }));
        assert!(err.to_string().contains("distribution"));
    }

    #[test]
    fn build_request_rejects_out_of_range_ramp() {
        let mut cli = sample_cli();
        cli.leased_curve = CliCurveKind::Linear;
        cli.leased_ramp_months = 13;
        let err = build_request(cli).expect_err("must reject ramp");
        assert!(err.to_string().contains("between 1 and 12"));
    }

    #[test]
    fn build_request_rejects_zero_horizon() {
        let mut cli = sample_cli();
        cli.horizon_months = 0;
        assert_eq!(
            build_request(cli).expect_err("must reject horizon"),
            ConfigError::ZeroHorizon
        );
    }

    #[test]
    fn build_request_rejects_horizon_beyond_cap() {
        let mut cli = sample_cli();
        cli.horizon_months = MAX_HORIZON_MONTHS;
        assert!(build_request(cli).is_ok());

        let mut cli = sample_cli();
        cli.horizon_months = MAX_HORIZON_MONTHS + 1;
        assert!(matches!(
            build_request(cli),
            Err(ConfigError::HorizonTooLong { .. })
        ));

        let err = api_request_from_json(r#"{ "horizonMonths": 4294967295 }"#)
            .expect_err("oversized horizon must be rejected before simulating");
        assert!(err.contains("at most 120 months"), "{err}");
    }

    #[test]
    fn build_request_rejects_degenerate_assumption_overrides() {
        let err = api_request_from_json(r#"{ "revenuePerVerification": 0 }"#)
            .expect_err("zero verification price must fail");
        assert!(err.contains("revenue per verification"), "{err}");

        let err = api_request_from_json(r#"{ "capitalCeiling": -1 }"#)
            .expect_err("negative ceiling must fail");
        assert!(err.contains("capital caution ceiling"), "{err}");

        let mut cli = sample_cli();
        cli.market_share_warning = Some(f64::NAN);
        assert!(matches!(
            build_request(cli),
            Err(ConfigError::NonFiniteValue { .. })
        ));
    }

    #[test]
    fn api_request_from_json_parses_web_keys() {
        let json = r#"{
          "nodes": 3,
          "licensesPerNode": 150,
          "selfRunPct": 20,
          "leasedPct": 60,
          "inactivePct": 20,
          "revenuePerLicense": 45.5,
          "leaseSplit": 35,
          "uptimeSelfRun": 90,
          "uptimeLeased": 98,
          "nodeCost": 4200,
          "phoneCost": 120,
          "simMonthlyCost": 8,
          "creditMonthlyCost": 1.5,
          "operatorPaysCredits": true,
          "selfRunCurve": "aggressive",
          "selfRunRampMonths": 4,
          "leasedCurve": "sCurve",
          "leasedRampMonths": 10,
          "horizonMonths": 36,
          "ecosystemNodes": 8000,
          "marketShareWarning": 2.5
        }"#;
        let request = api_request_from_json(json).expect("json should parse");
        let config = request.config;
        assert_eq!(config.node_count, 3);
        assert_eq!(config.licenses_per_node, 150);
        assert_approx(config.distribution.self_run, 0.20);
        assert_approx(config.distribution.leased, 0.60);
        assert_approx(config.revenue_per_license, 45.5);
        assert_approx(config.lease_split, 0.35);
        assert_approx(config.uptime_self_run, 0.90);
        assert_approx(config.uptime_leased, 0.98);
        assert_approx(config.node_unit_cost, 4_200.0);
        assert_approx(config.phone_unit_cost, 120.0);
        assert_approx(config.sim_monthly_cost, 8.0);
        assert_approx(config.credit_monthly_cost, 1.5);
        assert!(config.operator_pays_credits);
        assert_eq!(config.self_run_curve, CurveSpec::new(CurveKind::Aggressive, 4));
        assert_eq!(
            config.leased_curve,
            CurveSpec::new(CurveKind::SCurveModerate, 10)
        );
        assert_eq!(request.horizon_months, 36);
        assert_eq!(request.assumptions.total_nodes, 8_000);
        assert_approx(request.assumptions.market_share_warning_pct, 2.5);
    }

    #[test]
    fn api_request_from_json_rejects_unknown_curve() {
        let err = api_request_from_json(r#"{ "leasedCurve": "exponential" }"#)
            .expect_err("unknown curve must fail");
        assert!(err.contains("Invalid API JSON payload"));
    }

    #[test]
    fn report_serialization_contains_expected_fields() {
        let request = api_request_from_json(r#"{ "horizonMonths": 12 }"#).expect("valid");
        let report = build_report(&request).expect("valid scenario");
        let json = serde_json::to_string(&report).expect("report should serialize");
        for key in [
            "\"horizonMonths\"",
            "\"initialInvestment\"",
            "\"series\"",
            "\"summary\"",
            "\"breakEvenMonth\"",
            "\"roi12Months\"",
            "\"cumulativeCashFlow\"",
            "\"ecosystem\"",
            "\"theoreticalMaxMonthlyRevenue\"",
            "\"realisticMonthlyRevenue\"",
            "\"userShare\"",
            "\"revenuePct\"",
            "\"dailyPerLicense\"",
            "\"warnings\"",
            "\"severity\":\"alert\"",
        ] {
            assert!(json.contains(key), "missing {key} in {json}");
        }
        assert!(json.contains(r#""roi24Months":{"status":"insufficient-horizon"}"#));
    }

    #[test]
    fn report_roi_values_serialize_with_status() {
        let request = api_request_from_json(r#"{ "horizonMonths": 12 }"#).expect("valid");
        let report = build_report(&request).expect("valid scenario");
        let roi = report.projection.summary.roi_12_months;
        let value = roi.value().expect("12 months simulated");
        let json = serde_json::to_value(roi).expect("roi serializes");
        assert_eq!(json["status"], "value");
        assert_approx(json["value"].as_f64().expect("numeric roi"), value);
        assert_eq!(
            report.projection.summary.roi_24_months,
            RoiOutcome::InsufficientHorizon
        );
    }

    #[test]
    fn render_cli_report_emits_pretty_json() {
        let output = render_cli_report(sample_cli()).expect("valid defaults");
        assert!(output.contains("\n  \"series\""));
        assert!(output.contains("\"ecosystem\""));
    }

    #[test]
    fn render_cli_report_surfaces_config_errors() {
        let mut cli = sample_cli();
        cli.uptime_leased = 120.0;
        let err = render_cli_report(cli).expect_err("uptime above 100% must fail");
        assert!(matches!(
            err,
            ReportError::Config(ConfigError::FractionOutOfRange { .. })
        ));
    }

    #[tokio::test]
    async fn compare_keeps_order_and_isolates_invalid_scenarios() {
        let valid = serde_json::from_str::<ProjectionPayload>(r#"{ "nodes": 2 }"#)
            .expect("payload parses");
        let invalid = serde_json::from_str::<ProjectionPayload>(r#"{ "leasedPct": 90 }"#)
            .expect("payload parses");
        let concentrated =
            serde_json::from_str::<ProjectionPayload>(r#"{ "nodes": 120, "revenuePerLicense": 20 }"#)
                .expect("payload parses");

        let results = compare_scenarios(vec![valid, invalid, concentrated]).await;
        assert_eq!(results.len(), 3);
        match &results[0] {
            CompareEntry::Report(report) => assert_eq!(report.projection.horizon_months, 24),
            CompareEntry::Error(err) => panic!("unexpected error: {}", err.error),
        }
        match &results[1] {
            CompareEntry::Error(err) => assert!(err.error.contains("distribution")),
            CompareEntry::Report(_) => panic!("invalid scenario must not produce a report"),
        }
        match &results[2] {
            CompareEntry::Report(report) => {
                let codes = report
                    .ecosystem
                    .warnings
                    .iter()
                    .map(|w| w.code)
                    .collect::<Vec<_>>();
                assert!(!codes.contains(&WarningCode::RevenuePerLicenseHigh));
            }
            CompareEntry::Error(err) => panic!("unexpected error: {}", err.error),
        }
    }
}
