use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::core::{
    CashFlowSummary, ContributionSchedule, ExceptionalExpense, ExpenseKind, ExpenseSchedule,
    GoalScenario, GoalSolveConfig, GoalSolveResult, GoalType, Inputs, LoanSummary, ModelResult,
    MonthsBreakdown, OffsetContribution, PersonalBudget, PropertyCosts, Recurrence,
    SimulationResult, Tenant, TenantKind, TimelinePoint, describe_months, run_model, solve_goal,
    summarize_cash_flow, timeline_point,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiTenantKind {
    #[serde(alias = "individual")]
    Single,
    Shared,
}

impl From<ApiTenantKind> for TenantKind {
    fn from(value: ApiTenantKind) -> Self {
        match value {
            ApiTenantKind::Single => TenantKind::Single,
            ApiTenantKind::Shared => TenantKind::Shared,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiExpenseType {
    #[serde(alias = "oneTime", alias = "one_time")]
    OneTime,
    Recurring,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiRecurrence {
    Forever,
    Period,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiGoalType {
    #[serde(alias = "requiredSurplus", alias = "required_surplus")]
    RequiredSurplus,
    #[serde(alias = "maxRecurringExpense", alias = "max_recurring_expense")]
    MaxRecurringExpense,
}

impl From<ApiGoalType> for GoalType {
    fn from(value: ApiGoalType) -> Self {
        match value {
            ApiGoalType::RequiredSurplus => GoalType::RequiredSurplus,
            ApiGoalType::MaxRecurringExpense => GoalType::MaxRecurringExpense,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TenantPayload {
    #[serde(rename = "type")]
    kind: ApiTenantKind,
    amount: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContributionPayload {
    month: u32,
    amount: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExpensePayload {
    #[serde(default)]
    name: String,
    amount: f64,
    #[serde(rename = "type")]
    kind: ApiExpenseType,
    month: Option<u32>,
    recurrence: Option<ApiRecurrence>,
    start_month: Option<u32>,
    end_month: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SimulatePayload {
    property_price: Option<f64>,
    down_payment: Option<f64>,
    interest_rate: Option<f64>,

    strata_fees: Option<f64>,
    utilities: Option<f64>,
    council_rates: Option<f64>,
    insurance: Option<f64>,

    fortnightly_income: Option<f64>,
    food_expenses: Option<f64>,
    transport_expenses: Option<f64>,
    other_expenses: Option<f64>,

    initial_offset: Option<f64>,
    deposit_start_month: Option<u32>,
    timeline_month: Option<u32>,

    tenants: Option<Vec<TenantPayload>>,
    contributions: Option<Vec<ContributionPayload>>,
    expenses: Option<Vec<ExpensePayload>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct GoalPayload {
    goal_type: Option<ApiGoalType>,
    target_months: Option<u32>,
    search_min: Option<f64>,
    search_max: Option<f64>,
    tolerance: Option<f64>,
    max_iterations: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SolvePayload {
    #[serde(flatten)]
    scenario: SimulatePayload,
    goal: GoalPayload,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TenantArg {
    kind: TenantKind,
    weekly_rent: f64,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ContributionArg {
    month: u32,
    amount: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExpenseArg {
    name: String,
    amount: f64,
    kind: ExpenseKind,
}

fn parse_amount(raw: &str, what: &str) -> Result<f64, String> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| format!("invalid {what} amount '{raw}'"))
}

fn parse_month(raw: &str, what: &str) -> Result<u32, String> {
    raw.trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid {what} month '{raw}'"))
}

/// `KIND:WEEKLY_RENT`, e.g. `shared:300`.
fn parse_tenant(raw: &str) -> Result<TenantArg, String> {
    let (kind, rent) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected KIND:WEEKLY_RENT, got '{raw}'"))?;
    let kind = match kind.trim().to_ascii_lowercase().as_str() {
        "single" | "individual" => TenantKind::Single,
        "shared" => TenantKind::Shared,
        other => return Err(format!("unknown tenant kind '{other}'")),
    };
    Ok(TenantArg {
        kind,
        weekly_rent: parse_amount(rent, "rent")?,
    })
}

/// `MONTH:AMOUNT`, e.g. `12:20000`.
fn parse_contribution(raw: &str) -> Result<ContributionArg, String> {
    let (month, amount) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected MONTH:AMOUNT, got '{raw}'"))?;
    Ok(ContributionArg {
        month: parse_month(month, "contribution")?,
        amount: parse_amount(amount, "contribution")?,
    })
}

/// `NAME:MONTH:AMOUNT`.
fn parse_one_time_expense(raw: &str) -> Result<ExpenseArg, String> {
    let mut parts = raw.rsplitn(3, ':');
    let (Some(amount), Some(month), Some(name)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(format!("expected NAME:MONTH:AMOUNT, got '{raw}'"));
    };
    Ok(ExpenseArg {
        name: name.to_string(),
        amount: parse_amount(amount, "expense")?,
        kind: ExpenseKind::OneTime {
            month: parse_month(month, "expense")?,
        },
    })
}

/// `NAME:AMOUNT`, charged every month.
fn parse_recurring_expense(raw: &str) -> Result<ExpenseArg, String> {
    let (name, amount) = raw
        .rsplit_once(':')
        .ok_or_else(|| format!("expected NAME:AMOUNT, got '{raw}'"))?;
    Ok(ExpenseArg {
        name: name.to_string(),
        amount: parse_amount(amount, "expense")?,
        kind: ExpenseKind::Recurring(Recurrence::Forever),
    })
}

/// `NAME:START-END:AMOUNT`, charged in months `START..=END`.
fn parse_period_expense(raw: &str) -> Result<ExpenseArg, String> {
    let mut parts = raw.rsplitn(3, ':');
    let (Some(amount), Some(range), Some(name)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(format!("expected NAME:START-END:AMOUNT, got '{raw}'"));
    };
    let (start, end) = range
        .split_once('-')
        .ok_or_else(|| format!("expected START-END, got '{range}'"))?;
    Ok(ExpenseArg {
        name: name.to_string(),
        amount: parse_amount(amount, "expense")?,
        kind: ExpenseKind::Recurring(Recurrence::Period {
            start_month: parse_month(start, "start")?,
            end_month: parse_month(end, "end")?,
        }),
    })
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "offset_planner",
    about = "Mortgage payoff simulator with an interest-offset account (surplus deposits, lump sums, exceptional expenses)"
)]
pub struct Cli {
    #[arg(long, default_value_t = 500_000.0)]
    property_price: f64,
    #[arg(long, default_value_t = 250_000.0)]
    down_payment: f64,
    #[arg(long, default_value_t = 5.38, help = "Annual interest rate in percent")]
    interest_rate: f64,
    #[arg(long, default_value_t = 1_000.0, help = "Strata fees per quarter")]
    strata_quarterly: f64,
    #[arg(long, default_value_t = 200.0)]
    utilities_monthly: f64,
    #[arg(long, default_value_t = 450.0, help = "Council rates per quarter")]
    council_quarterly: f64,
    #[arg(long, default_value_t = 80.0)]
    insurance_monthly: f64,
    #[arg(long, default_value_t = 3_228.0)]
    fortnightly_income: f64,
    #[arg(long, default_value_t = 100.0)]
    weekly_food: f64,
    #[arg(long, default_value_t = 50.0)]
    weekly_transport: f64,
    #[arg(long, default_value_t = 50.0)]
    weekly_other: f64,
    #[arg(
        long,
        default_value_t = 0.0,
        help = "Lump sum already in the offset account; lands in month 1"
    )]
    initial_offset: f64,
    #[arg(
        long,
        default_value_t = 1,
        help = "First month the automatic surplus is deposited"
    )]
    deposit_start_month: u32,
    #[arg(long, default_value_t = 0, help = "Month to report in the timeline view")]
    timeline_month: u32,
    #[arg(long = "tenant", value_parser = parse_tenant, help = "KIND:WEEKLY_RENT (single|shared)")]
    tenants: Vec<TenantArg>,
    #[arg(long = "contribution", value_parser = parse_contribution, help = "MONTH:AMOUNT")]
    contributions: Vec<ContributionArg>,
    #[arg(long = "one-time-expense", value_parser = parse_one_time_expense, help = "NAME:MONTH:AMOUNT")]
    one_time_expenses: Vec<ExpenseArg>,
    #[arg(long = "recurring-expense", value_parser = parse_recurring_expense, help = "NAME:AMOUNT")]
    recurring_expenses: Vec<ExpenseArg>,
    #[arg(long = "period-expense", value_parser = parse_period_expense, help = "NAME:START-END:AMOUNT")]
    period_expenses: Vec<ExpenseArg>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
enum RejectionTarget {
    Tenant,
    Contribution,
    OneTimeExpense,
    RecurringExpense,
    PeriodExpense,
}

impl RejectionTarget {
    fn for_expense(kind: &ExpenseKind) -> Self {
        match kind {
            ExpenseKind::OneTime { .. } => RejectionTarget::OneTimeExpense,
            ExpenseKind::Recurring(Recurrence::Forever) => RejectionTarget::RecurringExpense,
            ExpenseKind::Recurring(Recurrence::Period { .. }) => RejectionTarget::PeriodExpense,
        }
    }

    fn is_expense(self) -> bool {
        matches!(
            self,
            RejectionTarget::OneTimeExpense
                | RejectionTarget::RecurringExpense
                | RejectionTarget::PeriodExpense
        )
    }
}

/// A schedule entry that was refused, with the reason shown to the user.
///
/// `index` is the entry's position in the list it was submitted in: the
/// payload's `expenses` array, or the repeated flag named by `target`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
struct Rejection {
    target: RejectionTarget,
    index: usize,
    reason: String,
}

#[derive(Copy, Clone, Debug)]
struct ApiOptions {
    timeline_month: u32,
}

#[derive(Debug)]
struct ApiRequest {
    inputs: Inputs,
    options: ApiOptions,
    rejected: Vec<Rejection>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SimulateResponse {
    loan: LoanSummary,
    cash_flow: CashFlowSummary,
    contributions: Vec<OffsetContribution>,
    expenses: Vec<ExceptionalExpense>,
    total_scheduled_offset: f64,
    next_suggested_month: u32,
    actual: SimulationResult,
    baseline: SimulationResult,
    interest_saved: f64,
    payoff: MonthsBreakdown,
    timeline: Option<TimelinePoint>,
    rejected: Vec<Rejection>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

fn build_inputs(cli: Cli) -> Result<ApiRequest, String> {
    for (name, value) in [
        ("--property-price", cli.property_price),
        ("--down-payment", cli.down_payment),
        ("--strata-quarterly", cli.strata_quarterly),
        ("--utilities-monthly", cli.utilities_monthly),
        ("--council-quarterly", cli.council_quarterly),
        ("--insurance-monthly", cli.insurance_monthly),
        ("--fortnightly-income", cli.fortnightly_income),
        ("--weekly-food", cli.weekly_food),
        ("--weekly-transport", cli.weekly_transport),
        ("--weekly-other", cli.weekly_other),
        ("--initial-offset", cli.initial_offset),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(format!("{name} must be >= 0"));
        }
    }

    if cli.down_payment > cli.property_price {
        return Err("--down-payment must be <= --property-price".to_string());
    }

    if !cli.interest_rate.is_finite() || cli.interest_rate <= 0.0 {
        return Err("--interest-rate must be > 0".to_string());
    }

    if cli.interest_rate > 100.0 {
        return Err("--interest-rate must be <= 100".to_string());
    }

    if cli.deposit_start_month == 0 {
        return Err("--deposit-start-month must be >= 1".to_string());
    }

    let mut rejected = Vec::new();
    let mut tenants = Vec::with_capacity(cli.tenants.len());
    for (index, tenant) in cli.tenants.iter().enumerate() {
        if !tenant.weekly_rent.is_finite() || tenant.weekly_rent <= 0.0 {
            rejected.push(Rejection {
                target: RejectionTarget::Tenant,
                index,
                reason: "Weekly rent must be greater than 0.".to_string(),
            });
            continue;
        }
        tenants.push(Tenant {
            kind: tenant.kind,
            weekly_rent: tenant.weekly_rent,
        });
    }

    let mut inputs = Inputs {
        property_price: cli.property_price,
        down_payment: cli.down_payment,
        annual_rate_percent: cli.interest_rate,
        property_costs: PropertyCosts {
            strata_quarterly: cli.strata_quarterly,
            utilities_monthly: cli.utilities_monthly,
            council_quarterly: cli.council_quarterly,
            insurance_monthly: cli.insurance_monthly,
        },
        tenants,
        personal: PersonalBudget {
            fortnightly_income: cli.fortnightly_income,
            weekly_food: cli.weekly_food,
            weekly_transport: cli.weekly_transport,
            weekly_other: cli.weekly_other,
        },
        contributions: ContributionSchedule::new(),
        expenses: ExpenseSchedule::new(),
        deposit_start_month: cli.deposit_start_month,
    };

    if cli.initial_offset > 0.0 {
        inputs
            .contributions
            .add(1, cli.initial_offset)
            .map_err(|e| format!("--initial-offset: {e}"))?;
    }

    for (index, contribution) in cli.contributions.iter().enumerate() {
        if let Err(e) = inputs
            .contributions
            .add(contribution.month, contribution.amount)
        {
            warn!(index, month = contribution.month, reason = %e, "contribution rejected");
            rejected.push(Rejection {
                target: RejectionTarget::Contribution,
                index,
                reason: e.to_string(),
            });
        }
    }

    // Indices count within each flag's own list.
    for expense_args in [
        &cli.one_time_expenses,
        &cli.recurring_expenses,
        &cli.period_expenses,
    ] {
        for (index, expense) in expense_args.iter().enumerate() {
            if let Err(e) = inputs
                .expenses
                .add(&expense.name, expense.amount, expense.kind)
            {
                let target = RejectionTarget::for_expense(&expense.kind);
                warn!(?target, index, name = %expense.name, reason = %e, "expense rejected");
                rejected.push(Rejection {
                    target,
                    index,
                    reason: e.to_string(),
                });
            }
        }
    }

    Ok(ApiRequest {
        inputs,
        options: ApiOptions {
            timeline_month: cli.timeline_month,
        },
        rejected,
    })
}

/// Runs one simulation from command-line flags and renders it as JSON.
pub fn run_cli(cli: Cli) -> Result<String, String> {
    let request = build_inputs(cli)?;
    let model = run_model(&request.inputs).map_err(|e| e.to_string())?;
    let response = build_simulate_response(&request, &model);
    serde_json::to_string_pretty(&response).map_err(|e| format!("failed to render result: {e}"))
}

fn router() -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/api/simulate",
            get(simulate_get_handler).post(simulate_post_handler),
        )
        .route("/api/solve", post(solve_post_handler))
        .fallback(not_found_handler)
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "offset planner HTTP API listening");
    info!("local access: http://127.0.0.1:{port}/api/simulate");

    axum::serve(listener, router()).await
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, HealthResponse { status: "ok" })
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn simulate_get_handler(Query(payload): Query<SimulatePayload>) -> Response {
    simulate_handler_impl(payload)
}

async fn simulate_post_handler(Json(payload): Json<SimulatePayload>) -> Response {
    simulate_handler_impl(payload)
}

fn simulate_handler_impl(payload: SimulatePayload) -> Response {
    let request = match api_request_from_payload(payload) {
        Ok(request) => request,
        Err(msg) => {
            debug!(error = %msg, "simulate request rejected");
            return error_response(StatusCode::BAD_REQUEST, &msg);
        }
    };

    let model = match run_model(&request.inputs) {
        Ok(model) => model,
        Err(e) => {
            debug!(error = %e, "simulation failed");
            return error_response(StatusCode::BAD_REQUEST, &e.to_string());
        }
    };
    debug!(
        months_to_payoff = model.actual.months_to_payoff,
        interest_saved = model.interest_saved,
        rejected = request.rejected.len(),
        "simulation complete"
    );
    json_response(StatusCode::OK, build_simulate_response(&request, &model))
}

async fn solve_post_handler(Json(payload): Json<SolvePayload>) -> Response {
    match solve_from_payload(payload) {
        Ok(result) => {
            debug!(
                feasible = result.feasible,
                converged = result.converged,
                iterations = result.iterations.len(),
                "goal solve complete"
            );
            json_response(StatusCode::OK, result)
        }
        Err(msg) => {
            debug!(error = %msg, "solve request rejected");
            error_response(StatusCode::BAD_REQUEST, &msg)
        }
    }
}

fn solve_from_payload(payload: SolvePayload) -> Result<GoalSolveResult, String> {
    let request = api_request_from_payload(payload.scenario)?;
    let goal = payload.goal;
    let target_months = goal
        .target_months
        .ok_or_else(|| "goal.targetMonths is required".to_string())?;
    let config = GoalSolveConfig {
        goal_type: goal
            .goal_type
            .map_or(GoalType::RequiredSurplus, GoalType::from),
        target_months,
        search_min: goal.search_min.unwrap_or(0.0),
        search_max: goal.search_max.unwrap_or(20_000.0),
        tolerance: goal.tolerance.unwrap_or(0.5),
        max_iterations: goal.max_iterations.unwrap_or(40),
    };

    let inputs = &request.inputs;
    let terms = inputs.loan_terms();
    let cash_flow = summarize_cash_flow(
        &terms,
        &inputs.property_costs,
        &inputs.tenants,
        &inputs.personal,
    );
    let scenario = GoalScenario {
        terms: &terms,
        monthly_surplus: cash_flow.monthly_surplus,
        contributions: &inputs.contributions,
        expenses: &inputs.expenses,
        deposit_start_month: inputs.deposit_start_month,
    };
    solve_goal(scenario, config)
}

fn with_cache_control(mut response: Response) -> Response {
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)).into_response())
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
    let payload = serde_json::from_str::<SimulatePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    api_request_from_payload(payload)
}

fn declared_expense_target(expense: &ExpensePayload) -> RejectionTarget {
    match (expense.kind, expense.recurrence) {
        (ApiExpenseType::OneTime, _) => RejectionTarget::OneTimeExpense,
        (ApiExpenseType::Recurring, Some(ApiRecurrence::Period)) => RejectionTarget::PeriodExpense,
        (ApiExpenseType::Recurring, _) => RejectionTarget::RecurringExpense,
    }
}

fn expense_arg_from_payload(expense: ExpensePayload) -> Result<ExpenseArg, String> {
    let kind = match expense.kind {
        ApiExpenseType::OneTime => ExpenseKind::OneTime {
            month: expense
                .month
                .ok_or_else(|| "month is required for a one-time expense".to_string())?,
        },
        ApiExpenseType::Recurring => match expense.recurrence.unwrap_or(ApiRecurrence::Forever) {
            ApiRecurrence::Forever => ExpenseKind::Recurring(Recurrence::Forever),
            ApiRecurrence::Period => {
                let (Some(start_month), Some(end_month)) = (expense.start_month, expense.end_month)
                else {
                    return Err("startMonth and endMonth are required for a period expense"
                        .to_string());
                };
                ExpenseKind::Recurring(Recurrence::Period {
                    start_month,
                    end_month,
                })
            }
        },
    };
    Ok(ExpenseArg {
        name: expense.name,
        amount: expense.amount,
        kind,
    })
}

fn api_request_from_payload(payload: SimulatePayload) -> Result<ApiRequest, String> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.property_price {
        cli.property_price = v;
    }
    if let Some(v) = payload.down_payment {
        cli.down_payment = v;
    }
    if let Some(v) = payload.interest_rate {
        cli.interest_rate = v;
    }

    if let Some(v) = payload.strata_fees {
        cli.strata_quarterly = v;
    }
    if let Some(v) = payload.utilities {
        cli.utilities_monthly = v;
    }
    if let Some(v) = payload.council_rates {
        cli.council_quarterly = v;
    }
    if let Some(v) = payload.insurance {
        cli.insurance_monthly = v;
    }

    if let Some(v) = payload.fortnightly_income {
        cli.fortnightly_income = v;
    }
    if let Some(v) = payload.food_expenses {
        cli.weekly_food = v;
    }
    if let Some(v) = payload.transport_expenses {
        cli.weekly_transport = v;
    }
    if let Some(v) = payload.other_expenses {
        cli.weekly_other = v;
    }

    if let Some(v) = payload.initial_offset {
        cli.initial_offset = v;
    }
    if let Some(v) = payload.deposit_start_month {
        cli.deposit_start_month = v;
    }
    if let Some(v) = payload.timeline_month {
        cli.timeline_month = v;
    }

    if let Some(tenants) = payload.tenants {
        cli.tenants = tenants
            .into_iter()
            .map(|t| TenantArg {
                kind: t.kind.into(),
                weekly_rent: t.amount,
            })
            .collect();
    }
    if let Some(contributions) = payload.contributions {
        cli.contributions = contributions
            .into_iter()
            .map(|c| ContributionArg {
                month: c.month,
                amount: c.amount,
            })
            .collect();
    }

    // Payload expenses keep their original order, so they all go through one flag list.
    // `payload_index[i]` is the payload position of the i-th forwarded expense.
    let mut payload_index = Vec::new();
    let mut payload_rejections = Vec::new();
    if let Some(expenses) = payload.expenses {
        for (index, expense) in expenses.into_iter().enumerate() {
            let declared = declared_expense_target(&expense);
            match expense_arg_from_payload(expense) {
                Ok(arg) => {
                    payload_index.push(index);
                    cli.one_time_expenses.push(arg);
                }
                Err(reason) => payload_rejections.push((declared, index, reason)),
            }
        }
    }

    let mut request = build_inputs(cli)?;
    for rejection in &mut request.rejected {
        if rejection.target.is_expense() {
            if let Some(&index) = payload_index.get(rejection.index) {
                rejection.index = index;
            }
        }
    }
    for (target, index, reason) in payload_rejections {
        request.rejected.push(Rejection {
            target,
            index,
            reason,
        });
    }
    Ok(request)
}

fn default_cli_for_api() -> Cli {
    Cli {
        property_price: 500_000.0,
        down_payment: 250_000.0,
        interest_rate: 5.38,
        strata_quarterly: 1_000.0,
        utilities_monthly: 200.0,
        council_quarterly: 450.0,
        insurance_monthly: 80.0,
        fortnightly_income: 3_228.0,
        weekly_food: 100.0,
        weekly_transport: 50.0,
        weekly_other: 50.0,
        initial_offset: 0.0,
        deposit_start_month: 1,
        timeline_month: 0,
        tenants: Vec::new(),
        contributions: Vec::new(),
        one_time_expenses: Vec::new(),
        recurring_expenses: Vec::new(),
        period_expenses: Vec::new(),
    }
}

fn build_simulate_response(request: &ApiRequest, model: &ModelResult) -> SimulateResponse {
    let inputs = &request.inputs;
    SimulateResponse {
        loan: model.loan.clone(),
        cash_flow: model.cash_flow,
        contributions: inputs.contributions.entries().to_vec(),
        expenses: inputs.expenses.entries().to_vec(),
        total_scheduled_offset: inputs.contributions.total_scheduled(),
        next_suggested_month: inputs.contributions.next_suggested_month(),
        actual: model.actual.clone(),
        baseline: model.baseline.clone(),
        interest_saved: model.interest_saved,
        payoff: describe_months(model.actual.months_to_payoff),
        timeline: timeline_point(
            &model.actual,
            model.terms.principal,
            model.loan.initial_monthly_interest,
            request.options.timeline_month,
        ),
        rejected: request.rejected.clone(),
    }
}
