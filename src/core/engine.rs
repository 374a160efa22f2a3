use super::amortization::{loan_to_value_percent, monthly_payment};
use super::cashflow::summarize_cash_flow;
use super::schedule::{ContributionSchedule, ExpenseSchedule, ScheduleError};
use super::types::{Inputs, LoanSummary, LoanTerms, ModelResult, MonthSnapshot, SimulationResult};

/// Balance below which the loan counts as repaid.
pub const PAYOFF_EPSILON: f64 = 0.01;
/// Reported payoff time when nothing will ever reach the offset account.
pub const NEVER_PAYS_OFF_YEARS: u32 = 999;
/// Reported total interest for the same degenerate case.
pub const NEVER_PAYS_OFF_INTEREST: f64 = 999_999.0;

#[derive(Debug)]
struct LoanState {
    month: u32,
    loan_balance: f64,
    offset_balance: f64,
    total_interest: f64,
}

#[derive(Debug, Clone, Copy)]
struct MonthFlow {
    effective_offset: f64,
    effective_balance: f64,
    interest: f64,
}

/// Runs the full model: aggregates cash flow into a monthly surplus, then
/// simulates the loan with the real contribution schedule and with none.
/// Both runs hold back the surplus until `deposit_start_month`.
pub fn run_model(inputs: &Inputs) -> Result<ModelResult, ScheduleError> {
    let terms = inputs.loan_terms();
    let cash_flow = summarize_cash_flow(
        &terms,
        &inputs.property_costs,
        &inputs.tenants,
        &inputs.personal,
    );
    let surplus = cash_flow.monthly_surplus;
    let expenses = inputs
        .expenses
        .with_deposit_delay(surplus, inputs.deposit_start_month)?;

    let actual = simulate_offset_loan(&terms, surplus, &inputs.contributions, &expenses);
    let baseline = simulate_offset_loan(&terms, surplus, &ContributionSchedule::new(), &expenses);
    let interest_saved = baseline.total_interest - actual.total_interest;

    let loan = LoanSummary {
        principal: terms.principal,
        loan_to_value_percent: loan_to_value_percent(terms.principal, inputs.property_price),
        monthly_rate: terms.monthly_rate(),
        monthly_payment: cash_flow.monthly_loan_payment,
        term_months: terms.term_months,
        initial_monthly_interest: initial_monthly_interest(&terms, &inputs.contributions),
    };

    Ok(ModelResult {
        terms,
        loan,
        cash_flow,
        actual,
        baseline,
        interest_saved,
    })
}

/// Nominal interest for month 1, counting only a lump sum scheduled for that month.
pub fn initial_monthly_interest(terms: &LoanTerms, contributions: &ContributionSchedule) -> f64 {
    (terms.principal - contributions.contribution_due(1)).max(0.0) * terms.monthly_rate()
}

/// Simulates the loan month by month with an interest-offset account.
///
/// The repayment is fixed from the original terms and never recalculated.
/// Exceptional expenses are paid from the monthly surplus and never from the
/// offset balance; a month where they exceed the surplus deposits nothing and
/// carries no shortfall forward. The run ends as soon as the applied offset
/// covers the remaining balance.
pub fn simulate_offset_loan(
    terms: &LoanTerms,
    monthly_surplus: f64,
    contributions: &ContributionSchedule,
    expenses: &ExpenseSchedule,
) -> SimulationResult {
    if monthly_surplus <= 0.0 && contributions.total_scheduled() <= 0.0 {
        return never_pays_off();
    }

    let rate = terms.monthly_rate();
    let payment = if terms.principal > 0.0 {
        monthly_payment(terms.principal, rate, terms.term_months)
    } else {
        0.0
    };

    let mut state = LoanState {
        month: 0,
        loan_balance: terms.principal,
        offset_balance: 0.0,
        total_interest: 0.0,
    };
    let mut trace = Vec::new();

    while state.loan_balance > PAYOFF_EPSILON && state.month < terms.term_months {
        state.month += 1;
        apply_deposits(&mut state, monthly_surplus, contributions, expenses);
        let flow = accrue_and_repay(&mut state, payment, rate);

        trace.push(MonthSnapshot {
            month: state.month,
            loan_balance: round_money(state.loan_balance),
            offset_amount: round_money(flow.effective_offset),
            effective_balance: round_money(flow.effective_balance),
            monthly_interest_paid: round_money(flow.interest),
            cumulative_interest_paid: round_money(state.total_interest),
            cumulative_principal_paid: round_money(terms.principal - state.loan_balance),
        });

        if flow.effective_offset >= state.loan_balance {
            state.loan_balance = 0.0;
            break;
        }
    }

    SimulationResult {
        months_to_payoff: state.month,
        years_to_payoff: state.month as f64 / 12.0,
        total_interest: state.total_interest,
        final_loan_balance: state.loan_balance,
        never_pays_off: false,
        trace,
    }
}

fn never_pays_off() -> SimulationResult {
    SimulationResult {
        months_to_payoff: NEVER_PAYS_OFF_YEARS * 12,
        years_to_payoff: NEVER_PAYS_OFF_YEARS as f64,
        total_interest: NEVER_PAYS_OFF_INTEREST,
        final_loan_balance: f64::INFINITY,
        never_pays_off: true,
        trace: Vec::new(),
    }
}

fn apply_deposits(
    state: &mut LoanState,
    monthly_surplus: f64,
    contributions: &ContributionSchedule,
    expenses: &ExpenseSchedule,
) {
    state.offset_balance += contributions.contribution_due(state.month);
    let net_deposit = (monthly_surplus - expenses.exceptional_cost(state.month)).max(0.0);
    state.offset_balance += net_deposit;
}

fn accrue_and_repay(state: &mut LoanState, payment: f64, rate: f64) -> MonthFlow {
    let effective_offset = state.offset_balance.min(state.loan_balance);
    let effective_balance = state.loan_balance - effective_offset;
    let interest = effective_balance * rate;
    state.total_interest += interest;

    let principal_paid = payment - interest;
    state.loan_balance = (state.loan_balance - principal_paid).max(0.0);

    MonthFlow {
        effective_offset,
        effective_balance,
        interest,
    }
}

fn round_money(value: f64) -> i64 {
    value.round() as i64
}
