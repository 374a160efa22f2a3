mod amortization;
mod cashflow;
mod engine;
mod schedule;
mod solver;
mod timeline;
mod types;

pub use amortization::{loan_to_value_percent, monthly_payment, monthly_rate};
pub use cashflow::{monthly_property_expenses, summarize_cash_flow, weekly_rental_income};
pub use engine::{
    NEVER_PAYS_OFF_INTEREST, NEVER_PAYS_OFF_YEARS, PAYOFF_EPSILON, initial_monthly_interest,
    run_model, simulate_offset_loan,
};
pub use schedule::{
    ContributionSchedule, DEPOSIT_DELAY_EXPENSE_NAME, ExpenseSchedule, ScheduleError,
};
pub use solver::{
    GoalScenario, GoalSolveConfig, GoalSolveIteration, GoalSolveResult, GoalType, solve_goal,
};
pub use timeline::{
    MonthsBreakdown, TimelinePoint, describe_months, ownership_percent, snapshot_at,
    timeline_point,
};
pub use types::{
    CashFlowSummary, EntryId, ExceptionalExpense, ExpenseKind, Inputs, LoanSummary, LoanTerms,
    ModelResult, MonthSnapshot, OffsetContribution, PersonalBudget, PropertyCosts, Recurrence,
    SimulationResult, TERM_MONTHS, Tenant, TenantKind,
};
