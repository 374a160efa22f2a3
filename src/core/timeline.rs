use serde::Serialize;

use super::types::{MonthSnapshot, SimulationResult};

/// A month count rendered three ways for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthsBreakdown {
    pub decimal_years: f64,
    pub months: u32,
    pub human: String,
}

/// State of the loan at one point of the timeline, plus derived figures.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelinePoint {
    pub requested_month: u32,
    pub snapshot: MonthSnapshot,
    pub ownership_percent: f64,
    pub principal_paid_percent: f64,
    pub months_remaining: u32,
    pub remaining_years: u32,
    pub remaining_months: u32,
}

fn plural(count: u32, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {plural}")
    }
}

pub fn describe_months(months: u32) -> MonthsBreakdown {
    let whole_years = months / 12;
    let remainder = months % 12;
    let years = plural(whole_years, "year", "years");
    let human = if remainder == 0 {
        years
    } else {
        format!("{years} {}", plural(remainder, "month", "months"))
    };

    MonthsBreakdown {
        decimal_years: (months as f64 / 12.0 * 10.0).round() / 10.0,
        months,
        human,
    }
}

/// Snapshot for `month`; month 0 is the state before the first repayment.
///
/// Months past the end of the trace clamp to its last entry. Returns `None`
/// only when a month after 0 is requested from an empty trace.
pub fn snapshot_at(
    result: &SimulationResult,
    principal: f64,
    initial_monthly_interest: f64,
    month: u32,
) -> Option<MonthSnapshot> {
    if month == 0 {
        let principal = principal.round() as i64;
        return Some(MonthSnapshot {
            month: 0,
            loan_balance: principal,
            offset_amount: 0,
            effective_balance: principal,
            monthly_interest_paid: initial_monthly_interest.round() as i64,
            cumulative_interest_paid: 0,
            cumulative_principal_paid: 0,
        });
    }

    let idx = (month as usize - 1).min(result.trace.len().checked_sub(1)?);
    result.trace.get(idx).copied()
}

/// Share of the property effectively owned: principal repaid plus money
/// parked in the offset account, clamped to `[0, 100]`.
pub fn ownership_percent(principal: f64, effective_balance: f64) -> f64 {
    if principal <= 0.0 {
        return 100.0;
    }
    ((principal - effective_balance) / principal * 100.0).clamp(0.0, 100.0)
}

pub fn timeline_point(
    result: &SimulationResult,
    principal: f64,
    initial_monthly_interest: f64,
    month: u32,
) -> Option<TimelinePoint> {
    let snapshot = snapshot_at(result, principal, initial_monthly_interest, month)?;
    let months_remaining = result.months_to_payoff.saturating_sub(month);
    let principal_paid_percent = if principal > 0.0 {
        snapshot.cumulative_principal_paid as f64 / principal * 100.0
    } else {
        100.0
    };

    Some(TimelinePoint {
        requested_month: month,
        snapshot,
        ownership_percent: ownership_percent(principal, snapshot.effective_balance as f64),
        principal_paid_percent,
        months_remaining,
        remaining_years: months_remaining / 12,
        remaining_months: months_remaining % 12,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::engine::simulate_offset_loan;
    use crate::core::schedule::{ContributionSchedule, ExpenseSchedule};
    use crate::core::types::LoanTerms;

    fn steady_result() -> SimulationResult {
        simulate_offset_loan(
            &LoanTerms::new(250_000.0, 6.0),
            2_000.0,
            &ContributionSchedule::new(),
            &ExpenseSchedule::new(),
        )
    }

    #[test]
    fn describe_months_handles_plurals() {
        assert_eq!(describe_months(0).human, "0 years");
        assert_eq!(describe_months(12).human, "1 year");
        assert_eq!(describe_months(13).human, "1 year 1 month");
        assert_eq!(describe_months(89).human, "7 years 5 months");
        assert_eq!(describe_months(89).decimal_years, 7.4);
        assert_eq!(describe_months(89).months, 89);
        assert_eq!(describe_months(1).human, "0 years 1 month");
    }

    #[test]
    fn month_zero_is_synthesized_from_principal() {
        let result = steady_result();
        let snapshot = snapshot_at(&result, 250_000.0, 1_250.4, 0).expect("month zero");
        assert_eq!(snapshot.month, 0);
        assert_eq!(snapshot.loan_balance, 250_000);
        assert_eq!(snapshot.offset_amount, 0);
        assert_eq!(snapshot.effective_balance, 250_000);
        assert_eq!(snapshot.monthly_interest_paid, 1_250);
        assert_eq!(snapshot.cumulative_interest_paid, 0);
        assert_eq!(snapshot.cumulative_principal_paid, 0);
    }

    #[test]
    fn month_zero_exists_even_for_an_empty_trace() {
        let empty = simulate_offset_loan(
            &LoanTerms::new(250_000.0, 6.0),
            0.0,
            &ContributionSchedule::new(),
            &ExpenseSchedule::new(),
        );
        assert!(snapshot_at(&empty, 250_000.0, 1_250.0, 0).is_some());
        assert!(snapshot_at(&empty, 250_000.0, 1_250.0, 1).is_none());
        assert!(timeline_point(&empty, 250_000.0, 1_250.0, 5).is_none());
    }

    #[test]
    fn months_inside_the_trace_return_that_month() {
        let result = steady_result();
        let snapshot = snapshot_at(&result, 250_000.0, 1_250.0, 2).expect("in range");
        assert_eq!(snapshot, result.trace[1]);
    }

    #[test]
    fn months_past_the_trace_clamp_to_the_last_entry() {
        let result = steady_result();
        let last = *result.trace.last().expect("non-empty");
        assert_eq!(snapshot_at(&result, 250_000.0, 1_250.0, 360), Some(last));

        let point = timeline_point(&result, 250_000.0, 1_250.0, 360).expect("clamped");
        assert_eq!(point.months_remaining, 0);
        assert_eq!(point.ownership_percent, 100.0);
    }

    #[test]
    fn timeline_point_reports_remaining_time_and_ownership() {
        let result = steady_result();
        let point = timeline_point(&result, 250_000.0, 1_250.0, 1).expect("in range");
        assert_eq!(point.months_remaining, 88);
        assert_eq!(point.remaining_years, 7);
        assert_eq!(point.remaining_months, 4);
        assert!((point.ownership_percent - 0.8).abs() < 1e-9);
        assert!((point.principal_paid_percent - 259.0 / 2_500.0).abs() < 1e-9);
    }

    #[test]
    fn ownership_is_clamped() {
        assert_eq!(ownership_percent(100.0, 150.0), 0.0);
        assert_eq!(ownership_percent(100.0, -10.0), 100.0);
        assert_eq!(ownership_percent(0.0, 0.0), 100.0);
        assert!((ownership_percent(200.0, 50.0) - 75.0).abs() < 1e-12);
    }
}
