use super::amortization::monthly_payment;
use super::types::{CashFlowSummary, LoanTerms, PersonalBudget, PropertyCosts, Tenant};

const WEEKS_PER_YEAR: f64 = 52.0;
const FORTNIGHTS_PER_YEAR: f64 = 26.0;
const MONTHS_PER_YEAR: f64 = 12.0;
const QUARTERLY_BILL_DIVISOR: f64 = 4.0;

fn weekly_to_monthly(weekly: f64) -> f64 {
    weekly * WEEKS_PER_YEAR / MONTHS_PER_YEAR
}

fn monthly_to_weekly(monthly: f64) -> f64 {
    monthly * MONTHS_PER_YEAR / WEEKS_PER_YEAR
}

/// Recurring property costs excluding the loan repayment.
///
/// Strata and council bills are entered per quarter and spread as `bill / 4`
/// per month.
pub fn monthly_property_expenses(costs: &PropertyCosts) -> f64 {
    costs.strata_quarterly / QUARTERLY_BILL_DIVISOR
        + costs.utilities_monthly
        + costs.council_quarterly / QUARTERLY_BILL_DIVISOR
        + costs.insurance_monthly
}

pub fn weekly_rental_income(tenants: &[Tenant]) -> f64 {
    tenants.iter().map(|t| t.weekly_rent).sum()
}

/// Reduces every income and expense stream into the figures shown to the
/// user, ending with the automatic monthly surplus fed to the engine.
///
/// The monthly net balance subtracts the magnitude of the property balance,
/// so a property that earns more than it costs still reduces the surplus.
pub fn summarize_cash_flow(
    terms: &LoanTerms,
    costs: &PropertyCosts,
    tenants: &[Tenant],
    personal: &PersonalBudget,
) -> CashFlowSummary {
    let monthly_loan_payment = if terms.principal > 0.0 {
        monthly_payment(terms.principal, terms.monthly_rate(), terms.term_months)
    } else {
        0.0
    };
    let monthly_property_expenses = monthly_property_expenses(costs);
    let monthly_property_cost = monthly_loan_payment + monthly_property_expenses;

    let weekly_rental_income = weekly_rental_income(tenants);
    let monthly_rental_income = weekly_to_monthly(weekly_rental_income);

    let monthly_property_balance = monthly_rental_income - monthly_property_cost;
    let weekly_property_balance = monthly_to_weekly(monthly_property_balance);

    let weekly_personal_expenses = personal.weekly_expenses();
    let monthly_personal_expenses = weekly_to_monthly(weekly_personal_expenses);

    let fortnightly_income = personal.fortnightly_income;
    let weekly_income = fortnightly_income * FORTNIGHTS_PER_YEAR / WEEKS_PER_YEAR;
    let monthly_income = fortnightly_income * FORTNIGHTS_PER_YEAR / MONTHS_PER_YEAR;

    let weekly_net_balance = weekly_income - weekly_personal_expenses - weekly_property_balance;
    let fortnightly_net_balance = weekly_net_balance * 2.0;
    let monthly_net_balance =
        monthly_income - monthly_personal_expenses - monthly_property_balance.abs();

    CashFlowSummary {
        monthly_loan_payment,
        monthly_property_expenses,
        monthly_property_cost,
        weekly_rental_income,
        monthly_rental_income,
        monthly_property_balance,
        weekly_property_balance,
        weekly_personal_expenses,
        monthly_personal_expenses,
        weekly_income,
        fortnightly_income,
        monthly_income,
        weekly_net_balance,
        fortnightly_net_balance,
        monthly_net_balance,
        weekly_to_offset: weekly_net_balance.max(0.0),
        fortnightly_to_offset: fortnightly_net_balance.max(0.0),
        monthly_surplus: monthly_net_balance.max(0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::TenantKind;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= 1e-6,
            "expected {expected}, got {actual}"
        );
    }

    fn reference_terms() -> LoanTerms {
        LoanTerms::new(250_000.0, 5.38)
    }

    fn reference_costs() -> PropertyCosts {
        PropertyCosts {
            strata_quarterly: 1_000.0,
            utilities_monthly: 200.0,
            council_quarterly: 450.0,
            insurance_monthly: 80.0,
        }
    }

    fn reference_budget() -> PersonalBudget {
        PersonalBudget {
            fortnightly_income: 3_228.0,
            weekly_food: 100.0,
            weekly_transport: 50.0,
            weekly_other: 50.0,
        }
    }

    #[test]
    fn quarterly_bills_are_spread_over_four_months() {
        assert_approx(monthly_property_expenses(&reference_costs()), 642.5);
    }

    #[test]
    fn oracle_reference_scenario_without_tenants() {
        let summary =
            summarize_cash_flow(&reference_terms(), &reference_costs(), &[], &reference_budget());

        assert!((summary.monthly_loan_payment - 1_400.707_472).abs() < 1e-5);
        assert!((summary.monthly_property_cost - 2_043.207_472).abs() < 1e-5);
        assert_approx(summary.monthly_rental_income, 0.0);
        assert!((summary.monthly_property_balance + 2_043.207_472).abs() < 1e-5);
        assert_approx(summary.monthly_personal_expenses, 200.0 * 52.0 / 12.0);
        assert_approx(summary.monthly_income, 6_994.0);
        assert_approx(summary.weekly_income, 1_614.0);
        assert!((summary.monthly_surplus - 4_084.125_861).abs() < 1e-5);
        assert!((summary.weekly_to_offset - 1_885.509_417).abs() < 1e-5);
        assert_approx(summary.fortnightly_to_offset, summary.weekly_to_offset * 2.0);
    }

    #[test]
    fn positive_property_balance_is_still_subtracted_by_magnitude() {
        let tenants = [
            Tenant {
                kind: TenantKind::Single,
                weekly_rent: 250.0,
            },
            Tenant {
                kind: TenantKind::Shared,
                weekly_rent: 300.0,
            },
        ];
        let summary = summarize_cash_flow(
            &reference_terms(),
            &reference_costs(),
            &tenants,
            &reference_budget(),
        );

        assert_approx(summary.weekly_rental_income, 550.0);
        assert!(summary.monthly_property_balance > 0.0);
        assert_approx(
            summary.monthly_surplus,
            summary.monthly_income
                - summary.monthly_personal_expenses
                - summary.monthly_property_balance,
        );
        assert!((summary.monthly_surplus - 5_787.207_472).abs() < 1e-5);
    }

    #[test]
    fn deficit_floors_surplus_at_zero() {
        let mut budget = reference_budget();
        budget.fortnightly_income = 500.0;
        let summary = summarize_cash_flow(&reference_terms(), &reference_costs(), &[], &budget);
        assert!(summary.monthly_net_balance < 0.0);
        assert_approx(summary.monthly_surplus, 0.0);
    }

    #[test]
    fn fully_paid_property_has_no_loan_payment() {
        let summary = summarize_cash_flow(
            &LoanTerms::new(0.0, 5.38),
            &reference_costs(),
            &[],
            &reference_budget(),
        );
        assert_approx(summary.monthly_loan_payment, 0.0);
        assert_approx(summary.monthly_property_cost, 642.5);
    }

    #[test]
    fn shared_room_rent_splits_between_two_people() {
        let shared = Tenant {
            kind: TenantKind::Shared,
            weekly_rent: 300.0,
        };
        assert_approx(shared.weekly_rent_per_person(), 150.0);
    }
}
