use serde::Serialize;

use super::schedule::{ContributionSchedule, ExpenseSchedule};

/// Fixed mortgage term used by every simulation run.
pub const TERM_MONTHS: u32 = 360;

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanTerms {
    pub principal: f64,
    pub annual_rate_percent: f64,
    pub term_months: u32,
}

impl LoanTerms {
    pub fn new(principal: f64, annual_rate_percent: f64) -> Self {
        Self {
            principal,
            annual_rate_percent,
            term_months: TERM_MONTHS,
        }
    }

    pub fn monthly_rate(&self) -> f64 {
        super::amortization::monthly_rate(self.annual_rate_percent)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EntryId(pub u64);

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OffsetContribution {
    pub id: EntryId,
    pub month: u32,
    pub amount: f64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "recurrence", rename_all = "kebab-case")]
pub enum Recurrence {
    Forever,
    #[serde(rename_all = "camelCase")]
    Period { start_month: u32, end_month: u32 },
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ExpenseKind {
    OneTime { month: u32 },
    Recurring(Recurrence),
}

impl ExpenseKind {
    pub fn is_active(&self, month: u32) -> bool {
        match *self {
            ExpenseKind::OneTime { month: due } => due == month,
            ExpenseKind::Recurring(Recurrence::Forever) => true,
            ExpenseKind::Recurring(Recurrence::Period {
                start_month,
                end_month,
            }) => (start_month..=end_month).contains(&month),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionalExpense {
    pub id: EntryId,
    pub name: String,
    pub amount: f64,
    #[serde(flatten)]
    pub kind: ExpenseKind,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TenantKind {
    Single,
    Shared,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub kind: TenantKind,
    pub weekly_rent: f64,
}

impl Tenant {
    /// Rent paid by each occupant of the room.
    pub fn weekly_rent_per_person(&self) -> f64 {
        match self.kind {
            TenantKind::Single => self.weekly_rent,
            TenantKind::Shared => self.weekly_rent / 2.0,
        }
    }
}

/// Recurring costs of holding the property, each in the period the bill arrives.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PropertyCosts {
    pub strata_quarterly: f64,
    pub utilities_monthly: f64,
    pub council_quarterly: f64,
    pub insurance_monthly: f64,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PersonalBudget {
    pub fortnightly_income: f64,
    pub weekly_food: f64,
    pub weekly_transport: f64,
    pub weekly_other: f64,
}

impl PersonalBudget {
    pub fn weekly_expenses(&self) -> f64 {
        self.weekly_food + self.weekly_transport + self.weekly_other
    }
}

#[derive(Debug, Clone)]
pub struct Inputs {
    pub property_price: f64,
    pub down_payment: f64,
    pub annual_rate_percent: f64,
    pub property_costs: PropertyCosts,
    pub tenants: Vec<Tenant>,
    pub personal: PersonalBudget,
    pub contributions: ContributionSchedule,
    pub expenses: ExpenseSchedule,
    /// First month the automatic surplus reaches the offset account.
    pub deposit_start_month: u32,
}

impl Inputs {
    pub fn loan_terms(&self) -> LoanTerms {
        LoanTerms::new(
            (self.property_price - self.down_payment).max(0.0),
            self.annual_rate_percent,
        )
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlowSummary {
    pub monthly_loan_payment: f64,
    pub monthly_property_expenses: f64,
    pub monthly_property_cost: f64,
    pub weekly_rental_income: f64,
    pub monthly_rental_income: f64,
    pub monthly_property_balance: f64,
    pub weekly_property_balance: f64,
    pub weekly_personal_expenses: f64,
    pub monthly_personal_expenses: f64,
    pub weekly_income: f64,
    pub fortnightly_income: f64,
    pub monthly_income: f64,
    pub weekly_net_balance: f64,
    pub fortnightly_net_balance: f64,
    pub monthly_net_balance: f64,
    pub weekly_to_offset: f64,
    pub fortnightly_to_offset: f64,
    pub monthly_surplus: f64,
}

/// One simulated month, with money figures rounded to whole currency units.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthSnapshot {
    pub month: u32,
    pub loan_balance: i64,
    pub offset_amount: i64,
    pub effective_balance: i64,
    pub monthly_interest_paid: i64,
    pub cumulative_interest_paid: i64,
    pub cumulative_principal_paid: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub months_to_payoff: u32,
    pub years_to_payoff: f64,
    pub total_interest: f64,
    pub final_loan_balance: f64,
    pub never_pays_off: bool,
    pub trace: Vec<MonthSnapshot>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanSummary {
    pub principal: f64,
    pub loan_to_value_percent: f64,
    pub monthly_rate: f64,
    pub monthly_payment: f64,
    pub term_months: u32,
    pub initial_monthly_interest: f64,
}

#[derive(Debug, Clone)]
pub struct ModelResult {
    pub terms: LoanTerms,
    pub loan: LoanSummary,
    pub cash_flow: CashFlowSummary,
    pub actual: SimulationResult,
    pub baseline: SimulationResult,
    pub interest_saved: f64,
}
