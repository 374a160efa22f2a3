use thiserror::Error;

use super::types::{EntryId, ExceptionalExpense, ExpenseKind, OffsetContribution, Recurrence};

/// Name of the synthetic expense that withholds the surplus before deposits start.
pub const DEPOSIT_DELAY_EXPENSE_NAME: &str = "Deposit delay";

/// Reasons a schedule mutation is refused. The message is shown to the user.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScheduleError {
    #[error(
        "A contribution already exists for month {0}. Remove it first or choose a different month."
    )]
    DuplicateMonth(u32),
    #[error("Please enter a valid amount (must be greater than 0).")]
    NonPositiveAmount,
    #[error("Please enter a name for the expense.")]
    MissingName,
    #[error("Month must be 1 or later (got {0}).")]
    MonthBeforeStart(u32),
    #[error("Start month ({start}) must not be after end month ({end}).")]
    StartAfterEnd { start: u32, end: u32 },
    #[error("No entry with id {0:?}.")]
    UnknownId(EntryId),
}

fn check_amount(amount: f64) -> Result<(), ScheduleError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(ScheduleError::NonPositiveAmount);
    }
    Ok(())
}

fn check_month(month: u32) -> Result<(), ScheduleError> {
    if month == 0 {
        return Err(ScheduleError::MonthBeforeStart(month));
    }
    Ok(())
}

/// Lump-sum offset deposits, at most one per month, kept sorted by month.
#[derive(Debug, Clone, Default)]
pub struct ContributionSchedule {
    entries: Vec<OffsetContribution>,
    next_id: u64,
}

impl ContributionSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, month: u32, amount: f64) -> Result<EntryId, ScheduleError> {
        check_amount(amount)?;
        check_month(month)?;
        let slot = match self.entries.binary_search_by_key(&month, |c| c.month) {
            Ok(_) => return Err(ScheduleError::DuplicateMonth(month)),
            Err(slot) => slot,
        };

        self.next_id += 1;
        let id = EntryId(self.next_id);
        self.entries
            .insert(slot, OffsetContribution { id, month, amount });
        Ok(id)
    }

    pub fn remove(&mut self, id: EntryId) -> Result<OffsetContribution, ScheduleError> {
        let idx = self
            .entries
            .iter()
            .position(|c| c.id == id)
            .ok_or(ScheduleError::UnknownId(id))?;
        Ok(self.entries.remove(idx))
    }

    pub fn contribution_due(&self, month: u32) -> f64 {
        match self.entries.binary_search_by_key(&month, |c| c.month) {
            Ok(idx) => self.entries[idx].amount,
            Err(_) => 0.0,
        }
    }

    pub fn total_scheduled(&self) -> f64 {
        self.entries.iter().map(|c| c.amount).sum()
    }

    /// Month offered by default for the next contribution.
    pub fn next_suggested_month(&self) -> u32 {
        self.entries.last().map_or(1, |c| c.month + 1)
    }

    pub fn entries(&self) -> &[OffsetContribution] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// One-time and recurring costs that are paid out of the monthly surplus.
#[derive(Debug, Clone, Default)]
pub struct ExpenseSchedule {
    entries: Vec<ExceptionalExpense>,
    next_id: u64,
}

impl ExpenseSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(
        &mut self,
        name: &str,
        amount: f64,
        kind: ExpenseKind,
    ) -> Result<EntryId, ScheduleError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ScheduleError::MissingName);
        }
        check_amount(amount)?;
        match kind {
            ExpenseKind::OneTime { month } => check_month(month)?,
            ExpenseKind::Recurring(Recurrence::Forever) => {}
            ExpenseKind::Recurring(Recurrence::Period {
                start_month,
                end_month,
            }) => {
                check_month(start_month)?;
                if start_month > end_month {
                    return Err(ScheduleError::StartAfterEnd {
                        start: start_month,
                        end: end_month,
                    });
                }
            }
        }

        self.next_id += 1;
        let id = EntryId(self.next_id);
        self.entries.push(ExceptionalExpense {
            id,
            name: name.to_string(),
            amount,
            kind,
        });
        Ok(id)
    }

    pub fn remove(&mut self, id: EntryId) -> Result<ExceptionalExpense, ScheduleError> {
        let idx = self
            .entries
            .iter()
            .position(|e| e.id == id)
            .ok_or(ScheduleError::UnknownId(id))?;
        Ok(self.entries.remove(idx))
    }

    /// Copy of the schedule with automatic deposits paused until
    /// `deposit_start_month`.
    ///
    /// The pause is a period expense equal to `monthly_surplus` over months
    /// `1..deposit_start_month`, so it must be rebuilt whenever the surplus
    /// being simulated changes. A start month of 0 or 1, or a surplus that is
    /// not positive, leaves the schedule unchanged.
    pub fn with_deposit_delay(
        &self,
        monthly_surplus: f64,
        deposit_start_month: u32,
    ) -> Result<Self, ScheduleError> {
        let mut delayed = self.clone();
        if deposit_start_month > 1 && monthly_surplus > 0.0 {
            delayed.add(
                DEPOSIT_DELAY_EXPENSE_NAME,
                monthly_surplus,
                ExpenseKind::Recurring(Recurrence::Period {
                    start_month: 1,
                    end_month: deposit_start_month - 1,
                }),
            )?;
        }
        Ok(delayed)
    }

    /// Sum of every expense active in `month`; overlapping expenses stack.
    pub fn exceptional_cost(&self, month: u32) -> f64 {
        self.entries
            .iter()
            .filter(|e| e.kind.is_active(month))
            .map(|e| e.amount)
            .sum()
    }

    pub fn entries(&self) -> &[ExceptionalExpense] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
