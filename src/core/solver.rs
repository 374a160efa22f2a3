use serde::Serialize;

use super::engine::simulate_offset_loan;
use super::schedule::{ContributionSchedule, ExpenseSchedule};
use super::types::{ExpenseKind, LoanTerms, Recurrence};

const CANDIDATE_EXPENSE_NAME: &str = "Affordability check";

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum GoalType {
    /// Smallest monthly surplus that clears the loan by the target month.
    RequiredSurplus,
    /// Largest extra forever-recurring expense that still clears it in time.
    MaxRecurringExpense,
}

#[derive(Debug, Clone, Copy)]
pub struct GoalSolveConfig {
    pub goal_type: GoalType,
    pub target_months: u32,
    pub search_min: f64,
    pub search_max: f64,
    pub tolerance: f64,
    pub max_iterations: u32,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalSolveIteration {
    pub iteration: u32,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub candidate_value: f64,
    pub months_to_payoff: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalSolveResult {
    pub goal_type: GoalType,
    pub target_months: u32,
    pub search_min: f64,
    pub search_max: f64,
    pub tolerance: f64,
    pub max_iterations: u32,
    pub solved_value: Option<f64>,
    pub achieved_months_to_payoff: Option<u32>,
    pub achieved_total_interest: Option<f64>,
    pub iterations: Vec<GoalSolveIteration>,
    pub converged: bool,
    pub feasible: bool,
    pub message: String,
}

/// The fixed part of a scenario the solver varies one figure against.
#[derive(Debug, Clone, Copy)]
pub struct GoalScenario<'a> {
    pub terms: &'a LoanTerms,
    pub monthly_surplus: f64,
    pub contributions: &'a ContributionSchedule,
    /// Scheduled expenses, without any deposit delay applied.
    pub expenses: &'a ExpenseSchedule,
    /// First month the surplus reaches the offset account; 0 or 1 means month 1.
    pub deposit_start_month: u32,
}

#[derive(Debug, Clone, Copy)]
struct CandidateEval {
    months_to_payoff: u32,
    total_interest: f64,
    meets_target: bool,
}

/// Bisects over the goal's figure until the bracket is narrower than the
/// tolerance. Payoff time is monotone in both figures, so each evaluation halves
/// the bracket.
pub fn solve_goal(
    scenario: GoalScenario<'_>,
    config: GoalSolveConfig,
) -> Result<GoalSolveResult, String> {
    validate_config(scenario.terms, config)?;

    let mut iterations = Vec::with_capacity(config.max_iterations as usize);
    let low_eval = evaluate_candidate(scenario, config, config.search_min)?;
    let high_eval = evaluate_candidate(scenario, config, config.search_max)?;

    let mut solved_value = None;
    let mut converged = false;
    let feasible;
    let message;

    match config.goal_type {
        GoalType::RequiredSurplus => {
            if low_eval.meets_target {
                solved_value = Some(config.search_min);
                converged = true;
                feasible = true;
                message = "Already meets target at lower surplus bound.".to_string();
            } else if !high_eval.meets_target {
                feasible = false;
                message = "No feasible surplus found within the search bounds.".to_string();
            } else {
                let mut lo = config.search_min;
                let mut hi = config.search_max;
                let mut it = 0;
                while it < config.max_iterations {
                    it += 1;
                    let mid = (lo + hi) * 0.5;
                    let eval = evaluate_candidate(scenario, config, mid)?;
                    iterations.push(GoalSolveIteration {
                        iteration: it,
                        lower_bound: lo,
                        upper_bound: hi,
                        candidate_value: mid,
                        months_to_payoff: eval.months_to_payoff,
                    });

                    if eval.meets_target {
                        hi = mid;
                    } else {
                        lo = mid;
                    }

                    if (hi - lo).abs() <= config.tolerance {
                        converged = true;
                        break;
                    }
                }
                solved_value = Some(hi);
                feasible = true;
                message = if converged {
                    "Solved required monthly surplus.".to_string()
                } else {
                    "Reached max iterations before tolerance was met; returning best estimate."
                        .to_string()
                };
            }
        }
        GoalType::MaxRecurringExpense => {
            if !low_eval.meets_target {
                feasible = false;
                message = "Target is missed even at the lower expense bound.".to_string();
            } else if high_eval.meets_target {
                solved_value = Some(config.search_max);
                converged = true;
                feasible = true;
                message =
                    "Upper expense bound is still affordable; increase search max to search further."
                        .to_string();
            } else {
                let mut lo = config.search_min;
                let mut hi = config.search_max;
                let mut it = 0;
                while it < config.max_iterations {
                    it += 1;
                    let mid = (lo + hi) * 0.5;
                    let eval = evaluate_candidate(scenario, config, mid)?;
                    iterations.push(GoalSolveIteration {
                        iteration: it,
                        lower_bound: lo,
                        upper_bound: hi,
                        candidate_value: mid,
                        months_to_payoff: eval.months_to_payoff,
                    });

                    if eval.meets_target {
                        lo = mid;
                    } else {
                        hi = mid;
                    }

                    if (hi - lo).abs() <= config.tolerance {
                        converged = true;
                        break;
                    }
                }
                solved_value = Some(lo);
                feasible = true;
                message = if converged {
                    "Solved maximum affordable recurring expense.".to_string()
                } else {
                    "Reached max iterations before tolerance was met; returning best estimate."
                        .to_string()
                };
            }
        }
    }

    let achieved = solved_value
        .map(|value| evaluate_candidate(scenario, config, value))
        .transpose()?;

    Ok(GoalSolveResult {
        goal_type: config.goal_type,
        target_months: config.target_months,
        search_min: config.search_min,
        search_max: config.search_max,
        tolerance: config.tolerance,
        max_iterations: config.max_iterations,
        solved_value,
        achieved_months_to_payoff: achieved.map(|eval| eval.months_to_payoff),
        achieved_total_interest: achieved.map(|eval| eval.total_interest),
        iterations,
        converged,
        feasible,
        message,
    })
}

fn evaluate_candidate(
    scenario: GoalScenario<'_>,
    config: GoalSolveConfig,
    candidate_value: f64,
) -> Result<CandidateEval, String> {
    let result = match config.goal_type {
        GoalType::RequiredSurplus => {
            // The delay withholds whatever surplus is being tried.
            let surplus = candidate_value.max(0.0);
            let expenses = scenario
                .expenses
                .with_deposit_delay(surplus, scenario.deposit_start_month)
                .map_err(|e| format!("deposit delay: {e}"))?;
            simulate_offset_loan(scenario.terms, surplus, scenario.contributions, &expenses)
        }
        GoalType::MaxRecurringExpense => {
            let mut expenses = scenario
                .expenses
                .with_deposit_delay(scenario.monthly_surplus, scenario.deposit_start_month)
                .map_err(|e| format!("deposit delay: {e}"))?;
            // A zero candidate is simply "no extra expense".
            if candidate_value > 0.0 {
                expenses
                    .add(
                        CANDIDATE_EXPENSE_NAME,
                        candidate_value,
                        ExpenseKind::Recurring(Recurrence::Forever),
                    )
                    .map_err(|e| format!("candidate expense {candidate_value}: {e}"))?;
            }
            simulate_offset_loan(
                scenario.terms,
                scenario.monthly_surplus,
                scenario.contributions,
                &expenses,
            )
        }
    };

    Ok(CandidateEval {
        months_to_payoff: result.months_to_payoff,
        total_interest: result.total_interest,
        meets_target: !result.never_pays_off && result.months_to_payoff <= config.target_months,
    })
}

fn validate_config(terms: &LoanTerms, config: GoalSolveConfig) -> Result<(), String> {
    if config.target_months == 0 || config.target_months > terms.term_months {
        return Err(format!(
            "target_months must be between 1 and {}",
            terms.term_months
        ));
    }
    if !config.search_min.is_finite() || !config.search_max.is_finite() {
        return Err("search bounds must be finite".to_string());
    }
    if config.search_min < 0.0 {
        return Err("search_min must be >= 0".to_string());
    }
    if config.search_max <= config.search_min {
        return Err("search_max must be greater than search_min".to_string());
    }
    if !config.tolerance.is_finite() || config.tolerance <= 0.0 {
        return Err("tolerance must be > 0".to_string());
    }
    if config.max_iterations == 0 {
        return Err("max_iterations must be > 0".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    fn terms() -> LoanTerms {
        LoanTerms::new(250_000.0, 6.0)
    }

    fn surplus_config(target_months: u32) -> GoalSolveConfig {
        GoalSolveConfig {
            goal_type: GoalType::RequiredSurplus,
            target_months,
            search_min: 0.0,
            search_max: 20_000.0,
            tolerance: 0.5,
            max_iterations: 40,
        }
    }

    #[test]
    fn required_surplus_solver_hits_the_target_month() {
        let terms = terms();
        let contributions = ContributionSchedule::new();
        let expenses = ExpenseSchedule::new();
        let scenario = GoalScenario {
            terms: &terms,
            monthly_surplus: 0.0,
            contributions: &contributions,
            expenses: &expenses,
            deposit_start_month: 1,
        };

        let result = solve_goal(scenario, surplus_config(89)).expect("must solve");
        assert!(result.feasible);
        assert!(result.converged);
        let solved = result.solved_value.expect("value expected");
        assert!(solved <= 2_000.0 + 0.5, "solved {solved}");
        assert!(result.achieved_months_to_payoff.expect("months") <= 89);

        let just_below = simulate_offset_loan(&terms, solved - 1.0, &contributions, &expenses);
        assert!(just_below.months_to_payoff > 89);
    }

    #[test]
    fn required_surplus_is_lower_bound_when_already_met() {
        let terms = terms();
        let mut contributions = ContributionSchedule::new();
        contributions.add(1, 250_000.0).expect("valid");
        let expenses = ExpenseSchedule::new();
        let scenario = GoalScenario {
            terms: &terms,
            monthly_surplus: 0.0,
            contributions: &contributions,
            expenses: &expenses,
            deposit_start_month: 1,
        };

        let result = solve_goal(scenario, surplus_config(12)).expect("must solve");
        assert!(result.feasible);
        assert_eq!(result.solved_value, Some(0.0));
        assert!(result.iterations.is_empty());
        assert_eq!(result.achieved_months_to_payoff, Some(1));
    }

    #[test]
    fn required_surplus_reports_infeasible_when_bounds_too_low() {
        let terms = terms();
        let contributions = ContributionSchedule::new();
        let expenses = ExpenseSchedule::new();
        let scenario = GoalScenario {
            terms: &terms,
            monthly_surplus: 0.0,
            contributions: &contributions,
            expenses: &expenses,
            deposit_start_month: 1,
        };
        let mut config = surplus_config(12);
        config.search_max = 100.0;

        let result = solve_goal(scenario, config).expect("must return result");
        assert!(!result.feasible);
        assert!(result.solved_value.is_none());
        assert!(result.achieved_months_to_payoff.is_none());
    }

    #[test]
    fn max_recurring_expense_matches_surplus_headroom() {
        let terms = terms();
        let contributions = ContributionSchedule::new();
        let expenses = ExpenseSchedule::new();
        let scenario = GoalScenario {
            terms: &terms,
            monthly_surplus: 3_000.0,
            contributions: &contributions,
            expenses: &expenses,
            deposit_start_month: 1,
        };
        let config = GoalSolveConfig {
            goal_type: GoalType::MaxRecurringExpense,
            target_months: 89,
            search_min: 0.0,
            search_max: 3_000.0,
            tolerance: 0.5,
            max_iterations: 40,
        };

        let result = solve_goal(scenario, config).expect("must solve");
        assert!(result.feasible);
        let solved = result.solved_value.expect("value expected");
        // 3000 surplus minus roughly 1000 of spending lands on the 2000 payoff path.
        assert!(solved >= 1_000.0 - 1.0, "solved {solved}");
        assert!(result.achieved_months_to_payoff.expect("months") <= 89);
        assert!(expenses.is_empty());
    }

    #[test]
    fn max_recurring_expense_infeasible_when_target_unreachable() {
        let terms = terms();
        let contributions = ContributionSchedule::new();
        let expenses = ExpenseSchedule::new();
        let scenario = GoalScenario {
            terms: &terms,
            monthly_surplus: 100.0,
            contributions: &contributions,
            expenses: &expenses,
            deposit_start_month: 1,
        };
        let config = GoalSolveConfig {
            goal_type: GoalType::MaxRecurringExpense,
            target_months: 24,
            search_min: 0.0,
            search_max: 100.0,
            tolerance: 0.5,
            max_iterations: 20,
        };

        let result = solve_goal(scenario, config).expect("must return result");
        assert!(!result.feasible);
        assert!(result.solved_value.is_none());
    }

    #[test]
    fn required_surplus_keeps_deposits_paused_until_start_month() {
        let terms = terms();
        let contributions = ContributionSchedule::new();
        let expenses = ExpenseSchedule::new();
        let scenario = GoalScenario {
            terms: &terms,
            monthly_surplus: 0.0,
            contributions: &contributions,
            expenses: &expenses,
            deposit_start_month: 13,
        };

        let result = solve_goal(scenario, surplus_config(60)).expect("must solve");
        assert!(result.feasible);
        let solved = result.solved_value.expect("value expected");

        let delayed = expenses
            .with_deposit_delay(solved, 13)
            .expect("valid delay");
        let replay = simulate_offset_loan(&terms, solved, &contributions, &delayed);
        assert!(replay.months_to_payoff <= 60, "{replay:?}");
        assert!(replay.trace[..12].iter().all(|m| m.offset_amount == 0));
        assert_eq!(
            result.achieved_months_to_payoff,
            Some(replay.months_to_payoff)
        );
        assert_close(
            result.achieved_total_interest.expect("interest"),
            replay.total_interest,
            1e-9,
        );

        let below = solved - 1.0;
        let delayed_below = expenses
            .with_deposit_delay(below, 13)
            .expect("valid delay");
        let short = simulate_offset_loan(&terms, below, &contributions, &delayed_below);
        assert!(short.months_to_payoff > 60);

        let undelayed = solve_goal(
            GoalScenario {
                deposit_start_month: 1,
                ..scenario
            },
            surplus_config(60),
        )
        .expect("must solve");
        assert!(solved > undelayed.solved_value.expect("value expected"));
    }

    #[test]
    fn max_recurring_expense_respects_deposit_delay() {
        let terms = terms();
        let contributions = ContributionSchedule::new();
        let expenses = ExpenseSchedule::new();
        let config = GoalSolveConfig {
            goal_type: GoalType::MaxRecurringExpense,
            target_months: 89,
            search_min: 0.0,
            search_max: 3_000.0,
            tolerance: 0.5,
            max_iterations: 40,
        };
        let scenario = GoalScenario {
            terms: &terms,
            monthly_surplus: 3_000.0,
            contributions: &contributions,
            expenses: &expenses,
            deposit_start_month: 1,
        };

        let immediate = solve_goal(scenario, config).expect("must solve");
        let delayed = solve_goal(
            GoalScenario {
                deposit_start_month: 7,
                ..scenario
            },
            config,
        )
        .expect("must solve");
        assert!(
            delayed.solved_value.expect("value expected")
                < immediate.solved_value.expect("value expected")
        );
        assert!(delayed.achieved_months_to_payoff.expect("months") <= 89);
    }

    #[test]
    fn invalid_configs_are_rejected() {
        let terms = terms();
        let contributions = ContributionSchedule::new();
        let expenses = ExpenseSchedule::new();
        let scenario = GoalScenario {
            terms: &terms,
            monthly_surplus: 0.0,
            contributions: &contributions,
            expenses: &expenses,
            deposit_start_month: 1,
        };

        let mut config = surplus_config(0);
        assert!(solve_goal(scenario, config).is_err());
        config.target_months = 361;
        assert!(solve_goal(scenario, config).is_err());
        config.target_months = 120;
        config.search_max = config.search_min;
        let err = solve_goal(scenario, config).expect_err("empty bracket");
        assert!(err.contains("search_max"));
        config.search_max = 10.0;
        config.tolerance = 0.0;
        assert!(solve_goal(scenario, config).is_err());
    }
}
