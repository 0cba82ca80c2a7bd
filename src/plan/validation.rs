use std::collections::HashSet;

use crate::{
    currency::Amount,
    errors::{PlanError, Result},
};

use super::config::FinancialConfiguration;

/// Largest amount accepted anywhere in a configuration (a thousand trillion pesos).
pub const MAX_AMOUNT: Amount = 1_000_000_000_000_000;

/// Largest monthly advisory rate accepted for an installment.
pub const MAX_RATE_PERCENT: f64 = 100.0;

/// Checks a configuration before it reaches the engine, reporting every problem at once.
pub fn validate(config: &FinancialConfiguration) -> Result<()> {
    let mut issues = Vec::new();

    if config.periodic_income <= 0 {
        issues.push(format!(
            "periodic income must be positive, got {}",
            config.periodic_income
        ));
    }
    check_amount(&mut issues, "periodic income", config.periodic_income);
    check_amount(&mut issues, "safety buffer", config.safety_buffer);

    for expense in &config.fixed_expenses {
        if expense.name.trim().is_empty() {
            issues.push("fixed expense name must not be empty".into());
        }
        check_amount(
            &mut issues,
            &format!("fixed expense `{}`", expense.name),
            expense.amount,
        );
    }

    let mut debt_ids = HashSet::new();
    for debt in &config.debts {
        check_id(&mut issues, &mut debt_ids, "debt", &debt.id);
        check_amount(&mut issues, &format!("debt `{}` balance", debt.id), debt.balance);
        if let Some(installment) = &debt.installment {
            check_amount(
                &mut issues,
                &format!("debt `{}` installment", debt.id),
                installment.amount,
            );
            let rate = installment.advisory_rate_percent;
            if !rate.is_finite() || !(0.0..=MAX_RATE_PERCENT).contains(&rate) {
                issues.push(format!(
                    "debt `{}` advisory rate must be between 0 and {MAX_RATE_PERCENT}, got {}",
                    debt.id, rate
                ));
            }
        }
    }

    let mut goal_ids = HashSet::new();
    for goal in &config.goals {
        check_id(&mut issues, &mut goal_ids, "goal", &goal.id);
        check_amount(&mut issues, &format!("goal `{}` amount", goal.id), goal.amount);
        check_amount(
            &mut issues,
            &format!("goal `{}` savings", goal.id),
            goal.already_saved,
        );
        if goal.already_saved > goal.amount {
            issues.push(format!(
                "goal `{}` already saved {} exceeds its amount {}",
                goal.id, goal.already_saved, goal.amount
            ));
        }
        if let Some(window) = goal.window {
            if window.start > window.end {
                issues.push(format!(
                    "goal `{}` window starts ({}) after it ends ({})",
                    goal.id, window.start, window.end
                ));
            }
        }
    }

    for rule in &config.paydown_order {
        if !debt_ids.contains(rule.debt.as_str()) {
            issues.push(format!(
                "paydown order references unknown debt `{}`",
                rule.debt
            ));
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(PlanError::InvalidConfiguration(issues))
    }
}

fn check_amount(issues: &mut Vec<String>, what: &str, amount: Amount) {
    if amount < 0 {
        issues.push(format!("{what} must not be negative, got {amount}"));
    } else if amount > MAX_AMOUNT {
        issues.push(format!("{what} must not exceed {MAX_AMOUNT}, got {amount}"));
    }
}

fn check_id<'a>(
    issues: &mut Vec<String>,
    seen: &mut HashSet<&'a str>,
    what: &str,
    id: &'a str,
) {
    if id.trim().is_empty() {
        issues.push(format!("{what} id must not be empty"));
    } else if !seen.insert(id) {
        issues.push(format!("{what} `{id}` is listed more than once"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::PeriodMarker;
    use crate::plan::config::{
        Debt, ExpenseSchedule, FixedExpense, GoalWindow, MinimumInstallment, OneTimeGoal,
        PaydownRule,
    };
    use crate::calendar::PayDay;

    #[test]
    fn default_profile_is_valid() {
        validate(&FinancialConfiguration::default()).expect("default profile validates");
    }

    #[test]
    fn collects_every_issue() {
        let config = FinancialConfiguration::with_income(0)
            .expense(FixedExpense::new("Internet", -1, ExpenseSchedule::Split))
            .debt(Debt::new("nu", "NU", 100))
            .debt(Debt::new("nu", "NU again", -5))
            .paydown(PaydownRule::always("amex"))
            .buffer(-10);
        let err = validate(&config).expect_err("invalid configuration");
        let issues = err.issues();
        assert_eq!(issues.len(), 6, "unexpected issues: {issues:?}");
        assert!(issues.iter().any(|issue| issue.contains("periodic income")));
        assert!(issues.iter().any(|issue| issue.contains("listed more than once")));
        assert!(issues.iter().any(|issue| issue.contains("unknown debt `amex`")));
    }

    #[test]
    fn rejects_non_finite_rate() {
        let config = FinancialConfiguration::with_income(1_000).debt(
            Debt::new("bogota", "Bogotá", 1_000).with_installment(MinimumInstallment {
                amount: 100,
                trigger_day: PayDay::Fifth,
                advisory_rate_percent: f64::NAN,
                cap_at_payoff: false,
            }),
        );
        let err = validate(&config).expect_err("NaN rate");
        assert!(err.to_string().contains("advisory rate"));
    }

    #[test]
    fn rejects_inverted_goal_window() {
        let window = GoalWindow::new(
            PeriodMarker::first_of(3, 2026).unwrap(),
            PeriodMarker::first_of(1, 2026).unwrap(),
        );
        let config = FinancialConfiguration::with_income(1_000)
            .goal(OneTimeGoal::new("uni", "Universidad", 500).saved(600).within(window));
        let err = validate(&config).expect_err("bad goal");
        assert_eq!(err.issues().len(), 2);
    }

    #[test]
    fn rejects_amounts_beyond_the_supported_range() {
        let config = FinancialConfiguration::with_income(i64::MAX)
            .expense(FixedExpense::new(
                "Arriendo",
                i64::MAX,
                ExpenseSchedule::OnDay(PayDay::Fifth),
            ))
            .debt(
                Debt::new("bogota", "Bogotá", i64::MAX).with_installment(MinimumInstallment {
                    amount: MAX_AMOUNT + 1,
                    trigger_day: PayDay::Fifth,
                    advisory_rate_percent: 5.0,
                    cap_at_payoff: true,
                }),
            )
            .goal(OneTimeGoal::new("uni", "Universidad", i64::MAX))
            .buffer(i64::MAX);
        let err = validate(&config).expect_err("oversized amounts");
        assert_eq!(err.issues().len(), 6, "unexpected issues: {:?}", err.issues());
        assert!(err
            .issues()
            .iter()
            .all(|issue| issue.contains("must not exceed")));
    }

    #[test]
    fn rejects_rates_above_one_hundred_percent() {
        let config = FinancialConfiguration::with_income(1_000).debt(
            Debt::new("nu", "NU", 1_000).with_installment(MinimumInstallment {
                amount: 100,
                trigger_day: PayDay::Twentieth,
                advisory_rate_percent: 250.0,
                cap_at_payoff: false,
            }),
        );
        let err = validate(&config).expect_err("rate too high");
        assert!(err.to_string().contains("advisory rate"));
        assert!(validate(&FinancialConfiguration::with_income(MAX_AMOUNT)).is_ok());
    }
}
