use serde::{Deserialize, Serialize};

use crate::{
    calendar::{PayDay, PeriodMarker},
    currency::{split_half, Amount},
};

/// When a fixed expense is charged within a month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "day", rename_all = "snake_case")]
pub enum ExpenseSchedule {
    /// Half of the monthly amount on each pay period.
    Split,
    /// The full amount on one pay day only.
    OnDay(PayDay),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedExpense {
    pub name: String,
    pub amount: Amount,
    pub schedule: ExpenseSchedule,
    #[serde(default)]
    pub critical: bool,
}

impl FixedExpense {
    pub fn new(name: impl Into<String>, amount: Amount, schedule: ExpenseSchedule) -> Self {
        Self {
            name: name.into(),
            amount,
            schedule,
            critical: false,
        }
    }

    pub fn critical(mut self) -> Self {
        self.critical = true;
        self
    }

    /// Amount charged on `day`; zero when the expense does not apply.
    pub fn charge_on(&self, day: PayDay) -> Amount {
        match self.schedule {
            ExpenseSchedule::Split => {
                let (first, second) = split_half(self.amount);
                match day {
                    PayDay::Fifth => first,
                    PayDay::Twentieth => second,
                }
            }
            ExpenseSchedule::OnDay(trigger) if trigger == day => self.amount,
            ExpenseSchedule::OnDay(_) => 0,
        }
    }
}

/// Fixed recurring payment owed on a debt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinimumInstallment {
    pub amount: Amount,
    pub trigger_day: PayDay,
    /// Monthly rate in percent, used only to estimate the interest share of a payment.
    #[serde(default)]
    pub advisory_rate_percent: f64,
    /// Lower the installment to `balance + estimated interest` when that is smaller.
    #[serde(default)]
    pub cap_at_payoff: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Debt {
    pub id: String,
    pub name: String,
    pub balance: Amount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installment: Option<MinimumInstallment>,
}

impl Debt {
    pub fn new(id: impl Into<String>, name: impl Into<String>, balance: Amount) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            balance,
            installment: None,
        }
    }

    pub fn with_installment(mut self, installment: MinimumInstallment) -> Self {
        self.installment = Some(installment);
        self
    }
}

/// Inclusive range of pay periods during which a goal may be paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalWindow {
    pub start: PeriodMarker,
    pub end: PeriodMarker,
}

impl GoalWindow {
    pub fn new(start: PeriodMarker, end: PeriodMarker) -> Self {
        Self { start, end }
    }

    /// Both pay periods of a single month.
    pub fn month(year: i32, month: u32) -> Result<Self, crate::errors::PlanError> {
        Ok(Self {
            start: PeriodMarker::first_of(month, year)?,
            end: PeriodMarker::last_of(month, year)?,
        })
    }

    pub fn contains(&self, date: PeriodMarker) -> bool {
        self.start <= date && date <= self.end
    }
}

/// A lump obligation paid down as soon as cash allows; never recurs once paid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OneTimeGoal {
    pub id: String,
    pub name: String,
    pub amount: Amount,
    /// Portion already covered before the projection starts.
    #[serde(default)]
    pub already_saved: Amount,
    /// Periods in which the goal may be paid. `None` means always.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window: Option<GoalWindow>,
}

impl OneTimeGoal {
    pub fn new(id: impl Into<String>, name: impl Into<String>, amount: Amount) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            amount,
            already_saved: 0,
            window: None,
        }
    }

    pub fn within(mut self, window: GoalWindow) -> Self {
        self.window = Some(window);
        self
    }

    pub fn saved(mut self, already_saved: Amount) -> Self {
        self.already_saved = already_saved;
        self
    }

    pub fn outstanding(&self) -> Amount {
        (self.amount - self.already_saved).max(0)
    }

    pub fn is_active_on(&self, date: PeriodMarker) -> bool {
        self.window.map_or(true, |window| window.contains(date))
    }
}

/// One step of the discretionary paydown order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaydownRule {
    pub debt: String,
    /// Restricts the rule to one pay day of the month.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pay_day: Option<PayDay>,
}

impl PaydownRule {
    pub fn always(debt: impl Into<String>) -> Self {
        Self {
            debt: debt.into(),
            pay_day: None,
        }
    }

    pub fn on(debt: impl Into<String>, day: PayDay) -> Self {
        Self {
            debt: debt.into(),
            pay_day: Some(day),
        }
    }

    pub fn applies_on(&self, day: PayDay) -> bool {
        self.pay_day.map_or(true, |only| only == day)
    }
}

/// Everything the allocation engine needs besides the dates to simulate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialConfiguration {
    /// Monthly income, split across the two pay periods.
    pub periodic_income: Amount,
    #[serde(default)]
    pub fixed_expenses: Vec<FixedExpense>,
    #[serde(default)]
    pub debts: Vec<Debt>,
    #[serde(default)]
    pub goals: Vec<OneTimeGoal>,
    #[serde(default)]
    pub paydown_order: Vec<PaydownRule>,
    #[serde(default)]
    pub safety_buffer: Amount,
}

impl FinancialConfiguration {
    /// Income-only configuration; the builders below add the rest.
    pub fn with_income(periodic_income: Amount) -> Self {
        Self {
            periodic_income,
            fixed_expenses: Vec::new(),
            debts: Vec::new(),
            goals: Vec::new(),
            paydown_order: Vec::new(),
            safety_buffer: 0,
        }
    }

    pub fn expense(mut self, expense: FixedExpense) -> Self {
        self.fixed_expenses.push(expense);
        self
    }

    pub fn debt(mut self, debt: Debt) -> Self {
        self.debts.push(debt);
        self
    }

    pub fn goal(mut self, goal: OneTimeGoal) -> Self {
        self.goals.push(goal);
        self
    }

    pub fn paydown(mut self, rule: PaydownRule) -> Self {
        self.paydown_order.push(rule);
        self
    }

    pub fn buffer(mut self, safety_buffer: Amount) -> Self {
        self.safety_buffer = safety_buffer;
        self
    }

    /// Income available on `day`.
    pub fn income_on(&self, day: PayDay) -> Amount {
        let (first, second) = split_half(self.periodic_income);
        match day {
            PayDay::Fifth => first,
            PayDay::Twentieth => second,
        }
    }

    pub fn debt_by_id(&self, id: &str) -> Option<&Debt> {
        self.debts.iter().find(|debt| debt.id == id)
    }

    pub fn total_initial_debt(&self) -> Amount {
        self.debts.iter().map(|debt| debt.balance.max(0)).sum()
    }
}

impl Default for FinancialConfiguration {
    /// The household profile the planner ships with.
    fn default() -> Self {
        let bogota_installment = MinimumInstallment {
            amount: 320_000,
            trigger_day: PayDay::Fifth,
            advisory_rate_percent: 2.2,
            cap_at_payoff: true,
        };
        let university_window = GoalWindow::new(
            PeriodMarker {
                year: 2026,
                month: 0,
                day: PayDay::Fifth,
            },
            PeriodMarker {
                year: 2026,
                month: 1,
                day: PayDay::Fifth,
            },
        );
        let homologation_window = GoalWindow::new(
            PeriodMarker {
                year: 2026,
                month: 0,
                day: PayDay::Fifth,
            },
            PeriodMarker {
                year: 2026,
                month: 0,
                day: PayDay::Twentieth,
            },
        );

        Self::with_income(5_400_000)
            .expense(FixedExpense::new(
                "Gastos Bebé",
                300_000,
                ExpenseSchedule::Split,
            ))
            .expense(FixedExpense::new(
                "Emiliano",
                100_000,
                ExpenseSchedule::OnDay(PayDay::Fifth),
            ))
            .expense(FixedExpense::new(
                "Internet",
                110_000,
                ExpenseSchedule::OnDay(PayDay::Fifth),
            ))
            .expense(
                FixedExpense::new(
                    "Arriendo",
                    1_400_000,
                    ExpenseSchedule::OnDay(PayDay::Twentieth),
                )
                .critical(),
            )
            .debt(Debt::new("amex", "AMEX", 1_500_000))
            .debt(Debt::new("nu", "NU", 2_200_000))
            .debt(Debt::new("bogota", "Bogotá", 3_100_000).with_installment(bogota_installment))
            .goal(OneTimeGoal::new("homologacion", "Homologación", 800_000).within(homologation_window))
            .goal(
                OneTimeGoal::new("universidad", "Universidad", 7_000_000)
                    .saved(3_400_000)
                    .within(university_window),
            )
            .paydown(PaydownRule::on("amex", PayDay::Fifth))
            .paydown(PaydownRule::on("nu", PayDay::Twentieth))
            .paydown(PaydownRule::always("bogota"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_expense_charges_half_each_period() {
        let expense = FixedExpense::new("Gastos Bebé", 300_000, ExpenseSchedule::Split);
        assert_eq!(expense.charge_on(PayDay::Fifth), 150_000);
        assert_eq!(expense.charge_on(PayDay::Twentieth), 150_000);
    }

    #[test]
    fn day_expense_only_charges_on_its_day() {
        let rent = FixedExpense::new(
            "Arriendo",
            1_400_000,
            ExpenseSchedule::OnDay(PayDay::Twentieth),
        );
        assert_eq!(rent.charge_on(PayDay::Fifth), 0);
        assert_eq!(rent.charge_on(PayDay::Twentieth), 1_400_000);
    }

    #[test]
    fn goal_window_for_a_month_is_inclusive() {
        let window = GoalWindow::month(2026, 0).expect("valid month");
        assert!(window.contains(PeriodMarker::first_of(0, 2026).unwrap()));
        assert!(window.contains(PeriodMarker::last_of(0, 2026).unwrap()));
        assert!(!window.contains(PeriodMarker::first_of(1, 2026).unwrap()));
        assert!(!window.contains(PeriodMarker::last_of(0, 2025).unwrap()));
    }

    #[test]
    fn goal_outstanding_subtracts_savings() {
        let goal = OneTimeGoal::new("uni", "Universidad", 7_000_000).saved(3_400_000);
        assert_eq!(goal.outstanding(), 3_600_000);
        assert!(goal.is_active_on(PeriodMarker::first_of(5, 2030).unwrap()));
    }

    #[test]
    fn default_profile_round_trips_through_json() {
        let config = FinancialConfiguration::default();
        let json = serde_json::to_string(&config).expect("serialize");
        let parsed: FinancialConfiguration = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, config);
        assert_eq!(parsed.total_initial_debt(), 6_800_000);
    }

    #[test]
    fn paydown_rule_day_filter() {
        assert!(PaydownRule::always("nu").applies_on(PayDay::Fifth));
        assert!(!PaydownRule::on("nu", PayDay::Twentieth).applies_on(PayDay::Fifth));
    }
}
