use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::{
    calendar::{self, PeriodMarker},
    currency::Amount,
    errors::Result,
    plan::{validate, FinancialConfiguration, Period, Transaction, TransactionKind},
    storage::Profile,
};

/// Balances carried from one period to the next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationState {
    pub debts: BTreeMap<String, Amount>,
    pub goals: BTreeMap<String, Amount>,
}

impl SimulationState {
    pub fn seed(config: &FinancialConfiguration) -> Self {
        Self {
            debts: config
                .debts
                .iter()
                .map(|debt| (debt.id.clone(), debt.balance.max(0)))
                .collect(),
            goals: config
                .goals
                .iter()
                .map(|goal| (goal.id.clone(), goal.outstanding()))
                .collect(),
        }
    }

    fn debt(&self, id: &str) -> Amount {
        self.debts.get(id).copied().unwrap_or(0)
    }

    fn goal(&self, id: &str) -> Amount {
        self.goals.get(id).copied().unwrap_or(0)
    }

    fn reduce_debt(&mut self, id: &str, by: Amount) {
        if let Some(balance) = self.debts.get_mut(id) {
            *balance = balance.saturating_sub(by).max(0);
        }
    }

    fn reduce_goal(&mut self, id: &str, by: Amount) {
        if let Some(balance) = self.goals.get_mut(id) {
            *balance = balance.saturating_sub(by).max(0);
        }
    }
}

/// Interest the lender is assumed to take out of a payment: `round(balance × rate / 100)`.
///
/// This is an estimate for scheduling only; it is never added to the balance.
pub fn estimated_interest(balance: Amount, rate_percent: f64) -> Amount {
    if balance <= 0 || rate_percent <= 0.0 {
        return 0;
    }
    (balance as f64 * rate_percent / 100.0).round() as Amount
}

/// Part of `payment` assumed to reduce principal: `max(0, payment − estimated interest)`.
pub fn principal_component(payment: Amount, balance: Amount, rate_percent: f64) -> Amount {
    payment
        .saturating_sub(estimated_interest(balance, rate_percent))
        .max(0)
}

/// Cash and ledger of the period under construction.
struct PeriodLedger {
    cash: Amount,
    transactions: Vec<Transaction>,
}

impl PeriodLedger {
    fn new(income: Amount) -> Self {
        let mut ledger = Self {
            cash: income,
            transactions: Vec::new(),
        };
        ledger.push(TransactionKind::Income, "Nómina", income, false, None);
        ledger
    }

    fn push(
        &mut self,
        kind: TransactionKind,
        label: impl Into<String>,
        amount: Amount,
        critical: bool,
        subject: Option<&str>,
    ) {
        if amount <= 0 {
            return;
        }
        self.transactions.push(Transaction {
            kind,
            label: label.into(),
            amount,
            critical,
            subject: subject.map(str::to_string),
        });
    }

    /// Records an outflow and takes it out of cash.
    fn pay(
        &mut self,
        kind: TransactionKind,
        label: impl Into<String>,
        amount: Amount,
        critical: bool,
        subject: Option<&str>,
    ) {
        if amount <= 0 {
            return;
        }
        self.cash = self.cash.saturating_sub(amount);
        self.push(kind, label, amount, critical, subject);
    }
}

/// Deterministic allocation of income across expenses, goals and debts.
pub struct SimulationEngine;

impl SimulationEngine {
    /// Validates `config` and simulates one period per entry of `dates`.
    ///
    /// An invalid configuration is rejected before any period is produced.
    pub fn run(config: &FinancialConfiguration, dates: &[PeriodMarker]) -> Result<Vec<Period>> {
        validate(config)?;
        let seed = SimulationState::seed(config);
        let (state, periods) = dates.iter().fold(
            (seed, Vec::with_capacity(dates.len())),
            |(state, mut periods), date| {
                let (next, period) = Self::step(config, state, *date);
                periods.push(period);
                (next, periods)
            },
        );

        if let Some(last) = dates.last() {
            Self::report_lapsed_goals(config, &state, *last);
        }
        info!(
            periods = periods.len(),
            remaining_debt = state.debts.values().sum::<Amount>(),
            "projection complete"
        );
        Ok(periods)
    }

    /// Projects a stored profile over its own start date and period count.
    pub fn project(profile: &Profile) -> Result<Vec<Period>> {
        let dates = calendar::sequence(profile.start, profile.periods);
        Self::run(&profile.configuration, &dates)
    }

    /// Simulates a single period, consuming the carried state and returning the next one.
    pub fn step(
        config: &FinancialConfiguration,
        mut state: SimulationState,
        date: PeriodMarker,
    ) -> (SimulationState, Period) {
        let income = config.income_on(date.day);
        let mut ledger = PeriodLedger::new(income);

        Self::apply_fixed_expenses(config, date, &mut ledger);
        Self::apply_priority_goals(config, &mut state, date, &mut ledger);
        Self::apply_minimum_installments(config, &mut state, date, &mut ledger);
        Self::apply_paydown(config, &mut state, date, &mut ledger);

        let ending_cash_balance = ledger.cash.max(0);
        let shortfall = Amount::default().saturating_sub(ledger.cash).max(0);
        ledger.push(
            TransactionKind::SurplusSavings,
            "Disponible / Ahorro",
            ending_cash_balance,
            false,
            None,
        );
        if shortfall > 0 {
            warn!(period = %date, shortfall, "fixed expenses exceed the period income");
        }
        debug!(
            period = %date,
            transactions = ledger.transactions.len(),
            ending_cash_balance,
            "period simulated"
        );

        let period = Period {
            date,
            income,
            transactions: ledger.transactions,
            ending_cash_balance,
            shortfall,
            debt_balances_after: clamp(&state.debts),
            goal_balances_after: clamp(&state.goals),
        };
        (state, period)
    }

    fn apply_fixed_expenses(
        config: &FinancialConfiguration,
        date: PeriodMarker,
        ledger: &mut PeriodLedger,
    ) {
        for expense in &config.fixed_expenses {
            let charge = expense.charge_on(date.day);
            ledger.pay(
                TransactionKind::FixedExpense,
                expense.name.as_str(),
                charge,
                expense.critical,
                None,
            );
        }
    }

    fn apply_priority_goals(
        config: &FinancialConfiguration,
        state: &mut SimulationState,
        date: PeriodMarker,
        ledger: &mut PeriodLedger,
    ) {
        for goal in &config.goals {
            let remaining = state.goal(&goal.id);
            if remaining <= 0 || !goal.is_active_on(date) {
                continue;
            }
            let payment = ledger.cash.min(remaining);
            if payment > 0 {
                state.reduce_goal(&goal.id, payment);
                ledger.pay(
                    TransactionKind::PriorityGoal,
                    goal.name.as_str(),
                    payment,
                    true,
                    Some(&goal.id),
                );
            }
        }
    }

    fn apply_minimum_installments(
        config: &FinancialConfiguration,
        state: &mut SimulationState,
        date: PeriodMarker,
        ledger: &mut PeriodLedger,
    ) {
        for debt in &config.debts {
            let Some(installment) = &debt.installment else {
                continue;
            };
            let balance = state.debt(&debt.id);
            if balance <= 0 || installment.trigger_day != date.day {
                continue;
            }

            let rate = installment.advisory_rate_percent;
            let interest = estimated_interest(balance, rate);
            let mut due = installment.amount;
            let payoff = balance.saturating_add(interest);
            if installment.cap_at_payoff && payoff < due {
                due = payoff;
            }
            if due <= 0 {
                continue;
            }

            if ledger.cash >= due {
                state.reduce_debt(&debt.id, principal_component(due, balance, rate));
                ledger.pay(
                    TransactionKind::DebtMinimum,
                    format!("Cuota Fija {}", debt.name),
                    due,
                    false,
                    Some(&debt.id),
                );
            } else {
                let partial = ledger.cash.max(0);
                if partial == 0 {
                    warn!(period = %date, debt = %debt.id, "no cash left for the installment");
                    continue;
                }
                state.reduce_debt(&debt.id, principal_component(partial, balance, rate));
                ledger.pay(
                    TransactionKind::DebtMinimum,
                    format!("Abono Parcial {}", debt.name),
                    partial,
                    true,
                    Some(&debt.id),
                );
                debug!(period = %date, debt = %debt.id, partial, due, "partial installment");
            }
        }
    }

    fn apply_paydown(
        config: &FinancialConfiguration,
        state: &mut SimulationState,
        date: PeriodMarker,
        ledger: &mut PeriodLedger,
    ) {
        let mut surplus = ledger.cash.saturating_sub(config.safety_buffer).max(0);
        for rule in &config.paydown_order {
            if surplus == 0 {
                break;
            }
            if !rule.applies_on(date.day) {
                continue;
            }
            let balance = state.debt(&rule.debt);
            if balance <= 0 {
                continue;
            }
            let payment = surplus.min(balance);
            surplus -= payment;
            state.reduce_debt(&rule.debt, payment);
            let name = config
                .debt_by_id(&rule.debt)
                .map_or(rule.debt.as_str(), |debt| debt.name.as_str());
            ledger.pay(
                TransactionKind::DebtPaydown,
                format!("Capital {name}"),
                payment,
                false,
                Some(&rule.debt),
            );
        }
    }

    fn report_lapsed_goals(
        config: &FinancialConfiguration,
        state: &SimulationState,
        last: PeriodMarker,
    ) {
        for goal in &config.goals {
            let remaining = state.goal(&goal.id);
            let closed = goal.window.is_some_and(|window| window.end < last);
            if closed && remaining > 0 {
                warn!(
                    goal = %goal.id,
                    remaining,
                    "goal window closed before the goal was paid; it is not carried forward"
                );
            }
        }
    }
}

fn clamp(balances: &BTreeMap<String, Amount>) -> BTreeMap<String, Amount> {
    balances
        .iter()
        .map(|(id, balance)| (id.clone(), (*balance).max(0)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::PayDay;
    use crate::plan::{Debt, ExpenseSchedule, FixedExpense, MinimumInstallment, PaydownRule};

    fn marker(day: PayDay, month: u32) -> PeriodMarker {
        PeriodMarker::new(day, month, 2026).expect("valid marker")
    }

    #[test]
    fn interest_estimate_rounds() {
        assert_eq!(estimated_interest(3_100_000, 2.2), 68_200);
        assert_eq!(estimated_interest(100_001, 1.0), 1_000);
        assert_eq!(estimated_interest(0, 2.2), 0);
        assert_eq!(principal_component(320_000, 3_100_000, 2.2), 251_800);
        assert_eq!(principal_component(10_000, 3_100_000, 2.2), 0);
    }

    #[test]
    fn installment_capped_at_payoff_when_enabled() {
        let installment = MinimumInstallment {
            amount: 320_000,
            trigger_day: PayDay::Fifth,
            advisory_rate_percent: 2.0,
            cap_at_payoff: true,
        };
        let config = FinancialConfiguration::with_income(2_000_000)
            .debt(Debt::new("bogota", "Bogotá", 100_000).with_installment(installment));
        let state = SimulationState::seed(&config);
        let (next, period) = SimulationEngine::step(&config, state, marker(PayDay::Fifth, 0));

        let minimum: Vec<_> = period.of_kind(TransactionKind::DebtMinimum).collect();
        assert_eq!(minimum.len(), 1);
        assert_eq!(minimum[0].amount, 102_000);
        assert!(!minimum[0].critical);
        assert_eq!(next.debts["bogota"], 0);
        assert_eq!(period.ending_cash_balance, 1_000_000 - 102_000);
    }

    #[test]
    fn shortfall_is_reported_instead_of_negative_cash() {
        let config = FinancialConfiguration::with_income(1_000_000).expense(FixedExpense::new(
            "Arriendo",
            1_400_000,
            ExpenseSchedule::OnDay(PayDay::Twentieth),
        ));
        let state = SimulationState::seed(&config);
        let (_, period) = SimulationEngine::step(&config, state, marker(PayDay::Twentieth, 0));
        assert_eq!(period.ending_cash_balance, 0);
        assert_eq!(period.shortfall, 900_000);
        assert_eq!(period.savings(), 0);
        assert_eq!(
            period.income - period.outflows(),
            period.ending_cash_balance - period.shortfall
        );
    }

    #[test]
    fn safety_buffer_is_kept_as_savings() {
        let config = FinancialConfiguration::with_income(1_000_000)
            .debt(Debt::new("nu", "NU", 2_000_000))
            .paydown(PaydownRule::always("nu"))
            .buffer(100_000);
        let (next, period) =
            SimulationEngine::step(&config, SimulationState::seed(&config), marker(PayDay::Fifth, 0));
        assert_eq!(period.touching("nu").map(|txn| txn.amount).sum::<Amount>(), 400_000);
        assert_eq!(period.savings(), 100_000);
        assert_eq!(next.debts["nu"], 1_600_000);
    }

    #[test]
    fn invalid_configuration_produces_no_periods() {
        let config = FinancialConfiguration::with_income(-1);
        let dates = calendar::sequence(marker(PayDay::Fifth, 0), 4);
        assert!(SimulationEngine::run(&config, &dates).is_err());
    }

    #[test]
    fn oversized_amounts_are_rejected_before_simulating() {
        let huge_expenses = FinancialConfiguration::with_income(1_000_000)
            .expense(FixedExpense::new("A", i64::MAX, ExpenseSchedule::OnDay(PayDay::Fifth)))
            .expense(FixedExpense::new("B", i64::MAX, ExpenseSchedule::OnDay(PayDay::Fifth)));
        let huge_debt = FinancialConfiguration::with_income(1_000_000).debt(
            Debt::new("loan", "Banco", i64::MAX).with_installment(MinimumInstallment {
                amount: 320_000,
                trigger_day: PayDay::Fifth,
                advisory_rate_percent: 5.0,
                cap_at_payoff: true,
            }),
        );
        let dates = calendar::sequence(marker(PayDay::Fifth, 0), 4);
        for config in [huge_expenses, huge_debt] {
            let err = SimulationEngine::run(&config, &dates).expect_err("rejected");
            assert!(err.to_string().contains("must not exceed"));
        }
    }

    #[test]
    fn step_saturates_instead_of_overflowing() {
        let config = FinancialConfiguration::with_income(1_000_000)
            .expense(FixedExpense::new("A", i64::MAX, ExpenseSchedule::OnDay(PayDay::Fifth)))
            .expense(FixedExpense::new("B", i64::MAX, ExpenseSchedule::OnDay(PayDay::Fifth)))
            .debt(
                Debt::new("loan", "Banco", i64::MAX).with_installment(MinimumInstallment {
                    amount: 320_000,
                    trigger_day: PayDay::Fifth,
                    advisory_rate_percent: 5.0,
                    cap_at_payoff: true,
                }),
            )
            .paydown(PaydownRule::always("loan"))
            .buffer(i64::MAX);
        let (next, period) =
            SimulationEngine::step(&config, SimulationState::seed(&config), marker(PayDay::Fifth, 0));
        assert_eq!(period.ending_cash_balance, 0);
        assert_eq!(period.shortfall, i64::MAX);
        assert_eq!(next.debts["loan"], i64::MAX);
    }
}
