//! Read-only views derived from a projection: chart series, summaries, listings, exports.

pub mod export;
pub mod listing;

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{
    calendar::{month_name, PeriodMarker},
    currency::Amount,
    plan::{FinancialConfiguration, Period},
};

pub use listing::{filter_periods, PeriodListing, TransactionFilter};

/// One point of the debt trend chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DebtPoint {
    pub date: PeriodMarker,
    pub label: String,
    pub total_debt: Amount,
    pub goals_remaining: Amount,
}

/// One point of the cumulative savings chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavingsPoint {
    pub date: PeriodMarker,
    pub label: String,
    pub cumulative: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlySavings {
    pub year: i32,
    pub month: u32,
    pub name: &'static str,
    pub amount: Amount,
}

/// Headline figures for a projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanSummary {
    pub final_total_debt: Amount,
    pub final_goals_remaining: Amount,
    pub total_savings: Amount,
    /// First period after which every debt is settled.
    pub debt_free_at: Option<PeriodMarker>,
    pub settled_at: BTreeMap<String, Option<PeriodMarker>>,
    pub goals_paid_at: BTreeMap<String, Option<PeriodMarker>>,
    /// Goals whose window closed with an unpaid balance.
    pub lapsed_goals: Vec<String>,
    pub shortfall_periods: Vec<PeriodMarker>,
}

pub fn debt_series(periods: &[Period]) -> Vec<DebtPoint> {
    periods
        .iter()
        .map(|period| DebtPoint {
            date: period.date,
            label: period.date.label(),
            total_debt: period.total_debt(),
            goals_remaining: period.total_goal_remaining(),
        })
        .collect()
}

/// Running sum of each period's savings transactions.
pub fn cumulative_savings(periods: &[Period]) -> Vec<SavingsPoint> {
    periods
        .iter()
        .scan(0, |running: &mut Amount, period| {
            *running += period.savings();
            Some(SavingsPoint {
                date: period.date,
                label: period.date.label(),
                cumulative: *running,
            })
        })
        .collect()
}

/// Savings grouped by calendar month, in projection order.
pub fn monthly_savings(periods: &[Period]) -> Vec<MonthlySavings> {
    let mut grouped: Vec<MonthlySavings> = Vec::new();
    for period in periods {
        let (year, month) = (period.date.year, period.date.month);
        match grouped.last_mut() {
            Some(last) if last.year == year && last.month == month => {
                last.amount += period.savings();
            }
            _ => grouped.push(MonthlySavings {
                year,
                month,
                name: month_name(month),
                amount: period.savings(),
            }),
        }
    }
    grouped
}

pub fn summarize(config: &FinancialConfiguration, periods: &[Period]) -> PlanSummary {
    let last = periods.last();

    let settled_at = config
        .debts
        .iter()
        .map(|debt| {
            let settled =
                first_period_where(periods, |period| period.debt_balance(&debt.id) == Some(0));
            (debt.id.clone(), settled)
        })
        .collect();

    let goals_paid_at = config
        .goals
        .iter()
        .map(|goal| {
            let paid =
                first_period_where(periods, |period| period.goal_balance(&goal.id) == Some(0));
            (goal.id.clone(), paid)
        })
        .collect();

    let lapsed_goals = match last {
        Some(last) => config
            .goals
            .iter()
            .filter(|goal| goal.window.is_some_and(|window| window.end < last.date))
            .filter(|goal| last.goal_balance(&goal.id).unwrap_or(0) > 0)
            .map(|goal| goal.id.clone())
            .collect(),
        None => Vec::new(),
    };

    PlanSummary {
        final_total_debt: last.map_or(config.total_initial_debt(), Period::total_debt),
        final_goals_remaining: last.map_or(0, Period::total_goal_remaining),
        total_savings: periods.iter().map(Period::savings).sum(),
        debt_free_at: first_period_where(periods, |period| period.total_debt() == 0),
        settled_at,
        goals_paid_at,
        lapsed_goals,
        shortfall_periods: periods
            .iter()
            .filter(|period| period.shortfall > 0)
            .map(|period| period.date)
            .collect(),
    }
}

fn first_period_where(
    periods: &[Period],
    predicate: impl Fn(&Period) -> bool,
) -> Option<PeriodMarker> {
    periods
        .iter()
        .find(|period| predicate(*period))
        .map(|period| period.date)
}
