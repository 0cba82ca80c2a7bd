//! Text reports for the projection commands.

use crate::{
    currency::{format_amount, format_millions, LocaleConfig},
    plan::{FinancialConfiguration, Period, Transaction},
    reporting::{debt_series, monthly_savings, PeriodListing, PlanSummary},
};

use super::{
    output,
    table::{Table, TableColumn},
};

fn when(marker: Option<impl ToString>) -> String {
    marker.map_or_else(|| "-".to_string(), |m| m.to_string())
}

pub fn summary_table(summary: &PlanSummary, locale: &LocaleConfig) -> String {
    let mut table = Table::new(vec![TableColumn::left("Metric"), TableColumn::right("Value")]);
    table.row(vec![
        "Final debt".into(),
        format_amount(summary.final_total_debt, locale),
    ]);
    table.row(vec![
        "Goals remaining".into(),
        format_amount(summary.final_goals_remaining, locale),
    ]);
    table.row(vec![
        "Total savings".into(),
        format_amount(summary.total_savings, locale),
    ]);
    table.row(vec!["Debt free at".into(), when(summary.debt_free_at)]);
    table.render()
}

pub fn debts_table(
    config: &FinancialConfiguration,
    summary: &PlanSummary,
    locale: &LocaleConfig,
) -> String {
    let mut table = Table::new(vec![
        TableColumn::left("Debt"),
        TableColumn::right("Balance"),
        TableColumn::right("Settled"),
    ]);
    for debt in &config.debts {
        let settled = summary.settled_at.get(&debt.id).copied().flatten();
        table.row(vec![
            debt.name.clone(),
            format_amount(debt.balance, locale),
            when(settled),
        ]);
    }
    table.render()
}

pub fn goals_table(
    config: &FinancialConfiguration,
    summary: &PlanSummary,
    locale: &LocaleConfig,
) -> String {
    let mut table = Table::new(vec![
        TableColumn::left("Goal"),
        TableColumn::right("Outstanding"),
        TableColumn::right("Paid"),
    ]);
    for goal in &config.goals {
        let paid = summary.goals_paid_at.get(&goal.id).copied().flatten();
        table.row(vec![
            goal.name.clone(),
            format_amount(goal.outstanding(), locale),
            when(paid),
        ]);
    }
    table.render()
}

/// Compact per-period figures, in millions.
pub fn trend_table(periods: &[Period]) -> String {
    let mut table = Table::new(vec![
        TableColumn::left("Period"),
        TableColumn::right("Total debt"),
        TableColumn::right("Goals left"),
    ]);
    for point in debt_series(periods) {
        table.row(vec![
            point.label,
            format_millions(point.total_debt),
            format_millions(point.goals_remaining),
        ]);
    }
    table.render()
}

pub fn savings_table(periods: &[Period], locale: &LocaleConfig) -> String {
    let mut table = Table::new(vec![TableColumn::left("Month"), TableColumn::right("Savings")]);
    for month in monthly_savings(periods) {
        table.row(vec![
            format!("{} {}", month.name, month.year),
            format_amount(month.amount, locale),
        ]);
    }
    table.render()
}

fn transaction_table<'a>(
    transactions: impl Iterator<Item = &'a Transaction>,
    locale: &LocaleConfig,
) -> String {
    let mut table = Table::new(vec![
        TableColumn::left("Kind"),
        TableColumn::left("Concept").max_width(32),
        TableColumn::right("Amount"),
    ]);
    for txn in transactions {
        table.row(vec![
            output::kind_tag(txn).to_string(),
            txn.label.clone(),
            format_amount(txn.amount, locale),
        ]);
    }
    table.render()
}

/// One period split into obligations and strategy, followed by its closing figures.
pub fn period_table(period: &Period, locale: &LocaleConfig) -> String {
    let mut text = format!("Income {}", format_amount(period.income, locale));
    text.push_str("\n\nObligations\n");
    text.push_str(&transaction_table(period.obligations(), locale));
    if period.strategy().next().is_some() {
        text.push_str("\n\nStrategy\n");
        text.push_str(&transaction_table(period.strategy(), locale));
    }
    text.push_str(&format!(
        "\n\nEnding cash {}  |  Debt after {}",
        format_amount(period.ending_cash_balance, locale),
        format_amount(period.total_debt(), locale)
    ));
    if period.shortfall > 0 {
        text.push_str(&format!(
            "\nShortfall {}",
            format_amount(period.shortfall, locale)
        ));
    }
    text
}

pub fn listing_table(listing: &PeriodListing<'_>, locale: &LocaleConfig) -> String {
    format!(
        "{}\nIn {}  |  Out {}",
        transaction_table(listing.transactions.iter().copied(), locale),
        format_amount(listing.income, locale),
        format_amount(listing.expenses, locale)
    )
}
