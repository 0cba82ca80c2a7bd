use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{calendar::PeriodMarker, currency::Amount};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransactionKind {
    Income,
    FixedExpense,
    PriorityGoal,
    DebtMinimum,
    DebtPaydown,
    SurplusSavings,
}

impl TransactionKind {
    pub const ALL: [TransactionKind; 6] = [
        TransactionKind::Income,
        TransactionKind::FixedExpense,
        TransactionKind::PriorityGoal,
        TransactionKind::DebtMinimum,
        TransactionKind::DebtPaydown,
        TransactionKind::SurplusSavings,
    ];

    /// Wire name, e.g. `debt-minimum`.
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::FixedExpense => "fixed-expense",
            TransactionKind::PriorityGoal => "priority-goal",
            TransactionKind::DebtMinimum => "debt-minimum",
            TransactionKind::DebtPaydown => "debt-paydown",
            TransactionKind::SurplusSavings => "surplus-savings",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
    }

    /// Money leaving the period's cash: everything except income and the residual.
    pub fn is_outflow(self) -> bool {
        !matches!(self, TransactionKind::Income | TransactionKind::SurplusSavings)
    }

    /// Commitments of the period, as opposed to the paydown strategy.
    pub fn is_obligation(self) -> bool {
        matches!(
            self,
            TransactionKind::FixedExpense | TransactionKind::PriorityGoal | TransactionKind::DebtMinimum
        )
    }

    pub fn is_strategy(self) -> bool {
        matches!(
            self,
            TransactionKind::DebtPaydown | TransactionKind::SurplusSavings
        )
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One movement recorded by the engine. `amount` is always positive; direction follows `kind`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub kind: TransactionKind,
    pub label: String,
    pub amount: Amount,
    #[serde(default)]
    pub critical: bool,
    /// Id of the debt or goal this movement touches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

/// Result of simulating one pay period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub date: PeriodMarker,
    pub income: Amount,
    pub transactions: Vec<Transaction>,
    pub ending_cash_balance: Amount,
    /// Deficit left uncovered when fixed expenses exceed the period's income.
    #[serde(default)]
    pub shortfall: Amount,
    pub debt_balances_after: BTreeMap<String, Amount>,
    pub goal_balances_after: BTreeMap<String, Amount>,
}

impl Period {
    pub fn total_debt(&self) -> Amount {
        self.debt_balances_after.values().sum()
    }

    pub fn total_goal_remaining(&self) -> Amount {
        self.goal_balances_after.values().sum()
    }

    pub fn debt_balance(&self, id: &str) -> Option<Amount> {
        self.debt_balances_after.get(id).copied()
    }

    pub fn goal_balance(&self, id: &str) -> Option<Amount> {
        self.goal_balances_after.get(id).copied()
    }

    pub fn of_kind(&self, kind: TransactionKind) -> impl Iterator<Item = &Transaction> {
        self.transactions.iter().filter(move |txn| txn.kind == kind)
    }

    pub fn savings(&self) -> Amount {
        self.of_kind(TransactionKind::SurplusSavings)
            .map(|txn| txn.amount)
            .sum()
    }

    pub fn outflows(&self) -> Amount {
        self.transactions
            .iter()
            .filter(|txn| txn.kind.is_outflow())
            .map(|txn| txn.amount)
            .sum()
    }

    pub fn obligations(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions.iter().filter(|txn| txn.kind.is_obligation())
    }

    pub fn strategy(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions.iter().filter(|txn| txn.kind.is_strategy())
    }

    /// Transactions that touched the debt or goal `subject`.
    pub fn touching<'a>(&'a self, subject: &'a str) -> impl Iterator<Item = &'a Transaction> {
        self.transactions
            .iter()
            .filter(move |txn| txn.subject.as_deref() == Some(subject))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_use_kebab_case_on_the_wire() {
        let json = serde_json::to_string(&TransactionKind::DebtPaydown).unwrap();
        assert_eq!(json, "\"debt-paydown\"");
        for kind in TransactionKind::ALL {
            assert_eq!(
                serde_json::to_string(&kind).unwrap(),
                format!("\"{}\"", kind.as_str())
            );
        }
    }

    #[test]
    fn parse_accepts_underscores_and_case() {
        assert_eq!(
            TransactionKind::parse("Surplus_Savings"),
            Some(TransactionKind::SurplusSavings)
        );
        assert_eq!(TransactionKind::parse("interest"), None);
    }

    #[test]
    fn outflow_classification() {
        assert!(!TransactionKind::Income.is_outflow());
        assert!(!TransactionKind::SurplusSavings.is_outflow());
        assert!(TransactionKind::DebtMinimum.is_outflow());
        assert!(TransactionKind::DebtMinimum.is_obligation());
        assert!(TransactionKind::DebtPaydown.is_strategy());
    }
}
