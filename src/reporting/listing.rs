use serde::Serialize;

use crate::{
    calendar::PeriodMarker,
    currency::Amount,
    plan::{Period, Transaction, TransactionKind},
};

/// Search and kind filter for the transaction explorer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    /// Case-insensitive substring matched against the label.
    pub search: Option<String>,
    pub kind: Option<TransactionKind>,
}

impl TransactionFilter {
    pub fn search(mut self, term: impl Into<String>) -> Self {
        let term = term.into();
        self.search = if term.trim().is_empty() {
            None
        } else {
            Some(term.to_lowercase())
        };
        self
    }

    pub fn kind(mut self, kind: TransactionKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn matches(&self, txn: &Transaction) -> bool {
        let kind_ok = self.kind.map_or(true, |kind| txn.kind == kind);
        let search_ok = self.search.as_ref().map_or(true, |term| {
            txn.label.to_lowercase().contains(term.to_lowercase().as_str())
        });
        kind_ok && search_ok
    }
}

/// A period with only the transactions that passed the filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodListing<'a> {
    pub date: PeriodMarker,
    pub title: &'static str,
    pub transactions: Vec<&'a Transaction>,
    /// Income among the visible transactions.
    pub income: Amount,
    /// Everything else among the visible transactions.
    pub expenses: Amount,
}

/// Groups matching transactions by period, dropping periods with nothing to show.
pub fn filter_periods<'a>(periods: &'a [Period], filter: &TransactionFilter) -> Vec<PeriodListing<'a>> {
    periods
        .iter()
        .filter_map(|period| {
            let transactions: Vec<&Transaction> = period
                .transactions
                .iter()
                .filter(|txn| filter.matches(txn))
                .collect();
            if transactions.is_empty() {
                return None;
            }
            let (income, expenses) =
                transactions
                    .iter()
                    .fold((0, 0), |(income, expenses), txn| match txn.kind {
                        TransactionKind::Income => (income + txn.amount, expenses),
                        _ => (income, expenses + txn.amount),
                    });
            Some(PeriodListing {
                date: period.date,
                title: period.date.day.title(),
                transactions,
                income,
                expenses,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn txn(kind: TransactionKind, label: &str, amount: Amount) -> Transaction {
        Transaction {
            kind,
            label: label.into(),
            amount,
            critical: false,
            subject: None,
        }
    }

    #[test]
    fn search_is_case_insensitive() {
        let filter = TransactionFilter::default().search("ARRIENDO");
        assert!(filter.matches(&txn(TransactionKind::FixedExpense, "Arriendo", 1)));
        assert!(!filter.matches(&txn(TransactionKind::FixedExpense, "Internet", 1)));
    }

    #[test]
    fn blank_search_matches_everything() {
        let filter = TransactionFilter::default().search("   ");
        assert_eq!(filter.search, None);
        assert!(filter.matches(&txn(TransactionKind::Income, "Nómina", 1)));
    }

    #[test]
    fn kind_and_search_combine() {
        let filter = TransactionFilter::default()
            .kind(TransactionKind::DebtPaydown)
            .search("nu");
        assert!(filter.matches(&txn(TransactionKind::DebtPaydown, "Capital NU", 1)));
        assert!(!filter.matches(&txn(TransactionKind::DebtMinimum, "Capital NU", 1)));
    }
}
