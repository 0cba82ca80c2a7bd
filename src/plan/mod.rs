//! Engine input (the financial configuration) and output (periods and their ledgers).

pub mod config;
pub mod period;
pub mod validation;

pub use config::{
    Debt, ExpenseSchedule, FinancialConfiguration, FixedExpense, GoalWindow, MinimumInstallment,
    OneTimeGoal, PaydownRule,
};
pub use period::{Period, Transaction, TransactionKind};
pub use validation::validate;
