use colored::{ColoredString, Colorize};
use std::fmt;

use crate::plan::{Transaction, TransactionKind};

/// Message categories used by the CLI output helpers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Warning,
    Error,
    Section,
}

fn build_label(kind: MessageKind) -> &'static str {
    match kind {
        MessageKind::Info => "[i]",
        MessageKind::Success => "[ok]",
        MessageKind::Warning => "[!]",
        MessageKind::Error => "[x]",
        MessageKind::Section => "",
    }
}

fn apply_style(kind: MessageKind, message: impl fmt::Display) -> String {
    let text = message.to_string();
    match kind {
        MessageKind::Section => format!("=== {} ===", text.trim()).bold().to_string(),
        MessageKind::Info => format!("{} {}", build_label(kind), text),
        MessageKind::Success => format!("{} {}", build_label(kind), text)
            .bright_green()
            .to_string(),
        MessageKind::Warning => format!("{} {}", build_label(kind), text)
            .bright_yellow()
            .to_string(),
        MessageKind::Error => format!("{} {}", build_label(kind), text)
            .bright_red()
            .to_string(),
    }
}

pub fn print(kind: MessageKind, message: impl fmt::Display) {
    let formatted = apply_style(kind, message);
    match kind {
        MessageKind::Section => println!("\n{formatted}"),
        MessageKind::Warning | MessageKind::Error => eprintln!("{formatted}"),
        _ => println!("{formatted}"),
    }
}

pub fn info(message: impl fmt::Display) {
    print(MessageKind::Info, message);
}

pub fn success(message: impl fmt::Display) {
    print(MessageKind::Success, message);
}

pub fn warning(message: impl fmt::Display) {
    print(MessageKind::Warning, message);
}

pub fn section(title: impl fmt::Display) {
    print(MessageKind::Section, title);
}

/// Colors a transaction's kind tag; critical rows are always red.
pub fn kind_tag(txn: &Transaction) -> ColoredString {
    let tag = txn.kind.as_str();
    if txn.critical {
        return tag.bright_red();
    }
    match txn.kind {
        TransactionKind::Income | TransactionKind::SurplusSavings => tag.bright_green(),
        TransactionKind::PriorityGoal => tag.bright_magenta(),
        TransactionKind::DebtMinimum => tag.yellow(),
        TransactionKind::DebtPaydown => tag.bright_blue(),
        TransactionKind::FixedExpense => tag.normal(),
    }
}
