#![doc(test(attr(deny(warnings))))]

//! Quincena Core projects a household's cash position across half-month pay
//! periods (day 5 and day 20) and allocates each period's income across fixed
//! expenses, priority goals, debt installments and discretionary paydown.

pub mod calendar;
pub mod cli;
pub mod config;
pub mod currency;
pub mod errors;
pub mod plan;
pub mod reporting;
pub mod simulation;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Quincena Core tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
    }
}
