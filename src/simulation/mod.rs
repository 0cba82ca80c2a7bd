//! The allocation engine: a left fold over pay periods threading debt and goal balances.

pub mod engine;

pub use engine::{estimated_interest, principal_component, SimulationEngine, SimulationState};

use crate::{
    calendar::{self, PeriodMarker},
    errors::Result,
    plan::{FinancialConfiguration, Period},
};

/// Convenience wrapper: simulate `count` periods starting at `start`.
pub fn simulate(
    config: &FinancialConfiguration,
    start: PeriodMarker,
    count: usize,
) -> Result<Vec<Period>> {
    SimulationEngine::run(config, &calendar::sequence(start, count))
}
