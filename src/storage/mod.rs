//! Profiles on disk: the JSON store, the data-root layout and share codes.

pub mod json_backend;
pub mod paths;
pub mod share;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    calendar::{PayDay, PeriodMarker},
    errors::Result,
    plan::FinancialConfiguration,
};

/// Number of periods projected when nothing else is configured: January to June.
pub const DEFAULT_PERIODS: usize = 12;

/// Everything the engine needs to produce a projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub start: PeriodMarker,
    pub periods: usize,
    pub configuration: FinancialConfiguration,
}

impl Profile {
    pub fn new(
        name: impl Into<String>,
        start: PeriodMarker,
        periods: usize,
        configuration: FinancialConfiguration,
    ) -> Self {
        Self {
            name: name.into(),
            start,
            periods,
            configuration,
        }
    }
}

impl Default for Profile {
    fn default() -> Self {
        let start = PeriodMarker {
            year: 2026,
            month: 0,
            day: PayDay::Fifth,
        };
        Self::new(
            "Plan Quincenal",
            start,
            DEFAULT_PERIODS,
            FinancialConfiguration::default(),
        )
    }
}

/// Persistence backend for named profiles and their snapshots.
pub trait ProfileStore: Send + Sync {
    fn save(&self, profile: &Profile, name: &str) -> Result<()>;
    fn load(&self, name: &str) -> Result<Profile>;
    fn list(&self) -> Result<Vec<String>>;
    fn list_backups(&self, name: &str) -> Result<Vec<String>>;
    fn backup(&self, profile: &Profile, name: &str, note: Option<&str>) -> Result<String>;
    fn restore(&self, name: &str, backup_name: &str) -> Result<Profile>;

    /// Ad-hoc file access outside the managed directories.
    fn save_to_path(&self, profile: &Profile, path: &Path) -> Result<()> {
        json_backend::save_profile_to_path(profile, path)
    }

    fn load_from_path(&self, path: &Path) -> Result<Profile> {
        json_backend::load_profile_from_path(path)
    }
}

pub use json_backend::{
    load_profile_from_path, load_profile_or_default, save_profile_to_path, JsonStorage,
};
pub use paths::{app_data_dir, ensure_dir, PathResolver};
