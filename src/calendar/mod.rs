//! Half-month pay period calendar: every month has a period on day 5 and one on day 20.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::PlanError;

const MONTH_NAMES: [&str; 12] = [
    "Ene", "Feb", "Mar", "Abr", "May", "Jun", "Jul", "Ago", "Sep", "Oct", "Nov", "Dic",
];

/// The two pay days of every month. Serialized as the plain day numbers `5` and `20`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum PayDay {
    Fifth,
    Twentieth,
}

impl PayDay {
    pub fn day_of_month(self) -> u32 {
        match self {
            PayDay::Fifth => 5,
            PayDay::Twentieth => 20,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            PayDay::Fifth => "Primera Quincena",
            PayDay::Twentieth => "Segunda Quincena",
        }
    }
}

impl TryFrom<u32> for PayDay {
    type Error = String;

    fn try_from(day: u32) -> Result<Self, Self::Error> {
        match day {
            5 => Ok(PayDay::Fifth),
            20 => Ok(PayDay::Twentieth),
            other => Err(format!("pay day must be 5 or 20, got {other}")),
        }
    }
}

impl From<PayDay> for u32 {
    fn from(day: PayDay) -> Self {
        day.day_of_month()
    }
}

impl fmt::Display for PayDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.day_of_month())
    }
}

#[derive(Deserialize)]
struct RawMarker {
    day: PayDay,
    month: u32,
    year: i32,
}

/// Identifies one pay period. `month` is zero based (0 = January).
///
/// Field order makes the derived ordering chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawMarker")]
pub struct PeriodMarker {
    pub year: i32,
    pub month: u32,
    pub day: PayDay,
}

impl TryFrom<RawMarker> for PeriodMarker {
    type Error = PlanError;

    fn try_from(raw: RawMarker) -> Result<Self, Self::Error> {
        PeriodMarker::new(raw.day, raw.month, raw.year)
    }
}

impl PeriodMarker {
    pub fn new(day: PayDay, month: u32, year: i32) -> Result<Self, PlanError> {
        if month > 11 {
            return Err(PlanError::InvalidInput(format!(
                "month must be between 0 and 11, got {month}"
            )));
        }
        Ok(Self { year, month, day })
    }

    /// First period of the given month.
    pub fn first_of(month: u32, year: i32) -> Result<Self, PlanError> {
        Self::new(PayDay::Fifth, month, year)
    }

    /// Last period of the given month.
    pub fn last_of(month: u32, year: i32) -> Result<Self, PlanError> {
        Self::new(PayDay::Twentieth, month, year)
    }

    /// The following period: day 5 moves to day 20, day 20 rolls to day 5 of the next month.
    pub fn next(self) -> Self {
        match self.day {
            PayDay::Fifth => Self {
                day: PayDay::Twentieth,
                ..self
            },
            PayDay::Twentieth if self.month == 11 => Self {
                year: self.year + 1,
                month: 0,
                day: PayDay::Fifth,
            },
            PayDay::Twentieth => Self {
                month: self.month + 1,
                day: PayDay::Fifth,
                ..self
            },
        }
    }

    pub fn month_name(&self) -> &'static str {
        month_name(self.month)
    }

    /// Short display label such as `5 Ene`.
    pub fn label(&self) -> String {
        format!("{} {}", self.day, self.month_name())
    }

    pub fn to_naive_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month + 1, self.day.day_of_month())
    }
}

impl fmt::Display for PeriodMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.day, self.month_name(), self.year)
    }
}

/// Short Spanish month name for a zero-based month index.
pub fn month_name(month: u32) -> &'static str {
    MONTH_NAMES.get(month as usize).copied().unwrap_or("")
}

/// Produces `count` consecutive pay periods starting at (and including) `start`.
pub fn sequence(start: PeriodMarker, count: usize) -> Vec<PeriodMarker> {
    std::iter::successors(Some(start), |marker| Some(marker.next()))
        .take(count)
        .collect()
}
