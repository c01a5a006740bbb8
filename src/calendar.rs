//! Working-day calendar.
//!
//! A working day is a calendar day that is not a Saturday/Sunday and not
//! in the holiday set. The holiday table is deployment configuration
//! (`[calendar] holidays` in `.decomp.toml`) because it has to be
//! refreshed every year; the built-in default carries the 2025 table.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate, Weekday};

use crate::config::CalendarConfig;
use crate::error::{Error, Result};

/// Built-in non-working dates for 2025, used when the config does not
/// supply a holiday list.
const DEFAULT_HOLIDAYS_2025: &[&str] = &[
    "2025-01-01", "2025-01-02", "2025-01-03", "2025-01-04",
    "2025-01-05", "2025-01-06", "2025-01-07", "2025-01-08",
    "2025-02-22", "2025-02-23",
    "2025-03-08", "2025-03-09",
    "2025-05-01", "2025-05-02", "2025-05-03", "2025-05-04",
    "2025-05-08", "2025-05-09", "2025-05-10", "2025-05-11",
    "2025-06-12", "2025-06-13", "2025-06-14", "2025-06-15",
    "2025-11-02", "2025-11-03", "2025-11-04",
    "2025-12-31",
];

/// Fixed set of non-working dates plus the weekend rule.
#[derive(Debug, Clone)]
pub struct WorkdayCalendar {
    holidays: BTreeSet<NaiveDate>,
}

impl WorkdayCalendar {
    /// Calendar with the built-in 2025 holiday table.
    pub fn default_2025() -> Self {
        let holidays = DEFAULT_HOLIDAYS_2025
            .iter()
            .map(|raw| {
                NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .expect("built-in holiday table is well-formed")
            })
            .collect();
        Self { holidays }
    }

    /// Calendar with an explicit holiday set.
    pub fn new(holidays: BTreeSet<NaiveDate>) -> Self {
        Self { holidays }
    }

    /// Build a calendar from deployment configuration, falling back to the
    /// built-in table when no list is configured.
    pub fn from_config(config: &CalendarConfig) -> Result<Self> {
        let Some(raw_dates) = &config.holidays else {
            return Ok(Self::default_2025());
        };

        let mut holidays = BTreeSet::new();
        for raw in raw_dates {
            let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                .map_err(|_| {
                    Error::InvalidConfig(format!("bad holiday date '{raw}' (expected YYYY-MM-DD)"))
                })?;
            holidays.insert(date);
        }
        Ok(Self { holidays })
    }

    /// Whether work is counted on this date.
    pub fn is_working_day(&self, date: NaiveDate) -> bool {
        if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            return false;
        }
        !self.holidays.contains(&date)
    }

    /// Configured non-working dates, in order.
    pub fn holidays(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.holidays.iter().copied()
    }
}
