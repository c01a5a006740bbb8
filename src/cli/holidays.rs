//! decomp holidays command implementation
//!
//! Lists the configured non-working dates so a deployment can verify its
//! calendar before trusting end-date math for a new year.

use std::path::PathBuf;

use crate::calendar::WorkdayCalendar;
use crate::error::Result;
use crate::output::{emit_success, HumanOutput, OutputOptions};

/// Options for the holidays command
pub struct HolidaysOptions {
    pub config: Option<PathBuf>,
    pub output: OutputOptions,
}

#[derive(serde::Serialize)]
struct HolidaysReport {
    holidays: Vec<String>,
}

pub fn run(options: HolidaysOptions) -> Result<()> {
    let config = super::load_config(options.config.as_ref())?;
    let calendar = WorkdayCalendar::from_config(&config.calendar)?;

    let holidays: Vec<String> = calendar
        .holidays()
        .map(|date| date.format("%Y-%m-%d").to_string())
        .collect();

    let mut human = HumanOutput::new(format!("{} non-working dates", holidays.len()));
    for holiday in &holidays {
        human.push_detail(holiday.clone());
    }
    if config.calendar.holidays.is_none() {
        human.push_warning(
            "using the built-in 2025 table; set [calendar] holidays in .decomp.toml for other years",
        );
    }

    let report = HolidaysReport { holidays };
    emit_success(options.output, "holidays", &report, Some(&human))
}
