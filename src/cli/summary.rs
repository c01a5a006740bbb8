//! decomp summary command implementation
//!
//! Renders the shareable Jira-style report for a portfolio file. The
//! markup goes to stdout verbatim so it can be piped or pasted into an
//! issue tracker.

use std::path::PathBuf;

use crate::calendar::WorkdayCalendar;
use crate::error::Result;
use crate::portfolio::Portfolio;
use crate::schedule::compute_schedule;
use crate::summary::render_summary;

/// Options for the summary command
pub struct SummaryOptions {
    pub config: Option<PathBuf>,
    pub portfolio: PathBuf,
    pub start_date: Option<String>,
}

pub fn run(options: SummaryOptions) -> Result<()> {
    let config = super::load_config(options.config.as_ref())?;
    let calendar = WorkdayCalendar::from_config(&config.calendar)?;

    let portfolio = Portfolio::load(&options.portfolio)?;
    let start_date = match options.start_date.as_deref() {
        Some(raw) => Portfolio::parse_start_date(raw)?,
        None => portfolio.start_date,
    };

    let result = compute_schedule(&portfolio.tasks, start_date, &calendar);
    let report = render_summary(&portfolio.name, &portfolio.tasks, &result, start_date);

    print!("{report}");
    Ok(())
}
