//! decomp calc command implementation
//!
//! Computes the schedule for a portfolio file and prints the result.

use std::path::PathBuf;

use crate::calendar::WorkdayCalendar;
use crate::error::Result;
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::portfolio::Portfolio;
use crate::schedule::compute_schedule;

/// Options for the calc command
pub struct CalcOptions {
    pub config: Option<PathBuf>,
    pub portfolio: PathBuf,
    pub start_date: Option<String>,
    pub output: OutputOptions,
}

pub fn run(options: CalcOptions) -> Result<()> {
    let config = super::load_config(options.config.as_ref())?;
    let calendar = WorkdayCalendar::from_config(&config.calendar)?;

    let portfolio = Portfolio::load(&options.portfolio)?;
    let start_date = match options.start_date.as_deref() {
        Some(raw) => Portfolio::parse_start_date(raw)?,
        None => portfolio.start_date,
    };

    let result = compute_schedule(&portfolio.tasks, start_date, &calendar);

    let mut human = HumanOutput::new(format!("Schedule for {}", portfolio.name));
    human.push_summary("Start date", start_date.format("%Y-%m-%d").to_string());
    human.push_summary("End date", result.end_date.format("%Y-%m-%d").to_string());
    human.push_summary("Development days", result.total_days.to_string());
    human.push_summary("Risk days", format!("+{}", result.risk_days));
    human.push_summary("Total duration", format!("{} d.", result.total_with_risks));
    human.push_summary("Story points", result.story_points.to_string());
    for (team, days) in &result.team_distribution {
        human.push_detail(format!("{team}: {days} d."));
    }
    if portfolio.tasks.is_empty() {
        human.push_warning("portfolio has no tasks; totals are zero".to_string());
    }

    emit_success(options.output, "calc", &result, Some(&human))
}
