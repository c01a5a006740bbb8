//! Scheduling calculator.
//!
//! Pure functions turning a task list and a start date into a project
//! timeline: total working days, story points, a risk buffer sized by a
//! fixed bracket table, the resulting end date, and a per-team day
//! distribution. No I/O, no state; safe to call concurrently.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::calendar::WorkdayCalendar;
use crate::task::Task;

/// Derived schedule for one portfolio. Never persisted; recomputed on
/// every change to the task list or start date.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleResult {
    /// Critical-path working days: sequential tasks summed, each parallel
    /// group contributing its longest member
    pub total_days: u32,

    /// `total_days / 2`, rounded half up
    pub story_points: u32,

    /// Contingency buffer from the risk bracket table
    pub risk_days: u32,

    pub total_with_risks: u32,

    pub end_date: NaiveDate,

    /// Per-team sum of days over all tasks, independent of grouping
    pub team_distribution: BTreeMap<String, u32>,
}

/// Risk buffer for a given number of total working days.
///
/// The brackets are deliberate, including the lone totalDays=2 entry that
/// sits outside the 3..=7 bracket; totals of 0 or 1 carry no buffer.
pub fn risk_days(total_days: u32) -> u32 {
    match total_days {
        2 => 1,
        3..=7 => 2,
        8..=12 => 3,
        13..=17 => 4,
        18..=22 => 5,
        23..=27 => 6,
        28..=30 => 7,
        31.. => 7,
        _ => 0,
    }
}

/// Story points for a day total: half the days, rounded half up.
pub fn story_points(total_days: u32) -> u32 {
    (total_days + 1) / 2
}

/// Walk the calendar from `start_date` until `required_days` working days
/// have been counted, the start date itself included when it is a working
/// day. Returns the last counted date; zero required days return the
/// start date unchanged.
pub fn end_date(
    start_date: NaiveDate,
    required_days: u32,
    calendar: &WorkdayCalendar,
) -> NaiveDate {
    if required_days == 0 {
        return start_date;
    }

    let mut current = start_date;
    let mut counted = if calendar.is_working_day(current) { 1 } else { 0 };

    while counted < required_days {
        current += Duration::days(1);
        if calendar.is_working_day(current) {
            counted += 1;
        }
    }

    current
}

/// Compute the full schedule for a task list.
pub fn compute_schedule(
    tasks: &[Task],
    start_date: NaiveDate,
    calendar: &WorkdayCalendar,
) -> ScheduleResult {
    let mut sequential_days: u32 = 0;
    let mut group_max: BTreeMap<&str, u32> = BTreeMap::new();
    let mut team_distribution: BTreeMap<String, u32> = BTreeMap::new();

    for task in tasks {
        match task.group_label() {
            Some(label) => {
                let max = group_max.entry(label).or_insert(0);
                *max = (*max).max(task.days);
            }
            None => sequential_days += task.days,
        }

        *team_distribution.entry(task.team.clone()).or_insert(0) += task.days;
    }

    let total_days = sequential_days + group_max.values().sum::<u32>();
    let risk_days = risk_days(total_days);
    let total_with_risks = total_days + risk_days;

    ScheduleResult {
        total_days,
        story_points: story_points(total_days),
        risk_days,
        total_with_risks,
        end_date: end_date(start_date, total_with_risks, calendar),
        team_distribution,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use uuid::Uuid;

    fn task(team: &str, days: u32, group: Option<&str>) -> Task {
        Task {
            id: Uuid::new_v4(),
            title: format!("{team}-{days}"),
            description: String::new(),
            team: team.to_string(),
            days,
            parallel_group: group.map(str::to_string),
            order_index: 0,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn empty_calendar() -> WorkdayCalendar {
        WorkdayCalendar::new(BTreeSet::new())
    }

    #[test]
    fn sequential_tasks_sum() {
        let tasks = vec![
            task("backend", 3, None),
            task("frontend", 4, None),
            task("qa", 1, None),
        ];
        let result = compute_schedule(&tasks, date(2025, 8, 4), &empty_calendar());
        assert_eq!(result.total_days, 8);
    }

    #[test]
    fn parallel_group_contributes_its_max() {
        let tasks = vec![
            task("backend", 3, Some("wave-1")),
            task("frontend", 5, Some("wave-1")),
            task("qa", 2, Some("wave-1")),
        ];
        let result = compute_schedule(&tasks, date(2025, 8, 4), &empty_calendar());
        assert_eq!(result.total_days, 5);

        // The resource view still sums every task under its own team.
        assert_eq!(result.team_distribution["backend"], 3);
        assert_eq!(result.team_distribution["frontend"], 5);
        assert_eq!(result.team_distribution["qa"], 2);
    }

    #[test]
    fn whitespace_group_label_counts_as_sequential() {
        let tasks = vec![task("backend", 3, Some("  ")), task("backend", 4, None)];
        let result = compute_schedule(&tasks, date(2025, 8, 4), &empty_calendar());
        assert_eq!(result.total_days, 7);
    }

    #[test]
    fn risk_bracket_boundaries_are_exact() {
        assert_eq!(risk_days(0), 0);
        assert_eq!(risk_days(1), 0);
        assert_eq!(risk_days(2), 1);
        assert_eq!(risk_days(3), 2);
        assert_eq!(risk_days(7), 2);
        assert_eq!(risk_days(8), 3);
        assert_eq!(risk_days(12), 3);
        assert_eq!(risk_days(13), 4);
        assert_eq!(risk_days(17), 4);
        assert_eq!(risk_days(18), 5);
        assert_eq!(risk_days(22), 5);
        assert_eq!(risk_days(23), 6);
        assert_eq!(risk_days(27), 6);
        assert_eq!(risk_days(28), 7);
        assert_eq!(risk_days(30), 7);
        assert_eq!(risk_days(31), 7);
        assert_eq!(risk_days(1000), 7);
    }

    #[test]
    fn story_points_round_half_up() {
        assert_eq!(story_points(0), 0);
        assert_eq!(story_points(1), 1);
        assert_eq!(story_points(2), 1);
        assert_eq!(story_points(3), 2);
        assert_eq!(story_points(7), 4);
    }

    #[test]
    fn end_date_counts_start_and_skips_weekends() {
        // 2025-08-01 is a Friday; two working days land on Monday.
        let end = end_date(date(2025, 8, 1), 2, &empty_calendar());
        assert_eq!(end, date(2025, 8, 4));
    }

    #[test]
    fn end_date_skips_holidays() {
        let mut holidays = BTreeSet::new();
        holidays.insert(date(2025, 8, 4)); // the Monday
        let calendar = WorkdayCalendar::new(holidays);
        let end = end_date(date(2025, 8, 1), 2, &calendar);
        assert_eq!(end, date(2025, 8, 5));
    }

    #[test]
    fn non_working_start_date_is_not_counted() {
        // Saturday start; 1 working day lands on Monday.
        let end = end_date(date(2025, 8, 2), 1, &empty_calendar());
        assert_eq!(end, date(2025, 8, 4));
    }

    #[test]
    fn empty_task_list_yields_zero_totals() {
        let result = compute_schedule(&[], date(2025, 8, 4), &empty_calendar());
        assert_eq!(result.total_days, 0);
        assert_eq!(result.risk_days, 0);
        assert_eq!(result.total_with_risks, 0);
        assert_eq!(result.story_points, 0);
        assert_eq!(result.end_date, date(2025, 8, 4));
        assert!(result.team_distribution.is_empty());
    }

    #[test]
    fn calculation_is_idempotent() {
        let tasks = vec![
            task("backend", 3, None),
            task("frontend", 5, Some("wave-1")),
            task("qa", 2, Some("wave-1")),
        ];
        let first = compute_schedule(&tasks, date(2025, 8, 4), &empty_calendar());
        let second = compute_schedule(&tasks, date(2025, 8, 4), &empty_calendar());
        assert_eq!(first.total_days, second.total_days);
        assert_eq!(first.end_date, second.end_date);
        assert_eq!(first.team_distribution, second.team_distribution);
    }

    #[test]
    fn mixed_sequential_and_grouped() {
        // 3 + 4 sequential, group max(5, 2) = 5 => 12 total, risk 3.
        let tasks = vec![
            task("backend", 3, None),
            task("frontend", 4, None),
            task("backend", 5, Some("wave-1")),
            task("qa", 2, Some("wave-1")),
        ];
        let result = compute_schedule(&tasks, date(2025, 8, 4), &empty_calendar());
        assert_eq!(result.total_days, 12);
        assert_eq!(result.risk_days, 3);
        assert_eq!(result.total_with_risks, 15);
        assert_eq!(result.team_distribution["backend"], 8);
    }
}
