//! Summary renderer.
//!
//! Formats a schedule and its task breakdown into a Jira-style text
//! report suitable for pasting into an issue tracker. Pure string
//! production; clipboard/export mechanics belong to the caller.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use chrono::NaiveDate;

use crate::schedule::ScheduleResult;
use crate::task::Task;

/// Render the shareable report for a portfolio.
pub fn render_summary(
    portfolio_name: &str,
    tasks: &[Task],
    result: &ScheduleResult,
    start_date: NaiveDate,
) -> String {
    let mut groups: BTreeMap<&str, Vec<&Task>> = BTreeMap::new();
    let mut sequential: Vec<&Task> = Vec::new();

    for task in tasks {
        match task.group_label() {
            Some(label) => groups.entry(label).or_default().push(task),
            None => sequential.push(task),
        }
    }

    let mut sequential_by_team: BTreeMap<&str, Vec<&Task>> = BTreeMap::new();
    for &task in &sequential {
        sequential_by_team.entry(task.team.as_str()).or_default().push(task);
    }

    let mut out = String::new();
    let _ = writeln!(out, "h1. {portfolio_name}");
    out.push('\n');
    let _ = writeln!(
        out,
        "*Project timeline:* {} - {}",
        format_date(start_date),
        format_date(result.end_date)
    );
    let _ = writeln!(
        out,
        "*Total development time:* {} d. ({} story points)",
        result.total_days, result.story_points
    );
    let _ = writeln!(
        out,
        "*With risk buffer:* {} d. (+{} risk d.)",
        result.total_with_risks, result.risk_days
    );
    out.push('\n');

    let _ = writeln!(out, "h2. Task breakdown");
    out.push('\n');

    if !sequential_by_team.is_empty() {
        let _ = writeln!(out, "h3. Sequential tasks");
        out.push('\n');
        for (team, team_tasks) in &sequential_by_team {
            let team_days: u32 = team_tasks.iter().map(|task| task.days).sum();
            let _ = writeln!(out, "h4. Team {} ({} d.)", capitalize(team), team_days);
            out.push('\n');
            for task in team_tasks {
                push_task_line(&mut out, task, false);
            }
            out.push('\n');
        }
    }

    if !groups.is_empty() {
        let _ = writeln!(out, "h3. Parallel task groups");
        out.push('\n');
        for (label, group_tasks) in &groups {
            let max_days = group_tasks.iter().map(|task| task.days).max().unwrap_or(0);
            let sum_days: u32 = group_tasks.iter().map(|task| task.days).sum();
            let _ = writeln!(
                out,
                "h4. Group \"{label}\" ({max_days} d. effective, {sum_days} d. total workload)"
            );
            let _ = writeln!(
                out,
                "_These tasks run in parallel - the timeline uses the longest member_"
            );
            out.push('\n');
            for task in group_tasks {
                push_task_line(&mut out, task, true);
            }
            out.push('\n');
        }
    }

    let _ = writeln!(out, "h2. Project totals");
    out.push('\n');
    let _ = writeln!(out, "|| Metric || Value ||");
    let _ = writeln!(out, "| Start date | {} |", format_date(start_date));
    let _ = writeln!(out, "| End date | {} |", format_date(result.end_date));
    let _ = writeln!(out, "| Development days | {} |", result.total_days);
    let _ = writeln!(out, "| Risk days | +{} |", result.risk_days);
    let _ = writeln!(out, "| Total duration | {} d. |", result.total_with_risks);
    let _ = writeln!(out, "| Story points | {} |", result.story_points);
    out.push('\n');

    let _ = writeln!(out, "h2. Team allocation");
    out.push('\n');
    let _ = writeln!(out, "|| Team || Days || Share ||");
    for (team, days) in &result.team_distribution {
        let _ = writeln!(
            out,
            "| {} | {} | {}% |",
            capitalize(team),
            days,
            percentage(*days, result.total_days)
        );
    }

    out
}

fn push_task_line(out: &mut String, task: &Task, with_team: bool) {
    if with_team {
        let _ = writeln!(out, "* *{}* ({}) - {}", task.title, task.team, task.description);
    } else {
        let _ = writeln!(out, "* *{}* - {}", task.title, task.description);
    }
    let _ = writeln!(
        out,
        "  _Estimate: {} {}_",
        task.days,
        if task.days == 1 { "day" } else { "days" }
    );
}

/// Rounded share of the total; 0 when the total itself is 0.
fn percentage(days: u32, total_days: u32) -> u32 {
    if total_days == 0 {
        return 0;
    }
    ((days as f64 / total_days as f64) * 100.0).round() as u32
}

fn format_date(date: NaiveDate) -> String {
    date.format("%-d %B %Y").to_string()
}

fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::WorkdayCalendar;
    use crate::schedule::compute_schedule;
    use std::collections::BTreeSet;
    use uuid::Uuid;

    fn task(title: &str, team: &str, days: u32, group: Option<&str>) -> Task {
        Task {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: format!("{title} work"),
            team: team.to_string(),
            days,
            parallel_group: group.map(str::to_string),
            order_index: 0,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn renders_header_sections_and_tables() {
        let tasks = vec![
            task("API", "backend", 3, None),
            task("UI", "frontend", 5, Some("wave-1")),
            task("Load test", "qa", 2, Some("wave-1")),
        ];
        let calendar = WorkdayCalendar::new(BTreeSet::new());
        let result = compute_schedule(&tasks, date(2025, 8, 4), &calendar);
        let report = render_summary("Q3 Replatform", &tasks, &result, date(2025, 8, 4));

        assert!(report.starts_with("h1. Q3 Replatform"));
        assert!(report.contains("h3. Sequential tasks"));
        assert!(report.contains("h4. Team Backend (3 d.)"));
        assert!(report.contains("h3. Parallel task groups"));
        assert!(report.contains("h4. Group \"wave-1\" (5 d. effective, 7 d. total workload)"));
        assert!(report.contains("|| Metric || Value ||"));
        assert!(report.contains("| Development days | 8 |"));
        assert!(report.contains("|| Team || Days || Share ||"));
        // 3 of 8 days -> 38% rounded.
        assert!(report.contains("| Backend | 3 | 38% |"));
    }

    #[test]
    fn singular_day_estimate() {
        let tasks = vec![task("Hotfix", "backend", 1, None)];
        let calendar = WorkdayCalendar::new(BTreeSet::new());
        let result = compute_schedule(&tasks, date(2025, 8, 4), &calendar);
        let report = render_summary("Patch", &tasks, &result, date(2025, 8, 4));
        assert!(report.contains("_Estimate: 1 day_"));
    }

    #[test]
    fn empty_portfolio_does_not_divide_by_zero() {
        let calendar = WorkdayCalendar::new(BTreeSet::new());
        let result = compute_schedule(&[], date(2025, 8, 4), &calendar);
        let report = render_summary("Empty", &[], &result, date(2025, 8, 4));
        assert!(report.contains("| Development days | 0 |"));
        // No allocation rows, and no panic getting here.
        assert!(report.contains("|| Team || Days || Share ||"));
    }

    #[test]
    fn percentage_guard() {
        assert_eq!(percentage(5, 0), 0);
        assert_eq!(percentage(3, 8), 38);
        assert_eq!(percentage(8, 8), 100);
    }
}
