//! Shared fixtures for integration tests.

use std::path::PathBuf;

use tempfile::TempDir;

/// Write a portfolio JSON file into a fresh temp dir and return both.
///
/// The dir doubles as the working directory so tests never pick up a
/// stray `.decomp.toml` from the developer's environment.
pub fn portfolio_fixture(name: &str, start_date: &str, tasks: &[(&str, &str, u32, Option<&str>)]) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("temp dir");

    let tasks: Vec<serde_json::Value> = tasks
        .iter()
        .enumerate()
        .map(|(index, (title, team, days, group))| {
            let mut task = serde_json::json!({
                "title": title,
                "description": format!("{title} work"),
                "team": team,
                "days": days,
                "order_index": index,
            });
            if let Some(group) = group {
                task["parallel_group"] = serde_json::Value::String((*group).to_string());
            }
            task
        })
        .collect();

    let portfolio = serde_json::json!({
        "name": name,
        "start_date": start_date,
        "tasks": tasks,
    });

    let path = dir.path().join("portfolio.json");
    std::fs::write(&path, serde_json::to_string_pretty(&portfolio).expect("json"))
        .expect("write fixture");
    (dir, path)
}
