//! Portfolio model and file storage.
//!
//! A portfolio is a named, ordered collection of tasks with a start date.
//! The JSON file form is the seam to the external CRUD/storage layer: the
//! calculator and summary renderer consume whatever that layer produces,
//! and collaborative edits are only persisted through the normal save
//! path, never through the relay channel.

use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::task::Task;

/// A named collection of tasks with a start date; the unit of scheduling
/// and of collaborative editing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Portfolio {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,

    pub name: String,

    /// Calendar date the work starts on
    pub start_date: NaiveDate,

    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Portfolio {
    /// Load a portfolio from a JSON file, validating every task.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::PortfolioNotFound(path.to_path_buf()));
        }
        let raw = std::fs::read_to_string(path)?;
        let mut portfolio: Portfolio = serde_json::from_str(&raw)?;
        for task in &portfolio.tasks {
            task.validate()?;
        }
        portfolio.sort_tasks();
        Ok(portfolio)
    }

    /// Write the portfolio back to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let serialized = serde_json::to_string_pretty(self)?;
        std::fs::write(path, serialized)?;
        Ok(())
    }

    /// Restore the stored ordering after edits.
    pub fn sort_tasks(&mut self) {
        self.tasks.sort_by_key(|task| task.order_index);
    }

    /// Parse a `YYYY-MM-DD` start date string from the storage layer.
    pub fn parse_start_date(raw: &str) -> Result<NaiveDate> {
        NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .map_err(|_| Error::InvalidDate(raw.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_start_date_accepts_iso() {
        let date = Portfolio::parse_start_date("2025-08-04").expect("date");
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 8, 4).unwrap());
    }

    #[test]
    fn parse_start_date_rejects_garbage() {
        assert!(matches!(
            Portfolio::parse_start_date("next tuesday"),
            Err(Error::InvalidDate(_))
        ));
        assert!(matches!(
            Portfolio::parse_start_date("2025-13-40"),
            Err(Error::InvalidDate(_))
        ));
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let path = dir.path().join("portfolio.json");

        let portfolio = Portfolio {
            id: Uuid::new_v4(),
            name: "q3".to_string(),
            start_date: NaiveDate::from_ymd_opt(2025, 8, 4).unwrap(),
            tasks: vec![Task {
                id: Uuid::new_v4(),
                title: "api".to_string(),
                description: "rest endpoints".to_string(),
                team: "backend".to_string(),
                days: 3,
                parallel_group: Some("wave-1".to_string()),
                order_index: 0,
            }],
        };

        portfolio.save(&path).expect("save");
        let loaded = Portfolio::load(&path).expect("load");
        assert_eq!(loaded.name, "q3");
        assert_eq!(loaded.tasks.len(), 1);
        assert_eq!(loaded.tasks[0].parallel_group.as_deref(), Some("wave-1"));
    }

    #[test]
    fn load_rejects_invalid_tasks() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let path = dir.path().join("portfolio.json");
        std::fs::write(
            &path,
            r#"{"name":"bad","start_date":"2025-08-04","tasks":[{"title":"api","team":"backend","days":0}]}"#,
        )
        .expect("write");

        assert!(matches!(
            Portfolio::load(&path),
            Err(Error::InvalidTask { .. })
        ));
    }

    #[test]
    fn sort_tasks_restores_order_index() {
        let mut portfolio = Portfolio {
            id: Uuid::new_v4(),
            name: "q3".to_string(),
            start_date: NaiveDate::from_ymd_opt(2025, 8, 4).unwrap(),
            tasks: vec![
                Task {
                    id: Uuid::new_v4(),
                    title: "second".to_string(),
                    description: String::new(),
                    team: "backend".to_string(),
                    days: 2,
                    parallel_group: None,
                    order_index: 1,
                },
                Task {
                    id: Uuid::new_v4(),
                    title: "first".to_string(),
                    description: String::new(),
                    team: "backend".to_string(),
                    days: 3,
                    parallel_group: None,
                    order_index: 0,
                },
            ],
        };

        portfolio.sort_tasks();
        assert_eq!(portfolio.tasks[0].title, "first");
        assert_eq!(portfolio.tasks[1].title, "second");
    }
}
