//! Task model and validation.
//!
//! A task is a unit of work with an estimated day count, an owning team,
//! and an optional parallel-group label. Tasks sharing a non-empty label
//! run concurrently; the group's contribution to the critical path is its
//! longest member.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// A unit of work inside a portfolio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,

    pub title: String,

    #[serde(default)]
    pub description: String,

    /// Owning team label
    pub team: String,

    /// Estimated working days; must be at least 1
    pub days: u32,

    /// Tasks sharing a non-empty label execute concurrently
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parallel_group: Option<String>,

    /// Position within the portfolio's ordered task list
    #[serde(default)]
    pub order_index: u32,
}

impl Task {
    /// Validate invariants enforced at edit time (`days >= 1`, non-empty
    /// title and team).
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::InvalidTask {
                title: self.title.clone(),
                reason: "title cannot be empty".to_string(),
            });
        }
        if self.team.trim().is_empty() {
            return Err(Error::InvalidTask {
                title: self.title.clone(),
                reason: "team cannot be empty".to_string(),
            });
        }
        if self.days < 1 {
            return Err(Error::InvalidTask {
                title: self.title.clone(),
                reason: "days must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Normalized parallel-group label: trimmed, with empty and
    /// whitespace-only labels treated as no group.
    pub fn group_label(&self) -> Option<&str> {
        self.parallel_group.as_deref().and_then(|label| {
            let trimmed = label.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed)
            }
        })
    }

}
