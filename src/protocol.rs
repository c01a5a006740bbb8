//! Wire protocol for the relay channel.
//!
//! Every message is a JSON object with a `type` discriminator plus
//! payload fields, carried over a persistent duplex connection as one
//! message per line. The channel is a notification side-channel, not the
//! system of record: nothing sent here is ever persisted.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identifies one editable field, optionally scoped to a task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FieldKey {
    pub field_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
}

impl FieldKey {
    pub fn new(field_id: impl Into<String>, task_id: Option<String>) -> Self {
        Self {
            field_id: field_id.into(),
            task_id,
        }
    }
}

/// Messages sent by a client to the relay.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Register this connection under the portfolio's member set. The
    /// identity given here is recorded on the session and stamped on all
    /// later attribution; re-joining another portfolio implicitly leaves
    /// the current one.
    JoinPortfolio {
        portfolio_id: String,
        user_id: String,
        username: String,
    },

    /// Explicitly leave a portfolio without closing the connection.
    LeavePortfolio { portfolio_id: String },

    /// Sent after an out-of-band save; fanned out as `portfolio_changed`.
    PortfolioUpdate { portfolio_id: String, data: Value },

    TaskUpdate {
        portfolio_id: String,
        task_id: String,
        data: Value,
    },

    TaskAdded { portfolio_id: String, data: Value },

    TaskDeleted {
        portfolio_id: String,
        task_id: String,
    },

    FieldFocus {
        portfolio_id: String,
        field_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        task_id: Option<String>,
    },

    FieldBlur {
        portfolio_id: String,
        field_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        task_id: Option<String>,
    },

    /// Keystroke-level value, already debounced on the sender. Advisory
    /// only; recipients never apply it to a locally focused field.
    FieldChange {
        portfolio_id: String,
        field_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        task_id: Option<String>,
        value: String,
    },
}

impl ClientMessage {
    /// Portfolio this message is scoped to.
    pub fn portfolio_id(&self) -> &str {
        match self {
            ClientMessage::JoinPortfolio { portfolio_id, .. }
            | ClientMessage::LeavePortfolio { portfolio_id }
            | ClientMessage::PortfolioUpdate { portfolio_id, .. }
            | ClientMessage::TaskUpdate { portfolio_id, .. }
            | ClientMessage::TaskAdded { portfolio_id, .. }
            | ClientMessage::TaskDeleted { portfolio_id, .. }
            | ClientMessage::FieldFocus { portfolio_id, .. }
            | ClientMessage::FieldBlur { portfolio_id, .. }
            | ClientMessage::FieldChange { portfolio_id, .. } => portfolio_id,
        }
    }
}

/// Messages delivered by the relay to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Acknowledgement sent to the joining connection only.
    JoinedPortfolio { portfolio_id: String },

    PortfolioChanged { portfolio_id: String, data: Value },

    TaskChanged {
        portfolio_id: String,
        task_id: String,
        data: Value,
    },

    TaskAdded { portfolio_id: String, data: Value },

    TaskDeleted {
        portfolio_id: String,
        task_id: String,
    },

    /// Another member focused a field; carries the relay-stamped identity
    /// so recipients can render "X is editing this field".
    UserFieldFocus {
        portfolio_id: String,
        field_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        task_id: Option<String>,
        user_id: String,
        username: String,
    },

    UserFieldBlur {
        portfolio_id: String,
        field_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        task_id: Option<String>,
        user_id: String,
        username: String,
    },

    /// Live in-progress value from another member's field.
    FieldChanged {
        portfolio_id: String,
        field_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        task_id: Option<String>,
        value: String,
        user_id: String,
        username: String,
    },
}
