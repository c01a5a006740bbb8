//! decomp watch command implementation
//!
//! Joins a portfolio on the relay and prints every received event as a
//! JSON line. Presence-affecting events are followed by a snapshot of
//! the live field claims, with stale claims expired on the configured
//! TTL. Useful as a debugging tap and as a headless client.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::client;
use crate::error::Result;
use crate::identity;
use crate::presence::{FieldClaim, PresenceBoard};
use crate::protocol::{FieldKey, ServerMessage};

/// Options for the watch command
pub struct WatchOptions {
    pub config: Option<PathBuf>,
    pub portfolio_id: String,
    pub addr: Option<String>,
    pub user_id: Option<String>,
    pub username: Option<String>,
}

pub fn run(options: WatchOptions) -> Result<()> {
    let config = super::load_config(options.config.as_ref())?;
    let addr: SocketAddr =
        super::parse_relay_addr(&options.addr.unwrap_or_else(|| config.relay.bind.clone()))?;
    let backoff = Duration::from_secs(config.relay.reconnect_backoff_secs);
    let ttl = chrono::Duration::seconds(config.collab.claim_ttl_secs as i64);

    let who = identity::resolve_identity(
        &config,
        options.user_id.as_deref(),
        options.username.as_deref(),
    );

    let mut board = PresenceBoard::new();

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(client::run_with_reconnect(
        addr,
        &options.portfolio_id,
        &who,
        backoff,
        |event| {
            match serde_json::to_string(&event) {
                Ok(line) => println!("{line}"),
                Err(err) => eprintln!("error: {err}"),
            }
            if let Some(line) = presence_line(&mut board, ttl, &event, Utc::now()) {
                println!("{line}");
            }
            true
        },
    ))
}

/// Feed one event into the presence board; for presence-affecting events
/// this returns a `presence` JSON line with the surviving claims.
fn presence_line(
    board: &mut PresenceBoard,
    ttl: chrono::Duration,
    event: &ServerMessage,
    now: DateTime<Utc>,
) -> Option<String> {
    board.apply(event, now);
    board.expire_stale(ttl, now);

    if !matches!(
        event,
        ServerMessage::UserFieldFocus { .. }
            | ServerMessage::UserFieldBlur { .. }
            | ServerMessage::FieldChanged { .. }
    ) {
        return None;
    }

    let mut entries: Vec<(&FieldKey, &FieldClaim)> = board.claims().collect();
    entries.sort_by(|(a, _), (b, _)| a.cmp(b));

    let claims: Vec<serde_json::Value> = entries
        .into_iter()
        .map(|(key, claim)| {
            serde_json::json!({
                "field_id": key.field_id,
                "task_id": key.task_id,
                "user_id": claim.user_id,
                "username": claim.username,
            })
        })
        .collect();

    Some(serde_json::json!({ "type": "presence", "claims": claims }).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn focus(field: &str, user: &str) -> ServerMessage {
        ServerMessage::UserFieldFocus {
            portfolio_id: "p-1".to_string(),
            field_id: field.to_string(),
            task_id: None,
            user_id: format!("id-{user}"),
            username: user.to_string(),
        }
    }

    fn blur(field: &str, user: &str) -> ServerMessage {
        ServerMessage::UserFieldBlur {
            portfolio_id: "p-1".to_string(),
            field_id: field.to_string(),
            task_id: None,
            user_id: format!("id-{user}"),
            username: user.to_string(),
        }
    }

    #[test]
    fn focus_event_yields_a_presence_snapshot() {
        let mut board = PresenceBoard::new();
        let ttl = chrono::Duration::seconds(90);
        let now = Utc::now();

        let line = presence_line(&mut board, ttl, &focus("title", "maria"), now)
            .expect("presence line");
        let value: serde_json::Value = serde_json::from_str(&line).expect("json");
        assert_eq!(value["type"], "presence");
        assert_eq!(value["claims"][0]["field_id"], "title");
        assert_eq!(value["claims"][0]["username"], "maria");
    }

    #[test]
    fn blur_event_clears_the_claim_from_the_snapshot() {
        let mut board = PresenceBoard::new();
        let ttl = chrono::Duration::seconds(90);
        let now = Utc::now();

        presence_line(&mut board, ttl, &focus("title", "maria"), now);
        let line =
            presence_line(&mut board, ttl, &blur("title", "maria"), now).expect("presence line");
        let value: serde_json::Value = serde_json::from_str(&line).expect("json");
        assert_eq!(value["claims"].as_array().map(Vec::len), Some(0));
    }

    #[test]
    fn unrefreshed_claims_age_out_of_the_snapshot() {
        let mut board = PresenceBoard::new();
        let ttl = chrono::Duration::seconds(30);
        let start = Utc::now();

        presence_line(&mut board, ttl, &focus("title", "maria"), start);

        // A later event past Maria's TTL surfaces only the fresh claim.
        let later = start + chrono::Duration::seconds(31);
        let line =
            presence_line(&mut board, ttl, &focus("descr", "oleg"), later).expect("presence line");
        let value: serde_json::Value = serde_json::from_str(&line).expect("json");
        let claims = value["claims"].as_array().expect("claims");
        assert_eq!(claims.len(), 1);
        assert_eq!(claims[0]["username"], "oleg");
    }

    #[test]
    fn non_presence_events_print_no_snapshot() {
        let mut board = PresenceBoard::new();
        let ttl = chrono::Duration::seconds(90);
        let event = ServerMessage::TaskDeleted {
            portfolio_id: "p-1".to_string(),
            task_id: "t-1".to_string(),
        };
        assert!(presence_line(&mut board, ttl, &event, Utc::now()).is_none());
    }
}
