//! Portfolio membership registry and broadcast fan-out.
//!
//! The registry is the relay's only shared state: per portfolio id, the
//! set of currently-open connections that have joined it. It is an
//! explicit injectable object (created at server start, handed to the
//! accept loop) so tests can drive it with fake connections and a
//! distributed backplane can replace it without touching call sites.
//!
//! The relay holds no authoritative copy of field values or claims; it
//! only forwards events. Persistence happens through the separate save
//! path.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::protocol::{ClientMessage, ServerMessage};

/// Identifies one relay connection. Broadcast exclusion is by connection,
/// not by user: two connections of the same user see each other's events,
/// which is what multi-tab editing wants.
pub type ConnId = Uuid;

/// Outbound queue handle for one connection.
pub type Outbound = mpsc::UnboundedSender<ServerMessage>;

#[derive(Debug, Clone)]
struct Member {
    sender: Outbound,
    user_id: String,
    username: String,
}

#[derive(Default)]
struct Inner {
    /// portfolio id -> joined connections
    groups: HashMap<String, HashMap<ConnId, Member>>,
    /// connection -> portfolio it currently belongs to (at most one)
    sessions: HashMap<ConnId, String>,
}

/// In-memory membership map with group-scoped fan-out.
#[derive(Clone, Default)]
pub struct Registry {
    inner: Arc<Mutex<Inner>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispatch one inbound message from a connection.
    ///
    /// `outbound` is the connection's own queue, used for the join
    /// acknowledgement. Messages for a portfolio the connection has not
    /// joined are dropped with a log line rather than relayed, so a
    /// client cannot broadcast into groups it never entered.
    pub fn handle(&self, conn: ConnId, outbound: &Outbound, msg: ClientMessage) {
        match msg {
            ClientMessage::JoinPortfolio {
                portfolio_id,
                user_id,
                username,
            } => {
                self.join(conn, outbound.clone(), &portfolio_id, user_id, username);
                let _ = outbound.send(ServerMessage::JoinedPortfolio { portfolio_id });
            }
            ClientMessage::LeavePortfolio { portfolio_id } => {
                self.leave(conn, &portfolio_id);
            }
            other => self.relay(conn, other),
        }
    }

    /// Register a connection under a portfolio group. Joining while a
    /// member of another portfolio is an implicit leave-then-join.
    pub fn join(
        &self,
        conn: ConnId,
        sender: Outbound,
        portfolio_id: &str,
        user_id: String,
        username: String,
    ) {
        let mut inner = self.lock();

        if let Some(previous) = inner.sessions.get(&conn).cloned() {
            if previous != portfolio_id {
                debug!(%conn, from = %previous, to = %portfolio_id, "re-join leaves previous portfolio");
                remove_from_group(&mut inner, conn, &previous);
            }
        }

        debug!(%conn, portfolio = %portfolio_id, user = %username, "joined portfolio");
        inner.sessions.insert(conn, portfolio_id.to_string());
        inner
            .groups
            .entry(portfolio_id.to_string())
            .or_default()
            .insert(
                conn,
                Member {
                    sender,
                    user_id,
                    username,
                },
            );
    }

    /// Remove a connection from a portfolio group.
    pub fn leave(&self, conn: ConnId, portfolio_id: &str) {
        let mut inner = self.lock();
        if inner.sessions.get(&conn).map(String::as_str) == Some(portfolio_id) {
            inner.sessions.remove(&conn);
        }
        remove_from_group(&mut inner, conn, portfolio_id);
        debug!(%conn, portfolio = %portfolio_id, "left portfolio");
    }

    /// Drop a connection from whatever group it belongs to. Called on
    /// socket close; the only cleanup path besides an explicit leave.
    pub fn disconnect(&self, conn: ConnId) {
        let mut inner = self.lock();
        if let Some(portfolio_id) = inner.sessions.remove(&conn) {
            remove_from_group(&mut inner, conn, &portfolio_id);
            debug!(%conn, portfolio = %portfolio_id, "disconnected");
        }
    }

    /// Deliver a message to every member of the group except the sending
    /// connection. Members whose receiver is gone are skipped and reaped;
    /// a disconnect mid-broadcast never fails the fan-out.
    pub fn broadcast(&self, portfolio_id: &str, sender_conn: ConnId, msg: &ServerMessage) {
        let mut guard = self.lock();
        let inner = &mut *guard;
        let Some(group) = inner.groups.get_mut(portfolio_id) else {
            return;
        };

        let mut dead: Vec<ConnId> = Vec::new();
        for (conn, member) in group.iter() {
            if *conn == sender_conn {
                continue;
            }
            if member.sender.send(msg.clone()).is_err() {
                dead.push(*conn);
            }
        }

        for conn in dead {
            debug!(%conn, portfolio = %portfolio_id, "reaping dead connection during broadcast");
            group.remove(&conn);
            inner.sessions.remove(&conn);
        }
        if group.is_empty() {
            inner.groups.remove(portfolio_id);
        }
    }

    /// Number of connections currently joined to a portfolio.
    pub fn member_count(&self, portfolio_id: &str) -> usize {
        self.lock()
            .groups
            .get(portfolio_id)
            .map_or(0, HashMap::len)
    }

    /// Number of live portfolio groups.
    pub fn group_count(&self) -> usize {
        self.lock().groups.len()
    }

    /// Relay a non-membership message to the sender's group.
    fn relay(&self, conn: ConnId, msg: ClientMessage) {
        let (portfolio_id, identity) = {
            let inner = self.lock();
            let Some(portfolio_id) = inner.sessions.get(&conn).cloned() else {
                warn!(%conn, "dropping message from connection that never joined");
                return;
            };
            if portfolio_id != msg.portfolio_id() {
                warn!(
                    %conn,
                    joined = %portfolio_id,
                    addressed = %msg.portfolio_id(),
                    "dropping message addressed outside the joined portfolio"
                );
                return;
            }
            let identity = inner
                .groups
                .get(&portfolio_id)
                .and_then(|group| group.get(&conn))
                .map(|member| (member.user_id.clone(), member.username.clone()));
            let Some(identity) = identity else {
                return;
            };
            (portfolio_id, identity)
        };

        let (user_id, username) = identity;
        let outgoing = match msg {
            ClientMessage::PortfolioUpdate { portfolio_id, data } => {
                ServerMessage::PortfolioChanged { portfolio_id, data }
            }
            ClientMessage::TaskUpdate {
                portfolio_id,
                task_id,
                data,
            } => ServerMessage::TaskChanged {
                portfolio_id,
                task_id,
                data,
            },
            ClientMessage::TaskAdded { portfolio_id, data } => {
                ServerMessage::TaskAdded { portfolio_id, data }
            }
            ClientMessage::TaskDeleted {
                portfolio_id,
                task_id,
            } => ServerMessage::TaskDeleted {
                portfolio_id,
                task_id,
            },
            ClientMessage::FieldFocus {
                portfolio_id,
                field_id,
                task_id,
            } => ServerMessage::UserFieldFocus {
                portfolio_id,
                field_id,
                task_id,
                user_id,
                username,
            },
            ClientMessage::FieldBlur {
                portfolio_id,
                field_id,
                task_id,
            } => ServerMessage::UserFieldBlur {
                portfolio_id,
                field_id,
                task_id,
                user_id,
                username,
            },
            ClientMessage::FieldChange {
                portfolio_id,
                field_id,
                task_id,
                value,
            } => ServerMessage::FieldChanged {
                portfolio_id,
                field_id,
                task_id,
                value,
                user_id,
                username,
            },
            ClientMessage::JoinPortfolio { .. } | ClientMessage::LeavePortfolio { .. } => {
                return;
            }
        };

        self.broadcast(&portfolio_id, conn, &outgoing);
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Held only for map operations; no user code runs under it.
        self.inner.lock().expect("registry lock poisoned")
    }
}

fn remove_from_group(inner: &mut Inner, conn: ConnId, portfolio_id: &str) {
    if let Some(group) = inner.groups.get_mut(portfolio_id) {
        group.remove(&conn);
        if group.is_empty() {
            inner.groups.remove(portfolio_id);
        }
    }
}
