//! Client-side field presence and collaborative field binding.
//!
//! The relay only forwards focus/blur/change events; each client derives
//! its own view of who is editing what from the stream it observed. That
//! view is eventually consistent: a missed blur would leave an indicator
//! stuck, so claims carry a TTL and expire unless refreshed by further
//! focus or live-change events from the same user.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use crate::config::CollabConfig;
use crate::protocol::{ClientMessage, FieldKey, ServerMessage};

/// The transient record that a specific user currently has a field
/// focused. Exactly one claimant per field; a later focus overwrites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldClaim {
    pub user_id: String,
    pub username: String,
    pub refreshed_at: DateTime<Utc>,
}

/// Per-client map of field claims, fed by observed relay events.
#[derive(Debug, Default)]
pub struct PresenceBoard {
    claims: HashMap<FieldKey, FieldClaim>,
}

impl PresenceBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the board from one observed event. Focus and live-change
    /// events create or refresh a claim; blur clears it only when it
    /// comes from the current claimant.
    pub fn apply(&mut self, event: &ServerMessage, now: DateTime<Utc>) {
        match event {
            ServerMessage::UserFieldFocus {
                field_id,
                task_id,
                user_id,
                username,
                ..
            }
            | ServerMessage::FieldChanged {
                field_id,
                task_id,
                user_id,
                username,
                ..
            } => {
                let key = FieldKey::new(field_id.clone(), task_id.clone());
                self.claims.insert(
                    key,
                    FieldClaim {
                        user_id: user_id.clone(),
                        username: username.clone(),
                        refreshed_at: now,
                    },
                );
            }
            ServerMessage::UserFieldBlur {
                field_id,
                task_id,
                user_id,
                ..
            } => {
                let key = FieldKey::new(field_id.clone(), task_id.clone());
                if self
                    .claims
                    .get(&key)
                    .is_some_and(|claim| claim.user_id == *user_id)
                {
                    self.claims.remove(&key);
                }
            }
            _ => {}
        }
    }

    /// Current claimant of a field, if any.
    pub fn claimant(&self, key: &FieldKey) -> Option<&FieldClaim> {
        self.claims.get(key)
    }

    /// All live claims, in no particular order.
    pub fn claims(&self) -> impl Iterator<Item = (&FieldKey, &FieldClaim)> {
        self.claims.iter()
    }

    /// Drop claims that have not been refreshed within `ttl`. Bounds the
    /// staleness window after an abrupt disconnect with no clean blur.
    pub fn expire_stale(&mut self, ttl: chrono::Duration, now: DateTime<Utc>) {
        self.claims
            .retain(|_, claim| now - claim.refreshed_at <= ttl);
    }

    pub fn len(&self) -> usize {
        self.claims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }
}

/// One locally bound editable field.
///
/// A remote live-preview value is applied only while the field is not
/// focused locally; in-progress local typing is never clobbered.
#[derive(Debug, Default)]
pub struct FieldState {
    value: String,
    focused: bool,
}

impl FieldState {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            focused: false,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn focus(&mut self) {
        self.focused = true;
    }

    pub fn blur(&mut self) {
        self.focused = false;
    }

    /// Local edit.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    /// Remote advisory value; returns whether it was applied.
    pub fn apply_remote(&mut self, value: &str) -> bool {
        if self.focused {
            return false;
        }
        self.value = value.to_string();
        true
    }
}

/// Trailing-edge debouncer for live field-change broadcasts.
///
/// Rapid edits coalesce into one value per quiet interval: every edit
/// resets the deadline, and the pending value is released once the quiet
/// interval elapses with no further edits.
#[derive(Debug)]
pub struct Debouncer {
    quiet: Duration,
    pending: Option<(String, Instant)>,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
        }
    }

    /// Record an edit, resetting the quiet deadline.
    pub fn edit(&mut self, value: impl Into<String>, now: Instant) {
        self.pending = Some((value.into(), now + self.quiet));
    }

    /// Take the pending value if the quiet interval has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        match &self.pending {
            Some((_, deadline)) if *deadline <= now => {
                self.pending.take().map(|(value, _)| value)
            }
            _ => None,
        }
    }

    /// Take the pending value immediately, e.g. on blur.
    pub fn flush(&mut self) -> Option<String> {
        self.pending.take().map(|(value, _)| value)
    }

    /// Deadline of the pending value, for sleep scheduling.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }
}

/// An editing session on one field, turning local edits into the wire
/// messages other members expect: a focus up front, one coalesced
/// `field_change` per quiet interval, and a blur (with any pending value
/// flushed first) when the field is released.
#[derive(Debug)]
pub struct FieldEditor {
    portfolio_id: String,
    key: FieldKey,
    state: FieldState,
    debouncer: Debouncer,
}

impl FieldEditor {
    /// Quiet interval comes from `[collab] debounce_ms`.
    pub fn new(portfolio_id: impl Into<String>, key: FieldKey, collab: &CollabConfig) -> Self {
        Self {
            portfolio_id: portfolio_id.into(),
            key,
            state: FieldState::default(),
            debouncer: Debouncer::new(Duration::from_millis(collab.debounce_ms)),
        }
    }

    /// Take the field; returns the focus message to send.
    pub fn focus(&mut self) -> ClientMessage {
        self.state.focus();
        ClientMessage::FieldFocus {
            portfolio_id: self.portfolio_id.clone(),
            field_id: self.key.field_id.clone(),
            task_id: self.key.task_id.clone(),
        }
    }

    /// Record a local edit; nothing goes on the wire until the quiet
    /// interval elapses.
    pub fn edit(&mut self, value: impl Into<String>, now: Instant) {
        let value = value.into();
        self.state.set_value(value.clone());
        self.debouncer.edit(value, now);
    }

    /// The pending change message, once the quiet interval has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<ClientMessage> {
        self.debouncer.poll(now).map(|value| self.change(value))
    }

    /// Deadline of the pending change, for sleep scheduling.
    pub fn deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    pub fn value(&self) -> &str {
        self.state.value()
    }

    /// Whether this editor is bound to the given field.
    pub fn is_editing(&self, field_id: &str, task_id: Option<&str>) -> bool {
        self.key.field_id == field_id && self.key.task_id.as_deref() == task_id
    }

    /// Remote live value for this field; refused while focused locally.
    pub fn apply_remote(&mut self, value: &str) -> bool {
        self.state.apply_remote(value)
    }

    /// Release the field: any pending coalesced value first, then the
    /// blur itself.
    pub fn blur(&mut self) -> Vec<ClientMessage> {
        let mut out = Vec::new();
        if let Some(value) = self.debouncer.flush() {
            out.push(self.change(value));
        }
        self.state.blur();
        out.push(ClientMessage::FieldBlur {
            portfolio_id: self.portfolio_id.clone(),
            field_id: self.key.field_id.clone(),
            task_id: self.key.task_id.clone(),
        });
        out
    }

    fn change(&self, value: String) -> ClientMessage {
        ClientMessage::FieldChange {
            portfolio_id: self.portfolio_id.clone(),
            field_id: self.key.field_id.clone(),
            task_id: self.key.task_id.clone(),
            value,
        }
    }
}
