//! The pending-action value object.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default time a proposed action stays confirmable: 5 minutes.
pub const DEFAULT_TTL_SECS: i64 = 300;

/// One proposed destructive action awaiting a confirming second message.
///
/// Immutable after creation; the store removes entries whole, it never
/// mutates them in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingAction {
    /// User who initiated the action.
    pub requester_id: String,
    /// Flow namespace, e.g. "forget-item" or "restore-snapshot". Each
    /// requester holds at most one pending action per kind.
    pub kind: String,
    /// Kind-specific data needed to execute the action if confirmed.
    /// Opaque to the store.
    pub payload: Value,
    /// Routing information for the confirming reply (channel/thread).
    /// Opaque to the store.
    pub context: Value,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Past this instant the entry is dead, whether or not the sweeper
    /// has run yet.
    pub expires_at: DateTime<Utc>,
}

impl PendingAction {
    /// Create a pending action with the default TTL and no reply context.
    #[must_use]
    pub fn new(requester_id: impl Into<String>, kind: impl Into<String>, payload: Value) -> Self {
        let created_at = Utc::now();
        Self {
            requester_id: requester_id.into(),
            kind: kind.into(),
            payload,
            context: Value::Null,
            created_at,
            expires_at: created_at + TimeDelta::seconds(DEFAULT_TTL_SECS),
        }
    }

    /// Attach reply-routing context.
    #[must_use]
    pub fn with_context(mut self, context: Value) -> Self {
        self.context = context;
        self
    }

    /// Override the TTL (recomputes `expires_at` from `created_at`).
    #[must_use]
    pub fn with_ttl(mut self, ttl: TimeDelta) -> Self {
        self.expires_at = self.created_at + ttl;
        self
    }

    /// Whether the entry is dead as of `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
