//! Keyed storage for pending actions.

use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::action::PendingAction;

/// Composite key: one pending slot per (requester, kind).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PendingKey {
    requester_id: String,
    kind: String,
}

impl PendingKey {
    fn new(requester_id: &str, kind: &str) -> Self {
        Self {
            requester_id: requester_id.to_string(),
            kind: kind.to_string(),
        }
    }
}

/// In-memory store coordinating two-step confirmation flows.
///
/// One map for every kind instead of one map per flow; the `kind` half of
/// the key keeps flows isolated. Every operation runs inside a single lock
/// acquisition, which is what makes `create`/`confirm`/`cancel` on the same
/// key linearizable: a confirm sees either the old entry or the new one,
/// never a torn one.
///
/// Construct one instance per process (or per test) and share it via `Arc`;
/// there is no ambient global table.
pub struct PendingStore {
    entries: Mutex<HashMap<PendingKey, PendingAction>>,
}

impl PendingStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Park a proposed action until it is confirmed, cancelled, or expires.
    ///
    /// Silently replaces any entry already pending for the same
    /// (requester, kind): latest request wins, there is no queue and no
    /// error for the discarded predecessor.
    pub async fn create(&self, action: PendingAction) {
        let key = PendingKey::new(&action.requester_id, &action.kind);
        info!(
            "Pending '{}' action for requester {} (expires {})",
            action.kind, action.requester_id, action.expires_at
        );

        let mut entries = self.entries.lock().await;
        if entries.insert(key, action).is_some() {
            debug!("Replaced an unconfirmed prior entry for the same key");
        }
    }

    /// Look up the live entry for (requester, kind), if any.
    ///
    /// Lazy expiry: a dead entry is evicted here and reported absent, so
    /// callers never see a stale entry even if the sweeper has not run.
    pub async fn get(&self, requester_id: &str, kind: &str) -> Option<PendingAction> {
        let key = PendingKey::new(requester_id, kind);
        let now = Utc::now();

        let mut entries = self.entries.lock().await;
        match entries.get(&key) {
            Some(action) if action.is_expired(now) => {
                entries.remove(&key);
                None
            }
            Some(action) => Some(action.clone()),
            None => None,
        }
    }

    /// Atomically take the live entry for (requester, kind).
    ///
    /// The caller executes the returned payload's effect; the store's job
    /// ends at handing it over exactly once. `None` means nothing to
    /// confirm (absent or expired) and is a normal outcome, not an error.
    pub async fn confirm(&self, requester_id: &str, kind: &str) -> Option<PendingAction> {
        let key = PendingKey::new(requester_id, kind);
        let now = Utc::now();

        let mut entries = self.entries.lock().await;
        let action = entries.remove(&key)?;
        if action.is_expired(now) {
            debug!("Confirm for requester {requester_id} found only an expired '{kind}' entry");
            return None;
        }

        info!("Confirmed '{kind}' action for requester {requester_id}");
        Some(action)
    }

    /// Drop the entry for (requester, kind) without executing anything.
    ///
    /// Returns whether an entry was removed; repeating a cancel is
    /// harmless and returns false.
    pub async fn cancel(&self, requester_id: &str, kind: &str) -> bool {
        let key = PendingKey::new(requester_id, kind);

        let mut entries = self.entries.lock().await;
        let removed = entries.remove(&key).is_some();
        if removed {
            info!("Cancelled '{kind}' action for requester {requester_id}");
        }
        removed
    }

    /// Evict every expired entry; returns how many were removed.
    ///
    /// Called periodically by the sweeper so abandoned flows cannot
    /// accumulate; a single retain pass bounds how long the lock is held.
    pub async fn sweep(&self) -> usize {
        let now = Utc::now();

        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|_, action| !action.is_expired(now));
        before - entries.len()
    }

    /// Number of entries currently held, expired or not.
    pub async fn pending_count(&self) -> usize {
        self.entries.lock().await.len()
    }
}

impl Default for PendingStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use serde_json::json;

    #[tokio::test]
    async fn test_create_then_confirm_returns_payload_once() {
        let store = PendingStore::new();
        store
            .create(PendingAction::new("u1", "forget-item", json!("sky-color")))
            .await;

        let action = store.confirm("u1", "forget-item").await;
        assert_eq!(action.map(|a| a.payload), Some(json!("sky-color")));

        // Gone after the handover.
        assert!(store.confirm("u1", "forget-item").await.is_none());
        assert!(store.get("u1", "forget-item").await.is_none());
    }

    #[tokio::test]
    async fn test_latest_create_wins() {
        let store = PendingStore::new();
        store
            .create(PendingAction::new("u1", "forget-item", json!("A")))
            .await;
        store
            .create(PendingAction::new("u1", "forget-item", json!("B")))
            .await;

        assert_eq!(store.pending_count().await, 1);
        let action = store.confirm("u1", "forget-item").await;
        assert_eq!(action.map(|a| a.payload), Some(json!("B")));
    }

    #[tokio::test]
    async fn test_kinds_are_isolated() {
        let store = PendingStore::new();
        store
            .create(PendingAction::new("u1", "forget-item", json!("A")))
            .await;
        store
            .create(PendingAction::new("u1", "bulk-cleanup", json!("B")))
            .await;

        let forgotten = store.confirm("u1", "forget-item").await;
        assert_eq!(forgotten.map(|a| a.payload), Some(json!("A")));

        // The cleanup flow is untouched.
        let cleanup = store.get("u1", "bulk-cleanup").await;
        assert_eq!(cleanup.map(|a| a.payload), Some(json!("B")));
    }

    #[tokio::test]
    async fn test_requesters_are_isolated() {
        let store = PendingStore::new();
        store
            .create(PendingAction::new("u1", "forget-item", json!("mine")))
            .await;

        assert!(store.get("u2", "forget-item").await.is_none());
        assert!(!store.cancel("u2", "forget-item").await);
        assert!(store.get("u1", "forget-item").await.is_some());
    }

    #[tokio::test]
    async fn test_get_does_not_consume() {
        let store = PendingStore::new();
        store
            .create(PendingAction::new("u1", "restore-snapshot", json!("snap-3")))
            .await;

        assert!(store.get("u1", "restore-snapshot").await.is_some());
        assert!(store.get("u1", "restore-snapshot").await.is_some());
        assert_eq!(store.pending_count().await, 1);
    }

    #[tokio::test]
    async fn test_lazy_expiry_on_get_and_confirm() {
        let store = PendingStore::new();
        store
            .create(
                PendingAction::new("u1", "forget-item", json!("stale"))
                    .with_ttl(TimeDelta::seconds(-1)),
            )
            .await;
        store
            .create(
                PendingAction::new("u2", "forget-item", json!("stale"))
                    .with_ttl(TimeDelta::seconds(-1)),
            )
            .await;

        // No sweeper here; the read path alone must hide dead entries.
        assert!(store.get("u1", "forget-item").await.is_none());
        assert!(store.confirm("u2", "forget-item").await.is_none());
        assert_eq!(store.pending_count().await, 0);
    }

    #[tokio::test]
    async fn test_live_entry_survives_until_ttl() {
        let store = PendingStore::new();
        store
            .create(
                PendingAction::new("u1", "forget-item", json!("fresh"))
                    .with_ttl(TimeDelta::minutes(5)),
            )
            .await;

        assert!(store.get("u1", "forget-item").await.is_some());
        assert!(store.confirm("u1", "forget-item").await.is_some());
    }

    #[tokio::test]
    async fn test_cancel_idempotence() {
        let store = PendingStore::new();
        store
            .create(PendingAction::new("u1", "bulk-cleanup", json!(["k1", "k2"])))
            .await;

        assert!(store.cancel("u1", "bulk-cleanup").await);
        assert!(!store.cancel("u1", "bulk-cleanup").await);
        assert!(!store.cancel("u1", "never-created").await);
    }

    #[tokio::test]
    async fn test_sweep_removes_only_expired() {
        let store = PendingStore::new();
        store
            .create(
                PendingAction::new("u1", "forget-item", json!("dead"))
                    .with_ttl(TimeDelta::seconds(-1)),
            )
            .await;
        store
            .create(PendingAction::new("u2", "forget-item", json!("alive")))
            .await;

        assert_eq!(store.sweep().await, 1);
        assert_eq!(store.sweep().await, 0);
        assert!(store.get("u2", "forget-item").await.is_some());
    }

    #[tokio::test]
    async fn test_create_after_any_terminal_state() {
        let store = PendingStore::new();

        // After confirm.
        store
            .create(PendingAction::new("u1", "forget-item", json!(1)))
            .await;
        assert!(store.confirm("u1", "forget-item").await.is_some());
        store
            .create(PendingAction::new("u1", "forget-item", json!(2)))
            .await;

        // After cancel.
        assert!(store.cancel("u1", "forget-item").await);
        store
            .create(PendingAction::new("u1", "forget-item", json!(3)))
            .await;

        let action = store.confirm("u1", "forget-item").await;
        assert_eq!(action.map(|a| a.payload), Some(json!(3)));
    }
}
