#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! Two-message confirmation flows for destructive bot actions.
//!
//! When a module proposes something destructive (forget a record, purge
//! invalid entries, restore a snapshot), it parks the proposed action in the
//! [`PendingStore`] and waits for the requester's next message to confirm or
//! cancel it. Entries are keyed by `(requester, kind)` so unrelated flows and
//! unrelated users never cross-talk, and every entry carries a TTL so an
//! abandoned flow evaporates instead of firing later.
//!
//! The store is advisory, in-memory state only: a process restart drops all
//! pending actions, which is fine because nothing has executed yet.
//!
//! # Lifecycle
//! `create` → one of `confirm` (caller executes the returned payload),
//! `cancel`, or expiry (lazy on read, or via the background
//! [`ExpirySweeper`]). A fresh `create` for the same key silently replaces
//! whatever was pending: latest request wins.

mod action;
mod store;
mod sweeper;

pub use action::{DEFAULT_TTL_SECS, PendingAction};
pub use store::PendingStore;
pub use sweeper::{DEFAULT_SWEEP_INTERVAL, ExpirySweeper};
