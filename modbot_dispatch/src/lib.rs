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

//! Message arbitration for independently authored bot modules.
//!
//! Every feature module of the bot listens on the same inbound text stream.
//! Before a module commits to an ambiguous default action (typically
//! auto-creating a record from free text), it asks the [`DispatchRegistry`]
//! whether some other module already claims that text. Modules declare their
//! claims once, at startup, as regex rules with a real-valued priority and an
//! optional exclusivity flag.
//!
//! # Resolution
//! Every registered rule is evaluated against the message (no first-match
//! short-circuit). If any matching rule is exclusive, only exclusive matches
//! compete; otherwise the highest-priority match wins. Exact priority ties go
//! to the rule registered first.

mod registry;
mod rule;

pub use registry::DispatchRegistry;
pub use rule::{PatternRule, RuleHandle, RuleSpec};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DispatchError>;

/// Errors raised by the dispatch registry.
///
/// Resolution never fails; a text that matches nothing is a normal
/// `None` result. Registration is the only fallible operation.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("invalid dispatch pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}
