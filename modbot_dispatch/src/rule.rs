//! Rule descriptors and registered rules.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::DispatchError;

/// Registration descriptor for a dispatch rule.
///
/// Modules register many rules; named fields plus builder methods keep the
/// priority and exclusivity flags from being swapped positionally at call
/// sites.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSpec {
    /// Regex matched against the raw message text.
    pub pattern: String,
    /// Identifier of the feature module the rule belongs to.
    pub owner: String,
    /// Real-valued weight; higher wins. Unbounded — catch-all rules sit
    /// just above zero, single-purpose commands far above.
    pub priority: f64,
    /// When true, a match suppresses every non-exclusive match for the
    /// same message regardless of priority.
    pub exclusive: bool,
}

impl RuleSpec {
    /// Create a spec with priority 0 and exclusivity off.
    #[must_use]
    pub fn new(pattern: impl Into<String>, owner: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            owner: owner.into(),
            priority: 0.0,
            exclusive: false,
        }
    }

    /// Set the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: f64) -> Self {
        self.priority = priority;
        self
    }

    /// Mark the rule exclusive.
    #[must_use]
    pub const fn exclusive(mut self) -> Self {
        self.exclusive = true;
        self
    }
}

/// A registered rule. Immutable once registered; there is no
/// unregistration, modules live for the process lifetime.
#[derive(Debug, Clone)]
pub struct PatternRule {
    pattern: Regex,
    owner: String,
    priority: f64,
    exclusive: bool,
    order: u64,
}

impl PatternRule {
    pub(crate) fn compile(spec: &RuleSpec, order: u64) -> Result<Self, DispatchError> {
        let pattern = Regex::new(&spec.pattern)?;
        Ok(Self {
            pattern,
            owner: spec.owner.clone(),
            priority: spec.priority,
            exclusive: spec.exclusive,
            order,
        })
    }

    pub(crate) fn is_match(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }

    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    #[must_use]
    pub const fn priority(&self) -> f64 {
        self.priority
    }

    #[must_use]
    pub const fn is_exclusive(&self) -> bool {
        self.exclusive
    }

    /// Registration sequence number, used only to break exact priority
    /// ties (first registered wins).
    #[must_use]
    pub const fn order(&self) -> u64 {
        self.order
    }
}

/// Handle returned from registration.
///
/// Informational only — rules cannot be withdrawn — but it tells the
/// registering module which sequence slot its rule landed in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleHandle {
    pub owner: String,
    pub order: u64,
}
