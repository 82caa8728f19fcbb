//! The dispatch registry: who owns this message?

use std::cmp::Ordering;

use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::rule::{PatternRule, RuleHandle, RuleSpec};
use crate::{DispatchError, Result};

/// Registry of dispatch rules shared by every feature module.
///
/// Read-mostly: modules register once at boot, resolution runs per inbound
/// message. The rule list is append-only behind a read-write lock, so late
/// registration stays safe against concurrent resolution scans.
///
/// Construct one instance per process (or per test) and hand it to each
/// module; there is no ambient global registry.
pub struct DispatchRegistry {
    rules: RwLock<Vec<PatternRule>>,
}

impl DispatchRegistry {
    /// Create an empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            rules: RwLock::const_new(Vec::new()),
        }
    }

    /// Register a rule.
    ///
    /// The only validation is that the pattern compiles; a bad pattern
    /// fails this module's registration attempt, not the process.
    ///
    /// # Errors
    /// Returns [`DispatchError::InvalidPattern`] if the regex cannot be
    /// constructed.
    pub async fn register(&self, spec: RuleSpec) -> Result<RuleHandle> {
        let mut rules = self.rules.write().await;

        // Order is assigned under the write lock so it stays monotonic.
        let order = rules.len() as u64;
        let rule = PatternRule::compile(&spec, order)?;

        info!(
            "Registering dispatch rule #{order} for owner '{}' (priority {}, exclusive: {})",
            spec.owner, spec.priority, spec.exclusive
        );
        rules.push(rule);

        Ok(RuleHandle {
            owner: spec.owner,
            order,
        })
    }

    /// Resolve which module owns `text`, if any.
    ///
    /// Every rule is evaluated; there is no first-match short-circuit.
    /// If any matching rule is exclusive, only exclusive matches compete.
    /// The winner is the highest-priority candidate, exact ties broken by
    /// lowest registration order.
    pub async fn resolve(&self, text: &str) -> Option<String> {
        let rules = self.rules.read().await;
        let winner = Self::select(&rules, text)?;

        debug!(
            "Dispatch: owner '{}' claims message (rule #{})",
            winner.owner(),
            winner.order()
        );
        Some(winner.owner().to_string())
    }

    /// Whether any registered rule claims `text`.
    ///
    /// Used by modules that only need "is this already someone's command"
    /// before auto-creating a record from free text.
    pub async fn matches_any(&self, text: &str) -> bool {
        let rules = self.rules.read().await;
        Self::select(&rules, text).is_some()
    }

    /// Number of registered rules.
    pub async fn rule_count(&self) -> usize {
        self.rules.read().await.len()
    }

    fn select<'a>(rules: &'a [PatternRule], text: &str) -> Option<&'a PatternRule> {
        let matched: Vec<&PatternRule> = rules.iter().filter(|r| r.is_match(text)).collect();

        let any_exclusive = matched.iter().any(|r| r.is_exclusive());
        matched
            .into_iter()
            .filter(|r| !any_exclusive || r.is_exclusive())
            .max_by(|a, b| Self::rank(a, b))
    }

    // Higher priority wins; on an exact tie the earlier registration
    // ranks higher. Total ordering on f64 keeps this deterministic.
    fn rank(a: &PatternRule, b: &PatternRule) -> Ordering {
        a.priority()
            .total_cmp(&b.priority())
            .then_with(|| b.order().cmp(&a.order()))
    }
}

impl Default for DispatchRegistry {
    fn default() -> Self {
        Self::new()
    }
}
