//! Side channels rules can send values to

use rulefire_core::Fact;

/// Receiver registered on a session under a name.
///
/// Consequences call `send` through the `RuleContext`; the session never
/// reads back from a channel.
pub trait Channel: Send + Sync {
    fn send(&self, fact: Fact);
}
