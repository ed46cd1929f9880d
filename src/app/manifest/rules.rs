//! Library rule evaluation
//!
//! Rules are evaluated in order and the last matching rule decides. When a
//! library declares rules but none match, it is excluded; a library with no
//! rules at all applies to every platform.

use crate::app::models::{Library, Rule, RuleAction};
use crate::app::platform::HostPlatform;

/// Whether a single rule applies to the host
fn rule_matches(rule: &Rule, host: &HostPlatform) -> bool {
    match rule.os.as_ref().and_then(|os| os.name.as_deref()) {
        Some(name) => host.matches_os_name(name),
        None => true,
    }
}

/// Resolve inclusion of a rule list for the host
pub fn rules_allow(rules: Option<&[Rule]>, host: &HostPlatform) -> bool {
    let Some(rules) = rules else {
        return true;
    };

    rules
        .iter()
        .filter(|rule| rule_matches(rule, host))
        .last()
        .map(|rule| rule.action == RuleAction::Allow)
        .unwrap_or(false)
}

/// Whether a library should be fetched on the host
pub fn library_included(library: &Library, host: &HostPlatform) -> bool {
    rules_allow(library.rules.as_deref(), host)
}
