//! Per-package access control.
//!
//! Decides whether a package is served, served with the rendering sandbox
//! relaxed, or rejected. Deny lists always win over the whitelists.

use std::collections::HashSet;

use gemdocs_config::AccessConfig;

/// Outcome of evaluating a package against the access lists.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PolicyDecision {
    /// Serve with the strict sandbox.
    Allowed,
    /// Serve with the sandbox relaxed for this request only.
    AllowedUnsafe,
    /// Do not serve; the renderer must not be invoked.
    Rejected,
}

/// Access lists built once from configuration, read-only afterwards.
#[derive(Debug, Default)]
pub struct AccessPolicy {
    disallowed_gems: HashSet<String>,
    disallowed_projects: HashSet<String>,
    whitelisted_gems: HashSet<String>,
    whitelisted_projects: HashSet<String>,
}

impl AccessPolicy {
    /// Build the policy from the `[access]` configuration section.
    #[must_use]
    pub fn new(config: &AccessConfig) -> Self {
        let set = |names: &[String]| names.iter().cloned().collect::<HashSet<_>>();
        Self {
            disallowed_gems: set(&config.disallowed_gems),
            disallowed_projects: set(&config.disallowed_projects),
            whitelisted_gems: set(&config.whitelisted_gems),
            whitelisted_projects: set(&config.whitelisted_projects),
        }
    }

    /// True if the package name itself is on the deny list.
    ///
    /// Needs no index lookup, so it can run before the package is resolved.
    #[must_use]
    pub fn is_denied_name(&self, name: &str) -> bool {
        self.disallowed_gems.contains(name)
    }

    /// Evaluate a package by name and owning project.
    ///
    /// Every `AllowedUnsafe` decision is logged with the package name.
    #[must_use]
    pub fn evaluate(&self, name: &str, project: Option<&str>) -> PolicyDecision {
        let in_projects = |list: &HashSet<String>| project.is_some_and(|p| list.contains(p));

        if self.is_denied_name(name) || in_projects(&self.disallowed_projects) {
            return PolicyDecision::Rejected;
        }

        if self.whitelisted_gems.contains(name) || in_projects(&self.whitelisted_projects) {
            tracing::warn!(package = %name, project = ?project, "Dropping safe mode");
            return PolicyDecision::AllowedUnsafe;
        }

        PolicyDecision::Allowed
    }
}
