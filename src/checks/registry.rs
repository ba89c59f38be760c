use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::{
    Check, CheckSchema, CommandCheck, HistoryAnalysisCheck, PerformanceBenchmarkCheck,
    WiringCheck,
};

/// Outcome of looking a check up by name.
#[derive(Clone)]
pub enum Resolution {
    Found {
        requested: String,
        resolved: &'static str,
        check: Arc<dyn Check>,
    },
    Missing {
        tried: Vec<String>,
    },
}

impl Resolution {
    pub fn is_found(&self) -> bool {
        matches!(self, Resolution::Found { .. })
    }

    /// True when the check was found under one of the fallback names.
    pub fn via_fallback(&self) -> bool {
        match self {
            Resolution::Found {
                requested,
                resolved,
                ..
            } => requested.as_str() != *resolved,
            Resolution::Missing { .. } => false,
        }
    }

    pub fn check(&self) -> Option<&Arc<dyn Check>> {
        match self {
            Resolution::Found { check, .. } => Some(check),
            Resolution::Missing { .. } => None,
        }
    }
}

impl fmt::Debug for Resolution {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Found {
                requested,
                resolved,
                ..
            } => formatter
                .debug_struct("Found")
                .field("requested", requested)
                .field("resolved", resolved)
                .finish(),
            Resolution::Missing { tried } => formatter
                .debug_struct("Missing")
                .field("tried", tried)
                .finish(),
        }
    }
}

/// Named checks available to a suite. Built explicitly and passed to the
/// runner; there is no process-wide registry.
#[derive(Clone, Default)]
pub struct CheckRegistry {
    checks: HashMap<&'static str, Arc<dyn Check>>,
}

impl fmt::Debug for CheckRegistry {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("CheckRegistry")
            .field("registered_checks", &self.checks.len())
            .finish()
    }
}

impl CheckRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a check under its own name, replacing any previous entry.
    pub fn register<C: Check + 'static>(&mut self, check: C) -> &mut Self {
        self.checks.insert(check.name(), Arc::new(check));
        self
    }

    pub fn register_arc(&mut self, check: Arc<dyn Check>) -> &mut Self {
        self.checks.insert(check.name(), check);
        self
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.checks.contains_key(name)
    }

    pub fn names(&self) -> Vec<&'static str> {
        let mut names = self.checks.keys().copied().collect::<Vec<_>>();
        names.sort_unstable();
        names
    }

    pub fn list(&self) -> Vec<CheckSchema> {
        let mut schemas = self
            .checks
            .values()
            .map(|check| check.schema())
            .collect::<Vec<_>>();
        schemas.sort_by(|left, right| left.name.cmp(&right.name));
        schemas
    }

    pub fn resolve(&self, name: &str) -> Resolution {
        self.resolve_with_fallback(name, &[])
    }

    /// Try `name`, then each fallback in order.
    pub fn resolve_with_fallback(&self, name: &str, fallbacks: &[String]) -> Resolution {
        let candidates = std::iter::once(name).chain(fallbacks.iter().map(String::as_str));
        let mut tried = Vec::new();
        for candidate in candidates {
            if let Some((resolved, check)) = self.checks.get_key_value(candidate) {
                if candidate != name {
                    tracing::warn!(
                        requested = name,
                        resolved = *resolved,
                        "check resolved via fallback"
                    );
                }
                return Resolution::Found {
                    requested: name.to_string(),
                    resolved: *resolved,
                    check: Arc::clone(check),
                };
            }
            tried.push(candidate.to_string());
        }
        Resolution::Missing { tried }
    }
}

pub fn default_registry() -> CheckRegistry {
    let mut registry = CheckRegistry::new();
    registry
        .register(CommandCheck)
        .register(WiringCheck)
        .register(PerformanceBenchmarkCheck)
        .register(HistoryAnalysisCheck);
    registry
}
