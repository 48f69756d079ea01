//! # Resolver Configuration
//!
//! Controls how the dependency resolver reacts to a graph it cannot fully
//! order (a cycle, or an edge leaving the collected node set).
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `COMPONENT_CYCLE_POLICY` | `best-effort` | `best-effort` or `fail-fast` |

use std::env;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Environment variable read by [`ResolverConfig::from_env`].
pub const CYCLE_POLICY_ENV: &str = "COMPONENT_CYCLE_POLICY";

/// What to do with nodes that remain after topological ordering stalls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CyclePolicy {
    /// Log the residue and append it in encounter order.
    ///
    /// Containers built on such an order may initialize components before
    /// their dependencies.
    #[default]
    BestEffort,
    /// Refuse to produce an order.
    FailFast,
}

impl fmt::Display for CyclePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BestEffort => write!(f, "best-effort"),
            Self::FailFast => write!(f, "fail-fast"),
        }
    }
}

/// Unknown cycle policy name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown cycle policy: {0} (expected best-effort or fail-fast)")]
pub struct ParsePolicyError(pub String);

impl FromStr for CyclePolicy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "best-effort" | "besteffort" | "lenient" => Ok(Self::BestEffort),
            "fail-fast" | "failfast" | "strict" => Ok(Self::FailFast),
            other => Err(ParsePolicyError(other.to_string())),
        }
    }
}

/// Resolver configuration, fixed for the lifetime of a catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Residue handling.
    #[serde(default)]
    pub cycle_policy: CyclePolicy,
}

impl ResolverConfig {
    /// Load from environment variables, falling back to defaults.
    ///
    /// An unparseable value keeps the default and logs a warning.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(raw) = env::var(CYCLE_POLICY_ENV) {
            match raw.parse() {
                Ok(policy) => config.cycle_policy = policy,
                Err(e) => tracing::warn!("[Config] {e}; keeping {}", config.cycle_policy),
            }
        }

        config
    }

    /// Builder-style method to set the cycle policy
    pub fn with_cycle_policy(mut self, policy: CyclePolicy) -> Self {
        self.cycle_policy = policy;
        self
    }
}
