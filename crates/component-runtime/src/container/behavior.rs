//! Container-level hooks and lifecycle stages.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Container;
use crate::component::ComponentHandle;

/// Ordered, idempotent initialization phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Stage {
    /// Container setup, then `on_add` on every component.
    Setup,
    /// Container create hook.
    Create,
    /// Enable components, then the container enable hook.
    Enable,
}

impl Stage {
    /// Every stage, in execution order.
    pub const ALL: [Stage; 3] = [Stage::Setup, Stage::Create, Stage::Enable];

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Setup => "SETUP",
            Self::Create => "CREATE",
            Self::Enable => "ENABLE",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Overridable container hooks.
///
/// Every method defaults to a no-op (or acceptance). Hooks run without the
/// container's internal lock held, so they may query it.
pub trait ContainerBehavior: Send + Sync {
    /// Runs before `on_add` is fired during SETUP.
    fn setup(&self, container: &Container) {
        let _ = container;
    }

    /// CREATE stage.
    fn create(&self, container: &Container) {
        let _ = container;
    }

    /// Runs after components are enabled during ENABLE.
    fn enable(&self, container: &Container) {
        let _ = container;
    }

    /// First step of `destroy`, before components are disabled.
    fn disable(&self, container: &Container) {
        let _ = container;
    }

    /// Runs between disabling components and firing `on_remove`.
    fn destroy(&self, container: &Container) {
        let _ = container;
    }

    /// Accept or silently drop a freshly instantiated component before it
    /// is attached.
    fn validate(&self, container: &Container, component: &ComponentHandle) -> bool {
        let _ = (container, component);
        true
    }
}

/// Accepts everything and does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultBehavior;

impl ContainerBehavior for DefaultBehavior {}
