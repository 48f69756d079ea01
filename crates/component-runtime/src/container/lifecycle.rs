//! Staged initialization and teardown.

use tracing::{debug, info};

use super::{Container, Stage};
use crate::component::ComponentExt;
use crate::metrics::COMPONENTS_REMOVED;

impl Container {
    /// Run `stage` once.
    ///
    /// Returns false when the stage already ran or the container is
    /// destroyed. The stage is marked before its hooks fire, so a hook that
    /// re-enters `initialize` for the same stage is a no-op.
    ///
    /// Components attached before SETUP get `on_add` here, and ones attached
    /// before ENABLE get enabled here; later arrivals get both from `add`.
    pub fn initialize(&self, stage: Stage) -> bool {
        let components = {
            let mut state = self.inner.state.write();
            if state.destroyed || !state.stages.insert(stage) {
                return false;
            }
            state.components.clone()
        };

        let behavior = &self.inner.behavior;
        match stage {
            Stage::Setup => {
                behavior.setup(self);
                for component in &components {
                    component.on_add();
                }
            }
            Stage::Create => behavior.create(self),
            Stage::Enable => {
                for component in components.iter().filter(|c| !c.is_disabled_by_default()) {
                    component.enable();
                }
                behavior.enable(self);
            }
        }

        debug!(id = %self.id(), %stage, components = components.len(), "[Container] Stage complete");
        true
    }

    /// SETUP, CREATE, then ENABLE. Returns how many stages ran now.
    pub fn initialize_all(&self) -> usize {
        let ran = Stage::ALL
            .iter()
            .filter(|stage| self.initialize(**stage))
            .count();
        if ran > 0 {
            info!(id = %self.id(), owner = %self.owner(), "[Container] Initialized");
        }
        ran
    }

    /// Disable and detach everything. Terminal and idempotent.
    ///
    /// Returns false if the container was already destroyed. `on_remove`
    /// only fires when SETUP ran, pairing it with `on_add`.
    pub fn destroy(&self) -> bool {
        let (components, added) = {
            let mut state = self.inner.state.write();
            if state.destroyed {
                return false;
            }
            state.destroyed = true;
            (state.components.clone(), state.stages.contains(&Stage::Setup))
        };
        let behavior = &self.inner.behavior;

        behavior.disable(self);
        for component in &components {
            component.disable();
        }
        behavior.destroy(self);
        if added {
            for component in &components {
                component.on_remove();
            }
        }

        {
            let mut state = self.inner.state.write();
            state.components.clear();
            state.index.clear();
        }

        COMPONENTS_REMOVED.inc_by(components.len() as u64);
        info!(id = %self.id(), components = components.len(), "[Container] Destroyed");
        true
    }
}
