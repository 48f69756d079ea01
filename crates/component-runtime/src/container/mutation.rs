//! Adding, removing and toggling components on a live container.

use tracing::{debug, info};

use super::{Container, Stage};
use crate::component::{ComponentExt, ComponentHandle, ComponentType};
use crate::domain::{DependencyDescriptor, TypeKey};
use crate::error::RuntimeError;
use crate::metrics::COMPONENTS_REMOVED;

impl Container {
    /// Attach a new `T`, plus any of its explicit dependencies not present.
    ///
    /// Returns the new handle, or `None` when validation rejected it or the
    /// container is destroyed. `T` must be registered in the catalog.
    pub fn add<T: ComponentType>(&self) -> Result<Option<ComponentHandle>, RuntimeError> {
        self.add_key(TypeKey::of::<T>())
    }

    /// [`Container::add`] by key.
    pub fn add_key(&self, key: TypeKey) -> Result<Option<ComponentHandle>, RuntimeError> {
        if self.is_destroyed() {
            return Ok(None);
        }

        let entry = self
            .inner
            .catalog
            .entry(key)
            .ok_or(RuntimeError::NotInstantiable {
                type_name: key.name(),
                required_by: self.inner.owner.name(),
            })?;

        let resolution = self.inner.catalog.resolve_declared(entry.declared())?;
        for descriptor in resolution.iter().filter(|d| d.is_explicit()) {
            if !self.has_key(descriptor.key()) {
                self.attach_new(descriptor)?;
            }
        }

        self.attach_new(&entry.descriptor(true))
    }

    /// Instantiate, validate, index, `on_add`, then auto-enable.
    ///
    /// `on_add` waits for SETUP and auto-enable waits for ENABLE; a stage
    /// that has not run yet delivers them itself.
    fn attach_new(
        &self,
        descriptor: &DependencyDescriptor,
    ) -> Result<Option<ComponentHandle>, RuntimeError> {
        let handle = descriptor.instantiate(self)?;
        if !self.accepts(&handle) {
            return Ok(None);
        }

        let (added, enabled) = {
            let mut state = self.inner.state.write();
            if state.destroyed {
                return Ok(None);
            }
            state.insert(handle.clone());
            (
                state.stages.contains(&Stage::Setup),
                state.stages.contains(&Stage::Enable),
            )
        };

        if added {
            handle.on_add();
        }
        if enabled && !handle.is_disabled_by_default() {
            handle.enable();
        }

        debug!(id = %self.id(), component = handle.type_name(), "[Container] Attached");
        Ok(Some(handle))
    }

    /// Detach every component filed under `T`. Returns how many went.
    pub fn remove<T: ?Sized + 'static>(&self) -> usize {
        self.remove_key(TypeKey::of::<T>())
    }

    /// [`Container::remove`] by key. Dependencies are left in place.
    ///
    /// `on_remove` is skipped before SETUP, since `on_add` never fired.
    pub fn remove_key(&self, key: TypeKey) -> usize {
        let (matches, added) = {
            let state = self.inner.state.read();
            if state.destroyed {
                return 0;
            }
            (state.index.get(key).to_vec(), state.stages.contains(&Stage::Setup))
        };
        if matches.is_empty() {
            return 0;
        }

        for handle in &matches {
            handle.disable();
            if added {
                handle.on_remove();
            }
        }

        {
            let mut state = self.inner.state.write();
            for handle in &matches {
                state.detach(handle);
            }
        }

        COMPONENTS_REMOVED.inc_by(matches.len() as u64);
        info!(id = %self.id(), %key, removed = matches.len(), "[Container] Removed");
        matches.len()
    }

    /// Enable every disabled component filed under any of `keys`.
    ///
    /// Returns how many were toggled.
    pub fn enable(&self, keys: &[TypeKey]) -> usize {
        self.toggle_matching(keys, true)
    }

    /// Disable every enabled component filed under any of `keys`.
    pub fn disable(&self, keys: &[TypeKey]) -> usize {
        self.toggle_matching(keys, false)
    }

    /// Enable every disabled component not filed under `excluded`.
    pub fn enable_all_except(&self, excluded: &[TypeKey]) -> usize {
        self.toggle_all_except(excluded, true)
    }

    /// Disable every enabled component not filed under `excluded`.
    pub fn disable_all_except(&self, excluded: &[TypeKey]) -> usize {
        self.toggle_all_except(excluded, false)
    }

    fn toggle_matching(&self, keys: &[TypeKey], enable: bool) -> usize {
        if self.is_destroyed() {
            return 0;
        }
        let mut targets: Vec<ComponentHandle> = Vec::new();
        for key in keys {
            for handle in self.handles_key(*key) {
                if !targets.iter().any(|seen| seen.ptr_eq(&handle)) {
                    targets.push(handle);
                }
            }
        }
        toggle(&targets, enable)
    }

    fn toggle_all_except(&self, excluded: &[TypeKey], enable: bool) -> usize {
        if self.is_destroyed() {
            return 0;
        }
        let targets: Vec<ComponentHandle> = self
            .components()
            .into_iter()
            .filter(|handle| !excluded.iter().any(|key| handle.matches(*key)))
            .collect();
        toggle(&targets, enable)
    }
}

/// Move each handle not already in the target state one step toward it.
fn toggle(targets: &[ComponentHandle], enable: bool) -> usize {
    let mut toggled = 0;
    for handle in targets.iter().filter(|h| h.is_enabled() != enable) {
        if enable {
            handle.enable();
        } else {
            handle.disable();
        }
        toggled += 1;
    }
    toggled
}
