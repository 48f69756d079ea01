//! # Component Contract
//!
//! A component is a unit of attachable behavior. Every instance embeds a
//! [`ComponentState`] holding its enable/disable counter and its
//! back-reference to the owning container.
//!
//! ## Ref-counted toggling
//!
//! ```text
//! counter: 1 (born disabled)
//!   enable()   1 -> 0   on_enable()
//!   disable()  0 -> 1   on_disable()
//!   disable()  1 -> 2   (no hook)
//!   enable()   2 -> 1   (no hook)
//! ```
//!
//! Each independent `disable()` must be matched by an `enable()` before the
//! component runs again. The boundary check is part of the same atomic
//! update as the mutation, so concurrent toggles fire each hook exactly once
//! per crossing.

use std::any::Any;
use std::fmt;
use std::ops::Deref;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::container::{Container, ContainerRef};
use crate::domain::{Capabilities, Declared, TypeInfo, TypeKey};
use crate::error::RuntimeError;

/// Behavior attachable to a container.
///
/// Implementors only provide [`Component::state`]; the hooks default to
/// no-ops. Toggling is provided by [`ComponentExt`].
pub trait Component: Send + Sync + 'static {
    /// Embedded lifecycle state.
    fn state(&self) -> &ComponentState;

    /// Attached to a container. Fires once: at SETUP, or from `add` once
    /// SETUP has run.
    fn on_add(&self) {}

    /// Counter reached zero.
    fn on_enable(&self) {}

    /// Counter left zero.
    fn on_disable(&self) {}

    /// Detached from a container (`remove` or `destroy`). Only fires after
    /// `on_add` did.
    fn on_remove(&self) {}
}

/// A concrete component type the catalog can instantiate.
pub trait ComponentType: Component + Declared + Sized {
    /// Factory used whenever the runtime needs a fresh instance.
    fn create() -> Result<Self, RuntimeError>;

    /// Capability views of this type, beyond itself and `dyn Component`.
    fn capabilities(caps: &mut Capabilities<Self>) {
        let _ = caps;
    }
}

/// Counter and owner shared by every component.
pub struct ComponentState {
    disable_count: AtomicU32,
    container: OnceCell<ContainerRef>,
}

impl ComponentState {
    pub fn new() -> Self {
        Self {
            disable_count: AtomicU32::new(1),
            container: OnceCell::new(),
        }
    }

    /// Current counter; zero means enabled.
    #[must_use]
    pub fn disable_count(&self) -> u32 {
        self.disable_count.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.disable_count() == 0
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.container.get().is_some()
    }

    /// Owning container.
    pub fn container(&self) -> Result<Container, RuntimeError> {
        self.container
            .get()
            .ok_or(RuntimeError::Unattached)?
            .upgrade()
    }

    /// Set the back-reference. Only the first call succeeds.
    pub(crate) fn attach(&self, owner: ContainerRef) -> Result<(), RuntimeError> {
        self.container.set(owner).map_err(|rejected| {
            let current = self.container.get().map_or(rejected.id(), ContainerRef::id);
            RuntimeError::AlreadyAttached {
                container_id: current,
            }
        })
    }

    /// Decrement unless already zero. Returns true when this call reached zero.
    fn release(&self) -> bool {
        self.disable_count
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |count| {
                count.checked_sub(1)
            })
            .is_ok_and(|previous| previous == 1)
    }

    /// Increment. Returns true when this call left zero.
    fn hold(&self) -> bool {
        self.add_holds(1) == 0
    }

    fn add_holds(&self, count: u32) -> u32 {
        match self
            .disable_count
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                Some(current.saturating_add(count))
            }) {
            Ok(previous) | Err(previous) => previous,
        }
    }

    fn reset(&self) -> u32 {
        self.disable_count.swap(0, Ordering::AcqRel)
    }
}

impl Default for ComponentState {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ComponentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentState")
            .field("disable_count", &self.disable_count())
            .field("container", &self.container.get().map(ContainerRef::id))
            .finish()
    }
}

/// Toggling operations, available on every [`Component`] including
/// `dyn Component`.
pub trait ComponentExt: Component {
    /// Lift one hold. Fires `on_enable` when the counter reaches zero.
    ///
    /// Returns whether the hook fired.
    fn enable(&self) -> bool {
        let crossed = self.state().release();
        if crossed {
            self.on_enable();
        }
        crossed
    }

    /// Add one hold. Fires `on_disable` when the counter leaves zero.
    ///
    /// Returns whether the hook fired.
    fn disable(&self) -> bool {
        let crossed = self.state().hold();
        if crossed {
            self.on_disable();
        }
        crossed
    }

    /// Drop every hold at once and fire `on_enable` unconditionally.
    ///
    /// Returns the previous counter for a later [`ComponentExt::fully_disable`].
    fn fully_enable(&self) -> u32 {
        let previous = self.state().reset();
        self.on_enable();
        previous
    }

    /// Add `count` holds back. Fires `on_disable` if the result is non-zero.
    fn fully_disable(&self, count: u32) {
        let previous = self.state().add_holds(count);
        if previous.saturating_add(count) > 0 {
            self.on_disable();
        }
    }

    fn is_enabled(&self) -> bool {
        self.state().is_enabled()
    }

    fn disable_count(&self) -> u32 {
        self.state().disable_count()
    }

    /// Owning container, or [`RuntimeError::Unattached`].
    fn container(&self) -> Result<Container, RuntimeError> {
        self.state().container()
    }
}

impl<T: Component + ?Sized> ComponentExt for T {}

/// A live, attached (or about to be attached) component.
///
/// Cheap to clone. Dereferences to `dyn Component`, so toggles work
/// directly on the handle.
#[derive(Clone)]
pub struct ComponentHandle {
    component: Arc<dyn Component>,
    instance: Arc<dyn Any + Send + Sync>,
    info: Arc<TypeInfo>,
}

impl ComponentHandle {
    pub(crate) fn new<T: ComponentType>(component: T, info: Arc<TypeInfo>) -> Self {
        let concrete = Arc::new(component);
        Self {
            component: Arc::clone(&concrete) as Arc<dyn Component>,
            instance: concrete,
            info,
        }
    }

    /// Concrete type of the instance.
    #[must_use]
    pub fn key(&self) -> TypeKey {
        self.info.key()
    }

    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.info.key().name()
    }

    pub fn info(&self) -> &TypeInfo {
        &self.info
    }

    pub fn lineage(&self) -> &[TypeKey] {
        self.info.lineage()
    }

    /// Whether `key` is in this component's lineage.
    #[must_use]
    pub fn matches(&self, key: TypeKey) -> bool {
        self.info.lineage().contains(&key)
    }

    #[must_use]
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.matches(TypeKey::of::<T>())
    }

    #[must_use]
    pub fn is_disabled_by_default(&self) -> bool {
        self.info.is_disabled_by_default()
    }

    /// View as `T`: the concrete type, `dyn Component`, or a declared
    /// capability. Ancestors from `extends` are not castable.
    pub fn cast<T: ?Sized + 'static>(&self) -> Option<Arc<T>> {
        self.info.cast::<T>(&self.instance)
    }

    pub fn component(&self) -> &Arc<dyn Component> {
        &self.component
    }

    /// Same instance.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.instance), Arc::as_ptr(&other.instance))
    }
}

impl Deref for ComponentHandle {
    type Target = dyn Component;

    fn deref(&self) -> &Self::Target {
        self.component.as_ref()
    }
}

impl fmt::Debug for ComponentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentHandle")
            .field("type", &self.type_name())
            .field("disable_count", &self.state().disable_count())
            .finish()
    }
}
