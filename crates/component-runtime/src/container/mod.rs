//! # Component Container
//!
//! Owns the live components of one composite object, in dependency order,
//! plus an index from every lineage key to the components filed under it.
//!
//! ## Lifecycle
//!
//! ```text
//! build      resolve owner -> instantiate -> attach -> validate -> index
//! SETUP      behavior.setup, on_add (each, in order)
//! CREATE     behavior.create
//! ENABLE     enable (each not disabled_by_default), behavior.enable
//! destroy    behavior.disable, disable (each), behavior.destroy,
//!            on_remove (each), clear
//! ```
//!
//! ## Thread Safety
//!
//! - `Container` is a cheap `Arc` handle; clones share one state
//! - Components hold a `Weak` back-reference, so there is no cycle
//! - State sits behind a `parking_lot::RwLock` that is never held while a
//!   hook runs, so hooks may query the container
//! - Lifecycle and mutation are expected on one logical thread per container

mod behavior;
mod index;
mod lifecycle;
mod mutation;

pub use behavior::{ContainerBehavior, DefaultBehavior, Stage};

use std::collections::BTreeSet;
use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::catalog::ComponentCatalog;
use crate::component::ComponentHandle;
use crate::domain::{Declared, DeclaredType, TypeKey};
use crate::error::RuntimeError;
use crate::metrics::{COMPONENTS_ATTACHED, CONTAINERS_BUILT, VALIDATION_REJECTIONS};
use index::ComponentIndex;

/// A composite object assembled from components.
#[derive(Clone)]
pub struct Container {
    inner: Arc<ContainerInner>,
}

pub(crate) struct ContainerInner {
    id: Uuid,
    owner: TypeKey,
    catalog: Arc<ComponentCatalog>,
    behavior: Box<dyn ContainerBehavior>,
    state: RwLock<ContainerState>,
}

#[derive(Default)]
struct ContainerState {
    components: Vec<ComponentHandle>,
    index: ComponentIndex,
    stages: BTreeSet<Stage>,
    destroyed: bool,
}

impl ContainerState {
    fn insert(&mut self, handle: ComponentHandle) {
        self.index.insert(&handle);
        self.components.push(handle);
        COMPONENTS_ATTACHED.inc();
    }

    fn detach(&mut self, handle: &ComponentHandle) {
        self.components.retain(|other| !other.ptr_eq(handle));
        self.index.remove(handle);
    }
}

/// Non-owning reference held by attached components.
#[derive(Clone)]
pub(crate) struct ContainerRef {
    id: Uuid,
    inner: Weak<ContainerInner>,
}

impl ContainerRef {
    pub(crate) fn id(&self) -> Uuid {
        self.id
    }

    pub(crate) fn upgrade(&self) -> Result<Container, RuntimeError> {
        self.inner
            .upgrade()
            .map(|inner| Container { inner })
            .ok_or(RuntimeError::ContainerDropped {
                container_id: self.id,
            })
    }
}

/// Builder for [`Container`].
///
/// ```ignore
/// let arena = Container::builder::<Arena>()
///     .behavior(ArenaHooks::new(settings))
///     .build()?;
/// arena.initialize_all();
/// ```
pub struct ContainerBuilder {
    owner: DeclaredType,
    catalog: Option<Arc<ComponentCatalog>>,
    behavior: Option<Box<dyn ContainerBehavior>>,
}

impl ContainerBuilder {
    /// Resolve against `catalog` instead of the global one.
    pub fn catalog(mut self, catalog: Arc<ComponentCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Container-level hooks and validation.
    pub fn behavior(mut self, behavior: impl ContainerBehavior + 'static) -> Self {
        self.behavior = Some(Box::new(behavior));
        self
    }

    /// Resolve the owner and instantiate its explicit dependencies.
    ///
    /// No hook fires here; call [`Container::initialize_all`] next.
    #[instrument(name = "container_build", skip_all, fields(owner = %self.owner.key()))]
    pub fn build(self) -> Result<Container, RuntimeError> {
        let catalog = self.catalog.unwrap_or_else(ComponentCatalog::global);
        let resolution = catalog.resolve_declared(self.owner)?;

        let container = Container {
            inner: Arc::new(ContainerInner {
                id: Uuid::new_v4(),
                owner: self.owner.key(),
                catalog,
                behavior: self
                    .behavior
                    .unwrap_or_else(|| Box::new(DefaultBehavior)),
                state: RwLock::new(ContainerState::default()),
            }),
        };

        for descriptor in resolution.iter().filter(|d| d.is_explicit()) {
            let handle = descriptor.instantiate(&container)?;
            if container.accepts(&handle) {
                container.inner.state.write().insert(handle);
            }
        }

        CONTAINERS_BUILT.inc();
        info!(
            id = %container.id(),
            components = container.len(),
            "[Container] Built"
        );
        Ok(container)
    }
}

impl Container {
    /// Start building a container for owner type `O`.
    pub fn builder<O: Declared + ?Sized>() -> ContainerBuilder {
        ContainerBuilder {
            owner: DeclaredType::of::<O>(),
            catalog: None,
            behavior: None,
        }
    }

    /// Build for `O` with the global catalog and no hooks.
    pub fn new<O: Declared + ?Sized>() -> Result<Self, RuntimeError> {
        Self::builder::<O>().build()
    }

    pub(crate) fn downgrade(&self) -> ContainerRef {
        ContainerRef {
            id: self.inner.id,
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Run the validation hook, recording rejections.
    fn accepts(&self, handle: &ComponentHandle) -> bool {
        let accepted = self.inner.behavior.validate(self, handle);
        if !accepted {
            VALIDATION_REJECTIONS.inc();
            debug!(id = %self.id(), component = handle.type_name(), "[Container] Rejected by validation");
        }
        accepted
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    /// Type the container was built for.
    #[must_use]
    pub fn owner(&self) -> TypeKey {
        self.inner.owner
    }

    pub fn catalog(&self) -> &Arc<ComponentCatalog> {
        &self.inner.catalog
    }

    /// First component filed under `T`, viewed as `T`.
    ///
    /// `T` may be the concrete type, `dyn Component` or a declared
    /// capability. Absent is `None`; callers that know the component exists
    /// may unwrap.
    ///
    /// An `extends` ancestor is not castable, so `get::<Ancestor>()` is
    /// always `None` even when `has::<Ancestor>()` is true. Use
    /// [`Container::handle`] or [`Container::handles`] for ancestors.
    pub fn get<T: ?Sized + 'static>(&self) -> Option<Arc<T>> {
        self.handles::<T>().iter().find_map(ComponentHandle::cast::<T>)
    }

    /// Every component filed under `T`, viewed as `T`.
    ///
    /// Components filed under `T` only as an `extends` ancestor are skipped;
    /// [`Container::handles`] returns them.
    pub fn get_all<T: ?Sized + 'static>(&self) -> Vec<Arc<T>> {
        self.handles::<T>()
            .iter()
            .filter_map(ComponentHandle::cast::<T>)
            .collect()
    }

    #[must_use]
    pub fn has<T: ?Sized + 'static>(&self) -> bool {
        self.has_key(TypeKey::of::<T>())
    }

    #[must_use]
    pub fn has_key(&self, key: TypeKey) -> bool {
        self.inner.state.read().index.contains(key)
    }

    /// First component filed under `T`. Works for `extends` ancestors too.
    pub fn handle<T: ?Sized + 'static>(&self) -> Option<ComponentHandle> {
        self.handle_key(TypeKey::of::<T>())
    }

    pub fn handle_key(&self, key: TypeKey) -> Option<ComponentHandle> {
        self.inner.state.read().index.get(key).first().cloned()
    }

    pub fn handles<T: ?Sized + 'static>(&self) -> Vec<ComponentHandle> {
        self.handles_key(TypeKey::of::<T>())
    }

    pub fn handles_key(&self, key: TypeKey) -> Vec<ComponentHandle> {
        self.inner.state.read().index.get(key).to_vec()
    }

    /// Snapshot of every component, in order.
    pub fn components(&self) -> Vec<ComponentHandle> {
        self.inner.state.read().components.clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.state.read().components.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Completed stages, in execution order.
    pub fn stages(&self) -> Vec<Stage> {
        self.inner.state.read().stages.iter().copied().collect()
    }

    #[must_use]
    pub fn has_completed(&self, stage: Stage) -> bool {
        self.inner.state.read().stages.contains(&stage)
    }

    /// Every stage has run.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        Stage::ALL.iter().all(|stage| self.has_completed(*stage))
    }

    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.inner.state.read().destroyed
    }

    /// Same underlying container.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.read();
        f.debug_struct("Container")
            .field("id", &self.inner.id)
            .field("owner", &self.inner.owner)
            .field("components", &state.components.len())
            .field("index_buckets", &state.index.bucket_count())
            .field("stages", &state.stages)
            .field("destroyed", &state.destroyed)
            .finish()
    }
}
