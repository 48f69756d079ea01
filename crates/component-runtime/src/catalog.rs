//! # Component Catalog
//!
//! The statically registered metadata table. Hosts register every concrete
//! component type once at startup; the catalog stores its factory, its
//! declaration and its lineage, answers "every implementation of X", and
//! memoizes dependency orders per owner type.
//!
//! ```ignore
//! let catalog = ComponentCatalog::global();
//! catalog
//!     .register::<Storage>()
//!     .register::<Scoreboard>()
//!     .register::<Tablist>();
//! ```
//!
//! ## Cache lifecycle
//!
//! Orders are computed on first use and kept for the lifetime of the
//! catalog. Registering a type afterwards does not invalidate them.

use std::collections::HashMap;
use std::sync::Arc;

use lazy_static::lazy_static;
use parking_lot::RwLock;
use tracing::{debug, instrument, warn};

use crate::component::{ComponentHandle, ComponentType};
use crate::config::ResolverConfig;
use crate::domain::{Declared, DeclaredType, DependencyDescriptor, Factory, TypeInfo, TypeKey};
use crate::error::RuntimeError;
use crate::metrics::RESOLUTIONS_COMPUTED;
use crate::resolver::{self, Resolution};

lazy_static! {
    static ref GLOBAL_CATALOG: Arc<ComponentCatalog> =
        Arc::new(ComponentCatalog::new(ResolverConfig::from_env()));
}

/// A registered concrete type.
#[derive(Clone)]
pub struct CatalogEntry {
    declared: DeclaredType,
    info: Arc<TypeInfo>,
    factory: Factory,
}

impl CatalogEntry {
    fn of<T: ComponentType>() -> Self {
        let info = Arc::new(TypeInfo::of::<T>());
        let factory_info = Arc::clone(&info);
        let factory: Factory = Arc::new(move || {
            T::create().map(|component| ComponentHandle::new(component, Arc::clone(&factory_info)))
        });

        Self {
            declared: DeclaredType::of::<T>(),
            info,
            factory,
        }
    }

    #[must_use]
    pub fn key(&self) -> TypeKey {
        self.info.key()
    }

    #[must_use]
    pub fn declared(&self) -> DeclaredType {
        self.declared
    }

    pub fn info(&self) -> &Arc<TypeInfo> {
        &self.info
    }

    pub(crate) fn descriptor(&self, explicit: bool) -> DependencyDescriptor {
        DependencyDescriptor::new(self.key(), explicit, Arc::clone(&self.factory))
    }
}

impl std::fmt::Debug for CatalogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogEntry").field("info", &self.info).finish()
    }
}

#[derive(Default)]
struct CatalogTable {
    /// Registration order, used wherever enumeration must be deterministic.
    order: Vec<TypeKey>,
    entries: HashMap<TypeKey, CatalogEntry>,
}

/// Registry of concrete component types plus the resolution cache.
pub struct ComponentCatalog {
    config: ResolverConfig,
    table: RwLock<CatalogTable>,
    cache: RwLock<HashMap<TypeKey, Arc<Resolution>>>,
}

impl ComponentCatalog {
    /// Create an isolated catalog.
    pub fn new(config: ResolverConfig) -> Self {
        Self {
            config,
            table: RwLock::new(CatalogTable::default()),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// The process-wide catalog, configured from the environment.
    pub fn global() -> Arc<ComponentCatalog> {
        Arc::clone(&GLOBAL_CATALOG)
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Register a concrete type. Registering twice is a no-op.
    pub fn register<T: ComponentType>(&self) -> &Self {
        let entry = CatalogEntry::of::<T>();
        let key = entry.key();

        {
            let mut table = self.table.write();
            if table.entries.contains_key(&key) {
                return self;
            }
            table.order.push(key);
            table.entries.insert(key, entry);
        }

        if !self.cache.read().is_empty() {
            warn!("[Catalog] {key} registered after resolution started; cached orders are kept");
        }
        debug!("[Catalog] Registered {key}");
        self
    }

    #[must_use]
    pub fn is_registered(&self, key: TypeKey) -> bool {
        self.table.read().entries.contains_key(&key)
    }

    pub fn entry(&self, key: TypeKey) -> Option<CatalogEntry> {
        self.table.read().entries.get(&key).cloned()
    }

    /// Registered types whose lineage contains `base`, in registration
    /// order. `base` itself is excluded.
    pub fn implementations_of(&self, base: TypeKey) -> Vec<CatalogEntry> {
        let table = self.table.read();
        table
            .order
            .iter()
            .filter(|key| **key != base)
            .filter_map(|key| table.entries.get(key))
            .filter(|entry| entry.info.lineage().contains(&base))
            .cloned()
            .collect()
    }

    /// Registered keys in registration order.
    pub fn keys(&self) -> Vec<TypeKey> {
        self.table.read().order.clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.table.read().order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dependency order for owner type `O`.
    pub fn resolve<O: Declared + ?Sized>(&self) -> Result<Arc<Resolution>, RuntimeError> {
        self.resolve_declared(DeclaredType::of::<O>())
    }

    /// Dependency order for `owner`, computed once and cached.
    ///
    /// Two threads missing the cache together may both compute; the first
    /// insert wins and both receive it. Errors are never cached.
    #[instrument(name = "resolve", skip_all, fields(owner = %owner.key()))]
    pub fn resolve_declared(&self, owner: DeclaredType) -> Result<Arc<Resolution>, RuntimeError> {
        if let Some(cached) = self.cache.read().get(&owner.key()) {
            return Ok(Arc::clone(cached));
        }

        let computed = Arc::new(resolver::resolve(self, owner)?);
        RESOLUTIONS_COMPUTED.inc();
        debug!(
            components = computed.len(),
            soft = computed.soft_dependencies().len(),
            "[Catalog] Dependency order computed"
        );

        let mut cache = self.cache.write();
        Ok(Arc::clone(cache.entry(owner.key()).or_insert(computed)))
    }

    /// Number of memoized orders.
    #[must_use]
    pub fn cached_resolutions(&self) -> usize {
        self.cache.read().len()
    }
}

impl Default for ComponentCatalog {
    fn default() -> Self {
        Self::new(ResolverConfig::default())
    }
}

impl std::fmt::Debug for ComponentCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentCatalog")
            .field("config", &self.config)
            .field("registered", &self.len())
            .field("cached", &self.cached_resolutions())
            .finish()
    }
}
