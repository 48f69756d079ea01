//! Resolved dependency descriptors.

use std::fmt;
use std::sync::Arc;

use super::type_key::TypeKey;
use crate::component::ComponentHandle;
use crate::container::Container;
use crate::error::RuntimeError;

/// Builds a fresh, unattached instance.
pub type Factory = Arc<dyn Fn() -> Result<ComponentHandle, RuntimeError> + Send + Sync>;

/// One entry of a resolved dependency order.
#[derive(Clone)]
pub struct DependencyDescriptor {
    key: TypeKey,
    explicit: bool,
    factory: Factory,
}

impl DependencyDescriptor {
    pub(crate) fn new(key: TypeKey, explicit: bool, factory: Factory) -> Self {
        Self {
            key,
            explicit,
            factory,
        }
    }

    /// Concrete type produced.
    #[must_use]
    pub fn key(&self) -> TypeKey {
        self.key
    }

    /// Explicit descriptors are instantiated automatically.
    #[must_use]
    pub fn is_explicit(&self) -> bool {
        self.explicit
    }

    /// Create an instance and attach it to `container`.
    ///
    /// The instance is not yet validated, indexed or hooked.
    pub fn instantiate(&self, container: &Container) -> Result<ComponentHandle, RuntimeError> {
        let handle = (self.factory)()?;
        handle.state().attach(container.downgrade())?;
        Ok(handle)
    }
}

impl fmt::Debug for DependencyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependencyDescriptor")
            .field("key", &self.key)
            .field("explicit", &self.explicit)
            .finish()
    }
}
