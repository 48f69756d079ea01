//! Error types for the component runtime

use thiserror::Error;

/// Errors raised by resolution, instantiation and attachment.
///
/// Toggling and lifecycle calls never fail; only operations that build or
/// wire components can return one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// An explicit dependency (or an `add` target) has no factory in the catalog.
    #[error("{type_name} cannot be instantiated (required by {required_by}): not registered in the catalog")]
    NotInstantiable {
        type_name: &'static str,
        required_by: &'static str,
    },

    /// A component factory returned an error.
    #[error("Failed to instantiate {type_name}: {reason}")]
    Instantiation {
        type_name: &'static str,
        reason: String,
    },

    /// Unresolvable dependency residue under the fail-fast cycle policy.
    #[error("Dependency cycle while resolving {owner}: {residue:?}")]
    DependencyCycle {
        owner: &'static str,
        residue: Vec<&'static str>,
    },

    /// The component has not been attached to a container yet.
    #[error("Component is not attached to a container")]
    Unattached,

    /// `attach` was called on a component that already has an owner.
    #[error("Component is already attached to container {container_id}")]
    AlreadyAttached { container_id: uuid::Uuid },

    /// The owning container has been dropped.
    #[error("Owning container {container_id} no longer exists")]
    ContainerDropped { container_id: uuid::Uuid },
}

impl RuntimeError {
    /// Convenience constructor for factory failures of `T`.
    pub fn instantiation<T: ?Sized + 'static>(reason: impl Into<String>) -> Self {
        Self::Instantiation {
            type_name: std::any::type_name::<T>(),
            reason: reason.into(),
        }
    }
}
