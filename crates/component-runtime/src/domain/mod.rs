//! Domain Layer - type identity and static metadata
//!
//! RULES:
//! - No locking
//! - Metadata is computed from types alone, never from instances

pub mod declaration;
pub mod descriptor;
pub mod type_info;
pub mod type_key;

pub use declaration::{Declaration, Declared, DeclaredType, Dependency};
pub use descriptor::{DependencyDescriptor, Factory};
pub use type_info::{Capabilities, TypeInfo};
pub use type_key::TypeKey;
