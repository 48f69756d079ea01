//! # Component Runtime
//!
//! Builds composite objects ("containers") out of independently written
//! components. Components declare what they depend on; the runtime resolves
//! a dependency order once per owner type, instantiates the required
//! components, and drives them through a staged lifecycle.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐  register   ┌──────────────────┐  resolve   ┌────────────┐
//! │ Host code  │ ──────────▶ │ ComponentCatalog │ ─────────▶ │ Resolution │
//! └────────────┘             └──────────────────┘  (cached)  └────────────┘
//!        │                                                         │
//!        │ Container::builder::<Owner>()                           │ instantiate
//!        ▼                                                         ▼
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │ Container   components (ordered) + lineage index + completed stages   │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rules
//!
//! - A component belongs to exactly one container, for its whole life
//! - Explicit dependencies are instantiated; soft ones only constrain order
//! - Every `disable()` needs a matching `enable()` before hooks fire again
//! - Destroy is terminal
//!
//! ## Example
//!
//! ```ignore
//! ComponentCatalog::global()
//!     .register::<Storage>()
//!     .register::<Scoreboard>();
//!
//! let arena = Container::new::<Arena>()?;
//! arena.initialize_all();
//! let board = arena.get::<Scoreboard>().unwrap();
//! arena.destroy();
//! ```

#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::module_name_repetitions)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

#[cfg(test)]
#[macro_use]
mod test_support;

pub mod catalog;
pub mod component;
pub mod config;
pub mod container;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod resolver;

pub use catalog::{CatalogEntry, ComponentCatalog};
pub use component::{Component, ComponentExt, ComponentHandle, ComponentState, ComponentType};
pub use config::{CyclePolicy, ResolverConfig};
pub use container::{Container, ContainerBehavior, ContainerBuilder, DefaultBehavior, Stage};
pub use domain::{Capabilities, Declaration, Declared, TypeKey};
pub use error::RuntimeError;
pub use metrics::gather_metrics;
pub use resolver::Resolution;
