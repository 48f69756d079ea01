//! # Dependency Graph Resolver
//!
//! Turns an owner type's declarations into an ordered list of descriptors.
//!
//! ## Algorithm
//!
//! ```text
//! 1. Collection   walk the owner's declaration chain; every depends_on entry
//!                 is recorded and recursed into, every depends_on_all_of
//!                 base expands to its registered implementations; a type
//!                 is explicit only along a path of hard edges
//! 2. Ordering     one node per explicit type; edges are the transitively
//!                 reachable types that are themselves nodes; repeatedly move
//!                 edge-free nodes to the output
//! 3. Residue      a pass that moves nothing leaves a cycle: fail, or append
//!                 the rest in encounter order (CyclePolicy)
//! ```
//!
//! Soft targets only constrain order when something else makes them a node.

use std::collections::{HashMap, HashSet};

use tracing::warn;

use crate::catalog::ComponentCatalog;
use crate::config::CyclePolicy;
use crate::domain::{DeclaredType, DependencyDescriptor, TypeKey};
use crate::error::RuntimeError;
use crate::metrics::GRAPH_RESIDUES;

/// Ordered outcome of resolving one owner type.
#[derive(Debug, Clone)]
pub struct Resolution {
    owner: TypeKey,
    descriptors: Vec<DependencyDescriptor>,
    soft: Vec<TypeKey>,
    residue: Vec<TypeKey>,
}

impl Resolution {
    #[must_use]
    pub fn owner(&self) -> TypeKey {
        self.owner
    }

    /// Explicit descriptors, dependencies first.
    pub fn descriptors(&self) -> &[DependencyDescriptor] {
        &self.descriptors
    }

    pub fn iter(&self) -> impl Iterator<Item = &DependencyDescriptor> {
        self.descriptors.iter()
    }

    /// Keys of [`Resolution::descriptors`], in order.
    pub fn keys(&self) -> Vec<TypeKey> {
        self.descriptors.iter().map(DependencyDescriptor::key).collect()
    }

    /// Types reached only through soft references, directly or through a
    /// softly referenced type's own dependencies. Never instantiated.
    pub fn soft_dependencies(&self) -> &[TypeKey] {
        &self.soft
    }

    /// Types appended without a valid order.
    pub fn residue(&self) -> &[TypeKey] {
        &self.residue
    }

    #[must_use]
    pub fn is_fully_ordered(&self) -> bool {
        self.residue.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

struct Node {
    ty: DeclaredType,
    explicit: bool,
    required_by: TypeKey,
}

struct Collector<'a> {
    catalog: &'a ComponentCatalog,
    nodes: Vec<Node>,
    positions: HashMap<TypeKey, usize>,
    /// Direct edges per expanded type.
    edges: HashMap<TypeKey, Vec<TypeKey>>,
    explicit_walks: HashSet<TypeKey>,
}

impl<'a> Collector<'a> {
    fn new(catalog: &'a ComponentCatalog) -> Self {
        Self {
            catalog,
            nodes: Vec::new(),
            positions: HashMap::new(),
            edges: HashMap::new(),
            explicit_walks: HashSet::new(),
        }
    }

    /// Direct dependencies of `ty`, inherited ones included.
    fn direct_edges(&self, ty: DeclaredType) -> Vec<(DeclaredType, bool)> {
        let mut edges = Vec::new();

        for (_, decl) in ty.chain() {
            for dep in decl.dependencies() {
                edges.push((dep.target, dep.soft));
            }
            for base in decl.all_of() {
                for entry in self.catalog.implementations_of(*base) {
                    edges.push((entry.declared(), false));
                }
            }
        }

        edges
    }

    /// Walk `ty`'s edges. Hard edges only make their target explicit when
    /// `ty` itself was reached through hard edges, so a type first seen
    /// softly is walked again once something requires it.
    fn collect(&mut self, ty: DeclaredType, explicit: bool) {
        let key = ty.key();
        let seen = self.edges.contains_key(&key);
        let promoted = explicit && self.explicit_walks.insert(key);
        if seen && !promoted {
            return;
        }

        let edges = self.direct_edges(ty);
        self.edges
            .insert(key, edges.iter().map(|(target, _)| target.key()).collect());

        for (target, soft) in edges {
            let hard = explicit && !soft;
            self.record(target, hard, key);
            self.collect(target, hard);
        }
    }

    fn record(&mut self, ty: DeclaredType, explicit: bool, required_by: TypeKey) {
        match self.positions.get(&ty.key()) {
            Some(&pos) => {
                let node = &mut self.nodes[pos];
                if explicit && !node.explicit {
                    node.explicit = true;
                    node.required_by = required_by;
                }
            }
            None => {
                self.positions.insert(ty.key(), self.nodes.len());
                self.nodes.push(Node {
                    ty,
                    explicit,
                    required_by,
                });
            }
        }
    }

    /// Every type reachable from `from` through one or more edges.
    fn reachable(&self, from: TypeKey) -> HashSet<TypeKey> {
        let mut seen = HashSet::new();
        let mut stack = self.edges.get(&from).cloned().unwrap_or_default();

        while let Some(key) = stack.pop() {
            if seen.insert(key) {
                if let Some(next) = self.edges.get(&key) {
                    stack.extend(next.iter().copied());
                }
            }
        }

        seen
    }
}

/// Order explicit `nodes`, returning `(ordered, residue)` as node keys.
fn topological_order(nodes: Vec<(TypeKey, HashSet<TypeKey>)>) -> (Vec<TypeKey>, Vec<TypeKey>) {
    let mut pending = nodes;
    let mut ordered = Vec::with_capacity(pending.len());

    while !pending.is_empty() {
        let before = pending.len();
        let mut i = 0;

        while i < pending.len() {
            if pending[i].1.is_empty() {
                let (key, _) = pending.remove(i);
                for (_, edges) in pending.iter_mut() {
                    edges.remove(&key);
                }
                ordered.push(key);
            } else {
                i += 1;
            }
        }

        if pending.len() == before {
            break;
        }
    }

    (ordered, pending.into_iter().map(|(key, _)| key).collect())
}

/// Resolve `owner` against `catalog`. Not cached; see
/// [`ComponentCatalog::resolve_declared`].
pub(crate) fn resolve(
    catalog: &ComponentCatalog,
    owner: DeclaredType,
) -> Result<Resolution, RuntimeError> {
    let mut collector = Collector::new(catalog);
    collector.collect(owner, true);

    let mut entries = HashMap::new();
    for node in collector.nodes.iter().filter(|node| node.explicit) {
        let key = node.ty.key();
        let entry = catalog.entry(key).ok_or(RuntimeError::NotInstantiable {
            type_name: key.name(),
            required_by: node.required_by.name(),
        })?;
        entries.insert(key, entry);
    }

    let graph: Vec<(TypeKey, HashSet<TypeKey>)> = collector
        .nodes
        .iter()
        .filter(|node| node.explicit)
        .map(|node| {
            let key = node.ty.key();
            let mut edges = collector.reachable(key);
            edges.retain(|dep| entries.contains_key(dep));
            (key, edges)
        })
        .collect();

    let (mut ordered, residue) = topological_order(graph);

    if !residue.is_empty() {
        let names: Vec<&'static str> = residue.iter().map(TypeKey::name).collect();
        match catalog.config().cycle_policy {
            CyclePolicy::FailFast => {
                return Err(RuntimeError::DependencyCycle {
                    owner: owner.key().name(),
                    residue: names,
                });
            }
            CyclePolicy::BestEffort => {
                GRAPH_RESIDUES.inc();
                warn!(
                    owner = %owner.key(),
                    residue = ?names,
                    "[Resolver] Dependency cycle or unreachable dependency; appending in encounter order"
                );
                ordered.extend(residue.iter().copied());
            }
        }
    }

    Ok(Resolution {
        owner: owner.key(),
        descriptors: ordered
            .iter()
            .filter_map(|key| entries.get(key))
            .map(|entry| entry.descriptor(true))
            .collect(),
        soft: collector
            .nodes
            .iter()
            .filter(|node| !node.explicit)
            .map(|node| node.ty.key())
            .collect(),
        residue,
    })
}
