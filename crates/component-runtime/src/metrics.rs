//! Prometheus metrics for the component runtime.
//!
//! All metrics follow the naming convention: `component_runtime_<metric>_<unit>`

use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounter, Registry, TextEncoder};

lazy_static! {
    /// Containers successfully constructed
    pub static ref CONTAINERS_BUILT: IntCounter = IntCounter::new(
        "component_runtime_containers_built_total",
        "Total number of containers constructed"
    ).expect("metric creation failed");

    /// Components attached to a container (construction or `add`)
    pub static ref COMPONENTS_ATTACHED: IntCounter = IntCounter::new(
        "component_runtime_components_attached_total",
        "Total number of components attached to containers"
    ).expect("metric creation failed");

    /// Components detached by `remove` or `destroy`
    pub static ref COMPONENTS_REMOVED: IntCounter = IntCounter::new(
        "component_runtime_components_removed_total",
        "Total number of components detached from containers"
    ).expect("metric creation failed");

    /// Components dropped by a container's validation hook
    pub static ref VALIDATION_REJECTIONS: IntCounter = IntCounter::new(
        "component_runtime_validation_rejections_total",
        "Total number of components rejected before attachment"
    ).expect("metric creation failed");

    /// Dependency orders computed (cache misses)
    pub static ref RESOLUTIONS_COMPUTED: IntCounter = IntCounter::new(
        "component_runtime_resolutions_computed_total",
        "Total number of dependency orders computed"
    ).expect("metric creation failed");

    /// Graphs that could not be fully ordered
    pub static ref GRAPH_RESIDUES: IntCounter = IntCounter::new(
        "component_runtime_graph_residues_total",
        "Total number of dependency graphs left with an unordered residue"
    ).expect("metric creation failed");

    /// Registry holding every runtime metric
    pub static ref REGISTRY: Registry = {
        let registry = Registry::new();
        for counter in [
            &*CONTAINERS_BUILT,
            &*COMPONENTS_ATTACHED,
            &*COMPONENTS_REMOVED,
            &*VALIDATION_REJECTIONS,
            &*RESOLUTIONS_COMPUTED,
            &*GRAPH_RESIDUES,
        ] {
            registry
                .register(Box::new(counter.clone()))
                .expect("metric registration failed");
        }
        registry
    };
}

/// Render every runtime metric in the Prometheus text exposition format.
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&REGISTRY.gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}
