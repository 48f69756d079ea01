//! # Resolution Scenarios
//!
//! Dependency orders as seen through catalogs and freshly built containers.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use component_runtime::{
        Component, ComponentCatalog, ComponentState, ComponentType, Container, CyclePolicy,
        Declaration, Declared, Resolution, ResolverConfig, RuntimeError, TypeKey,
    };

    use crate::fixtures::*;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn position(resolution: &Resolution, key: TypeKey) -> usize {
        resolution
            .keys()
            .iter()
            .position(|k| *k == key)
            .unwrap_or_else(|| panic!("{key} missing from resolution"))
    }

    #[derive(Default)]
    struct Ping {
        state: ComponentState,
    }

    #[derive(Default)]
    struct Pong {
        state: ComponentState,
    }

    impl Component for Ping {
        fn state(&self) -> &ComponentState {
            &self.state
        }
    }

    impl Component for Pong {
        fn state(&self) -> &ComponentState {
            &self.state
        }
    }

    impl Declared for Ping {
        fn declare(decl: &mut Declaration) {
            decl.depends_on::<Pong>();
        }
    }

    impl Declared for Pong {
        fn declare(decl: &mut Declaration) {
            decl.depends_on::<Ping>();
        }
    }

    impl ComponentType for Ping {
        fn create() -> Result<Self, RuntimeError> {
            Ok(Self::default())
        }
    }

    impl ComponentType for Pong {
        fn create() -> Result<Self, RuntimeError> {
            Ok(Self::default())
        }
    }

    struct Rally;

    impl Declared for Rally {
        fn declare(decl: &mut Declaration) {
            decl.depends_on::<Storage>().depends_on::<Ping>();
        }
    }

    fn rally_catalog(policy: CyclePolicy) -> Arc<ComponentCatalog> {
        let catalog =
            ComponentCatalog::new(ResolverConfig::default().with_cycle_policy(policy));
        catalog
            .register::<Storage>()
            .register::<Ping>()
            .register::<Pong>();
        Arc::new(catalog)
    }

    // =============================================================================
    // ORDERING
    // =============================================================================

    #[test]
    fn test_arena_order_respects_every_edge() -> anyhow::Result<()> {
        runtime_telemetry::init_for_tests();
        let catalog = arena_catalog();
        let resolution = catalog.resolve::<Arena>()?;

        assert!(resolution.is_fully_ordered());
        assert_eq!(resolution.len(), 6);

        let storage = position(&resolution, TypeKey::of::<Storage>());
        let scoreboard = position(&resolution, TypeKey::of::<Scoreboard>());
        let timer = position(&resolution, TypeKey::of::<Timer>());
        let tablist = position(&resolution, TypeKey::of::<Tablist>());
        let tick_loop = position(&resolution, TypeKey::of::<TickLoop>());

        assert!(storage < scoreboard);
        assert!(storage < timer, "inherited dependency must be ordered");
        assert!(scoreboard < tablist);
        assert!(scoreboard < tick_loop && timer < tick_loop);
        Ok(())
    }

    #[test]
    fn test_arena_order_is_deterministic() -> anyhow::Result<()> {
        let first = arena_catalog().resolve::<Arena>()?.keys();
        let second = arena_catalog().resolve::<Arena>()?.keys();

        assert_eq!(first, second);
        assert_eq!(
            first,
            component_runtime::type_keys![Storage, Timer, Spectators, Scoreboard, TickLoop, Tablist]
        );
        Ok(())
    }

    #[test]
    fn test_soft_only_reference_is_never_instantiated() -> anyhow::Result<()> {
        let catalog = arena_catalog();
        let resolution = catalog.resolve::<Lobby>()?;

        assert_eq!(resolution.keys(), vec![TypeKey::of::<Storage>()]);
        // Scoreboard's own soft target is reached only softly too.
        assert_eq!(
            resolution.soft_dependencies(),
            &[TypeKey::of::<Scoreboard>(), TypeKey::of::<Permissions>()]
        );

        let lobby = Container::builder::<Lobby>().catalog(catalog).build()?;
        assert!(!lobby.has::<Scoreboard>());
        assert!(lobby.has::<Storage>());
        Ok(())
    }

    #[test]
    fn test_soft_target_made_explicit_elsewhere_is_built() -> anyhow::Result<()> {
        let catalog = arena_catalog();
        let arena = Container::builder::<Arena>().catalog(catalog).build()?;

        // Scoreboard only softly wants Permissions; nothing requires it.
        assert!(!arena.has::<Permissions>());
        assert!(arena.has::<Scoreboard>());
        Ok(())
    }

    #[test]
    fn test_wildcard_collects_every_registered_implementation() -> anyhow::Result<()> {
        let catalog = arena_catalog();
        let arena = Container::builder::<Arena>().catalog(catalog).build()?;

        assert_eq!(arena.get_all::<dyn Ticking>().len(), 2);
        assert!(arena.has::<Timer>());
        assert!(arena.has::<GameModule>());
        Ok(())
    }

    #[test]
    fn test_resolution_cached_per_catalog() -> anyhow::Result<()> {
        let catalog = arena_catalog();
        let _a = Container::builder::<Arena>().catalog(Arc::clone(&catalog)).build()?;
        let _b = Container::builder::<Arena>().catalog(Arc::clone(&catalog)).build()?;

        assert_eq!(catalog.cached_resolutions(), 1);
        Ok(())
    }

    // =============================================================================
    // FAILURES
    // =============================================================================

    #[test]
    fn test_cycle_best_effort_keeps_both_nodes() -> anyhow::Result<()> {
        let resolution = rally_catalog(CyclePolicy::BestEffort).resolve::<Rally>()?;

        assert!(!resolution.is_fully_ordered());
        assert_eq!(
            resolution.keys(),
            component_runtime::type_keys![Storage, Ping, Pong]
        );
        assert_eq!(resolution.residue(), &component_runtime::type_keys![Ping, Pong][..]);

        let text = component_runtime::gather_metrics()?;
        assert!(text.contains("component_runtime_graph_residues_total"));
        Ok(())
    }

    #[test]
    fn test_cycle_fail_fast_is_an_error() {
        let err = Container::builder::<Rally>()
            .catalog(rally_catalog(CyclePolicy::FailFast))
            .build()
            .unwrap_err();

        match err {
            RuntimeError::DependencyCycle { residue, .. } => assert_eq!(residue.len(), 2),
            other => panic!("expected a cycle, got {other:?}"),
        }
    }

    #[test]
    fn test_unregistered_dependency_names_requirer() {
        let catalog = Arc::new(ComponentCatalog::default());
        catalog.register::<Tablist>();

        let err = Container::builder::<Arena>()
            .catalog(catalog)
            .build()
            .unwrap_err();
        assert!(matches!(err, RuntimeError::NotInstantiable { .. }));
        assert!(err.to_string().contains("not registered"));
    }

    #[test]
    fn test_failing_factory_aborts_build() {
        let err = Container::builder::<Editor>()
            .catalog(arena_catalog())
            .build()
            .unwrap_err();

        assert!(matches!(err, RuntimeError::Instantiation { .. }));
        assert!(err.to_string().contains("no arena map configured"));
    }
}
