//! # Mutation Scenarios
//!
//! Adding, removing and toggling components after construction.

#[cfg(test)]
mod tests {
    use component_runtime::{
        ComponentExt, ComponentHandle, Container, ContainerBehavior, RuntimeError, TypeKey,
    };
    use proptest::prelude::*;

    use crate::fixtures::*;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn empty_container() -> anyhow::Result<Container> {
        runtime_telemetry::init_for_tests();
        let container = Container::builder::<()>().catalog(arena_catalog()).build()?;
        container.initialize_all();
        take_journal();
        Ok(container)
    }

    fn live_arena() -> anyhow::Result<Container> {
        runtime_telemetry::init_for_tests();
        let arena = Container::builder::<Arena>().catalog(arena_catalog()).build()?;
        arena.initialize_all();
        take_journal();
        Ok(arena)
    }

    /// Rejects every Timer.
    struct NoTimers;

    impl ContainerBehavior for NoTimers {
        fn validate(&self, _: &Container, component: &ComponentHandle) -> bool {
            !component.is::<Timer>()
        }
    }

    // =============================================================================
    // ADD
    // =============================================================================

    #[test]
    fn test_add_brings_missing_dependencies_first() -> anyhow::Result<()> {
        let container = empty_container()?;

        let tablist = container.add::<Tablist>()?.expect("tablist accepted");
        assert!(tablist.is_enabled());
        assert_eq!(
            take_journal(),
            vec![
                "Storage.add",
                "Storage.enable",
                "Scoreboard.add",
                "Scoreboard.enable",
                "Tablist.add",
                "Tablist.enable",
            ]
        );
        Ok(())
    }

    #[test]
    fn test_add_reuses_present_dependencies() -> anyhow::Result<()> {
        let arena = live_arena()?;

        arena.add::<Timer>()?;
        assert_eq!(arena.handles::<Timer>().len(), 2);
        assert_eq!(arena.handles::<Storage>().len(), 1);
        assert_eq!(take_journal(), vec!["Timer.add", "Timer.enable"]);
        Ok(())
    }

    #[test]
    fn test_add_before_initialize_notifies_once() -> anyhow::Result<()> {
        runtime_telemetry::init_for_tests();
        let container = Container::builder::<()>().catalog(arena_catalog()).build()?;
        take_journal();

        container.add::<Timer>()?;
        assert!(take_journal().is_empty());

        container.initialize_all();
        assert_eq!(
            take_journal(),
            vec!["Storage.add", "Timer.add", "Storage.enable", "Timer.enable"]
        );

        assert_eq!(container.remove::<Timer>(), 1);
        assert_eq!(take_journal(), vec!["Timer.disable", "Timer.remove"]);
        Ok(())
    }

    #[test]
    fn test_added_component_reaches_container() -> anyhow::Result<()> {
        let container = empty_container()?;
        let storage = container.add::<Storage>()?.expect("storage accepted");

        let owner = storage.container()?;
        assert!(owner.ptr_eq(&container));
        Ok(())
    }

    #[test]
    fn test_add_unregistered_type_fails() -> anyhow::Result<()> {
        runtime_telemetry::init_for_tests();
        let container = Container::builder::<()>()
            .catalog(std::sync::Arc::new(component_runtime::ComponentCatalog::default()))
            .build()?;

        let err = container.add::<Storage>().unwrap_err();
        assert!(matches!(err, RuntimeError::NotInstantiable { .. }));
        Ok(())
    }

    #[test]
    fn test_add_rejected_by_validation() -> anyhow::Result<()> {
        let container = Container::builder::<()>()
            .catalog(arena_catalog())
            .behavior(NoTimers)
            .build()?;
        take_journal();

        assert!(container.add::<Timer>()?.is_none());
        // The dependency passed validation and stays.
        assert!(container.has::<Storage>());
        assert!(!container.has::<Timer>());
        Ok(())
    }

    // =============================================================================
    // REMOVE
    // =============================================================================

    #[test]
    fn test_remove_by_capability() -> anyhow::Result<()> {
        let arena = live_arena()?;

        assert_eq!(arena.remove::<dyn Ticking>(), 2);
        let journal = take_journal();
        assert_eq!(
            journal,
            vec![
                "Timer.disable",
                "Timer.remove",
                "Scoreboard.disable",
                "Scoreboard.remove",
            ]
        );

        assert!(!arena.has::<dyn Ticking>());
        assert!(!arena.has::<GameModule>());
        // No cascade to dependents.
        assert!(arena.has::<Tablist>());
        assert_eq!(arena.len(), 4);
        Ok(())
    }

    #[test]
    fn test_has_false_after_last_match_removed() -> anyhow::Result<()> {
        let arena = live_arena()?;
        arena.add::<Timer>()?;

        assert_eq!(arena.remove::<Timer>(), 2);
        assert!(!arena.has::<Timer>());
        assert!(arena.handles::<Timer>().is_empty());
        assert_eq!(arena.remove::<Timer>(), 0);
        Ok(())
    }

    // =============================================================================
    // TOGGLING
    // =============================================================================

    #[test]
    fn test_disable_then_enable_by_type() -> anyhow::Result<()> {
        let arena = live_arena()?;
        let tickers = component_runtime::type_keys![dyn Ticking];

        assert_eq!(arena.disable(&tickers), 2);
        assert_eq!(arena.disable(&tickers), 0);
        assert_eq!(arena.enable(&tickers), 2);
        assert_eq!(
            take_journal(),
            vec![
                "Timer.disable",
                "Scoreboard.disable",
                "Timer.enable",
                "Scoreboard.enable",
            ]
        );
        Ok(())
    }

    #[test]
    fn test_all_except_uses_lineage() -> anyhow::Result<()> {
        let arena = live_arena()?;

        let toggled = arena.disable_all_except(&component_runtime::type_keys![GameModule, Storage]);
        assert_eq!(toggled, 3); // Scoreboard, TickLoop, Tablist
        assert!(arena.get::<Timer>().is_some_and(|t| t.is_enabled()));
        assert!(arena.get::<Storage>().is_some_and(|s| s.is_enabled()));

        // Spectators was never enabled; everything disabled comes back.
        assert_eq!(arena.enable_all_except(&[]), 4);
        assert!(arena.components().iter().all(|c| c.is_enabled()));
        Ok(())
    }

    #[test]
    fn test_external_hold_survives_container_enable() -> anyhow::Result<()> {
        let arena = live_arena()?;
        let storage = arena.get::<Storage>().expect("storage present");

        storage.disable();
        storage.disable();
        assert_eq!(arena.enable(&component_runtime::type_keys![Storage]), 1);
        assert!(!storage.is_enabled(), "one hold remains");
        Ok(())
    }

    // =============================================================================
    // PROPERTIES
    // =============================================================================

    #[derive(Debug, Clone, Copy)]
    enum Op {
        AddTimer,
        AddTablist,
        AddSpectators,
        RemoveTicking,
        RemoveStorage,
        RemoveTimer,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            Just(Op::AddTimer),
            Just(Op::AddTablist),
            Just(Op::AddSpectators),
            Just(Op::RemoveTicking),
            Just(Op::RemoveStorage),
            Just(Op::RemoveTimer),
        ]
    }

    fn lineage_keys() -> Vec<TypeKey> {
        component_runtime::type_keys![
            Storage,
            Timer,
            Scoreboard,
            Tablist,
            Spectators,
            dyn Ticking,
            GameModule,
            dyn component_runtime::Component,
        ]
    }

    proptest! {
        #[test]
        fn prop_index_matches_component_list(ops in prop::collection::vec(op(), 1..24)) {
            let container = Container::builder::<()>().catalog(arena_catalog()).build().unwrap();

            for op in ops {
                match op {
                    Op::AddTimer => { container.add::<Timer>().unwrap(); }
                    Op::AddTablist => { container.add::<Tablist>().unwrap(); }
                    Op::AddSpectators => { container.add::<Spectators>().unwrap(); }
                    Op::RemoveTicking => { container.remove::<dyn Ticking>(); }
                    Op::RemoveStorage => { container.remove::<Storage>(); }
                    Op::RemoveTimer => { container.remove::<Timer>(); }
                }

                let components = container.components();
                for key in lineage_keys() {
                    let expected: Vec<_> = components.iter().filter(|c| c.matches(key)).collect();
                    let indexed = container.handles_key(key);
                    prop_assert_eq!(indexed.len(), expected.len());
                    prop_assert_eq!(container.has_key(key), !expected.is_empty());
                    for (a, b) in indexed.iter().zip(expected) {
                        prop_assert!(a.ptr_eq(b));
                    }
                }
            }
            take_journal();
        }
    }
}
