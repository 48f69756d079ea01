//! Fixtures shared by the unit tests.

/// Define a default-constructible component type.
///
/// ```ignore
/// test_component!(Storage);
/// test_component!(Clock, provides: dyn Ticking);
/// test_component!(Scoreboard, |decl| { decl.depends_on::<Storage>(); });
/// ```
macro_rules! test_component {
    (@define $name:ident, $declare:expr, $caps:expr) => {
        #[derive(Default)]
        struct $name {
            state: $crate::component::ComponentState,
        }

        impl $crate::component::Component for $name {
            fn state(&self) -> &$crate::component::ComponentState {
                &self.state
            }
        }

        impl $crate::domain::Declared for $name {
            fn declare(decl: &mut $crate::domain::Declaration) {
                let declare: fn(&mut $crate::domain::Declaration) = $declare;
                declare(decl);
            }
        }

        impl $crate::component::ComponentType for $name {
            fn create() -> Result<Self, $crate::error::RuntimeError> {
                Ok(Self::default())
            }

            fn capabilities(caps: &mut $crate::domain::Capabilities<Self>) {
                let provide: fn(&mut $crate::domain::Capabilities<$name>) = $caps;
                provide(caps);
            }
        }
    };
    ($name:ident) => {
        test_component!(@define $name, |_decl| {}, |_caps| {});
    };
    ($name:ident, provides: $cap:ty) => {
        test_component!(@define $name, |_decl| {}, |caps| {
            caps.provide::<$cap>(|this| this as ::std::sync::Arc<$cap>);
        });
    };
    ($name:ident, $declare:expr) => {
        test_component!(@define $name, $declare, |_caps| {});
    };
}
