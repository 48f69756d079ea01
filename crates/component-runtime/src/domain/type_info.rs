//! Per-type lineage and capability casts, computed once at registration.

use std::any::Any;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use super::declaration::DeclaredType;
use super::type_key::TypeKey;
use crate::component::{Component, ComponentType};

/// Type-erased view conversion: concrete instance to `Box<Arc<U>>`.
pub(crate) type Caster =
    Arc<dyn Fn(&Arc<dyn Any + Send + Sync>) -> Option<Box<dyn Any>> + Send + Sync>;

/// Capability views a component type offers.
///
/// Each entry names a trait object type and how to convert an `Arc<T>` into
/// it. Registered capabilities join the type's lineage, so the container can
/// answer `has::<dyn Trait>()` and `get::<dyn Trait>()`.
pub struct Capabilities<T> {
    entries: Vec<(TypeKey, Caster)>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: ComponentType> Capabilities<T> {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Offer `T` as `U`.
    ///
    /// ```ignore
    /// caps.provide::<dyn Ticking>(|this| this as Arc<dyn Ticking>);
    /// ```
    pub fn provide<U: ?Sized + 'static>(&mut self, cast: fn(Arc<T>) -> Arc<U>) -> &mut Self {
        self.entries.push((TypeKey::of::<U>(), caster(cast)));
        self
    }
}

fn caster<T, U>(cast: fn(Arc<T>) -> Arc<U>) -> Caster
where
    T: Any + Send + Sync,
    U: ?Sized + 'static,
{
    Arc::new(move |any: &Arc<dyn Any + Send + Sync>| {
        let concrete = Arc::clone(any).downcast::<T>().ok()?;
        Some(Box::new(cast(concrete)) as Box<dyn Any>)
    })
}

/// Everything the container needs to know about a concrete component type.
pub struct TypeInfo {
    key: TypeKey,
    lineage: Vec<TypeKey>,
    casters: HashMap<TypeKey, Caster>,
    disabled_by_default: bool,
}

impl TypeInfo {
    pub(crate) fn of<T: ComponentType>() -> Self {
        let key = TypeKey::of::<T>();
        let chain = DeclaredType::of::<T>().chain();

        let mut caps = Capabilities::<T>::new();
        T::capabilities(&mut caps);

        let root = TypeKey::of::<dyn Component>();
        let mut casters = HashMap::new();
        casters.insert(key, caster::<T, T>(|this| this));
        casters.insert(root, caster::<T, dyn Component>(|this| this as Arc<dyn Component>));

        // Own type, declared capabilities, ancestors, then the root.
        let declared = caps.entries.into_iter().map(|(cap, cast)| (cap, Some(cast)));
        let ancestors = chain.iter().skip(1).map(|(ancestor, _)| (ancestor.key(), None));
        let mut lineage = vec![key];
        for (cap, cast) in declared.chain(ancestors).chain([(root, None)]) {
            if !lineage.contains(&cap) {
                lineage.push(cap);
            }
            if let Some(cast) = cast {
                casters.entry(cap).or_insert(cast);
            }
        }

        Self {
            key,
            lineage,
            casters,
            disabled_by_default: chain
                .first()
                .is_some_and(|(_, decl)| decl.is_disabled_by_default()),
        }
    }

    #[must_use]
    pub fn key(&self) -> TypeKey {
        self.key
    }

    /// Every key the type is indexed under: itself, its capabilities, its
    /// `extends` chain and the `dyn Component` root.
    pub fn lineage(&self) -> &[TypeKey] {
        &self.lineage
    }

    #[must_use]
    pub fn is_disabled_by_default(&self) -> bool {
        self.disabled_by_default
    }

    pub(crate) fn cast<U: ?Sized + 'static>(
        &self,
        any: &Arc<dyn Any + Send + Sync>,
    ) -> Option<Arc<U>> {
        let cast = self.casters.get(&TypeKey::of::<U>())?;
        cast(any)?.downcast::<Arc<U>>().ok().map(|boxed| *boxed)
    }
}

impl std::fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeInfo")
            .field("key", &self.key)
            .field("lineage", &self.lineage)
            .field("disabled_by_default", &self.disabled_by_default)
            .finish()
    }
}
