//! # Dependency Declarations
//!
//! Static, per-type metadata: what a type depends on, which registered
//! implementations it wants wholesale, which type it inherits declarations
//! from, and whether instances start disabled.
//!
//! Declarations are produced by [`Declared::declare`], a plain function, so
//! they can be re-read at any time without an instance.

use super::type_key::TypeKey;

/// Types that carry dependency metadata.
///
/// Component types and container owner types implement this. The default
/// declares nothing.
///
/// ```ignore
/// impl Declared for Scoreboard {
///     fn declare(decl: &mut Declaration) {
///         decl.depends_on::<Storage>()
///             .soft_depends_on::<Permissions>()
///             .depends_on_all_of::<dyn Ticking>();
///     }
/// }
/// ```
pub trait Declared: 'static {
    fn declare(decl: &mut Declaration) {
        let _ = decl;
    }
}

/// The unit owner declares nothing; containers built for it start empty.
impl Declared for () {}

/// A type key together with the function producing its declaration.
#[derive(Clone, Copy)]
pub struct DeclaredType {
    key: TypeKey,
    declare: fn(&mut Declaration),
}

impl DeclaredType {
    pub fn of<T: Declared + ?Sized>() -> Self {
        Self {
            key: TypeKey::of::<T>(),
            declare: T::declare,
        }
    }

    #[must_use]
    pub fn key(&self) -> TypeKey {
        self.key
    }

    /// Evaluate the declaration.
    pub fn declaration(&self) -> Declaration {
        let mut decl = Declaration::new(self.key);
        (self.declare)(&mut decl);
        decl
    }

    /// The declaring type followed by its `extends` chain.
    ///
    /// Stops at the first repeated type so a looping chain terminates.
    pub fn chain(&self) -> Vec<(DeclaredType, Declaration)> {
        let mut chain: Vec<(DeclaredType, Declaration)> = Vec::new();
        let mut next = Some(*self);

        while let Some(ty) = next {
            if chain.iter().any(|(seen, _)| seen.key == ty.key) {
                break;
            }
            let decl = ty.declaration();
            next = decl.parent;
            chain.push((ty, decl));
        }

        chain
    }
}

impl std::fmt::Debug for DeclaredType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DeclaredType({})", self.key.name())
    }
}

/// One `depends_on` entry.
#[derive(Debug, Clone, Copy)]
pub struct Dependency {
    pub target: DeclaredType,
    /// Soft dependencies order but never instantiate.
    pub soft: bool,
}

/// Metadata declared by one type.
#[derive(Debug, Clone)]
pub struct Declaration {
    owner: TypeKey,
    dependencies: Vec<Dependency>,
    all_of: Vec<TypeKey>,
    parent: Option<DeclaredType>,
    disabled_by_default: bool,
}

impl Declaration {
    fn new(owner: TypeKey) -> Self {
        Self {
            owner,
            dependencies: Vec::new(),
            all_of: Vec::new(),
            parent: None,
            disabled_by_default: false,
        }
    }

    /// Require `T`; it is instantiated automatically.
    pub fn depends_on<T: Declared + ?Sized>(&mut self) -> &mut Self {
        self.push(DeclaredType::of::<T>(), false)
    }

    /// Order after `T` when present, without instantiating it.
    pub fn soft_depends_on<T: Declared + ?Sized>(&mut self) -> &mut Self {
        self.push(DeclaredType::of::<T>(), true)
    }

    /// Require every registered concrete type whose lineage contains `B`.
    pub fn depends_on_all_of<B: ?Sized + 'static>(&mut self) -> &mut Self {
        let key = TypeKey::of::<B>();
        if !self.all_of.contains(&key) {
            self.all_of.push(key);
        }
        self
    }

    /// Inherit `P`'s declarations and join its lineage.
    ///
    /// Only one parent is kept; a later call replaces an earlier one.
    pub fn extends<P: Declared + ?Sized>(&mut self) -> &mut Self {
        self.parent = Some(DeclaredType::of::<P>());
        self
    }

    /// Keep instances disabled through the container's ENABLE stage.
    ///
    /// Applies to the declaring type only, it is not inherited.
    pub fn disabled_by_default(&mut self) -> &mut Self {
        self.disabled_by_default = true;
        self
    }

    fn push(&mut self, target: DeclaredType, soft: bool) -> &mut Self {
        self.dependencies.push(Dependency { target, soft });
        self
    }

    #[must_use]
    pub fn owner(&self) -> TypeKey {
        self.owner
    }

    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    pub fn all_of(&self) -> &[TypeKey] {
        &self.all_of
    }

    pub fn parent(&self) -> Option<DeclaredType> {
        self.parent
    }

    #[must_use]
    pub fn is_disabled_by_default(&self) -> bool {
        self.disabled_by_default
    }
}
