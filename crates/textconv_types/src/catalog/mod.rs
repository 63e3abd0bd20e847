//! A catalog of described types, searchable by path.
//!
//! Text never carries a [`TypeId`]; when a value names its type, as a
//! [`TypeRef`](crate::info::TypeRef) does, the name is looked up here.
//!
//! ## auto_register
//!
//! See [`TypeCatalog::auto_register`].
//!
//! We use [`inventory`] to collect types declared with
//! [`auto_register!`](crate::auto_register); not all platforms support it.

#[cfg(feature = "auto_register")]
mod auto_register;

#[cfg(feature = "auto_register")]
pub use auto_register::AutoRegister;

use core::any::TypeId;

use textconv_utils::TypeIdMap;
use textconv_utils::hash::{FixedHashState, HashMap, HashSet};

use crate::info::{TypeInfo, TypeRef, Typed};

// -----------------------------------------------------------------------------
// TypeCatalog

/// A store of [`TypeInfo`] indexed by id, path and name.
///
/// # Example
///
/// ```
/// use textconv_types::catalog::TypeCatalog;
///
/// let catalog = TypeCatalog::new();
///
/// let info = catalog.get_with_type_path("alloc::string::String").unwrap();
/// assert!(info.is::<String>());
/// assert!(catalog.get_with_type_name("i32").is_some());
/// ```
#[derive(Clone)]
pub struct TypeCatalog {
    by_id: TypeIdMap<&'static TypeInfo>,
    path_to_id: HashMap<&'static str, TypeId>,
    name_to_id: HashMap<&'static str, TypeId>,
    ambiguous_names: HashSet<&'static str>,
}

impl Default for TypeCatalog {
    /// See [`TypeCatalog::new`].
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl TypeCatalog {
    /// Create an empty [`TypeCatalog`].
    #[inline]
    pub const fn empty() -> Self {
        Self {
            by_id: TypeIdMap::new(),
            path_to_id: HashMap::with_hasher(FixedHashState),
            name_to_id: HashMap::with_hasher(FixedHashState),
            ambiguous_names: HashSet::with_hasher(FixedHashState),
        }
    }

    /// Create a catalog with the types that have built-in converters.
    ///
    /// - `bool` `char`
    /// - `i8 - i128` `isize`
    /// - `u8 - u128` `usize`
    /// - `f32` `f64`
    /// - `String` `TypeRef`
    pub fn new() -> Self {
        let mut catalog = Self::empty();
        catalog.register::<bool>();
        catalog.register::<char>();
        catalog.register::<u8>();
        catalog.register::<u16>();
        catalog.register::<u32>();
        catalog.register::<u64>();
        catalog.register::<u128>();
        catalog.register::<usize>();
        catalog.register::<i8>();
        catalog.register::<i16>();
        catalog.register::<i32>();
        catalog.register::<i64>();
        catalog.register::<i128>();
        catalog.register::<isize>();
        catalog.register::<f32>();
        catalog.register::<f64>();
        catalog.register::<String>();
        catalog.register::<TypeRef>();
        catalog
    }

    // The type must not already exist.
    fn add_new_type_indices(
        info: &TypeInfo,
        path_to_id: &mut HashMap<&'static str, TypeId>,
        name_to_id: &mut HashMap<&'static str, TypeId>,
        ambiguous_names: &mut HashSet<&'static str>,
    ) {
        let ty = info.ty();
        let name = ty.name();

        if !ambiguous_names.contains(name) {
            if name_to_id.contains_key(name) {
                name_to_id.remove(name);
                ambiguous_names.insert(name);
            } else {
                name_to_id.insert(name, ty.id());
            }
        }

        path_to_id.insert(ty.path(), ty.id());
    }

    /// Adds `info` if its type is not yet present.
    ///
    /// Returns `false` if the type already exists. Related types are
    /// _not_ added; use [`register`](Self::register) for that.
    pub fn insert(&mut self, info: &'static TypeInfo) -> bool {
        self.by_id.try_insert(info.id(), || {
            Self::add_new_type_indices(
                info,
                &mut self.path_to_id,
                &mut self.name_to_id,
                &mut self.ambiguous_names,
            );
            info
        })
    }

    /// Adds `T`, its ancestors, its interfaces and its factory.
    ///
    /// Types already present are skipped along with their relations.
    pub fn register<T: ?Sized + Typed>(&mut self) {
        self.register_info(T::type_info());
    }

    /// Adds `info` and every type it relates to.
    pub fn register_info(&mut self, info: &'static TypeInfo) {
        if !self.insert(info) {
            return;
        }
        if let Some(parent) = info.parent() {
            self.register_info(parent.info());
        }
        for link in info.interfaces() {
            self.register_info(link.info());
        }
        if let Some(factory) = info.factory() {
            self.register_info(factory);
        }
    }

    /// Registers every type declared with [`auto_register!`](crate::auto_register).
    ///
    /// Repeated calls are cheap and will not insert duplicates.
    ///
    /// Returns `false` if the `auto_register` feature is disabled.
    #[cfg_attr(not(feature = "auto_register"), inline(always))]
    pub fn auto_register(&mut self) -> bool {
        #[cfg(feature = "auto_register")]
        {
            for entry in inventory::iter::<AutoRegister> {
                self.register_info(entry.info());
            }
            true
        }
        #[cfg(not(feature = "auto_register"))]
        {
            false
        }
    }

    /// Whether the type with the given [`TypeId`] is present.
    #[inline]
    pub fn contains(&self, type_id: TypeId) -> bool {
        self.by_id.contains(&type_id)
    }

    /// Returns the [`TypeInfo`] of the type with the given [`TypeId`].
    #[inline]
    pub fn get(&self, type_id: TypeId) -> Option<&'static TypeInfo> {
        self.by_id.get(&type_id).copied()
    }

    /// Returns the [`TypeInfo`] of the type with the given [type path].
    ///
    /// [type path]: crate::info::TypePath::type_path
    pub fn get_with_type_path(&self, type_path: &str) -> Option<&'static TypeInfo> {
        match self.path_to_id.get(type_path) {
            Some(id) => self.get(*id),
            None => None,
        }
    }

    /// Returns the [`TypeInfo`] of the type with the given [type name].
    ///
    /// If the name is ambiguous, or nothing is registered under it, returns `None`.
    ///
    /// [type name]: crate::info::TypePath::type_name
    pub fn get_with_type_name(&self, type_name: &str) -> Option<&'static TypeInfo> {
        match self.name_to_id.get(type_name) {
            Some(id) => self.get(*id),
            None => None,
        }
    }

    /// Returns `true` if the given type name matches multiple registered types.
    #[inline]
    pub fn is_ambiguous(&self, type_name: &str) -> bool {
        self.ambiguous_names.contains(type_name)
    }

    /// Number of registered types.
    #[inline]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Returns an iterator over the registered types.
    pub fn iter(&self) -> impl Iterator<Item = &'static TypeInfo> + '_ {
        self.by_id.values().copied()
    }
}

impl core::fmt::Debug for TypeCatalog {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.iter().map(TypeInfo::path)).finish()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::TypeCatalog;
    use crate::info::{TypeInfo, TypeInfoCell, Typed};

    mod first {
        use crate::info::{TypeInfo, TypeInfoCell, Typed};

        pub struct Meter;
        crate::impl_type_path!(in "fixtures::first" => Meter);

        impl Typed for Meter {
            fn type_info() -> &'static TypeInfo {
                static CELL: TypeInfoCell = TypeInfoCell::new();
                CELL.get_or_init(|| TypeInfo::class::<Self>().build())
            }
        }
    }

    mod second {
        use crate::info::{TypeInfo, TypeInfoCell, Typed};

        pub struct Meter;
        crate::impl_type_path!(in "fixtures::second" => Meter);

        impl Typed for Meter {
            fn type_info() -> &'static TypeInfo {
                static CELL: TypeInfoCell = TypeInfoCell::new();
                CELL.get_or_init(|| TypeInfo::class::<Self>().build())
            }
        }
    }

    struct Base;
    crate::impl_type_path!(in "fixtures" => Base);

    impl Typed for Base {
        fn type_info() -> &'static TypeInfo {
            static CELL: TypeInfoCell = TypeInfoCell::new();
            CELL.get_or_init(|| TypeInfo::class::<Self>().build())
        }
    }

    struct Derived(Base);
    crate::impl_type_path!(in "fixtures" => Derived);

    impl Typed for Derived {
        fn type_info() -> &'static TypeInfo {
            static CELL: TypeInfoCell = TypeInfoCell::new();
            CELL.get_or_init(|| TypeInfo::class::<Self>().extends(|d: &Derived| &d.0).build())
        }
    }

    #[test]
    fn primitives_are_present() {
        let catalog = TypeCatalog::new();
        assert!(catalog.get_with_type_path("u64").is_some());
        assert!(catalog.get_with_type_name("String").is_some());
        assert!(TypeCatalog::empty().is_empty());
    }

    #[test]
    fn duplicate_names_are_ambiguous() {
        let mut catalog = TypeCatalog::empty();
        catalog.register::<first::Meter>();
        assert!(catalog.get_with_type_name("Meter").is_some());

        catalog.register::<second::Meter>();
        assert!(catalog.is_ambiguous("Meter"));
        assert!(catalog.get_with_type_name("Meter").is_none());
        assert!(catalog.get_with_type_path("fixtures::second::Meter").is_some());
    }

    #[test]
    fn register_adds_relations() {
        let mut catalog = TypeCatalog::empty();
        catalog.register::<Derived>();
        assert_eq!(catalog.len(), 2);
        assert!(catalog.get_with_type_path("fixtures::Base").is_some());
        assert!(!catalog.insert(Base::type_info()));
    }
}
