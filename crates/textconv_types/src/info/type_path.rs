use core::any::TypeId;
use core::fmt;

// -----------------------------------------------------------------------------
// TypePath

/// A static accessor to type paths and names.
///
/// A stable alternative to [`core::any::type_name`]: the path is the name a
/// type is written under in textual data, so it must not change between
/// compiler versions. Renaming a type afterwards is what the rename
/// registry is for.
///
/// - [`type_path`]: the unique identifier of the type.
/// - [`type_name`]: the name without module path, may be duplicated.
/// - [`type_ident`]: the shortest name, equal to `type_name` for non-generic types.
/// - [`module_path`]: optional module path.
///
/// Paths never start with `::`.
///
/// # Implementation
///
/// Use [`impl_type_path!`](crate::impl_type_path), or implement it by hand:
///
/// ```
/// use textconv_types::info::TypePath;
///
/// struct Distance;
///
/// impl TypePath for Distance {
///     fn type_path() -> &'static str { "my_app::units::Distance" }
///     fn type_name() -> &'static str { "Distance" }
///     fn type_ident() -> &'static str { "Distance" }
///     fn module_path() -> Option<&'static str> { Some("my_app::units") }
/// }
/// ```
///
/// [`type_path`]: TypePath::type_path
/// [`type_name`]: TypePath::type_name
/// [`type_ident`]: TypePath::type_ident
/// [`module_path`]: TypePath::module_path
pub trait TypePath: 'static {
    /// Returns the fully qualified path of the type.
    ///
    /// For `String`, this is `"alloc::string::String"`.
    fn type_path() -> &'static str;

    /// Returns the path without its module prefix.
    fn type_name() -> &'static str;

    /// Returns the short name of the type, without generics.
    fn type_ident() -> &'static str;

    /// Optional module path where the type is defined.
    ///
    /// Primitive types return `None`.
    fn module_path() -> Option<&'static str> {
        None
    }
}

// -----------------------------------------------------------------------------
// TypePathTable

/// Function pointers to a type's [`TypePath`] implementation.
#[derive(Clone, Copy)]
pub struct TypePathTable {
    type_path: fn() -> &'static str,
    type_name: fn() -> &'static str,
    type_ident: fn() -> &'static str,
    module_path: fn() -> Option<&'static str>,
}

impl TypePathTable {
    /// Creates a new table from a type.
    #[inline]
    pub const fn of<T: TypePath + ?Sized>() -> Self {
        Self {
            type_path: T::type_path,
            type_name: T::type_name,
            type_ident: T::type_ident,
            module_path: T::module_path,
        }
    }

    /// See [`TypePath::type_path`]
    #[inline(always)]
    pub fn path(&self) -> &'static str {
        (self.type_path)()
    }

    /// See [`TypePath::type_name`]
    #[inline(always)]
    pub fn name(&self) -> &'static str {
        (self.type_name)()
    }

    /// See [`TypePath::type_ident`]
    #[inline(always)]
    pub fn ident(&self) -> &'static str {
        (self.type_ident)()
    }

    /// See [`TypePath::module_path`]
    #[inline(always)]
    pub fn module_path(&self) -> Option<&'static str> {
        (self.module_path)()
    }

    /// The first segment of the module path.
    pub fn crate_name(&self) -> Option<&'static str> {
        let module = (self.module_path)()?;
        Some(module.split("::").next().unwrap_or(module))
    }
}

impl fmt::Debug for TypePathTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypePathTable")
            .field("type_path", &self.path())
            .field("type_name", &self.name())
            .field("module_path", &self.module_path())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Type

/// A [`TypeId`] together with its [`TypePathTable`].
///
/// # Examples
///
/// ```
/// use core::any::TypeId;
/// use textconv_types::info::Type;
///
/// let ty = Type::of::<String>();
/// assert!(ty.is::<String>());
/// assert_eq!(ty.id(), TypeId::of::<String>());
/// assert_eq!(ty.path(), "alloc::string::String");
/// ```
#[derive(Copy, Clone)]
pub struct Type {
    type_path_table: TypePathTable,
    type_id: TypeId,
}

impl Type {
    /// Creates a new [`Type`] from a type that implements [`TypePath`].
    #[inline]
    pub const fn of<T: TypePath + ?Sized>() -> Self {
        Self {
            type_path_table: TypePathTable::of::<T>(),
            type_id: TypeId::of::<T>(),
        }
    }

    /// Returns the [`TypeId`] of the type.
    #[inline(always)]
    pub const fn id(&self) -> TypeId {
        self.type_id
    }

    /// Check if the given type matches this one.
    #[inline(always)]
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        TypeId::of::<T>() == self.type_id
    }

    /// Returns the [`TypePathTable`].
    #[inline(always)]
    pub const fn path_table(&self) -> &TypePathTable {
        &self.type_path_table
    }

    /// See [`TypePath::type_path`]
    #[inline]
    pub fn path(&self) -> &'static str {
        self.type_path_table.path()
    }

    /// See [`TypePath::type_name`]
    #[inline]
    pub fn name(&self) -> &'static str {
        self.type_path_table.name()
    }

    /// See [`TypePath::type_ident`]
    #[inline]
    pub fn ident(&self) -> &'static str {
        self.type_path_table.ident()
    }

    /// See [`TypePath::module_path`]
    #[inline]
    pub fn module_path(&self) -> Option<&'static str> {
        self.type_path_table.module_path()
    }
}

impl PartialEq for Type {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for Type {}

impl core::hash::Hash for Type {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

// -----------------------------------------------------------------------------
// impl_type_path

/// Implements [`TypePath`] for a non-generic type.
///
/// The module path defaults to the invoking module; `in "module::path"`
/// pins it, so moving the definition does not change the written name.
/// Trait object types are written as `dyn Name`.
///
/// ```
/// use textconv_types::impl_type_path;
/// use textconv_types::info::TypePath;
///
/// pub struct Distance;
/// pub trait Shape {}
///
/// impl_type_path!(in "my_app::units" => Distance);
/// impl_type_path!(in "my_app::shapes" => dyn Shape);
///
/// assert_eq!(Distance::type_path(), "my_app::units::Distance");
/// assert_eq!(<dyn Shape as TypePath>::type_path(), "my_app::shapes::Shape");
/// assert_eq!(<dyn Shape as TypePath>::type_name(), "Shape");
/// ```
#[macro_export]
macro_rules! impl_type_path {
    (in $module:literal => dyn $name:ident) => {
        $crate::impl_type_path!(@impl ($module), dyn $name, $name);
    };
    (in $module:literal => $name:ident) => {
        $crate::impl_type_path!(@impl ($module), $name, $name);
    };
    (dyn $name:ident) => {
        $crate::impl_type_path!(@impl (::core::module_path!()), dyn $name, $name);
    };
    ($name:ident) => {
        $crate::impl_type_path!(@impl (::core::module_path!()), $name, $name);
    };
    (@impl ($($module:tt)*), $ty:ty, $name:ident) => {
        impl $crate::info::TypePath for $ty {
            #[inline]
            fn type_path() -> &'static str {
                ::core::concat!($($module)*, "::", ::core::stringify!($name))
            }
            #[inline]
            fn type_name() -> &'static str {
                ::core::stringify!($name)
            }
            #[inline]
            fn type_ident() -> &'static str {
                ::core::stringify!($name)
            }
            #[inline]
            fn module_path() -> ::core::option::Option<&'static str> {
                ::core::option::Option::Some($($module)*)
            }
        }
    };
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{Type, TypePath, TypePathTable};

    struct Local;
    crate::impl_type_path!(in "fixtures::local" => Local);

    #[test]
    fn macro_paths() {
        assert_eq!(Local::type_path(), "fixtures::local::Local");
        assert_eq!(Local::module_path(), Some("fixtures::local"));
        assert_eq!(Local::type_ident(), "Local");
    }

    #[test]
    fn crate_name_is_first_segment() {
        let table = TypePathTable::of::<Local>();
        assert_eq!(table.crate_name(), Some("fixtures"));
        assert_eq!(TypePathTable::of::<u8>().crate_name(), None);
    }

    #[test]
    fn type_equality_uses_id() {
        assert_eq!(Type::of::<Local>(), Type::of::<Local>());
        assert_ne!(Type::of::<Local>(), Type::of::<u8>());
    }
}
