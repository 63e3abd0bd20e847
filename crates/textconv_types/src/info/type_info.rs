use core::any::TypeId;
use core::fmt;
use std::sync::OnceLock;

use crate::info::{InterfaceLink, Member, ParentLink, TextEnum, Type, TypePath, Value};

// -----------------------------------------------------------------------------
// Typed

/// A static accessor to a type's [`TypeInfo`].
///
/// Implement it with a [`TypeInfoCell`] so the descriptor is built once:
///
/// ```
/// use textconv_types::impl_type_path;
/// use textconv_types::info::{TypeInfo, TypeInfoCell, Typed};
///
/// #[derive(Debug, PartialEq)]
/// struct Distance { amount: u32 }
///
/// impl_type_path!(in "my_app::units" => Distance);
///
/// impl Typed for Distance {
///     fn type_info() -> &'static TypeInfo {
///         static CELL: TypeInfoCell = TypeInfoCell::new();
///         CELL.get_or_init(|| {
///             TypeInfo::class::<Self>()
///                 .to_text("print", |d: &Distance| format!("{}m", d.amount))
///                 .from_text_ctor("parse", |s: &str| {
///                     s.trim_end_matches('m').parse().map(|amount| Distance { amount })
///                 })
///                 .build()
///         })
///     }
/// }
///
/// assert_eq!(Distance::type_info().members().len(), 2);
/// ```
///
/// Do not call `Self::type_info()` from inside the initializer; the
/// builder only stores function pointers to the types it mentions.
pub trait Typed: TypePath {
    /// Returns the descriptor of this type.
    fn type_info() -> &'static TypeInfo;
}

// -----------------------------------------------------------------------------
// TypeInfoCell

/// Static storage for the [`TypeInfo`] of a non-generic type.
pub struct TypeInfoCell(OnceLock<TypeInfo>);

impl TypeInfoCell {
    /// Creates an empty cell.
    #[inline]
    pub const fn new() -> Self {
        Self(OnceLock::new())
    }

    /// Returns the stored descriptor, building it with `f` on first access.
    #[inline]
    pub fn get_or_init(&self, f: impl FnOnce() -> TypeInfo) -> &TypeInfo {
        self.0.get_or_init(f)
    }
}

// -----------------------------------------------------------------------------
// EnumInfo

/// Erased access to the variants of a [`TextEnum`].
#[derive(Clone)]
pub struct EnumInfo {
    names: Vec<&'static str>,
    name_of: fn(&dyn Value) -> Option<&'static str>,
    make: fn(usize) -> Option<Box<dyn Value>>,
}

fn erased_name_of<E: TextEnum>(value: &dyn Value) -> Option<&'static str> {
    value.downcast_ref::<E>().map(E::variant_name)
}

fn erased_make<E: TextEnum>(index: usize) -> Option<Box<dyn Value>> {
    E::variants()
        .get(index)
        .map(|variant| Box::new(variant.clone()) as Box<dyn Value>)
}

impl EnumInfo {
    pub(crate) fn of<E: TextEnum>() -> Self {
        Self {
            names: E::variants().iter().map(E::variant_name).collect(),
            name_of: erased_name_of::<E>,
            make: erased_make::<E>,
        }
    }

    /// Variant names in declaration order.
    #[inline]
    pub fn names(&self) -> &[&'static str] {
        &self.names
    }

    /// Returns the canonical spelling of the variant called `name`.
    pub fn find(&self, name: &str) -> Option<&'static str> {
        self.names.iter().copied().find(|n| *n == name)
    }

    /// Returns the name of the variant held by `value`.
    #[inline]
    pub fn name_of(&self, value: &dyn Value) -> Option<&'static str> {
        (self.name_of)(value)
    }

    /// Creates the variant called `name`.
    pub fn make(&self, name: &str) -> Option<Box<dyn Value>> {
        let index = self.names.iter().position(|n| *n == name)?;
        (self.make)(index)
    }
}

impl fmt::Debug for EnumInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EnumInfo").field(&self.names).finish()
    }
}

// -----------------------------------------------------------------------------
// TypeKind

/// The shape of a described type.
#[derive(Debug, Clone)]
pub enum TypeKind {
    /// A concrete type.
    Class,
    /// A trait object type, such as `dyn Shape`.
    Interface,
    /// A fieldless enum written by variant name.
    Enum(EnumInfo),
    /// A per-variant body of an enum; its parent is the enum.
    EnumBody,
}

// -----------------------------------------------------------------------------
// TypeInfo

/// The declared conversion contract of a type.
///
/// Built once per type through [`TypeInfo::class`] and friends, then
/// only read. Two descriptors are equal if they describe the same type.
pub struct TypeInfo {
    pub(crate) ty: Type,
    pub(crate) kind: TypeKind,
    pub(crate) members: Vec<Member>,
    pub(crate) parent: Option<ParentLink>,
    pub(crate) interfaces: Vec<InterfaceLink>,
    pub(crate) factory: Option<fn() -> &'static TypeInfo>,
}

impl TypeInfo {
    /// Returns the [`Type`].
    #[inline(always)]
    pub const fn ty(&self) -> &Type {
        &self.ty
    }

    /// Returns the [`TypeId`].
    #[inline(always)]
    pub const fn id(&self) -> TypeId {
        self.ty.id()
    }

    /// Check if the descriptor is for type `T`.
    #[inline]
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.ty.is::<T>()
    }

    /// See [`TypePath::type_path`].
    #[inline]
    pub fn path(&self) -> &'static str {
        self.ty.path()
    }

    /// See [`TypePath::type_name`].
    #[inline]
    pub fn name(&self) -> &'static str {
        self.ty.name()
    }

    /// See [`TypePath::module_path`].
    #[inline]
    pub fn module_path(&self) -> Option<&'static str> {
        self.ty.module_path()
    }

    #[inline]
    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    /// Returns the variants if this describes a [`TextEnum`].
    #[inline]
    pub fn as_enum(&self) -> Option<&EnumInfo> {
        match &self.kind {
            TypeKind::Enum(info) => Some(info),
            _ => None,
        }
    }

    #[inline]
    pub fn is_interface(&self) -> bool {
        matches!(self.kind, TypeKind::Interface)
    }

    /// Members declared by this type itself.
    #[inline]
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Declared members with the given name.
    pub fn members_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Member> + 'a {
        self.members.iter().filter(move |m| m.name() == name)
    }

    #[inline]
    pub fn parent(&self) -> Option<&ParentLink> {
        self.parent.as_ref()
    }

    /// Interfaces implemented directly by this type.
    #[inline]
    pub fn interfaces(&self) -> &[InterfaceLink] {
        &self.interfaces
    }

    /// The factory type whose static members parse this type.
    #[inline]
    pub fn factory(&self) -> Option<&'static TypeInfo> {
        self.factory.map(|f| f())
    }

    /// This type followed by its parent chain.
    pub fn lineage(&self) -> impl Iterator<Item = &TypeInfo> {
        let mut next = Some(self);
        core::iter::from_fn(move || {
            let current = next?;
            next = current.parent().map(ParentLink::info);
            Some(current)
        })
    }

    /// Returns `true` if a value of this type may stand where `other` is
    /// expected: `other` is this type, one of its ancestors, or an
    /// interface implemented directly by one of them.
    pub fn is_assignable_to(&self, other: &TypeInfo) -> bool {
        self.lineage().any(|level| {
            level == other || level.interfaces().iter().any(|link| link.info() == other)
        })
    }
}

impl PartialEq for TypeInfo {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for TypeInfo {}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeInfo")
            .field("path", &self.path())
            .field("kind", &self.kind)
            .field("members", &self.members)
            .field("parent", &self.parent)
            .field("interfaces", &self.interfaces)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// TypeRef

/// A type written as its path.
///
/// Converting a `TypeRef` from text resolves the path through the rename
/// registry and the [`TypeCatalog`](crate::catalog::TypeCatalog).
#[derive(Clone, Copy)]
pub struct TypeRef(&'static TypeInfo);

impl TypeRef {
    #[inline]
    pub const fn new(info: &'static TypeInfo) -> Self {
        Self(info)
    }

    /// Refers to `T`.
    #[inline]
    pub fn of<T: ?Sized + Typed>() -> Self {
        Self(T::type_info())
    }

    #[inline]
    pub const fn info(&self) -> &'static TypeInfo {
        self.0
    }

    #[inline]
    pub fn path(&self) -> &'static str {
        self.0.path()
    }
}

impl PartialEq for TypeRef {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for TypeRef {}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeRef").field(&self.0.path()).finish()
    }
}
