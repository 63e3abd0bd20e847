//! Type descriptors: the declared conversion contract of each type.
//!
//! ## Menu
//!
//! - [`TypePath`]: stable names for types, implemented with [`impl_type_path!`](crate::impl_type_path).
//! - [`Typed`]: static access to a type's [`TypeInfo`].
//! - [`TypeInfo`]: members, parent, interfaces and factory of a type.
//! - [`TypeInfoBuilder`] and [`InterfaceBuilder`]: declare a [`TypeInfo`].
//! - [`Member`]: a method or constructor, optionally carrying a [`Marker`].
//! - [`Value`]: a type-erased value crossing the conversion boundary.
//! - [`TextEnum`]: enums written by variant name.
//! - [`TypeRef`]: a type written as its path.

// -----------------------------------------------------------------------------
// Modules

mod builder;
mod link;
mod member;
mod type_info;
mod type_path;
mod value;

// -----------------------------------------------------------------------------
// Exports

pub use builder::{InterfaceBuilder, TypeInfoBuilder};
pub use link::{InterfaceLink, ParentLink, Projection};
pub use member::{
    BoxError, FromTextFn, InvokeError, Invoker, Marker, Member, MemberKind, ParamKind,
    ReturnKind, Signature, ToTextFn,
};
pub use type_info::{EnumInfo, TypeInfo, TypeInfoCell, TypeKind, TypeRef, Typed};
pub use type_path::{Type, TypePath, TypePathTable};
pub use value::{TextEnum, Value};
