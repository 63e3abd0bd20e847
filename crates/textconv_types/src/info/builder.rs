use alloc::borrow::Cow;
use alloc::sync::Arc;
use core::marker::PhantomData;

use crate::info::link::projection;
use crate::info::member::{from_text_fn, to_text_fn};
use crate::info::{
    BoxError, EnumInfo, InterfaceLink, InvokeError, Invoker, Marker, Member, MemberKind,
    ParamKind, ParentLink, Signature, TextEnum, Type, TypeInfo, TypeKind, Typed,
    Value,
};

// -----------------------------------------------------------------------------
// Constructors

impl TypeInfo {
    /// Starts describing a concrete type.
    #[inline]
    pub fn class<T: Typed + Send + Sync>() -> TypeInfoBuilder<T> {
        TypeInfoBuilder::new(TypeKind::Class)
    }

    /// Starts describing a trait object type.
    #[inline]
    pub fn interface<I: ?Sized + Typed>() -> InterfaceBuilder<I> {
        InterfaceBuilder {
            ty: Type::of::<I>(),
            members: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Starts describing a [`TextEnum`].
    #[inline]
    pub fn enumeration<E: TextEnum>() -> TypeInfoBuilder<E> {
        TypeInfoBuilder::new(TypeKind::Enum(EnumInfo::of::<E>()))
    }

    /// Starts describing a per-variant body of the enum `E`.
    ///
    /// The enum becomes the parent; interfaces of the enum apply to the body.
    pub fn enum_body<T, E>(project: fn(&T) -> &E) -> TypeInfoBuilder<T>
    where
        T: Typed + Send + Sync,
        E: TextEnum,
    {
        TypeInfoBuilder::new(TypeKind::EnumBody).extends(project)
    }
}

// -----------------------------------------------------------------------------
// Invoker binding

fn bind_to_text<T: Typed + Send + Sync>(
    f: impl Fn(&T) -> Result<String, BoxError> + Send + Sync + 'static,
) -> Invoker {
    Invoker::ToText(to_text_fn(move |value: &dyn Value| {
        let this = value
            .downcast_ref::<T>()
            .ok_or_else(|| InvokeError::mismatch(T::type_path(), value))?;
        f(this).map_err(InvokeError::Failed)
    }))
}

fn bind_from_text<R, E>(f: impl Fn(&str) -> Result<R, E> + Send + Sync + 'static) -> Invoker
where
    R: Value,
    E: Into<BoxError>,
{
    Invoker::FromText(from_text_fn(move |text: &str| match f(text) {
        Ok(value) => Ok(Box::new(value) as Box<dyn Value>),
        Err(err) => Err(err.into()),
    }))
}

// -----------------------------------------------------------------------------
// TypeInfoBuilder

/// Declares the members and relations of a type `T`.
///
/// See [`Typed`] for a complete example.
#[must_use]
pub struct TypeInfoBuilder<T> {
    ty: Type,
    kind: TypeKind,
    members: Vec<Member>,
    parent: Option<ParentLink>,
    interfaces: Vec<InterfaceLink>,
    factory: Option<fn() -> &'static TypeInfo>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Typed + Send + Sync> TypeInfoBuilder<T> {
    fn new(kind: TypeKind) -> Self {
        Self {
            ty: Type::of::<T>(),
            kind,
            members: Vec::new(),
            parent: None,
            interfaces: Vec::new(),
            factory: None,
            _marker: PhantomData,
        }
    }

    /// Marks a method formatting the value as text.
    pub fn to_text(
        self,
        name: &'static str,
        f: impl Fn(&T) -> String + Send + Sync + 'static,
    ) -> Self {
        self.try_to_text(name, move |this: &T| Ok::<_, BoxError>(f(this)))
    }

    /// Marks a fallible method formatting the value as text.
    pub fn try_to_text<E: Into<BoxError>>(
        self,
        name: &'static str,
        f: impl Fn(&T) -> Result<String, E> + Send + Sync + 'static,
    ) -> Self {
        let invoker = bind_to_text::<T>(move |this| f(this).map_err(Into::into));
        self.member(Member::new(
            name,
            MemberKind::Method,
            Some(Marker::ToText),
            Signature::to_text(),
            invoker,
        ))
    }

    /// Marks a static method parsing text into `T`.
    pub fn from_text<E: Into<BoxError>>(
        self,
        name: &'static str,
        f: impl Fn(&str) -> Result<T, E> + Send + Sync + 'static,
    ) -> Self {
        self.static_member(name, Some(Marker::FromText), ParamKind::Str, T::type_info, f)
    }

    /// Marks a static method parsing a character sequence into `T`.
    pub fn from_text_seq<E: Into<BoxError>>(
        self,
        name: &'static str,
        f: impl Fn(Cow<'_, str>) -> Result<T, E> + Send + Sync + 'static,
    ) -> Self {
        let parse = move |text: &str| f(Cow::Borrowed(text));
        self.static_member(name, Some(Marker::FromText), ParamKind::CharSeq, T::type_info, parse)
    }

    /// Marks a static method parsing text into another type `R`.
    ///
    /// Used on factories, and for methods returning a parent or an
    /// interface of the described type.
    pub fn from_text_as<R, E>(
        self,
        name: &'static str,
        f: impl Fn(&str) -> Result<R, E> + Send + Sync + 'static,
    ) -> Self
    where
        R: Typed + Send + Sync,
        E: Into<BoxError>,
    {
        self.static_member(name, Some(Marker::FromText), ParamKind::Str, R::type_info, f)
    }

    /// Marks a constructor parsing text into `T`.
    ///
    /// Constructors are never inherited.
    pub fn from_text_ctor<E: Into<BoxError>>(
        self,
        name: &'static str,
        f: impl Fn(&str) -> Result<T, E> + Send + Sync + 'static,
    ) -> Self {
        self.constructor_member(name, Some(Marker::FromText), f)
    }

    /// Declares an unmarked method formatting the value as text.
    pub fn method(
        self,
        name: &'static str,
        f: impl Fn(&T) -> String + Send + Sync + 'static,
    ) -> Self {
        let invoker = bind_to_text::<T>(move |this| Ok(f(this)));
        self.member(Member::new(
            name,
            MemberKind::Method,
            None,
            Signature::to_text(),
            invoker,
        ))
    }

    /// Declares an unmarked static method taking one text argument.
    pub fn static_fn<R, E>(
        self,
        name: &'static str,
        f: impl Fn(&str) -> Result<R, E> + Send + Sync + 'static,
    ) -> Self
    where
        R: Typed + Send + Sync,
        E: Into<BoxError>,
    {
        self.static_member(name, None, ParamKind::Str, R::type_info, f)
    }

    /// Declares an unmarked constructor taking one text argument.
    pub fn constructor<E: Into<BoxError>>(
        self,
        name: &'static str,
        f: impl Fn(&str) -> Result<T, E> + Send + Sync + 'static,
    ) -> Self {
        self.constructor_member(name, None, f)
    }

    fn static_member<R, E>(
        self,
        name: &'static str,
        marker: Option<Marker>,
        param: ParamKind,
        returns: fn() -> &'static TypeInfo,
        f: impl Fn(&str) -> Result<R, E> + Send + Sync + 'static,
    ) -> Self
    where
        R: Value,
        E: Into<BoxError>,
    {
        self.member(Member::new(
            name,
            MemberKind::StaticMethod,
            marker,
            Signature::from_text(param, returns),
            bind_from_text(f),
        ))
    }

    fn constructor_member<E: Into<BoxError>>(
        self,
        name: &'static str,
        marker: Option<Marker>,
        f: impl Fn(&str) -> Result<T, E> + Send + Sync + 'static,
    ) -> Self {
        self.member(Member::new(
            name,
            MemberKind::Constructor,
            marker,
            Signature::from_text(ParamKind::Str, T::type_info),
            bind_from_text(f),
        ))
    }

    /// Adds a member built by hand.
    pub fn member(mut self, member: Member) -> Self {
        self.members.push(member);
        self
    }

    /// Declares `P` as the single parent of `T`.
    ///
    /// `project` borrows the parent part out of a `T`.
    pub fn extends<P>(mut self, project: fn(&T) -> &P) -> Self
    where
        P: Typed + Send + Sync,
    {
        let projection = projection(move |value| {
            value
                .downcast_ref::<T>()
                .map(|this| project(this) as &dyn Value)
        });
        self.parent = Some(ParentLink::new(P::type_info, projection));
        self
    }

    /// Declares that `T` implements the interface `I`.
    ///
    /// Receiver methods declared on `I` are bound to `T` through `cast`.
    pub fn implements<I>(mut self, cast: fn(&T) -> &I) -> Self
    where
        I: ?Sized + Typed,
    {
        let bound = I::type_info()
            .members()
            .iter()
            .filter(|member| member.kind() == MemberKind::Method)
            .map(|member| match member.invoker() {
                Invoker::Unbound(any) => match any.downcast_ref::<UnboundToText<I>>() {
                    Some(unbound) => {
                        let f = unbound.0.clone();
                        member.with_invoker(bind_to_text::<T>(move |this| f(cast(this))))
                    }
                    None => member.with_invoker(Invoker::Opaque),
                },
                _ => member.clone(),
            })
            .collect();
        self.interfaces.push(InterfaceLink::new(I::type_info, bound));
        self
    }

    /// Declares the factory type whose marked static methods parse `T`.
    pub fn factory<F: ?Sized + Typed>(mut self) -> Self {
        self.factory = Some(F::type_info);
        self
    }

    /// Finishes the descriptor.
    pub fn build(self) -> TypeInfo {
        TypeInfo {
            ty: self.ty,
            kind: self.kind,
            members: self.members,
            parent: self.parent,
            interfaces: self.interfaces,
            factory: self.factory,
        }
    }
}

// -----------------------------------------------------------------------------
// InterfaceBuilder

type InterfaceFn<I> = Arc<dyn Fn(&I) -> Result<String, BoxError> + Send + Sync>;

/// A to-text method declared on an interface, waiting for an implementor.
struct UnboundToText<I: ?Sized>(InterfaceFn<I>);

/// Declares the members of an interface `I`, such as `dyn Shape`.
///
/// ```
/// use textconv_types::impl_type_path;
/// use textconv_types::info::{TypeInfo, TypeInfoCell, Typed};
///
/// pub trait Shape: Send + Sync { fn area(&self) -> f64; }
/// impl_type_path!(in "my_app" => dyn Shape);
///
/// impl Typed for dyn Shape {
///     fn type_info() -> &'static TypeInfo {
///         static CELL: TypeInfoCell = TypeInfoCell::new();
///         CELL.get_or_init(|| {
///             TypeInfo::interface::<Self>()
///                 .to_text("describe", |s| format!("area {}", s.area()))
///                 .build()
///         })
///     }
/// }
///
/// assert!(<dyn Shape as Typed>::type_info().is_interface());
/// ```
#[must_use]
pub struct InterfaceBuilder<I: ?Sized> {
    ty: Type,
    members: Vec<Member>,
    _marker: PhantomData<fn() -> Box<I>>,
}

impl<I: ?Sized + Typed> InterfaceBuilder<I> {
    /// Marks a receiver method formatting implementors as text.
    pub fn to_text(
        self,
        name: &'static str,
        f: impl Fn(&I) -> String + Send + Sync + 'static,
    ) -> Self {
        self.try_to_text(name, move |this: &I| Ok::<_, BoxError>(f(this)))
    }

    /// Marks a fallible receiver method formatting implementors as text.
    pub fn try_to_text<E: Into<BoxError>>(
        self,
        name: &'static str,
        f: impl Fn(&I) -> Result<String, E> + Send + Sync + 'static,
    ) -> Self {
        let f: InterfaceFn<I> = Arc::new(move |this: &I| f(this).map_err(Into::into));
        self.member(Member::new(
            name,
            MemberKind::Method,
            Some(Marker::ToText),
            Signature::to_text(),
            Invoker::Unbound(Arc::new(UnboundToText(f))),
        ))
    }

    /// Marks a static method parsing text into some implementor.
    pub fn from_text<E: Into<BoxError>>(
        self,
        name: &'static str,
        f: impl Fn(&str) -> Result<Box<dyn Value>, E> + Send + Sync + 'static,
    ) -> Self {
        let invoker = Invoker::FromText(from_text_fn(move |text: &str| f(text).map_err(Into::into)));
        self.member(Member::new(
            name,
            MemberKind::StaticMethod,
            Some(Marker::FromText),
            Signature::from_text(ParamKind::Str, I::type_info),
            invoker,
        ))
    }

    /// Marks a static method parsing text into the concrete type `R`.
    pub fn from_text_as<R, E>(
        self,
        name: &'static str,
        f: impl Fn(&str) -> Result<R, E> + Send + Sync + 'static,
    ) -> Self
    where
        R: Typed + Send + Sync,
        E: Into<BoxError>,
    {
        self.member(Member::new(
            name,
            MemberKind::StaticMethod,
            Some(Marker::FromText),
            Signature::from_text(ParamKind::Str, R::type_info),
            bind_from_text(f),
        ))
    }

    /// Adds a member built by hand.
    pub fn member(mut self, member: Member) -> Self {
        self.members.push(member);
        self
    }

    /// Finishes the descriptor.
    pub fn build(self) -> TypeInfo {
        TypeInfo {
            ty: self.ty,
            kind: TypeKind::Interface,
            members: self.members,
            parent: None,
            interfaces: Vec::new(),
            factory: None,
        }
    }
}

// -----------------------------------------------------------------------------
// Tests
