use alloc::sync::Arc;
use core::fmt;

use log::debug;
use textconv_types::info::{
    FromTextFn, Invoker, Marker, Member, MemberKind, ParamKind, ReturnKind, ToTextFn, TypeInfo,
    TypeKind, Value,
};

use crate::converter::{StringConverter, TextParser, project_to};
use crate::error::{ConfigError, ConvertError};
use crate::source::ConverterSource;

// -----------------------------------------------------------------------------
// ToTextRoute

/// How a discovered converter reaches its to-text member.
#[derive(Clone)]
enum ToTextRoute {
    /// A member bound to `owner`, which the value is projected to.
    Bound {
        owner: &'static TypeInfo,
        member: &'static str,
        call: ToTextFn,
    },
    /// A member of the interface `iface`, looked up per value through the
    /// interfaces of its runtime type.
    Interface {
        iface: &'static TypeInfo,
        member: &'static str,
    },
}

impl ToTextRoute {
    fn member(&self) -> &'static str {
        match self {
            Self::Bound { member, .. } | Self::Interface { member, .. } => member,
        }
    }

    fn call(&self, value: &dyn Value) -> Result<String, ConvertError> {
        let mismatch = |expected: &'static TypeInfo| ConvertError::Mismatch {
            expected: expected.path(),
            found: value.value_type_info().path(),
        };
        match self {
            Self::Bound { owner, call, .. } => {
                let part = project_to(value, owner).ok_or_else(|| mismatch(*owner))?;
                call(part).map_err(|err| ConvertError::from_invoke(owner.path(), err))
            }
            Self::Interface { iface, member } => {
                let (part, call) =
                    interface_member(value, iface, member).ok_or_else(|| mismatch(*iface))?;
                call(part).map_err(|err| ConvertError::from_invoke(iface.path(), err))
            }
        }
    }
}

/// Finds the member `name` of `iface` bound to the runtime type of
/// `value` or one of its ancestors.
fn interface_member<'a>(
    value: &'a dyn Value,
    iface: &TypeInfo,
    name: &str,
) -> Option<(&'a dyn Value, &'static ToTextFn)> {
    let mut current = value;
    let mut info = value.value_type_info();
    loop {
        let bound = info
            .interfaces()
            .iter()
            .filter(|link| link.info() == iface)
            .flat_map(|link| link.bound_members())
            .find(|member| member.name() == name);
        if let Some(Invoker::ToText(call)) = bound.map(Member::invoker) {
            return Some((current, call));
        }
        let parent = info.parent()?;
        current = parent.project(current)?;
        info = parent.info();
    }
}

// -----------------------------------------------------------------------------
// DeclaredParser

/// The from-text half discovered from declared members.
#[derive(Clone)]
pub struct DeclaredParser {
    queried: &'static TypeInfo,
    effective: &'static TypeInfo,
    member: &'static str,
    call: FromTextFn,
}

impl DeclaredParser {
    /// The type the converter was discovered for.
    #[inline]
    pub fn queried_type(&self) -> &'static TypeInfo {
        self.queried
    }

    /// The name of the from-text member.
    #[inline]
    pub fn member(&self) -> &'static str {
        self.member
    }
}

impl TextParser for DeclaredParser {
    #[inline]
    fn effective_type(&self) -> &'static TypeInfo {
        self.effective
    }

    fn from_text(
        &self,
        _target: &'static TypeInfo,
        text: &str,
    ) -> Result<Box<dyn Value>, ConvertError> {
        (self.call)(text).map_err(|err| ConvertError::invocation(self.effective.path(), err))
    }
}

impl fmt::Debug for DeclaredParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeclaredParser")
            .field("queried", &self.queried.path())
            .field("effective", &self.effective.path())
            .field("member", &self.member)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// DeclaredConverter

/// A converter calling the declared to-text and from-text members of a type.
#[derive(Clone)]
pub struct DeclaredConverter {
    parser: DeclaredParser,
    to_text: ToTextRoute,
}

impl DeclaredConverter {
    /// The type the converter was discovered for.
    #[inline]
    pub fn queried_type(&self) -> &'static TypeInfo {
        self.parser.queried
    }

    /// The names of the to-text and from-text members.
    #[inline]
    pub fn members(&self) -> (&'static str, &'static str) {
        (self.to_text.member(), self.parser.member)
    }
}

impl TextParser for DeclaredConverter {
    #[inline]
    fn effective_type(&self) -> &'static TypeInfo {
        self.parser.effective
    }

    #[inline]
    fn from_text(
        &self,
        target: &'static TypeInfo,
        text: &str,
    ) -> Result<Box<dyn Value>, ConvertError> {
        self.parser.from_text(target, text)
    }
}

impl StringConverter for DeclaredConverter {
    #[inline]
    fn to_text(&self, value: &dyn Value) -> Result<String, ConvertError> {
        self.to_text.call(value)
    }
}

impl fmt::Debug for DeclaredConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeclaredConverter")
            .field("queried", &self.parser.queried.path())
            .field("effective", &self.parser.effective.path())
            .field("to_text", &self.to_text.member())
            .field("from_text", &self.parser.member)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// DeclaredSource

/// Builds converters from the members a type marks with [`Marker`]s.
///
/// To-text: the type and then its parent chain are searched level by
/// level; the first level with one marked method wins, and two at one
/// level are ambiguous. Without a match, the immediate interfaces are
/// searched as one set.
///
/// From-text: a marked constructor of the type itself, a factory, a
/// marked static method of the type or an ancestor, or a marked static
/// method of an immediate interface, in that order. The declaring type
/// becomes the converter's effective type.
///
/// A type with only one half of the contract is a [`ConfigError`];
/// [`find_parser`](Self::find_parser) accepts the from-text half alone.
#[derive(Debug, Default, Clone, Copy)]
pub struct DeclaredSource;

impl DeclaredSource {
    /// Creates the source.
    #[inline]
    pub const fn new() -> Self {
        Self
    }

    /// Discovers the from-text half of the contract of `info` alone.
    pub fn find_parser(
        &self,
        info: &'static TypeInfo,
    ) -> Result<Option<Arc<dyn TextParser>>, ConfigError> {
        let Some(parser) = find_from_text(info)? else {
            return Ok(None);
        };
        debug!(
            "discovered parser `{}::{}` for `{}`",
            parser.effective.path(),
            parser.member,
            info.path(),
        );
        Ok(Some(Arc::new(parser)))
    }

    /// Builds a converter from the members of `info` with the given names.
    ///
    /// Markers are not required. `to_name` is searched on the type and its
    /// ancestors, `from_name` on the type and then the static methods of
    /// its ancestors.
    pub fn by_method_names(
        info: &'static TypeInfo,
        to_name: &str,
        from_name: &str,
    ) -> Result<DeclaredConverter, ConfigError> {
        let to_text = named_to_text(info, to_name)?;
        let mut parser = None;
        for (depth, level) in info.lineage().enumerate() {
            let candidate = level.members_named(from_name).find(|member| match member.kind() {
                MemberKind::StaticMethod => true,
                MemberKind::Constructor => depth == 0,
                MemberKind::Method => false,
            });
            if let Some(member) = candidate {
                parser = Some(checked_from_text(info, level, member)?);
                break;
            }
        }
        let parser = parser.ok_or_else(|| ConfigError::MemberNotFound {
            type_path: info.path(),
            name: from_name.into(),
            marker: Marker::FromText,
        })?;
        Ok(DeclaredConverter { parser, to_text })
    }

    /// Builds a converter from the method `to_name` and the single
    /// text constructor of `info`.
    pub fn by_method_and_constructor(
        info: &'static TypeInfo,
        to_name: &str,
    ) -> Result<DeclaredConverter, ConfigError> {
        let to_text = named_to_text(info, to_name)?;
        let mut ctors = info.members().iter().filter(|member| {
            member.kind() == MemberKind::Constructor
                && matches!(member.signature().params(), [ParamKind::Str | ParamKind::CharSeq])
        });
        let first = ctors.next().ok_or_else(|| ConfigError::MemberNotFound {
            type_path: info.path(),
            name: "<constructor>".into(),
            marker: Marker::FromText,
        })?;
        if let Some(second) = ctors.next() {
            return Err(ConfigError::AmbiguousFromText {
                type_path: info.path(),
                first: first.name(),
                second: second.name(),
            });
        }
        let parser = checked_from_text(info, info, first)?;
        Ok(DeclaredConverter { parser, to_text })
    }
}

impl ConverterSource for DeclaredSource {
    fn find(
        &self,
        info: &'static TypeInfo,
    ) -> Result<Option<Arc<dyn StringConverter>>, ConfigError> {
        let to_text = find_to_text(info)?;
        let from_text = find_from_text(info)?;
        match (to_text, from_text) {
            (Some(to_text), Some(parser)) => {
                debug!(
                    "discovered converter for `{}`: to-text `{}`, from-text `{}::{}`",
                    info.path(),
                    to_text.member(),
                    parser.effective.path(),
                    parser.member,
                );
                Ok(Some(Arc::new(DeclaredConverter { parser, to_text })))
            }
            (Some(_), None) => Err(ConfigError::MissingFromText {
                type_path: info.path(),
            }),
            (None, Some(_)) => Err(ConfigError::MissingToText {
                type_path: info.path(),
            }),
            (None, None) => Ok(None),
        }
    }

    fn name(&self) -> &'static str {
        "DeclaredSource"
    }
}

// -----------------------------------------------------------------------------
// To-text discovery

/// The type whose immediate interfaces are searched.
///
/// An enum body uses the interfaces of its enum.
fn interface_basis(info: &'static TypeInfo) -> &'static TypeInfo {
    match (info.kind(), info.parent()) {
        (TypeKind::EnumBody, Some(parent)) => parent.info(),
        _ => info,
    }
}

fn find_to_text(info: &'static TypeInfo) -> Result<Option<ToTextRoute>, ConfigError> {
    for level in info.lineage() {
        let mut marked = level.members().iter().filter(|m| m.is_marked(Marker::ToText));
        let Some(first) = marked.next() else {
            continue;
        };
        if let Some(second) = marked.next() {
            return Err(ConfigError::AmbiguousToText {
                type_path: level.path(),
                first: first.name(),
                second: second.name(),
            });
        }
        return checked_to_text(level, level, first).map(Some);
    }

    let basis = interface_basis(info);
    let mut marked = basis.interfaces().iter().flat_map(|link| {
        link.bound_members()
            .iter()
            .filter(|m| m.is_marked(Marker::ToText))
            .map(move |m| (link.info(), m))
    });
    let Some((iface, first)) = marked.next() else {
        return Ok(None);
    };
    if let Some((_, second)) = marked.next() {
        return Err(ConfigError::AmbiguousToText {
            type_path: basis.path(),
            first: first.name(),
            second: second.name(),
        });
    }
    checked_to_text(iface, basis, first).map(Some)
}

fn named_to_text(info: &'static TypeInfo, name: &str) -> Result<ToTextRoute, ConfigError> {
    for level in info.lineage() {
        if let Some(member) = level
            .members_named(name)
            .find(|m| m.kind() == MemberKind::Method)
        {
            return checked_to_text(level, level, member);
        }
    }
    Err(ConfigError::MemberNotFound {
        type_path: info.path(),
        name: name.into(),
        marker: Marker::ToText,
    })
}

/// Validates a to-text member declared on `level` and callable with a
/// value projected to `owner`.
fn checked_to_text(
    level: &'static TypeInfo,
    owner: &'static TypeInfo,
    member: &Member,
) -> Result<ToTextRoute, ConfigError> {
    let invalid = |reason| ConfigError::InvalidToText {
        type_path: level.path(),
        member: member.name(),
        reason,
    };
    if member.kind() != MemberKind::Method {
        return Err(invalid("must take a receiver"));
    }
    if !member.signature().params().is_empty() {
        return Err(invalid("must take no arguments"));
    }
    if !matches!(member.signature().returns(), ReturnKind::Text) {
        return Err(invalid("must return `String`"));
    }
    match member.invoker() {
        Invoker::ToText(call) => Ok(ToTextRoute::Bound {
            owner,
            member: member.name(),
            call: call.clone(),
        }),
        Invoker::Unbound(_) if level.is_interface() && level == owner => {
            Ok(ToTextRoute::Interface {
                iface: level,
                member: member.name(),
            })
        }
        _ => Err(invalid("has no callable to-text invoker")),
    }
}

// -----------------------------------------------------------------------------
// From-text discovery

fn returns_compatible(member: &Member, queried: &TypeInfo) -> bool {
    match member.signature().returns() {
        ReturnKind::Type(returns) => queried.is_assignable_to(returns()),
        ReturnKind::Text | ReturnKind::Other(_) => false,
    }
}

/// Validates a from-text member of `level`, which becomes the effective type.
fn checked_from_text(
    queried: &'static TypeInfo,
    level: &'static TypeInfo,
    member: &Member,
) -> Result<DeclaredParser, ConfigError> {
    let invalid = |reason| ConfigError::InvalidFromText {
        type_path: level.path(),
        member: member.name(),
        reason,
    };
    if member.kind() == MemberKind::Method {
        return Err(invalid("must not take a receiver"));
    }
    match member.signature().params() {
        [ParamKind::Str | ParamKind::CharSeq] => {}
        [ParamKind::Other(_)] => {
            return Err(invalid("must take `&str`, `String` or a character sequence"));
        }
        _ => return Err(invalid("must take exactly one argument")),
    }
    if !returns_compatible(member, queried) {
        return Err(invalid("must return the type, an ancestor or an interface of it"));
    }
    match member.invoker() {
        Invoker::FromText(call) => Ok(DeclaredParser {
            queried,
            effective: level,
            member: member.name(),
            call: call.clone(),
        }),
        _ => Err(invalid("has no callable from-text invoker")),
    }
}

/// Picks the single member of `candidates`, declared on `level`.
fn single_from_text<'a>(
    queried: &'static TypeInfo,
    level: &'static TypeInfo,
    mut candidates: impl Iterator<Item = &'a Member>,
) -> Result<Option<DeclaredParser>, ConfigError> {
    let Some(first) = candidates.next() else {
        return Ok(None);
    };
    if let Some(second) = candidates.next() {
        return Err(ConfigError::AmbiguousFromText {
            type_path: level.path(),
            first: first.name(),
            second: second.name(),
        });
    }
    checked_from_text(queried, level, first).map(Some)
}

fn marked_statics(info: &TypeInfo) -> impl Iterator<Item = &Member> {
    info.members()
        .iter()
        .filter(|m| m.is_marked(Marker::FromText) && m.kind() == MemberKind::StaticMethod)
}

/// Scans `factory` for the from-text member of `queried`; `carrier` is the
/// type naming the factory.
fn from_factory(
    queried: &'static TypeInfo,
    carrier: &'static TypeInfo,
    factory: &'static TypeInfo,
) -> Result<DeclaredParser, ConfigError> {
    let mut compatible = marked_statics(factory).filter(|m| returns_compatible(m, queried));
    let first = compatible.next().ok_or(ConfigError::EmptyFactory {
        type_path: queried.path(),
        factory: factory.path(),
    })?;
    if compatible.next().is_some() {
        return Err(ConfigError::AmbiguousFactory {
            type_path: queried.path(),
            factory: factory.path(),
        });
    }
    checked_from_text(queried, carrier, first)
}

fn find_from_text(info: &'static TypeInfo) -> Result<Option<DeclaredParser>, ConfigError> {
    let own = || info.members().iter().filter(|m| m.is_marked(Marker::FromText));
    if let Some(member) = own().find(|m| m.kind() == MemberKind::Method) {
        return checked_from_text(info, info, member).map(Some);
    }
    let has_ctor = own().any(|m| m.kind() == MemberKind::Constructor);
    let has_static = own().any(|m| m.kind() == MemberKind::StaticMethod);

    if let Some(factory) = info.factory() {
        if has_static {
            return Err(ConfigError::FactoryAndMethod {
                type_path: info.path(),
            });
        }
        if has_ctor {
            return Err(ConfigError::ConstructorAndMethod {
                type_path: info.path(),
            });
        }
        return from_factory(info, info, factory).map(Some);
    }
    if has_ctor && has_static {
        return Err(ConfigError::ConstructorAndMethod {
            type_path: info.path(),
        });
    }
    if has_ctor {
        let ctors = own().filter(|m| m.kind() == MemberKind::Constructor);
        return single_from_text(info, info, ctors);
    }
    if has_static {
        return single_from_text(info, info, marked_statics(info));
    }

    // Constructors are never inherited.
    for level in info.lineage().skip(1) {
        if let Some(factory) = level.factory() {
            return from_factory(info, level, factory).map(Some);
        }
        if let Some(parser) = single_from_text(info, level, marked_statics(level))? {
            return Ok(Some(parser));
        }
    }

    let basis = interface_basis(info);
    let mut marked = basis.interfaces().iter().flat_map(|link| {
        let iface = link.info();
        marked_statics(iface).map(move |m| (iface, m))
    });
    let Some((iface, first)) = marked.next() else {
        return Ok(None);
    };
    if let Some((_, second)) = marked.next() {
        return Err(ConfigError::AmbiguousFromText {
            type_path: basis.path(),
            first: first.name(),
            second: second.name(),
        });
    }
    checked_from_text(info, iface, first).map(Some)
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::sync::Arc;
    use core::num::ParseIntError;

    use textconv_types::info::{
        BoxError, Invoker, Member, MemberKind, ParamKind, Signature, TextEnum, TypeInfo,
        TypeInfoCell, Typed, Value,
    };

    use super::DeclaredSource;
    use crate::converter::{StringConverter, TextParser};
    use crate::error::ConfigError;
    use crate::source::ConverterSource;

    macro_rules! describe {
        (dyn $name:ident => $info:expr) => {
            textconv_types::impl_type_path!(in "fixtures" => dyn $name);
            impl Typed for dyn $name {
                fn type_info() -> &'static TypeInfo {
                    static CELL: TypeInfoCell = TypeInfoCell::new();
                    CELL.get_or_init(|| $info)
                }
            }
        };
        ($name:ident => $info:expr) => {
            textconv_types::impl_type_path!(in "fixtures" => $name);
            impl Typed for $name {
                fn type_info() -> &'static TypeInfo {
                    static CELL: TypeInfoCell = TypeInfoCell::new();
                    CELL.get_or_init(|| $info)
                }
            }
        };
    }

    fn parse_u32(text: &str, suffix: char) -> Result<u32, ParseIntError> {
        text.trim_end_matches(suffix).parse()
    }

    fn find(info: &'static TypeInfo) -> Result<Option<Arc<dyn StringConverter>>, ConfigError> {
        DeclaredSource.find(info)
    }

    // ---- Plain classes

    #[derive(Debug, PartialEq)]
    struct Distance {
        amount: u32,
    }
    describe!(Distance => TypeInfo::class::<Distance>()
        .to_text("print", |d: &Distance| format!("{}m", d.amount))
        .from_text_ctor("parse", |s: &str| parse_u32(s, 'm').map(|amount| Distance { amount }))
        .build());

    struct TwoPrinters;
    describe!(TwoPrinters => TypeInfo::class::<TwoPrinters>()
        .to_text("a", |_: &TwoPrinters| "a".into())
        .to_text("b", |_: &TwoPrinters| "b".into())
        .from_text("parse", |_: &str| Ok::<_, BoxError>(TwoPrinters))
        .build());

    struct TwoParsers;
    describe!(TwoParsers => TypeInfo::class::<TwoParsers>()
        .to_text("print", |_: &TwoParsers| String::new())
        .from_text("parse", |_: &str| Ok::<_, BoxError>(TwoParsers))
        .from_text("read", |_: &str| Ok::<_, BoxError>(TwoParsers))
        .build());

    #[derive(Debug, PartialEq)]
    struct Code(String);
    describe!(Code => TypeInfo::class::<Code>()
        .to_text("print", |c: &Code| c.0.clone())
        .from_text_seq("parse", |s| Ok::<_, BoxError>(Code(s.into_owned())))
        .build());

    struct CtorAndMethod;
    describe!(CtorAndMethod => TypeInfo::class::<CtorAndMethod>()
        .to_text("print", |_: &CtorAndMethod| String::new())
        .from_text_ctor("new", |_: &str| Ok::<_, BoxError>(CtorAndMethod))
        .from_text("parse", |_: &str| Ok::<_, BoxError>(CtorAndMethod))
        .build());

    struct PrintOnly;
    describe!(PrintOnly => TypeInfo::class::<PrintOnly>()
        .to_text("print", |_: &PrintOnly| String::new())
        .build());

    #[derive(Debug, PartialEq)]
    struct ParseOnly(u32);
    describe!(ParseOnly => TypeInfo::class::<ParseOnly>()
        .from_text("parse", |s: &str| s.parse().map(ParseOnly))
        .build());

    struct WrongParam;
    describe!(WrongParam => TypeInfo::class::<WrongParam>()
        .to_text("print", |_: &WrongParam| String::new())
        .member(Member::new(
            "parse",
            MemberKind::StaticMethod,
            Some(textconv_types::info::Marker::FromText),
            Signature::from_text(ParamKind::Other("i32"), WrongParam::type_info),
            Invoker::Opaque,
        ))
        .build());

    #[test]
    fn constructor_and_method() {
        let conv = find(Distance::type_info()).unwrap().unwrap();
        assert!(conv.effective_type().is::<Distance>());
        assert_eq!(conv.to_text(&Distance { amount: 25 }).unwrap(), "25m");
        let value = conv.from_text(Distance::type_info(), "25m").unwrap();
        assert_eq!(value.take::<Distance>(), Ok(Distance { amount: 25 }));
    }

    #[test]
    fn two_to_text_members_are_ambiguous() {
        let err = find(TwoPrinters::type_info()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::AmbiguousToText {
                first: "a",
                second: "b",
                ..
            }
        ));
    }

    #[test]
    fn two_from_text_statics_are_ambiguous() {
        let err = find(TwoParsers::type_info()).unwrap_err();
        assert_eq!(
            err,
            ConfigError::AmbiguousFromText {
                type_path: "fixtures::TwoParsers",
                first: "parse",
                second: "read",
            }
        );
    }

    #[test]
    fn character_sequence_parameter() {
        let conv = find(Code::type_info()).unwrap().unwrap();
        assert!(conv.effective_type().is::<Code>());
        let value = conv.from_text(Code::type_info(), "A-17").unwrap();
        assert_eq!(value.take::<Code>(), Ok(Code("A-17".into())));
        assert_eq!(conv.to_text(&Code("B-2".into())).unwrap(), "B-2");
    }

    #[test]
    fn marked_constructor_and_method_conflict() {
        let err = find(CtorAndMethod::type_info()).unwrap_err();
        assert_eq!(
            err,
            ConfigError::ConstructorAndMethod {
                type_path: "fixtures::CtorAndMethod"
            }
        );
    }

    #[test]
    fn asymmetric_contracts() {
        assert!(matches!(
            find(PrintOnly::type_info()),
            Err(ConfigError::MissingFromText { .. })
        ));
        assert!(matches!(
            find(ParseOnly::type_info()),
            Err(ConfigError::MissingToText { .. })
        ));
        assert!(DeclaredSource.find_parser(PrintOnly::type_info()).unwrap().is_none());

        let parser = DeclaredSource
            .find_parser(ParseOnly::type_info())
            .unwrap()
            .unwrap();
        let value = parser.from_text(ParseOnly::type_info(), "9").unwrap();
        assert_eq!(value.take::<ParseOnly>(), Ok(ParseOnly(9)));
    }

    #[test]
    fn parameter_kind_is_checked() {
        let err = find(WrongParam::type_info()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidFromText {
                member: "parse",
                ..
            }
        ));
    }

    #[test]
    fn undescribed_type_is_not_applicable() {
        assert!(find(u8::type_info()).unwrap().is_none());
    }

    // ---- Inheritance

    #[derive(Debug, PartialEq)]
    struct Base {
        id: u32,
    }
    describe!(Base => TypeInfo::class::<Base>()
        .to_text("print", |b: &Base| format!("#{}", b.id))
        .from_text("parse", |s: &str| s.trim_start_matches('#').parse().map(|id| Base { id }))
        .build());

    struct Derived {
        base: Base,
    }
    describe!(Derived => TypeInfo::class::<Derived>()
        .extends(|d: &Derived| &d.base)
        .build());

    #[test]
    fn ancestor_contract_is_inherited() {
        let conv = find(Derived::type_info()).unwrap().unwrap();
        assert!(conv.effective_type().is::<Base>());
        let derived = Derived { base: Base { id: 4 } };
        assert_eq!(conv.to_text(&derived).unwrap(), "#4");
        let value = conv.from_text(Derived::type_info(), "#4").unwrap();
        assert_eq!(value.take::<Base>(), Ok(Base { id: 4 }));
    }

    // ---- Interfaces

    trait Shape: Send + Sync {
        fn describe(&self) -> String;
    }
    describe!(dyn Shape => TypeInfo::interface::<dyn Shape>()
        .to_text("describe", |s| s.describe())
        .from_text("parse", |s: &str| -> Result<Box<dyn Value>, BoxError> {
            let radius = s.strip_prefix("circle:").ok_or("not a circle")?.parse()?;
            Ok(Box::new(Circle { radius }))
        })
        .build());

    #[derive(Debug, PartialEq)]
    struct Circle {
        radius: u32,
    }
    describe!(Circle => TypeInfo::class::<Circle>()
        .implements::<dyn Shape>(|c| c)
        .build());

    impl Shape for Circle {
        fn describe(&self) -> String {
            format!("circle:{}", self.radius)
        }
    }

    #[test]
    fn interface_contract_sets_effective_type() {
        let conv = find(Circle::type_info()).unwrap().unwrap();
        assert!(conv.effective_type().is::<dyn Shape>());
        assert_eq!(conv.to_text(&Circle { radius: 3 }).unwrap(), "circle:3");
        let value = conv.from_text(Circle::type_info(), "circle:3").unwrap();
        assert_eq!(value.take::<Circle>(), Ok(Circle { radius: 3 }));
    }

    #[test]
    fn interface_queried_directly() {
        let conv = find(<dyn Shape as Typed>::type_info()).unwrap().unwrap();
        assert_eq!(conv.to_text(&Circle { radius: 8 }).unwrap(), "circle:8");
        assert!(conv.to_text(&8_u32).is_err());
    }

    trait Loud: Send + Sync {
        fn shout(&self) -> String;
    }
    describe!(dyn Loud => TypeInfo::interface::<dyn Loud>()
        .to_text("shout", |l| l.shout())
        .build());

    trait Quiet: Send + Sync {
        fn whisper(&self) -> String;
    }
    describe!(dyn Quiet => TypeInfo::interface::<dyn Quiet>()
        .to_text("whisper", |q| q.whisper())
        .build());

    struct Both;
    describe!(Both => TypeInfo::class::<Both>()
        .implements::<dyn Loud>(|b| b)
        .implements::<dyn Quiet>(|b| b)
        .from_text_ctor("new", |_: &str| Ok::<_, BoxError>(Both))
        .build());

    impl Loud for Both {
        fn shout(&self) -> String {
            "BOTH".into()
        }
    }

    impl Quiet for Both {
        fn whisper(&self) -> String {
            "both".into()
        }
    }

    #[derive(Debug, PartialEq)]
    struct Siren(u8);
    describe!(Siren => TypeInfo::class::<Siren>()
        .to_text("print", |s: &Siren| format!("siren {}", s.0))
        .implements::<dyn Loud>(|s| s)
        .from_text_ctor("new", |s: &str| s.trim_start_matches("siren ").parse().map(Siren))
        .build());

    impl Loud for Siren {
        fn shout(&self) -> String {
            "WEE-OO".into()
        }
    }

    #[test]
    fn to_text_across_two_interfaces_is_ambiguous() {
        let err = find(Both::type_info()).unwrap_err();
        assert_eq!(
            err,
            ConfigError::AmbiguousToText {
                type_path: "fixtures::Both",
                first: "shout",
                second: "whisper",
            }
        );
    }

    #[test]
    fn class_to_text_beats_interface() {
        let conv = find(Siren::type_info()).unwrap().unwrap();
        assert!(conv.effective_type().is::<Siren>());
        assert_eq!(conv.to_text(&Siren(2)).unwrap(), "siren 2");
        let value = conv.from_text(Siren::type_info(), "siren 2").unwrap();
        assert_eq!(value.take::<Siren>(), Ok(Siren(2)));
    }

    // ---- Factories

    #[derive(Debug, PartialEq)]
    struct Celsius(i32);
    describe!(Celsius => TypeInfo::class::<Celsius>()
        .to_text("print", |c: &Celsius| format!("{}C", c.0))
        .factory::<Temperatures>()
        .build());

    struct Temperatures;
    describe!(Temperatures => TypeInfo::class::<Temperatures>()
        .from_text_as("celsius", |s: &str| s.trim_end_matches('C').parse().map(Celsius))
        .build());

    struct Kelvin;
    describe!(Kelvin => TypeInfo::class::<Kelvin>()
        .to_text("print", |_: &Kelvin| String::new())
        .factory::<Temperatures>()
        .build());

    struct FactoryAndOwn;
    describe!(FactoryAndOwn => TypeInfo::class::<FactoryAndOwn>()
        .to_text("print", |_: &FactoryAndOwn| String::new())
        .from_text("parse", |_: &str| Ok::<_, BoxError>(FactoryAndOwn))
        .factory::<Temperatures>()
        .build());

    #[derive(Debug, PartialEq)]
    struct Coin(u32);
    describe!(Coin => TypeInfo::class::<Coin>()
        .to_text("print", |c: &Coin| c.0.to_string())
        .factory::<Mint>()
        .build());

    struct Mint;
    describe!(Mint => TypeInfo::class::<Mint>()
        .from_text_as("cents", |s: &str| s.parse().map(Coin))
        .from_text_as("dollars", |s: &str| s.parse::<u32>().map(|d| Coin(d * 100)))
        .build());

    #[test]
    fn factory_supplies_from_text() {
        let conv = find(Celsius::type_info()).unwrap().unwrap();
        assert!(conv.effective_type().is::<Celsius>());
        let value = conv.from_text(Celsius::type_info(), "-4C").unwrap();
        assert_eq!(value.take::<Celsius>(), Ok(Celsius(-4)));
    }

    #[test]
    fn factory_errors() {
        assert!(matches!(
            find(Kelvin::type_info()),
            Err(ConfigError::EmptyFactory {
                factory: "fixtures::Temperatures",
                ..
            })
        ));
        assert!(matches!(
            find(FactoryAndOwn::type_info()),
            Err(ConfigError::FactoryAndMethod { .. })
        ));
    }

    #[test]
    fn factory_with_two_candidates_is_ambiguous() {
        assert_eq!(
            find(Coin::type_info()).unwrap_err(),
            ConfigError::AmbiguousFactory {
                type_path: "fixtures::Coin",
                factory: "fixtures::Mint",
            }
        );
    }

    // ---- Enum bodies

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Suit {
        Hearts,
        Spades,
    }
    describe!(Suit => TypeInfo::enumeration::<Suit>()
        .implements::<dyn Labelled>(|s| s)
        .build());

    impl TextEnum for Suit {
        fn variants() -> &'static [Self] {
            &[Suit::Hearts, Suit::Spades]
        }
        fn variant_name(&self) -> &'static str {
            match self {
                Suit::Hearts => "Hearts",
                Suit::Spades => "Spades",
            }
        }
    }

    trait Labelled: Send + Sync {
        fn label(&self) -> &'static str;
    }
    describe!(dyn Labelled => TypeInfo::interface::<dyn Labelled>()
        .to_text("label", |l| l.label().to_lowercase())
        .from_text_as("parse", |s: &str| match s {
            "hearts" => Ok(Suit::Hearts),
            "spades" => Ok(Suit::Spades),
            _ => Err("unknown suit"),
        })
        .build());

    impl Labelled for Suit {
        fn label(&self) -> &'static str {
            self.variant_name()
        }
    }

    struct SpadesBody {
        suit: Suit,
    }
    describe!(SpadesBody => TypeInfo::enum_body::<SpadesBody, Suit>(|b| &b.suit).build());

    #[test]
    fn enum_body_uses_enum_interfaces() {
        let conv = find(SpadesBody::type_info()).unwrap().unwrap();
        assert!(conv.effective_type().is::<dyn Labelled>());
        let body = SpadesBody { suit: Suit::Spades };
        assert_eq!(conv.to_text(&body).unwrap(), "spades");
    }

    // ---- Named members

    struct Named(u32);
    describe!(Named => TypeInfo::class::<Named>()
        .method("show", |n: &Named| n.0.to_string())
        .constructor("new", |s: &str| s.parse().map(Named))
        .static_fn("read", |s: &str| s.parse().map(Named))
        .build());

    #[test]
    fn converters_by_member_name() {
        let conv = DeclaredSource::by_method_names(Named::type_info(), "show", "read").unwrap();
        assert_eq!(conv.members(), ("show", "read"));
        assert_eq!(conv.to_text(&Named(5)).unwrap(), "5");

        let conv = DeclaredSource::by_method_and_constructor(Named::type_info(), "show").unwrap();
        assert_eq!(conv.members(), ("show", "new"));

        let err = DeclaredSource::by_method_names(Named::type_info(), "missing", "read").unwrap_err();
        assert!(matches!(err, ConfigError::MemberNotFound { .. }));
    }
}
