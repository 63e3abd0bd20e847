use alloc::sync::Arc;
use core::any::Any;
use core::{error, fmt};

use crate::info::{TypeInfo, Value};

// -----------------------------------------------------------------------------
// Erased signatures

/// Error type returned by user conversion code.
pub type BoxError = Box<dyn error::Error + Send + Sync + 'static>;

/// An erased to-text method, bound to the type it was declared for.
pub type ToTextFn = Arc<dyn Fn(&dyn Value) -> Result<String, InvokeError> + Send + Sync>;

/// An erased from-text constructor or static method.
pub type FromTextFn = Arc<dyn Fn(&str) -> Result<Box<dyn Value>, BoxError> + Send + Sync>;

#[inline]
pub(crate) fn to_text_fn<F>(f: F) -> ToTextFn
where
    F: Fn(&dyn Value) -> Result<String, InvokeError> + Send + Sync + 'static,
{
    Arc::new(f)
}

#[inline]
pub(crate) fn from_text_fn<F>(f: F) -> FromTextFn
where
    F: Fn(&str) -> Result<Box<dyn Value>, BoxError> + Send + Sync + 'static,
{
    Arc::new(f)
}

// -----------------------------------------------------------------------------
// InvokeError

/// Failure of a bound to-text invoker.
#[derive(Debug)]
pub enum InvokeError {
    /// The value handed to the invoker is not of the bound type.
    Mismatch {
        expected: &'static str,
        found: &'static str,
    },
    /// The user method itself failed.
    Failed(BoxError),
}

impl InvokeError {
    #[inline]
    pub(crate) fn mismatch(expected: &'static str, found: &dyn Value) -> Self {
        Self::Mismatch {
            expected,
            found: found.value_type_info().path(),
        }
    }
}

impl fmt::Display for InvokeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mismatch { expected, found } => {
                write!(f, "expected a value of `{expected}`, found `{found}`")
            }
            Self::Failed(err) => fmt::Display::fmt(err, f),
        }
    }
}

impl error::Error for InvokeError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Mismatch { .. } => None,
            Self::Failed(err) => Some(&**err),
        }
    }
}

// -----------------------------------------------------------------------------
// Marker

/// Marks a member as part of the type's conversion contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    /// Formats the receiver as text.
    ToText,
    /// Parses text into a value.
    FromText,
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ToText => f.pad("to-text"),
            Self::FromText => f.pad("from-text"),
        }
    }
}

// -----------------------------------------------------------------------------
// MemberKind

/// How a member is called.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    /// Takes a receiver.
    Method,
    /// Associated function without receiver.
    StaticMethod,
    /// Associated function producing `Self`. Never inherited.
    Constructor,
}

// -----------------------------------------------------------------------------
// Signature

/// The kind of a declared parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// `&str` or `String`.
    Str,
    /// Any borrowed character sequence, such as `Cow<str>`.
    CharSeq,
    /// Anything else, with its type path.
    Other(&'static str),
}

/// The kind of a declared return value.
#[derive(Clone, Copy)]
pub enum ReturnKind {
    /// `String`.
    Text,
    /// A described type.
    Type(fn() -> &'static TypeInfo),
    /// Anything else, with its type path.
    Other(&'static str),
}

impl fmt::Debug for ReturnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => f.write_str("Text"),
            Self::Type(info) => f.debug_tuple("Type").field(&info().path()).finish(),
            Self::Other(path) => f.debug_tuple("Other").field(path).finish(),
        }
    }
}

/// Declared parameters (receiver excluded) and return kind of a member.
#[derive(Debug, Clone)]
pub struct Signature {
    params: Vec<ParamKind>,
    returns: ReturnKind,
}

impl Signature {
    /// Creates a signature.
    pub fn new(params: impl Into<Vec<ParamKind>>, returns: ReturnKind) -> Self {
        Self {
            params: params.into(),
            returns,
        }
    }

    /// Zero arguments, returns `String`.
    #[inline]
    pub fn to_text() -> Self {
        Self::new([], ReturnKind::Text)
    }

    /// One text argument, returns the described type.
    #[inline]
    pub fn from_text(param: ParamKind, returns: fn() -> &'static TypeInfo) -> Self {
        Self::new([param], ReturnKind::Type(returns))
    }

    #[inline]
    pub fn params(&self) -> &[ParamKind] {
        &self.params
    }

    #[inline]
    pub fn returns(&self) -> ReturnKind {
        self.returns
    }
}

// -----------------------------------------------------------------------------
// Invoker

/// The callable behind a member.
#[derive(Clone)]
pub enum Invoker {
    /// A receiver method, bound to its declaring type.
    ToText(ToTextFn),
    /// A constructor or static method taking one text argument.
    FromText(FromTextFn),
    /// A method declared on an interface, bound per implementor through
    /// [`TypeInfoBuilder::implements`](crate::info::TypeInfoBuilder::implements).
    Unbound(Arc<dyn Any + Send + Sync>),
    /// Declared, but with no callable conversion shape.
    Opaque,
}

impl fmt::Debug for Invoker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ToText(_) => "ToText",
            Self::FromText(_) => "FromText",
            Self::Unbound(_) => "Unbound",
            Self::Opaque => "Opaque",
        })
    }
}

// -----------------------------------------------------------------------------
// Member

/// A declared method or constructor of a described type.
///
/// The builder methods on [`TypeInfoBuilder`](crate::info::TypeInfoBuilder)
/// produce members whose signature matches their invoker. [`Member::new`]
/// takes each part separately, for generated code; inconsistent members
/// are reported when a converter is discovered from them.
#[derive(Debug, Clone)]
pub struct Member {
    name: &'static str,
    kind: MemberKind,
    marker: Option<Marker>,
    signature: Signature,
    invoker: Invoker,
}

impl Member {
    /// Creates a member from its parts.
    pub fn new(
        name: &'static str,
        kind: MemberKind,
        marker: Option<Marker>,
        signature: Signature,
        invoker: Invoker,
    ) -> Self {
        Self {
            name,
            kind,
            marker,
            signature,
            invoker,
        }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn kind(&self) -> MemberKind {
        self.kind
    }

    #[inline]
    pub fn marker(&self) -> Option<Marker> {
        self.marker
    }

    /// Returns `true` if the member carries the given marker.
    #[inline]
    pub fn is_marked(&self, marker: Marker) -> bool {
        self.marker == Some(marker)
    }

    #[inline]
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    #[inline]
    pub fn invoker(&self) -> &Invoker {
        &self.invoker
    }

    /// The same declaration with another invoker.
    pub(crate) fn with_invoker(&self, invoker: Invoker) -> Self {
        Self {
            invoker,
            signature: self.signature.clone(),
            ..*self
        }
    }
}
