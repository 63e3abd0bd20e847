use core::{error, fmt};
use std::path::PathBuf;

use textconv_types::info::{BoxError, InvokeError, Marker};

// -----------------------------------------------------------------------------
// ConfigError

/// A type declares its conversion contract inconsistently.
///
/// These are bugs in the declaring code, not missing support. They are
/// raised even from quiet lookups, and cached so every later lookup of
/// the same type fails the same way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Two members marked to-text at one level of the hierarchy, or
    /// across the immediate interfaces.
    AmbiguousToText {
        type_path: &'static str,
        first: &'static str,
        second: &'static str,
    },
    /// More than one matching from-text member in one scope.
    AmbiguousFromText {
        type_path: &'static str,
        first: &'static str,
        second: &'static str,
    },
    /// A marked member with a shape that cannot format text.
    InvalidToText {
        type_path: &'static str,
        member: &'static str,
        reason: &'static str,
    },
    /// A marked member with a shape that cannot parse text.
    InvalidFromText {
        type_path: &'static str,
        member: &'static str,
        reason: &'static str,
    },
    /// Both a marked constructor and a marked static method or factory.
    ConstructorAndMethod { type_path: &'static str },
    /// A factory reference next to an own marked static method.
    FactoryAndMethod { type_path: &'static str },
    /// A factory with more than one compatible from-text member.
    AmbiguousFactory {
        type_path: &'static str,
        factory: &'static str,
    },
    /// A factory with no compatible from-text member.
    EmptyFactory {
        type_path: &'static str,
        factory: &'static str,
    },
    /// A to-text contract without a from-text one.
    MissingFromText { type_path: &'static str },
    /// A from-text contract without a to-text one.
    MissingToText { type_path: &'static str },
    /// No member with the requested name and shape.
    MemberNotFound {
        type_path: &'static str,
        name: String,
        marker: Marker,
    },
}

impl ConfigError {
    /// The path of the type whose declaration is inconsistent.
    pub fn type_path(&self) -> &'static str {
        match self {
            Self::AmbiguousToText { type_path, .. }
            | Self::AmbiguousFromText { type_path, .. }
            | Self::InvalidToText { type_path, .. }
            | Self::InvalidFromText { type_path, .. }
            | Self::ConstructorAndMethod { type_path }
            | Self::FactoryAndMethod { type_path }
            | Self::AmbiguousFactory { type_path, .. }
            | Self::EmptyFactory { type_path, .. }
            | Self::MissingFromText { type_path }
            | Self::MissingToText { type_path }
            | Self::MemberNotFound { type_path, .. } => type_path,
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AmbiguousToText {
                type_path,
                first,
                second,
            } => write!(
                f,
                "`{type_path}` has two to-text members, `{first}` and `{second}`"
            ),
            Self::AmbiguousFromText {
                type_path,
                first,
                second,
            } => write!(
                f,
                "`{type_path}` has two from-text members, `{first}` and `{second}`"
            ),
            Self::InvalidToText {
                type_path,
                member,
                reason,
            } => write!(f, "to-text member `{type_path}::{member}` {reason}"),
            Self::InvalidFromText {
                type_path,
                member,
                reason,
            } => write!(f, "from-text member `{type_path}::{member}` {reason}"),
            Self::ConstructorAndMethod { type_path } => write!(
                f,
                "`{type_path}` marks both a from-text constructor and a from-text method"
            ),
            Self::FactoryAndMethod { type_path } => write!(
                f,
                "`{type_path}` names a from-text factory and declares its own from-text method"
            ),
            Self::AmbiguousFactory { type_path, factory } => write!(
                f,
                "factory `{factory}` has more than one from-text member for `{type_path}`"
            ),
            Self::EmptyFactory { type_path, factory } => write!(
                f,
                "factory `{factory}` has no from-text member for `{type_path}`"
            ),
            Self::MissingFromText { type_path } => {
                write!(f, "`{type_path}` declares to-text but no from-text")
            }
            Self::MissingToText { type_path } => {
                write!(f, "`{type_path}` declares from-text but no to-text")
            }
            Self::MemberNotFound {
                type_path,
                name,
                marker,
            } => write!(f, "`{type_path}` has no {marker} member named `{name}`"),
        }
    }
}

impl error::Error for ConfigError {}

// -----------------------------------------------------------------------------
// RenameError

/// Failure of the rename registry.
#[derive(Debug)]
pub enum RenameError {
    /// The registry was locked.
    Locked,
    /// The old name lies in a reserved namespace.
    Reserved { name: String },
    /// An empty old or new name.
    EmptyName,
    /// Neither a rename nor the catalog knows the name.
    TypeNotFound { name: String },
    /// The enum has no variant of that name, old or current.
    NoSuchVariant {
        enum_path: &'static str,
        name: String,
    },
    /// A rename configuration line could not be applied.
    Malformed {
        origin: String,
        line: usize,
        reason: String,
    },
    /// A rename configuration could not be read.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl fmt::Display for RenameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Locked => f.write_str("the rename registry is locked"),
            Self::Reserved { name } => {
                write!(f, "`{name}` is in a reserved namespace and cannot be renamed")
            }
            Self::EmptyName => f.write_str("rename names must not be empty"),
            Self::TypeNotFound { name } => write!(f, "no type found for `{name}`"),
            Self::NoSuchVariant { enum_path, name } => {
                write!(f, "`{enum_path}` has no variant `{name}`")
            }
            Self::Malformed {
                origin,
                line,
                reason,
            } => write!(f, "{origin}:{line}: {reason}"),
            Self::Io { path, source } => {
                write!(f, "cannot read rename configuration `{}`: {source}", path.display())
            }
        }
    }
}

impl error::Error for RenameError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

// -----------------------------------------------------------------------------
// ConvertError

/// Failure of a lookup or a conversion.
#[derive(Debug)]
pub enum ConvertError {
    /// No converter exists for the type.
    NotFound { type_path: &'static str },
    /// The type declares its contract inconsistently.
    Config(ConfigError),
    /// User conversion code failed; `source` is its error.
    Invocation {
        type_path: &'static str,
        source: BoxError,
    },
    /// A value of the wrong type reached a converter.
    Mismatch {
        expected: &'static str,
        found: &'static str,
    },
    /// A name could not be resolved through the rename registry.
    Rename(RenameError),
}

impl ConvertError {
    /// Wraps an error returned by user code for `type_path`.
    ///
    /// An error that already is an invocation failure is passed on as is.
    pub fn invocation(type_path: &'static str, source: BoxError) -> Self {
        match source.downcast::<ConvertError>() {
            Ok(inner) => match *inner {
                inner @ Self::Invocation { .. } => inner,
                other => Self::Invocation {
                    type_path,
                    source: Box::new(other),
                },
            },
            Err(source) => Self::Invocation { type_path, source },
        }
    }

    pub(crate) fn from_invoke(type_path: &'static str, err: InvokeError) -> Self {
        match err {
            InvokeError::Mismatch { expected, found } => Self::Mismatch { expected, found },
            InvokeError::Failed(source) => Self::invocation(type_path, source),
        }
    }

    /// Returns `true` for [`ConvertError::NotFound`].
    #[inline]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { type_path } => write!(f, "no converter found for `{type_path}`"),
            Self::Config(err) => write!(f, "invalid conversion contract: {err}"),
            Self::Invocation { type_path, source } => {
                write!(f, "conversion of `{type_path}` failed: {source}")
            }
            Self::Mismatch { expected, found } => {
                write!(f, "expected a value of `{expected}`, found `{found}`")
            }
            Self::Rename(err) => fmt::Display::fmt(err, f),
        }
    }
}

impl error::Error for ConvertError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Invocation { source, .. } => Some(&**source),
            Self::Rename(err) => Some(err),
            Self::NotFound { .. } | Self::Mismatch { .. } => None,
        }
    }
}

impl From<ConfigError> for ConvertError {
    #[inline]
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<RenameError> for ConvertError {
    #[inline]
    fn from(value: RenameError) -> Self {
        Self::Rename(value)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use core::error::Error;

    use super::{ConfigError, ConvertError};

    #[derive(Debug)]
    struct Boom;

    impl core::fmt::Display for Boom {
        fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
            f.write_str("boom")
        }
    }

    impl Error for Boom {}

    #[test]
    fn invocation_source_is_user_error() {
        let err = ConvertError::invocation("fixtures::Thing", Box::new(Boom));
        let source = err.source().unwrap();
        assert!(source.downcast_ref::<Boom>().is_some());
        assert_eq!(err.to_string(), "conversion of `fixtures::Thing` failed: boom");
    }

    #[test]
    fn invocation_is_not_nested() {
        let inner = ConvertError::invocation("fixtures::Inner", Box::new(Boom));
        let outer = ConvertError::invocation("fixtures::Outer", Box::new(inner));
        let ConvertError::Invocation { type_path, source } = outer else {
            panic!("expected an invocation failure");
        };
        assert_eq!(type_path, "fixtures::Inner");
        assert!(source.downcast_ref::<Boom>().is_some());
    }

    #[test]
    fn config_display() {
        let err = ConfigError::AmbiguousToText {
            type_path: "fixtures::Thing",
            first: "a",
            second: "b",
        };
        assert_eq!(err.type_path(), "fixtures::Thing");
        assert_eq!(
            err.to_string(),
            "`fixtures::Thing` has two to-text members, `a` and `b`"
        );
    }
}
