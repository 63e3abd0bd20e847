use alloc::sync::Arc;
use core::fmt;
use core::str::FromStr;

use textconv_types::info::{BoxError, TypeInfo, Typed, Value};

use crate::ConvertError;

// -----------------------------------------------------------------------------
// Traits

/// The from-text half of a converter.
///
/// Implementations are immutable and shared across threads.
pub trait TextParser: Send + Sync {
    /// The type whose conversion contract is in force.
    ///
    /// May be an ancestor or an interface of the queried type.
    fn effective_type(&self) -> &'static TypeInfo;

    /// Parses `text` into a value for `target`.
    fn from_text(&self, target: &'static TypeInfo, text: &str)
    -> Result<Box<dyn Value>, ConvertError>;
}

/// Bidirectional conversion between values and their textual form.
///
/// `Arc<dyn StringConverter>` coerces to `Arc<dyn TextParser>`.
pub trait StringConverter: TextParser {
    /// Formats `value` as text.
    fn to_text(&self, value: &dyn Value) -> Result<String, ConvertError>;
}

impl fmt::Debug for dyn TextParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TextParser({})", self.effective_type().path())
    }
}

impl fmt::Debug for dyn StringConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StringConverter({})", self.effective_type().path())
    }
}

/// Borrows the part of `value` that has type `target`, walking up the
/// parent chain of the value's runtime type.
pub(crate) fn project_to<'a>(value: &'a dyn Value, target: &TypeInfo) -> Option<&'a dyn Value> {
    let mut current = value;
    let mut info = value.value_type_info();
    loop {
        if info == target {
            return Some(current);
        }
        let link = info.parent()?;
        current = link.project(current)?;
        info = link.info();
    }
}

// -----------------------------------------------------------------------------
// FnConverter

type ToFn<T> = Arc<dyn Fn(&T) -> String + Send + Sync>;
type FromFn<T> = Arc<dyn Fn(&str) -> Result<T, BoxError> + Send + Sync>;

/// A converter for `T` built from two closures.
///
/// # Examples
///
/// ```
/// use textconv_convert::converter::{FnConverter, StringConverter, TextParser};
/// use textconv_types::info::Typed;
///
/// let hex = FnConverter::<u32>::new(
///     |v| format!("{v:x}"),
///     |s| u32::from_str_radix(s, 16),
/// );
///
/// assert_eq!(hex.to_text(&255_u32).unwrap(), "ff");
/// let parsed = hex.from_text(u32::type_info(), "ff").unwrap();
/// assert_eq!(parsed.take::<u32>(), Ok(255));
/// ```
pub struct FnConverter<T> {
    to: ToFn<T>,
    from: FromFn<T>,
}

impl<T: Typed + Send + Sync> FnConverter<T> {
    /// Creates a converter from a formatting and a parsing closure.
    pub fn new<E: Into<BoxError>>(
        to: impl Fn(&T) -> String + Send + Sync + 'static,
        from: impl Fn(&str) -> Result<T, E> + Send + Sync + 'static,
    ) -> Self {
        Self {
            to: Arc::new(to),
            from: Arc::new(move |text: &str| from(text).map_err(Into::into)),
        }
    }

    /// Formats through [`Display`](fmt::Display) and parses through [`FromStr`].
    pub fn parse_display() -> Self
    where
        T: FromStr + fmt::Display,
        T::Err: Into<BoxError>,
    {
        Self::new(|value: &T| value.to_string(), |text: &str| T::from_str(text))
    }
}

impl<T> Clone for FnConverter<T> {
    fn clone(&self) -> Self {
        Self {
            to: self.to.clone(),
            from: self.from.clone(),
        }
    }
}

impl<T: Typed + Send + Sync> TextParser for FnConverter<T> {
    #[inline]
    fn effective_type(&self) -> &'static TypeInfo {
        T::type_info()
    }

    fn from_text(
        &self,
        _target: &'static TypeInfo,
        text: &str,
    ) -> Result<Box<dyn Value>, ConvertError> {
        match (self.from)(text) {
            Ok(value) => Ok(Box::new(value)),
            Err(err) => Err(ConvertError::invocation(T::type_path(), err)),
        }
    }
}

impl<T: Typed + Send + Sync> StringConverter for FnConverter<T> {
    fn to_text(&self, value: &dyn Value) -> Result<String, ConvertError> {
        match project_to(value, T::type_info()).and_then(|v| v.downcast_ref::<T>()) {
            Some(value) => Ok((self.to)(value)),
            None => Err(ConvertError::Mismatch {
                expected: T::type_path(),
                found: value.value_type_info().path(),
            }),
        }
    }
}

impl<T: Typed> fmt::Debug for FnConverter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FnConverter").field(&T::type_path()).finish()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::sync::Arc;

    use textconv_types::info::Typed;

    use super::{FnConverter, StringConverter, TextParser};
    use crate::ConvertError;

    #[test]
    fn parse_display_round_trip() {
        let conv = FnConverter::<i64>::parse_display();
        assert_eq!(conv.to_text(&-17_i64).unwrap(), "-17");
        let value = conv.from_text(i64::type_info(), "-17").unwrap();
        assert_eq!(value.take::<i64>(), Ok(-17));
    }

    #[test]
    fn wrong_value_is_a_mismatch() {
        let conv = FnConverter::<i64>::parse_display();
        let err = conv.to_text(&1_u8).unwrap_err();
        assert!(matches!(
            err,
            ConvertError::Mismatch {
                expected: "i64",
                found: "u8"
            }
        ));
    }

    #[test]
    fn parse_failure_keeps_source() {
        let conv = FnConverter::<u8>::parse_display();
        let err = conv.from_text(u8::type_info(), "300").unwrap_err();
        let ConvertError::Invocation { type_path, source } = err else {
            panic!("expected an invocation failure");
        };
        assert_eq!(type_path, "u8");
        assert!(source.downcast_ref::<core::num::ParseIntError>().is_some());
    }

    #[test]
    fn upcast_to_parser() {
        let conv: Arc<dyn StringConverter> = Arc::new(FnConverter::<bool>::parse_display());
        let parser: Arc<dyn TextParser> = conv;
        assert!(parser.effective_type().is::<bool>());
    }
}
