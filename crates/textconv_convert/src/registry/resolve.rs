use alloc::sync::Arc;

use textconv_types::info::{TypeInfo, Typed, Value};

use crate::converter::{StringConverter, TextParser};
use crate::error::ConvertError;

/// Lookup and conversion through a registry.
///
/// Implementors provide the two quiet lookups; everything else is built
/// on them. `Ok(None)` from a quiet lookup means no converter exists,
/// while configuration errors are raised from every method.
///
/// # Examples
///
/// ```
/// use textconv_convert::registry::{ConverterRegistry, Resolve};
///
/// let registry = ConverterRegistry::with_defaults();
/// assert_eq!(registry.to_text(&42_i32).unwrap(), "42");
/// assert_eq!(registry.from_text::<i32>("42").unwrap(), 42);
/// assert_eq!(registry.convert_to_string(None).unwrap(), None);
/// ```
pub trait Resolve {
    /// Finds the converter for `info`, or `None` if nothing applies.
    fn resolve_quiet(
        &self,
        info: &'static TypeInfo,
    ) -> Result<Option<Arc<dyn StringConverter>>, ConvertError>;

    /// Finds a parser for `info`.
    ///
    /// Accepts types that only declare the from-text half of a contract.
    fn resolve_parser_quiet(
        &self,
        info: &'static TypeInfo,
    ) -> Result<Option<Arc<dyn TextParser>>, ConvertError>;

    /// Finds the converter for `info`.
    fn resolve(&self, info: &'static TypeInfo) -> Result<Arc<dyn StringConverter>, ConvertError> {
        self.resolve_quiet(info)?.ok_or(ConvertError::NotFound {
            type_path: info.path(),
        })
    }

    /// Finds the converter for `T`.
    #[inline]
    fn resolve_of<T: ?Sized + Typed>(&self) -> Result<Arc<dyn StringConverter>, ConvertError>
    where
        Self: Sized,
    {
        self.resolve(T::type_info())
    }

    /// Finds a parser for `info`.
    fn resolve_parser(&self, info: &'static TypeInfo) -> Result<Arc<dyn TextParser>, ConvertError> {
        self.resolve_parser_quiet(info)?.ok_or(ConvertError::NotFound {
            type_path: info.path(),
        })
    }

    /// Returns `true` if a converter exists for `info`.
    ///
    /// A type with an inconsistent contract is not convertible.
    fn is_convertible(&self, info: &'static TypeInfo) -> bool {
        matches!(self.resolve_quiet(info), Ok(Some(_)))
    }

    /// Formats `value` with the converter of its runtime type.
    fn convert_to_string(&self, value: Option<&dyn Value>) -> Result<Option<String>, ConvertError> {
        match value {
            Some(value) => self.convert_to_string_as(value.value_type_info(), Some(value)),
            None => Ok(None),
        }
    }

    /// Formats `value` with the converter of `info`.
    ///
    /// `info` may be an ancestor or an interface of the value's type.
    fn convert_to_string_as(
        &self,
        info: &'static TypeInfo,
        value: Option<&dyn Value>,
    ) -> Result<Option<String>, ConvertError> {
        let Some(value) = value else {
            return Ok(None);
        };
        self.resolve(info)?.to_text(value).map(Some)
    }

    /// Parses `text` as a value of `info`.
    fn convert_from_string(
        &self,
        info: &'static TypeInfo,
        text: Option<&str>,
    ) -> Result<Option<Box<dyn Value>>, ConvertError> {
        let Some(text) = text else {
            return Ok(None);
        };
        self.resolve_parser(info)?.from_text(info, text).map(Some)
    }

    /// Formats `value` as text.
    #[inline]
    fn to_text<T: Typed + Send + Sync>(&self, value: &T) -> Result<String, ConvertError>
    where
        Self: Sized,
    {
        self.resolve(T::type_info())?.to_text(value)
    }

    /// Parses `text` as a `T`.
    ///
    /// Fails with [`ConvertError::Mismatch`] if the parser produced a
    /// value of another type.
    fn from_text<T: Typed + Send + Sync>(&self, text: &str) -> Result<T, ConvertError>
    where
        Self: Sized,
    {
        let info = T::type_info();
        self.resolve_parser(info)?
            .from_text(info, text)?
            .take::<T>()
            .map_err(|found| ConvertError::Mismatch {
                expected: T::type_path(),
                found,
            })
    }
}
