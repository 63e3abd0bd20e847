//! Providers queried for types without an explicit converter.
//!
//! - [`DeclaredSource`]: builds converters from a type's marked members.
//! - [`EnumSource`]: writes enums by variant name.
//!
//! Sources are queried in order; the first that answers wins.

// -----------------------------------------------------------------------------
// Modules

mod declared;
mod enums;

// -----------------------------------------------------------------------------
// Exports

pub use declared::{DeclaredConverter, DeclaredParser, DeclaredSource};
pub use enums::{EnumConverter, EnumSource};

use alloc::sync::Arc;

use textconv_types::info::TypeInfo;

use crate::converter::StringConverter;
use crate::error::ConfigError;

// -----------------------------------------------------------------------------
// ConverterSource

/// A provider of converters, queried when a type has no cached entry.
///
/// `Ok(None)` means the source does not apply to the type. `Err` is
/// reserved for types that declare their contract inconsistently.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use textconv_convert::converter::{FnConverter, StringConverter};
/// use textconv_convert::error::ConfigError;
/// use textconv_convert::registry::{ConverterRegistry, Resolve};
/// use textconv_convert::source::ConverterSource;
/// use textconv_types::info::{TypeInfo, Typed};
///
/// struct Hex;
///
/// impl ConverterSource for Hex {
///     fn find(&self, info: &'static TypeInfo)
///         -> Result<Option<Arc<dyn StringConverter>>, ConfigError>
///     {
///         if !info.is::<u32>() {
///             return Ok(None);
///         }
///         let conv = FnConverter::<u32>::new(
///             |v| format!("{v:x}"),
///             |s| u32::from_str_radix(s, 16),
///         );
///         Ok(Some(Arc::new(conv)))
///     }
/// }
///
/// let registry = ConverterRegistry::empty();
/// registry.register_source(Arc::new(Hex));
/// assert_eq!(registry.to_text(&255_u32).unwrap(), "ff");
/// ```
pub trait ConverterSource: Send + Sync {
    /// Returns a converter for `info`, if this source applies.
    fn find(
        &self,
        info: &'static TypeInfo,
    ) -> Result<Option<Arc<dyn StringConverter>>, ConfigError>;

    /// A name for diagnostics.
    fn name(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
