use alloc::sync::Arc;
use core::fmt;
use std::sync::OnceLock;

use textconv_types::info::TypeInfo;

use crate::converter::{StringConverter, TextParser};
use crate::error::ConvertError;
use crate::registry::{ConverterRegistry, RegistryConfig, Resolve};
use crate::rename::RenameRegistry;
use crate::source::ConverterSource;

/// A registry that can only be read.
///
/// Obtained from [`ConverterRegistry::freeze`], or process-wide through
/// [`SharedRegistry::global`]. Lookups still cache what they discover.
///
/// # Examples
///
/// ```
/// use textconv_convert::registry::{Resolve, SharedRegistry};
///
/// let shared = SharedRegistry::global();
/// assert_eq!(shared.to_text(&1.5_f64).unwrap(), "1.5");
/// assert!(core::ptr::eq(shared, SharedRegistry::global()));
/// ```
pub struct SharedRegistry(ConverterRegistry);

impl SharedRegistry {
    #[inline]
    pub(crate) fn new(registry: ConverterRegistry) -> Self {
        Self(registry)
    }

    /// The process-wide registry, created on first access with the
    /// default configuration and [`RenameRegistry::global`].
    pub fn global() -> &'static SharedRegistry {
        static GLOBAL: OnceLock<SharedRegistry> = OnceLock::new();
        GLOBAL.get_or_init(|| {
            let config = RegistryConfig {
                renames: Some(RenameRegistry::global().clone()),
                ..RegistryConfig::default()
            };
            ConverterRegistry::with_config(config).freeze()
        })
    }

    /// See [`ConverterRegistry::renames`].
    #[inline]
    pub fn renames(&self) -> &Arc<RenameRegistry> {
        self.0.renames()
    }

    /// See [`ConverterRegistry::sources`].
    #[inline]
    pub fn sources(&self) -> Vec<Arc<dyn ConverterSource>> {
        self.0.sources()
    }
}

impl Resolve for SharedRegistry {
    #[inline]
    fn resolve_quiet(
        &self,
        info: &'static TypeInfo,
    ) -> Result<Option<Arc<dyn StringConverter>>, ConvertError> {
        self.0.resolve_quiet(info)
    }

    #[inline]
    fn resolve_parser_quiet(
        &self,
        info: &'static TypeInfo,
    ) -> Result<Option<Arc<dyn TextParser>>, ConvertError> {
        self.0.resolve_parser_quiet(info)
    }
}

impl fmt::Debug for SharedRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SharedRegistry").field(&self.0).finish()
    }
}

// -----------------------------------------------------------------------------
// Tests
