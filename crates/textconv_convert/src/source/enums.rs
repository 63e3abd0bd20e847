use alloc::sync::Arc;
use core::fmt;

use textconv_types::info::{EnumInfo, TypeInfo, TypeKind, Value};

use crate::converter::{StringConverter, TextParser, project_to};
use crate::error::{ConfigError, ConvertError};
use crate::rename::RenameRegistry;
use crate::source::ConverterSource;

// -----------------------------------------------------------------------------
// EnumConverter

/// Writes an enum as its variant name, parsing through the rename registry.
pub struct EnumConverter {
    info: &'static TypeInfo,
    renames: Arc<RenameRegistry>,
}

impl EnumConverter {
    /// Creates a converter for the enum `info`, or `None` if it is not an enum.
    pub fn new(info: &'static TypeInfo, renames: Arc<RenameRegistry>) -> Option<Self> {
        info.as_enum()?;
        Some(Self { info, renames })
    }

    fn variants(&self) -> Option<&EnumInfo> {
        self.info.as_enum()
    }
}

impl TextParser for EnumConverter {
    #[inline]
    fn effective_type(&self) -> &'static TypeInfo {
        self.info
    }

    fn from_text(
        &self,
        _target: &'static TypeInfo,
        text: &str,
    ) -> Result<Box<dyn Value>, ConvertError> {
        Ok(self.renames.lookup_enum(self.info, text)?)
    }
}

impl StringConverter for EnumConverter {
    fn to_text(&self, value: &dyn Value) -> Result<String, ConvertError> {
        project_to(value, self.info)
            .zip(self.variants())
            .and_then(|(value, variants)| variants.name_of(value))
            .map(Into::into)
            .ok_or_else(|| ConvertError::Mismatch {
                expected: self.info.path(),
                found: value.value_type_info().path(),
            })
    }
}

impl fmt::Debug for EnumConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EnumConverter").field(&self.info.path()).finish()
    }
}

// -----------------------------------------------------------------------------
// EnumSource

/// Converts enums by variant name.
///
/// A per-variant body converts as its enum: the enum becomes the
/// effective type and parsing yields the enum.
#[derive(Debug, Clone)]
pub struct EnumSource {
    renames: Arc<RenameRegistry>,
}

impl EnumSource {
    /// Creates a source resolving old variant names through `renames`.
    #[inline]
    pub fn new(renames: Arc<RenameRegistry>) -> Self {
        Self { renames }
    }
}

impl ConverterSource for EnumSource {
    fn find(
        &self,
        info: &'static TypeInfo,
    ) -> Result<Option<Arc<dyn StringConverter>>, ConfigError> {
        let target = match info.kind() {
            TypeKind::Enum(_) => info,
            TypeKind::EnumBody => match info.parent() {
                Some(parent) if parent.info().as_enum().is_some() => parent.info(),
                _ => return Ok(None),
            },
            TypeKind::Class | TypeKind::Interface => return Ok(None),
        };
        Ok(EnumConverter::new(target, self.renames.clone())
            .map(|conv| Arc::new(conv) as Arc<dyn StringConverter>))
    }

    fn name(&self) -> &'static str {
        "EnumSource"
    }
}

// -----------------------------------------------------------------------------
// Tests
