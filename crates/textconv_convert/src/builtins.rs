//! Converters seeded into every registry built with the defaults.
//!
//! - `bool` `char` `String`
//! - every integer type, `f32` `f64`
//! - [`TypeRef`], written as a type path and parsed through renames

use alloc::sync::Arc;

use textconv_types::info::{TypeInfo, TypePath, TypeRef, Typed, Value};

use crate::converter::{FnConverter, StringConverter, TextParser};
use crate::error::ConvertError;
use crate::registry::ConverterRegistry;
use crate::rename::RenameRegistry;

pub(crate) fn seed(registry: &ConverterRegistry) {
    macro_rules! display {
        ($($ty:ty),+ $(,)?) => {
            $(
                registry.register_converter(
                    <$ty as Typed>::type_info(),
                    Arc::new(FnConverter::<$ty>::parse_display()),
                );
            )+
        };
    }

    display!(
        bool, char, u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64,
        String,
    );

    let type_ref = TypeRefConverter {
        renames: registry.renames().clone(),
    };
    registry.register_converter(TypeRef::type_info(), Arc::new(type_ref));
}

// -----------------------------------------------------------------------------
// TypeRefConverter

struct TypeRefConverter {
    renames: Arc<RenameRegistry>,
}

impl TextParser for TypeRefConverter {
    #[inline]
    fn effective_type(&self) -> &'static TypeInfo {
        TypeRef::type_info()
    }

    fn from_text(
        &self,
        _target: &'static TypeInfo,
        text: &str,
    ) -> Result<Box<dyn Value>, ConvertError> {
        let info = self.renames.lookup_type(text.trim())?;
        Ok(Box::new(TypeRef::new(info)))
    }
}

impl StringConverter for TypeRefConverter {
    fn to_text(&self, value: &dyn Value) -> Result<String, ConvertError> {
        match value.downcast_ref::<TypeRef>() {
            Some(type_ref) => Ok(type_ref.path().into()),
            None => Err(ConvertError::Mismatch {
                expected: TypeRef::type_path(),
                found: value.value_type_info().path(),
            }),
        }
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::sync::Arc;

    use textconv_types::catalog::TypeCatalog;
    use textconv_types::info::{TypeRef, Typed};

    use crate::error::{ConvertError, RenameError};
    use crate::registry::{ConverterRegistry, RegistryConfig, Resolve};
    use crate::rename::RenameRegistry;

    fn registry() -> ConverterRegistry {
        let renames = Arc::new(RenameRegistry::create(TypeCatalog::new()));
        ConverterRegistry::with_config(RegistryConfig {
            renames: Some(renames),
            ..RegistryConfig::default()
        })
    }

    #[test]
    fn leaf_types() {
        let registry = registry();
        assert_eq!(registry.to_text(&42_i32).unwrap(), "42");
        assert_eq!(registry.from_text::<i32>("42").unwrap(), 42);
        assert_eq!(registry.to_text(&true).unwrap(), "true");
        assert_eq!(registry.from_text::<char>("x").unwrap(), 'x');
        assert_eq!(registry.from_text::<f64>("2.5").unwrap(), 2.5);
        assert_eq!(registry.to_text(&String::from("as is")).unwrap(), "as is");
        assert!(matches!(
            registry.from_text::<u8>("256"),
            Err(ConvertError::Invocation { type_path: "u8", .. })
        ));
    }

    #[test]
    fn type_refs_go_through_renames() {
        let registry = registry();
        registry
            .renames()
            .register_type_rename("legacy::Counter", u64::type_info())
            .unwrap();

        assert_eq!(
            registry.to_text(&TypeRef::of::<String>()).unwrap(),
            "alloc::string::String"
        );
        assert_eq!(
            registry.from_text::<TypeRef>("legacy::Counter").unwrap(),
            TypeRef::of::<u64>()
        );
        assert!(matches!(
            registry.from_text::<TypeRef>("legacy::Missing"),
            Err(ConvertError::Rename(RenameError::TypeNotFound { .. }))
        ));
    }

    #[test]
    fn type_ref_converter_rejects_other_values() {
        let registry = registry();
        let converter = registry.resolve(TypeRef::type_info()).unwrap();
        let err = converter.to_text(&7_u8).unwrap_err();
        assert!(matches!(
            err,
            ConvertError::Mismatch {
                expected: "textconv_types::info::TypeRef",
                found: "u8",
            }
        ));
    }
}
