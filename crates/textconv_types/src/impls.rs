//! [`TypePath`] and [`Typed`] for the types with built-in converters.
//!
//! Their descriptors carry no members; the registry seeds their converters.

use crate::info::{TypeInfo, TypeInfoCell, TypePath, TypeRef, Typed};

macro_rules! impl_native {
    ($($ty:ident),+ $(,)?) => {
        $(
            impl TypePath for $ty {
                #[inline]
                fn type_path() -> &'static str {
                    ::core::stringify!($ty)
                }
                #[inline]
                fn type_name() -> &'static str {
                    ::core::stringify!($ty)
                }
                #[inline]
                fn type_ident() -> &'static str {
                    ::core::stringify!($ty)
                }
            }

            impl Typed for $ty {
                fn type_info() -> &'static TypeInfo {
                    static CELL: TypeInfoCell = TypeInfoCell::new();
                    CELL.get_or_init(|| TypeInfo::class::<Self>().build())
                }
            }
        )+
    };
}

impl_native!(
    bool, char, u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64,
);

impl TypePath for String {
    #[inline]
    fn type_path() -> &'static str {
        "alloc::string::String"
    }
    #[inline]
    fn type_name() -> &'static str {
        "String"
    }
    #[inline]
    fn type_ident() -> &'static str {
        "String"
    }
    #[inline]
    fn module_path() -> Option<&'static str> {
        Some("alloc::string")
    }
}

impl Typed for String {
    fn type_info() -> &'static TypeInfo {
        static CELL: TypeInfoCell = TypeInfoCell::new();
        CELL.get_or_init(|| TypeInfo::class::<Self>().build())
    }
}

crate::impl_type_path!(in "textconv_types::info" => TypeRef);

impl Typed for TypeRef {
    fn type_info() -> &'static TypeInfo {
        static CELL: TypeInfoCell = TypeInfoCell::new();
        CELL.get_or_init(|| TypeInfo::class::<Self>().build())
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use crate::info::{TypePath, TypeRef, Typed};

    #[test]
    fn native_paths() {
        assert_eq!(u64::type_path(), "u64");
        assert_eq!(u64::module_path(), None);
        assert_eq!(String::type_path(), "alloc::string::String");
        assert_eq!(TypeRef::type_path(), "textconv_types::info::TypeRef");
        assert!(f32::type_info().is::<f32>());
    }
}
