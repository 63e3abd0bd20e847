use crate::info::TypeInfo;

/// A type submitted for [`TypeCatalog::auto_register`](super::TypeCatalog::auto_register).
///
/// Submit it with [`auto_register!`](crate::auto_register).
pub struct AutoRegister(fn() -> &'static TypeInfo);

impl AutoRegister {
    #[doc(hidden)]
    #[inline]
    pub const fn new(info: fn() -> &'static TypeInfo) -> Self {
        Self(info)
    }

    #[inline]
    pub fn info(&self) -> &'static TypeInfo {
        (self.0)()
    }
}

inventory::collect!(AutoRegister);

/// Submits non-generic types for [`TypeCatalog::auto_register`].
///
/// ```
/// use textconv_types::{auto_register, impl_type_path};
/// use textconv_types::catalog::TypeCatalog;
/// use textconv_types::info::{TypeInfo, TypeInfoCell, Typed};
///
/// pub struct Celsius(f64);
/// impl_type_path!(in "my_app::units" => Celsius);
///
/// impl Typed for Celsius {
///     fn type_info() -> &'static TypeInfo {
///         static CELL: TypeInfoCell = TypeInfoCell::new();
///         CELL.get_or_init(|| TypeInfo::class::<Self>().build())
///     }
/// }
///
/// auto_register!(Celsius);
///
/// let mut catalog = TypeCatalog::empty();
/// assert!(catalog.auto_register());
/// assert!(catalog.get_with_type_path("my_app::units::Celsius").is_some());
/// ```
///
/// [`TypeCatalog::auto_register`]: crate::catalog::TypeCatalog::auto_register
#[macro_export]
macro_rules! auto_register {
    ($($ty:ty),+ $(,)?) => {
        $(
            $crate::__macro_exports::inventory::submit! {
                $crate::catalog::AutoRegister::new(
                    <$ty as $crate::info::Typed>::type_info
                )
            }
        )+
    };
}
