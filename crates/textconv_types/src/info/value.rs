use core::any::{Any, TypeId};
use core::fmt;

use crate::info::{TypeInfo, Typed};

// -----------------------------------------------------------------------------
// Value

/// A value that can cross the type-erased conversion boundary.
///
/// Implemented for every `Typed + Send + Sync` type. Use `&dyn Value` where
/// the runtime type decides the converter, and the inherent methods on
/// `dyn Value` to get the concrete type back.
///
/// # Examples
///
/// ```
/// use textconv_types::info::Value;
///
/// let value: Box<dyn Value> = Box::new(42_i32);
/// assert_eq!(value.value_type_info().path(), "i32");
/// assert_eq!(value.downcast_ref::<i32>(), Some(&42));
/// assert_eq!(value.take::<i32>(), Ok(42));
/// ```
pub trait Value: Any + Send + Sync + 'static {
    /// Returns the [`TypeInfo`] of the underlying type.
    fn value_type_info(&self) -> &'static TypeInfo;

    /// Casts to `&dyn Any`.
    fn as_any(&self) -> &dyn Any;

    /// Casts to `Box<dyn Any>`.
    fn into_any(self: Box<Self>) -> Box<dyn Any + Send + Sync>;
}

impl<T: Typed + Send + Sync> Value for T {
    #[inline]
    fn value_type_info(&self) -> &'static TypeInfo {
        T::type_info()
    }

    #[inline]
    fn as_any(&self) -> &dyn Any {
        self
    }

    #[inline]
    fn into_any(self: Box<Self>) -> Box<dyn Any + Send + Sync> {
        self
    }
}

impl dyn Value {
    /// Returns `true` if the underlying type is `T`.
    #[inline]
    pub fn is<T: Any>(&self) -> bool {
        self.as_any().type_id() == TypeId::of::<T>()
    }

    /// Returns a reference to the value if it is of type `T`.
    #[inline]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Takes the value out if it is of type `T`.
    ///
    /// On failure, returns the type path of the actual value.
    pub fn take<T: Any>(self: Box<Self>) -> Result<T, &'static str> {
        let found = self.value_type_info().path();
        match self.into_any().downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(_) => Err(found),
        }
    }
}

impl fmt::Debug for dyn Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Value({})", self.value_type_info().path())
    }
}

// -----------------------------------------------------------------------------
// TextEnum

/// A fieldless enum whose variants are written by name.
///
/// # Examples
///
/// ```
/// use textconv_types::impl_type_path;
/// use textconv_types::info::{TextEnum, TypeInfo, TypeInfoCell, Typed};
///
/// #[derive(Clone, Copy, Debug, PartialEq)]
/// enum Unit { Metre, Foot }
///
/// impl_type_path!(in "my_app::units" => Unit);
///
/// impl TextEnum for Unit {
///     fn variants() -> &'static [Self] { &[Unit::Metre, Unit::Foot] }
///     fn variant_name(&self) -> &'static str {
///         match self { Unit::Metre => "Metre", Unit::Foot => "Foot" }
///     }
/// }
///
/// impl Typed for Unit {
///     fn type_info() -> &'static TypeInfo {
///         static CELL: TypeInfoCell = TypeInfoCell::new();
///         CELL.get_or_init(|| TypeInfo::enumeration::<Self>().build())
///     }
/// }
///
/// let info = Unit::type_info().as_enum().unwrap();
/// assert_eq!(info.names(), &["Metre", "Foot"]);
/// ```
pub trait TextEnum: Typed + Clone + Send + Sync {
    /// All variants, in declaration order.
    fn variants() -> &'static [Self];

    /// The written name of this variant.
    fn variant_name(&self) -> &'static str;
}
