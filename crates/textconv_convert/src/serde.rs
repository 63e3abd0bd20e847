//! Serde support: values (de)serialized as their textual form.
//!
//! Conversion goes through [`SharedRegistry::global`]. Use [`as_text`]
//! on a field, or wrap a value in [`TextValue`].
//!
//! ```
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Settings {
//!     #[serde(with = "textconv_convert::serde::as_text")]
//!     retries: u8,
//! }
//!
//! let json = serde_json::to_string(&Settings { retries: 3 }).unwrap();
//! assert_eq!(json, r#"{"retries":"3"}"#);
//! assert_eq!(serde_json::from_str::<Settings>(&json).unwrap(), Settings { retries: 3 });
//! ```

use core::fmt;
use core::marker::PhantomData;

use serde_core::de::{self, Visitor};
use serde_core::{Deserialize, Deserializer, Serialize, Serializer, ser};
use textconv_types::info::Typed;

use crate::registry::{Resolve, SharedRegistry};

// -----------------------------------------------------------------------------
// as_text

/// For `#[serde(with = "textconv_convert::serde::as_text")]`.
pub mod as_text {
    use serde_core::ser::Error as _;
    use serde_core::{Deserializer, Serializer};
    use textconv_types::info::Typed;

    use super::TextVisitor;
    use crate::registry::{Resolve, SharedRegistry};

    /// Serializes `value` as a string.
    pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Typed + Send + Sync,
        S: Serializer,
    {
        let text = SharedRegistry::global()
            .to_text(value)
            .map_err(S::Error::custom)?;
        serializer.serialize_str(&text)
    }

    /// Deserializes a `T` from a string.
    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: Typed + Send + Sync,
        D: Deserializer<'de>,
    {
        deserializer.deserialize_str(TextVisitor(core::marker::PhantomData))
    }
}

struct TextVisitor<T>(PhantomData<fn() -> T>);

impl<'de, T: Typed + Send + Sync> Visitor<'de> for TextVisitor<T> {
    type Value = T;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("the textual form of ")?;
        formatter.write_str(T::type_path())
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        SharedRegistry::global()
            .from_text::<T>(v)
            .map_err(E::custom)
    }
}

// -----------------------------------------------------------------------------
// TextValue

/// Serializes the wrapped value as its textual form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextValue<T>(pub T);

impl<T: Typed + Send + Sync> Serialize for TextValue<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let text = SharedRegistry::global()
            .to_text(&self.0)
            .map_err(<S::Error as ser::Error>::custom)?;
        serializer.serialize_str(&text)
    }
}

impl<'de, T: Typed + Send + Sync> Deserialize<'de> for TextValue<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        as_text::deserialize(deserializer).map(TextValue)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};
    use textconv_types::info::{TypeInfo, TypeInfoCell, Typed};

    use super::TextValue;

    #[derive(Debug, PartialEq)]
    struct Speed {
        knots: u16,
    }
    textconv_types::impl_type_path!(in "fixtures" => Speed);

    impl Typed for Speed {
        fn type_info() -> &'static TypeInfo {
            static CELL: TypeInfoCell = TypeInfoCell::new();
            CELL.get_or_init(|| {
                TypeInfo::class::<Speed>()
                    .to_text("print", |s: &Speed| format!("{}kn", s.knots))
                    .from_text("parse", |s: &str| {
                        s.trim_end_matches("kn").parse().map(|knots| Speed { knots })
                    })
                    .build()
            })
        }
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Leg {
        #[serde(with = "crate::serde::as_text")]
        speed: Speed,
        heading: TextValue<i32>,
    }

    #[test]
    fn json_fields() {
        let leg = Leg {
            speed: Speed { knots: 12 },
            heading: TextValue(270),
        };
        let json = serde_json::to_string(&leg).unwrap();
        assert_eq!(json, r#"{"speed":"12kn","heading":"270"}"#);
        assert_eq!(serde_json::from_str::<Leg>(&json).unwrap(), leg);
    }

    #[test]
    fn ron_fields() {
        let leg: Leg = ron::from_str(r#"(speed: "7kn", heading: "-90")"#).unwrap();
        assert_eq!(leg.speed, Speed { knots: 7 });
        assert_eq!(leg.heading, TextValue(-90));
        let text = ron::to_string(&leg).unwrap();
        assert!(text.contains(r#""7kn""#));
        assert_eq!(ron::from_str::<Leg>(&text).unwrap(), leg);
    }

    #[test]
    fn parse_failure_is_a_data_error() {
        let err = serde_json::from_str::<Leg>(r#"{"speed":"fast","heading":"0"}"#).unwrap_err();
        assert!(err.is_data());
        assert!(err.to_string().contains("fixtures::Speed"));
    }
}
