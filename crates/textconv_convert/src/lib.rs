//! Converters between values and their textual form.
//!
//! A [`ConverterRegistry`](registry::ConverterRegistry) finds the converter
//! for a type. Explicit registrations and the seeded leaf converters come
//! first; otherwise its [sources](source) are asked in order, most recently
//! registered first. Every answer is cached, negative ones included.
//!
//! - [`converter`]: the converter traits and [`FnConverter`](converter::FnConverter).
//! - [`source`]: discovery from declared members, and enums by name.
//! - [`registry`]: resolution, caching and the process-wide instance.
//! - [`rename`]: redirects from historical type and variant names.
//! - [`serde`]: (de)serialization through the textual form.
//!
//! ```
//! use textconv_convert::registry::{ConverterRegistry, Resolve};
//! use textconv_types::impl_type_path;
//! use textconv_types::info::{TypeInfo, TypeInfoCell, Typed};
//!
//! #[derive(Debug, PartialEq)]
//! struct Distance { metres: u32 }
//!
//! impl_type_path!(in "my_app" => Distance);
//!
//! impl Typed for Distance {
//!     fn type_info() -> &'static TypeInfo {
//!         static CELL: TypeInfoCell = TypeInfoCell::new();
//!         CELL.get_or_init(|| {
//!             TypeInfo::class::<Self>()
//!                 .to_text("print", |d: &Distance| format!("{}m", d.metres))
//!                 .from_text_ctor("parse", |s: &str| {
//!                     s.trim_end_matches('m').parse().map(|metres| Distance { metres })
//!                 })
//!                 .build()
//!         })
//!     }
//! }
//!
//! let registry = ConverterRegistry::with_defaults();
//! assert_eq!(registry.to_text(&Distance { metres: 25 }).unwrap(), "25m");
//! assert_eq!(registry.from_text::<Distance>("25m").unwrap(), Distance { metres: 25 });
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod builtins;

pub mod converter;
pub mod error;
pub mod registry;
pub mod rename;
pub mod source;

#[cfg(feature = "serde")]
pub mod serde;

// -----------------------------------------------------------------------------
// Top-level exports

pub use error::{ConfigError, ConvertError, RenameError};

/// The commonly used items.
pub mod prelude {
    pub use crate::converter::{FnConverter, StringConverter, TextParser};
    pub use crate::error::{ConfigError, ConvertError, RenameError};
    pub use crate::registry::{ConverterRegistry, RegistryConfig, Resolve, SharedRegistry};
    pub use crate::rename::RenameRegistry;
    pub use crate::source::ConverterSource;
}

// -----------------------------------------------------------------------------
// Macro exports

#[doc(hidden)]
pub mod __macro_exports {
    #[cfg(feature = "auto_register")]
    pub use inventory;
}
