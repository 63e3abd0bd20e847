#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub use textconv_convert as convert;
pub use textconv_types as types;
pub use textconv_utils as utils;

/// The commonly used items of every `textconv` crate.
pub mod prelude {
    pub use textconv_convert::prelude::*;
    pub use textconv_types::impl_type_path;
    pub use textconv_types::info::{TextEnum, TypeInfo, TypeInfoCell, TypeRef, Typed, Value};
}
