//! Type descriptors for text conversion.
//!
//! A type opts into conversion by implementing [`Typed`](info::Typed): its
//! [`TypeInfo`](info::TypeInfo) lists the members that format it as text
//! or parse it back, the parent it extends and the interfaces it
//! implements. Descriptors are built once and only read afterwards.
//!
//! - [`info`]: the descriptor model and its builders.
//! - [`catalog`]: a store of descriptors searchable by type path.
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod impls;

pub mod catalog;
pub mod info;

// -----------------------------------------------------------------------------
// Macro exports

#[doc(hidden)]
pub mod __macro_exports {
    #[cfg(feature = "auto_register")]
    pub use inventory;
}
