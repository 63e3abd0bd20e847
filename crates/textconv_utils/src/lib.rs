//! Small container utilities shared by the `textconv` crates.
//!
//! - [`hash`]: hash states for `TypeId` keys and for stable string keys.
//! - [`TypeIdMap`]: a map with [`TypeId`](core::any::TypeId) as the fixed key type.
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

// -----------------------------------------------------------------------------
// No STD Support

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod typeid_map;

pub mod hash;

// -----------------------------------------------------------------------------
// Top-level exports

pub use typeid_map::TypeIdMap;
