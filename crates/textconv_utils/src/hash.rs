//! Hash states used by the registries.
//!
//! - [`FixedHashState`]: `foldhash` with a fixed seed, for string keyed indices.
//! - [`TypeIdHashState`]: pass-through hashing for [`TypeId`] keys.
//!
//! [`TypeId`]: core::any::TypeId

use core::hash::{BuildHasher, Hasher};

use foldhash::fast::{FixedState, FoldHasher};

pub use foldhash;
pub use hashbrown;

// -----------------------------------------------------------------------------
// Aliases

/// A [`hashbrown::HashMap`] using [`FixedHashState`] by default.
pub type HashMap<K, V, S = FixedHashState> = hashbrown::HashMap<K, V, S>;

/// A [`hashbrown::HashSet`] using [`FixedHashState`] by default.
pub type HashSet<T, S = FixedHashState> = hashbrown::HashSet<T, S>;

// -----------------------------------------------------------------------------
// FixedHashState

const FIXED_SEED: FixedState = FixedState::with_seed(0x2D35_8DCC_AA6C_78A5);

/// Hash state with a fixed seed, so hash results only depend on the input.
///
/// # Examples
///
/// ```
/// use core::hash::BuildHasher;
/// use textconv_utils::hash::FixedHashState;
///
/// let a = FixedHashState.hash_one("alloc::string::String");
/// let b = FixedHashState.hash_one("alloc::string::String");
/// assert_eq!(a, b);
/// ```
#[derive(Copy, Clone, Default, Debug)]
pub struct FixedHashState;

impl BuildHasher for FixedHashState {
    type Hasher = FoldHasher<'static>;

    #[inline(always)]
    fn build_hasher(&self) -> Self::Hasher {
        FIXED_SEED.build_hasher()
    }
}

// -----------------------------------------------------------------------------
// TypeIdHashState

/// Hasher for keys that already are well distributed `u64`s, such as [`TypeId`].
///
/// `write_u64` stores its input as the hash. Any other write folds the bytes
/// in, so keys hashed through other entry points still work.
///
/// [`TypeId`]: core::any::TypeId
#[derive(Copy, Clone, Default, Debug)]
pub struct TypeIdHasher {
    hash: u64,
}

impl Hasher for TypeIdHasher {
    #[inline]
    fn finish(&self) -> u64 {
        self.hash
    }

    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.hash = self.hash.rotate_left(8) ^ u64::from(byte);
        }
    }

    #[inline]
    fn write_u64(&mut self, i: u64) {
        self.hash ^= i;
    }
}

/// Builds [`TypeIdHasher`]s.
///
/// # Examples
///
/// ```
/// use core::any::TypeId;
/// use core::hash::BuildHasher;
/// use textconv_utils::hash::TypeIdHashState;
///
/// let a = TypeIdHashState.hash_one(TypeId::of::<u8>());
/// let b = TypeIdHashState.hash_one(TypeId::of::<u16>());
/// assert_ne!(a, b);
/// ```
#[derive(Copy, Clone, Default, Debug)]
pub struct TypeIdHashState;

impl BuildHasher for TypeIdHashState {
    type Hasher = TypeIdHasher;

    #[inline(always)]
    fn build_hasher(&self) -> Self::Hasher {
        TypeIdHasher { hash: 0 }
    }
}

// -----------------------------------------------------------------------------
// Tests
