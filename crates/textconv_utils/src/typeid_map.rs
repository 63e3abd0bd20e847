use core::any::TypeId;
use core::fmt;

use hashbrown::hash_map::Entry;

use crate::hash::{HashMap, TypeIdHashState};

// -----------------------------------------------------------------------------
// TypeIdMap

/// A map keyed by [`TypeId`].
///
/// Only the operations the registries need are exposed, so the backing
/// table can change without touching callers.
///
/// # Examples
///
/// ```
/// use core::any::TypeId;
/// use textconv_utils::TypeIdMap;
///
/// let mut map = TypeIdMap::new();
/// assert!(map.try_insert(TypeId::of::<u8>(), || "u8"));
/// assert!(!map.try_insert(TypeId::of::<u8>(), || "byte"));
/// assert_eq!(map.get_type::<u8>(), Some(&"u8"));
/// ```
pub struct TypeIdMap<V>(HashMap<TypeId, V, TypeIdHashState>);

impl<V> TypeIdMap<V> {
    /// Creates an empty map.
    #[inline]
    pub const fn new() -> Self {
        Self(HashMap::with_hasher(TypeIdHashState))
    }

    /// Creates an empty map with room for `capacity` entries.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self(HashMap::with_capacity_and_hasher(capacity, TypeIdHashState))
    }

    /// Inserts the value produced by `f` if the key is vacant.
    ///
    /// Returns `false` and leaves the map unchanged if the key exists;
    /// `f` is not called in that case.
    pub fn try_insert(&mut self, type_id: TypeId, f: impl FnOnce() -> V) -> bool {
        match self.0.entry(type_id) {
            Entry::Vacant(entry) => {
                entry.insert(f());
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    /// Inserts a value, returning the previous one.
    #[inline]
    pub fn insert(&mut self, type_id: TypeId, value: V) -> Option<V> {
        self.0.insert(type_id, value)
    }

    /// Returns the value for the key.
    #[inline]
    pub fn get(&self, type_id: &TypeId) -> Option<&V> {
        self.0.get(type_id)
    }

    /// Returns the value for the type `T`.
    #[inline(always)]
    pub fn get_type<T: ?Sized + 'static>(&self) -> Option<&V> {
        self.get(&TypeId::of::<T>())
    }

    /// Removes the key, returning its value.
    #[inline]
    pub fn remove(&mut self, type_id: &TypeId) -> Option<V> {
        self.0.remove(type_id)
    }

    /// Returns `true` if the key is present.
    #[inline]
    pub fn contains(&self, type_id: &TypeId) -> bool {
        self.0.contains_key(type_id)
    }

    /// Returns the number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the map holds no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the values in arbitrary order.
    #[inline]
    pub fn values(&self) -> impl ExactSizeIterator<Item = &V> {
        self.0.values()
    }

    /// Iterates over the keys in arbitrary order.
    #[inline]
    pub fn types(&self) -> impl ExactSizeIterator<Item = &TypeId> {
        self.0.keys()
    }
}

// -----------------------------------------------------------------------------
// Traits

impl<V> Default for TypeIdMap<V> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone> Clone for TypeIdMap<V> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<V: fmt::Debug> fmt::Debug for TypeIdMap<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.0.iter()).finish()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use core::any::TypeId;

    use super::TypeIdMap;

    #[test]
    fn insert_and_remove() {
        let mut map = TypeIdMap::with_capacity(2);
        assert!(map.is_empty());
        assert_eq!(map.insert(TypeId::of::<u32>(), 1), None);
        assert_eq!(map.insert(TypeId::of::<u32>(), 2), Some(1));
        assert!(map.contains(&TypeId::of::<u32>()));
        assert_eq!(map.len(), 1);
        assert_eq!(map.remove(&TypeId::of::<u32>()), Some(2));
        assert!(map.get_type::<u32>().is_none());
    }
}
