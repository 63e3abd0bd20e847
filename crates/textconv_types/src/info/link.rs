use alloc::sync::Arc;
use core::fmt;

use crate::info::{Member, TypeInfo, Value};

// -----------------------------------------------------------------------------
// Projection

/// Borrows the parent part of a child value.
///
/// Returns `None` if the value is not of the child type.
pub type Projection = Arc<dyn for<'a> Fn(&'a dyn Value) -> Option<&'a dyn Value> + Send + Sync>;

#[inline]
pub(crate) fn projection<F>(f: F) -> Projection
where
    F: for<'a> Fn(&'a dyn Value) -> Option<&'a dyn Value> + Send + Sync + 'static,
{
    Arc::new(f)
}

// -----------------------------------------------------------------------------
// ParentLink

/// The single parent of a described type.
///
/// Members declared on the parent apply to the child through the projection.
#[derive(Clone)]
pub struct ParentLink {
    info: fn() -> &'static TypeInfo,
    projection: Projection,
}

impl ParentLink {
    #[inline]
    pub(crate) fn new(info: fn() -> &'static TypeInfo, projection: Projection) -> Self {
        Self { info, projection }
    }

    /// The parent's [`TypeInfo`].
    #[inline]
    pub fn info(&self) -> &'static TypeInfo {
        (self.info)()
    }

    /// The projection from child to parent.
    #[inline]
    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// Applies the projection.
    #[inline]
    pub fn project<'a>(&self, value: &'a dyn Value) -> Option<&'a dyn Value> {
        (self.projection)(value)
    }
}

impl fmt::Debug for ParentLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ParentLink").field(&self.info().path()).finish()
    }
}

// -----------------------------------------------------------------------------
// InterfaceLink

/// An interface implemented directly by a described type.
///
/// Holds the interface's receiver methods bound to the implementing type.
/// Static members stay on the interface's own [`TypeInfo`].
#[derive(Clone)]
pub struct InterfaceLink {
    info: fn() -> &'static TypeInfo,
    bound: Vec<Member>,
}

impl InterfaceLink {
    #[inline]
    pub(crate) fn new(info: fn() -> &'static TypeInfo, bound: Vec<Member>) -> Self {
        Self { info, bound }
    }

    /// The interface's [`TypeInfo`].
    #[inline]
    pub fn info(&self) -> &'static TypeInfo {
        (self.info)()
    }

    /// Receiver methods of the interface, callable with the implementor.
    #[inline]
    pub fn bound_members(&self) -> &[Member] {
        &self.bound
    }
}

impl fmt::Debug for InterfaceLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterfaceLink")
            .field("info", &self.info().path())
            .field("bound", &self.bound)
            .finish()
    }
}
