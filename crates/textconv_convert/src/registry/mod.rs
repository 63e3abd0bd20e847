//! Resolution of converters by type.
//!
//! A [`ConverterRegistry`] answers from its slot map first: explicit
//! registrations, seeded converters and everything discovered earlier,
//! including negative answers. On a miss it asks its sources in order.
//!
//! [`SharedRegistry`] is the process-wide instance; it can only be read.

// -----------------------------------------------------------------------------
// Modules

mod resolve;
mod shared;

// -----------------------------------------------------------------------------
// Exports

pub use resolve::Resolve;
pub use shared::SharedRegistry;

use alloc::sync::Arc;
use core::any::TypeId;
use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};

use arc_swap::ArcSwap;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use log::{debug, trace, warn};
use textconv_types::info::{BoxError, TypeInfo, Typed};
use textconv_utils::hash::TypeIdHashState;

use crate::builtins;
use crate::converter::{FnConverter, StringConverter, TextParser};
use crate::error::{ConfigError, ConvertError};
use crate::rename::RenameRegistry;
use crate::source::{ConverterSource, DeclaredSource, EnumSource};

// -----------------------------------------------------------------------------
// Slot

/// A cached answer for one type.
enum Slot<C: ?Sized> {
    Found(Arc<C>),
    Absent,
    Broken(ConfigError),
}

impl<C: ?Sized> Slot<C> {
    #[inline]
    fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    #[inline]
    fn into_result(self) -> Result<Option<Arc<C>>, ConvertError> {
        match self {
            Self::Found(conv) => Ok(Some(conv)),
            Self::Absent => Ok(None),
            Self::Broken(err) => Err(ConvertError::Config(err)),
        }
    }
}

impl<C: ?Sized> Clone for Slot<C> {
    fn clone(&self) -> Self {
        match self {
            Self::Found(conv) => Self::Found(conv.clone()),
            Self::Absent => Self::Absent,
            Self::Broken(err) => Self::Broken(err.clone()),
        }
    }
}

type SlotMap<C> = DashMap<TypeId, Slot<C>, TypeIdHashState>;

/// Caches `slot` unless another thread was first, and returns the winner.
///
/// A slot other than `Found` is only cached while `fresh` holds; `None`
/// means the sources changed during the scan and it must be repeated.
fn publish<C: ?Sized>(
    map: &SlotMap<C>,
    id: TypeId,
    slot: Slot<C>,
    fresh: impl Fn() -> bool,
) -> Option<Result<Option<Arc<C>>, ConvertError>> {
    match map.entry(id) {
        Entry::Occupied(entry) => Some(entry.get().clone().into_result()),
        Entry::Vacant(_) if !slot.is_found() && !fresh() => None,
        Entry::Vacant(entry) => Some(entry.insert(slot).clone().into_result()),
    }
}

/// Returns the cached slot for `id`, releasing the shard lock.
#[inline]
fn cached<C: ?Sized>(map: &SlotMap<C>, id: TypeId) -> Option<Slot<C>> {
    map.get(&id).map(|slot| slot.clone())
}

// -----------------------------------------------------------------------------
// RegistryConfig

/// What a new [`ConverterRegistry`] starts with.
///
/// # Examples
///
/// ```
/// use textconv_convert::registry::{ConverterRegistry, RegistryConfig, Resolve};
/// use textconv_types::info::Typed;
///
/// let registry = ConverterRegistry::with_config(RegistryConfig {
///     enum_source: false,
///     ..RegistryConfig::default()
/// });
/// assert!(registry.is_convertible(u8::type_info()));
/// assert_eq!(registry.sources().len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Seed the converters of primitive types, `String` and `TypeRef`.
    pub seed_builtins: bool,
    /// Discover converters from marked members.
    pub declared_source: bool,
    /// Convert enums by variant name.
    pub enum_source: bool,
    /// The rename registry to parse names through; the global one if `None`.
    pub renames: Option<Arc<RenameRegistry>>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            seed_builtins: true,
            declared_source: true,
            enum_source: true,
            renames: None,
        }
    }
}

// -----------------------------------------------------------------------------
// ConverterRegistry

/// A registry of converters, mutable through `&self`.
///
/// Lookups never block each other for long: the slot map is sharded,
/// and the source list is replaced as a whole on registration, so a
/// lookup never observes a partial list. Two threads resolving the same
/// type may both query the sources, but only the first result is cached
/// and both return it.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use textconv_convert::registry::{ConverterRegistry, Resolve};
/// use textconv_types::info::Typed;
///
/// let registry = ConverterRegistry::with_defaults();
/// registry.register(
///     |v: &u16| format!("{v:#x}"),
///     |s| u16::from_str_radix(s.trim_start_matches("0x"), 16),
/// );
///
/// assert_eq!(registry.to_text(&255_u16).unwrap(), "0xff");
/// let first = registry.resolve(u16::type_info()).unwrap();
/// let second = registry.resolve(u16::type_info()).unwrap();
/// assert!(Arc::ptr_eq(&first, &second));
/// ```
pub struct ConverterRegistry {
    slots: SlotMap<dyn StringConverter>,
    parsers: SlotMap<dyn TextParser>,
    sources: ArcSwap<Vec<Arc<dyn ConverterSource>>>,
    /// Bumped by every source registration.
    generation: AtomicU64,
    declared: Option<DeclaredSource>,
    renames: Arc<RenameRegistry>,
}

impl Default for ConverterRegistry {
    /// See [`ConverterRegistry::with_defaults`].
    #[inline]
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl ConverterRegistry {
    /// Creates a registry without sources or converters.
    pub fn empty() -> Self {
        Self::with_config(RegistryConfig {
            seed_builtins: false,
            declared_source: false,
            enum_source: false,
            renames: None,
        })
    }

    /// Creates a registry with the seeded converters, the declared source
    /// and the enum source.
    #[inline]
    pub fn with_defaults() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Creates a registry as described by `config`.
    ///
    /// The declared source is consulted before the enum source, so an
    /// enum with marked members converts through them.
    pub fn with_config(config: RegistryConfig) -> Self {
        let renames = config
            .renames
            .unwrap_or_else(|| RenameRegistry::global().clone());
        let registry = Self {
            slots: DashMap::with_hasher(TypeIdHashState),
            parsers: DashMap::with_hasher(TypeIdHashState),
            sources: ArcSwap::from_pointee(Vec::new()),
            generation: AtomicU64::new(0),
            declared: config.declared_source.then(DeclaredSource::new),
            renames,
        };
        if config.enum_source {
            let enums = EnumSource::new(registry.renames.clone());
            registry.register_source(Arc::new(enums));
        }
        if let Some(declared) = registry.declared {
            registry.register_source(Arc::new(declared));
        }
        if config.seed_builtins {
            builtins::seed(&registry);
        }
        registry
    }

    /// Makes this registry the read-only kind.
    #[inline]
    pub fn freeze(self) -> SharedRegistry {
        SharedRegistry::new(self)
    }

    /// The rename registry names are parsed through.
    #[inline]
    pub fn renames(&self) -> &Arc<RenameRegistry> {
        &self.renames
    }

    /// A snapshot of the sources, in query order.
    pub fn sources(&self) -> Vec<Arc<dyn ConverterSource>> {
        self.sources.load().iter().cloned().collect()
    }

    // ---- Registration

    /// Registers `converter` for the type `info`, replacing any entry.
    pub fn register_converter(&self, info: &'static TypeInfo, converter: Arc<dyn StringConverter>) {
        self.slots.insert(info.id(), Slot::Found(converter));
    }

    /// Registers a converter for `T` built from two closures.
    pub fn register<T, E>(
        &self,
        to: impl Fn(&T) -> String + Send + Sync + 'static,
        from: impl Fn(&str) -> Result<T, E> + Send + Sync + 'static,
    ) where
        T: Typed + Send + Sync,
        E: Into<BoxError>,
    {
        self.register_converter(T::type_info(), Arc::new(FnConverter::new(to, from)));
    }

    /// Registers a converter built from the members of `info` named
    /// `to_name` and `from_name`, marked or not.
    pub fn register_by_method_names(
        &self,
        info: &'static TypeInfo,
        to_name: &str,
        from_name: &str,
    ) -> Result<(), ConfigError> {
        let converter = DeclaredSource::by_method_names(info, to_name, from_name)?;
        self.register_converter(info, Arc::new(converter));
        Ok(())
    }

    /// Registers a converter built from the method `to_name` and the
    /// single text constructor of `info`.
    pub fn register_by_method_and_constructor(
        &self,
        info: &'static TypeInfo,
        to_name: &str,
    ) -> Result<(), ConfigError> {
        let converter = DeclaredSource::by_method_and_constructor(info, to_name)?;
        self.register_converter(info, Arc::new(converter));
        Ok(())
    }

    /// Adds `source` ahead of every existing source.
    ///
    /// Cached negative answers are dropped so the new source is asked;
    /// converters found earlier are kept.
    pub fn register_source(&self, source: Arc<dyn ConverterSource>) {
        debug!("registering converter source `{}`", source.name());
        self.sources.rcu(|current| {
            let mut next = Vec::with_capacity(current.len() + 1);
            next.push(source.clone());
            next.extend(current.iter().cloned());
            next
        });
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.slots.retain(|_, slot| slot.is_found());
        self.parsers.retain(|_, slot| slot.is_found());
    }

    // ---- Lookup

    fn scan(&self, info: &'static TypeInfo) -> Slot<dyn StringConverter> {
        let sources = self.sources.load_full();
        for source in sources.iter() {
            match source.find(info) {
                Ok(Some(converter)) => return Slot::Found(converter),
                Ok(None) => {}
                Err(err) => {
                    warn!("source `{}` rejected `{}`: {err}", source.name(), info.path());
                    return Slot::Broken(err);
                }
            }
        }
        Slot::Absent
    }

    fn scan_parser(&self, declared: &DeclaredSource, info: &'static TypeInfo) -> Slot<dyn TextParser> {
        match declared.find_parser(info) {
            Ok(Some(parser)) => Slot::Found(parser),
            Ok(None) => Slot::Absent,
            Err(err) => {
                warn!("no parser for `{}`: {err}", info.path());
                Slot::Broken(err)
            }
        }
    }
}

impl Resolve for ConverterRegistry {
    fn resolve_quiet(
        &self,
        info: &'static TypeInfo,
    ) -> Result<Option<Arc<dyn StringConverter>>, ConvertError> {
        let id = info.id();
        loop {
            if let Some(slot) = cached(&self.slots, id) {
                return slot.into_result();
            }
            trace!("no cached converter for `{}`", info.path());
            let generation = self.generation.load(Ordering::SeqCst);
            let slot = self.scan(info);
            let fresh = || self.generation.load(Ordering::SeqCst) == generation;
            if let Some(result) = publish(&self.slots, id, slot, fresh) {
                return result;
            }
            trace!("sources changed while resolving `{}`, retrying", info.path());
        }
    }

    fn resolve_parser_quiet(
        &self,
        info: &'static TypeInfo,
    ) -> Result<Option<Arc<dyn TextParser>>, ConvertError> {
        match self.resolve_quiet(info) {
            Ok(Some(converter)) => {
                let parser: Arc<dyn TextParser> = converter;
                return Ok(Some(parser));
            }
            Ok(None) | Err(ConvertError::Config(ConfigError::MissingToText { .. })) => {}
            Err(err) => return Err(err),
        }
        let Some(declared) = &self.declared else {
            return Ok(None);
        };
        let id = info.id();
        loop {
            if let Some(slot) = cached(&self.parsers, id) {
                return slot.into_result();
            }
            trace!("no cached parser for `{}`", info.path());
            let generation = self.generation.load(Ordering::SeqCst);
            let slot = self.scan_parser(declared, info);
            let fresh = || self.generation.load(Ordering::SeqCst) == generation;
            if let Some(result) = publish(&self.parsers, id, slot, fresh) {
                return result;
            }
            trace!("sources changed while resolving a parser for `{}`, retrying", info.path());
        }
    }
}

impl fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sources: Vec<&str> = self.sources.load().iter().map(|s| s.name()).collect();
        f.debug_struct("ConverterRegistry")
            .field("slots", &self.slots.len())
            .field("parsers", &self.parsers.len())
            .field("sources", &sources)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests
