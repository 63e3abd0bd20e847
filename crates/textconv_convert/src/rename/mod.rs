//! Redirects historical type and enum variant names to current identities.
//!
//! Textual data outlives the code that wrote it. When a type or an enum
//! variant is renamed, register the old name here and values written
//! under it keep resolving.
//!
//! Renames are registered by hand, loaded from configuration text (see
//! [`RenameRegistry::load_str`]), or bundled into the binary with
//! [`bundle_renames!`](crate::bundle_renames) and loaded by
//! [`RenameRegistry::create_with`].

mod config;

use alloc::sync::Arc;
use core::any::TypeId;
use std::path::Path;
use std::sync::OnceLock;

use dashmap::DashMap;
use log::{debug, error};
use parking_lot::RwLock;
use textconv_types::catalog::TypeCatalog;
use textconv_types::info::{TextEnum, TypeInfo, Value};
use textconv_utils::hash::FixedHashState;

use crate::error::RenameError;
use config::Line;

/// Old names starting with one of these are rejected.
pub const RESERVED_PREFIXES: &[&str] = &["textconv::", "textconv_", "core::", "alloc::", "std::"];

// -----------------------------------------------------------------------------
// RenameConfig

/// A rename configuration compiled into the binary.
///
/// Submit one with [`bundle_renames!`](crate::bundle_renames).
#[derive(Debug, Clone, Copy)]
pub struct RenameConfig {
    /// Orders loading; configurations load sorted by name.
    pub name: &'static str,
    /// The configuration text.
    pub contents: &'static str,
}

#[cfg(feature = "auto_register")]
inventory::collect!(RenameConfig);

/// Bundles a rename configuration, loaded by
/// [`RenameRegistry::create_with`] when bundled loading is requested.
///
/// ```
/// textconv_convert::bundle_renames!("my_app", "[types]\nmy_app::Old = my_app::New\n");
/// # fn main() {}
/// ```
#[cfg(feature = "auto_register")]
#[macro_export]
macro_rules! bundle_renames {
    ($name:expr, $contents:expr $(,)?) => {
        $crate::__macro_exports::inventory::submit! {
            $crate::rename::RenameConfig {
                name: $name,
                contents: $contents,
            }
        }
    };
}

// -----------------------------------------------------------------------------
// LoadReport

/// Outcome of loading rename configuration.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    /// Entries registered.
    pub applied: usize,
    /// Malformed or unresolvable entries, logged and skipped.
    pub skipped: usize,
}

impl LoadReport {
    fn merge(&mut self, other: LoadReport) {
        self.applied += other.applied;
        self.skipped += other.skipped;
    }
}

// -----------------------------------------------------------------------------
// RenameRegistry

/// Old type paths and old enum variant names, mapped to what they are now.
///
/// Mutable through `&self` until [`lock`](Self::lock) is called; from then
/// on every mutation fails with [`RenameError::Locked`].
///
/// # Examples
///
/// ```
/// use textconv_convert::rename::RenameRegistry;
/// use textconv_types::catalog::TypeCatalog;
/// use textconv_types::info::Typed;
///
/// let renames = RenameRegistry::create(TypeCatalog::new());
/// renames.register_type_rename("my_app::Count", u64::type_info()).unwrap();
///
/// assert!(renames.lookup_type("my_app::Count").unwrap().is::<u64>());
/// assert!(renames.lookup_type("u64").unwrap().is::<u64>());
///
/// renames.lock();
/// assert!(renames.register_type_rename("my_app::Total", u64::type_info()).is_err());
/// ```
pub struct RenameRegistry {
    catalog: TypeCatalog,
    types: DashMap<String, &'static TypeInfo, FixedHashState>,
    enums: DashMap<(TypeId, String), &'static str, FixedHashState>,
    // `true` once locked. Mutations hold the read side for their whole
    // check-and-insert, `lock` takes the write side.
    gate: RwLock<bool>,
}

impl RenameRegistry {
    /// Creates an empty registry resolving current names through `catalog`.
    pub fn create(catalog: TypeCatalog) -> Self {
        Self {
            catalog,
            types: DashMap::with_hasher(FixedHashState),
            enums: DashMap::with_hasher(FixedHashState),
            gate: RwLock::new(false),
        }
    }

    /// Creates a registry, loading every bundled configuration if
    /// `load_bundled` is set.
    pub fn create_with(catalog: TypeCatalog, load_bundled: bool) -> Self {
        let registry = Self::create(catalog);
        if load_bundled {
            let report = registry.load_bundled();
            debug!(
                "loaded bundled renames: {} applied, {} skipped",
                report.applied, report.skipped
            );
        }
        registry
    }

    /// The process-wide registry used by the shared converter registry.
    ///
    /// Its catalog holds every auto-registered type; bundled
    /// configurations are loaded on first access.
    pub fn global() -> &'static Arc<RenameRegistry> {
        static GLOBAL: OnceLock<Arc<RenameRegistry>> = OnceLock::new();
        GLOBAL.get_or_init(|| {
            let mut catalog = TypeCatalog::new();
            catalog.auto_register();
            Arc::new(Self::create_with(catalog, true))
        })
    }

    /// The catalog consulted for current type paths.
    #[inline]
    pub fn catalog(&self) -> &TypeCatalog {
        &self.catalog
    }

    fn load_bundled(&self) -> LoadReport {
        #[cfg(feature = "auto_register")]
        {
            let mut configs: Vec<&RenameConfig> = inventory::iter::<RenameConfig>.into_iter().collect();
            configs.sort_by_key(|config| config.name);
            let mut report = LoadReport::default();
            for config in configs {
                report.merge(self.load_str(config.name, config.contents));
            }
            report
        }
        #[cfg(not(feature = "auto_register"))]
        {
            LoadReport::default()
        }
    }

    // ---- Mutation

    /// Runs `f` unless the registry is locked; `lock` waits for it.
    fn mutate<R>(&self, f: impl FnOnce() -> Result<R, RenameError>) -> Result<R, RenameError> {
        let locked = self.gate.read();
        if *locked {
            return Err(RenameError::Locked);
        }
        f()
    }

    /// Redirects the type path `old` to `current`.
    pub fn register_type_rename(
        &self,
        old: &str,
        current: &'static TypeInfo,
    ) -> Result<(), RenameError> {
        if old.is_empty() {
            return Err(RenameError::EmptyName);
        }
        if RESERVED_PREFIXES.iter().any(|prefix| old.starts_with(prefix)) {
            return Err(RenameError::Reserved { name: old.into() });
        }
        self.mutate(|| {
            self.types.insert(old.into(), current);
            Ok(())
        })
    }

    /// Redirects the variant name `old` of `E` to `current`.
    #[inline]
    pub fn register_enum_rename<E: TextEnum>(&self, old: &str, current: &E) -> Result<(), RenameError> {
        self.register_enum_rename_in(E::type_info(), old, current.variant_name())
    }

    /// Redirects the variant name `old` of the enum `info` to the variant
    /// named `current`, which must exist.
    pub fn register_enum_rename_in(
        &self,
        info: &'static TypeInfo,
        old: &str,
        current: &str,
    ) -> Result<(), RenameError> {
        if old.is_empty() || current.is_empty() {
            return Err(RenameError::EmptyName);
        }
        let variant = info
            .as_enum()
            .and_then(|variants| variants.find(current))
            .ok_or_else(|| RenameError::NoSuchVariant {
                enum_path: info.path(),
                name: current.into(),
            })?;
        self.mutate(|| {
            self.enums.insert((info.id(), old.into()), variant);
            Ok(())
        })
    }

    /// Forbids every further mutation. Cannot be undone.
    pub fn lock(&self) {
        let mut locked = self.gate.write();
        if !*locked {
            *locked = true;
            debug!("rename registry locked");
        }
    }

    /// Returns `true` once [`lock`](Self::lock) was called.
    #[inline]
    pub fn is_locked(&self) -> bool {
        *self.gate.read()
    }

    // ---- Lookup

    /// Resolves a type path, through renames first and then the catalog.
    pub fn lookup_type(&self, name: &str) -> Result<&'static TypeInfo, RenameError> {
        if let Some(info) = self.types.get(name) {
            return Ok(*info);
        }
        self.catalog
            .get_with_type_path(name)
            .ok_or_else(|| RenameError::TypeNotFound { name: name.into() })
    }

    /// Resolves a variant name of the enum `info`, through renames first
    /// and then the variant names themselves.
    pub fn lookup_enum(
        &self,
        info: &'static TypeInfo,
        name: &str,
    ) -> Result<Box<dyn Value>, RenameError> {
        let no_such_variant = || RenameError::NoSuchVariant {
            enum_path: info.path(),
            name: name.into(),
        };
        let variants = info.as_enum().ok_or_else(no_such_variant)?;
        let renamed = self
            .enums
            .get(&(info.id(), name.to_owned()))
            .map(|variant| *variant);
        variants
            .make(renamed.unwrap_or(name))
            .ok_or_else(no_such_variant)
    }

    /// Typed form of [`lookup_enum`](Self::lookup_enum).
    pub fn lookup_enum_of<E: TextEnum>(&self, name: &str) -> Result<E, RenameError> {
        self.lookup_enum(E::type_info(), name)?
            .take::<E>()
            .map_err(|_| RenameError::NoSuchVariant {
                enum_path: E::type_path(),
                name: name.into(),
            })
    }

    /// A snapshot of the type renames.
    pub fn type_renames(&self) -> Vec<(String, &'static TypeInfo)> {
        self.types
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect()
    }

    /// A snapshot of the variant renames of the enum `info`.
    pub fn enum_renames(&self, info: &TypeInfo) -> Vec<(String, &'static str)> {
        let id = info.id();
        self.enums
            .iter()
            .filter(|entry| entry.key().0 == id)
            .map(|entry| (entry.key().1.clone(), *entry.value()))
            .collect()
    }

    // ---- Loading

    /// Loads rename configuration text; `origin` names it in diagnostics.
    ///
    /// Malformed or unresolvable entries are logged and skipped.
    ///
    /// # Examples
    ///
    /// ```
    /// use textconv_convert::rename::RenameRegistry;
    /// use textconv_types::catalog::TypeCatalog;
    /// use textconv_types::info::Typed;
    ///
    /// let renames = RenameRegistry::create(TypeCatalog::new());
    /// let report = renames.load_str("inline", "[types]\nmy_app::Flag = bool\nbroken line\n");
    ///
    /// assert_eq!((report.applied, report.skipped), (1, 1));
    /// assert!(renames.lookup_type("my_app::Flag").unwrap().is::<bool>());
    /// ```
    pub fn load_str(&self, origin: &str, text: &str) -> LoadReport {
        let mut report = LoadReport::default();
        for (line, parsed) in config::parse(text) {
            let applied = parsed.and_then(|entry| self.apply(entry).map_err(|err| err.to_string()));
            match applied {
                Ok(true) => report.applied += 1,
                Ok(false) => {}
                Err(reason) => {
                    let err = RenameError::Malformed {
                        origin: origin.into(),
                        line,
                        reason,
                    };
                    error!("skipping rename entry: {err}");
                    report.skipped += 1;
                }
            }
        }
        report
    }

    /// Applies one line; `Ok(false)` for section headers.
    fn apply(&self, line: Line<'_>) -> Result<bool, RenameError> {
        match line {
            Line::Header(_) => Ok(false),
            Line::Type { old, current } => {
                let info = self.lookup_type(current)?;
                self.register_type_rename(old, info)?;
                Ok(true)
            }
            Line::Enum {
                old,
                enum_path,
                variant,
            } => {
                let info = self.lookup_type(enum_path)?;
                self.register_enum_rename_in(info, old, variant)?;
                Ok(true)
            }
        }
    }

    /// Loads a rename configuration file.
    pub fn load_path(&self, path: impl AsRef<Path>) -> Result<LoadReport, RenameError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| RenameError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(self.load_str(&path.display().to_string(), &text))
    }

    /// Loads configuration files in order. A file that cannot be read is
    /// logged and skipped; the others still load.
    pub fn load_paths<P: AsRef<Path>>(&self, paths: impl IntoIterator<Item = P>) -> LoadReport {
        let mut report = LoadReport::default();
        for path in paths {
            match self.load_path(path) {
                Ok(loaded) => report.merge(loaded),
                Err(err) => error!("{err}"),
            }
        }
        report
    }
}

impl core::fmt::Debug for RenameRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RenameRegistry")
            .field("types", &self.types.len())
            .field("enums", &self.enums.len())
            .field("locked", &self.is_locked())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use std::io::Write;

    use textconv_types::catalog::TypeCatalog;
    use textconv_types::info::{TextEnum, TypeInfo, TypeInfoCell, Typed};

    use super::{LoadReport, RenameRegistry};
    use crate::error::RenameError;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Colour {
        Crimson,
        Teal,
    }
    textconv_types::impl_type_path!(in "fixtures::paint" => Colour);

    impl Typed for Colour {
        fn type_info() -> &'static TypeInfo {
            static CELL: TypeInfoCell = TypeInfoCell::new();
            CELL.get_or_init(|| TypeInfo::enumeration::<Colour>().build())
        }
    }

    impl TextEnum for Colour {
        fn variants() -> &'static [Self] {
            &[Colour::Crimson, Colour::Teal]
        }
        fn variant_name(&self) -> &'static str {
            match self {
                Colour::Crimson => "Crimson",
                Colour::Teal => "Teal",
            }
        }
    }

    fn registry() -> RenameRegistry {
        let mut catalog = TypeCatalog::new();
        catalog.register::<Colour>();
        RenameRegistry::create(catalog)
    }

    #[test]
    fn type_rename_and_lock() {
        let renames = registry();
        renames
            .register_type_rename("fixtures::OldColour", Colour::type_info())
            .unwrap();
        assert!(renames.lookup_type("fixtures::OldColour").unwrap().is::<Colour>());

        renames.lock();
        assert!(renames.is_locked());
        assert!(matches!(
            renames.register_type_rename("fixtures::Older", Colour::type_info()),
            Err(RenameError::Locked)
        ));
        assert!(renames.lookup_type("fixtures::OldColour").unwrap().is::<Colour>());
        assert!(matches!(
            renames.lookup_type("fixtures::Older"),
            Err(RenameError::TypeNotFound { .. })
        ));
    }

    #[test]
    fn reserved_and_empty_names() {
        let renames = registry();
        let reserved = ["std::Old", "core::Old", "alloc::Old", "textconv::Old", "textconv_types::Old"];
        for name in reserved {
            assert!(matches!(
                renames.register_type_rename(name, Colour::type_info()),
                Err(RenameError::Reserved { .. })
            ));
        }
        assert!(matches!(
            renames.register_type_rename("", Colour::type_info()),
            Err(RenameError::EmptyName)
        ));
    }

    #[test]
    fn names_merely_starting_like_the_crate_are_free() {
        let renames = registry();
        renames
            .register_type_rename("textconverter::Old", Colour::type_info())
            .unwrap();
        assert_eq!(
            renames.lookup_type("textconverter::Old").unwrap(),
            Colour::type_info()
        );
    }

    #[test]
    fn enum_renames() {
        let renames = registry();
        renames.register_enum_rename("RED", &Colour::Crimson).unwrap();
        renames.register_enum_rename("SCARLET", &Colour::Crimson).unwrap();

        assert_eq!(renames.lookup_enum_of::<Colour>("RED").unwrap(), Colour::Crimson);
        assert_eq!(renames.lookup_enum_of::<Colour>("SCARLET").unwrap(), Colour::Crimson);
        assert_eq!(renames.lookup_enum_of::<Colour>("Teal").unwrap(), Colour::Teal);
        assert!(matches!(
            renames.lookup_enum_of::<Colour>("Mauve"),
            Err(RenameError::NoSuchVariant { .. })
        ));

        let mut snapshot = renames.enum_renames(Colour::type_info());
        snapshot.sort();
        assert_eq!(
            snapshot,
            vec![("RED".to_owned(), "Crimson"), ("SCARLET".to_owned(), "Crimson")]
        );
        assert!(matches!(
            renames.register_enum_rename_in(Colour::type_info(), "BLUE", "Navy"),
            Err(RenameError::NoSuchVariant { .. })
        ));
    }

    #[test]
    fn load_skips_bad_lines() {
        let renames = registry();
        let text = "\
[types]
fixtures::Paint = fixtures::paint::Colour
fixtures::Ghost = fixtures::Missing
std::Reserved = fixtures::paint::Colour
[enums]
RED = fixtures::paint::Colour::Crimson
GREEN = fixtures::paint::Colour::Green
";
        let report = renames.load_str("inline", text);
        assert_eq!(report, LoadReport { applied: 2, skipped: 3 });
        assert!(renames.lookup_type("fixtures::Paint").unwrap().is::<Colour>());
        assert_eq!(renames.lookup_enum_of::<Colour>("RED").unwrap(), Colour::Crimson);
        assert_eq!(renames.type_renames().len(), 1);
    }

    #[test]
    fn load_from_files() {
        let renames = registry();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[types]\nfixtures::Tint = fixtures::paint::Colour").unwrap();

        let missing = file.path().with_extension("missing");
        let report = renames.load_paths([missing.as_path(), file.path()]);
        assert_eq!(report, LoadReport { applied: 1, skipped: 0 });
        assert!(renames.lookup_type("fixtures::Tint").is_ok());

        assert!(matches!(
            renames.load_path(&missing),
            Err(RenameError::Io { .. })
        ));
    }
}
