//! Handler registry mapping file names to handler constructors.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use regex::Regex;
use tagbump_handler::{FileHandler, HandlerContext};
use tagbump_handler_pattern::{PatternHandler, PatternRules};
use tracing::{debug, info};

use crate::definition::{definition_files, load_definition};
use crate::{RegistryError, RegistryResult};

/// Builds a handler for a matched path.
pub type HandlerConstructor = Box<dyn Fn(&Path, &HandlerContext) -> Box<dyn FileHandler>>;

/// Where a registered handler comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerOrigin {
    /// Compiled into the binary.
    Builtin,
    /// Loaded from a handler definition file.
    Definition(PathBuf),
}

impl fmt::Display for HandlerOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Builtin => write!(f, "builtin"),
            Self::Definition(path) => write!(f, "{}", path.display()),
        }
    }
}

/// A registered handler kind.
pub struct HandlerEntry {
    kind: String,
    pattern: Regex,
    origin: HandlerOrigin,
    constructor: HandlerConstructor,
}

impl HandlerEntry {
    /// Handler kind identifier.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// File name pattern, as registered.
    #[must_use]
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Where the handler comes from.
    #[must_use]
    pub fn origin(&self) -> &HandlerOrigin {
        &self.origin
    }

    /// Whether `file_name` belongs to this handler.
    #[must_use]
    pub fn matches(&self, file_name: &str) -> bool {
        self.pattern.is_match(file_name)
    }
}

impl fmt::Debug for HandlerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerEntry")
            .field("kind", &self.kind)
            .field("pattern", &self.pattern.as_str())
            .field("origin", &self.origin)
            .finish_non_exhaustive()
    }
}

/// Ordered set of handler kinds.
///
/// Paths are matched against the entries in registration order and the
/// first match wins, so dispatch does not depend on hashing or discovery
/// order.
#[derive(Debug, Default)]
pub struct HandlerRegistry {
    entries: Vec<HandlerEntry>,
}

impl HandlerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a compiled-in handler kind.
    ///
    /// # Errors
    ///
    /// Returns an error if `kind` is already registered or `pattern` is not
    /// a valid regex.
    pub fn register<F>(&mut self, kind: &str, pattern: &str, constructor: F) -> RegistryResult<()>
    where
        F: Fn(&Path, &HandlerContext) -> Box<dyn FileHandler> + 'static,
    {
        self.insert(kind, pattern, HandlerOrigin::Builtin, Box::new(constructor))
    }

    fn insert(
        &mut self,
        kind: &str,
        pattern: &str,
        origin: HandlerOrigin,
        constructor: HandlerConstructor,
    ) -> RegistryResult<()> {
        if self.entries.iter().any(|entry| entry.kind == kind) {
            return Err(RegistryError::Duplicate(kind.to_string()));
        }

        let pattern = Regex::new(pattern).map_err(|source| RegistryError::InvalidPattern {
            kind: kind.to_string(),
            source,
        })?;

        debug!(kind, pattern = pattern.as_str(), %origin, "registered handler");
        self.entries.push(HandlerEntry {
            kind: kind.to_string(),
            pattern,
            origin,
            constructor,
        });
        Ok(())
    }

    /// Finds the entry responsible for `path`, matching on its base name.
    #[must_use]
    pub fn resolve(&self, path: &Path) -> Option<&HandlerEntry> {
        let file_name = path.file_name()?.to_str()?;
        self.entries.iter().find(|entry| entry.matches(file_name))
    }

    /// Builds a fresh handler for `path`, or `None` if no entry matches.
    #[must_use]
    pub fn build(&self, path: &Path, ctx: &HandlerContext) -> Option<Box<dyn FileHandler>> {
        let entry = self.resolve(path)?;
        Some((entry.constructor)(path, ctx))
    }

    /// Finds the entry registered as `kind`.
    #[must_use]
    pub fn get(&self, kind: &str) -> Option<&HandlerEntry> {
        self.entries.iter().find(|entry| entry.kind == kind)
    }

    /// Registered entries, in registration order.
    #[must_use]
    pub fn entries(&self) -> &[HandlerEntry] {
        &self.entries
    }

    /// Number of registered kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registers a pattern handler for every definition file in `dirs`.
    ///
    /// Directories are visited in the given order and files in sorted order.
    /// Missing directories are skipped. Returns the number of definitions
    /// registered.
    ///
    /// # Errors
    ///
    /// Returns an error on the first unreadable or invalid definition, or if
    /// a definition reuses a registered kind.
    pub fn load_definitions<P: AsRef<Path>>(&mut self, dirs: &[P]) -> RegistryResult<usize> {
        let mut loaded = 0;

        for dir in dirs {
            for path in definition_files(dir.as_ref())? {
                let definition = load_definition(&path)?;
                let rules =
                    PatternRules::compile(&definition).map_err(|e| RegistryError::Definition {
                        path: path.clone(),
                        reason: e.to_string(),
                    })?;
                let rules = Arc::new(rules);

                self.insert(
                    &definition.kind,
                    &definition.filename,
                    HandlerOrigin::Definition(path.clone()),
                    Box::new(move |target: &Path, _ctx: &HandlerContext| {
                        Box::new(PatternHandler::new(target, Arc::clone(&rules)))
                            as Box<dyn FileHandler>
                    }),
                )?;

                info!(
                    kind = %definition.kind,
                    path = %path.display(),
                    "loaded handler definition"
                );
                loaded += 1;
            }
        }

        Ok(loaded)
    }
}
