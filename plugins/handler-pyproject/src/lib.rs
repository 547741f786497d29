//! `pyproject.toml` file handler.
//!
//! The document is edited with `toml_edit`, so comments, key order and
//! formatting outside the version field survive an update.

use std::path::{Path, PathBuf};

use semver::Version;
use tagbump_commit::{CommitMessage, DEFAULT_VERSION, parse_version};
use tagbump_handler::{
    FileHandler, HandlerContext, HandlerError, HandlerResult, HandlerState, parent_dir_name,
    read_file, update_version, write_atomic,
};
use toml_edit::{Array, DocumentMut, Item, Table, value};
use tracing::info;

/// Handler kind identifier.
pub const KIND: &str = "pyproject";

/// File names this handler manages.
pub const FILENAME_PATTERN: &str = r"(?i)^pyproject\.toml$";

/// Manifests own the version, so they run first.
pub const PRIORITY: i32 = 1;

/// Handler for `pyproject.toml`.
#[derive(Debug)]
pub struct PyprojectHandler {
    state: HandlerState<DocumentMut>,
}

impl PyprojectHandler {
    /// Creates a handler for the manifest at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, _ctx: &HandlerContext) -> Self {
        Self {
            state: HandlerState::new(path),
        }
    }

    /// Parses the manifest from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML.
    pub fn read(&self) -> HandlerResult<DocumentMut> {
        read_document(self.state.path())
    }

    /// The cached document, parsed on first access.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML.
    pub fn content(&mut self) -> HandlerResult<&mut DocumentMut> {
        self.state.content_or_load(read_document)
    }
}

impl FileHandler for PyprojectHandler {
    fn kind(&self) -> &str {
        KIND
    }

    fn path(&self) -> &Path {
        self.state.path()
    }

    fn priority(&self) -> i32 {
        PRIORITY
    }

    fn autocreate(&self) -> bool {
        false
    }

    fn create(&mut self) -> HandlerResult<()> {
        let name = parent_dir_name(self.state.path()).unwrap_or_default();
        write_atomic(self.state.path(), &template(&name).to_string())
    }

    fn version(&mut self) -> HandlerResult<Option<Version>> {
        if let Some(version) = self.state.version() {
            return Ok(Some(version.clone()));
        }
        if !self.exists() {
            return Ok(None);
        }

        let Some(raw) = declared_version(self.content()?) else {
            return Ok(None);
        };
        let version = parse_version(&raw)?;

        self.state.set_version(version.clone());
        Ok(Some(version))
    }

    fn reset(&mut self) {
        self.state.reset();
    }

    fn apply(&mut self, message: &mut CommitMessage) -> HandlerResult<()> {
        let version = update_version(self, message)?;

        let path = self.state.path().to_path_buf();
        let doc = self.content()?;
        set_version(doc, &version)
            .ok_or_else(|| HandlerError::render(&path, "`project` is not a table"))?;
        write_atomic(&path, &doc.to_string())?;

        info!(path = %path.display(), %version, "updated pyproject.toml");
        self.reset();
        Ok(())
    }
}

fn read_document(path: &Path) -> HandlerResult<DocumentMut> {
    read_file(path)?
        .parse::<DocumentMut>()
        .map_err(|e| HandlerError::parse(path, e))
}

/// Default document for a new project named `name`.
fn template(name: &str) -> DocumentMut {
    let mut build_system = Table::new();
    build_system["requires"] = value(Array::from_iter(["setuptools >= 61.0"]));
    build_system["build-backend"] = value("setuptools.build_meta");

    let mut project = Table::new();
    project["name"] = value(name);
    project["version"] = value(DEFAULT_VERSION.to_string());

    let mut doc = DocumentMut::new();
    doc["build-system"] = Item::Table(build_system);
    doc["project"] = Item::Table(project);
    doc
}

/// PEP 621 `project.version`.
fn project_version(doc: &DocumentMut) -> Option<&str> {
    doc.get("project")
        .and_then(|p| p.get("version"))
        .and_then(|v| v.as_str())
}

/// Poetry `tool.poetry.version`.
fn poetry_version(doc: &DocumentMut) -> Option<&str> {
    doc.get("tool")
        .and_then(|t| t.get("poetry"))
        .and_then(|p| p.get("version"))
        .and_then(|v| v.as_str())
}

fn declared_version(doc: &DocumentMut) -> Option<String> {
    project_version(doc)
        .or_else(|| poetry_version(doc))
        .map(str::to_string)
}

/// Writes `version` where the manifest declares it.
///
/// Poetry projects keep their version under `tool.poetry`; everything else
/// gets `project.version`, creating the table if needed.
fn set_version(doc: &mut DocumentMut, version: &Version) -> Option<()> {
    let uses_poetry = project_version(doc).is_none() && poetry_version(doc).is_some();

    let table = if uses_poetry {
        doc.get_mut("tool")?.get_mut("poetry")?
    } else {
        doc.entry("project").or_insert(toml_edit::table())
    };

    table
        .as_table_like_mut()?
        .insert("version", value(version.to_string()));
    Some(())
}
