//! `package.json` file handler.

use std::path::{Path, PathBuf};

use semver::Version;
use serde_json::{Value, json};
use tagbump_commit::{CommitMessage, DEFAULT_VERSION, parse_version};
use tagbump_handler::{
    FileHandler, HandlerContext, HandlerError, HandlerResult, HandlerState, parent_dir_name,
    read_file, update_version, write_atomic,
};
use tracing::info;

/// Handler kind identifier.
pub const KIND: &str = "package-json";

/// File names this handler manages.
pub const FILENAME_PATTERN: &str = r"(?i)^package\.json$";

/// Manifests own the version, so they run first.
pub const PRIORITY: i32 = 1;

/// Handler for `package.json`.
#[derive(Debug)]
pub struct PackageJsonHandler {
    state: HandlerState<Value>,
    repository: Option<String>,
}

impl PackageJsonHandler {
    /// Creates a handler for the manifest at `path`.
    ///
    /// The repository name from `ctx` is used as the package name when the
    /// manifest is created.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, ctx: &HandlerContext) -> Self {
        Self {
            state: HandlerState::new(path),
            repository: ctx.repository_name().map(str::to_string),
        }
    }

    /// Parses the manifest from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid JSON.
    pub fn read(&self) -> HandlerResult<Value> {
        read_json(self.state.path())
    }

    /// The cached manifest, parsed on first access.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid JSON.
    pub fn content(&mut self) -> HandlerResult<&mut Value> {
        self.state.content_or_load(read_json)
    }

    fn package_name(&self) -> String {
        self.repository
            .clone()
            .or_else(|| parent_dir_name(self.state.path()))
            .unwrap_or_default()
    }
}

impl FileHandler for PackageJsonHandler {
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
        let manifest = json!({
            "name": self.package_name(),
            "private": true,
            "version": DEFAULT_VERSION.to_string(),
            "type": "module",
            "scripts": {},
            "dependencies": {},
            "devDependencies": {},
        });
        write_json(self.state.path(), &manifest)
    }

    fn version(&mut self) -> HandlerResult<Option<Version>> {
        if let Some(version) = self.state.version() {
            return Ok(Some(version.clone()));
        }
        if !self.exists() {
            return Ok(None);
        }

        let path = self.state.path().to_path_buf();
        let raw = match self.content()?.get("version") {
            None | Some(Value::Null) => return Ok(None),
            Some(Value::String(raw)) => raw.clone(),
            Some(other) => {
                return Err(HandlerError::parse(
                    &path,
                    format!("version must be a string, found {other}"),
                ));
            }
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
        let manifest = self.content()?;
        let Some(fields) = manifest.as_object_mut() else {
            return Err(HandlerError::render(&path, "top-level value is not an object"));
        };
        fields.insert("version".to_string(), Value::String(version.to_string()));
        write_json(&path, manifest)?;

        info!(path = %path.display(), %version, "updated package.json");
        self.reset();
        Ok(())
    }
}

fn read_json(path: &Path) -> HandlerResult<Value> {
    serde_json::from_str(&read_file(path)?).map_err(|e| HandlerError::parse(path, e))
}

/// Writes pretty JSON with the trailing newline npm uses.
fn write_json(path: &Path, manifest: &Value) -> HandlerResult<()> {
    let mut output =
        serde_json::to_string_pretty(manifest).map_err(|e| HandlerError::render(path, e))?;
    output.push('\n');
    write_atomic(path, &output)
}
