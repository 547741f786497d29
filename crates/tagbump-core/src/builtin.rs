//! Built-in handler registration.

use std::path::Path;

use tagbump_handler::{FileHandler, HandlerContext};
use tagbump_handler_changelog::ChangelogHandler;
use tagbump_handler_env_file::EnvFileHandler;
use tagbump_handler_package_json::PackageJsonHandler;
use tagbump_handler_pyproject::PyprojectHandler;
use tagbump_registry::{HandlerRegistry, RegistryResult};

/// Registers the compiled-in handlers.
///
/// Registration order is fixed: changelog, pyproject, package-json,
/// env-file.
///
/// # Errors
///
/// Returns an error if one of the built-in kinds is already registered.
pub fn register_builtin_handlers(registry: &mut HandlerRegistry) -> RegistryResult<()> {
    registry.register(
        tagbump_handler_changelog::KIND,
        tagbump_handler_changelog::FILENAME_PATTERN,
        |path: &Path, ctx: &HandlerContext| -> Box<dyn FileHandler> {
            Box::new(ChangelogHandler::new(path, ctx))
        },
    )?;
    registry.register(
        tagbump_handler_pyproject::KIND,
        tagbump_handler_pyproject::FILENAME_PATTERN,
        |path: &Path, ctx: &HandlerContext| -> Box<dyn FileHandler> {
            Box::new(PyprojectHandler::new(path, ctx))
        },
    )?;
    registry.register(
        tagbump_handler_package_json::KIND,
        tagbump_handler_package_json::FILENAME_PATTERN,
        |path: &Path, ctx: &HandlerContext| -> Box<dyn FileHandler> {
            Box::new(PackageJsonHandler::new(path, ctx))
        },
    )?;
    registry.register(
        tagbump_handler_env_file::KIND,
        tagbump_handler_env_file::FILENAME_PATTERN,
        |path: &Path, ctx: &HandlerContext| -> Box<dyn FileHandler> {
            Box::new(EnvFileHandler::new(path, ctx))
        },
    )?;
    Ok(())
}

/// Creates a registry holding only the built-in handlers.
///
/// # Errors
///
/// Never fails in practice; registration errors are propagated.
pub fn default_registry() -> RegistryResult<HandlerRegistry> {
    let mut registry = HandlerRegistry::new();
    register_builtin_handlers(&mut registry)?;
    Ok(registry)
}
