//! Handler registry for tagbump.
//!
//! Maps file names to the handler responsible for them. Built-in handlers
//! register a constructor; external handlers are described by TOML
//! definition files found on the handler search path:
//! ```text
//! <config handlers.paths>/
//! $TAGBUMP_HANDLER_PATH entries/
//! ~/.tagbump/handlers/
//! └── version-txt.toml
//! ```

mod definition;
mod discovery;
mod error;
mod registry;

pub use definition::{definition_files, load_definition};
pub use discovery::{HANDLER_PATH_ENV, search_paths, user_handler_dir};
pub use error::{RegistryError, RegistryResult};
pub use registry::{HandlerConstructor, HandlerEntry, HandlerOrigin, HandlerRegistry};
