//! Publishing the resolved version to a CI environment file.

use std::path::Path;

use semver::Version;
use tagbump_commit::CommitMessage;
use tagbump_handler::{FileHandler, HandlerContext};
use tagbump_handler_env_file::EnvFileHandler;
use tracing::info;

use crate::CoreResult;

/// Upserts `SEMANTIC_VERSION=<version>` into the env file at `path`.
///
/// The file is created if missing. Other keys are kept in order.
///
/// # Errors
///
/// Returns an error if the file cannot be parsed or written.
pub fn export_version(path: &Path, version: &Version) -> CoreResult<()> {
    let mut handler = EnvFileHandler::new(path, &HandlerContext::new());
    let mut message = CommitMessage::parse("").with_semantic_version(version.clone());

    handler.update(&mut message)?;
    info!(path = %path.display(), %version, "exported version");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_export_creates_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("github_env");

        export_version(&path, &Version::new(1, 4, 0)).unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "SEMANTIC_VERSION=1.4.0\n"
        );
    }

    #[test]
    fn test_export_keeps_other_keys() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("github_env");
        std::fs::write(&path, "FOO=bar\nSEMANTIC_VERSION=0.1.0\n").unwrap();

        export_version(&path, &Version::new(0, 2, 0)).unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "FOO=bar\nSEMANTIC_VERSION=0.2.0\n"
        );
    }

    #[test]
    fn test_export_keeps_multiline_entries() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("github_env");
        std::fs::write(&path, "NOTES<<EOF\nline one\nEOF\n").unwrap();

        export_version(&path, &Version::new(0, 1, 0)).unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "NOTES<<EOF\nline one\nEOF\nSEMANTIC_VERSION=0.1.0\n"
        );
    }
}
