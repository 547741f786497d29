//! Run-wide inputs shared by all handlers.

use tagbump_commit::DEFAULT_DATE_FORMAT;

/// Values handlers need that come from outside the files they manage.
///
/// The CLI fills this from flags, configuration and the process environment,
/// so handlers never inspect the environment themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerContext {
    /// Repository name hint (e.g. `owner/name`), used to name new manifests.
    pub repository: Option<String>,

    /// strftime format for changelog release dates.
    pub date_format: String,
}

impl HandlerContext {
    /// Creates a context with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            repository: None,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }

    /// Sets the repository name hint.
    #[must_use]
    pub fn with_repository(mut self, repository: impl Into<String>) -> Self {
        self.repository = Some(repository.into());
        self
    }

    /// Sets the changelog date format.
    #[must_use]
    pub fn with_date_format(mut self, date_format: impl Into<String>) -> Self {
        self.date_format = date_format.into();
        self
    }

    /// Returns the last path segment of the repository hint.
    ///
    /// `octo/widgets` yields `widgets`.
    #[must_use]
    pub fn repository_name(&self) -> Option<&str> {
        self.repository
            .as_deref()
            .map(|repo| repo.trim_end_matches('/'))
            .and_then(|repo| repo.rsplit('/').next())
            .filter(|name| !name.is_empty())
    }
}

impl Default for HandlerContext {
    fn default() -> Self {
        Self::new()
    }
}
