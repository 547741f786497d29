//! Update command.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Args;
use tagbump_core::{RunOutcome, RunReport, Updater, export_version};
use tagbump_handler::HandlerContext;
use tracing::debug;

use super::SourceArgs;

/// Arguments for the update command.
#[derive(Debug, Args)]
pub struct UpdateArgs {
    /// Commit message to apply
    #[arg(short, long)]
    pub message: String,

    /// Directory whose files are updated
    #[arg(short, long, default_value = ".")]
    pub dir: PathBuf,

    /// Changelog path, relative to DIR
    #[arg(short, long)]
    pub changelog: Option<PathBuf>,

    /// Project manifest to update (repeatable)
    #[arg(short = 'p', long = "manifest")]
    pub manifests: Vec<PathBuf>,

    /// Any other file to update (repeatable)
    #[arg(long = "file")]
    pub files: Vec<PathBuf>,

    /// Export SEMANTIC_VERSION to the CI env file after the run
    #[arg(long)]
    pub set_env: bool,

    /// CI env file written by --set-env
    #[arg(long, env = "GITHUB_ENV")]
    pub env_file: Option<PathBuf>,

    /// Repository name (owner/name), used to name new manifests
    #[arg(long, env = "GITHUB_REPOSITORY")]
    pub repository: Option<String>,

    /// Stop at the first handler failure
    #[arg(long)]
    pub strict: bool,

    #[command(flatten)]
    pub source: SourceArgs,
}

impl UpdateArgs {
    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_relative() {
            self.dir.join(path)
        } else {
            path.to_path_buf()
        }
    }

    /// Files named on the command line, resolved against DIR.
    fn explicit_files(&self) -> Vec<PathBuf> {
        self.changelog
            .iter()
            .chain(&self.manifests)
            .chain(&self.files)
            .map(|path| self.resolve(path))
            .collect()
    }
}

/// Collects the run's candidate files.
///
/// Regular files directly inside `dir` come first, then `explicit`, then the
/// changelog so it can be created when missing. Duplicates are dropped, and
/// the changelog is left out when a file differing only in case is already
/// collected (`changelog.md` for `CHANGELOG.md`).
fn candidate_files(dir: &Path, explicit: &[PathBuf], changelog: PathBuf) -> Result<Vec<PathBuf>> {
    let mut scanned = Vec::new();
    for entry in
        std::fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))?
    {
        let path = entry?.path();
        if path.is_file() {
            scanned.push(path);
        }
    }
    scanned.sort();

    let mut files: Vec<PathBuf> = Vec::new();
    for path in scanned.into_iter().chain(explicit.iter().cloned()) {
        if !files.contains(&path) {
            files.push(path);
        }
    }

    if files.iter().any(|path| same_name_ignoring_case(path, &changelog)) {
        debug!(path = %changelog.display(), "changelog already collected");
    } else {
        files.push(changelog);
    }
    Ok(files)
}

/// Whether `a` and `b` name the same entry of the same directory, ignoring
/// ASCII case in the file name.
fn same_name_ignoring_case(a: &Path, b: &Path) -> bool {
    let (Some(name_a), Some(name_b)) = (a.file_name(), b.file_name()) else {
        return false;
    };
    a.parent() == b.parent() && name_a.eq_ignore_ascii_case(name_b)
}

/// Runs the update command.
#[allow(clippy::needless_pass_by_value)]
pub fn run(args: UpdateArgs) -> Result<()> {
    if args.set_env && args.env_file.is_none() {
        bail!("--set-env needs an env file (--env-file or GITHUB_ENV)");
    }

    let config = args.source.load_config(&args.dir)?;
    let registry = args.source.load_registry(&config)?;

    let mut context =
        HandlerContext::new().with_date_format(config.changelog.date_format.clone());
    if let Some(repository) = &args.repository {
        context = context.with_repository(repository.clone());
    }

    let changelog = args.resolve(args.changelog.as_ref().unwrap_or(&config.changelog.path));
    let explicit = args.explicit_files();
    let files = candidate_files(&args.dir, &explicit, changelog)?;
    debug!(count = files.len(), "collected candidate files");

    let updater = Updater::from_config(&registry, &config)
        .with_context(context)
        .strict(args.strict || config.handlers.strict);

    let report = match updater.run(&args.message, &files)? {
        RunOutcome::Ignored { reason } => {
            println!("Ignoring commit ({reason}): {}", args.message);
            return Ok(());
        }
        RunOutcome::Updated(report) => report,
    };

    print_report(&report);

    if args.set_env
        && let (Some(env_file), Some(version)) = (&args.env_file, &report.version)
    {
        export_version(env_file, version)
            .with_context(|| format!("failed to export version to {}", env_file.display()))?;
    }

    let failed: Vec<_> = explicit
        .iter()
        .filter(|path| report.failure_for(path).is_some())
        .collect();
    if !failed.is_empty() {
        bail!("{} requested file(s) could not be updated", failed.len());
    }

    Ok(())
}

fn print_report(report: &RunReport) {
    for failure in &report.failures {
        eprintln!(
            "Failed to update {} ({}): {}",
            failure.path.display(),
            failure.kind,
            failure.error
        );
    }

    match &report.version {
        Some(version) => println!("Updated package with revision number {version}"),
        None => println!("No file was updated"),
    }
}
