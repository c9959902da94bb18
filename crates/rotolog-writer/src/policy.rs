//! Rotation policy trait and cleanup reporting

use rotolog_core::{Error, Result};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// The file a rotator is currently appending to
#[derive(Debug)]
pub struct ActiveFile {
    pub path: PathBuf,
    pub file: File,
}

/// Decides when to rotate, which file comes next and which files survive.
///
/// The engine calls these under its lock, in this order on every rotation:
/// `cleanup`, `next_path`, then `opened` once the new file is open.
pub trait RotationPolicy: Send {
    /// Short name used in diagnostics
    fn name(&self) -> &'static str;

    /// Whether the active file must be retired before the next write
    fn should_rotate(&mut self, active: &ActiveFile) -> Result<bool>;

    /// Enforce the retention bound on `folder`
    fn cleanup(&mut self, folder: &Path) -> Result<CleanupReport>;

    /// Path of the file the next write should go to
    fn next_path(&mut self, folder: &Path) -> PathBuf;

    /// Called after `next_path` has been opened
    fn opened(&mut self, _active: &ActiveFile) -> Result<()> {
        Ok(())
    }

    /// Files under management, oldest content first
    fn managed_files(&self, folder: &Path) -> Result<Vec<PathBuf>>;
}

/// A cleanup entry that could not be handled
#[derive(Debug)]
pub struct CleanupSkip {
    pub path: PathBuf,
    pub error: Error,
}

/// Outcome of one cleanup pass
#[derive(Debug, Default)]
pub struct CleanupReport {
    /// Files deleted by this pass
    pub removed: Vec<PathBuf>,
    /// Files moved to another slot, as (from, to)
    pub renamed: Vec<(PathBuf, PathBuf)>,
    /// Entries left alone because of an error
    pub skipped: Vec<CleanupSkip>,
}

impl CleanupReport {
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.renamed.is_empty() && self.skipped.is_empty()
    }

    pub(crate) fn skip(&mut self, path: PathBuf, error: Error) {
        self.skipped.push(CleanupSkip { path, error });
    }

    /// Emit one event per action
    pub fn log(&self, policy: &str) {
        for path in &self.removed {
            debug!(policy, "Removed log file: {}", path.display());
        }
        for (from, to) in &self.renamed {
            debug!(policy, "Renamed log file: {} -> {}", from.display(), to.display());
        }
        for skip in &self.skipped {
            warn!(policy, "Skipped {} during cleanup: {}", skip.path.display(), skip.error);
        }
    }
}
