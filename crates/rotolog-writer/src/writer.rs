//! Rotating writer: the guarded rotate-then-append engine shared by all policies

use parking_lot::Mutex;
use rotolog_core::{Error, Result};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::fmt::MakeWriter;

use crate::policy::{ActiveFile, CleanupReport, RotationPolicy};

/// Append-only byte sink that moves between files according to a policy.
///
/// One lock covers the rotation check and the append, so concurrent writers
/// are serialized and a record is never split across files.
pub struct RotatingWriter<P: RotationPolicy> {
    folder: PathBuf,
    inner: Mutex<Inner<P>>,
}

struct Inner<P> {
    policy: P,
    /// Empty only after a failed rotation; the next write retries.
    active: Option<ActiveFile>,
}

/// What a write-triggered rotation did, reported after the lock is released
struct Rotation {
    policy: &'static str,
    retired: Option<PathBuf>,
    opened: Result<PathBuf>,
    cleanup: Result<CleanupReport>,
}

impl Rotation {
    fn succeeded(&self) -> bool {
        self.opened.is_ok()
    }

    /// Log the outcome; the cleanup result is reported even when the open failed
    fn finish(self) -> Result<()> {
        match &self.cleanup {
            Ok(report) => report.log(self.policy),
            Err(e) => warn!(policy = self.policy, "Cleanup failed during rotation: {}", e),
        }
        let opened = self.opened?;
        match &self.retired {
            Some(old) => info!(
                policy = self.policy,
                "Rotated log file: {} -> {}",
                old.display(),
                opened.display()
            ),
            None => info!(policy = self.policy, "Opened log file: {}", opened.display()),
        }
        Ok(())
    }
}

impl<P: RotationPolicy> RotatingWriter<P> {
    /// Create the folder, run a cleanup pass and open the first file.
    ///
    /// Any failure here is returned and no writer is built.
    pub fn with_policy<F: Into<PathBuf>>(folder: F, mut policy: P) -> Result<Self> {
        let folder = folder.into();
        crate::ensure_folder(&folder)?;

        let report = policy.cleanup(&folder)?;
        report.log(policy.name());

        let mut inner = Inner {
            policy,
            active: None,
        };
        let opened = inner.open_next(&folder)?;
        info!(policy = inner.policy.name(), "Opened log file: {}", opened.display());

        Ok(Self {
            folder,
            inner: Mutex::new(inner),
        })
    }

    /// Rotate if the policy asks for it, then append the whole buffer.
    ///
    /// A failed rotation is returned without writing anything.
    pub fn write_bytes(&self, buf: &[u8]) -> Result<usize> {
        let mut inner = self.inner.lock();
        let rotation = inner.rotate_if_needed(&self.folder);
        let written = match &rotation {
            Ok(None) => inner.append(buf),
            Ok(Some(rotation)) if rotation.succeeded() => inner.append(buf),
            _ => Ok(0),
        };
        drop(inner);

        // Logged outside the lock: this writer may be the subscriber's sink
        if let Some(rotation) = rotation? {
            rotation.finish()?;
        }
        written
    }

    /// Flush the active file
    pub fn flush_active(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        match inner.active.as_mut() {
            Some(active) => active.file.flush().map_err(|source| Error::Write {
                path: active.path.clone(),
                source,
            }),
            None => Ok(()),
        }
    }

    /// Folder owned by this writer
    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Path of the file receiving writes, if one is open
    pub fn active_path(&self) -> Option<PathBuf> {
        self.inner.lock().active.as_ref().map(|a| a.path.clone())
    }

    /// Files under management, oldest content first
    pub fn managed_files(&self) -> Result<Vec<PathBuf>> {
        self.inner.lock().policy.managed_files(&self.folder)
    }

    /// Run `f` against the policy under the writer's lock
    #[cfg(test)]
    pub(crate) fn inspect_policy<R>(&self, f: impl FnOnce(&P) -> R) -> R {
        f(&self.inner.lock().policy)
    }
}

impl<P: RotationPolicy> Inner<P> {
    fn rotate_if_needed(&mut self, folder: &Path) -> Result<Option<Rotation>> {
        let needed = match &self.active {
            Some(active) => self.policy.should_rotate(active)?,
            None => true,
        };
        if !needed {
            return Ok(None);
        }

        // Dropping the handle closes it before cleanup renames or deletes it
        let retired = self.active.take().map(|a| a.path);
        let cleanup = self.policy.cleanup(folder);
        let opened = self.open_next(folder);

        Ok(Some(Rotation {
            policy: self.policy.name(),
            retired,
            opened,
            cleanup,
        }))
    }

    fn open_next(&mut self, folder: &Path) -> Result<PathBuf> {
        let path = self.policy.next_path(folder);
        let file = open_append(&path)?;
        let active = ActiveFile {
            path: path.clone(),
            file,
        };
        self.policy.opened(&active)?;
        self.active = Some(active);
        Ok(path)
    }

    fn append(&mut self, buf: &[u8]) -> Result<usize> {
        let active = self.active.as_mut().ok_or(Error::NoActiveFile)?;
        active.file.write_all(buf).map_err(|source| Error::Write {
            path: active.path.clone(),
            source,
        })?;
        Ok(buf.len())
    }
}

/// Open `path` for appending, creating it if needed
fn open_append(path: &Path) -> Result<File> {
    let mut options = OpenOptions::new();
    options.create(true).append(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(rotolog_core::constants::FILE_MODE);
    }

    options.open(path).map_err(|source| Error::OpenFile {
        path: path.to_path_buf(),
        source,
    })
}

impl<P: RotationPolicy> Write for RotatingWriter<P> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(self.write_bytes(buf)?)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(self.flush_active()?)
    }
}

impl<P: RotationPolicy> Write for &RotatingWriter<P> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(self.write_bytes(buf)?)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(self.flush_active()?)
    }
}

impl<'a, P: RotationPolicy + 'a> MakeWriter<'a> for RotatingWriter<P> {
    type Writer = &'a RotatingWriter<P>;

    fn make_writer(&'a self) -> Self::Writer {
        self
    }
}
