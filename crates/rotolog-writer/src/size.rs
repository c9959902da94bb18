//! Size-based rotation: an active and a retired file, each capped at half
//! of the byte budget

use rotolog_core::constants::{ACTIVE_SLOT, RETIRED_SLOT};
use rotolog_core::{Error, Result, SizeConfig};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::policy::{ActiveFile, CleanupReport, RotationPolicy};
use crate::writer::RotatingWriter;

/// Writer alternating between `<folder>/half-1.log` and `<folder>/half-2.log`
pub type SizeRotator = RotatingWriter<SizePolicy>;

impl RotatingWriter<SizePolicy> {
    /// Keep at most roughly `max_megabytes` (decimal) of logs in `folder`
    pub fn new<F: Into<PathBuf>>(folder: F, max_megabytes: u64) -> Result<Self> {
        Self::with_config(folder, &SizeConfig::new(max_megabytes))
    }

    pub fn with_config<F: Into<PathBuf>>(folder: F, config: &SizeConfig) -> Result<Self> {
        Self::with_policy(folder, SizePolicy::from_config(config)?)
    }
}

/// Two-slot ping-pong policy
#[derive(Debug)]
pub struct SizePolicy {
    file_prefix: String,
    file_suffix: String,
    max_size: u64,
    half_size: u64,
    /// Active file size seen at the last rotation check
    current_size: u64,
}

impl SizePolicy {
    pub fn from_config(config: &SizeConfig) -> Result<Self> {
        config.validate()?;
        let max_size = config.max_size_bytes()?;
        Ok(Self {
            file_prefix: config.file_prefix.clone(),
            file_suffix: config.file_suffix.clone(),
            max_size,
            half_size: max_size / 2,
            current_size: 0,
        })
    }

    pub fn max_size(&self) -> u64 {
        self.max_size
    }

    pub fn half_size(&self) -> u64 {
        self.half_size
    }

    pub fn current_size(&self) -> u64 {
        self.current_size
    }

    pub fn active_path(&self, folder: &Path) -> PathBuf {
        self.slot_path(folder, ACTIVE_SLOT)
    }

    pub fn retired_path(&self, folder: &Path) -> PathBuf {
        self.slot_path(folder, RETIRED_SLOT)
    }

    fn slot_path(&self, folder: &Path, slot: &str) -> PathBuf {
        folder.join(format!("{}{}{}", self.file_prefix, slot, self.file_suffix))
    }
}

impl RotationPolicy for SizePolicy {
    fn name(&self) -> &'static str {
        "size"
    }

    fn should_rotate(&mut self, active: &ActiveFile) -> Result<bool> {
        let metadata = active.file.metadata().map_err(|source| Error::Stat {
            path: active.path.clone(),
            source,
        })?;
        self.current_size = metadata.len();
        Ok(self.current_size >= self.half_size)
    }

    /// Once the active file has reached half the budget, drop the retired
    /// file and move the active one into its slot.
    fn cleanup(&mut self, folder: &Path) -> Result<CleanupReport> {
        let active = self.active_path(folder);
        let retired = self.retired_path(folder);
        let mut report = CleanupReport::default();

        let size = match fs::metadata(&active) {
            Ok(metadata) => metadata.len(),
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(report),
            Err(source) => return Err(Error::Stat { path: active, source }),
        };
        if size < self.half_size {
            return Ok(report);
        }

        match fs::remove_file(&retired) {
            Ok(()) => report.removed.push(retired.clone()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(source) => report.skip(
                retired.clone(),
                Error::Remove {
                    path: retired.clone(),
                    source,
                },
            ),
        }

        fs::rename(&active, &retired).map_err(|source| Error::Rename {
            from: active.clone(),
            to: retired.clone(),
            source,
        })?;
        report.renamed.push((active, retired));

        Ok(report)
    }

    fn next_path(&mut self, folder: &Path) -> PathBuf {
        self.active_path(folder)
    }

    fn opened(&mut self, active: &ActiveFile) -> Result<()> {
        let metadata = fs::metadata(&active.path).map_err(|source| Error::Stat {
            path: active.path.clone(),
            source,
        })?;
        self.current_size = metadata.len();
        Ok(())
    }

    fn managed_files(&self, folder: &Path) -> Result<Vec<PathBuf>> {
        Ok([self.retired_path(folder), self.active_path(folder)]
            .into_iter()
            .filter(|path| path.is_file())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn managed_count(folder: &Path) -> usize {
        fs::read_dir(folder)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with("half-"))
            .count()
    }

    #[test]
    fn test_construction_sizes() {
        let dir = TempDir::new().unwrap();
        let writer = SizeRotator::new(dir.path(), 1).unwrap();

        writer.inspect_policy(|p| {
            assert_eq!(p.max_size(), 1_000_000);
            assert_eq!(p.half_size(), 500_000);
            assert_eq!(p.current_size(), 0);
        });
        assert_eq!(writer.active_path(), Some(dir.path().join("half-1.log")));
    }

    #[test]
    fn test_existing_active_file_size_is_measured() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("half-1.log"), vec![b'x'; 100]).unwrap();

        let writer = SizeRotator::with_config(dir.path(), &SizeConfig::with_max_bytes(1000)).unwrap();
        writer.inspect_policy(|p| assert_eq!(p.current_size(), 100));

        writer.write_bytes(b"more").unwrap();
        assert_eq!(fs::metadata(dir.path().join("half-1.log")).unwrap().len(), 104);
    }

    #[test]
    fn test_full_active_file_is_retired_at_construction() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("half-1.log"), vec![b'a'; 600]).unwrap();
        fs::write(dir.path().join("half-2.log"), b"oldest").unwrap();

        let writer = SizeRotator::with_config(dir.path(), &SizeConfig::with_max_bytes(1000)).unwrap();
        assert_eq!(fs::read(dir.path().join("half-2.log")).unwrap(), vec![b'a'; 600]);
        assert_eq!(fs::metadata(dir.path().join("half-1.log")).unwrap().len(), 0);
        writer.inspect_policy(|p| assert_eq!(p.current_size(), 0));
    }

    #[test]
    fn test_rotation_happens_on_the_next_write() {
        let dir = TempDir::new().unwrap();
        let writer = SizeRotator::with_config(dir.path(), &SizeConfig::with_max_bytes(10)).unwrap();

        // Exactly reaching half the budget does not rotate this write
        writer.write_bytes(b"12345").unwrap();
        assert!(!dir.path().join("half-2.log").exists());

        writer.write_bytes(b"abc").unwrap();
        assert_eq!(fs::read(dir.path().join("half-2.log")).unwrap(), b"12345");
        assert_eq!(fs::read(dir.path().join("half-1.log")).unwrap(), b"abc");
    }

    #[test]
    fn test_failed_cleanup_keeps_writing_to_active_file() {
        let dir = TempDir::new().unwrap();
        let writer = SizeRotator::with_config(dir.path(), &SizeConfig::with_max_bytes(10)).unwrap();

        // A non-empty directory in the retired slot can be neither removed nor replaced
        let blocker = dir.path().join("half-2.log");
        fs::create_dir(&blocker).unwrap();
        fs::write(blocker.join("keep"), b"x").unwrap();

        assert_eq!(writer.write_bytes(b"123456").unwrap(), 6);
        assert_eq!(writer.write_bytes(b"abc").unwrap(), 3);
        assert_eq!(writer.active_path(), Some(dir.path().join("half-1.log")));
        assert_eq!(fs::read(dir.path().join("half-1.log")).unwrap(), b"123456abc");
        assert!(blocker.is_dir());

        assert_eq!(writer.write_bytes(b"def").unwrap(), 3);
    }

    #[test]
    fn test_megabyte_scenario() {
        let dir = TempDir::new().unwrap();
        let writer = SizeRotator::new(dir.path(), 1).unwrap();
        let first = vec![b'1'; 500_001];
        let second = vec![b'2'; 500_001];
        let third = vec![b'3'; 500_001];

        writer.write_bytes(&first).unwrap();
        writer.write_bytes(&second).unwrap();
        assert_eq!(fs::read(dir.path().join("half-2.log")).unwrap(), first);
        assert_eq!(fs::read(dir.path().join("half-1.log")).unwrap(), second);

        writer.write_bytes(&third).unwrap();
        assert_eq!(fs::read(dir.path().join("half-2.log")).unwrap(), second);
        assert_eq!(fs::read(dir.path().join("half-1.log")).unwrap(), third);
        assert_eq!(managed_count(dir.path()), 2);
    }

    #[test]
    fn test_never_more_than_two_files() {
        let dir = TempDir::new().unwrap();
        let writer = SizeRotator::with_config(dir.path(), &SizeConfig::with_max_bytes(64)).unwrap();

        for i in 0..200 {
            writer.write_bytes(format!("line {}\n", i).as_bytes()).unwrap();
            assert!(managed_count(dir.path()) <= 2);
        }
        assert_eq!(
            writer.managed_files().unwrap(),
            vec![dir.path().join("half-2.log"), dir.path().join("half-1.log")]
        );
    }

    #[test]
    fn test_cleanup_without_active_file_is_noop() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("half-2.log"), b"old").unwrap();
        let mut policy = SizePolicy::from_config(&SizeConfig::with_max_bytes(10)).unwrap();

        let report = policy.cleanup(dir.path()).unwrap();
        assert!(report.is_empty());
        assert!(dir.path().join("half-2.log").exists());
        assert_eq!(policy.managed_files(dir.path()).unwrap(), vec![dir.path().join("half-2.log")]);
    }

    #[test]
    fn test_cleanup_report_lists_actions() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("half-1.log"), b"0123456789").unwrap();
        fs::write(dir.path().join("half-2.log"), b"old").unwrap();
        let mut policy = SizePolicy::from_config(&SizeConfig::with_max_bytes(10)).unwrap();

        let report = policy.cleanup(dir.path()).unwrap();
        assert_eq!(report.removed, vec![dir.path().join("half-2.log")]);
        assert_eq!(
            report.renamed,
            vec![(dir.path().join("half-1.log"), dir.path().join("half-2.log"))]
        );
        assert!(!dir.path().join("half-1.log").exists());
    }

    #[test]
    fn test_custom_prefix_and_suffix() {
        let dir = TempDir::new().unwrap();
        let config = SizeConfig::with_max_bytes(100)
            .with_prefix("app-")
            .with_suffix(".txt");
        let writer = SizeRotator::with_config(dir.path(), &config).unwrap();
        assert_eq!(writer.active_path(), Some(dir.path().join("app-1.txt")));
    }

    #[test]
    fn test_invalid_budget_is_rejected() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            SizeRotator::new(dir.path(), 0),
            Err(Error::InvalidConfig(_))
        ));
    }
}
