//! Rotator built from a [`RotatorConfig`]

use rotolog_core::{PolicyConfig, Result, RotatorConfig};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::fmt::MakeWriter;

use crate::day::{DayPolicy, DayRotator};
use crate::policy::{CleanupReport, RotationPolicy};
use crate::size::{SizePolicy, SizeRotator};

/// Either policy, chosen at runtime
pub enum Rotator {
    Day(DayRotator),
    Size(SizeRotator),
}

impl Rotator {
    pub fn from_config(config: &RotatorConfig) -> Result<Self> {
        config.validate()?;
        Ok(match &config.policy {
            PolicyConfig::Days(c) => Rotator::Day(DayRotator::with_config(&config.folder, c)?),
            PolicyConfig::Size(c) => Rotator::Size(SizeRotator::with_config(&config.folder, c)?),
        })
    }

    pub fn write_bytes(&self, buf: &[u8]) -> Result<usize> {
        match self {
            Rotator::Day(w) => w.write_bytes(buf),
            Rotator::Size(w) => w.write_bytes(buf),
        }
    }

    pub fn flush_active(&self) -> Result<()> {
        match self {
            Rotator::Day(w) => w.flush_active(),
            Rotator::Size(w) => w.flush_active(),
        }
    }

    pub fn folder(&self) -> &Path {
        match self {
            Rotator::Day(w) => w.folder(),
            Rotator::Size(w) => w.folder(),
        }
    }

    pub fn active_path(&self) -> Option<PathBuf> {
        match self {
            Rotator::Day(w) => w.active_path(),
            Rotator::Size(w) => w.active_path(),
        }
    }

    pub fn managed_files(&self) -> Result<Vec<PathBuf>> {
        match self {
            Rotator::Day(w) => w.managed_files(),
            Rotator::Size(w) => w.managed_files(),
        }
    }
}

impl Write for Rotator {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(self.write_bytes(buf)?)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(self.flush_active()?)
    }
}

impl Write for &Rotator {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(self.write_bytes(buf)?)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(self.flush_active()?)
    }
}

impl<'a> MakeWriter<'a> for Rotator {
    type Writer = &'a Rotator;

    fn make_writer(&'a self) -> Self::Writer {
        self
    }
}

/// Run one cleanup pass without opening a file.
///
/// A folder that does not exist yet has nothing to clean.
pub fn run_cleanup(config: &RotatorConfig) -> Result<CleanupReport> {
    config.validate()?;
    if !config.folder.exists() {
        return Ok(CleanupReport::default());
    }
    match &config.policy {
        PolicyConfig::Days(c) => DayPolicy::from_config(c)?.cleanup(&config.folder),
        PolicyConfig::Size(c) => SizePolicy::from_config(c)?.cleanup(&config.folder),
    }
}

/// Files a rotator with this config would manage, oldest content first
pub fn managed_files(config: &RotatorConfig) -> Result<Vec<PathBuf>> {
    config.validate()?;
    match &config.policy {
        PolicyConfig::Days(c) => DayPolicy::from_config(c)?.managed_files(&config.folder),
        PolicyConfig::Size(c) => SizePolicy::from_config(c)?.managed_files(&config.folder),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rotolog_core::{DayConfig, SizeConfig};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_from_config_size() {
        let dir = TempDir::new().unwrap();
        let config = RotatorConfig::size(dir.path(), SizeConfig::with_max_bytes(8));
        let mut rotator = Rotator::from_config(&config).unwrap();
        assert!(matches!(rotator, Rotator::Size(_)));

        rotator.write_all(b"12345678").unwrap();
        rotator.write_all(b"9").unwrap();
        rotator.flush().unwrap();

        assert_eq!(rotator.folder(), dir.path());
        assert_eq!(rotator.active_path(), Some(dir.path().join("half-1.log")));
        assert_eq!(rotator.managed_files().unwrap().len(), 2);
    }

    #[test]
    fn test_from_config_days() {
        let dir = TempDir::new().unwrap();
        let config = RotatorConfig::days(dir.path().join("logs"), DayConfig::new(3));
        let rotator = Rotator::from_config(&config).unwrap();
        assert!(matches!(rotator, Rotator::Day(_)));
        assert_eq!(managed_files(&config).unwrap().len(), 1);
    }

    #[test]
    fn test_run_cleanup_on_missing_folder() {
        let dir = TempDir::new().unwrap();
        let config = RotatorConfig::days(dir.path().join("absent"), DayConfig::new(3));
        assert!(run_cleanup(&config).unwrap().is_empty());
        assert!(!dir.path().join("absent").exists());
    }

    #[test]
    fn test_run_cleanup_removes_old_day_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("2000-01-01.log"), "ancient").unwrap();
        let config = RotatorConfig::days(dir.path(), DayConfig::new(3));

        let report = run_cleanup(&config).unwrap();
        assert_eq!(report.removed, vec![dir.path().join("2000-01-01.log")]);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = RotatorConfig::days("", DayConfig::new(3));
        assert!(Rotator::from_config(&config).is_err());
        assert!(run_cleanup(&config).is_err());
    }
}
