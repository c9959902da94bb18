//! Daily rotation: one file per calendar day, deleted after N days

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use rotolog_core::{parse_stem_date, Clock, DayConfig, Error, Result, RotationTrigger, SystemClock};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::policy::{ActiveFile, CleanupReport, RotationPolicy};
use crate::writer::RotatingWriter;

/// Writer with one file per day under `<folder>/<YYYY-MM-DD>.log`
pub type DayRotator = RotatingWriter<DayPolicy>;

impl RotatingWriter<DayPolicy> {
    /// Daily files in `folder`, deleting files `max_days` old or older
    pub fn new<F: Into<PathBuf>>(folder: F, max_days: u32) -> Result<Self> {
        Self::with_config(folder, &DayConfig::new(max_days))
    }

    pub fn with_config<F: Into<PathBuf>>(folder: F, config: &DayConfig) -> Result<Self> {
        Self::with_policy(folder, DayPolicy::from_config(config)?)
    }
}

/// Time-based policy
pub struct DayPolicy {
    config: DayConfig,
    clock: Arc<dyn Clock>,
    /// Time at which the open file was chosen
    opened_at: Option<NaiveDateTime>,
    pending: Option<NaiveDateTime>,
}

impl DayPolicy {
    pub fn from_config(config: &DayConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: config.clone(),
            clock: Arc::new(SystemClock),
            opened_at: None,
            pending: None,
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &DayConfig {
        &self.config
    }

    /// File name for a point in time, e.g. `2024-01-04.log`
    pub fn file_name(&self, at: NaiveDateTime) -> String {
        format!(
            "{}{}",
            at.format(&self.config.file_name_format),
            self.config.file_suffix
        )
    }

    /// Lazily walk the folder, yielding every file with our suffix and the
    /// date parsed from its name. Non-matching entries are not yielded.
    fn dated_files<'a>(
        &'a self,
        folder: &Path,
    ) -> Result<impl Iterator<Item = (PathBuf, Result<NaiveDate>)> + 'a> {
        let entries = fs::read_dir(folder).map_err(|source| Error::ReadFolder {
            path: folder.to_path_buf(),
            source,
        })?;
        let folder = folder.to_path_buf();

        Ok(entries.filter_map(move |entry| {
            let entry = match entry {
                Ok(entry) => entry,
                Err(source) => {
                    let err = Error::ReadFolder {
                        path: folder.clone(),
                        source,
                    };
                    return Some((folder.clone(), Err(err)));
                }
            };

            let path = entry.path();
            match entry.file_type() {
                Ok(kind) if kind.is_file() => {}
                Ok(_) => return None,
                Err(source) => {
                    let err = Error::Stat {
                        path: path.clone(),
                        source,
                    };
                    return Some((path, Err(err)));
                }
            }

            let name = path.file_name()?.to_str()?;
            let stem = name.strip_suffix(self.config.file_suffix.as_str())?;
            let date = parse_stem_date(stem, &self.config.file_name_format);
            Some((path.clone(), date))
        }))
    }
}

impl RotationPolicy for DayPolicy {
    fn name(&self) -> &'static str {
        "days"
    }

    fn should_rotate(&mut self, _active: &ActiveFile) -> Result<bool> {
        let Some(opened_at) = self.opened_at else {
            return Ok(true);
        };
        let now = self.clock.now();

        Ok(match self.config.trigger {
            RotationTrigger::Period => self.file_name(now) != self.file_name(opened_at),
            RotationTrigger::DayOfMonth => now.day() != opened_at.day(),
        })
    }

    /// Delete files whose date is `max_days` or more before today.
    ///
    /// Unparseable names and failed deletions are skipped and reported.
    fn cleanup(&mut self, folder: &Path) -> Result<CleanupReport> {
        let today = self.clock.today();
        let max_days = i64::from(self.config.max_days);
        let mut report = CleanupReport::default();

        for (path, date) in self.dated_files(folder)? {
            let date = match date {
                Ok(date) => date,
                Err(e) => {
                    report.skip(path, e);
                    continue;
                }
            };

            if today.signed_duration_since(date).num_days() >= max_days {
                match fs::remove_file(&path) {
                    Ok(()) => report.removed.push(path),
                    Err(source) => report.skip(path.clone(), Error::Remove { path, source }),
                }
            }
        }

        Ok(report)
    }

    fn next_path(&mut self, folder: &Path) -> PathBuf {
        let now = self.clock.now();
        self.pending = Some(now);
        folder.join(self.file_name(now))
    }

    fn opened(&mut self, _active: &ActiveFile) -> Result<()> {
        self.opened_at = self.pending.take().or_else(|| Some(self.clock.now()));
        Ok(())
    }

    fn managed_files(&self, folder: &Path) -> Result<Vec<PathBuf>> {
        if !folder.exists() {
            return Ok(vec![]);
        }
        let mut files: Vec<(NaiveDate, PathBuf)> = self
            .dated_files(folder)?
            .filter_map(|(path, date)| date.ok().map(|d| (d, path)))
            .collect();
        files.sort();
        Ok(files.into_iter().map(|(_, path)| path).collect())
    }
}
