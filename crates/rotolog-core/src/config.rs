//! Rotator configuration
//!
//! A config names the target folder and one rotation policy. It can be built
//! in code or loaded from a file:
//! - TOML (.toml)
//! - YAML (.yaml, .yml)
//! - JSON (.json)

use chrono::format::{Item, Parsed, StrftimeItems};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::constants::*;
use crate::error::{Error, Result};

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Yaml,
    Json,
}

impl ConfigFormat {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(ConfigFormat::Toml),
            "yaml" | "yml" => Some(ConfigFormat::Yaml),
            "json" => Some(ConfigFormat::Json),
            _ => None,
        }
    }

    /// Detect format from file path
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

/// When a daily rotator decides that the day has changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RotationTrigger {
    /// Rotate when the formatted file name for "now" differs from the open
    /// file's name. With the default format this compares full dates.
    #[default]
    Period,
    /// Rotate when only the day-of-month differs. The same day number in a
    /// later month (or year) does not rotate.
    DayOfMonth,
}

fn default_day_format() -> String {
    DAY_FORMAT.to_string()
}

fn default_suffix() -> String {
    DEFAULT_SUFFIX.to_string()
}

fn default_size_prefix() -> String {
    SIZE_PREFIX.to_string()
}

/// Time-based policy: one file per period, deleted after `max_days`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayConfig {
    /// Files whose date is this many days (or more) before today are deleted
    pub max_days: u32,
    /// strftime pattern for the file stem (default: "%Y-%m-%d")
    #[serde(default = "default_day_format")]
    pub file_name_format: String,
    /// File suffix including the dot (default: ".log")
    #[serde(default = "default_suffix")]
    pub file_suffix: String,
    #[serde(default)]
    pub trigger: RotationTrigger,
}

impl DayConfig {
    pub fn new(max_days: u32) -> Self {
        Self {
            max_days,
            file_name_format: default_day_format(),
            file_suffix: default_suffix(),
            trigger: RotationTrigger::default(),
        }
    }

    /// One file per hour instead of per day
    pub fn hourly(mut self) -> Self {
        self.file_name_format = HOUR_FORMAT.to_string();
        self
    }

    pub fn with_format<S: Into<String>>(mut self, format: S) -> Self {
        self.file_name_format = format.into();
        self
    }

    pub fn with_suffix<S: Into<String>>(mut self, suffix: S) -> Self {
        self.file_suffix = suffix.into();
        self
    }

    pub fn with_trigger(mut self, trigger: RotationTrigger) -> Self {
        self.trigger = trigger;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_days == 0 {
            return Err(Error::invalid("max_days must be at least 1"));
        }
        validate_suffix(&self.file_suffix)?;
        validate_file_format(&self.file_name_format)
    }
}

/// Size-based policy: two files, each capped at half of the budget
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeConfig {
    /// Total budget in megabytes (1 MB = 1,000,000 bytes)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_megabytes: Option<u64>,
    /// Total budget in bytes, instead of `max_megabytes`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_bytes: Option<u64>,
    /// File name prefix (default: "half-")
    #[serde(default = "default_size_prefix")]
    pub file_prefix: String,
    /// File suffix including the dot (default: ".log")
    #[serde(default = "default_suffix")]
    pub file_suffix: String,
}

impl SizeConfig {
    pub fn new(max_megabytes: u64) -> Self {
        Self {
            max_megabytes: Some(max_megabytes),
            max_bytes: None,
            file_prefix: default_size_prefix(),
            file_suffix: default_suffix(),
        }
    }

    pub fn with_max_bytes(max_bytes: u64) -> Self {
        Self {
            max_megabytes: None,
            max_bytes: Some(max_bytes),
            file_prefix: default_size_prefix(),
            file_suffix: default_suffix(),
        }
    }

    pub fn with_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.file_prefix = prefix.into();
        self
    }

    pub fn with_suffix<S: Into<String>>(mut self, suffix: S) -> Self {
        self.file_suffix = suffix.into();
        self
    }

    /// Total budget in bytes
    pub fn max_size_bytes(&self) -> Result<u64> {
        match (self.max_megabytes, self.max_bytes) {
            (Some(mb), None) => mb
                .checked_mul(BYTES_PER_MEGABYTE)
                .ok_or_else(|| Error::invalid(format!("max_megabytes too large: {}", mb))),
            (None, Some(bytes)) => Ok(bytes),
            (Some(_), Some(_)) => Err(Error::invalid(
                "set either max_megabytes or max_bytes, not both",
            )),
            (None, None) => Err(Error::invalid("one of max_megabytes or max_bytes is required")),
        }
    }

    pub fn validate(&self) -> Result<()> {
        // Half of the budget must be non-zero or every write would rotate
        if self.max_size_bytes()? < 2 {
            return Err(Error::invalid("size budget must be at least 2 bytes"));
        }
        validate_suffix(&self.file_suffix)?;
        if has_separator(&self.file_prefix) {
            return Err(Error::invalid(format!(
                "file_prefix must not contain a path separator: {}",
                self.file_prefix
            )));
        }
        Ok(())
    }
}

/// Rotation policy selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "kebab-case")]
pub enum PolicyConfig {
    Days(DayConfig),
    Size(SizeConfig),
}

impl PolicyConfig {
    pub fn name(&self) -> &'static str {
        match self {
            PolicyConfig::Days(_) => "days",
            PolicyConfig::Size(_) => "size",
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            PolicyConfig::Days(c) => c.validate(),
            PolicyConfig::Size(c) => c.validate(),
        }
    }
}

/// Configuration of one rotator (rotolog.toml/yaml/json)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotatorConfig {
    /// Folder owned by the rotator
    pub folder: PathBuf,
    #[serde(flatten)]
    pub policy: PolicyConfig,
}

impl RotatorConfig {
    pub fn days<P: Into<PathBuf>>(folder: P, config: DayConfig) -> Self {
        Self {
            folder: folder.into(),
            policy: PolicyConfig::Days(config),
        }
    }

    pub fn size<P: Into<PathBuf>>(folder: P, config: SizeConfig) -> Self {
        Self {
            folder: folder.into(),
            policy: PolicyConfig::Size(config),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.folder.as_os_str().is_empty() {
            return Err(Error::invalid("folder must not be empty"));
        }
        self.policy.validate()
    }

    /// Load config from file, automatically detecting format from extension.
    /// Relative folders are resolved against the config file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigNotFound(path.to_path_buf()));
        }

        let format = ConfigFormat::from_path(path).ok_or_else(|| {
            Error::ConfigError(format!(
                "Unsupported config file extension: {}. Expected .toml, .yaml, .yml, or .json",
                path.display()
            ))
        })?;

        let content = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&content, format)?;
        if config.folder.is_relative() {
            if let Some(base) = path.parent() {
                config.folder = base.join(&config.folder);
            }
        }
        config.validate()?;
        Ok(config)
    }

    /// Parse config content with specified format
    pub fn parse(content: &str, format: ConfigFormat) -> Result<Self> {
        let config: RotatorConfig = match format {
            ConfigFormat::Toml => toml::from_str(content)?,
            ConfigFormat::Yaml => serde_yaml::from_str(content)?,
            ConfigFormat::Json => serde_json::from_str(content)?,
        };
        Ok(config)
    }

    /// Find and load a config file from a directory
    pub fn find_and_load(dir: &Path) -> Result<(Self, PathBuf)> {
        for name in CONFIG_FILES {
            let path = dir.join(name);
            if path.exists() {
                let config = Self::load(&path)?;
                return Ok((config, path));
            }
        }
        Err(Error::ConfigError(format!(
            "No config file found in {}. Expected one of: {:?}",
            dir.display(),
            CONFIG_FILES
        )))
    }
}

/// Parse the date embedded in a file stem produced by `format`.
///
/// The stem must be exactly what `format` renders for that date, so
/// unpadded names such as `2024-1-4` are rejected.
pub fn parse_stem_date(stem: &str, format: &str) -> Result<NaiveDate> {
    let fail = |reason: String| Error::ParseDate {
        name: stem.to_string(),
        reason,
    };

    let mut parsed = Parsed::new();
    chrono::format::parse(&mut parsed, stem, StrftimeItems::new(format))
        .map_err(|e| fail(e.to_string()))?;
    let date = parsed.to_naive_date().map_err(|e| fail(e.to_string()))?;

    let hour = match (parsed.hour_div_12(), parsed.hour_mod_12()) {
        (Some(div), Some(rem)) => div * 12 + rem,
        _ => 0,
    };
    let at = date
        .and_hms_opt(hour, parsed.minute().unwrap_or(0), parsed.second().unwrap_or(0))
        .ok_or_else(|| fail("time out of range".to_string()))?;

    let mut rendered = String::new();
    write!(rendered, "{}", at.format(format)).map_err(|_| fail("cannot be rendered".to_string()))?;
    if rendered != stem {
        return Err(fail(format!("not in canonical form (expected {})", rendered)));
    }
    Ok(date)
}

fn has_separator(s: &str) -> bool {
    s.contains(|c| c == '/' || c == std::path::MAIN_SEPARATOR)
}

fn validate_suffix(suffix: &str) -> Result<()> {
    if suffix.is_empty() {
        return Err(Error::invalid("file_suffix must not be empty"));
    }
    if has_separator(suffix) {
        return Err(Error::invalid(format!(
            "file_suffix must not contain a path separator: {}",
            suffix
        )));
    }
    Ok(())
}

/// A usable format renders without error, stays inside the folder, and
/// renders a date that cleanup can read back.
fn validate_file_format(format: &str) -> Result<()> {
    if format.is_empty() {
        return Err(Error::invalid("file_name_format must not be empty"));
    }
    if has_separator(format) {
        return Err(Error::invalid(format!(
            "file_name_format must not contain a path separator: {}",
            format
        )));
    }
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(Error::invalid(format!(
            "file_name_format is not a valid strftime pattern: {}",
            format
        )));
    }

    let sample: NaiveDateTime = NaiveDate::from_ymd_opt(2024, 11, 28)
        .and_then(|d| d.and_hms_opt(13, 0, 0))
        .ok_or_else(|| Error::invalid("sample date out of range"))?;
    let mut stem = String::new();
    write!(stem, "{}", sample.format(format)).map_err(|_| {
        Error::invalid(format!(
            "file_name_format cannot be rendered from a local date: {}",
            format
        ))
    })?;

    match parse_stem_date(&stem, format) {
        Ok(date) if date == sample.date() => Ok(()),
        _ => Err(Error::invalid(format!(
            "file_name_format must contain a full date (year, month, day): {}",
            format
        ))),
    }
}
