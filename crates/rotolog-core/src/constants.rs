//! Constants and default values for rotolog

/// Default file name format for daily rotation (one file per day)
pub const DAY_FORMAT: &str = "%Y-%m-%d";

/// File name format for hourly files
pub const HOUR_FORMAT: &str = "%Y-%m-%d-%H";

/// Default log file suffix
pub const DEFAULT_SUFFIX: &str = ".log";

/// Default file name prefix for size-based rotation
pub const SIZE_PREFIX: &str = "half-";

/// Slot name of the file currently receiving writes
pub const ACTIVE_SLOT: &str = "1";

/// Slot name of the previous generation
pub const RETIRED_SLOT: &str = "2";

/// Megabytes are decimal, not MiB
pub const BYTES_PER_MEGABYTE: u64 = 1_000_000;

/// Permissions for newly created log files
pub const FILE_MODE: u32 = 0o644;

/// Config file names to search for (in priority order)
pub const CONFIG_FILES: &[&str] = &[
    "rotolog.toml",
    "rotolog.yaml",
    "rotolog.yml",
    "rotolog.json",
];
