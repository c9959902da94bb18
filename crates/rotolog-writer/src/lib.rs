//! rotolog writer - rotating log files behind `io::Write`
//!
//! Two policies share one engine ([`RotatingWriter`]):
//! - [`DayRotator`]: one file per day, deleted after N days
//! - [`SizeRotator`]: two alternating files capped at half a byte budget each

mod day;
mod policy;
mod reader;
mod rotator;
mod size;
mod writer;

pub use day::{DayPolicy, DayRotator};
pub use policy::{ActiveFile, CleanupReport, CleanupSkip, RotationPolicy};
pub use reader::LogReader;
pub use rotator::{managed_files, run_cleanup, Rotator};
pub use size::{SizePolicy, SizeRotator};
pub use writer::RotatingWriter;

use rotolog_core::{Error, Result};
use std::path::Path;

/// Ensure the log folder (and any missing parents) exists
pub fn ensure_folder(folder: &Path) -> Result<()> {
    std::fs::create_dir_all(folder).map_err(|source| Error::CreateFolder {
        path: folder.to_path_buf(),
        source,
    })
}
